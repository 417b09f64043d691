//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read a non-empty string variable. Blank values count as unset.
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Parse a probability-like variable and clamp it to `[0.0, 1.0]`.
pub fn env_unit_interval(var: &str, default: f64) -> f64 {
    let raw = env_parse_with_default(var, default);
    let clamped = if raw.is_nan() { default } else { raw.clamp(0.0, 1.0) };
    if (clamped - raw).abs() > f64::EPSILON {
        tracing::warn!(var, original = raw, clamped, "value clamped to [0.0, 1.0]");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(var: &str, value: &str) {
        // SAFETY: each test uses its own variable name.
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        // SAFETY: each test uses its own variable name.
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TEST_SG_ENV_PARSE_VALID_41021";
        set(var_name, "42");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TEST_SG_ENV_PARSE_INVALID_41022";
        set(var_name, "banana");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TEST_SG_ENV_PARSE_MISSING_41023";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_non_empty_blank_is_none() {
        let var_name = "TEST_SG_ENV_NON_EMPTY_41024";
        set(var_name, "   ");
        assert!(env_non_empty(var_name).is_none());
        set(var_name, " key ");
        assert_eq!(env_non_empty(var_name).as_deref(), Some("key"));
        unset(var_name);
    }

    #[test]
    fn test_env_unit_interval_clamps() {
        let var_name = "TEST_SG_ENV_UNIT_41025";
        set(var_name, "1.7");
        assert!((env_unit_interval(var_name, 0.7) - 1.0).abs() < f64::EPSILON);
        set(var_name, "-3");
        assert!(env_unit_interval(var_name, 0.7).abs() < f64::EPSILON);
        unset(var_name);
        assert!((env_unit_interval(var_name, 0.7) - 0.7).abs() < f64::EPSILON);
    }
}
