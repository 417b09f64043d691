use survey_guard_core::TextCheck;

use crate::client::truncate;

/// Longest answer excerpt placed in a prompt.
const MAX_PROMPT_RESPONSE_LEN: usize = 4000;

pub(crate) const SYSTEM_PROMPT: &str = "You are a survey data-quality analyst. \
You judge open-ended survey answers for signs of bots, fraud and low effort. \
Always answer with a single JSON object and nothing else.";

fn instructions(check: TextCheck) -> &'static str {
    match check {
        TextCheck::Gibberish => {
            "Decide whether the answer is gibberish: random keystrokes, keyboard mashing, \
             repeated characters or words that do not form meaningful language. \
             High score = coherent language."
        },
        TextCheck::CopyPaste => {
            "Decide whether the answer looks copied from elsewhere or machine generated: \
             encyclopedic tone, marketing copy, text that answers a different prompt, or \
             typical AI assistant phrasing. High score = written by the respondent."
        },
        TextCheck::Relevance => {
            "Decide whether the answer actually addresses the question that was asked. \
             High score = directly relevant."
        },
        TextCheck::GenericResponse => {
            "Decide whether the answer is generic filler that would fit any question \
             (\"good\", \"nothing\", \"I don't know\", \"it was fine\"). \
             High score = specific to this question."
        },
        TextCheck::Effort => {
            "Rate the effort and thoughtfulness of the answer given what the question asks \
             for. High score = considered, detailed answer."
        },
    }
}

pub(crate) fn build_check_prompt(check: TextCheck, question: &str, response: &str) -> String {
    format!(
        r#"Check: {check}

{instructions}

Survey question:
{question}

Respondent answer:
{response}

Return JSON: {{"score": <integer 0-100>, "flagged": <true if this answer should be flagged>, "reason": "<one sentence>"}}"#,
        instructions = instructions(check),
        response = truncate(response, MAX_PROMPT_RESPONSE_LEN),
    )
}
