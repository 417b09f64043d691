pub mod dashboard;
pub mod sessions;
pub mod surveys;
pub mod text_analysis;
