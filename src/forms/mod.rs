pub mod renderer;
pub mod submission;

pub use renderer::render_form;
pub use submission::{build_submission, FieldError, SubmissionError};
