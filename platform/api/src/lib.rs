//! HTTP helpers shared by the suite's JSON surfaces: the error taxonomy and
//! its response mapping, plus a validating JSON extractor.

mod error;
mod extract;

pub use error::{ApiError, ApiResult, FieldError};
pub use extract::ValidatedJson;
