//! Session validation: states, outcomes, and the single-flight validator.

mod outcome;
#[allow(clippy::module_inception)]
mod validator;

pub use outcome::{LOGIN_ROUTE, ValidationOutcome, ValidationState};
pub use validator::SessionValidator;
