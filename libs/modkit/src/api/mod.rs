//! HTTP-facing building blocks shared by every module's REST layer.

pub mod identity;
pub mod problem;
pub mod response;
pub mod validation;

pub use identity::{Caller, USER_EMAIL_HEADER};
pub use problem::{ErrDef, FieldError, Problem, ProblemResponse};
pub use response::{respond, Envelope, Operation};
pub use validation::{validation_problem, JsonBody, Violations};
