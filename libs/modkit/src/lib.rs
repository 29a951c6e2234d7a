//! # ModKit
//!
//! Building blocks shared by the Hourly modules: RFC 9457 problems and the
//! success envelope for REST handlers, request identity and validation
//! helpers, the module wiring contracts, and the process lifecycle.

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod contracts;
pub mod lifecycle;
pub mod shutdown;

pub use api::problem::{internal_error, ErrDef, FieldError, Problem, ProblemResponse};
pub use api::response::{respond, Envelope, Operation};
pub use api::{Caller, JsonBody, Violations};
pub use contracts::{DbModule, RestfulModule};
pub use lifecycle::{Lifecycle, LifecycleError, ReadySignal, Status, StopReason};
pub use shutdown::wait_for_shutdown;
