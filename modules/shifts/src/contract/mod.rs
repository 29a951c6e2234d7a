pub mod client;
pub mod error;
pub mod model;

pub use client::ShiftsApi;
pub use error::ShiftsError;
pub use model::{ClockTime, NewBulkShift, NewShift, Shift, ShiftPatch, UserShiftsSummary};
