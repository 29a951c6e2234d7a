//! Scheduling core: clock arithmetic, duration derivation, date-range
//! expansion and overlap screening are pure; `service` ties them to the ports.

pub mod clock;
pub mod date_range;
pub mod duration;
pub mod error;
pub mod overlap;
pub mod ports;
pub mod repo;
pub mod service;
