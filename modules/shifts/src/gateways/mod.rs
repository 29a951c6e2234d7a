pub mod local;
pub mod users;
