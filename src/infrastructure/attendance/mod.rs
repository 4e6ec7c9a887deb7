//! Attendance server access

mod client;
mod error;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{AttendanceService, HttpAttendanceService, ServiceSettings};
pub use error::ServiceError;
