//! Attendance domain models
//!
//! Plain data shared by the HTTP layer, the controller and the UI.

pub mod board;
pub mod presence;

pub use board::{BoardState, BoardView, EmployeeCard, Selection};
pub use presence::{ClockReceipt, EmployeeId, EmployeePresence};
