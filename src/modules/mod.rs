//! UI Modules
//!
//! Each module implements the Module trait and handles its own key input.
//!
//! Modules:
//! - board: employee card grid, confirm flow and the board controller

pub mod board;
