pub mod action;
pub mod context;
pub mod module;

pub use action::{Action, NotifyLevel};
pub use context::Context;
pub use module::Module;
