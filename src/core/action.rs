//! Actions that modules can return to communicate with the app

use crate::domain::board::Selection;

/// Actions returned by modules to communicate state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Open the confirm dialog for an employee
    OpenConfirm(Selection),

    /// Re-read the presence list
    Reload,

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Warn,
    Error,
}
