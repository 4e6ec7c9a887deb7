//! Shared context passed to modules

use crate::domain::EmployeeCard;

/// Snapshot of what the board currently shows, refreshed every frame
#[derive(Debug, Default)]
pub struct Context {
    /// Cards in board order
    pub cards: Vec<EmployeeCard>,

    /// Attendance server display string
    pub server: String,

    /// The last fetch failed, so there is nothing to select
    pub load_failed: bool,
}

impl Context {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            cards: Vec::new(),
            server: server.into(),
            load_failed: false,
        }
    }

    pub fn card(&self, index: usize) -> Option<&EmployeeCard> {
        self.cards.get(index)
    }
}
