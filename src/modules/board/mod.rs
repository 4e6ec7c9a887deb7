//! Board module - employee card grid and its controller

pub mod controller;

pub use controller::{BoardController, ConfirmOutcome, CLOCK_ERROR_MESSAGE, DEFAULT_RELOAD_DELAY};

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, Context, Module, NotifyLevel};
use crate::domain::EmployeeId;

/// Cursor over the card grid.
///
/// The UI reports the column count and viewport height on every draw;
/// the grid keeps the highlighted card inside the visible rows.
#[derive(Debug, Clone)]
pub struct BoardGrid {
    selected: usize,
    columns: usize,
    scroll_row: usize,
}

impl Default for BoardGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardGrid {
    pub fn new() -> Self {
        Self {
            selected: 0,
            columns: 1,
            scroll_row: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn scroll_row(&self) -> usize {
        self.scroll_row
    }

    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }

    pub fn select(&mut self, index: usize, len: usize) {
        self.selected = index;
        self.clamp(len);
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Keep the cursor on `employee` after a reload, else clamp it.
    pub fn follow(&mut self, employee: Option<&EmployeeId>, ids: &[&EmployeeId]) {
        if let Some(index) = employee.and_then(|id| ids.iter().position(|other| *other == id)) {
            self.selected = index;
        }
        self.clamp(ids.len());
    }

    pub fn move_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_right(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected >= self.columns {
            self.selected -= self.columns;
        }
    }

    pub fn move_down(&mut self, len: usize) {
        if self.selected + self.columns < len {
            self.selected += self.columns;
        } else if len > 0 && self.row_of(self.selected) < self.row_of(len - 1) {
            // short last row
            self.selected = len - 1;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Scroll so the selected row is within `visible_rows` rows.
    pub fn ensure_visible(&mut self, visible_rows: usize) {
        let visible_rows = visible_rows.max(1);
        let row = self.row_of(self.selected);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }

    fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }
}

impl Module for BoardGrid {
    fn handle_key(&mut self, key: KeyEvent, ctx: &Context) -> Action {
        let len = ctx.cards.len();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_left(),
            KeyCode::Right | KeyCode::Char('l') => self.move_right(len),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(len),
            KeyCode::Home | KeyCode::Char('g') => self.first(),
            KeyCode::End | KeyCode::Char('G') => self.last(len),
            KeyCode::Char('r') => return Action::Reload,
            KeyCode::Enter | KeyCode::Char(' ') => {
                return match ctx.card(self.selected) {
                    Some(card) => Action::OpenConfirm(card.selection()),
                    None if ctx.load_failed => Action::Notify(
                        "Elenco non disponibile, premere r per riprovare".into(),
                        NotifyLevel::Error,
                    ),
                    None => Action::Notify("Nessun dipendente selezionabile".into(), NotifyLevel::Warn),
                };
            }
            _ => {}
        }
        Action::None
    }
}
