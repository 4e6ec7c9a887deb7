use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::core::{Action, Context, NotifyLevel};
use crate::domain::{BoardState, ClockReceipt, EmployeeId, Selection};
use crate::modules::board::{BoardGrid, CLOCK_ERROR_MESSAGE};

const STATUS_TTL: Duration = Duration::from_secs(3);
const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

/// Transient confirmation shown after a successful clocking
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub since: Instant,
}

/// Confirm dialog; it owns the selection it was opened for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub selection: Selection,
    /// A toggle request for this selection is in flight
    pub submitting: bool,
}

pub struct App {
    pub board: BoardState,
    pub grid: BoardGrid,
    pub ctx: Context,
    pub server: String,

    pub dialog: Option<ConfirmDialog>,
    pub toast: Option<Toast>,
    /// Blocking error; must be dismissed before anything else
    pub alert: Option<String>,
    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub should_quit: bool,

    pub last_loaded_at: Option<DateTime<Local>>,

    pending_load: bool,
    pending_submit: Option<EmployeeId>,
}

impl App {
    pub fn new(server: impl Into<String>) -> Self {
        let server = server.into();
        Self {
            board: BoardState::Loading,
            grid: BoardGrid::new(),
            ctx: Context::new(server.clone()),
            server,
            dialog: None,
            toast: None,
            alert: None,
            status: None,
            help_open: false,
            should_quit: false,
            last_loaded_at: None,
            pending_load: false,
            pending_submit: None,
        }
    }

    /// Refresh the module context from the board
    pub fn sync_context(&mut self) {
        self.ctx.cards = self.board.view().cards().to_vec();
        self.ctx.server = self.server.clone();
        self.ctx.load_failed = matches!(self.board, BoardState::Failed(_));
        self.grid.clamp(self.ctx.cards.len());
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
        if let Some(toast) = self.toast.as_ref() {
            if toast.since.elapsed() > TOAST_TTL {
                self.toast = None;
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.dialog.as_ref().is_some_and(|dialog| dialog.submitting)
    }

    // === Load ===

    pub fn request_reload(&mut self) {
        self.pending_load = true;
    }

    pub fn take_load_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_load)
    }

    /// Replace the whole board with the latest fetch result.
    pub fn apply_board(&mut self, state: BoardState) {
        let focused = self
            .ctx
            .card(self.grid.selected())
            .map(|card| card.id.clone());

        if let BoardState::Failed(reason) = &state {
            debug!(%reason, "board replaced by error panel");
        } else if matches!(state, BoardState::Loaded(_)) {
            self.last_loaded_at = Some(Local::now());
        }
        self.board = state;

        let ids: Vec<&EmployeeId> = self.board.records().iter().map(|r| &r.id).collect();
        self.grid.follow(focused.as_ref(), &ids);
        self.sync_context();
    }

    // === Confirm flow ===

    pub fn open_confirm(&mut self, selection: Selection) {
        if self.is_submitting() {
            return;
        }
        self.dialog = Some(ConfirmDialog {
            selection,
            submitting: false,
        });
    }

    /// Dismiss without acting. A dialog whose request is in flight stays.
    pub fn cancel_confirm(&mut self) {
        if !self.is_submitting() {
            self.dialog = None;
        }
    }

    /// Confirm the open dialog. No dialog, or one already submitting,
    /// means nothing happens.
    pub fn confirm_clock(&mut self) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        if dialog.submitting {
            return;
        }
        dialog.submitting = true;
        self.pending_submit = Some(dialog.selection.employee.clone());
    }

    pub fn take_submit_request(&mut self) -> Option<EmployeeId> {
        self.pending_submit.take()
    }

    pub fn apply_clock_recorded(&mut self, employee: &EmployeeId, receipt: ClockReceipt) {
        if self
            .dialog
            .as_ref()
            .is_some_and(|dialog| &dialog.selection.employee == employee)
        {
            self.dialog = None;
        }
        self.toast = Some(Toast {
            text: receipt.message_text().to_string(),
            since: Instant::now(),
        });

        let mut detail = receipt
            .kind()
            .map(|kind| kind.label().to_string())
            .unwrap_or_else(|| "Timbratura".to_string());
        if let Some(timestamp) = receipt.timestamp.as_deref() {
            detail.push_str(&format!(" {timestamp}"));
        }
        self.set_status(detail, StatusLevel::Info);
    }

    pub fn apply_clock_failed(&mut self, employee: &EmployeeId, reason: String) {
        warn!(employee = %employee, %reason, "clocking failed");
        if let Some(dialog) = self.dialog.as_mut() {
            if &dialog.selection.employee == employee {
                dialog.submitting = false;
            }
        }
        self.alert = Some(CLOCK_ERROR_MESSAGE.to_string());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn apply_runtime_error(&mut self, message: String) {
        warn!(%message, "runtime error");
        self.set_status(message, StatusLevel::Error);
    }

    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::OpenConfirm(selection) => self.open_confirm(selection),
            Action::Reload => {
                self.request_reload();
                self.set_status("Aggiornamento…", StatusLevel::Info);
            }
            Action::Notify(text, level) => self.set_status(text, level.into()),
            Action::Quit => self.should_quit = true,
        }
    }
}
