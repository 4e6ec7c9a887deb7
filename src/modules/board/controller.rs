//! Board controller: the load and clock-toggle operations
//!
//! Every operation resolves to a value the UI can show. Failures are
//! logged here and never propagate to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{BoardState, ClockReceipt, EmployeeId};
use crate::infrastructure::attendance::AttendanceService;

/// Shown to the user for any failed submission
pub const CLOCK_ERROR_MESSAGE: &str =
    "Si è verificato un errore durante la registrazione della timbratura";

/// Server-side settling time before the board is re-read after a clocking
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Nothing was selected; no request was made
    Skipped,
    Recorded(ClockReceipt),
    /// Diagnostic reason; the user only sees [`CLOCK_ERROR_MESSAGE`]
    Failed(String),
}

pub struct BoardController<S> {
    service: Arc<S>,
    reload_delay: Duration,
}

impl<S: AttendanceService> BoardController<S> {
    pub fn new(service: Arc<S>, reload_delay: Duration) -> Self {
        Self {
            service,
            reload_delay,
        }
    }

    pub fn reload_delay(&self) -> Duration {
        self.reload_delay
    }

    /// Single attempt at reading the presence list.
    pub async fn load_employees(&self) -> BoardState {
        match self.service.fetch_presence().await {
            Ok(records) => {
                info!(count = records.len(), "presence list loaded");
                BoardState::loaded(records)
            }
            Err(err) => {
                warn!(error = %err, endpoint = %self.service.endpoint_name(), "presence list failed");
                BoardState::Failed(err.to_string())
            }
        }
    }

    /// Submit the clock toggle for the selected employee, if any.
    pub async fn confirm_clock(&self, selection: Option<&EmployeeId>) -> ConfirmOutcome {
        let Some(employee) = selection else {
            return ConfirmOutcome::Skipped;
        };

        match self.service.toggle_clock(employee).await {
            Ok(receipt) if receipt.success => {
                info!(
                    employee = %employee,
                    kind = ?receipt.kind(),
                    message = receipt.message_text(),
                    "clocking recorded"
                );
                ConfirmOutcome::Recorded(receipt)
            }
            Ok(receipt) => {
                warn!(employee = %employee, message = ?receipt.message, "clocking rejected by server");
                ConfirmOutcome::Failed("server reported success=false".to_string())
            }
            Err(err) => {
                warn!(employee = %employee, error = %err, "clocking request failed");
                ConfirmOutcome::Failed(err.to_string())
            }
        }
    }

    /// Wait for the settling delay, then re-read the board.
    pub async fn reload_after_delay(&self) -> BoardState {
        tokio::time::sleep(self.reload_delay).await;
        self.load_employees().await
    }
}
