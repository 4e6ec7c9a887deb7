//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI thread never awaits. It posts [`RuntimeCommand`]s and drains
//! [`RuntimeEvent`]s once per frame; the worker thread owns a Tokio
//! runtime and the HTTP client.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;

use crate::domain::{BoardState, ClockReceipt, EmployeeId};
use crate::infrastructure::attendance::AttendanceService;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::modules::board::BoardController;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Fetch the presence list
    LoadEmployees,
    /// Toggle clock-in/out for one employee
    SubmitClock { employee: EmployeeId },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A fetch finished, successfully or not
    BoardLoaded { state: BoardState },
    /// The server accepted the clocking
    ClockRecorded {
        employee: EmployeeId,
        receipt: ClockReceipt,
    },
    /// The clocking was rejected or never reached the server
    ClockFailed { employee: EmployeeId, reason: String },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Create a new runtime bridge driving the given controller
    pub fn new<S: AttendanceService>(controller: BoardController<S>) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();
        let controller = Arc::new(controller);

        // Spawn the worker thread with its own Tokio runtime
        thread::Builder::new()
            .name("timbra-worker".into())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Failed to create Tokio runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(controller, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
