//! Async worker - runs in Tokio runtime and handles attendance requests

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::debug;

use crate::domain::EmployeeId;
use crate::infrastructure::attendance::AttendanceService;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::modules::board::{BoardController, ConfirmOutcome};

/// Run the async worker loop
///
/// Each command becomes its own task, so a slow submission never holds
/// up a manual reload.
pub async fn run_async_worker<S: AttendanceService>(
    controller: Arc<BoardController<S>>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    // Polling interval for the command channel
    let mut poll_interval = interval(Duration::from_millis(50));

    loop {
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            debug!(?cmd, "worker command");
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::LoadEmployees => {
                    tokio::spawn(load_board(controller.clone(), evt_tx.clone()));
                }

                RuntimeCommand::SubmitClock { employee } => {
                    tokio::spawn(submit_clock(controller.clone(), employee, evt_tx.clone()));
                }
            }
        }

        poll_interval.tick().await;
    }
}

async fn load_board<S: AttendanceService>(
    controller: Arc<BoardController<S>>,
    evt_tx: Sender<RuntimeEvent>,
) {
    let state = controller.load_employees().await;
    let _ = evt_tx.send(RuntimeEvent::BoardLoaded { state });
}

/// Submit, report, and on success reload once after the settling delay.
async fn submit_clock<S: AttendanceService>(
    controller: Arc<BoardController<S>>,
    employee: EmployeeId,
    evt_tx: Sender<RuntimeEvent>,
) {
    match controller.confirm_clock(Some(&employee)).await {
        ConfirmOutcome::Skipped => {}
        ConfirmOutcome::Recorded(receipt) => {
            let _ = evt_tx.send(RuntimeEvent::ClockRecorded { employee, receipt });
            debug!(
                delay_ms = controller.reload_delay().as_millis() as u64,
                "board reload scheduled"
            );
            let state = controller.reload_after_delay().await;
            let _ = evt_tx.send(RuntimeEvent::BoardLoaded { state });
        }
        ConfirmOutcome::Failed(reason) => {
            let _ = evt_tx.send(RuntimeEvent::ClockFailed { employee, reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::domain::BoardState;
    use crate::infrastructure::attendance::testing::{presence, FakeAttendanceService};
    use crate::modules::board::DEFAULT_RELOAD_DELAY;

    fn controller(fake: &Arc<FakeAttendanceService>) -> Arc<BoardController<FakeAttendanceService>> {
        Arc::new(BoardController::new(fake.clone(), DEFAULT_RELOAD_DELAY))
    }

    fn drain(rx: &mpsc::Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
        rx.try_iter().collect()
    }

    #[tokio::test(start_paused = true)]
    async fn success_reports_then_reloads_once_after_delay() {
        let fake = Arc::new(FakeAttendanceService::accepting("Timbratura registrata"));
        let (tx, rx) = mpsc::channel();
        let started = tokio::time::Instant::now();

        submit_clock(controller(&fake), EmployeeId::new("7"), tx).await;

        assert!(started.elapsed() >= DEFAULT_RELOAD_DELAY);
        assert_eq!(fake.fetch_count(), 1);
        let events = drain(&rx);
        assert_eq!(events.len(), 2);
        match &events[0] {
            RuntimeEvent::ClockRecorded { employee, receipt } => {
                assert_eq!(employee.as_str(), "7");
                assert_eq!(receipt.message_text(), "Timbratura registrata");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            events[1],
            RuntimeEvent::BoardLoaded {
                state: BoardState::Loaded(Vec::new())
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_reports_without_reload() {
        let fake = Arc::new(FakeAttendanceService::rejecting());
        let (tx, rx) = mpsc::channel();

        submit_clock(controller(&fake), EmployeeId::new("7"), tx).await;

        assert_eq!(fake.fetch_count(), 0);
        let events = drain(&rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RuntimeEvent::ClockFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn worker_serves_commands_until_shutdown() {
        let fake = Arc::new(FakeAttendanceService::with_records(vec![presence(
            "1",
            "Anna",
            "Bianchi",
            Some("08:15"),
        )]));
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        cmd_tx.send(RuntimeCommand::LoadEmployees).unwrap();
        cmd_tx.send(RuntimeCommand::Shutdown).unwrap();

        run_async_worker(controller(&fake), cmd_rx, evt_tx).await.unwrap();
        // let the spawned load task run
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = drain(&evt_rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            RuntimeEvent::BoardLoaded { state } => assert_eq!(state.records().len(), 1),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn worker_stops_when_the_ui_goes_away() {
        let fake = Arc::new(FakeAttendanceService::with_records(Vec::new()));
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, _evt_rx) = mpsc::channel();
        drop(cmd_tx);

        run_async_worker(controller(&fake), cmd_rx, evt_tx).await.unwrap();
        assert_eq!(fake.fetch_count(), 0);
    }
}
