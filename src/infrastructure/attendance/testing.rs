//! In-memory attendance service for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{AttendanceService, ServiceError};
use crate::domain::{ClockReceipt, EmployeeId, EmployeePresence};

pub fn presence(id: &str, nome: &str, cognome: &str, inizio: Option<&str>) -> EmployeePresence {
    EmployeePresence {
        id: EmployeeId::new(id),
        nome: nome.to_string(),
        cognome: cognome.to_string(),
        presente: inizio.is_some(),
        inizio: inizio.map(str::to_string),
    }
}

enum ToggleReply {
    Receipt(ClockReceipt),
    Unavailable,
    Garbage,
}

pub struct FakeAttendanceService {
    records: Option<Vec<EmployeePresence>>,
    toggle: ToggleReply,
    fetches: AtomicUsize,
    toggles: Mutex<Vec<EmployeeId>>,
}

impl FakeAttendanceService {
    fn new(records: Option<Vec<EmployeePresence>>, toggle: ToggleReply) -> Self {
        Self {
            records,
            toggle,
            fetches: AtomicUsize::new(0),
            toggles: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(records: Vec<EmployeePresence>) -> Self {
        Self::new(Some(records), ToggleReply::Unavailable)
    }

    pub fn failing_fetch() -> Self {
        Self::new(None, ToggleReply::Unavailable)
    }

    pub fn accepting(message: &str) -> Self {
        Self::new(
            Some(Vec::new()),
            ToggleReply::Receipt(ClockReceipt {
                success: true,
                message: Some(message.to_string()),
                tipo: Some("ingresso".to_string()),
                timestamp: Some("12/03/2024 08:15:00".to_string()),
            }),
        )
    }

    pub fn rejecting() -> Self {
        Self::new(
            Some(Vec::new()),
            ToggleReply::Receipt(ClockReceipt {
                success: false,
                message: None,
                tipo: None,
                timestamp: None,
            }),
        )
    }

    /// The server answers with a login page instead of JSON
    pub fn broken_toggle() -> Self {
        Self::new(Some(Vec::new()), ToggleReply::Garbage)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn toggles(&self) -> Vec<EmployeeId> {
        self.toggles.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttendanceService for FakeAttendanceService {
    async fn fetch_presence(&self) -> Result<Vec<EmployeePresence>, ServiceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.records.clone().ok_or(ServiceError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }

    async fn toggle_clock(&self, employee: &EmployeeId) -> Result<ClockReceipt, ServiceError> {
        self.toggles.lock().unwrap().push(employee.clone());
        match &self.toggle {
            ToggleReply::Receipt(receipt) => Ok(receipt.clone()),
            ToggleReply::Unavailable => Err(ServiceError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }),
            ToggleReply::Garbage => {
                Err(serde_json::from_str::<ClockReceipt>("<!doctype html>").unwrap_err().into())
            }
        }
    }

    fn endpoint_name(&self) -> String {
        "fake://attendance".to_string()
    }
}
