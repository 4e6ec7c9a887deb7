//! Presence records and clock receipts as exchanged with the attendance server

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Opaque employee identifier, echoed back to the server verbatim.
///
/// The server sends numeric ids; string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// One row of `/api/stato-dipendenti`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmployeePresence {
    pub id: EmployeeId,
    pub nome: String,
    pub cognome: String,
    #[serde(default)]
    pub presente: bool,
    /// Clock-in time of the open session, only set while `presente`
    #[serde(default)]
    pub inizio: Option<String>,
}

impl EmployeePresence {
    /// "Nome Cognome", as shown in the confirm dialog
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nome, self.cognome)
    }

    /// "Cognome Nome", as shown on the card
    pub fn listing_name(&self) -> String {
        format!("{} {}", self.cognome, self.nome)
    }

    pub fn initials(&self) -> String {
        self.nome
            .chars()
            .next()
            .into_iter()
            .chain(self.cognome.chars().next())
            .collect()
    }

    /// Clock-in time, but only for an employee actually in service
    pub fn clock_in(&self) -> Option<&str> {
        if !self.presente {
            return None;
        }
        self.inizio
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Direction of a recorded clocking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    In,
    Out,
}

impl ClockKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ingresso" => Some(ClockKind::In),
            "uscita" => Some(ClockKind::Out),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClockKind::In => "Ingresso",
            ClockKind::Out => "Uscita",
        }
    }
}

/// Response body of `POST /timbratura`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ClockReceipt {
    pub fn kind(&self) -> Option<ClockKind> {
        self.tipo.as_deref().and_then(ClockKind::parse)
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}
