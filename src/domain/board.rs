//! Board rendering model
//!
//! The board is always derived from the latest fetch: [`BoardState`] holds
//! what the worker reported and [`render_board`] turns it into card view
//! models for the UI. Nothing here touches the terminal.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::presence::{EmployeeId, EmployeePresence};

pub const STATUS_IN_SERVICE: &str = "In Servizio";
pub const STATUS_OFF_DUTY: &str = "Non in Servizio";
pub const TIME_PLACEHOLDER: &str = "--:--";
pub const EMPTY_BOARD_MESSAGE: &str = "Nessun dipendente registrato nel sistema.";
pub const LOAD_ERROR_MESSAGE: &str =
    "Si è verificato un errore durante il caricamento dei dipendenti.";
pub const LOADING_MESSAGE: &str = "Caricamento dipendenti…";

/// Outcome of the latest presence fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardState {
    Loading,
    /// Records already in board order
    Loaded(Vec<EmployeePresence>),
    Failed(String),
}

impl BoardState {
    pub fn loaded(mut records: Vec<EmployeePresence>) -> Self {
        sort_records(&mut records);
        BoardState::Loaded(records)
    }

    pub fn records(&self) -> &[EmployeePresence] {
        match self {
            BoardState::Loaded(records) => records,
            _ => &[],
        }
    }

    pub fn present_count(&self) -> usize {
        self.records().iter().filter(|r| r.presente).count()
    }

    pub fn view(&self) -> BoardView {
        match self {
            BoardState::Loading => BoardView::Loading,
            BoardState::Failed(reason) => BoardView::Failed(reason.clone()),
            BoardState::Loaded(records) => cards_in_order(records),
        }
    }
}

/// What the board area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    Loading,
    /// Informational panel for a fetch that returned no employees
    Empty,
    /// Error panel; the reason is diagnostic detail only
    Failed(String),
    Cards(Vec<EmployeeCard>),
}

impl BoardView {
    pub fn cards(&self) -> &[EmployeeCard] {
        match self {
            BoardView::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// View model of a single employee card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeCard {
    pub id: EmployeeId,
    pub initials: String,
    /// "Cognome Nome"
    pub name: String,
    /// "Nome Cognome", used to title the confirm dialog
    pub full_name: String,
    pub present: bool,
    pub clock_in: Option<String>,
}

impl EmployeeCard {
    fn from_record(record: &EmployeePresence) -> Self {
        Self {
            id: record.id.clone(),
            initials: record.initials(),
            name: record.listing_name(),
            full_name: record.full_name(),
            present: record.presente,
            clock_in: record.clock_in().map(str::to_string),
        }
    }

    pub fn status_text(&self) -> &'static str {
        if self.present {
            STATUS_IN_SERVICE
        } else {
            STATUS_OFF_DUTY
        }
    }

    pub fn time_text(&self) -> String {
        match &self.clock_in {
            Some(time) => format!("Entrata: {time}"),
            None => TIME_PLACEHOLDER.to_string(),
        }
    }

    pub fn selection(&self) -> Selection {
        Selection {
            employee: self.id.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// The employee a confirm dialog was opened for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub employee: EmployeeId,
    pub full_name: String,
}

/// Build the board for a set of records given in any order.
pub fn render_board(records: &[EmployeePresence]) -> BoardView {
    let mut sorted = records.to_vec();
    sort_records(&mut sorted);
    cards_in_order(&sorted)
}

fn cards_in_order(records: &[EmployeePresence]) -> BoardView {
    if records.is_empty() {
        return BoardView::Empty;
    }
    BoardView::Cards(records.iter().map(EmployeeCard::from_record).collect())
}

/// Family name first, given name second. Stable.
pub fn sort_records(records: &mut [EmployeePresence]) {
    records.sort_by(|a, b| {
        locale_compare(&a.cognome, &b.cognome).then_with(|| locale_compare(&a.nome, &b.nome))
    });
}

/// Collation close to what a browser does for Latin names.
///
/// Both sides are decomposed (NFD) first, so precomposed and combining
/// accents are the same thing. Levels: base letters with accents and case
/// removed, then accents, then case (lower before upper).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (CollationKey::new(a), CollationKey::new(b));
    a.primary
        .cmp(&b.primary)
        .then_with(|| a.accents.cmp(&b.accents))
        .then_with(|| a.upper.cmp(&b.upper))
        .then_with(|| a.raw.cmp(&b.raw))
}

struct CollationKey {
    primary: Vec<char>,
    /// Combining marks attached to each base character
    accents: Vec<Vec<char>>,
    upper: Vec<bool>,
    raw: String,
}

impl CollationKey {
    fn new(s: &str) -> Self {
        let mut key = CollationKey {
            primary: Vec::new(),
            accents: Vec::new(),
            upper: Vec::new(),
            raw: s.nfc().collect(),
        };
        for c in s.nfd() {
            if is_combining_mark(c) {
                if let Some(marks) = key.accents.last_mut() {
                    marks.push(c);
                }
                continue;
            }
            key.accents.push(Vec::new());
            key.upper.push(c.is_uppercase());
            for lower in c.to_lowercase() {
                push_base(&mut key.primary, lower);
            }
        }
        key
    }
}

/// Letters that NFD leaves alone but collate as plain Latin letters.
fn push_base(out: &mut Vec<char>, c: char) {
    match c {
        'ß' => out.extend(['s', 's']),
        'æ' => out.extend(['a', 'e']),
        'œ' => out.extend(['o', 'e']),
        'ø' => out.push('o'),
        'đ' | 'ð' => out.push('d'),
        'ł' => out.push('l'),
        'ı' => out.push('i'),
        'þ' => out.extend(['t', 'h']),
        other => out.push(other),
    }
}
