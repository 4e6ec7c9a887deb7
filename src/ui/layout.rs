use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Border + initials, name, status and time rows
pub const CARD_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub board: Rect,
    pub status_line: Rect,
    pub hint_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[2]);

    UiAreas {
        size,
        header: vertical[0],
        board: vertical[1],
        status_line: footer_chunks[0],
        hint_line: footer_chunks[1],
    }
}

/// Inside of the bordered board panel, where the cards go
pub fn board_inner(board: Rect) -> Rect {
    Rect {
        x: board.x.saturating_add(1),
        y: board.y.saturating_add(1),
        width: board.width.saturating_sub(2),
        height: board.height.saturating_sub(2),
    }
}

/// Cards per row for the available width
pub fn grid_columns(width: u16) -> usize {
    match width {
        w if w >= 160 => 4,
        w if w >= 120 => 3,
        w if w >= 80 => 2,
        _ => 1,
    }
}

/// Whole card rows that fit in `area`
pub fn visible_rows(area: Rect) -> usize {
    usize::from(area.height / CARD_HEIGHT).max(1)
}

/// Screen rectangle of every visible card, keyed by card index
pub fn card_slots(area: Rect, columns: usize, count: usize, scroll_row: usize) -> Vec<(usize, Rect)> {
    let columns = columns.max(1);
    if area.width == 0 || area.height < CARD_HEIGHT {
        return Vec::new();
    }
    let column_width = area.width / columns as u16;
    if column_width == 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for row in 0..visible_rows(area) {
        for column in 0..columns {
            let index = (scroll_row + row) * columns + column;
            if index >= count {
                return slots;
            }
            let x = area.x + column as u16 * column_width;
            let width = if column + 1 == columns {
                area.x + area.width - x
            } else {
                column_width
            };
            slots.push((
                index,
                Rect {
                    x,
                    y: area.y + row as u16 * CARD_HEIGHT,
                    width,
                    height: CARD_HEIGHT,
                },
            ));
        }
    }
    slots
}

/// Card index under a screen position
pub fn card_at(slots: &[(usize, Rect)], col: u16, row: u16) -> Option<usize> {
    slots
        .iter()
        .find(|(_, rect)| {
            col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
        })
        .map(|(index, _)| *index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_width() {
        assert_eq!(grid_columns(60), 1);
        assert_eq!(grid_columns(100), 2);
        assert_eq!(grid_columns(130), 3);
        assert_eq!(grid_columns(200), 4);
    }

    #[test]
    fn slots_fill_rows_and_stop_at_count() {
        let area = Rect::new(1, 4, 100, 20);
        let slots = card_slots(area, 2, 5, 0);

        // 20 rows fit three card rows; five cards
        assert_eq!(slots.len(), 5);
        assert_eq!(slots[0], (0, Rect::new(1, 4, 50, CARD_HEIGHT)));
        assert_eq!(slots[1], (1, Rect::new(51, 4, 50, CARD_HEIGHT)));
        assert_eq!(slots[4], (4, Rect::new(1, 16, 50, CARD_HEIGHT)));
    }

    #[test]
    fn slots_start_at_scroll_row() {
        let area = Rect::new(0, 0, 90, 12);
        let slots = card_slots(area, 3, 20, 2);
        let indices: Vec<usize> = slots.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn hit_testing_finds_the_card() {
        let slots = card_slots(Rect::new(0, 0, 80, 12), 2, 4, 0);
        assert_eq!(card_at(&slots, 5, 1), Some(0));
        assert_eq!(card_at(&slots, 45, 7), Some(3));
        assert_eq!(card_at(&slots, 45, 12), None);
    }

    #[test]
    fn areas_reserve_header_and_footer() {
        let ui = areas(Rect::new(0, 0, 100, 40));
        assert_eq!(ui.header.height, 3);
        assert_eq!(ui.board.height, 35);
        assert_eq!(ui.status_line.y, 38);
        assert_eq!(ui.hint_line.y, 39);
        assert_eq!(board_inner(ui.board), Rect::new(1, 4, 98, 33));
    }
}
