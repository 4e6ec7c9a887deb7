//! Employee card widget

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::domain::EmployeeCard;

/// One employee: initials badge, name, presence and clock-in time
pub struct EmployeeCardWidget<'a> {
    card: &'a EmployeeCard,
    highlighted: bool,
}

impl<'a> EmployeeCardWidget<'a> {
    pub fn new(card: &'a EmployeeCard) -> Self {
        Self {
            card,
            highlighted: false,
        }
    }

    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

impl<'a> Widget for EmployeeCardWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let card = self.card;

        let border_style = if self.highlighted {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if card.present {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if self.highlighted {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(border_style);

        let (badge_style, status_style, marker) = if card.present {
            (
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                Style::default().fg(Color::LightGreen),
                "●",
            )
        } else {
            (
                Style::default().fg(Color::Gray).bg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
                "○",
            )
        };
        let time_style = if card.clock_in.is_some() {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            Line::from(Span::styled(format!(" {} ", card.initials), badge_style)),
            Line::from(Span::styled(
                card.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{marker} {}", card.status_text()),
                status_style,
            )),
            Line::from(Span::styled(card.time_text(), time_style)),
        ];

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
