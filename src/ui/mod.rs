use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod widgets;

use crate::app::{App, ConfirmDialog, StatusLevel};
use crate::domain::board::{EMPTY_BOARD_MESSAGE, LOADING_MESSAGE, LOAD_ERROR_MESSAGE};
use crate::domain::BoardView;
use widgets::EmployeeCardWidget;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_board(f, areas.board, app);
    draw_status_line(f, areas.status_line, app);
    draw_hint_line(f, areas.hint_line, app);

    if let Some(toast) = app.toast.as_ref() {
        draw_toast(f, areas.board, &toast.text);
    }
    if let Some(dialog) = app.dialog.as_ref() {
        draw_confirm_dialog(f, areas.size, dialog);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
    if let Some(alert) = app.alert.as_deref() {
        draw_alert(f, areas.size, alert);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Timbra",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Server", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.ctx.server)),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let total = app.board.records().len();
    let updated = app
        .last_loaded_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--".to_string());
    let right_line = Line::from(vec![
        Span::styled("In servizio ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}/{}  ", app.board.present_count(), total)),
        Span::styled("Aggiornato ", Style::default().fg(Color::DarkGray)),
        Span::raw(updated),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_board(f: &mut Frame, area: Rect, app: &mut App) {
    let view = app.board.view();
    let title = match &view {
        BoardView::Cards(cards) => format!("Dipendenti ({})", cards.len()),
        _ => "Dipendenti".to_string(),
    };
    f.render_widget(
        Block::default().borders(Borders::ALL).title(title),
        area,
    );
    let inner = layout::board_inner(area);

    match view {
        BoardView::Loading => {
            draw_notice(f, inner, vec![Line::from(LOADING_MESSAGE)], Color::Cyan);
        }
        BoardView::Empty => {
            draw_notice(f, inner, vec![Line::from(EMPTY_BOARD_MESSAGE)], Color::LightBlue);
        }
        BoardView::Failed(reason) => {
            let lines = vec![
                Line::from(Span::styled(
                    LOAD_ERROR_MESSAGE,
                    Style::default().fg(Color::LightRed),
                )),
                Line::from(Span::styled(reason, Style::default().fg(Color::DarkGray))),
            ];
            draw_notice(f, inner, lines, Color::Red);
        }
        BoardView::Cards(cards) => {
            app.grid.set_columns(layout::grid_columns(inner.width));
            app.grid.ensure_visible(layout::visible_rows(inner));
            let slots = layout::card_slots(
                inner,
                app.grid.columns(),
                cards.len(),
                app.grid.scroll_row(),
            );
            for (index, rect) in slots {
                let widget = EmployeeCardWidget::new(&cards[index])
                    .highlighted(index == app.grid.selected());
                f.render_widget(widget, rect);
            }
        }
    }
}

/// A single bordered panel centered in the board, in place of the cards
fn draw_notice(f: &mut Frame, area: Rect, lines: Vec<Line>, color: Color) {
    let width = area.width.min(76);
    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let panel = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(panel, rect);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some((text, level)) = app.status_text() {
        let color = match level {
            StatusLevel::Info => Color::LightGreen,
            StatusLevel::Warn => Color::LightYellow,
            StatusLevel::Error => Color::LightRed,
        };
        Line::from(vec![
            Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
            Span::styled(text, Style::default().fg(color)),
        ])
    } else if let Some(card) = app.ctx.card(app.grid.selected()) {
        Line::from(vec![
            Span::styled("Selezionato ", Style::default().fg(Color::DarkGray)),
            Span::raw(card.full_name.clone()),
        ])
    } else {
        Line::from("")
    };
    f.render_widget(
        Paragraph::new(line).style(Style::default().fg(Color::White)),
        area,
    );
}

fn draw_hint_line(f: &mut Frame, area: Rect, app: &App) {
    let hints: &[(&str, &str)] = if app.alert.is_some() {
        &[("Enter/Esc", "chiudi")]
    } else if app.dialog.is_some() {
        &[("Enter/y", "conferma"), ("Esc/n", "annulla")]
    } else {
        &[
            ("←↓↑→/hjkl", "muovi"),
            ("Enter", "timbra"),
            ("r", "aggiorna"),
            ("?", "aiuto"),
            ("q", "esci"),
        ]
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            *key,
            Style::default().fg(Color::LightCyan),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast(f: &mut Frame, board: Rect, text: &str) {
    let width = board.width.min(48);
    let height = 3u16.min(board.height);
    let rect = Rect {
        x: board.x + board.width - width,
        y: board.y,
        width,
        height,
    };
    f.render_widget(Clear, rect);
    let toast = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::LightGreen),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Timbratura")
            .border_style(Style::default().fg(Color::Green)),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(toast, rect);
}

fn draw_confirm_dialog(f: &mut Frame, area: Rect, dialog: &ConfirmDialog) {
    let popup_area = fixed_rect(56, 8, area);
    f.render_widget(Clear, popup_area);

    let footer = if dialog.submitting {
        Line::from(Span::styled(
            "Invio in corso…",
            Style::default().fg(Color::LightYellow),
        ))
    } else {
        Line::from(vec![
            Span::styled("Enter/y", Style::default().fg(Color::LightCyan)),
            Span::styled(" conferma   ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc/n", Style::default().fg(Color::LightCyan)),
            Span::styled(" annulla", Style::default().fg(Color::DarkGray)),
        ])
    };
    let lines = vec![
        Line::from("Registrare la timbratura per"),
        Line::from(Span::styled(
            dialog.selection.full_name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        footer,
    ];

    let popup = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Conferma timbratura")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(popup, popup_area);
}

fn draw_alert(f: &mut Frame, area: Rect, message: &str) {
    let popup_area = fixed_rect(60, 7, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::LightRed),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/Esc per chiudere",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Errore")
                .border_style(Style::default().fg(Color::Red)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(popup, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigazione"),
        Line::from("  ←↓↑→ / hjkl  Sposta la selezione"),
        Line::from("  g / G        Primo / ultimo dipendente"),
        Line::from("  Mouse        Click per timbrare, rotella per scorrere"),
        Line::from(""),
        Line::from("Azioni"),
        Line::from("  Enter        Timbra il dipendente selezionato"),
        Line::from("  r            Aggiorna la bacheca"),
        Line::from("  ?            Mostra / nascondi aiuto"),
        Line::from("  q            Esci"),
        Line::from(""),
        Line::from("Conferma"),
        Line::from("  Enter / y    Registra la timbratura"),
        Line::from("  Esc / n      Annulla"),
    ];
    let help = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Aiuto"))
        .wrap(Wrap { trim: false });
    f.render_widget(help, popup_area);
}

/// Fixed-size popup clamped to the available area
fn fixed_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
