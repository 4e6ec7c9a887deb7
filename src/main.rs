mod app;
mod config;
mod core;
mod domain;
mod infrastructure;
mod modules;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::core::{Action, Module};
use crate::infrastructure::attendance::{AttendanceService, HttpAttendanceService};
use crate::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use crate::modules::board::BoardController;

#[derive(Debug, Parser)]
#[command(
    name = "timbra",
    version,
    about = "Timbra: employee clock-in/clock-out board for the terminal"
)]
struct Args {
    /// Attendance server (e.g. http://localhost:5003)
    #[arg(long)]
    server: Option<String>,

    /// Cookie header of a logged-in session (e.g. "session=...")
    #[arg(long)]
    cookie: Option<String>,

    /// Config file, instead of the default lookup
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay before the board is reloaded after a clocking
    #[arg(long)]
    reload_delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, config_problem) = config::load(args.config.as_deref());
    config.apply_overrides(args.server, args.cookie, args.reload_delay_ms);

    let _log_guard = init_logging(&config)?;
    if let Some(problem) = config_problem {
        warn!(%problem, "config file ignored, using defaults");
    }

    let service = HttpAttendanceService::new(&config.service_settings())
        .context("configure attendance server")?;
    let server = service.endpoint_name();
    info!(%server, reload_delay_ms = config.reload_delay_ms, "starting attendance board");
    let controller = BoardController::new(Arc::new(service), config.reload_delay());

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create the runtime bridge
    let runtime = RuntimeBridge::new(controller)?;

    let mut app = App::new(server);
    app.request_reload();

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "board stopped");
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Log to a daily file; the terminal belongs to the UI.
fn init_logging(config: &config::Config) -> Result<WorkerGuard> {
    let dir = config.log_dir();
    fs::create_dir_all(&dir).with_context(|| format!("create log dir {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&dir, "timbra.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(guard)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        app.sync_context();
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    // Process runtime events
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::BoardLoaded { state } => app.apply_board(state),
            RuntimeEvent::ClockRecorded { employee, receipt } => {
                app.apply_clock_recorded(&employee, receipt)
            }
            RuntimeEvent::ClockFailed { employee, reason } => {
                app.apply_clock_failed(&employee, reason)
            }
            RuntimeEvent::Error { message } => app.apply_runtime_error(message),
        }
    }

    // Process pending commands
    if app.take_load_request() {
        if let Err(err) = runtime.send(RuntimeCommand::LoadEmployees) {
            app.apply_runtime_error(format!("{err:#}"));
        }
    }
    if let Some(employee) = app.take_submit_request() {
        if let Err(err) = runtime.send(RuntimeCommand::SubmitClock {
            employee: employee.clone(),
        }) {
            app.apply_clock_failed(&employee, format!("{err:#}"));
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The alert blocks everything until dismissed
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    if app.dialog.is_some() {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => app.confirm_clock(),
            KeyCode::Esc | KeyCode::Char('n') => app.cancel_confirm(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.apply_action(Action::Quit),
        KeyCode::Char('?') => app.help_open = true,
        _ => {
            let action = app.grid.handle_key(key, &app.ctx);
            app.apply_action(action);
        }
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.alert.is_some() || app.help_open || app.dialog.is_some() {
        return;
    }
    let Some(size) = terminal_rect() else {
        return;
    };
    let areas = ui::layout::areas(size);
    let len = app.ctx.cards.len();

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let slots = ui::layout::card_slots(
                ui::layout::board_inner(areas.board),
                app.grid.columns(),
                len,
                app.grid.scroll_row(),
            );
            let Some(index) = ui::layout::card_at(&slots, mouse.column, mouse.row) else {
                return;
            };
            app.grid.select(index, len);
            if let Some(card) = app.ctx.card(index) {
                let selection = card.selection();
                app.apply_action(Action::OpenConfirm(selection));
            }
        }
        MouseEventKind::ScrollUp => app.grid.move_up(),
        MouseEventKind::ScrollDown => app.grid.move_down(len),
        _ => {}
    }
}

fn terminal_rect() -> Option<Rect> {
    let (width, height) = crossterm::terminal::size().ok()?;
    Some(Rect {
        x: 0,
        y: 0,
        width,
        height,
    })
}
