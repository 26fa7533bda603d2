use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::info;

use consecutive_core::AppConfig;
use consecutive_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    widgets::{EventLogWidget, StackViewWidget, StatusBarWidget},
};

/// Poll timeout while nothing moves
const IDLE_TICK_MS: u64 = 250;
/// Width of the event log column
const LOG_COLUMNS: u16 = 34;

pub async fn run(config: AppConfig) -> Result<()> {
    // Put the terminal back before a panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Consecutive"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let event_handler = EventHandler::new(IDLE_TICK_MS, config.ui.frame_rate_fps);
    info!(
        fps = config.ui.frame_rate_fps,
        px_per_row = app.px_per_row,
        "playground started"
    );

    loop {
        // Advance running animations to this frame
        if app.needs_frame() {
            app.on_frame(Instant::now());
        }

        terminal.draw(|frame| {
            let size = frame.area();

            // Main layout: content + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(size);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(20), Constraint::Length(LOG_COLUMNS)])
                .split(main_layout[0]);

            // The engine viewport follows the stack column
            app.resize(columns[0]);

            StackViewWidget::render(frame, columns[0], &app);
            EventLogWidget::render(frame, columns[1], &app);
            StatusBarWidget::render(frame, main_layout[1], &app);
        })?;

        // Poll at the frame rate while something animates
        let event = if app.needs_frame() {
            event_handler.next_frame()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app);
                    app.status_message = None;
                    app.apply(action, Instant::now());
                }
                AppEvent::Mouse(mouse) => {
                    let action = handle_mouse_event(mouse);
                    app.apply(action, Instant::now());
                }
                // The next draw picks up the new size
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    info!("playground closed");

    Ok(())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}
