use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use prompter_core::{AppConfig, Script};
use prompter_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    keymap::Keymap,
    widgets::{PopupWidget, PrompterWidget, StatusBarWidget},
};

pub async fn run(config: Arc<AppConfig>, script: Script) -> Result<()> {
    // Create keymap from config
    let keymap = Keymap::from_config(&config.keymap);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Prompter"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, config, script, &keymap);

    // Restore terminal, even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    config: Arc<AppConfig>,
    script: Script,
    keymap: &Keymap,
) -> Result<()> {
    let event_handler =
        EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);
    let mut app = App::new(config, script);

    let size = terminal.size()?;
    app.resize(size.width, size.height, Instant::now());
    info!(
        tokens = app.prompter.script().len(),
        width = size.width,
        height = size.height,
        "Prompter started"
    );

    // One engine frame per animation interval, however many events arrive
    let mut next_frame = Instant::now();

    loop {
        let now = Instant::now();
        if now >= next_frame {
            app.tick(now);
            next_frame = now + event_handler.frame_interval();
        }

        // Draw UI
        terminal.draw(|frame| {
            let (view, bar) = App::split_area(frame.area());
            PrompterWidget::render(frame, view, &app);
            StatusBarWidget::render(frame, bar, &app);

            if app.prompter.is_restarting() {
                let progress = app.prompter.animator().restart_progress(Instant::now());
                PopupWidget::render_restarting(frame, view, progress, &app.theme);
            }
            if app.mode == Mode::Help {
                PopupWidget::render_help(frame, view, &app.config.keymap, &app.theme);
            }
        })?;

        let timeout = event_handler.timeout(
            app.needs_fast_update(),
            app.prompter.next_deadline(),
            Instant::now(),
        );
        if let Some(event) = event_handler.next(timeout)? {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app, keymap);
                    app.handle_action(action, now);
                }
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse, now),
                AppEvent::Resize(w, h) => app.resize(w, h, now),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("Prompter closed");
    Ok(())
}
