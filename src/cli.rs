use crate::api::HttpBackend;
use crate::event::Event;
use crate::tui::App;
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{Event as TermEvent, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Load config, set up logging and run the TUI until the user quits
pub async fn run() -> Result<()> {
    let config = crate::config::load_or_create_config()?;
    let _log_guard = crate::logging::init(&config.logging)?;

    let base_url = config.api.base_url()?;
    let backend = Arc::new(
        HttpBackend::new(base_url, config.api.analyze_timeout())
            .with_context(|| format!("Invalid API base URL: {base_url}"))?,
    );
    tracing::info!(
        base_url,
        profile = ?config.api.profile,
        debounce_ms = config.search.debounce_ms,
        request_timeout_ms = config.search.request_timeout_ms,
        "starting"
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let app = App::new(
        backend.clone(),
        backend,
        config.search.options(),
        config.user.email.clone(),
        tx,
    );

    install_panic_hook(teardown_terminal);
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, app, rx).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    mut rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut terminal_events = EventStream::new();
    let mut tick = tokio::time::interval(TICK_RATE);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = tokio::select! {
            maybe = terminal_events.next() => match maybe {
                Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => Event::Key(key),
                Some(Ok(TermEvent::Resize(w, h))) => Event::Resize(w, h),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },
            Some(event) = rx.recv() => event,
            _ = tick.tick() => Event::Tick,
        };

        app.handle_event(event)?;
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Put the terminal back before the default hook prints the panic
fn install_panic_hook(teardown: fn() -> io::Result<()>) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = teardown();
        previous(info);
    }));
}

fn teardown_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}
