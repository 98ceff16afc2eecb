mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, SourceConfig};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::{PeriodicRefresher, sync_refresher};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::style::Print;
use crossterm::{cursor, execute, terminal};
use livescore_api::client::{DataSource, HttpSource};
use livescore_api::mock::MockSource;
use livescore_api::store::{FileStore, JsonStore};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();

    let settings = AppSettings::load();
    let level = settings.log_level.unwrap_or(log::LevelFilter::Error);
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);

    let source: Arc<dyn DataSource> = match &settings.source {
        SourceConfig::Mock { seed } => {
            info!("using mock feed, seed {seed}");
            Arc::new(MockSource::new(*seed))
        }
        SourceConfig::Http { url } => {
            info!("using feed at {url}");
            Arc::new(HttpSource::new(url.as_str()))
        }
    };
    let store = Arc::new(JsonStore::new(FileStore::new(&settings.data_dir)));
    info!("storing favorites and settings in {}", settings.data_dir.display());

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let app = Arc::new(Mutex::new(App::new(settings, store.clone(), store.clone())));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(source, store, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Load the first view and the catalog on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_tx, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("livescore {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "livescore - live football scores in the terminal

Usage:
  livescore
  livescore --help
  livescore --version

Environment:
  LIVESCORE_SOURCE_URL   Base URL of a JSON match feed (default: built-in mock feed)
  LIVESCORE_SEED         Seed for the mock feed (default 42)
  LIVESCORE_DATA_DIR     Where favorites and settings are kept (default ~/.config/livescore)
  LIVESCORE_LOG          Log level: error, warn, info, debug, trace (default error)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    ui_event_tx: mpsc::Sender<UiEvent>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();
    let mut refresher: Option<PeriodicRefresher> = None;

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                let mut app_guard = app.lock().await;
                sync_refresher(
                    &mut refresher,
                    app_guard.state.active_tab,
                    app_guard.refresh_period(),
                    &ui_event_tx,
                );
                if should_redraw && !loading.is_loading {
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let request = app.lock().await.refresh_request();
            let _ = network_requests.send(NetworkRequest::LoadCatalog).await;
            if let Some(request) = request {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::RefreshDue(view) => {
            let guard = app.lock().await;
            // A tick can race a tab switch; only the active view refreshes.
            let request = if guard.state.active_tab == view { guard.refresh_request() } else { None };
            drop(guard);
            if let Some(request) = request {
                let _ = network_requests.send(request).await;
            }
            false
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::MatchesLoaded { view, matches } => {
            let mut guard = app.lock().await;
            if guard.on_matches_loaded(view, matches) {
                ring_bell();
            }
        }
        NetworkResponse::MatchLoaded { id, found } => {
            let mut guard = app.lock().await;
            if guard.on_match_loaded(id, found) {
                ring_bell();
            }
        }
        NetworkResponse::CatalogLoaded { leagues, countries } => {
            let mut guard = app.lock().await;
            guard.on_catalog_loaded(leagues, countries);
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

fn ring_bell() {
    if let Err(e) = execute!(io::stdout(), Print('\x07')) {
        error!("failed to ring terminal bell: {e}");
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
