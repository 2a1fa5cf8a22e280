mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, LOG_LEVEL_VAR, REFRESH_VAR};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use handball_api::config::{ApiConfig, BASE_URL_VAR, TIMEOUT_VAR};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

/// What the command line asked for.
enum Cli {
    Exit,
    Run { api_url: Option<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let api_url = match handle_cli_args() {
        Cli::Exit => return Ok(()),
        Cli::Run { api_url } => api_url,
    };

    better_panic::install();

    let settings = AppSettings::load();
    let config = api_config(api_url);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);

    let refresh_every = settings.refresh_every;
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(config, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic refresh of the visible tab
    let periodic_task = refresh_every.map(|period| {
        info!("refreshing every {}s", period.as_secs());
        tokio::spawn(PeriodicRefresher::new(period, ui_event_tx.clone()).run())
    });

    // Load the dashboard on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    if let Some(task) = periodic_task {
        task.abort();
    }

    Ok(())
}

fn handle_cli_args() -> Cli {
    let mut args = std::env::args().skip(1);
    let mut api_url = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return Cli::Exit;
            }
            "-V" | "--version" => {
                println!("handball-tui {}", env!("CARGO_PKG_VERSION"));
                return Cli::Exit;
            }
            "--api" => match args.next() {
                Some(url) => api_url = Some(url),
                None => {
                    eprintln!("--api needs a URL\n\n{}", usage_text());
                    std::process::exit(2);
                }
            },
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }

    Cli::Run { api_url }
}

/// Environment first, then `--api` on top; the timeout always comes from the environment.
fn api_config(api_url: Option<String>) -> ApiConfig {
    let from_env = ApiConfig::from_env();
    match api_url {
        Some(url) => match from_env.timeout {
            Some(timeout) => ApiConfig::new(url).with_timeout(timeout),
            None => ApiConfig::new(url),
        },
        None => from_env,
    }
}

fn usage_text() -> String {
    format!(
        "handball-tui - regional handball league in the terminal

Usage:
  handball-tui [--api <url>]
  handball-tui --help
  handball-tui --version

Environment (also read from .env.local and .env):
  {BASE_URL_VAR:<26}League API base URL (default http://localhost:8000/api)
  {TIMEOUT_VAR:<26}Request timeout in seconds (default none)
  {LOG_LEVEL_VAR:<26}Log level for the log pane (default warn)
  {REFRESH_VAR:<26}Auto refresh period in seconds, 0 disables (default 30)"
    )
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
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
    let request = match ui_event {
        UiEvent::AppStarted => app.lock().await.load_request(),
        UiEvent::RefreshTick => app.lock().await.refresh_request(),
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            None
        }
        UiEvent::Resize => None,
    };
    if let Some(request) = request {
        let _ = network_requests.send(request).await;
    }
    true
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    let follow_up = match response {
        NetworkResponse::LoadingStateChanged { .. } => None,
        NetworkResponse::DashboardLoaded { dashboard } => {
            guard.state.dashboard.loaded(dashboard);
            None
        }
        NetworkResponse::FixturesLoaded { fixtures } => {
            guard.state.fixtures.remote.loaded(fixtures);
            None
        }
        NetworkResponse::StandingsLoaded { standings } => {
            guard.state.on_standings_loaded(standings);
            None
        }
        NetworkResponse::RostersLoaded { rosters } => {
            guard.state.rosters.remote.loaded(rosters);
            None
        }
        NetworkResponse::NewsLoaded { news } => {
            guard.state.on_news_loaded(news);
            None
        }
        NetworkResponse::CollectionLoaded { resource, records } => {
            guard.state.on_collection_loaded(resource, records);
            None
        }
        NetworkResponse::FormOptionsLoaded { options } => {
            guard.state.form_options = options;
            None
        }
        NetworkResponse::RecordLoaded { record, options } => {
            guard.on_record_loaded(record, options);
            None
        }
        NetworkResponse::Saved { resource } => guard.on_saved(resource),
        NetworkResponse::Deleted { resource, id } => guard.on_deleted(resource, id),
        NetworkResponse::Failed { request, message } => {
            error!("{message}");
            guard.on_request_failed(request, message);
            None
        }
    };
    drop(guard);

    if let Some(request) = follow_up {
        let _ = network_requests.send(request).await;
    }
    true
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

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = terminal::enable_raw_mode();
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
