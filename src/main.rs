// ============================================================================
// MetalWatch - Indicateur de prix des métaux précieux
// ============================================================================
// Programme TUI : une ligne colorée qui tourne entre les métaux toutes les
// 2 secondes, rafraîchie depuis la source choisie toutes les N minutes.
//
// Architecture (comme un panneau de bureau) :
// - thread principal : boucle d'événements + rendu + deux timers
//   (fetch toutes les `refresh-interval` minutes, rotation toutes les 2 s)
// - worker thread : runtime tokio qui exécute les fetchs
// - communication par channels mpsc (commandes -> worker, résultats <- worker)
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use metalwatch::api::{self, FetchError, FetchOutcome, Fetcher};
use metalwatch::app::App;
use metalwatch::config::{self, Cli};
use metalwatch::logging;
use metalwatch::models::currency::CURRENCIES;
use metalwatch::models::{QuoteMap, Settings};
use metalwatch::ui::events::{is_escape_event, is_quit_event, is_refresh_event, Event, EventHandler};
use metalwatch::ui::ticker::{build_entries, render_entry};
use metalwatch::ui::render;

/// Intervalle de rotation de la ligne affichée
const ROTATE_EVERY: Duration = Duration::from_secs(2);

// ============================================================================
// Commandes et résultats du worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone, Copy)]
enum WorkerCommand {
    /// Lancer un fetch (ignoré par le fetcher si un autre est en cours)
    Fetch,

    /// Annuler le fetch en cours et arrêter le worker
    Shutdown,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum WorkerResult {
    Quotes(QuoteMap),
    NoData(FetchError),
    Busy,
}

impl From<FetchOutcome> for WorkerResult {
    fn from(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Fresh(quotes) => WorkerResult::Quotes(quotes),
            FetchOutcome::NoData(error) => WorkerResult::NoData(error),
            FetchOutcome::Busy => WorkerResult::Busy,
        }
    }
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_sources {
        print_sources();
        return Ok(());
    }
    if cli.list_currencies {
        for (code, name) in CURRENCIES {
            println!("{}  {}", code, name);
        }
        return Ok(());
    }

    let settings = config::resolve_settings(&cli)?;

    // Logging AVANT tout le reste ; un échec n'empêche pas de continuer
    logging::init_logging(settings.enable_debug_logging, &logging::default_log_dir()).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    config::validate(&settings)?;
    info!(source = %settings.enabled_source, currency = %settings.currency, "MetalWatch starting up");

    let source = api::resolve(&settings.enabled_source).with_context(|| {
        format!("Source inconnue : {} (voir --list-sources)", settings.enabled_source)
    })?;
    let fetcher = Arc::new(Fetcher::new(*source).context("Échec de la création du client HTTP")?);
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    if cli.once {
        return run_once(&runtime, &fetcher, &settings);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
    let (result_tx, result_rx) = mpsc::channel::<WorkerResult>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(runtime, fetcher.clone(), settings.clone(), command_rx, result_tx);

    let mut app = App::new(settings);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Teardown : plus aucune requête ne doit aboutir après ce point
    fetcher.abort();
    let _ = command_tx.send(WorkerCommand::Shutdown);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

/// `--list-sources` : une ligne par source avec ses commodités
fn print_sources() {
    for source in api::source::all() {
        let names: Vec<&str> = source.commodity_names().collect();
        println!("{} supports: {}", source.name, names.join(","));
    }
}

/// `--once` : un fetch, une ligne par entrée, puis sortie
fn run_once(runtime: &tokio::runtime::Runtime, fetcher: &Fetcher, settings: &Settings) -> Result<()> {
    match runtime.block_on(fetcher.fetch(settings)) {
        FetchOutcome::Fresh(quotes) => {
            let entries = build_entries(&quotes, settings);
            for index in 0..entries.len() {
                if let Some(line) = render_entry(&entries, index) {
                    println!("{}", line.plain_text());
                }
            }
            println!("Last update: {}", Local::now().format("%H:%M:%S"));
            Ok(())
        }
        FetchOutcome::NoData(error) => Err(anyhow!(error).context("Aucune donnée reçue")),
        FetchOutcome::Busy => Err(anyhow!("un fetch est déjà en cours")),
    }
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + async runtime
// - Le worker possède le runtime tokio
// - Chaque fetch est lancé avec runtime.spawn() : une demande qui arrive
//   pendant un fetch atteint le garde du Fetcher et revient en Busy,
//   elle n'est jamais mise en file d'attente
// - À l'arrêt, le runtime est détruit : les tâches restantes sont annulées
// ============================================================================

fn spawn_background_worker(
    runtime: tokio::runtime::Runtime,
    fetcher: Arc<Fetcher>,
    settings: Settings,
    command_rx: mpsc::Receiver<WorkerCommand>,
    result_tx: mpsc::Sender<WorkerResult>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            match command {
                WorkerCommand::Fetch => {
                    let fetcher = fetcher.clone();
                    let settings = settings.clone();
                    let result_tx = result_tx.clone();

                    runtime.spawn(async move {
                        let outcome = fetcher.fetch(&settings).await;
                        let _ = result_tx.send(WorkerResult::from(outcome));
                    });
                }
                WorkerCommand::Shutdown => {
                    fetcher.abort();
                    break;
                }
            }
        }

        info!("Worker thread exiting");
        runtime.shutdown_timeout(Duration::from_secs(1));
    })
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. résultats du worker
//   1. timers (fetch, rotation)
//   2. rendu
//   3. événements clavier (poll 250 ms)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<WorkerCommand>,
    result_rx: &mpsc::Receiver<WorkerResult>,
) -> Result<()> {
    let fetch_every = Duration::from_secs(app.settings.refresh_interval.saturating_mul(60));

    // Premier fetch immédiat
    request_fetch(app, command_tx);
    let mut last_fetch = Instant::now();
    let mut last_rotate = Instant::now();

    while app.is_running() {
        // 0. Résultats du worker (non bloquant)
        loop {
            match result_rx.try_recv() {
                Ok(result) => handle_result(app, result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    return Err(anyhow!("le worker thread s'est arrêté"));
                }
            }
        }

        // 1. Timers
        if last_fetch.elapsed() >= fetch_every {
            request_fetch(app, command_tx);
            last_fetch = Instant::now();
        }
        if last_rotate.elapsed() >= ROTATE_EVERY {
            app.tick();
            last_rotate = Instant::now();
        }

        // 2. Rendu
        terminal.draw(|frame| render(frame, app))?;

        // 3. Entrées clavier
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

fn request_fetch(app: &mut App, command_tx: &mpsc::Sender<WorkerCommand>) {
    match command_tx.send(WorkerCommand::Fetch) {
        Ok(()) => app.start_fetch(),
        Err(e) => error!(error = %e, "Failed to send fetch command"),
    }
}

fn handle_result(app: &mut App, result: WorkerResult) {
    match result {
        WorkerResult::Quotes(quotes) => app.apply_quotes(quotes, Local::now()),
        WorkerResult::NoData(error) => app.apply_failure(&error),
        WorkerResult::Busy => debug!("Fetch dropped: previous request still in flight"),
    }
}

fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<WorkerCommand>) {
    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("User requested refresh");
            request_fetch(app, command_tx);
        }

        Event::Key(_) if is_escape_event(&event) => app.cancel_quit(),

        Event::Key(_) => app.cancel_quit(),

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal (appelé même en cas d'erreur)
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
