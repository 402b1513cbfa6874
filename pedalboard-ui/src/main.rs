mod ui;

use std::fs::File;
use std::io;
use std::time::Duration;

use pedalboard_core::app::{check_environment, App, AppOptions};
use pedalboard_core::config::Config;
use pedalboard_core::types::{Dispatcher, Shutdownable};
use ui::{render, MenuCommand, MenuView, RatatuiBackend};

/// Upper bound on how long a shutdown request from OSC goes unnoticed.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pedalboard")
        .join("pedalboard.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/pedalboard.log")) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("pedalboard: cannot create log file: {}", e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, simplelog::Config::default(), log_file) {
        eprintln!("pedalboard: logger init failed: {}", e);
        return;
    }

    log::info!("pedalboard starting (log level: {:?})", log_level);
}

fn fail(message: &dyn std::fmt::Display) -> ! {
    log::error!("{}", message);
    eprintln!("pedalboard: {}", message);
    std::process::exit(1);
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let skip_checks = args.iter().any(|a| a == "--skip-checks");
    let no_looper = args.iter().any(|a| a == "--no-looper");
    init_logging(verbose);

    let config = Config::load();
    if skip_checks {
        log::warn!("environment checks skipped");
    } else if let Err(e) = check_environment(&config.startup()) {
        fail(&e);
    }

    let options = AppOptions { start_looper: !no_looper };
    let mut app = match App::start(&config, options) {
        Ok(app) => app,
        Err(e) => fail(&e),
    };

    let mut backend = RatatuiBackend::new()?;
    backend.start()?;

    let result = run(&mut backend, &mut app);

    app.shutdown();
    backend.stop()?;
    log::info!("exit");
    result
}

fn run(backend: &mut RatatuiBackend, app: &mut App) -> io::Result<()> {
    let mut view = MenuView::new(app.menus());
    let dispatcher = app.dispatcher();

    while !app.shutdown_signal().is_requested() {
        app.sync_labels();
        let status = status_line(app);
        backend.draw(|frame| render::draw(frame, &view, app.menus(), &status))?;

        if let Some(key) = backend.poll_key(POLL_INTERVAL)? {
            match view.handle_key(key, app.menus()) {
                MenuCommand::Dispatch(action) => dispatcher.dispatch(action),
                MenuCommand::Quit => app.shutdown_signal().request_shutdown(),
                MenuCommand::None => {}
            }
        }
    }
    Ok(())
}

fn status_line(app: &App) -> String {
    let midi = match app.midi_connected() {
        Some(port) if app.midi_enabled() => format!("MIDI: {}", port),
        Some(port) => format!("MIDI: {} (passthrough)", port),
        None => "MIDI: none".to_string(),
    };
    format!("{} | enter select | esc back | q quit", midi)
}
