//! dialogbox
//!
//! Display a dialog from a shell script and report what the user did.
//!
//! # Architecture
//!
//! - Main thread: runs the egui window
//! - Background tokio runtime: SIGUSR1/SIGUSR2 listeners and the timeout tick
//! - A std channel bridges both into the window's frame loop
//! - Results go to stdout, diagnostics to stderr
//!
//! # Usage
//!
//! ```bash
//! dialogbox --entry --text "Name:"
//! dialogbox --progress --auto-close < <(for i in 0 50 100; do echo $i; sleep 1; done)
//! ```

use std::cell::RefCell;
use std::ffi::OsString;
use std::process::{Command, ExitCode};
use std::rc::Rc;
use std::sync::{mpsc, Arc};

use anyhow::Context;
use clap::error::ErrorKind;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dialogbox::cli;
use dialogbox::config::{DialogConfig, Mode, Settings};
use dialogbox::emission::SystemProcesses;
use dialogbox::error::DialogError;
use dialogbox::plug::PlugSlot;
use dialogbox::session::DialogSession;
use dialogbox::{embed, gui, modes, signals};

/// Exit status for command line errors
const EXIT_USAGE: u8 = 255;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    std::env::set_var("DIALOGBOX_PID", std::process::id().to_string());

    let argv: Vec<OsString> = std::env::args_os().collect();
    let env_options = std::env::var(cli::OPTIONS_ENV).ok();
    let (parsed, env_error) = cli::parse_args(argv, env_options.as_deref());

    let mut args = match parsed {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("{}", cli::usage_error(&e));
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Some(e) = env_error {
        warn!("{}, ignoring {}", e, cli::OPTIONS_ENV);
    }

    let settings = Settings::load();
    args.load_rest().context("Unable to read --rest file")?;
    let mut config = match args.into_config(&settings) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };
    debug!("Starting {:?} dialog", config.mode);

    match config.mode {
        Mode::Version => {
            println!("dialogbox {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
        Mode::Print => return Ok(print_file(&config)),
        _ => {}
    }

    if let Err(e) = select_backend(&mut config) {
        error!("{}", e);
        return Ok(ExitCode::FAILURE);
    }

    // Before any waiting: an unhandled SIGUSR1/SIGUSR2 would kill the process
    let rt = signals::runtime()?;
    let (tx, rx) = mpsc::channel();
    signals::install_signal_handlers(&rt, tx.clone())?;

    // A plug reports to its container only once the window exists, but the
    // container must be there first
    let plug = match config.embed.plug {
        Some(key) => Some(PlugSlot::attach(key, config.embed.tabnum, config.embed.wait)?),
        None => None,
    };

    let widget = modes::build(&config)?;
    let config = Arc::new(config);
    let session = Rc::new(RefCell::new(DialogSession::new(Arc::clone(&config), widget)));
    if config.termination.timeout > 0 {
        signals::start_ticker(&rt, tx);
    }

    gui::run(Rc::clone(&session), rx, plug)?;

    let outcome = session.borrow().finish();
    info!("Dialog ended with {}", outcome.code);
    if let Some(output) = &outcome.output {
        gui::emit(output);
    }
    session.borrow_mut().teardown(&SystemProcesses);
    rt.shutdown_background();

    Ok(outcome.code.into())
}

/// Pick the window system for modes that embed or get embedded.
///
/// These need X11. When both Wayland and X11 are reachable the X11 backend
/// is forced; without X11 plug mode is dropped and container modes fail.
fn select_backend(config: &mut DialogConfig) -> Result<(), DialogError> {
    let needs_x11 = config.mode.requires_x11() || config.is_plug();
    if !needs_x11 {
        return Ok(());
    }

    if embed::x11_available() {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            debug!("Forcing the X11 backend");
            std::env::remove_var("WAYLAND_DISPLAY");
        }
        return Ok(());
    }

    if config.mode.requires_x11() {
        return Err(DialogError::UnsupportedBackend(config.mode));
    }
    warn!("Plug mode needs an X11 display, running standalone");
    config.embed.plug = None;
    Ok(())
}

/// Hand `--filename` to the print spooler
fn print_file(config: &DialogConfig) -> ExitCode {
    let Some(path) = config.options.file.filename.as_deref() else {
        error!("Nothing to print, --filename is missing");
        return ExitCode::FAILURE;
    };
    match Command::new("lp").arg(path).status() {
        Ok(status) if status.success() => ExitCode::SUCCESS,
        Ok(status) => {
            warn!("lp exited with {}", status);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Unable to run lp: {}", e);
            ExitCode::FAILURE
        }
    }
}
