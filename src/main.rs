//! Command-line host that highlights files in a terminal.
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tint::ansi;
use tint::canvas::Canvas;
use tint::config::Configuration;
use tint::error::Result;
use tint::io;
use tint::opt::Options;
use tint::schedule::{Cycle, Host, PollTimer, TimerHandle};
use tint::session::Session;
use tint::syntax::Mode;
use tint::sys;
use tint::watch::{FileWatcher, Status};
use tracing_subscriber::EnvFilter;

/// Usage documentation for display to terminal.
const USAGE: &str = include_str!("include/usage.in");

// Version and build information.
const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_HASH: &str = env!("BUILD_HASH");
const BUILD_DATE: &str = env!("BUILD_DATE");

/// Maximum time spent waiting for the first cycle of a document to be applied.
const FIRST_CYCLE_LIMIT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Err(e) => {
            println!("{e}");
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

/// Logs to `stderr`, filtered by `RUST_LOG` and defaulting to warnings.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let opts = Options::parse(std::env::args().skip(1))?;
    if opts.version {
        println!("{PACKAGE_NAME} {PACKAGE_VERSION} ({BUILD_HASH} {BUILD_DATE})");
        Ok(())
    } else if opts.help || opts.files.is_empty() {
        println!("{USAGE}");
        Ok(())
    } else {
        run_opts(&opts)
    }
}

fn run_opts(opts: &Options) -> Result<()> {
    // Load optional configuration from either standard location or path specified on
    // command line, and apply command line options afterwards since these override
    // all other settings.
    let mut config = if opts.bare {
        Configuration::default()
    } else if let Some(ref config_path) = opts.config_path {
        Configuration::load_file(config_path)?
    } else {
        Configuration::load()?
    };
    config.apply_opts(opts);

    if opts.watch {
        if opts.files.len() > 1 {
            tracing::warn!("watching only {}", opts.files[0]);
        }
        watch(opts, &config, &opts.files[0])
    } else {
        for (i, file) in opts.files.iter().enumerate() {
            if opts.files.len() > 1 {
                if i > 0 {
                    println!();
                }
                println!("==> {} <==", sys::pretty_path(file));
            }
            let canvas = highlight(opts, &config, file)?;
            show(opts, &canvas);
        }
        Ok(())
    }
}

fn mode_of(opts: &Options, config: &Configuration, file: &str) -> Mode {
    opts.mode
        .unwrap_or_else(|| Mode::detect(config.settings.variant, Some(Path::new(file))))
}

/// Runs highlight cycles against `file` until markers are first applied.
fn highlight(opts: &Options, config: &Configuration, file: &str) -> Result<Canvas> {
    let text = io::read_file(file)?;
    let mut canvas = Canvas::new(mode_of(opts, config, file), &text);
    let mut session = Session::new(config)?;
    let mut timer = PollTimer::new();
    session.start(&mut timer);

    let limit = Instant::now() + FIRST_CYCLE_LIMIT;
    while Instant::now() < limit {
        let Some(handle) = wait(&mut timer) else {
            break;
        };
        if session.tick(handle, &mut canvas, &mut timer) == Cycle::Applied {
            break;
        }
    }
    let stats = session.close(&mut timer);
    tracing::debug!(file, ?stats, "highlighted");
    Ok(canvas)
}

/// Repaints `file` whenever it changes until it is removed.
fn watch(opts: &Options, config: &Configuration, file: &str) -> Result<()> {
    let text = io::read_file(file)?;
    let watcher = FileWatcher::new(file)?;
    let mut canvas = Canvas::new(mode_of(opts, config, file), &text);
    let mut session = Session::new(config)?;
    let mut timer = PollTimer::new();
    let mut painted = None;
    session.start(&mut timer);

    while let Some(handle) = wait(&mut timer) {
        match watcher.poll() {
            Status::Unchanged => {}
            Status::Modified => match io::read_file(file) {
                Ok(text) => {
                    canvas.set_text(&text);
                }
                Err(e) => tracing::warn!("{e}"),
            },
            Status::Removed => {
                tracing::info!(file, "removed");
                break;
            }
        }
        let cycle = session.tick(handle, &mut canvas, &mut timer);
        if cycle == Cycle::Applied && painted != Some(canvas.revision()) {
            painted = Some(canvas.revision());
            print!("{}", ansi::clear_screen());
            show(opts, &canvas);
        }
    }
    let stats = session.close(&mut timer);
    tracing::debug!(file, ?stats, "stopped watching");
    Ok(())
}

/// Sleeps until the pending wake-up of `timer` is due, returning its handle, or
/// returns `None` if nothing is pending.
fn wait(timer: &mut PollTimer) -> Option<TimerHandle> {
    let deadline = timer.deadline()?;
    let now = Instant::now();
    if deadline > now {
        thread::sleep(deadline - now);
    }
    timer.due(Instant::now())
}

fn show(opts: &Options, canvas: &Canvas) {
    if opts.spans {
        print!("{}", canvas.spans());
    } else {
        let out = canvas.render();
        print!("{out}");
        if !out.ends_with('\n') {
            println!();
        }
    }
}
