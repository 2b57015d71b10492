use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use ghostfile::cli::{Cli, Command};
use ghostfile::core::{
    MirrorStatus, WalkOptions, normalize_path, progress_bar, root_display_name, write_tree,
};
use ghostfile::events::{self, Event, LogMessage, TaskKind};
use ghostfile::fs::RealFileSystem;
use ghostfile::models::{DirTree, ScanResult};
use ghostfile::{Session, SessionOptions};

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Scan {
            source,
            exclude,
            sort,
            no_tree,
        } => run_scan(source, exclude, sort, no_tree).await,
        Command::Mirror {
            source,
            destination,
            exclude,
            quiet,
        } => run_mirror(source, destination, exclude, quiet).await,
    }
}

/// Log lines already reach the console as events, and each error line is
/// also a `warn!`, so diagnostics stay at ERROR unless asked for.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::ERROR };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

async fn run_scan(
    raw_source: Option<PathBuf>,
    exclude: Option<String>,
    sort: bool,
    no_tree: bool,
) -> ExitCode {
    let (root_path, is_current_dir) = match raw_source {
        None => (PathBuf::from("."), true),
        Some(raw) => {
            let is_current_dir = raw == Path::new(".");
            (raw, is_current_dir)
        }
    };
    let source = match resolve_source(&root_path) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let (events, mut queue) = events::channel();
    let options = SessionOptions {
        walk: WalkOptions { exclude },
        build_tree: !no_tree,
    };
    let mut session = match Session::new(RealFileSystem, options, events) {
        Ok(session) => session,
        Err(err) => return report("--exclude", format!("{err:#}")),
    };
    let mut console = Console::new(io::stderr().is_terminal(), false);

    session.select_source(&source);

    let mut outstanding = if no_tree { 1 } else { 2 };
    let mut scan: Option<ScanResult> = None;
    let mut tree: Option<DirTree> = None;
    while outstanding > 0 {
        let Some(event) = queue.next().await else {
            break;
        };
        session.handle(&event);
        match event {
            Event::Log(message) => console.log(&message, false),
            Event::Status(text) => console.status(text),
            Event::ScanFinished(result) => {
                scan = Some(result);
                outstanding -= 1;
            }
            Event::TreeReady(built) => {
                tree = Some(built);
                outstanding -= 1;
            }
            Event::TaskFailed(_) => outstanding -= 1,
            _ => {}
        }
    }
    console.finish();

    let mut stdout = io::stdout().lock();
    if let Some(tree) = tree {
        let tree = if sort { tree.sorted() } else { tree };
        let label = root_display_name(&root_path, is_current_dir);
        if let Err(err) = write_tree(&mut stdout, &label, &tree) {
            return report("stdout", err);
        }
    }
    match scan {
        Some(scan) => match writeln!(stdout, "{}", scan.status_line()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report("stdout", err),
        },
        None => ExitCode::FAILURE,
    }
}

async fn run_mirror(
    source: PathBuf,
    destination: PathBuf,
    exclude: Option<String>,
    quiet: bool,
) -> ExitCode {
    let source = match resolve_source(&source) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let destination = resolve_destination(&destination);

    let (events, mut queue) = events::channel();
    let options = SessionOptions {
        walk: WalkOptions { exclude },
        build_tree: false,
    };
    let mut session = match Session::new(RealFileSystem, options, events) {
        Ok(session) => session,
        Err(err) => return report("--exclude", format!("{err:#}")),
    };
    let mut console = Console::new(!quiet && io::stderr().is_terminal(), true);

    session.select_source(&source);
    session.select_destination(&destination);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut started = false;

    loop {
        let event = tokio::select! {
            event = queue.next() => event,
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if !started {
                    console.finish();
                    return ExitCode::from(EXIT_INTERRUPTED);
                }
                session.cancel();
                continue;
            }
        };
        let Some(event) = event else {
            return ExitCode::FAILURE;
        };
        session.handle(&event);

        match event {
            Event::Log(message) => console.log(&message, true),
            Event::Status(text) => console.status(text),
            Event::Progress(fraction) => console.progress(fraction),
            Event::ScanFinished(_) | Event::TaskFailed(TaskKind::Scan) if !started => {
                started = true;
                if let Err(err) = session.execute() {
                    console.finish();
                    return report("mirror", err);
                }
            }
            Event::MirrorFinished(outcome) => {
                console.finish();
                return match outcome.status {
                    MirrorStatus::Completed => ExitCode::SUCCESS,
                    MirrorStatus::Cancelled => ExitCode::from(EXIT_INTERRUPTED),
                    MirrorStatus::Rejected | MirrorStatus::Failed => ExitCode::FAILURE,
                };
            }
            _ => {}
        }
    }
}

fn resolve_source(path: &Path) -> Result<PathBuf, ExitCode> {
    let metadata = std::fs::metadata(path).map_err(|err| report(path.display(), err))?;
    if !metadata.is_dir() {
        return Err(report(path.display(), "Not a directory"));
    }
    std::fs::canonicalize(path).map_err(|err| report(path.display(), err))
}

/// The destination may not exist yet. Canonicalize its deepest existing
/// ancestor and append the rest, so symlinked parents and `..` resolve the
/// same way they do for the source.
fn resolve_destination(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    for ancestor in absolute.ancestors() {
        let Ok(base) = std::fs::canonicalize(ancestor) else {
            continue;
        };
        let rest = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
        return normalize_path(&base.join(rest));
    }
    normalize_path(&absolute)
}

fn report(subject: impl Display, err: impl Display) -> ExitCode {
    eprintln!("ghostfile: {subject}: {err}");
    ExitCode::from(1)
}

/// Terminal rendering of the event stream: log lines scroll, while status
/// and progress share a single redrawn line on stderr when it is a terminal.
struct Console {
    live: bool,
    with_bar: bool,
    status: String,
    fraction: f64,
    drawn: bool,
}

impl Console {
    fn new(live: bool, with_bar: bool) -> Self {
        Self {
            live,
            with_bar,
            status: String::new(),
            fraction: 0.0,
            drawn: false,
        }
    }

    fn log(&mut self, message: &LogMessage, to_stdout: bool) {
        self.clear();
        if to_stdout {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
        self.redraw();
    }

    fn status(&mut self, text: String) {
        self.status = text;
        self.redraw();
    }

    fn progress(&mut self, fraction: f64) {
        self.fraction = fraction;
        self.redraw();
    }

    fn finish(&mut self) {
        if self.drawn {
            eprintln!();
            self.drawn = false;
        }
    }

    fn clear(&mut self) {
        if self.drawn {
            eprint!("\r\x1b[2K");
            self.drawn = false;
        }
    }

    fn redraw(&mut self) {
        if !self.live || self.status.is_empty() {
            return;
        }
        if self.with_bar {
            eprint!(
                "\r\x1b[2K{} {}",
                progress_bar(self.fraction, 30),
                self.status
            );
        } else {
            eprint!("\r\x1b[2K{}", self.status);
        }
        self.drawn = true;
    }
}
