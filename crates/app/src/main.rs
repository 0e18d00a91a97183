use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;

use course_core::format_duration;
use course_core::model::{ItemIndex, SectionNumber};
use services::ProgressService;
use storage::repository::Storage;
use ui::{ChartApp, DEFAULT_EXPORT_PATH, export_report, render_report, render_section};

//
// ─── ARGUMENTS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidIndex { raw: String },
    InvalidSection { raw: String },
    InvalidTimestamp { raw: String },
    MissingIndex,
    MissingSection,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidIndex { raw } => write!(f, "invalid video index: {raw}"),
            ArgsError::InvalidSection { raw } => write!(f, "invalid section number: {raw}"),
            ArgsError::InvalidTimestamp { raw } => {
                write!(f, "invalid --at value (expected RFC 3339): {raw}")
            }
            ArgsError::MissingIndex => write!(f, "a video index is required"),
            ArgsError::MissingSection => write!(f, "a section number is required"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- mark <index> [--at <rfc3339>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- unmark <index>               [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- report                       [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- section <number>             [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- monthly                      [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- pie                          [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- export [--out <path>]        [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:progress.sqlite3");
    eprintln!("  --out {DEFAULT_EXPORT_PATH}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Mark,
    Unmark,
    Report,
    Section,
    Monthly,
    Pie,
    Export,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "mark" => Some(Self::Mark),
            "unmark" => Some(Self::Unmark),
            "report" => Some(Self::Report),
            "section" => Some(Self::Section),
            "monthly" => Some(Self::Monthly),
            "pie" => Some(Self::Pie),
            "export" => Some(Self::Export),
            _ => None,
        }
    }

    fn takes_positional(self) -> bool {
        matches!(self, Self::Mark | Self::Unmark | Self::Section)
    }
}

struct Args {
    db_url: String,
    index: Option<ItemIndex>,
    section: Option<SectionNumber>,
    at: Option<DateTime<Utc>>,
    out: PathBuf,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("COURSE_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://progress.sqlite3".into(), normalize_sqlite_url),
            index: None,
            section: None,
            at: None,
            out: PathBuf::from(DEFAULT_EXPORT_PATH),
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--at" if cmd == Command::Mark => {
                    let value = require_value(args, "--at")?;
                    let at: DateTime<Utc> = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTimestamp { raw: value.clone() })?;
                    parsed.at = Some(at);
                }
                "--out" if cmd == Command::Export => {
                    parsed.out = PathBuf::from(require_value(args, "--out")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                positional if !positional.starts_with("--") && cmd.takes_positional() => {
                    match cmd {
                        Command::Section => {
                            let number: SectionNumber = positional.parse().map_err(|_| {
                                ArgsError::InvalidSection {
                                    raw: positional.to_string(),
                                }
                            })?;
                            parsed.section = Some(number);
                        }
                        _ => {
                            let index: ItemIndex = positional.parse().map_err(|_| {
                                ArgsError::InvalidIndex {
                                    raw: positional.to_string(),
                                }
                            })?;
                            parsed.index = Some(index);
                        }
                    }
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

//
// ─── DATABASE URL GLUE ─────────────────────────────────────────────────────────
//

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// SQLite refuses to open a missing database file unless asked to create
/// it, so touch the file (and its parent directory) before connecting.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn set_status(
    service: &ProgressService,
    args: &Args,
    done: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = args.index.ok_or(ArgsError::MissingIndex)?;
    let at = args.at.unwrap_or_else(|| service.now());
    let update = service.set_item_status_at(index, done, at).await?;

    let duration = format_duration(update.item.duration());
    if duration.is_empty() {
        println!("Video {}: {}", update.item.index(), update.item.title());
    } else {
        println!(
            "Video {}: {} ({duration})",
            update.item.index(),
            update.item.title()
        );
    }
    println!("Status: {}", if done { "done" } else { "not done" });
    println!();
    print!("{}", render_section(&update.section, true));

    Ok(())
}

fn run_chart(app: ChartApp) -> Result<(), Box<dyn std::error::Error>> {
    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    Ok(result?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: print the full report when no subcommand is given.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Report,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Report,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let service = ProgressService::new(&storage);

    match cmd {
        Command::Mark => set_status(&service, &args, true).await,
        Command::Unmark => set_status(&service, &args, false).await,
        Command::Report => {
            let report = service.overview().await?;
            print!("{}", render_report(&report));
            Ok(())
        }
        Command::Section => {
            let number = args.section.ok_or(ArgsError::MissingSection)?;
            let summary = service.section_progress(number).await?;
            print!("{}", render_section(&summary, true));
            Ok(())
        }
        Command::Monthly => {
            let totals = service.monthly().await?;
            run_chart(ChartApp::monthly(totals))
        }
        Command::Pie => {
            let split = service.completion_split().await?;
            run_chart(ChartApp::pie(split))
        }
        Command::Export => {
            let report = service.overview().await?;
            export_report(&report, &args.out)?;
            println!("Report exported to {}", args.out.display());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
