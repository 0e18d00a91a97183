use std::fmt;

use chrono::{DateTime, Duration, Utc};

use course_core::model::{Item, ItemIndex, Section, SectionNumber};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    done_through: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDoneThrough { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDoneThrough { raw } => {
                write!(f, "invalid --done-through value: {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("COURSE_DB_URL").unwrap_or_else(|_| "sqlite:progress.sqlite3".into());
        let mut done_through = 0;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--done-through" => {
                    let value = require_value(&mut args, "--done-through")?;
                    done_through = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidDoneThrough { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            done_through,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>       SQLite URL (default: sqlite:progress.sqlite3)");
    eprintln!("  --done-through <n>      Mark the first n videos done (default: 0)");
    eprintln!("  --now <rfc3339>         Fixed current time for deterministic seeding");
    eprintln!("  -h, --help              Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  COURSE_DB_URL");
}

// Section title, then (video title, minutes) per video.
const SAMPLE_COURSE: &[(&str, &[(&str, i64)])] = &[
    (
        "Section: PyTorch Fundamentals",
        &[
            ("Why deep learning", 14),
            ("Tensors from scratch", 31),
            ("Tensor operations", 26),
        ],
    ),
    (
        "Section: PyTorch Workflow",
        &[
            ("Preparing data", 22),
            ("Building a training loop", 38),
            ("Saving and loading models", 17),
        ],
    ),
    (
        "Section: Neural Network Classification",
        &[
            ("Classification inputs and outputs", 19),
            ("From logits to labels", 27),
        ],
    ),
];

/// SQLite will not create a missing database file on its own, so touch it
/// before connecting. In-memory URLs are left alone.
fn prepare_sqlite_file(db_url: &str) -> std::io::Result<()> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }
    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"))
        .unwrap_or(db_url);
    let path = path.split('?').next().unwrap_or(path);
    if !path.is_empty() && !std::path::Path::new(path).exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut index = 0u32;
    let mut total = 0u32;
    for (section_pos, (section_title, videos)) in SAMPLE_COURSE.iter().enumerate() {
        let number = SectionNumber::new(u32::try_from(section_pos)? + 1);
        let section = Section::new(number, *section_title)?;
        storage.sections.upsert_section(&section).await?;

        for (video_title, minutes) in *videos {
            index += 1;
            let mut item = Item::new(
                ItemIndex::new(index),
                number,
                *video_title,
                Duration::minutes(*minutes),
            )?;
            if index <= args.done_through {
                item.set_status(true, now - Duration::days(i64::from(args.done_through - index)));
            }
            storage.items.upsert_item(&item).await?;
            total += 1;
        }
    }

    println!(
        "Seeded {} sections and {} videos into {} ({} marked done)",
        SAMPLE_COURSE.len(),
        total,
        args.db_url,
        args.done_through.min(total)
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
