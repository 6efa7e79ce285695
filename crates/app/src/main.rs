use std::fmt;
use std::path::PathBuf;

use log::warn;
use quiz_core::model::{QuizDraft, QuizId};
use services::config::{API_TOKEN_ENV, API_URL_ENV, DEFAULT_API_URL};
use services::{ApiConfig, AppServices, Clock, ConfigError};

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    InvalidQuizId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid quiz id: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_quiz_id(raw: String) -> Result<QuizId, ArgsError> {
    QuizId::new(raw.clone()).map_err(|_| ArgsError::InvalidQuizId { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take    <quiz-id>            [options]");
    eprintln!("  cargo run -p app -- status  <quiz-id>            [options]");
    eprintln!("  cargo run -p app -- publish <draft.json> [--id <quiz-id>] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --api <url>      quiz service base url (default: http://localhost:5000/api)");
    eprintln!("  --token <token>  bearer token for the quiz service");
    eprintln!("  --db <url>       SQLite url for attempt markers (default: sqlite:quiz.sqlite3)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_API_URL, QUIZ_API_TOKEN, QUIZ_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Take(QuizId),
    Status(QuizId),
    Publish {
        path: PathBuf,
        quiz_id: Option<QuizId>,
    },
}

#[derive(Debug)]
struct Args {
    db_url: String,
    api_url: Option<String>,
    token: Option<String>,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into()),
        );
        let mut api_url = None;
        let mut token = None;
        let mut publish_id = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => api_url = Some(require_value(&mut args, "--api")?),
                "--token" => token = Some(require_value(&mut args, "--token")?),
                "--id" => publish_id = Some(parse_quiz_id(require_value(&mut args, "--id")?)?),
                "--help" | "-h" => return Ok(None),
                other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            Some("take") => Command::Take(parse_quiz_id(
                positional
                    .next()
                    .ok_or(ArgsError::MissingArgument { what: "quiz id" })?,
            )?),
            Some("status") => Command::Status(parse_quiz_id(
                positional
                    .next()
                    .ok_or(ArgsError::MissingArgument { what: "quiz id" })?,
            )?),
            Some("publish") => Command::Publish {
                path: positional
                    .next()
                    .map(PathBuf::from)
                    .ok_or(ArgsError::MissingArgument { what: "draft file" })?,
                quiz_id: publish_id,
            },
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            None => return Ok(None),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_url,
            api_url,
            token,
            command,
        }))
    }

    fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        resolve_api_config(
            self.api_url.as_deref(),
            self.token.clone(),
            std::env::var(API_URL_ENV).ok(),
            std::env::var(API_TOKEN_ENV).ok(),
        )
    }
}

/// Flags win over the environment; the environment url is only parsed when
/// no `--api` flag was given.
fn resolve_api_config(
    api_flag: Option<&str>,
    token_flag: Option<String>,
    env_url: Option<String>,
    env_token: Option<String>,
) -> Result<ApiConfig, ConfigError> {
    let base_url = match api_flag {
        Some(url) => url.to_owned(),
        None => env_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
    };
    ApiConfig::new(&base_url, token_flag.or(env_token))
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, parsed.api_config()?, Clock::default_clock())
            .await?;

    match parsed.command {
        Command::Take(quiz_id) => terminal::take_quiz(&services, &quiz_id).await,
        Command::Status(quiz_id) => {
            let attempted = services.sessions().has_attempted(&quiz_id).await?;
            if attempted {
                println!("quiz {quiz_id}: already attempted on this device");
            } else {
                println!("quiz {quiz_id}: not attempted yet");
            }
            Ok(())
        }
        Command::Publish { path, quiz_id } => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let draft: QuizDraft = serde_json::from_str(&raw)?;
            match services.authoring().save(quiz_id.as_ref(), &draft).await {
                Ok(outcome) => {
                    println!("{} ({})", outcome.message(), outcome.quiz_id());
                    Ok(())
                }
                Err(err) => {
                    warn!("saving {} failed: {err}", path.display());
                    eprintln!("Failed to save quiz");
                    Err(err.into())
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
