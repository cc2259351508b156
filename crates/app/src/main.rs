use std::fmt;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use quiz_core::model::{LogSort, PERSONALITY_QUESTIONS, QuizId, UserId};
use quiz_services::{
    AppServices, AuthProvider, Clock, FileQuestionSource, HttpQuestionSource, LocalAuth,
    QuestionSource, format_played_on,
};

use crate::logs::{LogFields, LogsAction, parse_amount, parse_date};

mod browse;
mod logs;
mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidQuiz { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDate { raw: String },
    InvalidLogId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid user id: {raw}"),
            ArgsError::InvalidQuiz { raw } => {
                write!(f, "unknown quiz: {raw} (expected lives or progress)")
            }
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDate { raw } => write!(f, "invalid date: {raw} (expected YYYY-MM-DD)"),
            ArgsError::InvalidLogId { raw } => write!(f, "invalid log id: {raw}"),
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
    eprintln!("  poker-quiz play        [--quiz lives|progress] [--seed <n>]");
    eprintln!("  poker-quiz leaderboard [--quiz lives|progress] [--limit <n>]");
    eprintln!("  poker-quiz history     [--quiz lives|progress]");
    eprintln!("  poker-quiz personality");
    eprintln!("  poker-quiz questions");
    eprintln!("  poker-quiz logs [list] [--by-pnl]");
    eprintln!("  poker-quiz logs add    --date <YYYY-MM-DD> --buy-in <amt> --small-blind <amt>");
    eprintln!("                         --big-blind <amt> --cash-out <amt> [--notes <text>]");
    eprintln!("  poker-quiz logs show   <log id>");
    eprintln!("  poker-quiz logs delete <log id>");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>        default sqlite:poker-quiz.sqlite3");
    eprintln!("  --questions <url|path>   default data/questions.json");
    eprintln!("  --user <uuid>            play signed in as this user");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  POKER_QUIZ_DB_URL, POKER_QUIZ_QUESTIONS, POKER_QUIZ_USER_ID, POKER_QUIZ_MODE");
    eprintln!("  RUST_LOG (default info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Leaderboard,
    History,
    Personality,
    Questions,
    Logs,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "leaderboard" => Some(Self::Leaderboard),
            "history" => Some(Self::History),
            "personality" => Some(Self::Personality),
            "questions" => Some(Self::Questions),
            "logs" => Some(Self::Logs),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    questions: String,
    user: Option<UserId>,
    quiz: QuizId,
    limit: Option<u32>,
    seed: Option<u64>,
    sort: LogSort,
    log: LogFields,
}

fn parse_quiz(raw: &str) -> Result<QuizId, ArgsError> {
    match raw.trim() {
        "lives" | "quiz-one" | "1" => Ok(QuizId::quiz_one()),
        "progress" | "quiz-two" | "2" => Ok(QuizId::quiz_two()),
        _ => Err(ArgsError::InvalidQuiz { raw: raw.into() }),
    }
}

fn parse_user(raw: &str) -> Result<UserId, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidUserId { raw: raw.into() })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("POKER_QUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("poker-quiz.sqlite3".into()), normalize_sqlite_url);
        let mut questions = std::env::var("POKER_QUIZ_QUESTIONS")
            .unwrap_or_else(|_| "data/questions.json".into());
        let mut user = std::env::var("POKER_QUIZ_USER_ID")
            .ok()
            .map(|raw| parse_user(&raw))
            .transpose()?;
        let mut quiz = std::env::var("POKER_QUIZ_MODE")
            .ok()
            .map(|raw| parse_quiz(&raw))
            .transpose()?
            .unwrap_or_else(QuizId::quiz_one);
        let mut limit = None;
        let mut seed = None;
        let mut sort = LogSort::Date;
        let mut log = LogFields::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => questions = require_value(args, "--questions")?,
                "--user" => user = Some(parse_user(&require_value(args, "--user")?)?),
                "--quiz" => quiz = parse_quiz(&require_value(args, "--quiz")?)?,
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = Some(value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--limit",
                        raw: value.clone(),
                    })?);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--seed",
                        raw: value.clone(),
                    })?);
                }
                "--by-pnl" => sort = LogSort::Pnl,
                "--date" => log.played_on = Some(parse_date(&require_value(args, "--date")?)?),
                "--buy-in" => {
                    log.buy_in = Some(parse_amount("--buy-in", &require_value(args, "--buy-in")?)?);
                }
                "--small-blind" => {
                    let value = require_value(args, "--small-blind")?;
                    log.small_blind = Some(parse_amount("--small-blind", &value)?);
                }
                "--big-blind" => {
                    let value = require_value(args, "--big-blind")?;
                    log.big_blind = Some(parse_amount("--big-blind", &value)?);
                }
                "--cash-out" => {
                    let value = require_value(args, "--cash-out")?;
                    log.cash_out = Some(parse_amount("--cash-out", &value)?);
                }
                "--notes" => log.notes = Some(require_value(args, "--notes")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions,
            user,
            quiz,
            limit,
            seed,
            sort,
            log,
        })
    }

    fn question_source(&self) -> Result<Arc<dyn QuestionSource>, Box<dyn std::error::Error>> {
        if self.questions.starts_with("http://") || self.questions.starts_with("https://") {
            Ok(Arc::new(HttpQuestionSource::new(&self.questions)?))
        } else {
            Ok(Arc::new(FileQuestionSource::new(&self.questions)))
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();

    let first = argv.peek().cloned();
    let cmd = match first.as_deref() {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            cmd
        }
    };

    let logs_action = match cmd {
        Command::Logs => LogsAction::parse(&mut argv).map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?,
        _ => LogsAction::List,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let auth: Arc<dyn AuthProvider> = Arc::new(match parsed.user {
        Some(user) => LocalAuth::signed_in(user),
        None => LocalAuth::anonymous(),
    });
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::system(), parsed.question_source()?, auth)
            .await?;
    tracing::debug!(db = %parsed.db_url, command = ?cmd, "storage ready");

    match cmd {
        Command::Play => {
            let service = services
                .quiz(&parsed.quiz)
                .ok_or_else(|| ArgsError::InvalidQuiz {
                    raw: parsed.quiz.to_string(),
                })?;
            let service = match parsed.seed {
                Some(_) => Arc::new((*service).clone().with_shuffle_seed(parsed.seed)),
                None => service,
            };
            play::play(service).await
        }
        Command::Leaderboard => {
            let entries = services.leaderboard().top(&parsed.quiz, parsed.limit).await?;
            if entries.is_empty() {
                println!("No scores yet for {}.", parsed.quiz);
            }
            for entry in entries {
                println!("{:>3}. {:<24} {}", entry.rank, entry.display_name, entry.score);
            }
            Ok(())
        }
        Command::History => {
            let user = services.auth().state().user();
            match services.history().history(user, &parsed.quiz).await? {
                Some(history) => println!(
                    "{}: best score {}, last played {}",
                    history.quiz_id,
                    history.best_score,
                    format_played_on(history.last_played)
                ),
                None if user.is_none() => println!("Sign in to see your history."),
                None => println!("You haven't played {} yet.", parsed.quiz),
            }
            Ok(())
        }
        Command::Personality => run_personality(&services).await,
        Command::Questions => {
            browse::print_questions(&parsed.question_source()?.load().await?);
            Ok(())
        }
        Command::Logs => {
            logs::run_logs(&services.companion(), logs_action, parsed.log, parsed.sort).await
        }
    }
}

async fn run_personality(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let personality = services.personality();
    let mut session = personality.begin();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(question) = session.current_question() {
        println!();
        println!(
            "Question {}/{}: {}",
            session.answered() + 1,
            PERSONALITY_QUESTIONS.len(),
            question.prompt
        );
        for (i, answer) in question.answers.iter().enumerate() {
            println!("  {}. {}", i + 1, answer.text);
        }

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let choice = line.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1));
        match choice.map(|idx| session.choose(idx)) {
            Some(Ok(_)) => {}
            Some(Err(err)) => println!("{err}"),
            None => println!("Pick a number between 1 and {}.", question.answers.len()),
        }
    }

    let result = session.result()?;
    for kind in result.top() {
        println!();
        println!("You are a {kind}.");
        println!("{}", kind.description());
    }

    match personality.save(&session).await {
        Ok(_) => {}
        Err(quiz_services::PersonalityServiceError::LoginRequired) => {
            println!("Sign in (set POKER_QUIZ_USER_ID) to save your result.");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_aliases_resolve() {
        assert_eq!(parse_quiz("lives").unwrap(), QuizId::quiz_one());
        assert_eq!(parse_quiz("quiz-two").unwrap(), QuizId::quiz_two());
        assert!(matches!(parse_quiz("blitz"), Err(ArgsError::InvalidQuiz { .. })));
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert!(normalize_sqlite_url("quiz.db".into()).starts_with("sqlite:///"));
    }

    #[test]
    fn flags_override_defaults() {
        let mut argv = ["--quiz", "progress", "--limit", "5", "--by-pnl"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(&mut argv).unwrap();
        assert_eq!(args.quiz, QuizId::quiz_two());
        assert_eq!(args.limit, Some(5));
        assert_eq!(args.sort, LogSort::Pnl);

        let mut argv = [
            "--date", "2024-03-01", "--buy-in", "$100", "--small-blind", "1",
            "--big-blind", "2", "--cash-out", "180.25", "--notes", "deep stacks",
        ]
        .into_iter()
        .map(String::from);
        let draft = Args::parse(&mut argv).unwrap().log.into_draft().unwrap();
        assert_eq!(draft.buy_in, 100.0);
        assert_eq!(draft.cash_out, 180.25);
        assert_eq!(draft.notes.as_deref(), Some("deep stacks"));

        let mut bad = ["--date", "yesterday"].into_iter().map(String::from);
        assert!(matches!(Args::parse(&mut bad), Err(ArgsError::InvalidDate { .. })));

        let mut bad = ["--limit"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut bad),
            Err(ArgsError::MissingValue { flag: "--limit" })
        ));
    }
}
