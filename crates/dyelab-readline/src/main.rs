use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use dyelab_application::{ConversationUseCase, TurnResponse, build_usecase};
use dyelab_core::requirements::{CompletenessChecker, RequirementsRecord};
use dyelab_core::session::ConversationState;
use dyelab_infrastructure::{ConfigService, init_logging};

const COMMANDS: [&str; 2] = ["/new", "/record"];

/// Interactive dye colour prediction chat.
#[derive(Parser)]
#[command(name = "dyelab-chat", version)]
struct Args {
    /// Config file (defaults to ~/.config/dyelab/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model artifact, overriding the configured path
    #[arg(long)]
    model: Option<PathBuf>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_turn(turn: &TurnResponse) {
    let colour = |line: &str| match turn.state {
        ConversationState::Predicted => line.bright_green().bold(),
        ConversationState::Failed => line.bright_red(),
        _ if line.starts_with("Ignored:") => line.yellow(),
        _ => line.bright_blue(),
    };
    for line in turn.response.lines() {
        println!("{}", colour(line));
    }
    if turn.is_finished() {
        println!(
            "{}",
            "Session finished. Describe another recipe to start over.".bright_black()
        );
    }
}

fn print_record(record: &RequirementsRecord) {
    println!("{}", format!("Gathered: {}", record.summary()).bright_black());
    let check = CompletenessChecker::check(record);
    if !check.complete {
        println!(
            "{}",
            format!("Still missing: {}", check.missing_names().join(", ")).bright_black()
        );
    }
}

async fn handle_command(usecase: &ConversationUseCase, session: &mut Option<String>, command: &str) {
    match command {
        "/new" => {
            if let Some(id) = session.take() {
                if let Err(e) = usecase.end_session(&id).await {
                    eprintln!("{}", format!("Error: {}", e).red());
                }
            }
            println!("{}", "Started a new session.".bright_green());
        }
        "/record" => {
            let record = match session.as_deref() {
                Some(id) => usecase.requirements(id).await,
                None => Ok(None),
            };
            match record {
                Ok(Some(record)) => print_record(&record),
                Ok(None) => println!("{}", "No active session.".bright_black()),
                Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
            }
        }
        other => println!("{}", format!("Unknown command: {}", other).bright_black()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigService::load(args.config.as_deref()).context("failed to load config")?;
    if let Some(model) = args.model {
        config.model.path = Some(model);
    }
    init_logging(&config.logging.level);

    let usecase = build_usecase(&config).context("failed to set up the conversation")?;
    if let Err(e) = usecase.pipeline().warm_up().await {
        println!("{}", format!("Warning: {}", e).yellow());
        println!(
            "{}",
            "Requirements can still be gathered; prediction will retry the model.".bright_black()
        );
    }

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== Dyelab Colour Predictor ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe your recipe. '/new' starts over, '/record' shows what I have, 'quit' exits."
            .bright_black()
    );
    println!();

    let mut session: Option<String> = None;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    handle_command(&usecase, &mut session, trimmed).await;
                    continue;
                }

                tracing::debug!("[Chat] Sending turn for session {:?}", session);
                match usecase.start_or_resume(session.clone(), trimmed).await {
                    Ok(turn) => {
                        print_turn(&turn);
                        session = if turn.is_finished() {
                            None
                        } else {
                            Some(turn.session_id)
                        };
                    }
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
