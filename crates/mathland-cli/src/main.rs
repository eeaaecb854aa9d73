//! Math Adventure Land CLI
//!
//! Interactive terminal front end: pick a level, operation, game and round
//! count, play the generated problems, and see the end screen.

mod console;
mod screens;

use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mathland_game::{
    ClassLevel, GameConfig, GameError, GameFlow, GameMode, Operation, Outcome, ProblemGenerator,
    Progress, Provider, Settings, ROUND_CHOICES,
};
use mathland_genai::{api_key_from_env, GeminiClient, OpenAiClient, TextGenerator};
use mathland_report::{json::JsonGenerator, GameSummary, MarkdownGenerator, Report, RoundSummary};
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::console::Console;

/// Math Adventure Land - AI-generated math games for primary school
///
/// Flags pre-fill the configuration screen; anything left out is asked
/// interactively.
#[derive(Parser, Debug)]
#[command(name = "mathland")]
#[command(version, about, long_about = None)]
struct Args {
    /// Class level (p1..p6)
    #[arg(short, long, value_name = "LEVEL")]
    level: Option<ClassLevel>,

    /// Operation (addition, subtraction, multiplication, division, mixed)
    #[arg(short, long, value_name = "OPERATION")]
    operation: Option<Operation>,

    /// Game mode (treasure_hunt, balloon_pop)
    #[arg(short, long, value_name = "MODE")]
    mode: Option<GameMode>,

    /// Number of rounds (5, 10 or 15)
    #[arg(short, long, value_name = "N", value_parser = parse_rounds)]
    rounds: Option<u32>,

    /// Path to settings file (default: mathland.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Seed for the balloon shuffle, for reproducible games
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Print the end-of-game report as JSON on stdout and exit
    #[arg(long)]
    json: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

/// How a single game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameEnd {
    /// All rounds were played.
    Finished,
    /// Ctrl+C or end of input.
    Quit,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, seed = ?args.seed, "Starting");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Runs configure, generate, play and summary until the player stops.
async fn run(args: Args) -> anyhow::Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let backend = build_backend(&settings)?;
    let generator = ProblemGenerator::from_settings(backend, &settings);
    tracing::debug!(?generator, "Generator ready");

    let mut console = Console::stdin(args.json);
    let mut flow = GameFlow::new().with_seed(args.seed);

    console.say(screens::WELCOME);

    loop {
        let Some(config) = configure(&mut console, &args, &settings).await? else {
            return Ok(());
        };

        if let Err(e) = flow.begin_generation(config) {
            console.say(format!("\n{e}"));
            continue;
        }

        console.say("\nGenerating your adventure...");
        let result = tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C during generation");
                return Ok(());
            }
            result = generator.generate(&config) => result,
        };

        if let Err(e) = flow.finish_generation(result) {
            console.say(format!("\n{e}"));
            if !should_reprompt(&args, &e) {
                anyhow::bail!("{e}");
            }
            continue;
        }

        console.say(format!("\n{}", screens::mode_intro(config.game_mode)));
        if play(&mut flow, &mut console, config.game_mode, settings.dwell()).await? == GameEnd::Quit {
            return Ok(());
        }

        let outcome = flow
            .outcome()
            .context("game finished without an outcome")?;
        let report = build_report(outcome)?;

        if args.json {
            JsonGenerator::new(&report).write_to(std::io::stdout().lock())?;
            return Ok(());
        }
        console.say(format!("\n{}\n", MarkdownGenerator::new(&report).generate()));

        let again = console.ask("Play again? [y/N] ").await?;
        if !again.is_some_and(|a| a.trim().eq_ignore_ascii_case("y")) {
            console.say("Thanks for playing!");
            return Ok(());
        }
        flow.restart()?;
    }
}

/// Plays every round of the current session.
async fn play<R: AsyncBufRead + Unpin>(
    flow: &mut GameFlow,
    console: &mut Console<R>,
    mode: GameMode,
    dwell: Duration,
) -> anyhow::Result<GameEnd> {
    let (tx, mut rx) = mpsc::channel::<mathland_game::DwellElapsed>(4);
    let mut timer = mathland_game::DwellTimer::new();
    let mut dwelling = false;

    let Some(view) = flow.view() else {
        anyhow::bail!("no game in progress");
    };
    console.say(screens::round(&view));
    console.prompt(screens::answer_prompt(&view));

    loop {
        tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                timer.cancel();
                tracing::info!("Received Ctrl+C, leaving game");
                return Ok(GameEnd::Quit);
            }
            Some(fired) = rx.recv(), if dwelling => {
                let Some(view) = flow.view() else {
                    return Ok(GameEnd::Finished);
                };
                if fired.round_index + 1 != view.round {
                    tracing::debug!(round_index = fired.round_index, "Ignoring stale dwell");
                    continue;
                }
                dwelling = false;
                match flow.advance()? {
                    Progress::NextRound => {
                        if let Some(view) = flow.view() {
                            console.say(screens::round(&view));
                            console.prompt(screens::answer_prompt(&view));
                        }
                    }
                    Progress::Complete(_) => return Ok(GameEnd::Finished),
                }
            }
            line = console.next_line(), if !dwelling => {
                let Some(line) = line? else {
                    timer.cancel();
                    return Ok(GameEnd::Quit);
                };
                match flow.submit(&line) {
                    Ok(feedback) => {
                        let Some(view) = flow.view() else {
                            continue;
                        };
                        console.say(screens::feedback(
                            mode,
                            feedback,
                            view.revealed_answer.unwrap_or_default(),
                        ));
                        timer.schedule(dwell, view.round - 1, tx.clone());
                        dwelling = true;
                    }
                    Err(GameError::RejectedInput(rejected)) => {
                        console.say(rejected);
                        if let Some(view) = flow.view() {
                            console.prompt(screens::answer_prompt(&view));
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
}

/// Fills in the configuration from flags, asking for anything missing.
///
/// Returns `None` when input ends.
async fn configure<R: AsyncBufRead + Unpin>(
    console: &mut Console<R>,
    args: &Args,
    settings: &Settings,
) -> anyhow::Result<Option<GameConfig>> {
    let defaults = settings.defaults;

    let level = match args.level {
        Some(level) => level,
        None => {
            console.say(screens::level_menu(defaults.level));
            match choose(console, &ClassLevel::ALL, defaults.level, |_| Ok(())).await? {
                Some(level) => level,
                None => return Ok(None),
            }
        }
    };

    let operation = match args.operation {
        Some(operation) => operation,
        None => {
            console.say(screens::operation_menu(defaults.operation));
            match choose(console, &Operation::ALL, defaults.operation, |_| Ok(())).await? {
                Some(operation) => operation,
                None => return Ok(None),
            }
        }
    };

    let game_mode = match args.mode {
        Some(mode) => mode,
        None => {
            console.say(screens::mode_menu(defaults.game_mode));
            let playable = |mode: GameMode| {
                if mode.is_enabled() {
                    Ok(())
                } else {
                    Err(format!("{mode} is coming soon! Pick another game."))
                }
            };
            match choose(console, &GameMode::ALL, defaults.game_mode, playable).await? {
                Some(mode) => mode,
                None => return Ok(None),
            }
        }
    };

    let rounds = match args.rounds {
        Some(rounds) => rounds,
        None => {
            console.say(screens::rounds_menu(defaults.rounds));
            let offered = |rounds: u32| {
                if ROUND_CHOICES.contains(&rounds) {
                    Ok(())
                } else {
                    Err(format!("Pick one of {ROUND_CHOICES:?} rounds."))
                }
            };
            match choose(console, &ROUND_CHOICES, defaults.rounds, offered).await? {
                Some(rounds) => rounds,
                None => return Ok(None),
            }
        }
    };

    Ok(Some(GameConfig::new(level, operation, game_mode, rounds)))
}

/// Asks until the player picks an acceptable item.
///
/// Accepts a menu number, a value the type can parse, or an empty line for
/// the default.
async fn choose<R, T>(
    console: &mut Console<R>,
    items: &[T],
    default: T,
    accept: impl Fn(T) -> Result<(), String>,
) -> anyhow::Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: Copy + FromStr,
{
    loop {
        let Some(line) = console.ask("> ").await? else {
            return Ok(None);
        };
        let input = line.trim();

        let picked = if input.is_empty() {
            Some(default)
        } else if let Some(item) = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| items.get(i))
        {
            Some(*item)
        } else {
            input.parse::<T>().ok()
        };

        match picked.map(|item| accept(item).map(|()| item)) {
            Some(Ok(item)) => return Ok(Some(item)),
            Some(Err(reason)) => console.say(reason),
            None => console.say(format!("'{input}' is not on the list, try again.")),
        }
    }
}

/// Returns `true` when every configuration field came from flags.
const fn all_fields_given(args: &Args) -> bool {
    args.level.is_some() && args.operation.is_some() && args.mode.is_some() && args.rounds.is_some()
}

/// Whether a failed generation sends the player back to the menus.
///
/// Failures that another attempt cannot fix end the program, as does any
/// failure when every field came from flags.
const fn should_reprompt(args: &Args, err: &GameError) -> bool {
    err.is_retryable() && !all_fields_given(args)
}

/// Parses `--rounds`, allowing only the offered round counts.
fn parse_rounds(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| ROUND_CHOICES.contains(n))
        .ok_or_else(|| format!("rounds must be one of {ROUND_CHOICES:?}"))
}

/// Loads settings from the specified path or default location.
fn load_settings(config_path: Option<&str>) -> anyhow::Result<Settings> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Settings file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Settings::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Settings::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Creates the text-generation client named in the settings.
fn build_backend(settings: &Settings) -> anyhow::Result<Box<dyn TextGenerator>> {
    let api_key = api_key_from_env(&settings.api_key_env).map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\nSuggestion: Export {} or add it to a .env file",
            settings.api_key_env
        )
    })?;
    let timeout = settings.request_timeout();

    tracing::info!(
        provider = ?settings.provider,
        model = %settings.model,
        base_url = ?settings.base_url,
        "Creating text-generation client"
    );

    let backend: Box<dyn TextGenerator> = match settings.provider {
        Provider::Gemini => {
            let mut client = GeminiClient::new(api_key, &settings.model, timeout)?;
            if let Some(base_url) = &settings.base_url {
                client = client.with_base_url(base_url);
            }
            Box::new(client)
        }
        Provider::OpenAi => {
            let mut client = OpenAiClient::new(api_key, &settings.model, timeout)?;
            if let Some(base_url) = &settings.base_url {
                client = client.with_base_url(base_url);
            }
            Box::new(client)
        }
    };
    Ok(backend)
}

/// Converts a game outcome into the report crate's types.
fn build_report(outcome: &Outcome) -> anyhow::Result<Report> {
    let config = outcome.config;
    let report = Report::builder()
        .game(GameSummary {
            level: config.level.title().to_string(),
            operation: config.operation.title().to_string(),
            mode: config.game_mode.to_string(),
        })
        .score(outcome.score, outcome.total)
        .rounds(
            outcome
                .rounds
                .iter()
                .map(|r| RoundSummary {
                    round: r.round,
                    question: r.question.clone(),
                    answer: r.answer,
                    submitted: r.submitted,
                    correct: r.correct,
                })
                .collect(),
        )
        .timing(outcome.started_at, outcome.finished_at)
        .build()?;
    Ok(report)
}
