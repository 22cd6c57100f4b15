//! # Kickoff CLI
//!
//! Command-line interface for creating, joining and settling football
//! prediction events backed by a local JSON state file.

mod store;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use kickoff_core::{
    format_timestamp, AwardReceipt, Event, EventId, EventStatus, Identity, NewEvent, Outcome,
    PredictionError, RegistryConfig, UserStats,
};
use std::path::PathBuf;
use std::process::ExitCode;
use store::StateFile;

#[derive(Parser)]
#[command(name = "kickoff")]
#[command(about = "Access-coded football prediction events with oracle settlement")]
#[command(version)]
struct Cli {
    /// Identity the command is issued as
    #[arg(long = "as", global = true, env = "KICKOFF_CALLER")]
    caller: Option<String>,

    /// Path of the JSON state file
    #[arg(long, global = true, env = "KICKOFF_STORE", default_value = "kickoff-state.json")]
    store: PathBuf,

    /// Log filter (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "KICKOFF_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new prediction event
    Create {
        /// Event name
        #[arg(short, long)]
        name: String,
        /// Access code participants must present
        #[arg(short, long)]
        code: String,
        /// Home team
        #[arg(long)]
        home: String,
        /// Away team
        #[arg(long)]
        away: String,
        /// Match time (Unix timestamp)
        #[arg(short, long)]
        match_time: u64,
        /// Identity allowed to submit the result
        #[arg(short, long)]
        oracle: String,
    },
    /// Stop accepting predictions (creator only)
    Close { event_id: u64 },
    /// Replace the oracle of an unsettled event (creator only)
    UpdateOracle { event_id: u64, oracle: String },
    /// Report the final outcome of a closed event (oracle only)
    SubmitResult {
        event_id: u64,
        /// home, draw or away (or 1, 2, 3)
        outcome: Outcome,
    },
    /// Submit a prediction for an open event
    Join {
        event_id: u64,
        /// home, draw or away (or 1, 2, 3)
        outcome: Outcome,
        /// Access code; prompted for when omitted
        #[arg(short, long)]
        code: Option<String>,
    },
    /// Convert a settled prediction into points
    Award { event_id: u64, participant: String },
    /// Show one event
    Event { event_id: u64 },
    /// List events
    Events {
        /// Only events with this status (open, closed, settled)
        #[arg(short, long)]
        status: Option<EventStatus>,
    },
    /// Show a participant's prediction for an event
    Prediction {
        event_id: u64,
        /// Defaults to the calling identity
        participant: Option<String>,
    },
    /// Show a participant's leaderboard statistics
    Stats {
        /// Defaults to the calling identity
        participant: Option<String>,
    },
    /// Show the global leaderboard
    Leaderboard {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&cli.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PredictionError>() {
                Some(domain) => eprintln!(
                    "{} [{}]: {}",
                    "Error".red().bold(),
                    domain.code(),
                    domain
                ),
                None => eprintln!("{}: {:#}", "Error".red().bold(), err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut state = store::load(&cli.store, || {
        RegistryConfig::from_env().context("Failed to read registry configuration")
    })?;

    let mutated = match cli.command {
        Commands::Create {
            name,
            code,
            home,
            away,
            match_time,
            oracle,
        } => {
            let ctx = state.tick(require_caller(&cli.caller)?)?;
            let id = state.book.create_event(
                NewEvent {
                    name,
                    access_code: code,
                    home_team: home,
                    away_team: away,
                    match_time,
                    oracle: Identity::from(oracle),
                },
                &ctx,
            )?;

            println!("{}", "Event Created Successfully!".green().bold());
            if let Some(event) = state.book.get_event(id) {
                print_event(event);
            }
            println!("{}", "Share the access code with participants.".bright_blue());
            true
        }

        Commands::Close { event_id } => {
            let ctx = state.tick(require_caller(&cli.caller)?)?;
            state.book.close_event(EventId(event_id), &ctx)?;
            println!("{} {}", "Closed event".green().bold(), event_id.to_string().cyan());
            true
        }

        Commands::UpdateOracle { event_id, oracle } => {
            let ctx = state.tick(require_caller(&cli.caller)?)?;
            state
                .book
                .update_oracle(EventId(event_id), Identity::from(oracle.as_str()), &ctx)?;
            println!(
                "{} {} is now {}",
                "Oracle for event".green().bold(),
                event_id.to_string().cyan(),
                oracle.yellow()
            );
            true
        }

        Commands::SubmitResult { event_id, outcome } => {
            let ctx = state.tick(require_caller(&cli.caller)?)?;
            state.book.submit_result(EventId(event_id), outcome, &ctx)?;
            println!(
                "{} {}: {}",
                "Settled event".green().bold(),
                event_id.to_string().cyan(),
                outcome.to_string().yellow()
            );
            true
        }

        Commands::Join {
            event_id,
            outcome,
            code,
        } => {
            let caller = require_caller(&cli.caller)?;
            let code = match code {
                Some(code) => code,
                None => inquire::Password::new("Access code:")
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read access code")?,
            };
            let ctx = state.tick(caller)?;
            state
                .book
                .join_event(EventId(event_id), &code, outcome, &ctx)?;
            println!(
                "{} event {} predicting {}",
                "Joined".green().bold(),
                event_id.to_string().cyan(),
                outcome.to_string().yellow()
            );
            true
        }

        Commands::Award {
            event_id,
            participant,
        } => {
            let ctx = state.tick(require_caller(&cli.caller)?)?;
            let receipt = state.book.award_points(
                EventId(event_id),
                &Identity::from(participant.as_str()),
                &ctx,
            )?;
            print_receipt(&participant, &receipt);
            true
        }

        Commands::Event { event_id } => {
            let event = state
                .book
                .get_event(EventId(event_id))
                .ok_or_else(|| PredictionError::NotFound(format!("event {event_id}")))?;
            print_event(event);
            let predictions = state.book.predictions_for_event(event.id);
            println!("{}: {}", "Predictions".yellow().bold(), predictions.len());
            false
        }

        Commands::Events { status } => {
            let events: Vec<&Event> = match status {
                Some(status) => state.book.events_by_status(status).collect(),
                None => state.book.events().collect(),
            };
            if events.is_empty() {
                println!("{}", "No events.".bright_black());
            }
            for event in events {
                println!(
                    "{:>4}  {:<8} {}  {}",
                    event.id.to_string().cyan(),
                    status_label(event.status()),
                    event.name.bold(),
                    event.fixture().bright_black()
                );
            }
            false
        }

        Commands::Prediction {
            event_id,
            participant,
        } => {
            let participant = participant_or_caller(participant, &cli.caller)?;
            match state.book.get_prediction(EventId(event_id), &participant) {
                Some(prediction) => {
                    println!("{}: {}", "Event".yellow().bold(), prediction.event_name);
                    println!("{}: {}", "Participant".yellow().bold(), participant);
                    println!(
                        "{}: {}",
                        "Prediction".yellow().bold(),
                        prediction.predicted_outcome.to_string().cyan()
                    );
                    println!("{}: {}", "Submitted at".yellow().bold(), prediction.timestamp);
                }
                None => println!("{}", "No prediction.".bright_black()),
            }
            false
        }

        Commands::Stats { participant } => {
            let participant = participant_or_caller(participant, &cli.caller)?;
            print_stats(&participant, &state.book.get_user_stats(&participant));
            false
        }

        Commands::Leaderboard { limit } => {
            let standings = state.book.standings(Some(limit));
            if standings.is_empty() {
                println!("{}", "Leaderboard is empty.".bright_black());
            }
            println!("{}", "═".repeat(50).bright_black());
            for row in standings {
                println!(
                    "{:>3}. {:<44} {:>6} pts  {}/{} correct",
                    row.rank,
                    row.participant.as_str(),
                    row.stats.total_points.to_string().green(),
                    row.stats.correct_predictions,
                    row.stats.total_predictions
                );
            }
            println!("{}", "═".repeat(50).bright_black());
            false
        }
    };

    if mutated {
        store::save(&cli.store, &state)?;
    }
    Ok(())
}

fn require_caller(caller: &Option<String>) -> Result<Identity> {
    caller
        .as_deref()
        .map(Identity::from)
        .ok_or_else(|| anyhow!("This command needs a caller identity: pass --as or set KICKOFF_CALLER"))
}

fn participant_or_caller(participant: Option<String>, caller: &Option<String>) -> Result<Identity> {
    match participant {
        Some(participant) => Ok(Identity::from(participant)),
        None => require_caller(caller),
    }
}

fn status_label(status: EventStatus) -> ColoredString {
    match status {
        EventStatus::Open => "open".green(),
        EventStatus::Closed => "closed".yellow(),
        EventStatus::Settled => "settled".bright_black(),
    }
}

fn print_event(event: &Event) {
    println!("{}", "═".repeat(50).bright_black());
    println!("{}: {}", "Event ID".yellow().bold(), event.id.to_string().cyan());
    println!("{}: {}", "Name".yellow().bold(), event.name);
    println!("{}: {}", "Fixture".yellow().bold(), event.fixture());
    println!("{}: {}", "Match Time".yellow().bold(), format_timestamp(event.match_time));
    println!("{}: {}", "Creator".yellow().bold(), event.creator);
    println!("{}: {}", "Oracle".yellow().bold(), event.oracle);
    println!("{}: {}", "Status".yellow().bold(), status_label(event.status()));
    if let Some(result) = event.result() {
        println!("{}: {}", "Result".cyan().bold(), result);
    }
    println!("{}", "═".repeat(50).bright_black());
}

fn print_receipt(participant: &str, receipt: &AwardReceipt) {
    if receipt.awarded {
        println!(
            "{}: {} earned {} points",
            "Awarded".green().bold(),
            participant.cyan(),
            receipt.points.to_string().yellow()
        );
    } else {
        println!(
            "{}: {} predicted incorrectly, no points",
            "Not awarded".yellow().bold(),
            participant.cyan()
        );
    }
}

fn print_stats(participant: &Identity, stats: &UserStats) {
    println!("{}: {}", "Participant".yellow().bold(), participant);
    println!("{}: {}", "Total Points".yellow().bold(), stats.total_points.to_string().green());
    println!("{}: {}", "Correct Predictions".yellow().bold(), stats.correct_predictions);
    println!("{}: {}", "Total Predictions".yellow().bold(), stats.total_predictions);
}
