//! PlanMyTrip - travel itinerary planner
//!
//! CLI entry point for planning trips and editing itineraries.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use itinerary::{
    CandidatePlace, Day, EditIntent, apply_edit_locally, extract_intents, has_add_intent, has_edit_intent,
    has_replan_intent, needs_candidates,
};
use serde_json::json;
use tracing::{debug, info};

use planmytrip::cli::{Cli, Command, OutputFormat, get_log_path, read_itinerary, read_places};
use planmytrip::config::Config;
use planmytrip::places::{TourApiClient, gather_candidates};
use planmytrip::planner::Planner;
use planmytrip::request::{PlanRequest, PlanResponse};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging is not initialized yet, so nothing here can be traced
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planmytrip")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("planmytrip.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cmd = Cli::command().after_help(format!("Logs are written to: {}", get_log_path().display()));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan { request } => {
            debug!(?request, "main: matched Plan command");
            let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
            cmd_plan(config, &request).await
        }
        Command::Edit {
            itinerary,
            places,
            format,
            instruction,
        } => {
            debug!(?itinerary, ?places, %format, "main: matched Edit command");
            cmd_edit(&itinerary, places.as_deref(), &instruction, format)
        }
        Command::Intent { format, text } => {
            debug!(%format, "main: matched Intent command");
            cmd_intent(&text, format)
        }
        Command::Places { region, types, format } => {
            debug!(%region, ?types, %format, "main: matched Places command");
            let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
            cmd_places(&config, &region, &types, format).await
        }
    }
}

async fn cmd_plan(config: Config, request_path: &Path) -> Result<()> {
    debug!(?request_path, "cmd_plan: called");
    let content =
        fs::read_to_string(request_path).context(format!("Failed to read {}", request_path.display()))?;
    let request: PlanRequest = serde_json::from_str(&content).context("Failed to parse planning request")?;

    let planner = Planner::from_config(config)?;
    let response: PlanResponse = planner.plan(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_edit(itinerary_path: &Path, places_path: Option<&Path>, instruction: &str, format: OutputFormat) -> Result<()> {
    debug!(%instruction, "cmd_edit: called");
    let current = read_itinerary(itinerary_path)?;
    let places = match places_path {
        Some(path) => read_places(path)?,
        None => Vec::new(),
    };

    let outcome = apply_edit_locally(instruction, &current, &places).ok_or_else(|| {
        let hint = if has_replan_intent(instruction) {
            "it asks for a fresh plan; use `pt plan` with the itinerary in the request"
        } else if needs_candidates(instruction) && places.is_empty() {
            "no candidate places were given; pass --places with the places to add from"
        } else {
            "name the places to remove, add, or replace, e.g. \"remove Haeundae Beach\""
        };
        eyre!("Could not apply \"{}\" locally: {}", instruction, hint)
    })?;
    info!(
        removed = outcome.removed.len(),
        added = outcome.added.len(),
        missed = outcome.missed.len(),
        "cmd_edit: edit applied"
    );

    match format {
        OutputFormat::Json => {
            let response = PlanResponse::new(outcome.summary, outcome.itinerary);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("{}", outcome.summary.bold());
            for missed in &outcome.missed {
                println!("  {} {}", "not applied:".yellow(), missed);
            }
            println!();
            print_itinerary(&outcome.itinerary);
        }
    }
    Ok(())
}

fn cmd_intent(text: &str, format: OutputFormat) -> Result<()> {
    debug!(%text, "cmd_intent: called");
    let intents = extract_intents(text);

    match format {
        OutputFormat::Json => {
            let report = json!({
                "intents": intents,
                "hasAdd": has_add_intent(text),
                "hasEdit": has_edit_intent(text),
                "hasReplan": has_replan_intent(text),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if intents.is_empty() {
                println!("{}", "No edit requests recognized".yellow());
            }
            for intent in &intents {
                println!("{}", describe_intent(intent));
            }
            println!();
            println!(
                "add: {}  edit: {}  replan: {}",
                yes_no(has_add_intent(text)),
                yes_no(has_edit_intent(text)),
                yes_no(has_replan_intent(text))
            );
        }
    }
    Ok(())
}

async fn cmd_places(config: &Config, region: &str, types: &[String], format: OutputFormat) -> Result<()> {
    debug!(%region, ?types, "cmd_places: called");
    let client = TourApiClient::from_config(&config.places)?;
    let places: Vec<CandidatePlace> = gather_candidates(&client, region, types, &config.places).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&places)?),
        OutputFormat::Text => {
            if places.is_empty() {
                println!("{}", "No places found".yellow());
            }
            for place in &places {
                println!(
                    "{}  {}  ({:.4}, {:.4})",
                    place.title.bold(),
                    place.address.dimmed(),
                    place.latitude,
                    place.longitude
                );
            }
        }
    }
    Ok(())
}

fn describe_intent(intent: &EditIntent) -> String {
    let on_day = |day: &Option<usize>| day.map(|d| format!(" on day {}", d + 1)).unwrap_or_default();
    match intent {
        EditIntent::Remove { term } => format!("{} {}", "remove".red(), term),
        EditIntent::Add { day, term } => format!("{} {}{}", "add".green(), term, on_day(day)),
        EditIntent::Replace { old, new, day } => {
            format!("{} {} with {}{}", "replace".cyan(), old, new, on_day(day))
        }
    }
}

fn print_itinerary(itinerary: &[Day]) {
    for day in itinerary {
        println!("{} {}", day.label.bold(), day.date.dimmed());
        if day.visits.is_empty() {
            println!("  {}", "(no visits)".dimmed());
        }
        for visit in &day.visits {
            println!("  {}. {}", visit.order, visit.place);
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
