//! CLI command definitions and input helpers

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Context, Result, eyre};
use itinerary::{CandidatePlace, Itinerary, SCHEDULE_KEY};
use serde_json::Value;
use tracing::debug;

/// PlanMyTrip - travel itinerary planner
#[derive(Parser)]
#[command(
    name = "pt",
    about = "Plan travel itineraries and edit them with plain-language instructions",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan or edit a trip end to end (calls the place and generative services)
    Plan {
        /// JSON planning request
        #[arg(short, long, value_name = "FILE")]
        request: PathBuf,
    },

    /// Apply an edit instruction locally, without any network call
    Edit {
        /// Itinerary JSON (a day list, or an object with `travelSchedule`)
        #[arg(short, long, value_name = "FILE")]
        itinerary: PathBuf,

        /// Candidate places JSON for additions
        #[arg(short, long, value_name = "FILE")]
        places: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Instruction, e.g. "remove Haeundae Beach, add Gamcheon Culture Village to day 2"
        instruction: String,
    },

    /// Show how an instruction is understood
    Intent {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Instruction text
        text: String,
    },

    /// List candidate places for a region
    Places {
        /// Region name (서울, 부산, jeju, ...)
        region: String,

        /// Travel type (관광, 문화시설, 축제, 숙박, 쇼핑, 음식점); repeatable
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for edit/intent/places
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Where the binary writes its log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("planmytrip")
        .join("logs")
        .join("planmytrip.log")
}

/// Read an itinerary from a day list or from an object carrying `travelSchedule`
pub fn read_itinerary(path: &Path) -> Result<Itinerary> {
    debug!(?path, "read_itinerary: called");
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content).context(format!("{} is not valid JSON", path.display()))?;

    let days = match value {
        Value::Array(_) => value,
        Value::Object(mut object) => object
            .remove(SCHEDULE_KEY)
            .ok_or_else(|| eyre!("{} has no '{}' field", path.display(), SCHEDULE_KEY))?,
        _ => return Err(eyre!("{} must hold a day list or an object", path.display())),
    };

    let itinerary: Itinerary = serde_json::from_value(days).context("Failed to parse itinerary days")?;
    debug!(days = itinerary.len(), "read_itinerary: done");
    Ok(itinerary)
}

/// Read a candidate list; entries without coordinates are skipped
pub fn read_places(path: &Path) -> Result<Vec<CandidatePlace>> {
    debug!(?path, "read_places: called");
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let places: Vec<CandidatePlace> =
        serde_json::from_str(&content).context(format!("Failed to parse places from {}", path.display()))?;
    Ok(places.into_iter().filter(|p| p.has_coordinates()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_read_itinerary_list_and_object() {
        let list = write_temp(r#"[{"day": "Day 1", "date": "2025-12-09", "plan": [{"order": 1, "place": "A"}]}]"#);
        assert_eq!(read_itinerary(list.path()).unwrap()[0].visits[0].place, "A");

        let object = write_temp(r#"{"text": "hi", "travelSchedule": [{"day": "Day 1", "plan": []}]}"#);
        assert_eq!(read_itinerary(object.path()).unwrap().len(), 1);

        let bad = write_temp(r#"{"text": "no schedule"}"#);
        assert!(read_itinerary(bad.path()).is_err());

        let scalar = write_temp("42");
        assert!(read_itinerary(scalar.path()).is_err());
    }

    #[test]
    fn test_read_places_skips_missing_coordinates() {
        let file = write_temp(
            r#"[{"title": "A", "latitude": 35.1, "longitude": 129.0},
                {"title": "B", "mapy": 35.2, "mapx": 129.1, "addr1": "Busan"},
                {"title": "C"}]"#,
        );
        let places = read_places(file.path()).unwrap();
        let titles: Vec<&str> = places.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(places[1].address, "Busan");
    }

    #[test]
    fn test_cli_parses_edit() {
        let cli = Cli::try_parse_from([
            "pt",
            "edit",
            "--itinerary",
            "trip.json",
            "--places",
            "places.json",
            "remove Haeundae Beach",
        ])
        .unwrap();
        match cli.command {
            Command::Edit {
                itinerary,
                places,
                format,
                instruction,
            } => {
                assert_eq!(itinerary, PathBuf::from("trip.json"));
                assert_eq!(places, Some(PathBuf::from("places.json")));
                assert_eq!(format, OutputFormat::Text);
                assert_eq!(instruction, "remove Haeundae Beach");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_places_types() {
        let cli = Cli::try_parse_from(["pt", "-l", "debug", "places", "부산", "-t", "관광", "-t", "맛집"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Places { region, types, .. } => {
                assert_eq!(region, "부산");
                assert_eq!(types, vec!["관광", "맛집"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
