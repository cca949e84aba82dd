//! `revtrack` — command-line client for document turnaround tracking.
//!
//! # Usage
//!
//! ```text
//! revtrack analyze events.json --now 2024-02-01T00:00:00Z
//! revtrack analyze events.json --record <RECORD>
//! revtrack --url http://localhost:5380 status <RECORD>
//! revtrack submit <RECORD> --revision Rev-03 --estimated-return 2024-03-01T00:00:00Z
//! revtrack receive <RECORD> --revision Rev-03
//! ```

mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, AppendRequest};
use revtrack_core::{event::EventType, log::EventLog, summary::RecordSummary};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:5380";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "revtrack", about = "Track how long documents spend with the client")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the revtrack server (default: http://localhost:5380).
  #[arg(long, env = "REVTRACK_URL", global = true)]
  url: Option<String>,

  /// Print JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Analyze a JSON export of events without a server.
  Analyze {
    /// JSON array of events; order and completeness are not assumed.
    file:              PathBuf,
    /// Only analyze this record. Without it every record in the file is
    /// summarized on its own.
    #[arg(long)]
    record:            Option<Uuid>,
    /// Measure against this instant instead of the current time.
    #[arg(long)]
    now:               Option<DateTime<Utc>>,
    /// The record's current revision, shown when the last event has none.
    #[arg(long)]
    fallback_revision: Option<String>,
  },
  /// Show the compact status of a record.
  Status {
    record: Uuid,
    #[arg(long)]
    now:    Option<DateTime<Utc>>,
  },
  /// Show cycles and statistics of a record.
  Timeline {
    record:            Uuid,
    #[arg(long)]
    now:               Option<DateTime<Utc>>,
    #[arg(long)]
    fallback_revision: Option<String>,
  },
  /// Record that a document was sent to the client.
  Submit {
    record:           Uuid,
    #[arg(long)]
    revision:         String,
    /// When it was sent (default: now).
    #[arg(long)]
    at:               Option<DateTime<Utc>>,
    /// When the client is expected to return it.
    #[arg(long)]
    estimated_return: Option<DateTime<Utc>>,
    #[arg(long)]
    notes:            Option<String>,
    #[arg(long)]
    actor:            Option<String>,
  },
  /// Record that a document came back from the client.
  Receive {
    record:   Uuid,
    #[arg(long)]
    revision: String,
    /// When it came back (default: now).
    #[arg(long)]
    at:       Option<DateTime<Utc>>,
    #[arg(long)]
    notes:    Option<String>,
    #[arg(long)]
    actor:    Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

fn resolve_url(args_url: Option<String>, config: Option<&PathBuf>) -> Result<String> {
  let file_cfg: ConfigFile = if let Some(path) = config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  Ok(
    args_url
      .or_else(|| (!file_cfg.url.is_empty()).then_some(file_cfg.url))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  )
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let Args { config, url, json, command } = args;

  let connect = || -> Result<ApiClient> {
    ApiClient::new(ApiConfig {
      base_url: resolve_url(url.clone(), config.as_ref())?,
    })
  };

  match command {
    Command::Analyze { file, record, now, fallback_revision } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading events from {}", file.display()))?;
      let log = EventLog::from_json(&raw).context("parsing events")?;
      let now = now.unwrap_or_else(Utc::now);
      let summaries =
        summarize_records(&log, record, fallback_revision.as_deref(), now);
      print(&summaries, json, |all| {
        all.iter().map(render::summary).collect::<Vec<_>>().join("\n")
      })
    }
    Command::Status { record, now } => {
      let status = connect()?.status(record, now).await?;
      print(&status, json, render::status)
    }
    Command::Timeline { record, now, fallback_revision } => {
      let summary = connect()?
        .summary(record, now, fallback_revision.as_deref())
        .await?;
      print(&summary, json, render::summary)
    }
    Command::Submit { record, revision, at, estimated_return, notes, actor } => {
      let body = AppendRequest {
        event_type:                 EventType::Submitted,
        revision_label:             Some(revision),
        event_timestamp:            at,
        estimated_return_timestamp: estimated_return,
        notes,
        actor,
      };
      let event = connect()?.append(record, &body).await?;
      tracing::info!(event_id = %event.id, "submission recorded");
      println!("{} {}", event.event_type, event.id);
      Ok(())
    }
    Command::Receive { record, revision, at, notes, actor } => {
      let body = AppendRequest {
        event_type:                 EventType::Received,
        revision_label:             Some(revision),
        event_timestamp:            at,
        estimated_return_timestamp: None,
        notes,
        actor,
      };
      let event = connect()?.append(record, &body).await?;
      tracing::info!(event_id = %event.id, "receipt recorded");
      println!("{} {}", event.event_type, event.id);
      Ok(())
    }
  }
}

/// One summary per record in `log`, or just `record` when given.
///
/// Cycles are only ever matched within a single record.
fn summarize_records(
  log: &EventLog,
  record: Option<Uuid>,
  fallback_revision: Option<&str>,
  now: DateTime<Utc>,
) -> Vec<RecordSummary> {
  let logs = match record {
    Some(record_id) => vec![(record_id, log.for_record(record_id))],
    None => log.split_by_record(),
  };
  logs
    .iter()
    .map(|(record_id, log)| {
      RecordSummary::compute(*record_id, log, fallback_revision, now)
    })
    .collect()
}

fn print<T: serde::Serialize>(
  value: &T,
  json: bool,
  text: impl Fn(&T) -> String,
) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(value)?);
  } else {
    print!("{}", text(value));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_flag_wins_over_default() {
    let url = resolve_url(Some("http://example:1".into()), None).unwrap();
    assert_eq!(url, "http://example:1");
  }

  #[test]
  fn default_url_without_flag_or_file() {
    assert_eq!(resolve_url(None, None).unwrap(), DEFAULT_URL);
  }

  fn events_json() -> &'static str {
    r#"[
      {"id":"00000000-0000-0000-0000-000000000001",
       "record_id":"00000000-0000-0000-0000-0000000000aa",
       "event_type":"submitted",
       "event_timestamp":"2024-01-01T00:00:00Z"},
      {"id":"00000000-0000-0000-0000-000000000002",
       "record_id":"00000000-0000-0000-0000-0000000000bb",
       "event_type":"received",
       "event_timestamp":"2024-01-10T00:00:00Z"}
    ]"#
  }

  fn now() -> DateTime<Utc> { "2024-01-20T00:00:00Z".parse().unwrap() }

  #[test]
  fn analyze_never_pairs_across_records() {
    let log = EventLog::from_json(events_json()).unwrap();
    let summaries = summarize_records(&log, None, None, now());
    assert_eq!(summaries.len(), 2);

    let aa = &summaries[0];
    assert_eq!(aa.record_id, Uuid::from_u128(0xaa));
    assert_eq!(aa.statistics.receipt_count, 0);
    assert!(aa.statistics.pending_with_client);
    assert_eq!(aa.statistics.days_with_client, 19);

    let bb = &summaries[1];
    assert_eq!(bb.record_id, Uuid::from_u128(0xbb));
    assert_eq!(bb.statistics.days_with_client, 0);
    assert_eq!(bb.statistics.submission_count, 0);
    assert_eq!(bb.statistics.receipt_count, 1);
  }

  #[test]
  fn analyze_with_record_filter() {
    let log = EventLog::from_json(events_json()).unwrap();
    let summaries =
      summarize_records(&log, Some(Uuid::from_u128(0xbb)), None, now());
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].events.len(), 1);
    assert_eq!(summaries[0].statistics.days_with_client, 0);
  }

  #[test]
  fn args_parse_submit() {
    let args = Args::try_parse_from([
      "revtrack",
      "submit",
      "00000000-0000-0000-0000-000000000001",
      "--revision",
      "Rev-03",
      "--estimated-return",
      "2024-03-01T00:00:00Z",
    ])
    .unwrap();
    match args.command {
      Command::Submit { revision, estimated_return, at, .. } => {
        assert_eq!(revision, "Rev-03");
        assert!(estimated_return.is_some());
        assert!(at.is_none());
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }
}
