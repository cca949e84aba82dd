//! Plain-text rendering of derived views.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use revtrack_core::{
  cycle::{CycleState, DerivedCycle},
  status::StatusProjection,
  summary::RecordSummary,
};

fn date(dt: Option<DateTime<Utc>>) -> String {
  dt.map(|d| d.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| "—".to_string())
}

fn days(n: Option<u64>) -> String {
  n.map(|d| format!("{d}d")).unwrap_or_else(|| "—".to_string())
}

pub fn status(s: &StatusProjection) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "status:               {}", s.label);
  let _ = writeln!(out, "since last event:     {}", days(s.days_since_last_event));
  let _ = writeln!(out, "since last submission: {}", days(s.days_since_last_submission));
  if let Some(d) = s.days_with_client {
    let _ = writeln!(out, "with client:          {d}d");
  }
  out
}

fn cycle_line(index: usize, c: &DerivedCycle) -> String {
  let state = match c.state {
    CycleState::Closed => "closed",
    CycleState::Unresolved => "unresolved",
    CycleState::Open => "open",
    CycleState::Orphaned => "orphaned",
  };
  let mut line = format!(
    "{:>3}  {:<10}  {:<10} → {:<10}  {:>5}  {}",
    index + 1,
    state,
    date(c.submitted_at),
    date(c.received_at),
    days(c.elapsed_days),
    c.revision_label.as_deref().unwrap_or(""),
  );
  if let Some(cmp) = c.estimate_comparison() {
    let when = if cmp.is_before_estimate { "early" } else { "late" };
    let _ = write!(line, "  ({}d {when})", cmp.delta_days);
  }
  line
}

pub fn summary(s: &RecordSummary) -> String {
  let stats = &s.statistics;
  let mut out = String::new();
  let _ = writeln!(out, "record {} as of {}", s.record_id, s.as_of.to_rfc3339());
  let _ = writeln!(out);
  out.push_str(&status(&s.status));

  if let Some(last) = &s.last_event {
    let _ = writeln!(
      out,
      "last event:           {} {} ({})",
      last.event_type_label,
      date(Some(last.event.event_timestamp)),
      last.revision_label.as_deref().unwrap_or("no revision"),
    );
  }

  let _ = writeln!(out);
  let _ = writeln!(out, "days with client:     {}", stats.days_with_client);
  let _ = writeln!(out, "days worked:          {}", stats.days_worked);
  let _ = writeln!(out, "submissions:          {}", stats.submission_count);
  let _ = writeln!(out, "receipts:             {}", stats.receipt_count);
  let _ = writeln!(
    out,
    "pending with client:  {}",
    if stats.pending_with_client { "yes" } else { "no" }
  );

  if !s.cycles.is_empty() {
    let _ = writeln!(out);
    let _ = writeln!(out, "cycles:");
    for (i, c) in s.cycles.iter().enumerate() {
      let _ = writeln!(out, "{}", cycle_line(i, c));
    }
  }
  out
}
