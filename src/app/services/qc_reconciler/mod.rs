//! Dataset QC flag reconciliation
//!
//! A dataset accumulates QC events over its lifetime, each asserting a flag for
//! either the whole dataset (the global region) or one geographic region. The
//! effective flag is derived from the latest event of every region:
//!
//! 1. Only the latest event per region counts.
//! 2. A region event counts only if it is strictly newer than the latest
//!    global event; otherwise the global flag stands in for that region.
//! 3. If all regions end up with the same flag that flag is the result; any
//!    disagreement gives [`QcFlag::Conflict`].
//! 4. Without region events the global flag is the result. A dataset with no
//!    global event is treated as newly submitted.

#[cfg(test)]
pub mod tests;

use crate::app::models::{QcEvent, QcFlag, QcLogEntry, RegionId};
use crate::constants::MIN_QC_EVENT_EPOCH_SECONDS;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Global event assumed when the log has none; older than any real event
pub fn default_global_event() -> QcEvent {
    QcEvent::new(QcFlag::New, RegionId::Global, DateTime::<Utc>::MIN_UTC)
}

/// Compute the effective QC flag of a dataset
///
/// # Arguments
///
/// * `events` - QC events of one dataset in log order; comment and rename
///   markers are ignored and events are ordered by timestamp, ties keeping
///   their log order
///
/// # Returns
///
/// The effective flag, or [`QcFlag::Conflict`] when regions disagree
pub fn reconcile_qc_flag(events: &[QcEvent]) -> QcFlag {
    let mut ordered: Vec<&QcEvent> = events.iter().filter(|e| e.flag.carries_value()).collect();
    ordered.sort_by_key(|e| e.timestamp);

    let mut latest: BTreeMap<RegionId, &QcEvent> = BTreeMap::new();
    for event in ordered {
        latest.insert(event.region, event);
    }

    let default_global = default_global_event();
    let global = latest.remove(&RegionId::Global).unwrap_or(&default_global);
    trace!(
        "Global QC flag {} at {} with {} regional entries",
        global.flag,
        global.timestamp,
        latest.len()
    );

    let mut effective = latest.values().map(|event| {
        if event.timestamp > global.timestamp {
            event.flag
        } else {
            global.flag
        }
    });

    let result = match effective.next() {
        None => global.flag,
        Some(first) => {
            if effective.all(|flag| flag == first) {
                first
            } else {
                QcFlag::Conflict
            }
        }
    };
    debug!("Reconciled QC flag: {} ({})", result, result.status());
    result
}

/// Validate raw event log rows
///
/// Blank flags, comment and rename markers, and blank regions are skipped.
/// Unknown flags, malformed regions and timestamps before the earliest
/// possible QC event are errors.
pub fn read_event_log(entries: &[QcLogEntry]) -> Result<Vec<QcEvent>> {
    let mut events = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(flag_code) = single_char(&entry.flag, "QC flag")? else {
            trace!("Skipping event log entry without a flag");
            continue;
        };
        let flag = QcFlag::from_char(flag_code)?;
        if !flag.carries_value() {
            continue;
        }

        if entry.epoch_seconds < MIN_QC_EVENT_EPOCH_SECONDS {
            return Err(Error::event_log(format!(
                "Invalid QC event time {}",
                entry.epoch_seconds
            )));
        }
        let timestamp = DateTime::<Utc>::from_timestamp(entry.epoch_seconds, 0).ok_or_else(|| {
            Error::event_log(format!("Invalid QC event time {}", entry.epoch_seconds))
        })?;

        let Some(region_code) = single_char(&entry.region, "region ID")? else {
            trace!("Skipping event log entry without a region");
            continue;
        };
        let region = RegionId::from_char(region_code)?;

        events.push(
            QcEvent::new(flag, region, timestamp)
                .with_reviewer(entry.username.trim(), entry.realname.trim())
                .with_comment(entry.comment.trim())
                .with_dataset(entry.dataset_id.trim(), entry.version.trim()),
        );
    }

    debug!(
        "Read {} QC events from {} log entries",
        events.len(),
        entries.len()
    );
    Ok(events)
}

/// Validate a raw event log and reconcile it
pub fn reconcile_log(entries: &[QcLogEntry]) -> Result<QcFlag> {
    let events = read_event_log(entries)?;
    Ok(reconcile_qc_flag(&events))
}

fn single_char(text: &str, what: &str) -> Result<Option<char>> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) => Ok(Some(c)),
        _ => Err(Error::event_log(format!("Invalid {} '{}'", what, trimmed))),
    }
}
