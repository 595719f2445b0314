//! Tests for QC flag reconciliation


use crate::app::models::{QcEvent, QcFlag, RegionId};
use chrono::{DateTime, TimeZone, Utc};

/// Timestamp `offset` days after a fixed base date
pub fn t(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 3, 1, 0, 0, 0).unwrap() + chrono::Duration::days(offset)
}

pub fn event(flag: QcFlag, region: RegionId, offset: i64) -> QcEvent {
    QcEvent::new(flag, region, t(offset))
}
