//! Tests for WOCE event aggregation


use super::{RowDataSource, RowPosition};
use crate::app::models::{EventStamp, Finding, RegionId, WoceFlag};
use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory rows that count how often they are read
pub struct FakeRows {
    pub positions: Vec<RowPosition>,
    pub values: HashMap<String, Vec<Option<f64>>>,
    pub position_calls: Cell<usize>,
    pub value_calls: Cell<usize>,
}

impl FakeRows {
    /// `count` rows one hour apart with a `sst` value of 20 + row index
    pub fn with_rows(count: usize) -> Self {
        let positions = (0..count)
            .map(|i| RowPosition {
                longitude: -30.0 + i as f64,
                latitude: 45.0,
                timestamp: Some(base_time() + chrono::Duration::hours(i as i64)),
                region: RegionId::NorthAtlantic,
            })
            .collect();
        let mut values = HashMap::new();
        values.insert(
            "sst".to_string(),
            (0..count).map(|i| Some(20.0 + i as f64)).collect(),
        );
        values.insert("sal".to_string(), vec![None; count]);
        values.insert(
            "time".to_string(),
            (0..count)
                .map(|i| Some((base_time().timestamp() + 3600 * i as i64) as f64))
                .collect(),
        );
        Self {
            positions,
            values,
            position_calls: Cell::new(0),
            value_calls: Cell::new(0),
        }
    }
}

impl RowDataSource for FakeRows {
    fn position(&self, row_index: usize) -> Option<RowPosition> {
        self.position_calls.set(self.position_calls.get() + 1);
        self.positions.get(row_index).copied()
    }

    fn variable_values(&self, variable: &str) -> Option<Vec<Option<f64>>> {
        self.value_calls.set(self.value_calls.get() + 1);
        self.values.get(variable).cloned()
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2010, 5, 1, 0, 0, 0).unwrap()
}

pub fn stamp() -> EventStamp {
    EventStamp {
        dataset_id: "49P120100501".to_string(),
        version: "3.0".to_string(),
        flag_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        username: "automated.data.checker".to_string(),
        realname: "automated data checker".to_string(),
    }
}

/// Column 5 is `sst`, column 6 is `sal`, columns 1-3 are time
pub fn columns() -> HashMap<usize, String> {
    let mut map = HashMap::new();
    for i in 0..3 {
        map.insert(i, "time".to_string());
    }
    map.insert(4, "sst".to_string());
    map.insert(5, "sal".to_string());
    map.insert(6, "unavailable".to_string());
    map
}

/// BAD finding on a 1-based row and column
pub fn bad(row: usize, column: Option<usize>, comment: &str) -> Finding {
    let mut finding = Finding::new(WoceFlag::Bad, comment).at_row(row);
    finding.column_number = column;
    finding
}
