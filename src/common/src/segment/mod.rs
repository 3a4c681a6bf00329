// Copyright 2025 Tern Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Segment naming conventions and segment time metadata.
//!
//! Segment identifiers are opaque to most of the broker, but realtime
//! routing needs the provenance encoded in the name:
//!
//! * high-level-consumer segments: `<table>__<groupId>__<sequence>`
//! * low-level-consumer segments: `<table>__<partition>__<sequence>__<creationTime>`
//!
//! Parsing is total. A name that fits neither shape is simply not routable
//! by the corresponding builder.

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

pub const SEGMENT_NAME_SEPARATOR: &str = "__";

/// Name of a segment produced by a high-level consumer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HlcSegmentName {
    pub table: String,
    pub group_id: String,
    pub sequence: u64,
}

impl HlcSegmentName {
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split(SEGMENT_NAME_SEPARATOR).collect();
        let [table, group_id, sequence] = parts.as_slice() else {
            return None;
        };
        if table.is_empty() || group_id.is_empty() {
            return None;
        }
        Some(Self {
            table: table.to_string(),
            group_id: group_id.to_string(),
            sequence: sequence.parse().ok()?,
        })
    }
}

/// Name of a segment produced by a low-level (per-partition) consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlcSegmentName {
    pub table: String,
    pub partition: u32,
    pub sequence: u64,
    pub creation_time: String,
}

impl LlcSegmentName {
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split(SEGMENT_NAME_SEPARATOR).collect();
        let [table, partition, sequence, creation_time] = parts.as_slice() else {
            return None;
        };
        if table.is_empty() || creation_time.is_empty() {
            return None;
        }
        Some(Self {
            table: table.to_string(),
            partition: partition.parse().ok()?,
            sequence: sequence.parse().ok()?,
            creation_time: creation_time.to_string(),
        })
    }
}

/// Granularity in which segment end times and time boundaries are expressed.
#[derive(
    Display, FromStr, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeGranularity {
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeGranularity {
    pub fn as_millis(&self) -> i64 {
        match self {
            TimeGranularity::Days => 24 * 60 * 60 * 1000,
            TimeGranularity::Hours => 60 * 60 * 1000,
            TimeGranularity::Minutes => 60 * 1000,
            TimeGranularity::Seconds => 1000,
            TimeGranularity::Milliseconds => 1,
        }
    }

    /// Re-expresses `value` (in units of `self`) in units of `target`.
    pub fn convert(&self, value: i64, target: TimeGranularity) -> i64 {
        value * self.as_millis() / target.as_millis()
    }
}

/// Time metadata the coordinator's property store keeps per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTimeMetadata {
    pub time_column: String,
    /// End of the segment's time range, in units of `time_unit`.
    pub end_time: i64,
    pub time_unit: TimeGranularity,
}
