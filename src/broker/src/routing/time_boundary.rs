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

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tern_common::cluster::ExternalView;
use tern_common::segment::TimeGranularity;
use tern_rpc_client::CoordinatorClient;

use crate::error::{RoutingError, RoutingResult};

/// The cutoff separating hybrid-table query work: offline plans answer
/// `time <= boundary`, realtime plans answer `time > boundary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBoundaryInfo {
    pub time_column: String,
    /// Boundary value, in the service's configured granularity.
    pub boundary_value: i64,
}

/// Computes and caches the time boundary per offline table.
///
/// The boundary is the maximum end time over the online segments of the
/// offline external view, minus one unit of the configured granularity:
/// everything up to the last fully-loaded offline unit is answered from
/// offline segments, the remainder from realtime ones.
pub struct TimeBoundaryService {
    coordinator_client: Arc<dyn CoordinatorClient>,
    granularity: TimeGranularity,
    time_boundaries: DashMap<String, TimeBoundaryInfo>,
}

impl TimeBoundaryService {
    pub fn new(coordinator_client: Arc<dyn CoordinatorClient>, granularity: TimeGranularity) -> Self {
        Self {
            coordinator_client,
            granularity,
            time_boundaries: DashMap::new(),
        }
    }

    pub fn get(&self, table: &str) -> Option<TimeBoundaryInfo> {
        self.time_boundaries.get(table).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, table: &str) {
        self.time_boundaries.remove(table);
    }

    /// Recomputes the boundary from an offline external view and replaces
    /// the cached entry atomically. Segments without time metadata are
    /// skipped; if none remains, the previous boundary is left in place and
    /// an error is returned for the caller to log.
    pub async fn update(&self, external_view: &ExternalView) -> RoutingResult<()> {
        let table = &external_view.table;
        let mut max_end: Option<(String, i64)> = None;

        for segment in external_view.online_segments() {
            let metadata = self
                .coordinator_client
                .read_segment_metadata(table, segment)
                .await?;
            let Some(metadata) = metadata else {
                tracing::debug!(table = %table, segment = %segment, "segment has no time metadata");
                continue;
            };
            let end = metadata.time_unit.convert(metadata.end_time, self.granularity);
            if max_end.as_ref().is_none_or(|(_, current)| end > *current) {
                max_end = Some((metadata.time_column, end));
            }
        }

        let Some((time_column, end)) = max_end else {
            return Err(RoutingError::TimeBoundary {
                table: table.clone(),
            });
        };
        self.time_boundaries.insert(
            table.clone(),
            TimeBoundaryInfo {
                time_column,
                boundary_value: end - 1,
            },
        );
        Ok(())
    }
}
