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

//! The coordinator-published cluster model observed by brokers.
//!
//! The coordinator keeps one *external view* per physical table (which server
//! holds which segment, in which state) and one *instance config* per server
//! instance. Both carry a monotone version assigned by the coordinator's
//! state store; brokers diff versions to decide whether anything changed.

use std::collections::{BTreeMap, HashMap};

use parse_display::{Display, FromStr};

pub type SegmentId = String;
pub type ServerId = String;

/// Version sentinel forcing the next observation of a table to rebuild its
/// routing tables regardless of what the coordinator reports.
pub const INVALID_EXTERNAL_VIEW_VERSION: i64 = -1;

/// Per-replica segment state as published in an external view.
///
/// Only `Online` replicas serve completed segments; `Consuming` marks the
/// replica ingesting the open end of a low-level-consumer partition.
#[derive(Display, FromStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[display(style = "UPPERCASE")]
pub enum SegmentState {
    Online,
    Consuming,
    Offline,
    Dropped,
    Error,
}

/// Snapshot of segment placement for one physical table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalView {
    pub table: String,
    pub version: i64,
    /// segment -> server -> state. Keyed by `BTreeMap` so that builders
    /// iterate segments in a deterministic order.
    pub segment_states: BTreeMap<SegmentId, HashMap<ServerId, SegmentState>>,
}

impl ExternalView {
    pub fn new(table: impl Into<String>, version: i64) -> Self {
        Self {
            table: table.into(),
            version,
            segment_states: BTreeMap::new(),
        }
    }

    pub fn set_state(
        &mut self,
        segment: impl Into<SegmentId>,
        server: impl Into<ServerId>,
        state: SegmentState,
    ) -> &mut Self {
        self.segment_states
            .entry(segment.into())
            .or_default()
            .insert(server.into(), state);
        self
    }

    /// Servers hosting `segment` in the given state.
    pub fn servers_in_state<'a>(
        &'a self,
        segment: &str,
        state: SegmentState,
    ) -> impl Iterator<Item = &'a ServerId> + 'a {
        self.segment_states
            .get(segment)
            .into_iter()
            .flat_map(move |servers| {
                servers
                    .iter()
                    .filter(move |(_, s)| **s == state)
                    .map(|(server, _)| server)
            })
    }

    /// Segments with at least one `Online` replica.
    pub fn online_segments(&self) -> impl Iterator<Item = &SegmentId> + '_ {
        self.segment_states
            .iter()
            .filter(|(_, servers)| servers.values().any(|s| *s == SegmentState::Online))
            .map(|(segment, _)| segment)
    }
}

/// Per-instance metadata registered with the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    pub instance: ServerId,
    pub enabled: bool,
    pub shutting_down: bool,
    pub tags: Vec<String>,
    pub version: i64,
}

impl InstanceConfig {
    pub fn new(instance: impl Into<ServerId>, version: i64) -> Self {
        Self {
            instance: instance.into(),
            enabled: true,
            shutting_down: false,
            tags: vec![],
            version,
        }
    }

    /// Whether routing may send queries to this instance at all.
    pub fn can_serve_queries(&self) -> bool {
        self.enabled && !self.shutting_down
    }
}

/// Bare version stat of a state-store node, as returned by batched stat reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStat {
    pub version: i64,
}
