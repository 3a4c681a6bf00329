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

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;
use tern_common::cluster::{SegmentId, ServerId};

/// One routing plan: an immutable `server -> segments` assignment covering
/// every routable segment of a table.
///
/// Built once by a routing table builder and published behind an `Arc`;
/// never mutated afterwards. Equality and hashing are by content so that
/// builders can deduplicate equivalent plans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SegmentSetMap {
    assignments: BTreeMap<ServerId, BTreeSet<SegmentId>>,
}

impl SegmentSetMap {
    pub fn from_assignments(assignments: BTreeMap<ServerId, BTreeSet<SegmentId>>) -> Self {
        Self { assignments }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn server_set(&self) -> impl Iterator<Item = &ServerId> + '_ {
        self.assignments.keys()
    }

    pub fn segments_for(&self, server: &str) -> Option<&BTreeSet<SegmentId>> {
        self.assignments.get(server)
    }

    /// Owned copy in the shape the query layer consumes.
    pub fn to_server_map(&self) -> HashMap<ServerId, BTreeSet<SegmentId>> {
        self.assignments
            .iter()
            .map(|(server, segments)| (server.clone(), segments.clone()))
            .collect()
    }
}

impl fmt::Display for SegmentSetMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (server, segments) in &self.assignments {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{} -> [", server)?;
            let mut first_segment = true;
            for segment in segments {
                if !first_segment {
                    write!(f, ", ")?;
                }
                first_segment = false;
                write!(f, "{}", segment)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
