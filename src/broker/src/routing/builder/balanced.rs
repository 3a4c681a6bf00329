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

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tern_common::cluster::{ExternalView, InstanceConfig, SegmentState, ServerId};

use super::{eligible_servers, RoutingTableBuilder};
use crate::error::RoutingResult;
use crate::routing::SegmentSetMap;

/// Builder for offline tables.
///
/// Each plan covers every segment that has at least one eligible online
/// replica, assigning the segment to whichever eligible server currently
/// carries the fewest segments within the plan (ties broken at random).
/// Generating several plans and picking one at random per query spreads
/// load across replicas.
pub struct BalancedRandomRoutingTableBuilder {
    routing_table_count: usize,
    rng: Mutex<SmallRng>,
}

impl BalancedRandomRoutingTableBuilder {
    pub fn new(routing_table_count: usize, seed: u64) -> Self {
        Self {
            routing_table_count: routing_table_count.max(1),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RoutingTableBuilder for BalancedRandomRoutingTableBuilder {
    fn compute(
        &self,
        _table: &str,
        external_view: &ExternalView,
        instance_configs: &HashMap<ServerId, InstanceConfig>,
    ) -> RoutingResult<Vec<SegmentSetMap>> {
        let mut rng = self.rng.lock();
        let mut plans = Vec::with_capacity(self.routing_table_count);
        let mut seen = HashSet::new();

        for _ in 0..self.routing_table_count {
            let mut segments_per_server: HashMap<ServerId, usize> = HashMap::new();
            let mut assignments: BTreeMap<ServerId, BTreeSet<String>> = BTreeMap::new();

            for segment in external_view.segment_states.keys() {
                let eligible = eligible_servers(
                    external_view,
                    segment,
                    SegmentState::Online,
                    instance_configs,
                );
                if eligible.is_empty() {
                    // Partially unavailable table: the segment stays
                    // unrouted until a replica comes back online.
                    continue;
                }

                let least_loaded = eligible
                    .iter()
                    .map(|server| segments_per_server.get(server.as_str()).copied().unwrap_or(0))
                    .min()
                    .unwrap_or(0);
                let candidates: Vec<&ServerId> = eligible
                    .iter()
                    .copied()
                    .filter(|server| {
                        segments_per_server.get(server.as_str()).copied().unwrap_or(0)
                            == least_loaded
                    })
                    .collect();
                let Some(&chosen) = candidates.choose(&mut *rng) else {
                    continue;
                };

                *segments_per_server.entry(chosen.clone()).or_default() += 1;
                assignments
                    .entry(chosen.clone())
                    .or_default()
                    .insert(segment.clone());
            }

            if assignments.is_empty() {
                continue;
            }
            let plan = SegmentSetMap::from_assignments(assignments);
            if seen.insert(plan.clone()) {
                plans.push(plan);
            }
        }

        Ok(plans)
    }
}
