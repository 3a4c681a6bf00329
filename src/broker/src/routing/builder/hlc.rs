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
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tern_common::cluster::{ExternalView, InstanceConfig, SegmentId, SegmentState, ServerId};
use tern_common::segment::HlcSegmentName;

use super::{eligible_servers, RoutingTableBuilder};
use crate::error::RoutingResult;
use crate::routing::SegmentSetMap;

/// Builder for realtime tables ingested by high-level consumer groups.
///
/// A consumer group's segments are replicated as a unit, so a group is
/// routable to exactly those servers holding *all* of its segments online.
/// Plans are the cross-product of per-group server choices, capped.
pub struct HighLevelConsumerRoutingTableBuilder {
    routing_table_limit: usize,
    rng: Mutex<SmallRng>,
}

impl HighLevelConsumerRoutingTableBuilder {
    pub fn new(routing_table_limit: usize, seed: u64) -> Self {
        Self {
            routing_table_limit: routing_table_limit.max(1),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RoutingTableBuilder for HighLevelConsumerRoutingTableBuilder {
    fn compute(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &HashMap<ServerId, InstanceConfig>,
    ) -> RoutingResult<Vec<SegmentSetMap>> {
        let mut groups: BTreeMap<String, BTreeSet<SegmentId>> = BTreeMap::new();
        for segment in external_view.segment_states.keys() {
            // Low-level-consumer segments in the same view are not ours.
            if let Some(name) = HlcSegmentName::parse(segment) {
                groups.entry(name.group_id).or_default().insert(segment.clone());
            }
        }

        let mut rng = self.rng.lock();
        let mut plans: Vec<BTreeMap<ServerId, BTreeSet<SegmentId>>> = vec![BTreeMap::new()];

        for (group_id, segments) in &groups {
            let mut candidates: Option<HashSet<&ServerId>> = None;
            for segment in segments {
                let eligible: HashSet<&ServerId> = eligible_servers(
                    external_view,
                    segment,
                    SegmentState::Online,
                    instance_configs,
                )
                .into_iter()
                .collect();
                candidates = Some(match candidates {
                    None => eligible,
                    Some(held) => held.intersection(&eligible).copied().collect(),
                });
            }
            let mut group_servers: Vec<ServerId> = candidates
                .unwrap_or_default()
                .into_iter()
                .cloned()
                .collect();
            if group_servers.is_empty() {
                tracing::warn!(
                    table,
                    %group_id,
                    "no server holds every segment of the consumer group; group not routed"
                );
                continue;
            }
            group_servers.sort();
            group_servers.shuffle(&mut *rng);

            let mut extended: Vec<BTreeMap<ServerId, BTreeSet<SegmentId>>> = Vec::new();
            'extend: for plan in &plans {
                for server in &group_servers {
                    let mut next = plan.clone();
                    next.entry(server.clone())
                        .or_default()
                        .extend(segments.iter().cloned());
                    extended.push(next);
                    if extended.len() >= self.routing_table_limit {
                        break 'extend;
                    }
                }
            }
            plans = extended;
        }

        let mut seen = HashSet::new();
        Ok(plans
            .into_iter()
            .filter(|assignments| !assignments.is_empty())
            .map(SegmentSetMap::from_assignments)
            .filter(|plan| seen.insert(plan.clone()))
            .collect())
    }
}
