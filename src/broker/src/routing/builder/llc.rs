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

use anyhow::anyhow;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tern_common::cluster::{ExternalView, InstanceConfig, SegmentId, SegmentState, ServerId};
use tern_common::segment::LlcSegmentName;

use super::{eligible_servers, RoutingTableBuilder};
use crate::error::{RoutingError, RoutingResult};
use crate::routing::SegmentSetMap;

/// Builder for realtime tables ingested by low-level (per-partition)
/// consumers.
///
/// Each stream partition is a sequence of completed segments plus at most one
/// segment still being consumed. A plan sends all completed segments of a
/// partition to one online server holding them all, and the consuming segment
/// to a server consuming it. Two consuming segments in one partition mean the
/// external view is inconsistent and the build is rejected.
pub struct LowLevelConsumerRoutingTableBuilder {
    routing_table_count: usize,
    rng: Mutex<SmallRng>,
}

#[derive(Default)]
struct PartitionSegments {
    completed: BTreeSet<SegmentId>,
    consuming: Option<SegmentId>,
}

impl LowLevelConsumerRoutingTableBuilder {
    pub fn new(routing_table_count: usize, seed: u64) -> Self {
        Self {
            routing_table_count: routing_table_count.max(1),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RoutingTableBuilder for LowLevelConsumerRoutingTableBuilder {
    fn compute(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &HashMap<ServerId, InstanceConfig>,
    ) -> RoutingResult<Vec<SegmentSetMap>> {
        let mut partitions: BTreeMap<u32, PartitionSegments> = BTreeMap::new();
        for (segment, servers) in &external_view.segment_states {
            // High-level-consumer segments in the same view are not ours.
            let Some(name) = LlcSegmentName::parse(segment) else {
                continue;
            };
            let partition = partitions.entry(name.partition).or_default();
            if servers.values().any(|s| *s == SegmentState::Online) {
                partition.completed.insert(segment.clone());
            } else if servers.values().any(|s| *s == SegmentState::Consuming) {
                if let Some(previous) = partition.consuming.replace(segment.clone()) {
                    return Err(RoutingError::builder(
                        table,
                        anyhow!(
                            "partition {} has two consuming segments: {} and {}",
                            name.partition,
                            previous,
                            segment
                        ),
                    ));
                }
            }
        }

        let mut rng = self.rng.lock();
        let mut plans = Vec::with_capacity(self.routing_table_count);
        let mut seen = HashSet::new();

        for _ in 0..self.routing_table_count {
            let mut assignments: BTreeMap<ServerId, BTreeSet<SegmentId>> = BTreeMap::new();

            for (partition, segments) in &partitions {
                if !segments.completed.is_empty() {
                    let mut holders: Option<HashSet<&ServerId>> = None;
                    for segment in &segments.completed {
                        let eligible: HashSet<&ServerId> = eligible_servers(
                            external_view,
                            segment,
                            SegmentState::Online,
                            instance_configs,
                        )
                        .into_iter()
                        .collect();
                        holders = Some(match holders {
                            None => eligible,
                            Some(held) => held.intersection(&eligible).copied().collect(),
                        });
                    }
                    let mut holders: Vec<&ServerId> =
                        holders.unwrap_or_default().into_iter().collect();
                    holders.sort();
                    match holders.choose(&mut *rng) {
                        Some(&server) => {
                            assignments
                                .entry(server.clone())
                                .or_default()
                                .extend(segments.completed.iter().cloned());
                        }
                        None => {
                            tracing::warn!(
                                table,
                                partition,
                                "no eligible server holds every completed segment; \
                                 partition history not routed"
                            );
                        }
                    }
                }

                if let Some(consuming) = &segments.consuming {
                    // For the open end of the partition, the consuming state
                    // plus an enabled instance is the only eligibility
                    // criterion.
                    let mut consumers: Vec<&ServerId> = external_view
                        .servers_in_state(consuming, SegmentState::Consuming)
                        .filter(|server| {
                            instance_configs.get(*server).is_some_and(|ic| ic.enabled)
                        })
                        .collect();
                    consumers.sort();
                    match consumers.choose(&mut *rng) {
                        Some(&server) => {
                            assignments
                                .entry(server.clone())
                                .or_default()
                                .insert(consuming.clone());
                        }
                        None => {
                            tracing::warn!(
                                table,
                                partition,
                                segment = %consuming,
                                "consuming segment has no eligible consumer; not routed"
                            );
                        }
                    }
                }
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
