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

//! Routing table builders.
//!
//! A builder turns one `(external view, instance configs)` observation into a
//! list of equivalent routing plans; the manager picks one plan per query at
//! random. Three builders exist, one per segment provenance: balanced-random
//! for offline tables, and the high-level / low-level consumer builders for
//! the two realtime segment families.
//!
//! Builders are pure with respect to cluster state: identical inputs yield
//! identical plans, up to the random choices drawn from the builder's own
//! generator, which is seeded once at construction. Empty or entirely
//! ineligible input yields an empty plan list, never an error.

mod balanced;
mod hlc;
mod llc;

use std::collections::HashMap;

pub use balanced::BalancedRandomRoutingTableBuilder;
pub use hlc::HighLevelConsumerRoutingTableBuilder;
pub use llc::LowLevelConsumerRoutingTableBuilder;
use tern_common::cluster::{ExternalView, InstanceConfig, SegmentState, ServerId};

use crate::error::RoutingResult;
use crate::routing::SegmentSetMap;

pub trait RoutingTableBuilder {
    /// Computes the routing plans for `table` from one external-view
    /// observation and the instance configs current at that observation.
    fn compute(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &HashMap<ServerId, InstanceConfig>,
    ) -> RoutingResult<Vec<SegmentSetMap>>;
}

/// Servers hosting `segment` in `state` whose instance config allows serving
/// queries, in deterministic order.
pub(crate) fn eligible_servers<'a>(
    external_view: &'a ExternalView,
    segment: &str,
    state: SegmentState,
    instance_configs: &HashMap<ServerId, InstanceConfig>,
) -> Vec<&'a ServerId> {
    let mut servers: Vec<_> = external_view
        .servers_in_state(segment, state)
        .filter(|server| {
            instance_configs
                .get(*server)
                .is_some_and(|ic| ic.can_serve_queries())
        })
        .collect();
    servers.sort();
    servers
}
