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

use serde::Deserialize;
use tern_common::segment::TimeGranularity;

/// Broker routing knobs, deserialized from the broker config file section
/// `[routing]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Balanced-random plans generated per offline rebuild.
    pub routing_table_count: usize,
    /// Plans generated per low-level-consumer rebuild.
    pub llc_routing_table_count: usize,
    /// Cap on the high-level-consumer group cross-product.
    pub hlc_routing_table_limit: usize,
    /// Granularity in which time boundaries are expressed.
    pub time_granularity: TimeGranularity,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            routing_table_count: 10,
            llc_routing_table_count: 4,
            hlc_routing_table_limit: 10,
            time_granularity: TimeGranularity::Days,
        }
    }
}
