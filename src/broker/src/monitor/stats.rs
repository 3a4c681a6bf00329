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

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry, Histogram,
    IntCounterVec, Registry,
};

pub struct BrokerMetrics {
    pub registry: Registry,
    pub hlc_query_count: IntCounterVec,
    pub llc_query_count: IntCounterVec,
    pub routing_table_rebuild_failures: IntCounterVec,
    pub routing_table_update_latency: Histogram,
}

impl BrokerMetrics {
    pub fn new(registry: Registry) -> Self {
        let hlc_query_count = register_int_counter_vec_with_registry!(
            "broker_hlc_query_count",
            "queries routed through high-level-consumer plans",
            &["table"],
            &registry
        )
        .unwrap();

        let llc_query_count = register_int_counter_vec_with_registry!(
            "broker_llc_query_count",
            "queries routed through low-level-consumer plans",
            &["table"],
            &registry
        )
        .unwrap();

        let routing_table_rebuild_failures = register_int_counter_vec_with_registry!(
            "broker_routing_table_rebuild_failures",
            "routing table rebuilds that failed and will be retried",
            &["table"],
            &registry
        )
        .unwrap();

        let routing_table_update_latency = register_histogram_with_registry!(
            "broker_routing_table_update_latency",
            "latency of routing table rebuilds",
            &registry,
        )
        .unwrap();

        Self {
            registry,
            hlc_query_count,
            llc_query_count,
            routing_table_rebuild_failures,
            routing_table_update_latency,
        }
    }

    /// Create a new `BrokerMetrics` instance used in tests or other places.
    pub fn for_test() -> Self {
        Self::new(Registry::new())
    }
}
