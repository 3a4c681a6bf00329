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

use std::collections::HashSet;

use itertools::Itertools;
use parking_lot::RwLock;

/// Per-table policy deciding whether a realtime query with both consumer
/// families available should be served from low-level-consumer plans.
///
/// Evaluated on every realtime query, so implementations must be cheap and
/// never block.
pub trait RoutingSelector: Send + Sync + 'static {
    /// Called whenever realtime plans are (re)built for `table`.
    fn register(&self, table: &str);

    fn should_use_llc(&self, table: &str) -> bool;
}

/// Default policy: always route through high-level-consumer plans.
/// Deployments migrating tables to low-level consumers plug in their own
/// selector backed by table config.
#[derive(Default)]
pub struct DefaultRoutingSelector {
    registered: RwLock<HashSet<String>>,
}

impl DefaultRoutingSelector {
    pub fn registered_tables(&self) -> Vec<String> {
        self.registered.read().iter().cloned().sorted().collect()
    }
}

impl RoutingSelector for DefaultRoutingSelector {
    fn register(&self, table: &str) {
        self.registered.write().insert(table.to_string());
    }

    fn should_use_llc(&self, _table: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selector_never_picks_llc() {
        let selector = DefaultRoutingSelector::default();
        selector.register("t_REALTIME");
        selector.register("u_REALTIME");
        selector.register("t_REALTIME");

        assert!(!selector.should_use_llc("t_REALTIME"));
        assert_eq!(
            selector.registered_tables(),
            ["t_REALTIME", "u_REALTIME"]
        );
    }
}
