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

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use tern_common::cluster::{ExternalView, InstanceConfig, PathStat};
use tern_common::segment::SegmentTimeMetadata;

use crate::{
    external_view_path, instance_config_path, CoordinatorClient, RpcError, RpcResult,
};

/// In-memory coordinator used by broker tests.
///
/// Holds the same state the real coordinator would publish and serves it
/// through the [`CoordinatorClient`] contract. Supports per-table fault
/// injection and counts external-view fetches so tests can assert that
/// version coalescing suppressed a refetch.
#[derive(Default)]
pub struct MockCoordinatorClient {
    state: RwLock<MockCoordinatorState>,
}

#[derive(Default)]
struct MockCoordinatorState {
    external_views: HashMap<String, ExternalView>,
    instance_configs: BTreeMap<String, InstanceConfig>,
    segment_metadata: HashMap<(String, String), SegmentTimeMetadata>,
    failing_external_views: HashSet<String>,
    external_view_fetches: HashMap<String, usize>,
}

impl MockCoordinatorClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_external_view(&self, external_view: ExternalView) {
        let mut state = self.state.write();
        state
            .external_views
            .insert(external_view.table.clone(), external_view);
    }

    pub fn remove_external_view(&self, table: &str) {
        self.state.write().external_views.remove(table);
    }

    pub fn put_instance_config(&self, instance_config: InstanceConfig) {
        let mut state = self.state.write();
        state
            .instance_configs
            .insert(instance_config.instance.clone(), instance_config);
    }

    pub fn put_segment_metadata(
        &self,
        table: &str,
        segment: &str,
        metadata: SegmentTimeMetadata,
    ) {
        self.state
            .write()
            .segment_metadata
            .insert((table.to_string(), segment.to_string()), metadata);
    }

    /// Makes subsequent `fetch_external_view(table)` calls fail with a
    /// transport error until cleared.
    pub fn fail_external_view(&self, table: &str, fail: bool) {
        let mut state = self.state.write();
        if fail {
            state.failing_external_views.insert(table.to_string());
        } else {
            state.failing_external_views.remove(table);
        }
    }

    /// How many times `fetch_external_view(table)` has been called.
    pub fn external_view_fetches(&self, table: &str) -> usize {
        self.state
            .read()
            .external_view_fetches
            .get(table)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CoordinatorClient for MockCoordinatorClient {
    async fn fetch_external_view(&self, table: &str) -> RpcResult<Option<ExternalView>> {
        let mut state = self.state.write();
        *state
            .external_view_fetches
            .entry(table.to_string())
            .or_default() += 1;
        if state.failing_external_views.contains(table) {
            return Err(RpcError::transport(format!(
                "injected failure reading external view of {}",
                table
            )));
        }
        Ok(state.external_views.get(table).cloned())
    }

    async fn fetch_instance_configs(&self) -> RpcResult<Vec<InstanceConfig>> {
        Ok(self.state.read().instance_configs.values().cloned().collect())
    }

    async fn fetch_stats(&self, paths: &[String]) -> RpcResult<Vec<Option<PathStat>>> {
        let state = self.state.read();
        Ok(paths
            .iter()
            .map(|path| {
                if let Some(table) = path.strip_prefix("/EXTERNALVIEW/") {
                    state
                        .external_views
                        .get(table)
                        .map(|ev| PathStat { version: ev.version })
                } else if let Some(instance) = path.strip_prefix("/CONFIGS/INSTANCE/") {
                    state
                        .instance_configs
                        .get(instance)
                        .map(|ic| PathStat { version: ic.version })
                } else {
                    None
                }
            })
            .collect())
    }

    async fn read_segment_metadata(
        &self,
        table: &str,
        segment: &str,
    ) -> RpcResult<Option<SegmentTimeMetadata>> {
        Ok(self
            .state
            .read()
            .segment_metadata
            .get(&(table.to_string(), segment.to_string()))
            .cloned())
    }
}
