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

//! Client interface to the cluster coordinator's state store.
//!
//! The broker only ever *reads* coordinator state: external views, instance
//! configs, version stats and per-segment property records. The transport
//! behind this trait is provided by the deployment (the broker binary wires a
//! real client; tests wire [`MockCoordinatorClient`]).

mod error;
mod mock_coordinator_client;

use async_trait::async_trait;
pub use error::{RpcError, RpcResult};
pub use mock_coordinator_client::MockCoordinatorClient;
use tern_common::cluster::{ExternalView, InstanceConfig, PathStat};
use tern_common::segment::SegmentTimeMetadata;

/// State-store path of a table's external view, used in batched stat reads.
pub fn external_view_path(table: &str) -> String {
    format!("/EXTERNALVIEW/{}", table)
}

/// State-store path of an instance's config, used in batched stat reads.
pub fn instance_config_path(instance: &str) -> String {
    format!("/CONFIGS/INSTANCE/{}", instance)
}

/// Read-only client to the coordinator. All calls may block on network I/O
/// and must therefore stay outside any lock-protected critical section.
#[async_trait]
pub trait CoordinatorClient: Send + Sync + 'static {
    /// Latest external view of `table`, or `None` if the coordinator has no
    /// view for it (e.g. the table was just dropped).
    async fn fetch_external_view(&self, table: &str) -> RpcResult<Option<ExternalView>>;

    /// All instance configs known to the coordinator.
    async fn fetch_instance_configs(&self) -> RpcResult<Vec<InstanceConfig>>;

    /// Batched version stats for the given state-store paths. The result is
    /// positionally aligned with `paths`; a missing node yields `None`.
    async fn fetch_stats(&self, paths: &[String]) -> RpcResult<Vec<Option<PathStat>>>;

    /// Per-segment time metadata from the coordinator's property store.
    async fn read_segment_metadata(
        &self,
        table: &str,
        segment: &str,
    ) -> RpcResult<Option<SegmentTimeMetadata>>;
}
