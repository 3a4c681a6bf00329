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

use tern_rpc_client::RpcError;
use thiserror::Error;

pub type RoutingResult<T> = std::result::Result<T, RoutingError>;

#[derive(Error, Debug)]
pub enum RoutingError {
    /// `FORCE_HLC` and `FORCE_LLC` were both requested.
    #[error("conflicting routing options: FORCE_HLC and FORCE_LLC are mutually exclusive")]
    ConflictingOptions,

    /// A forced consumer type has no published plans for the table.
    #[error("routing option {option} cannot be satisfied for table {table}")]
    UnsatisfiableRoutingOption { table: String, option: &'static str },

    /// A routing table builder rejected its input.
    #[error("routing table build failed for {table}: {source}")]
    Builder {
        table: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("coordinator fetch failed: {0}")]
    CoordinatorFetch(#[from] RpcError),

    /// No online segment of the table carried usable time metadata.
    #[error("cannot compute a time boundary for {table}")]
    TimeBoundary { table: String },

    #[error("failed to render routing snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl RoutingError {
    pub fn builder(table: impl Into<String>, source: anyhow::Error) -> Self {
        RoutingError::Builder {
            table: table.into(),
            source,
        }
    }
}
