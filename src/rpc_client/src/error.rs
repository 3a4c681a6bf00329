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

use thiserror::Error;

pub type RpcResult<T> = std::result::Result<T, RpcError>;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("failed to reach coordinator: {0}")]
    Transport(#[source] anyhow::Error),

    #[error("malformed record at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

impl RpcError {
    pub fn transport(msg: impl Into<String>) -> Self {
        RpcError::Transport(anyhow::anyhow!(msg.into()))
    }
}
