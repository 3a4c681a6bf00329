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

//! The broker side of a Tern cluster.
//!
//! A broker never touches segment data itself. It watches the cluster state
//! the coordinator publishes (external views and instance configs), keeps an
//! in-memory routing plan per table, and answers, for each incoming query,
//! which server instances to contact and which segments each of them should
//! scan. See [`routing::RoutingTableManager`] for the hub of the subsystem.

pub mod config;
pub mod error;
pub mod monitor;
pub mod observer;
pub mod routing;
