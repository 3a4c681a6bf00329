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

//! Physical table naming.
//!
//! A logical table is backed by up to two physical tables, distinguished by a
//! name suffix: `_OFFLINE` for batch-loaded segments and `_REALTIME` for
//! stream-ingested segments. A logical table with both is a *hybrid* table,
//! split in time by the broker's time boundary.

pub const OFFLINE_TABLE_SUFFIX: &str = "_OFFLINE";
pub const REALTIME_TABLE_SUFFIX: &str = "_REALTIME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Offline,
    Realtime,
}

impl TableType {
    /// Table type encoded in the physical table name, or `None` if the name
    /// carries no recognized suffix.
    pub fn of(table_name: &str) -> Option<TableType> {
        if table_name.ends_with(OFFLINE_TABLE_SUFFIX) {
            Some(TableType::Offline)
        } else if table_name.ends_with(REALTIME_TABLE_SUFFIX) {
            Some(TableType::Realtime)
        } else {
            None
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TableType::Offline => OFFLINE_TABLE_SUFFIX,
            TableType::Realtime => REALTIME_TABLE_SUFFIX,
        }
    }
}

/// Strips the table-type suffix, if any.
pub fn raw_table_name(table_name: &str) -> &str {
    match TableType::of(table_name) {
        Some(table_type) => &table_name[..table_name.len() - table_type.suffix().len()],
        None => table_name,
    }
}

pub fn offline_table_name(raw_name: &str) -> String {
    format!("{}{}", raw_name, OFFLINE_TABLE_SUFFIX)
}

pub fn realtime_table_name(raw_name: &str) -> String {
    format!("{}{}", raw_name, REALTIME_TABLE_SUFFIX)
}

/// The physical table of the opposite type backing the same logical table.
pub fn paired_table_name(table_name: &str) -> Option<String> {
    match TableType::of(table_name)? {
        TableType::Offline => Some(realtime_table_name(raw_table_name(table_name))),
        TableType::Realtime => Some(offline_table_name(raw_table_name(table_name))),
    }
}
