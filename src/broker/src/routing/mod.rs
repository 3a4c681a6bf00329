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

//! Routing tables and the manager that keeps them fresh.
//!
//! [`RoutingTableManager`] owns the published routing plans for every table
//! this broker serves. Change-processing (single writer per table family)
//! rebuilds plans from coordinator state; the query path reads the published
//! `Arc`'d plan lists without ever blocking on a rebuild.

pub mod builder;
mod segment_set;
pub mod selector;
pub mod time_boundary;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
pub use segment_set::SegmentSetMap;
use tern_common::catalog::{offline_table_name, raw_table_name, realtime_table_name, TableType};
use tern_common::cluster::{
    ExternalView, InstanceConfig, SegmentId, ServerId, INVALID_EXTERNAL_VIEW_VERSION,
};
use tern_rpc_client::{external_view_path, instance_config_path, CoordinatorClient};

use crate::config::RoutingConfig;
use crate::error::{RoutingError, RoutingResult};
use crate::monitor::BrokerMetrics;
use crate::routing::builder::{
    BalancedRandomRoutingTableBuilder, HighLevelConsumerRoutingTableBuilder,
    LowLevelConsumerRoutingTableBuilder, RoutingTableBuilder,
};
use crate::routing::selector::{DefaultRoutingSelector, RoutingSelector};
use crate::routing::time_boundary::{TimeBoundaryInfo, TimeBoundaryService};

pub const FORCE_HLC_OPTION: &str = "FORCE_HLC";
pub const FORCE_LLC_OPTION: &str = "FORCE_LLC";

/// A routing lookup from the query layer.
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    pub table: String,
    /// Option strings, matched case-insensitively. At most one of
    /// `FORCE_HLC` / `FORCE_LLC` may be present.
    pub routing_options: Vec<String>,
}

impl RoutingRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            routing_options: vec![],
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.routing_options.push(option.into());
        self
    }

    fn has_option(&self, option: &str) -> bool {
        self.routing_options
            .iter()
            .any(|o| o.eq_ignore_ascii_case(option))
    }
}

pub type RoutingTableManagerRef = Arc<RoutingTableManager>;

/// The hub of broker routing.
///
/// Holds, per table, the published plan lists plus the bookkeeping needed to
/// decide whether an observed coordinator change requires a rebuild: the last
/// seen external-view version, the instance configs that were relevant to the
/// last build, and the instance -> tables reverse index.
///
/// Concurrency contract: the query path (`find_servers`, `dump_snapshot`)
/// reads concurrently from any thread; everything that mutates runs on the
/// change-processing tasks. Plan lists are swapped whole behind `Arc`s, so a
/// reader sees either the previous or the next build of a table, never a mix.
pub struct RoutingTableManager {
    host: String,
    coordinator_client: Arc<dyn CoordinatorClient>,
    metrics: Arc<BrokerMetrics>,
    time_boundary_service: TimeBoundaryService,
    routing_selector: Arc<dyn RoutingSelector>,

    offline_builder: BalancedRandomRoutingTableBuilder,
    hlc_builder: HighLevelConsumerRoutingTableBuilder,
    llc_builder: LowLevelConsumerRoutingTableBuilder,

    offline_routing_tables: DashMap<String, Arc<Vec<SegmentSetMap>>>,
    hlc_routing_tables: DashMap<String, Arc<Vec<SegmentSetMap>>>,
    llc_routing_tables: DashMap<String, Arc<Vec<SegmentSetMap>>>,

    last_external_view_versions: DashMap<String, i64>,
    /// Instance configs that were relevant (appeared in some plan) at the
    /// last build, per table.
    relevant_instance_configs: DashMap<String, HashMap<ServerId, InstanceConfig>>,
    /// Mirror of `relevant_instance_configs`, keyed by instance.
    last_instance_configs: DashMap<ServerId, InstanceConfig>,
    instance_to_tables: DashMap<ServerId, HashSet<String>>,
    /// Serializes creation of reverse-index entries and the cleanup pass in
    /// `mark_data_resource_offline`.
    instance_index_lock: Mutex<()>,

    rng: Mutex<SmallRng>,
    shutdown: AtomicBool,
}

impl RoutingTableManager {
    pub fn new(
        host: impl Into<String>,
        config: RoutingConfig,
        coordinator_client: Arc<dyn CoordinatorClient>,
        routing_selector: Arc<dyn RoutingSelector>,
        metrics: Arc<BrokerMetrics>,
    ) -> Self {
        Self::with_seed(
            host,
            config,
            coordinator_client,
            routing_selector,
            metrics,
            rand::random(),
        )
    }

    /// Create a new `RoutingTableManager` instance used in tests or other
    /// places: mock-backed, default policy, deterministic seed.
    pub fn for_test(coordinator_client: Arc<dyn CoordinatorClient>) -> Self {
        Self::with_seed(
            "broker-1.test:8099",
            RoutingConfig::default(),
            coordinator_client,
            Arc::new(DefaultRoutingSelector::default()),
            Arc::new(BrokerMetrics::for_test()),
            42,
        )
    }

    fn with_seed(
        host: impl Into<String>,
        config: RoutingConfig,
        coordinator_client: Arc<dyn CoordinatorClient>,
        routing_selector: Arc<dyn RoutingSelector>,
        metrics: Arc<BrokerMetrics>,
        seed: u64,
    ) -> Self {
        let mut seeder = SmallRng::seed_from_u64(seed);
        let time_boundary_service =
            TimeBoundaryService::new(coordinator_client.clone(), config.time_granularity);
        Self {
            host: host.into(),
            coordinator_client,
            metrics,
            time_boundary_service,
            routing_selector,
            offline_builder: BalancedRandomRoutingTableBuilder::new(
                config.routing_table_count,
                seeder.next_u64(),
            ),
            hlc_builder: HighLevelConsumerRoutingTableBuilder::new(
                config.hlc_routing_table_limit,
                seeder.next_u64(),
            ),
            llc_builder: LowLevelConsumerRoutingTableBuilder::new(
                config.llc_routing_table_count,
                seeder.next_u64(),
            ),
            offline_routing_tables: DashMap::new(),
            hlc_routing_tables: DashMap::new(),
            llc_routing_tables: DashMap::new(),
            last_external_view_versions: DashMap::new(),
            relevant_instance_configs: DashMap::new(),
            last_instance_configs: DashMap::new(),
            instance_to_tables: DashMap::new(),
            instance_index_lock: Mutex::new(()),
            rng: Mutex::new(SmallRng::seed_from_u64(seeder.next_u64())),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Subsequent change handlers become no-ops; in-flight queries and the
    /// published plans are unaffected.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Query path
    // ------------------------------------------------------------------

    /// Picks one plan for the request's table, uniformly at random among the
    /// published alternatives, and returns its `server -> segments` mapping.
    /// An unknown or currently unroutable table yields an empty mapping.
    ///
    /// Never blocks on rebuilds: the plan list read here is whatever build
    /// was last published.
    pub fn find_servers(
        &self,
        request: &RoutingRequest,
    ) -> RoutingResult<HashMap<ServerId, BTreeSet<SegmentId>>> {
        let force_hlc = request.has_option(FORCE_HLC_OPTION);
        let force_llc = request.has_option(FORCE_LLC_OPTION);
        if force_hlc && force_llc {
            return Err(RoutingError::ConflictingOptions);
        }
        let table = request.table.as_str();

        let plans = match TableType::of(table) {
            Some(TableType::Realtime) => {
                let hlc = self.hlc_routing_tables.get(table).map(|e| e.value().clone());
                let llc = self.llc_routing_tables.get(table).map(|e| e.value().clone());
                match (hlc, llc) {
                    (Some(hlc), Some(llc)) => {
                        let use_llc = if force_llc {
                            true
                        } else if force_hlc {
                            false
                        } else {
                            self.routing_selector.should_use_llc(table)
                        };
                        if use_llc {
                            self.metrics.llc_query_count.with_label_values(&[table]).inc();
                            Some(llc)
                        } else {
                            self.metrics.hlc_query_count.with_label_values(&[table]).inc();
                            Some(hlc)
                        }
                    }
                    (Some(hlc), None) => {
                        if force_llc {
                            return Err(RoutingError::UnsatisfiableRoutingOption {
                                table: table.to_string(),
                                option: FORCE_LLC_OPTION,
                            });
                        }
                        self.metrics.hlc_query_count.with_label_values(&[table]).inc();
                        Some(hlc)
                    }
                    (None, Some(llc)) => {
                        if force_hlc {
                            return Err(RoutingError::UnsatisfiableRoutingOption {
                                table: table.to_string(),
                                option: FORCE_HLC_OPTION,
                            });
                        }
                        self.metrics.llc_query_count.with_label_values(&[table]).inc();
                        Some(llc)
                    }
                    (None, None) => None,
                }
            }
            _ => self
                .offline_routing_tables
                .get(table)
                .map(|e| e.value().clone()),
        };

        let Some(plans) = plans else {
            return Ok(HashMap::new());
        };
        let chosen = {
            let mut rng = self.rng.lock();
            plans.choose(&mut *rng).cloned()
        };
        Ok(chosen.map(|plan| plan.to_server_map()).unwrap_or_default())
    }

    pub fn routing_table_exists(&self, table: &str) -> bool {
        self.offline_routing_tables.contains_key(table)
            || self.hlc_routing_tables.contains_key(table)
            || self.llc_routing_tables.contains_key(table)
    }

    /// Human-readable JSON rendering of the offline and low-level-consumer
    /// plan tables plus this broker's identity, optionally filtered by table
    /// name prefix.
    pub fn dump_snapshot(&self, table_prefix: Option<&str>) -> RoutingResult<String> {
        let matches =
            |table: &str| table_prefix.is_none_or(|prefix| table.starts_with(prefix));
        let mut offline: BTreeMap<String, Vec<SegmentSetMap>> = BTreeMap::new();
        for entry in self.offline_routing_tables.iter() {
            if matches(entry.key()) {
                offline.insert(entry.key().clone(), entry.value().as_ref().clone());
            }
        }
        let mut llc: BTreeMap<String, Vec<SegmentSetMap>> = BTreeMap::new();
        for entry in self.llc_routing_tables.iter() {
            if matches(entry.key()) {
                llc.insert(entry.key().clone(), entry.value().as_ref().clone());
            }
        }
        let snapshot = serde_json::json!({
            "host": self.host,
            "offline_routing_tables": offline,
            "llc_routing_tables": llc,
        });
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    // ------------------------------------------------------------------
    // Diagnostic accessors
    // ------------------------------------------------------------------

    pub fn offline_plans(&self, table: &str) -> Option<Arc<Vec<SegmentSetMap>>> {
        self.offline_routing_tables.get(table).map(|e| e.value().clone())
    }

    pub fn hlc_plans(&self, table: &str) -> Option<Arc<Vec<SegmentSetMap>>> {
        self.hlc_routing_tables.get(table).map(|e| e.value().clone())
    }

    pub fn llc_plans(&self, table: &str) -> Option<Arc<Vec<SegmentSetMap>>> {
        self.llc_routing_tables.get(table).map(|e| e.value().clone())
    }

    pub fn last_external_view_version(&self, table: &str) -> Option<i64> {
        self.last_external_view_versions.get(table).map(|e| *e.value())
    }

    pub fn time_boundary(&self, offline_table: &str) -> Option<TimeBoundaryInfo> {
        self.time_boundary_service.get(offline_table)
    }

    pub fn metrics(&self) -> &BrokerMetrics {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Change processing
    // ------------------------------------------------------------------

    /// A table became routable. `None` for the external view records the
    /// table with the invalid version sentinel so that the next observed
    /// change rebuilds it unconditionally.
    pub async fn mark_data_resource_online(
        &self,
        table: &str,
        external_view: Option<&ExternalView>,
        instance_configs: &[InstanceConfig],
    ) {
        if self.is_shutdown() {
            return;
        }
        match external_view {
            None => {
                self.last_external_view_versions
                    .insert(table.to_string(), INVALID_EXTERNAL_VIEW_VERSION);
            }
            Some(external_view) => {
                self.build_routing_table(table, external_view, instance_configs)
                    .await;
            }
        }
    }

    /// Rebuilds and republishes the routing tables of one table from a fresh
    /// external-view observation.
    ///
    /// On failure the previously published plans stay in place, the cached
    /// version becomes the invalid sentinel and the failure counter is
    /// bumped; the next observed change retries. A failure of the
    /// low-level-consumer builder alone does not fail the build.
    pub async fn build_routing_table(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &[InstanceConfig],
    ) {
        let _timer = self.metrics.routing_table_update_latency.start_timer();
        if let Err(error) = self
            .try_build_routing_table(table, external_view, instance_configs)
            .await
        {
            tracing::error!(
                error = %error,
                table,
                "routing table rebuild failed; keeping previous plans and retrying on the next change"
            );
            self.last_external_view_versions
                .insert(table.to_string(), INVALID_EXTERNAL_VIEW_VERSION);
            self.metrics
                .routing_table_rebuild_failures
                .with_label_values(&[table])
                .inc();
        }
    }

    async fn try_build_routing_table(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &[InstanceConfig],
    ) -> RoutingResult<()> {
        let table_type = TableType::of(table);
        self.last_external_view_versions
            .insert(table.to_string(), external_view.version);

        let configs_by_instance: HashMap<ServerId, InstanceConfig> = instance_configs
            .iter()
            .map(|ic| (ic.instance.clone(), ic.clone()))
            .collect();
        let mut relevant: HashMap<ServerId, InstanceConfig> = HashMap::new();

        match table_type {
            Some(TableType::Realtime) => {
                let hlc_plans =
                    self.hlc_builder
                        .compute(table, external_view, &configs_by_instance)?;
                collect_relevant(&mut relevant, &hlc_plans, &configs_by_instance);
                publish(&self.hlc_routing_tables, table, hlc_plans);
                self.routing_selector.register(table);

                // A failure here must not take down the primary publish; the
                // previous low-level plans keep serving.
                match self
                    .llc_builder
                    .compute(table, external_view, &configs_by_instance)
                {
                    Ok(llc_plans) => {
                        collect_relevant(&mut relevant, &llc_plans, &configs_by_instance);
                        publish(&self.llc_routing_tables, table, llc_plans);
                    }
                    Err(error) => {
                        tracing::warn!(
                            error = %error,
                            table,
                            "low-level consumer build failed; keeping previous plans"
                        );
                    }
                }
            }
            _ => {
                let plans =
                    self.offline_builder
                        .compute(table, external_view, &configs_by_instance)?;
                collect_relevant(&mut relevant, &plans, &configs_by_instance);
                publish(&self.offline_routing_tables, table, plans);
            }
        }

        self.replace_relevant_instance_configs(table, relevant);
        self.reconcile_time_boundary(table, table_type, external_view)
            .await;
        Ok(())
    }

    /// Whether an observed `(external view, instance configs)` pair differs
    /// from the cached observation in a way that affects routing.
    ///
    /// A version-only bump of an instance config (no change to `enabled` /
    /// `shutting_down`) refreshes the cache in place without rebuilding.
    pub fn is_rebuild_required(
        &self,
        table: &str,
        external_view: &ExternalView,
        instance_configs: &HashMap<ServerId, InstanceConfig>,
    ) -> bool {
        let Some(last_version) = self.last_external_view_version(table) else {
            return true;
        };
        if last_version == INVALID_EXTERNAL_VIEW_VERSION
            || last_version != external_view.version
        {
            return true;
        }

        let mut refreshed: Vec<InstanceConfig> = vec![];
        {
            let Some(last_relevant) = self.relevant_instance_configs.get(table) else {
                return true;
            };
            if last_relevant.is_empty() {
                return true;
            }
            for (instance, last_config) in last_relevant.iter() {
                let Some(fresh) = instance_configs.get(instance) else {
                    // The relevant subset shrank.
                    return true;
                };
                if fresh.version != last_config.version {
                    if fresh.enabled != last_config.enabled
                        || fresh.shutting_down != last_config.shutting_down
                    {
                        return true;
                    }
                    refreshed.push(fresh.clone());
                }
            }
        }

        if !refreshed.is_empty() {
            let _guard = self.instance_index_lock.lock();
            if let Some(mut relevant) = self.relevant_instance_configs.get_mut(table) {
                for config in &refreshed {
                    relevant.insert(config.instance.clone(), config.clone());
                }
            }
            for config in refreshed {
                self.last_instance_configs
                    .insert(config.instance.clone(), config);
            }
        }
        false
    }

    /// Coalesced external-view change handler.
    ///
    /// Change notifications carry no trustworthy payload (they may be stale
    /// or batched), so this walks every known table, diffs the coordinator's
    /// version stats against the cache in one batched read, and refetches
    /// only the tables that actually moved.
    pub async fn process_external_view_change(&self) {
        if self.is_shutdown() {
            return;
        }
        let tables: Vec<String> = self
            .last_external_view_versions
            .iter()
            .map(|e| e.key().clone())
            .collect();
        if tables.is_empty() {
            return;
        }

        let paths: Vec<String> = tables.iter().map(|t| external_view_path(t)).collect();
        let stats = match self.coordinator_client.fetch_stats(&paths).await {
            Ok(stats) => stats,
            Err(error) => {
                tracing::warn!(error = %error, "failed to stat external views; will retry");
                return;
            }
        };

        let mut changed: Vec<String> = vec![];
        for (table, stat) in tables.into_iter().zip(stats) {
            // A vanished view is not a change: removal arrives through
            // `mark_data_resource_offline`.
            let Some(stat) = stat else {
                continue;
            };
            let last = self
                .last_external_view_version(&table)
                .unwrap_or(INVALID_EXTERNAL_VIEW_VERSION);
            if last == INVALID_EXTERNAL_VIEW_VERSION || stat.version != last {
                changed.push(table);
            }
        }
        if changed.is_empty() {
            return;
        }
        tracing::info!(tables = ?changed, "external views changed; rebuilding routing tables");

        let instance_configs = match self.coordinator_client.fetch_instance_configs().await {
            Ok(configs) => configs,
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch instance configs; will retry");
                return;
            }
        };
        for table in changed {
            self.refetch_and_build(&table, &instance_configs, None).await;
        }
    }

    /// Coalesced instance-config change handler: stats every instance that
    /// was relevant to some table at its last build, and rebuilds the tables
    /// referencing instances whose config version moved.
    pub async fn process_instance_config_change(&self) {
        if self.is_shutdown() {
            return;
        }
        let instances: Vec<String> = self
            .last_instance_configs
            .iter()
            .map(|e| e.key().clone())
            .collect();
        if instances.is_empty() {
            return;
        }

        let paths: Vec<String> = instances.iter().map(|i| instance_config_path(i)).collect();
        let stats = match self.coordinator_client.fetch_stats(&paths).await {
            Ok(stats) => stats,
            Err(error) => {
                tracing::warn!(error = %error, "failed to stat instance configs; will retry");
                return;
            }
        };

        let mut changed_instances: Vec<String> = vec![];
        for (instance, stat) in instances.into_iter().zip(stats) {
            let Some(stat) = stat else {
                continue;
            };
            let cached_version = self
                .last_instance_configs
                .get(&instance)
                .map(|e| e.value().version);
            if cached_version.is_some_and(|v| v != stat.version) {
                changed_instances.push(instance);
            }
        }
        if changed_instances.is_empty() {
            return;
        }

        let mut affected_tables: Vec<String> = changed_instances
            .iter()
            .filter_map(|instance| self.instance_to_tables.get(instance))
            .flat_map(|tables| tables.value().iter().cloned().collect::<Vec<_>>())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        affected_tables.sort();
        if affected_tables.is_empty() {
            return;
        }
        tracing::info!(
            instances = ?changed_instances,
            tables = ?affected_tables,
            "instance configs changed; re-checking routing tables"
        );

        let instance_configs = match self.coordinator_client.fetch_instance_configs().await {
            Ok(configs) => configs,
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch instance configs; will retry");
                return;
            }
        };
        let configs_by_instance: HashMap<ServerId, InstanceConfig> = instance_configs
            .iter()
            .map(|ic| (ic.instance.clone(), ic.clone()))
            .collect();
        for table in affected_tables {
            self.refetch_and_build(&table, &instance_configs, Some(&configs_by_instance))
                .await;
        }
    }

    /// Fetches the latest external view of `table` and rebuilds. When
    /// `rebuild_check` is given, the rebuild is skipped unless
    /// [`Self::is_rebuild_required`] says otherwise.
    async fn refetch_and_build(
        &self,
        table: &str,
        instance_configs: &[InstanceConfig],
        rebuild_check: Option<&HashMap<ServerId, InstanceConfig>>,
    ) {
        match self.coordinator_client.fetch_external_view(table).await {
            Ok(Some(external_view)) => {
                if let Some(configs_by_instance) = rebuild_check {
                    if !self.is_rebuild_required(table, &external_view, configs_by_instance) {
                        return;
                    }
                }
                self.build_routing_table(table, &external_view, instance_configs)
                    .await;
            }
            Ok(None) => {
                self.last_external_view_versions
                    .insert(table.to_string(), INVALID_EXTERNAL_VIEW_VERSION);
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    table,
                    "failed to fetch external view; keeping previous plans"
                );
                self.last_external_view_versions
                    .insert(table.to_string(), INVALID_EXTERNAL_VIEW_VERSION);
                self.metrics
                    .routing_table_rebuild_failures
                    .with_label_values(&[table])
                    .inc();
            }
        }
    }

    /// Drops every trace of `table`: plans, version cache, time boundary,
    /// relevant instance configs, and reverse-index entries (instances left
    /// referencing no table at all are dropped entirely).
    pub fn mark_data_resource_offline(&self, table: &str) {
        if self.is_shutdown() {
            return;
        }
        self.offline_routing_tables.remove(table);
        self.hlc_routing_tables.remove(table);
        self.llc_routing_tables.remove(table);
        self.last_external_view_versions.remove(table);
        self.time_boundary_service.remove(table);

        let _guard = self.instance_index_lock.lock();
        self.relevant_instance_configs.remove(table);
        let mut orphaned: Vec<ServerId> = vec![];
        for mut entry in self.instance_to_tables.iter_mut() {
            entry.value_mut().remove(table);
            if entry.value().is_empty() {
                orphaned.push(entry.key().clone());
            }
        }
        for instance in orphaned {
            self.instance_to_tables.remove(&instance);
            self.last_instance_configs.remove(&instance);
        }
    }

    fn replace_relevant_instance_configs(
        &self,
        table: &str,
        relevant: HashMap<ServerId, InstanceConfig>,
    ) {
        let _guard = self.instance_index_lock.lock();
        let previous: Vec<ServerId> = self
            .relevant_instance_configs
            .get(table)
            .map(|e| e.value().keys().cloned().collect())
            .unwrap_or_default();
        for instance in previous {
            if !relevant.contains_key(&instance) {
                if let Some(mut tables) = self.instance_to_tables.get_mut(&instance) {
                    tables.remove(table);
                }
            }
        }
        for (instance, config) in &relevant {
            self.instance_to_tables
                .entry(instance.clone())
                .or_default()
                .insert(table.to_string());
            self.last_instance_configs
                .insert(instance.clone(), config.clone());
        }
        self.relevant_instance_configs
            .insert(table.to_string(), relevant);
    }

    /// Keeps the hybrid time boundary in step with the published plans.
    ///
    /// An offline build refreshes the boundary whenever the paired realtime
    /// table is already routable. A realtime build seeds the boundary once,
    /// from the paired offline table's view, so hybrid queries become
    /// splittable as soon as both sides route. Boundary trouble is logged
    /// and never fails the build.
    async fn reconcile_time_boundary(
        &self,
        table: &str,
        table_type: Option<TableType>,
        external_view: &ExternalView,
    ) {
        match table_type {
            Some(TableType::Offline) => {
                let realtime_table = realtime_table_name(raw_table_name(table));
                let realtime_routable = self.hlc_routing_tables.contains_key(&realtime_table)
                    || self.llc_routing_tables.contains_key(&realtime_table);
                if !realtime_routable {
                    return;
                }
                if let Err(error) = self.time_boundary_service.update(external_view).await {
                    tracing::warn!(error = %error, table, "time boundary update failed");
                }
            }
            Some(TableType::Realtime) => {
                let offline_table = offline_table_name(raw_table_name(table));
                if !self.offline_routing_tables.contains_key(&offline_table)
                    || self.time_boundary_service.get(&offline_table).is_some()
                {
                    return;
                }
                match self
                    .coordinator_client
                    .fetch_external_view(&offline_table)
                    .await
                {
                    Ok(Some(offline_view)) => {
                        if let Err(error) =
                            self.time_boundary_service.update(&offline_view).await
                        {
                            tracing::warn!(
                                error = %error,
                                table = %offline_table,
                                "time boundary update failed"
                            );
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!(
                            error = %error,
                            table = %offline_table,
                            "failed to fetch offline view for time boundary"
                        );
                    }
                }
            }
            None => {}
        }
    }
}

fn publish(
    routing_tables: &DashMap<String, Arc<Vec<SegmentSetMap>>>,
    table: &str,
    plans: Vec<SegmentSetMap>,
) {
    // An empty plan list is represented by absence.
    if plans.is_empty() {
        routing_tables.remove(table);
    } else {
        routing_tables.insert(table.to_string(), Arc::new(plans));
    }
}

fn collect_relevant(
    relevant: &mut HashMap<ServerId, InstanceConfig>,
    plans: &[SegmentSetMap],
    configs_by_instance: &HashMap<ServerId, InstanceConfig>,
) {
    for plan in plans {
        for server in plan.server_set() {
            if let Some(config) = configs_by_instance.get(server) {
                relevant.insert(server.clone(), config.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use expect_test::expect;
    use tern_common::cluster::SegmentState;
    use tern_common::segment::{SegmentTimeMetadata, TimeGranularity};
    use tern_rpc_client::MockCoordinatorClient;

    use super::*;

    fn online_view(table: &str, version: i64, placements: &[(&str, &[&str])]) -> ExternalView {
        let mut ev = ExternalView::new(table, version);
        for (segment, servers) in placements {
            for server in *servers {
                ev.set_state(*segment, *server, SegmentState::Online);
            }
        }
        ev
    }

    fn instance_configs(instances: &[&str]) -> Vec<InstanceConfig> {
        instances.iter().map(|i| InstanceConfig::new(*i, 1)).collect()
    }

    fn days_metadata(end_time: i64) -> SegmentTimeMetadata {
        SegmentTimeMetadata {
            time_column: "ts".to_string(),
            end_time,
            time_unit: TimeGranularity::Days,
        }
    }

    fn test_manager() -> (Arc<MockCoordinatorClient>, RoutingTableManager) {
        let client = Arc::new(MockCoordinatorClient::new());
        let manager = RoutingTableManager::for_test(client.clone());
        (client, manager)
    }

    #[tokio::test]
    async fn test_cold_start_routes_either_replica() {
        let (_client, manager) = test_manager();
        let ev = online_view("t_OFFLINE", 3, &[("s1", &["server_a", "server_b"])]);
        manager
            .mark_data_resource_online(
                "t_OFFLINE",
                Some(&ev),
                &instance_configs(&["server_a", "server_b"]),
            )
            .await;
        assert!(manager.routing_table_exists("t_OFFLINE"));

        let mut seen = HashSet::new();
        for _ in 0..64 {
            let routed = manager.find_servers(&RoutingRequest::new("t_OFFLINE")).unwrap();
            assert_eq!(routed.len(), 1);
            let (server, segments) = routed.iter().next().unwrap();
            assert!(["server_a", "server_b"].contains(&server.as_str()));
            assert_eq!(segments.iter().collect::<Vec<_>>(), ["s1"]);
            seen.insert(server.clone());
        }
        assert_eq!(seen.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_table_routes_nowhere() {
        let (_client, manager) = test_manager();
        assert!(!manager.routing_table_exists("t_OFFLINE"));
        assert!(manager
            .find_servers(&RoutingRequest::new("t_OFFLINE"))
            .unwrap()
            .is_empty());
        assert!(manager
            .find_servers(&RoutingRequest::new("t_REALTIME"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_force_options() {
        let (_client, manager) = test_manager();
        let request = RoutingRequest::new("t_REALTIME")
            .with_option("force_hlc")
            .with_option("FORCE_LLC");
        assert_matches!(
            manager.find_servers(&request),
            Err(RoutingError::ConflictingOptions)
        );
    }

    #[tokio::test]
    async fn test_force_llc_without_llc_plans() {
        let (_client, manager) = test_manager();
        let ev = online_view("t_REALTIME", 1, &[("t__g0__0", &["server_a"])]);
        manager
            .mark_data_resource_online("t_REALTIME", Some(&ev), &instance_configs(&["server_a"]))
            .await;
        assert!(manager.hlc_plans("t_REALTIME").is_some());
        assert!(manager.llc_plans("t_REALTIME").is_none());

        let forced = RoutingRequest::new("t_REALTIME").with_option(FORCE_LLC_OPTION);
        assert_matches!(
            manager.find_servers(&forced),
            Err(RoutingError::UnsatisfiableRoutingOption { option, .. })
                if option == FORCE_LLC_OPTION
        );

        let routed = manager.find_servers(&RoutingRequest::new("t_REALTIME")).unwrap();
        assert!(routed.contains_key("server_a"));
        assert_eq!(
            manager
                .metrics()
                .hlc_query_count
                .with_label_values(&["t_REALTIME"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_force_hlc_without_hlc_plans() {
        let (_client, manager) = test_manager();
        let mut ev = online_view("t_REALTIME", 1, &[("t__0__0__20260801T00", &["server_a"])]);
        ev.set_state("t__0__1__20260801T01", "server_a", SegmentState::Consuming);
        manager
            .mark_data_resource_online("t_REALTIME", Some(&ev), &instance_configs(&["server_a"]))
            .await;
        assert!(manager.hlc_plans("t_REALTIME").is_none());
        assert!(manager.llc_plans("t_REALTIME").is_some());

        let forced = RoutingRequest::new("t_REALTIME").with_option(FORCE_HLC_OPTION);
        assert_matches!(
            manager.find_servers(&forced),
            Err(RoutingError::UnsatisfiableRoutingOption { option, .. })
                if option == FORCE_HLC_OPTION
        );

        let routed = manager.find_servers(&RoutingRequest::new("t_REALTIME")).unwrap();
        assert_eq!(routed["server_a"].len(), 2);
        assert_eq!(
            manager
                .metrics()
                .llc_query_count
                .with_label_values(&["t_REALTIME"])
                .get(),
            1
        );
    }

    struct AlwaysLlcSelector;

    impl RoutingSelector for AlwaysLlcSelector {
        fn register(&self, _table: &str) {}

        fn should_use_llc(&self, _table: &str) -> bool {
            true
        }
    }

    async fn hybrid_consumer_manager(
        selector: Arc<dyn RoutingSelector>,
    ) -> RoutingTableManager {
        let client = Arc::new(MockCoordinatorClient::new());
        let manager = RoutingTableManager::new(
            "broker-1.test:8099",
            RoutingConfig::default(),
            client,
            selector,
            Arc::new(BrokerMetrics::for_test()),
        );
        let ev = online_view(
            "t_REALTIME",
            1,
            &[("t__g0__0", &["server_a"]), ("t__0__0__20260801T00", &["server_a"])],
        );
        manager
            .mark_data_resource_online("t_REALTIME", Some(&ev), &instance_configs(&["server_a"]))
            .await;
        assert!(manager.hlc_plans("t_REALTIME").is_some());
        assert!(manager.llc_plans("t_REALTIME").is_some());
        manager
    }

    #[tokio::test]
    async fn test_selector_decides_between_consumer_families() {
        // Default policy routes through the high-level consumer family.
        let manager = hybrid_consumer_manager(Arc::new(DefaultRoutingSelector::default())).await;
        manager.find_servers(&RoutingRequest::new("t_REALTIME")).unwrap();
        assert_eq!(
            manager.metrics().hlc_query_count.with_label_values(&["t_REALTIME"]).get(),
            1
        );
        assert_eq!(
            manager.metrics().llc_query_count.with_label_values(&["t_REALTIME"]).get(),
            0
        );

        let manager = hybrid_consumer_manager(Arc::new(AlwaysLlcSelector)).await;
        manager.find_servers(&RoutingRequest::new("t_REALTIME")).unwrap();
        assert_eq!(
            manager.metrics().llc_query_count.with_label_values(&["t_REALTIME"]).get(),
            1
        );

        // A forced option overrides the selector.
        let routed = manager
            .find_servers(&RoutingRequest::new("t_REALTIME").with_option(FORCE_HLC_OPTION))
            .unwrap();
        assert!(routed["server_a"].contains("t__g0__0"));
        assert_eq!(
            manager.metrics().hlc_query_count.with_label_values(&["t_REALTIME"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn test_unchanged_version_is_not_rebuilt() {
        let (client, manager) = test_manager();
        let ev = online_view("t_OFFLINE", 5, &[("s1", &["server_a"])]);
        client.put_external_view(ev.clone());
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        manager
            .mark_data_resource_online("t_OFFLINE", Some(&ev), &instance_configs(&["server_a"]))
            .await;
        let before = manager.offline_plans("t_OFFLINE").unwrap();

        // A change notification arrives while the coordinator still reports
        // version 5: nothing is refetched, nothing is republished.
        manager.process_external_view_change().await;
        assert_eq!(client.external_view_fetches("t_OFFLINE"), 0);
        assert!(Arc::ptr_eq(&before, &manager.offline_plans("t_OFFLINE").unwrap()));
        assert_eq!(
            manager
                .metrics()
                .routing_table_rebuild_failures
                .with_label_values(&["t_OFFLINE"])
                .get(),
            0
        );
    }

    #[tokio::test]
    async fn test_version_bump_rebuilds() {
        let (client, manager) = test_manager();
        let ev1 = online_view("t_OFFLINE", 1, &[("s1", &["server_a"])]);
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        manager
            .mark_data_resource_online("t_OFFLINE", Some(&ev1), &instance_configs(&["server_a"]))
            .await;

        client.put_external_view(online_view(
            "t_OFFLINE",
            2,
            &[("s1", &["server_a"]), ("s2", &["server_a"])],
        ));
        manager.process_external_view_change().await;

        assert_eq!(manager.last_external_view_version("t_OFFLINE"), Some(2));
        let routed = manager.find_servers(&RoutingRequest::new("t_OFFLINE")).unwrap();
        assert_eq!(routed["server_a"].iter().collect::<Vec<_>>(), ["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_invalid_sentinel_forces_rebuild() {
        let (client, manager) = test_manager();
        client.put_external_view(online_view("t_OFFLINE", 5, &[("s1", &["server_a"])]));
        client.put_instance_config(InstanceConfig::new("server_a", 1));

        // Online with no view yet: only the sentinel is recorded.
        manager
            .mark_data_resource_online("t_OFFLINE", None, &instance_configs(&["server_a"]))
            .await;
        assert_eq!(
            manager.last_external_view_version("t_OFFLINE"),
            Some(INVALID_EXTERNAL_VIEW_VERSION)
        );
        assert!(!manager.routing_table_exists("t_OFFLINE"));

        manager.process_external_view_change().await;
        assert_eq!(client.external_view_fetches("t_OFFLINE"), 1);
        assert_eq!(manager.last_external_view_version("t_OFFLINE"), Some(5));
        assert!(manager.routing_table_exists("t_OFFLINE"));
    }

    #[tokio::test]
    async fn test_instance_disable_rebuilds_without_it() {
        let (client, manager) = test_manager();
        let ev = online_view(
            "t_OFFLINE",
            3,
            &[("s1", &["server_a", "server_b"]), ("s2", &["server_a", "server_b"])],
        );
        client.put_external_view(ev.clone());
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        client.put_instance_config(InstanceConfig::new("server_b", 1));
        manager
            .mark_data_resource_online(
                "t_OFFLINE",
                Some(&ev),
                &instance_configs(&["server_a", "server_b"]),
            )
            .await;

        let mut disabled = InstanceConfig::new("server_a", 2);
        disabled.enabled = false;
        client.put_instance_config(disabled);
        manager.process_instance_config_change().await;

        let plans = manager.offline_plans("t_OFFLINE").unwrap();
        assert!(!plans.is_empty());
        for plan in plans.iter() {
            assert_eq!(plan.server_set().collect::<Vec<_>>(), ["server_b"]);
        }
        let routed = manager.find_servers(&RoutingRequest::new("t_OFFLINE")).unwrap();
        assert_eq!(routed["server_b"].len(), 2);
    }

    #[tokio::test]
    async fn test_version_only_config_bump_refreshes_in_place() {
        let (client, manager) = test_manager();
        let ev = online_view(
            "t_OFFLINE",
            3,
            &[("s1", &["server_a", "server_b"]), ("s2", &["server_a", "server_b"])],
        );
        client.put_external_view(ev.clone());
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        client.put_instance_config(InstanceConfig::new("server_b", 1));
        manager
            .mark_data_resource_online(
                "t_OFFLINE",
                Some(&ev),
                &instance_configs(&["server_a", "server_b"]),
            )
            .await;
        let before = manager.offline_plans("t_OFFLINE").unwrap();

        // Version moves, the routing-relevant flags do not.
        let mut retagged = InstanceConfig::new("server_a", 2);
        retagged.tags = vec!["refreshed".to_string()];
        client.put_instance_config(retagged);
        manager.process_instance_config_change().await;
        assert!(Arc::ptr_eq(&before, &manager.offline_plans("t_OFFLINE").unwrap()));
        assert_eq!(client.external_view_fetches("t_OFFLINE"), 1);

        // The cache was refreshed in place, so the next pass sees no diff
        // and does not even refetch the view.
        manager.process_instance_config_change().await;
        assert_eq!(client.external_view_fetches("t_OFFLINE"), 1);
    }

    #[tokio::test]
    async fn test_llc_failure_keeps_previous_llc_plans() {
        let (_client, manager) = test_manager();
        let mut ev1 = online_view(
            "t_REALTIME",
            1,
            &[("t__g0__0", &["server_a"]), ("t__0__0__20260801T00", &["server_a"])],
        );
        ev1.set_state("t__0__1__20260801T01", "server_a", SegmentState::Consuming);
        manager
            .mark_data_resource_online("t_REALTIME", Some(&ev1), &instance_configs(&["server_a"]))
            .await;
        let hlc_before = manager.hlc_plans("t_REALTIME").unwrap();
        let llc_before = manager.llc_plans("t_REALTIME").unwrap();

        // Version 2 carries an inconsistent low-level view: two consuming
        // segments in partition 0.
        let mut ev2 = ev1.clone();
        ev2.version = 2;
        ev2.set_state("t__0__2__20260801T02", "server_a", SegmentState::Consuming);
        manager
            .mark_data_resource_online("t_REALTIME", Some(&ev2), &instance_configs(&["server_a"]))
            .await;

        assert!(!Arc::ptr_eq(&hlc_before, &manager.hlc_plans("t_REALTIME").unwrap()));
        assert!(Arc::ptr_eq(&llc_before, &manager.llc_plans("t_REALTIME").unwrap()));
        assert_eq!(manager.last_external_view_version("t_REALTIME"), Some(2));
        assert_eq!(
            manager
                .metrics()
                .routing_table_rebuild_failures
                .with_label_values(&["t_REALTIME"])
                .get(),
            0
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_marks_invalid_and_retries() {
        let (client, manager) = test_manager();
        let ev1 = online_view("t_OFFLINE", 1, &[("s1", &["server_a"])]);
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        manager
            .mark_data_resource_online("t_OFFLINE", Some(&ev1), &instance_configs(&["server_a"]))
            .await;

        client.put_external_view(online_view("t_OFFLINE", 2, &[("s1", &["server_a"])]));
        client.fail_external_view("t_OFFLINE", true);
        manager.process_external_view_change().await;

        assert_eq!(
            manager.last_external_view_version("t_OFFLINE"),
            Some(INVALID_EXTERNAL_VIEW_VERSION)
        );
        assert_eq!(
            manager
                .metrics()
                .routing_table_rebuild_failures
                .with_label_values(&["t_OFFLINE"])
                .get(),
            1
        );
        // Last-known-good plans keep serving.
        assert!(!manager
            .find_servers(&RoutingRequest::new("t_OFFLINE"))
            .unwrap()
            .is_empty());

        client.fail_external_view("t_OFFLINE", false);
        manager.process_external_view_change().await;
        assert_eq!(manager.last_external_view_version("t_OFFLINE"), Some(2));
    }

    #[tokio::test]
    async fn test_mark_offline_forgets_the_table() {
        let (client, manager) = test_manager();
        let ics = instance_configs(&["server_a"]);
        client.put_segment_metadata("metrics_OFFLINE", "seg_0", days_metadata(100));
        let offline = online_view("metrics_OFFLINE", 1, &[("seg_0", &["server_a"])]);
        client.put_external_view(offline.clone());
        manager
            .mark_data_resource_online("metrics_OFFLINE", Some(&offline), &ics)
            .await;
        let realtime = online_view("metrics_REALTIME", 1, &[("metrics__g0__0", &["server_a"])]);
        manager
            .mark_data_resource_online("metrics_REALTIME", Some(&realtime), &ics)
            .await;
        assert!(manager.time_boundary("metrics_OFFLINE").is_some());

        manager.mark_data_resource_offline("metrics_OFFLINE");
        assert!(!manager.routing_table_exists("metrics_OFFLINE"));
        assert_eq!(manager.last_external_view_version("metrics_OFFLINE"), None);
        assert!(manager.time_boundary("metrics_OFFLINE").is_none());
        assert!(manager
            .find_servers(&RoutingRequest::new("metrics_OFFLINE"))
            .unwrap()
            .is_empty());
        // The realtime side is untouched.
        assert!(manager.routing_table_exists("metrics_REALTIME"));
    }

    #[tokio::test]
    async fn test_hybrid_time_boundary_lifecycle() {
        let (client, manager) = test_manager();
        let ics = instance_configs(&["server_a"]);
        for ic in &ics {
            client.put_instance_config(ic.clone());
        }
        client.put_segment_metadata("metrics_OFFLINE", "seg_0", days_metadata(100));
        let offline_v1 = online_view("metrics_OFFLINE", 1, &[("seg_0", &["server_a"])]);
        client.put_external_view(offline_v1.clone());

        // Offline first: no realtime plans yet, so no boundary.
        manager
            .mark_data_resource_online("metrics_OFFLINE", Some(&offline_v1), &ics)
            .await;
        assert!(manager.time_boundary("metrics_OFFLINE").is_none());

        // The realtime side coming up seeds the boundary from the offline view.
        let realtime_v1 = online_view("metrics_REALTIME", 1, &[("metrics__g0__0", &["server_a"])]);
        manager
            .mark_data_resource_online("metrics_REALTIME", Some(&realtime_v1), &ics)
            .await;
        assert_eq!(
            manager.time_boundary("metrics_OFFLINE").unwrap().boundary_value,
            99
        );

        // A newer offline view recomputes it.
        client.put_segment_metadata("metrics_OFFLINE", "seg_1", days_metadata(200));
        let offline_v2 = online_view(
            "metrics_OFFLINE",
            2,
            &[("seg_0", &["server_a"]), ("seg_1", &["server_a"])],
        );
        manager
            .mark_data_resource_online("metrics_OFFLINE", Some(&offline_v2), &ics)
            .await;
        assert_eq!(
            manager.time_boundary("metrics_OFFLINE").unwrap().boundary_value,
            199
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_never_observe_a_torn_plan() {
        let (_client, manager) = test_manager();
        let manager = Arc::new(manager);
        let ics = instance_configs(&["server_a"]);
        let ev1 = online_view("t_OFFLINE", 1, &[("s1", &["server_a"])]);
        manager.mark_data_resource_online("t_OFFLINE", Some(&ev1), &ics).await;

        // Readers race ongoing rebuilds that alternate between two plan
        // shapes; every observed mapping must be exactly one of them.
        let reader = {
            let manager = manager.clone();
            tokio::spawn(async move {
                for _ in 0..2000 {
                    let routed = manager
                        .find_servers(&RoutingRequest::new("t_OFFLINE"))
                        .unwrap();
                    let segments: Vec<String> = routed.values().flatten().cloned().collect();
                    assert!(
                        segments == ["s1"] || segments == ["s1", "s2"],
                        "torn read: {:?}",
                        segments
                    );
                }
            })
        };

        for version in 2..50 {
            let ev = if version % 2 == 0 {
                online_view(
                    "t_OFFLINE",
                    version,
                    &[("s1", &["server_a"]), ("s2", &["server_a"])],
                )
            } else {
                online_view("t_OFFLINE", version, &[("s1", &["server_a"])])
            };
            manager.mark_data_resource_online("t_OFFLINE", Some(&ev), &ics).await;
        }
        reader.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_turns_handlers_into_noops() {
        let (client, manager) = test_manager();
        let ev = online_view("t_OFFLINE", 1, &[("s1", &["server_a"])]);
        client.put_instance_config(InstanceConfig::new("server_a", 1));
        manager
            .mark_data_resource_online("t_OFFLINE", Some(&ev), &instance_configs(&["server_a"]))
            .await;

        manager.shutdown();
        client.put_external_view(online_view("t_OFFLINE", 2, &[("s1", &["server_a"])]));
        manager.process_external_view_change().await;
        assert_eq!(client.external_view_fetches("t_OFFLINE"), 0);
        assert_eq!(manager.last_external_view_version("t_OFFLINE"), Some(1));

        manager.mark_data_resource_offline("t_OFFLINE");
        assert!(manager.routing_table_exists("t_OFFLINE"));
    }

    #[tokio::test]
    async fn test_dump_snapshot_rendering() {
        let (_client, manager) = test_manager();
        let ics = instance_configs(&["server_1"]);
        let offline = online_view(
            "metrics_OFFLINE",
            1,
            &[("seg_0", &["server_1"]), ("seg_1", &["server_1"])],
        );
        manager
            .mark_data_resource_online("metrics_OFFLINE", Some(&offline), &ics)
            .await;
        let mut realtime =
            online_view("metrics_REALTIME", 1, &[("metrics__0__0__20260801T00", &["server_1"])]);
        realtime.set_state("metrics__0__1__20260801T01", "server_1", SegmentState::Consuming);
        manager
            .mark_data_resource_online("metrics_REALTIME", Some(&realtime), &ics)
            .await;

        expect![[r#"
            {
              "host": "broker-1.test:8099",
              "llc_routing_tables": {
                "metrics_REALTIME": [
                  {
                    "server_1": [
                      "metrics__0__0__20260801T00",
                      "metrics__0__1__20260801T01"
                    ]
                  }
                ]
              },
              "offline_routing_tables": {
                "metrics_OFFLINE": [
                  {
                    "server_1": [
                      "seg_0",
                      "seg_1"
                    ]
                  }
                ]
              }
            }"#]]
        .assert_eq(&manager.dump_snapshot(None).unwrap());

        expect![[r#"
            {
              "host": "broker-1.test:8099",
              "llc_routing_tables": {},
              "offline_routing_tables": {
                "metrics_OFFLINE": [
                  {
                    "server_1": [
                      "seg_0",
                      "seg_1"
                    ]
                  }
                ]
              }
            }"#]]
        .assert_eq(&manager.dump_snapshot(Some("metrics_OFF")).unwrap());
    }
}
