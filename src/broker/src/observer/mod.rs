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

//! Bridges coordinator change callbacks to the routing manager.
//!
//! Coordinator callbacks must return promptly, so they only enqueue a
//! [`ClusterChangeNotification`]; the dispatch task owned by
//! [`ObserverManager`] does the actual (potentially slow) change processing.
//! Notification payloads are deliberately ignored: the manager refetches
//! coordinator state itself, since callbacks may be stale or batched.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::routing::RoutingTableManagerRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterChangeNotification {
    ExternalViewChange,
    InstanceConfigChange,
    LiveInstanceChange,
}

/// Adapter from coordinator callbacks to routing-manager operations.
pub struct BrokerObserverNode {
    routing_manager: RoutingTableManagerRef,
}

impl BrokerObserverNode {
    pub fn new(routing_manager: RoutingTableManagerRef) -> Self {
        Self { routing_manager }
    }

    pub async fn handle_notification(&self, notification: ClusterChangeNotification) {
        match notification {
            ClusterChangeNotification::ExternalViewChange => {
                self.routing_manager.process_external_view_change().await;
            }
            ClusterChangeNotification::InstanceConfigChange => {
                self.routing_manager.process_instance_config_change().await;
            }
            ClusterChangeNotification::LiveInstanceChange => {
                // Known limitation: live-instance transitions already surface
                // through external views, so nothing reacts to them directly.
                tracing::debug!("ignoring live instance change");
            }
        }
    }
}

/// Cheap, cloneable handle handed to the coordinator callback layer.
#[derive(Clone)]
pub struct ClusterChangeNotifier {
    tx: mpsc::UnboundedSender<ClusterChangeNotification>,
}

impl ClusterChangeNotifier {
    /// Enqueues and returns immediately. Dropped silently after shutdown.
    pub fn notify(&self, notification: ClusterChangeNotification) {
        let _ = self.tx.send(notification);
    }
}

/// Owns the dispatch task draining cluster change notifications.
///
/// Consecutive notifications of the same kind collapse into one handler run;
/// the handlers walk all known state and re-check versions anyway, so one run
/// picks up everything a burst announced.
pub struct ObserverManager {
    notifier: ClusterChangeNotifier,
    join_handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl ObserverManager {
    pub fn start(observer: BrokerObserverNode) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let join_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        tracing::info!("cluster change dispatcher stopped");
                        return;
                    }
                    notification = rx.recv() => {
                        let Some(mut notification) = notification else {
                            return;
                        };
                        while let Ok(next) = rx.try_recv() {
                            if next != notification {
                                observer.handle_notification(notification).await;
                                notification = next;
                            }
                        }
                        observer.handle_notification(notification).await;
                    }
                }
            }
        });
        Self {
            notifier: ClusterChangeNotifier { tx },
            join_handle,
            shutdown_tx,
        }
    }

    pub fn notifier(&self) -> ClusterChangeNotifier {
        self.notifier.clone()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.join_handle.await;
    }
}
