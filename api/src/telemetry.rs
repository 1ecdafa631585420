// Autograder
// Copyright 2026 The Autograder Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The per-request telemetry emitter.
//!
//! Every served request, including failures, produces exactly one metric.  In production the
//! metric is handed to a background task over a bounded channel so that a slow store cannot
//! affect request latency; in unit-testing mode the store is synchronous so tests can assert on
//! it.  The telemetry path never fails a request: storage errors and queue overflows are logged
//! and dropped.

use autograder_core::db::Db;
use autograder_core::model::ApiRequestMetric;
use futures::StreamExt;
use futures::channel::mpsc;
use log::warn;
use std::sync::Arc;

/// Bound of the in-flight metric queue.  Overflow drops the metric with a warning.
const QUEUE_SIZE: usize = 256;

/// Records request metrics to the persistence layer.
#[derive(Clone)]
pub struct Telemetry {
    /// Where metrics are stored.
    db: Arc<dyn Db + Send + Sync>,

    /// Producer side of the background queue.  `None` means synchronous storage.
    sender: Option<mpsc::Sender<ApiRequestMetric>>,
}

impl Telemetry {
    /// Creates an emitter that stores metrics synchronously.  Used in unit-testing mode.
    pub fn new_sync(db: Arc<dyn Db + Send + Sync>) -> Self {
        Telemetry { db, sender: None }
    }

    /// Creates an emitter backed by a background task and a bounded queue.
    pub fn new_background(db: Arc<dyn Db + Send + Sync>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<ApiRequestMetric>(QUEUE_SIZE);

        let worker_db = db.clone();
        tokio::spawn(async move {
            while let Some(metric) = receiver.next().await {
                if let Err(e) = worker_db.store_api_request_metric(metric).await {
                    warn!("Failed to store API request metric: {}", e);
                }
            }
        });

        Telemetry { db, sender: Some(sender) }
    }

    /// Records one request metric.  Never fails: problems are logged and the metric dropped.
    pub async fn emit(&self, metric: ApiRequestMetric) {
        match &self.sender {
            None => {
                if let Err(e) = self.db.store_api_request_metric(metric).await {
                    warn!("Failed to store API request metric: {}", e);
                }
            }

            Some(sender) => {
                let mut sender = sender.clone();
                if let Err(e) = sender.try_send(metric) {
                    warn!("Dropping API request metric: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autograder_core::db::{FailingDb, MemoryDb};
    use autograder_core::model::Timestamp;

    fn metric(endpoint: &str) -> ApiRequestMetric {
        ApiRequestMetric {
            timestamp: Timestamp::from_millis(100),
            duration: 5,
            endpoint: Some(endpoint.to_owned()),
            ..ApiRequestMetric::default()
        }
    }

    #[tokio::test]
    async fn test_sync_emitter_stores_immediately() {
        let db = Arc::from(MemoryDb::default());
        let telemetry = Telemetry::new_sync(db.clone());

        telemetry.emit(metric("/api/v03/users/list")).await;

        let stored = db.get_api_request_metrics().await.unwrap();
        assert_eq!(1, stored.len());
        assert_eq!(Some("/api/v03/users/list".to_owned()), stored[0].endpoint);
    }

    #[tokio::test]
    async fn test_sync_emitter_swallows_storage_errors() {
        let telemetry = Telemetry::new_sync(Arc::from(FailingDb::default()));
        telemetry.emit(metric("/api/v03/users/list")).await;
    }

    #[tokio::test]
    async fn test_background_emitter_eventually_stores() {
        let db = Arc::from(MemoryDb::default());
        let telemetry = Telemetry::new_background(db.clone());

        telemetry.emit(metric("/api/v03/users/list")).await;

        let mut stored = db.get_api_request_metrics().await.unwrap();
        for _ in 0..100 {
            if !stored.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            stored = db.get_api_request_metrics().await.unwrap();
        }
        assert_eq!(1, stored.len());
    }
}
