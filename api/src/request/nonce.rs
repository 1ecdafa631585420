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

//! The root-user-nonce table.
//!
//! A trusted local path (the unix-socket front end) mints a nonce per request and attaches it to
//! the payload it forwards over HTTP.  Presenting the nonce authenticates the request as root.
//! Nonces are single use and expire after a short TTL.

use lru_time_cache::LruCache;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How many outstanding nonces to retain at most.
const NONCE_CAPACITY: usize = 1024;

/// How long an unconsumed nonce stays valid.
const NONCE_TTL: Duration = Duration::from_secs(60);

/// A concurrent table of single-use root nonces with expiry.
#[derive(Clone)]
pub struct NonceTable {
    /// The nonces that have been minted but not yet consumed.
    nonces: Arc<Mutex<LruCache<String, ()>>>,
}

impl Default for NonceTable {
    fn default() -> Self {
        Self::new(NONCE_TTL)
    }
}

impl NonceTable {
    /// Creates a table whose nonces expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        NonceTable {
            nonces: Arc::from(Mutex::from(LruCache::with_expiry_duration_and_capacity(
                ttl,
                NONCE_CAPACITY,
            ))),
        }
    }

    /// Registers a freshly-minted nonce.
    pub fn insert<S: Into<String>>(&self, nonce: S) {
        let mut nonces = self.nonces.lock().expect("Nonce table lock cannot be poisoned");
        nonces.insert(nonce.into(), ());
    }

    /// Atomically consumes `nonce`, returning whether it was valid.  A consumed nonce cannot
    /// authenticate a second request, even under concurrent presentation.
    pub fn take(&self, nonce: &str) -> bool {
        let mut nonces = self.nonces.lock().expect("Nonce table lock cannot be poisoned");
        nonces.remove(nonce).is_some()
    }
}
