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

//! Business logic for the autograding server.
//!
//! The driver owns the external collaborators (persistence, clock, mail, grading) and exposes
//! the operations that the REST handlers adapt.  Handlers never talk to the collaborators
//! directly.

use crate::grading::Grader;
use autograder_api::describe::ApiDescription;
use autograder_core::clocks::Clock;
use autograder_core::db::Db;
use autograder_smtp::driver::SmtpMailer;
use std::sync::{Arc, OnceLock};

mod passwords;
pub(crate) use passwords::PasswordChange;
mod submissions;
pub(crate) use submissions::SubmitOutcome;
mod tokens;
pub(crate) use tokens::MintedToken;
mod users;
pub(crate) use users::ActingUser;

/// Mailbox all server-generated email comes from.
const MAIL_FROM: &str = "Autograder <noreply@autograder.invalid>";

/// Business logic.
///
/// The driver is cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The persistence layer.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Service to send email notifications with.
    mailer: Arc<dyn SmtpMailer + Send + Sync>,

    /// The grading engine.
    grader: Arc<dyn Grader + Send + Sync>,

    /// The endpoint catalog, computed once after all routes are registered.
    description: Arc<OnceLock<ApiDescription>>,
}

impl Driver {
    /// Creates a new driver backed by the given collaborators.
    pub(crate) fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        mailer: Arc<dyn SmtpMailer + Send + Sync>,
        grader: Arc<dyn Grader + Send + Sync>,
    ) -> Self {
        Self { db, clock, mailer, grader, description: Arc::from(OnceLock::new()) }
    }

    /// Returns the persistence layer.
    pub(crate) fn db(&self) -> &Arc<dyn Db + Send + Sync> {
        &self.db
    }

    /// Returns the clock.
    pub(crate) fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Returns the mail sender.
    pub(crate) fn mailer(&self) -> &Arc<dyn SmtpMailer + Send + Sync> {
        &self.mailer
    }

    /// Returns the grading engine.
    pub(crate) fn grader(&self) -> &Arc<dyn Grader + Send + Sync> {
        &self.grader
    }

    /// Publishes the endpoint catalog.  Later calls are ignored; the catalog never changes
    /// after startup.
    pub(crate) fn set_description(&self, description: ApiDescription) {
        let _ = self.description.set(description);
    }

    /// Returns the endpoint catalog, if it has been published.
    pub(crate) fn api_description(&self) -> Option<&ApiDescription> {
        self.description.get()
    }
}
