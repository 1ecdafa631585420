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

//! Shared test fixtures for the REST layer: the standard test course and its users.

use crate::driver::Driver;
use crate::grading::testutils::FullMarksGrader;
use autograder_api::config::ServerOptions;
use autograder_api::routing::Pipeline;
use autograder_core::clocks::SystemClock;
use autograder_core::db::{Db, MemoryDb};
use autograder_core::model::{
    ApiRequestMetric, Assignment, Course, CourseInfo, CourseRole, Credential, Password,
    ServerRole, ServerUser,
};
use autograder_smtp::driver::SmtpMailer;
use autograder_smtp::driver::testutils::RecorderSmtpMailer;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Domain all fixture users live under.
pub(crate) const TEST_DOMAIN: &str = "test.edulinq.org";

/// The fixture users: local part, server role and course role within `course101`.
const TEST_USERS: &[(&str, ServerRole, Option<CourseRole>)] = &[
    ("course-owner", ServerRole::User, Some(CourseRole::Owner)),
    ("course-admin", ServerRole::User, Some(CourseRole::Admin)),
    ("course-grader", ServerRole::User, Some(CourseRole::Grader)),
    ("course-student", ServerRole::User, Some(CourseRole::Student)),
    ("course-other", ServerRole::User, Some(CourseRole::Other)),
    ("server-admin", ServerRole::Admin, None),
    ("server-creator", ServerRole::Creator, None),
    ("server-user", ServerRole::User, None),
];

/// Returns the fixture email for a local part.
pub(crate) fn email_of(local: &str) -> String {
    format!("{}@{}", local, TEST_DOMAIN)
}

/// Derived credentials are expensive to compute, so cache them per process.
fn credential_of(local: &str) -> Credential {
    static CREDENTIALS: OnceLock<HashMap<String, Credential>> = OnceLock::new();
    CREDENTIALS
        .get_or_init(|| {
            let mut credentials = HashMap::new();
            for (local, _, _) in TEST_USERS {
                let password = Password::from_cleartext(local);
                credentials.insert(
                    (*local).to_owned(),
                    Credential::derive(&password)
                        .expect("Deriving fixture credentials cannot fail"),
                );
            }
            credentials
        })
        .get(local)
        .unwrap_or_else(|| panic!("Unknown fixture user {}", local))
        .clone()
}

/// Builds a request content object carrying the credentials of a fixture user plus any `extra`
/// fields.
pub(crate) fn content_as(local: &str, extra: Value) -> Value {
    let mut content = json!({
        "user-email": email_of(local),
        "user-pass": Password::from_cleartext(local).as_str(),
    });
    let object = content.as_object_mut().expect("Content is always an object");
    for (key, value) in extra.as_object().expect("Extra fields must be an object") {
        object.insert(key.clone(), value.clone());
    }
    content
}

/// Container for the state required to run a REST test.
pub(crate) struct TestContext {
    /// The application under test.
    pub(crate) app: axum::Router,

    /// Direct access to the backing store.
    pub(crate) db: Arc<MemoryDb>,

    /// The pipeline, for nonce injection and configuration access.
    pub(crate) pipeline: Pipeline,

    /// The recording mailer.
    pub(crate) mailer: RecorderSmtpMailer,
}

impl TestContext {
    /// Sets up the app with the standard fixtures and unit-testing options.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(ServerOptions {
            testing_mode: true,
            unit_testing_mode: true,
            ..ServerOptions::default()
        })
        .await
    }

    /// Sets up the app with the standard fixtures and the given options.
    pub(crate) async fn setup_with(opts: ServerOptions) -> Self {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let db = Arc::from(MemoryDb::default());

        let mut assignments = HashMap::new();
        for (id, name) in [("hw0", "Homework 0"), ("hw1", "Homework 1")] {
            assignments.insert(
                id.to_owned(),
                Assignment { id: id.to_owned(), name: name.to_owned(), max_points: 100.0 },
            );
        }
        db.upsert_course(Course {
            id: "course101".to_owned(),
            name: "Course 101".to_owned(),
            assignments,
        })
        .await
        .unwrap();

        for (local, server_role, course_role) in TEST_USERS {
            let mut course_info = HashMap::new();
            if let Some(course_role) = course_role {
                course_info.insert(
                    "course101".to_owned(),
                    CourseInfo { role: *course_role, lms_id: None },
                );
            }
            db.upsert_server_user(ServerUser {
                email: email_of(local),
                name: Some((*local).to_owned()),
                role: *server_role,
                credential: Some(credential_of(local)),
                tokens: Vec::new(),
                course_info,
            })
            .await
            .unwrap();
        }

        let db_as_dyn: Arc<dyn Db + Send + Sync> = db.clone();
        let pipeline = Pipeline::new(db_as_dyn.clone(), Arc::from(SystemClock::default()), opts);

        let mailer = RecorderSmtpMailer::default();
        let mailer_as_dyn: Arc<dyn SmtpMailer + Send + Sync> = Arc::from(mailer.clone());

        let driver = Driver::new(
            db_as_dyn,
            Arc::from(SystemClock::default()),
            mailer_as_dyn,
            Arc::from(FullMarksGrader::default()),
        );

        let app = crate::rest::app(pipeline.clone(), driver);

        TestContext { app, db, pipeline, mailer }
    }

    /// Returns the metrics recorded so far.
    pub(crate) async fn metrics(&self) -> Vec<ApiRequestMetric> {
        self.db.get_api_request_metrics().await.unwrap()
    }

    /// Returns a fixture user as currently stored.
    pub(crate) async fn stored_user(&self, local: &str) -> Option<ServerUser> {
        self.db.get_server_user(&email_of(local)).await.unwrap()
    }
}

/// Builds the `(method, uri)` pair for an endpoint path relative to the API prefix.
pub(crate) fn api_route(path: &str) -> (http::Method, String) {
    (http::Method::POST, format!("/api/v03{}", path))
}
