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

//! API to enroll (and upsert) a batch of users into a course.

use crate::driver::{ActingUser, Driver};
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, CourseUserContext, Payload, Requirements};
use autograder_core::model::{
    CourseRole, ExternalUserOpResult, RawUserEntry, UpsertOptions,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/courses/users/enroll";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Enroll one or more users to the course.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct EnrollUsersRequest {
    /// The course-user envelope.
    #[serde(flatten)]
    context: CourseUserContext,

    /// The users to enroll.
    #[serde(default, rename = "raw-users")]
    raw_users: Vec<RawUserEntry>,

    /// Do not create users that do not exist yet.
    #[serde(default, rename = "skip-inserts")]
    skip_inserts: bool,

    /// Do not modify users that already exist.
    #[serde(default, rename = "skip-updates")]
    skip_updates: bool,

    /// Email newly-generated credentials to their users.
    #[serde(default, rename = "send-emails")]
    send_emails: bool,

    /// Compute results without persisting or emailing anything.
    #[serde(default, rename = "dry-run")]
    dry_run: bool,
}

impl Payload for EnrollUsersRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::CourseUser(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::course(CourseRole::Admin)
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct EnrollUsersResponse {
    /// One sanitized result per input entry, sorted by email.
    pub(crate) results: Vec<ExternalUserOpResult>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: EnrollUsersRequest,
) -> Result<EnrollUsersResponse, ApiError> {
    let options = UpsertOptions {
        skip_inserts: request.skip_inserts,
        skip_updates: request.skip_updates,
        send_emails: request.send_emails,
        dry_run: request.dry_run,
    };
    let acting = ActingUser { server_role: request.context.user.server_user().role };

    // Every entry of this endpoint targets the context course, whatever the raw data says.
    let course_id = request.context.course_id.clone();
    let entries = request
        .raw_users
        .into_iter()
        .map(|mut entry| {
            entry.course = Some(course_id.clone());
            if entry.course_role.is_none() {
                entry.course_role = Some(CourseRole::Student);
            }
            entry
        })
        .collect();

    let results = driver.upsert_users(entries, options, acting).await;
    Ok(EnrollUsersResponse {
        results: results.iter().map(|result| result.to_external()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::db::Db;
    use autograder_core::model::EmailAddress;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_enroll_new_user_with_email() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({
                "course-id": "course101",
                "send-emails": true,
                "raw-users": [
                    {"email": "new-student@test.edulinq.org", "course-role": "student"},
                ],
            }),
        );
        let response: EnrollUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        assert_eq!(1, response.results.len());
        let result = &response.results[0];
        assert!(result.added);
        assert!(result.emailed);
        assert_eq!(vec!["course101".to_owned()], result.enrolled);

        let stored = context.db.get_server_user("new-student@test.edulinq.org").await.unwrap();
        let stored = stored.expect("The new user must have been persisted");
        assert!(stored.course_info.contains_key("course101"));

        context
            .mailer
            .expect_one_message(&EmailAddress::from("new-student@test.edulinq.org"))
            .await;
    }

    #[tokio::test]
    async fn test_results_are_sorted_and_sanitized() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({
                "course-id": "course101",
                "raw-users": [
                    {"email": "zz@test.edulinq.org"},
                    {"email": "aa@test.edulinq.org"},
                    {"email": ""},
                ],
            }),
        );
        let response: EnrollUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        let emails =
            response.results.iter().map(|r| r.email.clone()).collect::<Vec<String>>();
        assert_eq!(
            vec!["".to_owned(), "aa@test.edulinq.org".to_owned(), "zz@test.edulinq.org".to_owned()],
            emails
        );
        assert!(response.results[0].validation_error.is_some());

        // Generated passwords never leave the server.
        let raw = serde_json::to_string(&response).unwrap();
        assert!(!raw.contains("cleartext"));
    }

    #[tokio::test]
    async fn test_dry_run_persists_nothing() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({
                "course-id": "course101",
                "dry-run": true,
                "raw-users": [{"email": "new-student@test.edulinq.org"}],
            }),
        );
        let response: EnrollUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.results[0].added);

        let stored = context.db.get_server_user("new-student@test.edulinq.org").await.unwrap();
        assert!(stored.is_none());
        context.mailer.expect_no_messages().await;
    }

    #[tokio::test]
    async fn test_skip_inserts() {
        let context = TestContext::setup().await;

        let content = content_as(
            "course-admin",
            json!({
                "course-id": "course101",
                "skip-inserts": true,
                "raw-users": [{"email": "new-student@test.edulinq.org"}],
            }),
        );
        let response: EnrollUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.results[0].skipped);
        assert!(response.results[0].not_exists);
    }
}
