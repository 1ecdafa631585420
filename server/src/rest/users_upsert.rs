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

//! API to create or update a batch of server users.

use crate::driver::{ActingUser, Driver};
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, Payload, Requirements, UserContext};
use autograder_core::model::{ExternalUserOpResult, RawUserEntry, ServerRole, UpsertOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/upsert";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Upsert one or more users to the server.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct UpsertUsersRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,

    /// The users to create or update.
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

impl Payload for UpsertUsersRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }

    fn requirements() -> Requirements {
        Requirements::server(ServerRole::Admin)
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct UpsertUsersResponse {
    /// One sanitized result per input entry, sorted by email.
    pub(crate) results: Vec<ExternalUserOpResult>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: UpsertUsersRequest,
) -> Result<UpsertUsersResponse, ApiError> {
    let options = UpsertOptions {
        skip_inserts: request.skip_inserts,
        skip_updates: request.skip_updates,
        send_emails: request.send_emails,
        dry_run: request.dry_run,
    };
    let acting = ActingUser { server_role: request.context.server_user().role };

    let results = driver.upsert_users(request.raw_users, options, acting).await;
    Ok(UpsertUsersResponse {
        results: results.iter().map(|result| result.to_external()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::db::Db;
    use autograder_core::model::Password;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_insert_and_update() {
        let context = TestContext::setup().await;

        // Insert a brand new creator.
        let content = content_as(
            "server-admin",
            json!({
                "raw-users": [{
                    "email": "new-creator@test.edulinq.org",
                    "name": "New Creator",
                    "pass": Password::from_cleartext("secret").as_str(),
                    "server-role": "creator",
                }],
            }),
        );
        let response: UpsertUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.results[0].added);

        // Update the same user's name.
        let content = content_as(
            "server-admin",
            json!({
                "raw-users": [{
                    "email": "new-creator@test.edulinq.org",
                    "name": "Renamed Creator",
                }],
            }),
        );
        let response: UpsertUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.results[0].modified);

        let stored = context.db.get_server_user("new-creator@test.edulinq.org").await.unwrap();
        let stored = stored.unwrap();
        assert_eq!(Some("Renamed Creator".to_owned()), stored.name);
        assert!(stored.verify_password(&Password::from_cleartext("secret")).unwrap());
    }

    #[tokio::test]
    async fn test_cannot_grant_roles_above_your_own() {
        let context = TestContext::setup().await;

        let content = content_as(
            "server-admin",
            json!({
                "raw-users": [{"email": "new-owner@test.edulinq.org", "server-role": "owner"}],
            }),
        );
        let response: UpsertUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        let error = response.results[0].validation_error.as_ref().unwrap();
        assert!(error.contains("above your own"));
    }

    #[tokio::test]
    async fn test_requires_server_admin() {
        let context = TestContext::setup().await;

        let content = content_as(
            "server-creator",
            json!({"raw-users": [{"email": "x@test.edulinq.org"}]}),
        );
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-041")
            .await;
    }
}
