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

//! API to list all server users.

use crate::driver::Driver;
use crate::model::ServerUserInfo;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, Payload, Requirements, UserContext};
use autograder_core::model::ServerRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/list";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "List the users on the server.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct ListUsersRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,
}

impl Payload for ListUsersRequest {
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
pub(crate) struct ListUsersResponse {
    /// All server users, sorted by email.
    pub(crate) users: Vec<ServerUserInfo>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: ListUsersRequest,
) -> Result<ListUsersResponse, ApiError> {
    let users = driver
        .db()
        .get_server_users()
        .await
        .map_err(|e| driver_error("-604", &request.context, e.into()))?;

    let users = ServerUserInfo::for_users(driver.db(), &users)
        .await
        .map_err(|e| driver_error("-604", &request.context, e))?;

    Ok(ListUsersResponse { users })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_admin_sees_sorted_users() {
        let context = TestContext::setup().await;

        let content = content_as("server-admin", json!({}));
        let response: ListUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;

        let emails = response.users.iter().map(|u| u.email.clone()).collect::<Vec<String>>();
        let mut sorted = emails.clone();
        sorted.sort();
        assert_eq!(sorted, emails);
        assert!(emails.contains(&email_of("course-student")));
    }

    #[tokio::test]
    async fn test_root_nonce_grants_admin_access() {
        let context = TestContext::setup().await;
        context.pipeline.nonces().insert("trusted-nonce");

        let content = json!({"root-user-nonce": "trusted-nonce"});
        let response: ListUsersResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(!response.users.is_empty());
    }

    #[tokio::test]
    async fn test_regular_users_are_denied() {
        let context = TestContext::setup().await;

        let content = content_as("server-user", json!({}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::FORBIDDEN)
            .expect_locator("-041")
            .await;
    }
}
