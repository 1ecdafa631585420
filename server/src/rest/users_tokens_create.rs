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

//! API to mint a named authentication token.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, NonEmptyString, Payload, SpecialField, UserContext,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/tokens/create";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Create a new authentication token.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct CreateTokenRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,

    /// Name describing where the token will be used.
    #[serde(default, rename = "token-name")]
    token_name: NonEmptyString,
}

impl Payload for CreateTokenRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::NonEmptyString { name: "token-name", value: &self.token_name }]
    }
}

/// The response content.  This is the only time the token secret is visible.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct CreateTokenResponse {
    /// Identifier to delete the token with later.
    #[serde(rename = "token-id")]
    pub(crate) token_id: String,

    /// The token secret.  Authenticate by sending its SHA-256 hex as `user-pass`.
    #[serde(rename = "token-cleartext")]
    pub(crate) token_cleartext: String,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: CreateTokenRequest,
) -> Result<CreateTokenResponse, ApiError> {
    let minted = driver
        .create_token(&request.context.user_email, request.token_name.as_str())
        .await
        .map_err(|e| driver_error("-607", &request.context, e))?;

    Ok(CreateTokenResponse { token_id: minted.id, token_cleartext: minted.cleartext })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::model::Password;
    use http::StatusCode;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_minted_token_authenticates_like_a_password() {
        let context = TestContext::setup().await;

        let content = content_as("course-student", json!({"token-name": "ci"}));
        let response: CreateTokenResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(!response.token_id.is_empty());
        assert!(!response.token_cleartext.is_empty());

        let stored = context.stored_user("course-student").await.unwrap();
        assert_eq!(1, stored.tokens.len());
        assert_eq!("ci", stored.tokens[0].name);
        assert!(
            stored
                .verify_password(&Password::from_cleartext(&response.token_cleartext))
                .unwrap()
        );
        // And the original password still works too.
        assert!(
            stored.verify_password(&Password::from_cleartext("course-student")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_token_name_must_be_non_empty() {
        let context = TestContext::setup().await;

        let content = content_as("course-student", json!({}));
        OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-038")
            .await;
    }
}
