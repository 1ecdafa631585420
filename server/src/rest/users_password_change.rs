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

//! API for a user to change their own password.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, NonEmptyString, Payload, SpecialField, UserContext,
};
use autograder_core::model::Password;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/password/change";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Change your password.";

/// The request payload.  The new password arrives pre-hashed, exactly like `user-pass`.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct ChangePasswordRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,

    /// The new password hash.
    #[serde(default, rename = "new-pass")]
    new_pass: NonEmptyString,
}

impl Payload for ChangePasswordRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::NonEmptyString { name: "new-pass", value: &self.new_pass }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ChangePasswordResponse {
    /// The operation completed.
    pub(crate) success: bool,

    /// The new password was identical to the stored one.
    pub(crate) duplicate: bool,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: ChangePasswordRequest,
) -> Result<ChangePasswordResponse, ApiError> {
    let change = driver
        .change_password(
            &request.context.user_email,
            &Password::new(request.new_pass.as_str()),
        )
        .await
        .map_err(|e| driver_error("-605", &request.context, e))?;

    Ok(ChangePasswordResponse { success: change.success, duplicate: change.duplicate })
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
    async fn test_change_to_new_password() {
        let context = TestContext::setup().await;

        let new_pass = Password::from_cleartext("brand new password");
        let content = content_as("course-student", json!({"new-pass": new_pass.as_str()}));
        let response: ChangePasswordResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.success);
        assert!(!response.duplicate);

        // The old password no longer authenticates; the new one does.
        let stored = context.stored_user("course-student").await.unwrap();
        assert!(!stored.verify_password(&Password::from_cleartext("course-student")).unwrap());
        assert!(stored.verify_password(&new_pass).unwrap());
    }

    #[tokio::test]
    async fn test_change_to_same_password_is_a_duplicate() {
        let context = TestContext::setup().await;

        // Re-setting the current password hash reports a duplicate and the stored credential
        // keeps authenticating the same password.
        let current = Password::from_cleartext("course-student");
        let content = content_as("course-student", json!({"new-pass": current.as_str()}));
        let response: ChangePasswordResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.success);
        assert!(response.duplicate);

        let stored = context.stored_user("course-student").await.unwrap();
        assert!(stored.verify_password(&current).unwrap());
    }

    #[tokio::test]
    async fn test_empty_new_password_is_rejected() {
        let context = TestContext::setup().await;

        let content = content_as("course-student", json!({"new-pass": ""}));
        let envelope = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_status(StatusCode::BAD_REQUEST)
            .expect_locator("-038")
            .await;
        assert!(envelope.message.contains("'new-pass'"));
    }
}
