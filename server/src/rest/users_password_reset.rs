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

//! API for a user to reset their password to a generated one, delivered by email.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, Payload, UserContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/password/reset";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Reset your password to a random one, delivered by email.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct ResetPasswordRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,
}

impl Payload for ResetPasswordRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ResetPasswordResponse {
    /// The credential was replaced.
    pub(crate) success: bool,

    /// The new password was delivered by email.
    pub(crate) emailed: bool,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: ResetPasswordRequest,
) -> Result<ResetPasswordResponse, ApiError> {
    let emailed = driver
        .reset_password(&request.context.user_email)
        .await
        .map_err(|e| driver_error("-606", &request.context, e))?;

    Ok(ResetPasswordResponse { success: true, emailed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use autograder_api::testutils::OneShotBuilder;
    use autograder_core::model::{EmailAddress, Password};
    use autograder_smtp::model::testutils::parse_message;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        api_route(PATH)
    }

    #[tokio::test]
    async fn test_reset_mails_the_new_password() {
        let context = TestContext::setup().await;

        let content = content_as("course-student", json!({}));
        let response: ResetPasswordResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.success);
        assert!(response.emailed);

        let message = context
            .mailer
            .expect_one_message(&EmailAddress::from(email_of("course-student").as_str()))
            .await;
        let (_headers, body) = parse_message(&message);
        let cleartext = body
            .split('\'')
            .nth(1)
            .expect("The mail body must quote the generated password");

        // The old password is gone and the mailed one works.
        let stored = context.stored_user("course-student").await.unwrap();
        assert!(!stored.verify_password(&Password::from_cleartext("course-student")).unwrap());
        assert!(stored.verify_password(&Password::from_cleartext(cleartext)).unwrap());
    }

    #[tokio::test]
    async fn test_reset_survives_mail_failure() {
        let context = TestContext::setup().await;
        context
            .mailer
            .inject_error_for(EmailAddress::from(email_of("course-student").as_str()))
            .await;

        let content = content_as("course-student", json!({}));
        let response: ResetPasswordResponse = OneShotBuilder::new(context.app.clone(), route())
            .send_content(&content)
            .await
            .expect_content()
            .await;
        assert!(response.success);
        assert!(!response.emailed);

        // The credential was still replaced.
        let stored = context.stored_user("course-student").await.unwrap();
        assert!(!stored.verify_password(&Password::from_cleartext("course-student")).unwrap());
    }
}
