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

//! API to delete an authentication token.

use crate::driver::Driver;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, NonEmptyString, Payload, SpecialField, UserContext,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/tokens/delete";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Delete an authentication token.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct DeleteTokenRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,

    /// Identifier of the token to delete.
    #[serde(default, rename = "token-id")]
    token_id: NonEmptyString,
}

impl Payload for DeleteTokenRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::NonEmptyString { name: "token-id", value: &self.token_id }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct DeleteTokenResponse {
    /// Whether the token existed and was deleted.
    pub(crate) found: bool,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: DeleteTokenRequest,
) -> Result<DeleteTokenResponse, ApiError> {
    let found = driver
        .delete_token(&request.context.user_email, request.token_id.as_str())
        .await
        .map_err(|e| driver_error("-608", &request.context, e))?;

    Ok(DeleteTokenResponse { found })
}
