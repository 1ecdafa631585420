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

//! API to fetch one server user.

use crate::driver::Driver;
use crate::model::ServerUserInfo;
use crate::rest::driver_error;
use autograder_api::error::ApiError;
use autograder_api::request::{
    ContextMut, Payload, SpecialField, TargetServerUserSelfOrAdmin, UserContext,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/users/get";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Get the information for a server user.";

/// The request payload.  A blank target means the requesting user; fetching somebody else
/// requires a server admin.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct GetUserRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,

    /// The user to look up.
    #[serde(default, rename = "target-email")]
    target: TargetServerUserSelfOrAdmin,
}

impl Payload for GetUserRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }

    fn special_fields(&mut self) -> Vec<SpecialField<'_>> {
        vec![SpecialField::TargetServerUserSelfOrAdmin {
            name: "target-email",
            field: &mut self.target,
        }]
    }
}

/// The response content.
#[derive(Debug, JsonSchema, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct GetUserResponse {
    /// Whether the target user exists.
    pub(crate) found: bool,

    /// The target user, when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user: Option<ServerUserInfo>,
}

/// POST handler for this API.
pub(crate) async fn handle(
    driver: Driver,
    request: GetUserRequest,
) -> Result<GetUserResponse, ApiError> {
    let user = match &request.target.user {
        Some(user) => Some(
            ServerUserInfo::for_user(driver.db(), user)
                .await
                .map_err(|e| driver_error("-603", &request.context, e))?,
        ),
        None => None,
    };

    Ok(GetUserResponse { found: request.target.found, user })
}
