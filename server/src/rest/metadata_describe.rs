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

//! API to fetch the machine-readable description of every endpoint.

use crate::driver::Driver;
use autograder_api::describe::ApiDescription;
use autograder_api::error::ApiError;
use autograder_api::request::{ContextMut, Payload, UserContext};
use schemars::JsonSchema;
use serde::Deserialize;

/// Path of this endpoint, relative to the API prefix.
pub(crate) const PATH: &str = "/metadata/describe";

/// Description of this endpoint for the catalog.
pub(crate) const DESCRIPTION: &str = "Describe all endpoints on the server.";

/// The request payload.
#[derive(Deserialize, JsonSchema)]
pub(crate) struct DescribeRequest {
    /// The user envelope.
    #[serde(flatten)]
    context: UserContext,
}

impl Payload for DescribeRequest {
    fn context_mut(&mut self) -> ContextMut<'_> {
        ContextMut::User(&mut self.context)
    }
}

/// POST handler for this API.  The response content is the endpoint catalog itself.
pub(crate) async fn handle(
    driver: Driver,
    request: DescribeRequest,
) -> Result<ApiDescription, ApiError> {
    match driver.api_description() {
        Some(description) => Ok(description.clone()),
        None => Err(ApiError::internal(
            "-609",
            &request.context,
            "The endpoint catalog has not been published.",
        )),
    }
}
