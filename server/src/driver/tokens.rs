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

//! Extends the driver with authentication-token operations.

use crate::driver::Driver;
use autograder_core::driver::{DriverError, DriverResult};
use autograder_core::model::{
    Credential, Password, UserToken, generate_cleartext_password,
};
use uuid::Uuid;

/// A freshly-minted token.  The cleartext is only ever available here; the server stores the
/// derived form.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MintedToken {
    /// Identifier to delete the token with later.
    pub(crate) id: String,

    /// User-chosen name of the token.
    pub(crate) name: String,

    /// The token secret.  Clients authenticate by sending its SHA-256 hex, exactly like a
    /// password.
    pub(crate) cleartext: String,
}

impl Driver {
    /// Mints a new named token for `email`.
    pub(crate) async fn create_token(&self, email: &str, name: &str) -> DriverResult<MintedToken> {
        let mut user = match self.db().get_server_user(email).await? {
            Some(user) => user,
            None => return Err(DriverError::NotFound(format!("User '{}' not found.", email))),
        };

        let cleartext = generate_cleartext_password();
        let credential = Credential::derive(&Password::from_cleartext(&cleartext))?;
        let id = Uuid::new_v4().to_string();

        user.tokens.push(UserToken { id: id.clone(), name: name.to_owned(), credential });
        self.db().upsert_server_user(user).await?;

        Ok(MintedToken { id, name: name.to_owned(), cleartext })
    }

    /// Deletes the token `token_id` of `email`, returning whether it existed.
    pub(crate) async fn delete_token(&self, email: &str, token_id: &str) -> DriverResult<bool> {
        let mut user = match self.db().get_server_user(email).await? {
            Some(user) => user,
            None => return Err(DriverError::NotFound(format!("User '{}' not found.", email))),
        };

        let before = user.tokens.len();
        user.tokens.retain(|token| token.id != token_id);
        let found = user.tokens.len() != before;

        if found {
            self.db().upsert_server_user(user).await?;
        }

        Ok(found)
    }
}
