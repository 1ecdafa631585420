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

//! Extends the driver with password operations.

use crate::driver::{Driver, MAIL_FROM};
use autograder_core::driver::{DriverError, DriverResult};
use autograder_core::model::{
    Credential, EmailAddress, Password, generate_cleartext_password,
};
use autograder_smtp::model::EmailTemplate;
use log::warn;

/// The outcome of a password change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PasswordChange {
    /// The operation completed.
    pub(crate) success: bool,

    /// The new password was identical to the stored one; the credential was left untouched.
    pub(crate) duplicate: bool,
}

impl Driver {
    /// Sets a new password for `email`.  Setting the password the account already has is
    /// reported as a duplicate and keeps the stored credential valid.
    pub(crate) async fn change_password(
        &self,
        email: &str,
        new_pass: &Password,
    ) -> DriverResult<PasswordChange> {
        let mut user = match self.db().get_server_user(email).await? {
            Some(user) => user,
            None => return Err(DriverError::NotFound(format!("User '{}' not found.", email))),
        };

        if let Some(credential) = &user.credential {
            if credential.verify(new_pass)? {
                return Ok(PasswordChange { success: true, duplicate: true });
            }
        }

        user.credential = Some(Credential::derive(new_pass)?);
        self.db().upsert_server_user(user).await?;

        Ok(PasswordChange { success: true, duplicate: false })
    }

    /// Replaces the password of `email` with a random one and mails the cleartext to the user.
    /// Returns whether the mail was actually delivered; delivery problems do not undo the
    /// reset.
    pub(crate) async fn reset_password(&self, email: &str) -> DriverResult<bool> {
        let mut user = match self.db().get_server_user(email).await? {
            Some(user) => user,
            None => return Err(DriverError::NotFound(format!("User '{}' not found.", email))),
        };

        let cleartext = generate_cleartext_password();
        user.credential = Some(Credential::derive(&Password::from_cleartext(&cleartext))?);
        self.db().upsert_server_user(user).await?;

        let emailed = self.send_password_email(email, &cleartext).await;
        Ok(emailed)
    }

    /// Mails a newly-generated password to its owner.  Failures are logged, not propagated:
    /// the credential change has already happened.
    pub(crate) async fn send_password_email(&self, email: &str, cleartext: &str) -> bool {
        let template = EmailTemplate {
            from: MAIL_FROM.parse().expect("The hardcoded sender mailbox must be valid"),
            subject_template: "Your autograder password",
            body_template: "Your new autograder password is '%pass%' (no quotes).\n",
        };

        let address = match EmailAddress::new(email) {
            Ok(address) => address,
            Err(e) => {
                warn!("Not emailing password to '{}': {}", email, e);
                return false;
            }
        };

        let message = match template.apply(&address, &[("pass", cleartext)]) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to build password email for '{}': {}", email, e);
                return false;
            }
        };

        match self.mailer().send(message).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send password email to '{}': {}", email, e);
                false
            }
        }
    }
}
