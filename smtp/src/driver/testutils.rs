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

//! Test utilities for email handling.

use crate::driver::SmtpMailer;
use async_trait::async_trait;
use autograder_core::driver::{DriverError, DriverResult};
use autograder_core::model::EmailAddress;
use futures::lock::Mutex;
use lettre::Message;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Mailer that captures outgoing messages.
#[derive(Clone, Default)]
pub struct RecorderSmtpMailer {
    /// Storage for captured messages.
    pub inboxes: Arc<Mutex<HashMap<EmailAddress, Vec<Message>>>>,

    /// Addresses for which to fail sending a message to.
    errors: Arc<Mutex<HashSet<EmailAddress>>>,
}

impl RecorderSmtpMailer {
    /// Makes trying to send messages to `email` fail with an error.
    pub async fn inject_error_for<E: Into<EmailAddress>>(&self, email: E) {
        let mut errors = self.errors.lock().await;
        errors.insert(email.into());
    }

    /// Expects that no messages were sent.
    pub async fn expect_no_messages(&self) {
        let inboxes = self.inboxes.lock().await;
        assert_eq!(0, inboxes.len(), "Expected to find no messages");
    }

    /// Expects that messages were sent to `exp_to` and nobody else, and returns the list of
    /// messages to that recipient.
    pub async fn expect_one_inbox(&self, exp_to: &EmailAddress) -> Vec<Message> {
        let inboxes = self.inboxes.lock().await;
        assert_eq!(1, inboxes.len(), "Expected to find just one message in one inbox");
        let (to, messages) = inboxes.iter().next().unwrap();
        assert_eq!(exp_to, to);
        messages.clone()
    }

    /// Expects that only one message was sent to `exp_to` and nobody else, and returns the
    /// message.
    pub async fn expect_one_message(&self, exp_to: &EmailAddress) -> Message {
        let mut messages = self.expect_one_inbox(exp_to).await;
        assert_eq!(1, messages.len(), "Expected to find just one message for {}", exp_to.as_str());
        messages.pop().unwrap()
    }
}

#[async_trait]
impl SmtpMailer for RecorderSmtpMailer {
    async fn send(&self, message: Message) -> DriverResult<()> {
        let raw_to =
            message.headers().get_raw("To").expect("To header must have been present");
        let to = EmailAddress::new(raw_to).expect("To header must be a valid address");

        {
            let errors = self.errors.lock().await;
            if errors.contains(&to) {
                return Err(DriverError::BackendError(format!(
                    "Sending email to {} failed",
                    to.as_str()
                )));
            }
        }

        let mut inboxes = self.inboxes.lock().await;
        inboxes.entry(to).or_insert_with(Vec::default).push(message);
        Ok(())
    }
}
