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

//! Utilities to send messages over email.

use async_trait::async_trait;
use autograder_core::driver::{DriverError, DriverResult};
use autograder_core::env::{get_optional_var, get_required_var};
use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

/// Options to establish an SMTP connection.
#[derive(Clone)]
pub struct SmtpOptions {
    /// SMTP server to use.
    pub relay: String,

    /// Username for logging into the SMTP server.
    pub username: String,

    /// Password for logging into the SMTP server.
    pub password: String,
}

impl SmtpOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_RELAY`, `<prefix>_USERNAME` and
    /// `<prefix>_PASSWORD`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            relay: get_required_var::<String>(prefix, "RELAY")?,
            username: get_required_var::<String>(prefix, "USERNAME")?,
            password: get_required_var::<String>(prefix, "PASSWORD")?,
        })
    }

    /// Initializes a set of options from the environment if the transport is configured at all,
    /// returning `None` when `<prefix>_RELAY` is not set.
    pub fn from_env_optional(prefix: &str) -> Result<Option<Self>, String> {
        match get_optional_var::<String>(prefix, "RELAY")? {
            Some(_) => Ok(Some(Self::from_env(prefix)?)),
            None => Ok(None),
        }
    }
}

/// Trait to abstract the integration with the mailer.
#[async_trait]
pub trait SmtpMailer {
    /// Sends a message over SMTP.
    async fn send(&self, message: Message) -> DriverResult<()>;
}

/// Mailer backed by a real SMTP connection using `lettre`.
#[derive(Clone)]
pub struct LettreSmtpMailer(AsyncSmtpTransport<Tokio1Executor>);

impl LettreSmtpMailer {
    /// Establishes a connection to the SMTP server configured in `opts`.
    pub fn connect(opts: SmtpOptions) -> Result<Self, String> {
        let creds = Credentials::new(opts.username, opts.password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&opts.relay)
            .map_err(|e| format!("{}", e))?
            .credentials(creds)
            .build();
        Ok(LettreSmtpMailer(mailer))
    }
}

#[async_trait]
impl SmtpMailer for LettreSmtpMailer {
    async fn send(&self, message: Message) -> DriverResult<()> {
        self.0
            .send(message)
            .await
            .map_err(|e| DriverError::BackendError(format!("SMTP communication failed: {}", e)))?;
        Ok(())
    }
}

/// Mailer that drops every message, for deployments without a configured transport.
#[derive(Clone, Default)]
pub struct NullSmtpMailer {}

#[async_trait]
impl SmtpMailer for NullSmtpMailer {
    async fn send(&self, _message: Message) -> DriverResult<()> {
        Err(DriverError::BackendError("No mail transport is configured".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_options_from_env_all_present() {
        let overrides = [
            ("SMTP_RELAY", Some("smtp.example.com")),
            ("SMTP_USERNAME", Some("username")),
            ("SMTP_PASSWORD", Some("password")),
        ];
        temp_env::with_vars(overrides, || {
            let opts = SmtpOptions::from_env("SMTP").unwrap();
            assert_eq!("smtp.example.com", opts.relay);
            assert_eq!("username", opts.username);
            assert_eq!("password", opts.password);
        });
    }

    #[test]
    fn test_smtp_options_from_env_missing_required() {
        let overrides = [
            ("SMTP_RELAY", Some("smtp.example.com")),
            ("SMTP_USERNAME", None),
            ("SMTP_PASSWORD", Some("password")),
        ];
        temp_env::with_vars(overrides, || {
            let err = SmtpOptions::from_env("SMTP").unwrap_err();
            assert!(err.contains("SMTP_USERNAME"));
        });
    }

    #[test]
    fn test_smtp_options_from_env_optional_absent() {
        let overrides = [
            ("SMTP_RELAY", None::<&str>),
            ("SMTP_USERNAME", None),
            ("SMTP_PASSWORD", None),
        ];
        temp_env::with_vars(overrides, || {
            assert!(SmtpOptions::from_env_optional("SMTP").unwrap().is_none());
        });
    }

    #[tokio::test]
    async fn test_null_mailer_reports_backend_error() {
        let mailer = NullSmtpMailer::default();
        let message = Message::builder()
            .from("a@example.com".parse().unwrap())
            .to("b@example.com".parse().unwrap())
            .subject("subject")
            .body("body".to_owned())
            .unwrap();
        match mailer.send(message).await {
            Err(DriverError::BackendError(msg)) => assert!(msg.contains("No mail transport")),
            e => panic!("{:?}", e),
        }
    }
}
