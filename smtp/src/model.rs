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

//! Data types to interact with email messages.

use autograder_core::model::{EmailAddress, ModelError, ModelResult};
use lettre::message::Body;
use lettre::message::header::ContentTransferEncoding;
pub use lettre::message::{Mailbox, Message};

/// A template for an email message sent by the server.
pub struct EmailTemplate {
    /// Who the message comes from.
    pub from: Mailbox,

    /// Subject of the message.
    pub subject_template: &'static str,

    /// Body of the message.
    pub body_template: &'static str,
}

impl EmailTemplate {
    /// Creates a message sent to `to` based on the template by applying the collection of
    /// `replacements` to it.
    ///
    /// Both templates may contain `%key%` markers where `key` must appear in `replacements`;
    /// a raw `%` is written as `%%`.
    pub fn apply(
        &self,
        to: &EmailAddress,
        replacements: &[(&'static str, &str)],
    ) -> ModelResult<Message> {
        let to = to
            .as_str()
            .parse()
            .map_err(|e| ModelError(format!("Cannot parse email address {}: {}", to.as_str(), e)))?;

        let subject = expand(self.subject_template, replacements)?;

        let body = Body::new_with_encoding(
            expand(self.body_template, replacements)?,
            ContentTransferEncoding::QuotedPrintable,
        )
        .map_err(|e| ModelError(format!("Failed to encode message: {:?}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| ModelError(format!("Failed to encode message: {}", e)))?;
        Ok(message)
    }
}

/// Expands every `%key%` marker in `template` using `replacements`, treating `%%` as an escaped
/// percent sign.  A marker without a replacement is an error because templates are hardcoded and
/// their keys must always be supplied.
fn expand(template: &'static str, replacements: &[(&'static str, &str)]) -> ModelResult<String> {
    let mut output = String::with_capacity(template.len());

    let mut rest = template;
    while let Some(start) = rest.find('%') {
        output.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        if let Some(end) = rest.find('%') {
            let key = &rest[..end];
            rest = &rest[end + 1..];

            if key.is_empty() {
                output.push('%');
                continue;
            }

            match replacements.iter().find(|(candidate, _)| *candidate == key) {
                Some((_, value)) => output.push_str(value),
                None => {
                    return Err(ModelError(format!("No replacement for template key '{}'", key)));
                }
            }
        } else {
            return Err(ModelError(format!("Unterminated template marker in '{}'", template)));
        }
    }
    output.push_str(rest);

    Ok(output)
}

/// Utilities to help testing email messages.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::collections::HashMap;

    /// Given an SMTP `message`, parses it and extracts its headers and body.
    pub fn parse_message(message: &Message) -> (HashMap<String, String>, String) {
        let text = String::from_utf8(message.formatted()).unwrap();
        let (raw_headers, encoded_body) = text
            .split_once("\r\n\r\n")
            .unwrap_or_else(|| panic!("Message seems to have the wrong format: {}", text));

        let mut headers = HashMap::default();
        for raw_header in raw_headers.split("\r\n") {
            let (key, value) = raw_header
                .split_once(": ")
                .unwrap_or_else(|| panic!("Header seems to have the wrong format: {}", raw_header));
            let previous = headers.insert(key.to_owned(), value.to_owned());
            assert!(previous.is_none(), "Duplicate header {}", raw_header);
        }

        let decoded_body =
            quoted_printable::decode(encoded_body, quoted_printable::ParseMode::Strict).unwrap();
        let body = String::from_utf8(decoded_body).unwrap().replace("\r\n", "\n");

        (headers, body)
    }
}
