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

//! The `EmailAddress` data type.

use crate::model::{ModelError, ModelResult};
use serde::de::Visitor;
use serde::{Deserialize, Serialize};

/// Maximum length of email addresses.
pub(crate) const MAX_EMAIL_LENGTH: usize = 128;

/// Represents a correctly-formatted email address.
///
/// Account identifiers in the user directory are free-form strings because they come from
/// rosters we do not control.  This type is for the places that actually *send* mail, where we
/// need something the transport will accept.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new email address from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.trim().is_empty() {
            return Err(ModelError("Email address cannot be empty".to_owned()));
        }
        if s.len() > MAX_EMAIL_LENGTH {
            return Err(ModelError("Email address is too long".to_owned()));
        }

        // Email addresses can have many formats, and attempting to validate them is futile.
        // Roster imports have already used these addresses to contact the students, so we trust
        // that they are valid.  But we do some tiny validation anyway to make sure we at least
        // pass data around correctly.
        if !s.contains('@') || s.contains(' ') {
            return Err(ModelError(format!("Email does not look like a valid address '{}'", s)));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the email address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&str> for EmailAddress {
    fn from(raw_email: &str) -> Self {
        Self::new(raw_email).expect("Hardcoded email addresses for testing must be valid")
    }
}

/// Visitor to deserialize an `EmailAddress` from a string.
struct EmailAddressVisitor;

impl Visitor<'_> for EmailAddressVisitor {
    type Value = EmailAddress;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an email address")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match EmailAddress::new(v) {
            Ok(address) => Ok(address),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        match EmailAddress::new(v) {
            Ok(address) => Ok(address),
            Err(e) => Err(E::custom(format!("{}", e))),
        }
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(EmailAddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emailaddress_ok() {
        assert_eq!("simple@example.com", EmailAddress::new("simple@example.com").unwrap().as_str());
        assert_eq!("a!b@c", EmailAddress::new("a!b@c").unwrap().as_str());
    }

    #[test]
    fn test_emailaddress_error() {
        assert!(EmailAddress::new("").is_err());
        assert!(EmailAddress::new("foo").is_err());
        assert!(EmailAddress::new("foo bar@example.com").is_err());
        assert!(EmailAddress::new(format!("{}@x", "a".repeat(MAX_EMAIL_LENGTH))).is_err());
    }

    #[test]
    fn test_emailaddress_de_error() {
        let err = serde_json::from_str::<EmailAddress>("\"HelloWorld\"").unwrap_err();
        assert!(err.to_string().contains("does not look like a valid address"));
    }

    #[test]
    fn test_emailaddress_ser_de_ok() {
        let address = EmailAddress::new("student@test.edulinq.org").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!("\"student@test.edulinq.org\"", json);
        assert_eq!(address, serde_json::from_str(&json).unwrap());
    }
}
