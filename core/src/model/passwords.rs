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

//! The `Password` and `Credential` data types.
//!
//! Clients never send cleartext passwords: the protocol carries the lowercase hex SHA-256 of the
//! cleartext.  The server then feeds that hash through a slow, salted KDF (bcrypt) and stores
//! only the derived credential.

use crate::model::{ModelError, ModelResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Cost factor for the bcrypt derivation of stored credentials.
const BCRYPT_COST: u32 = 10;

/// Length of generated cleartext passwords, in characters.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// An opaque type to hold a client-supplied password hash, protecting it from leaking into logs.
///
/// The contained value is the lowercase hex SHA-256 of the user's cleartext password, which is
/// what travels on the wire.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Creates a new password from the client-supplied hash string.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Password(s.into())
    }

    /// Creates a password the way clients do: by hashing the `cleartext` with SHA-256 and
    /// encoding the digest as lowercase hex.
    pub fn from_cleartext<S: AsRef<[u8]>>(cleartext: S) -> Self {
        let digest = Sha256::digest(cleartext.as_ref());
        Password(hex::encode(digest))
    }

    /// Returns true if the client sent no password at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a string view of the password hash.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed password")
    }
}

impl schemars::JsonSchema for Password {
    fn schema_name() -> String {
        "Password".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

/// An opaque type to hold a stored credential: the salted, slow-KDF derivation of a `Password`.
#[derive(Clone, Eq, PartialEq)]
pub struct Credential(String);

impl Credential {
    /// Reconstructs a credential from its stored string form.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Credential(s.into())
    }

    /// Derives a new credential from a client-supplied `password` hash.  The per-user salt is
    /// generated here and embedded in the derived string.
    pub fn derive(password: &Password) -> ModelResult<Self> {
        let derived = bcrypt::hash(password.as_str(), BCRYPT_COST)
            .map_err(|e| ModelError(format!("Credential derivation failed: {}", e)))?;
        Ok(Credential(derived))
    }

    /// Verifies if `password` matches this credential.
    pub fn verify(&self, password: &Password) -> ModelResult<bool> {
        bcrypt::verify(password.as_str(), &self.0)
            .map_err(|e| ModelError(format!("Credential verification failed: {}", e)))
    }

    /// Returns a string view of the stored credential.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("scrubbed credential")
    }
}

/// Generates a random cleartext password for accounts created without one.
///
/// The cleartext is returned so it can be mailed to the user; only the derived credential of its
/// hash should ever be stored.
pub fn generate_cleartext_password() -> String {
    let mut rng = rand::thread_rng();
    let mut password = String::with_capacity(GENERATED_PASSWORD_LENGTH);
    for _ in 0..GENERATED_PASSWORD_LENGTH {
        let i = rng.gen_range(0..(10 + 26 + 26));
        let ch = if i < 10 {
            (b'0' + i) as char
        } else if i < 10 + 26 {
            (b'a' + (i - 10)) as char
        } else {
            (b'A' + (i - 10 - 26)) as char
        };
        password.push(ch);
    }
    password
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_from_cleartext() {
        // Precomputed SHA-256 of "course-admin".
        assert_eq!(
            "c22755f48fa0ef601e8d57a3ba169eeda80e9b2d4eaecc2c2ca2ffc887722f7c",
            Password::from_cleartext("course-admin").as_str()
        );
    }

    #[test]
    fn test_password_debug_is_scrubbed() {
        let password = Password::from_cleartext("secret");
        assert_eq!("scrubbed password", format!("{:?}", password));
    }

    #[test]
    fn test_credential_derive_and_verify() {
        let password1 = Password::from_cleartext("first password");
        let password2 = Password::from_cleartext("second password");
        let credential1 = Credential::derive(&password1).unwrap();
        let credential2 = Credential::derive(&password2).unwrap();

        assert!(credential1.as_str().starts_with("$2b$10$"));
        assert!(credential1 != credential2);

        assert!(credential1.verify(&password1).unwrap());
        assert!(!credential1.verify(&password2).unwrap());
        assert!(!credential2.verify(&password1).unwrap());
        assert!(credential2.verify(&password2).unwrap());
    }

    #[test]
    fn test_generate_cleartext_password_unique_and_alphanumeric() {
        let one = generate_cleartext_password();
        let two = generate_cleartext_password();
        assert_eq!(GENERATED_PASSWORD_LENGTH, one.len());
        assert!(one.chars().all(|ch| ch.is_ascii_alphanumeric()));
        assert_ne!(one, two);
    }
}
