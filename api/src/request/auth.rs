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

//! Password authentication for user-scoped requests.

use crate::error::ApiError;
use crate::request::ApiRequest;
use autograder_core::db::Db;
use autograder_core::model::{self, Password, ServerUser};
use std::sync::Arc;

/// Authenticates the claimed `email`/`password` pair against the user directory.
///
/// The timing of the unknown-user and bad-password paths is not equalized; clients cannot tell
/// them apart because authentication responses carry no locator.
pub(crate) async fn authenticate(
    db: &Arc<dyn Db + Send + Sync>,
    request: &ApiRequest,
    email: &str,
    password: &Password,
) -> Result<ServerUser, ApiError> {
    // The root identity never authenticates with a password; it exists only behind the
    // root-user nonce.
    if email == model::ROOT_EMAIL {
        return Err(ApiError::auth_bad_request(
            "-051",
            request,
            "Root user cannot authenticate with a password.",
        ));
    }

    let user = match db.get_server_user(email).await {
        Ok(user) => user,
        Err(e) => {
            return Err(ApiError::internal("-012", request, "Failed to fetch user from DB.")
                .user(email)
                .err(e));
        }
    };

    let user = match user {
        Some(user) => user,
        None => {
            return Err(ApiError::auth_bad_request("-013", request, "Unknown user.").user(email));
        }
    };

    match user.verify_password(password) {
        Ok(true) => Ok(user),
        Ok(false) => {
            Err(ApiError::auth_bad_request("-014", request, "Bad password.").user(email))
        }
        Err(e) => Err(ApiError::internal("-037", request, "Failed to verify password.")
            .user(email)
            .err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HTTP_STATUS_AUTH_ERROR, HTTP_STATUS_SERVER_ERROR};
    use autograder_core::db::{FailingDb, MemoryDb};
    use autograder_core::model::{Credential, ServerRole};
    use std::collections::HashMap;

    fn request() -> ApiRequest {
        ApiRequest { endpoint: "/api/v03/test".to_owned(), ..ApiRequest::default() }
    }

    async fn one_user_db(email: &str, cleartext: &str) -> Arc<dyn Db + Send + Sync> {
        let password = Password::from_cleartext(cleartext);
        let db = MemoryDb::default();
        db.upsert_server_user(ServerUser {
            email: email.to_owned(),
            name: None,
            role: ServerRole::User,
            credential: Some(Credential::derive(&password).unwrap()),
            tokens: Vec::new(),
            course_info: HashMap::new(),
        })
        .await
        .unwrap();
        Arc::from(db)
    }

    #[tokio::test]
    async fn test_authenticate_ok() {
        let db = one_user_db("user@test.edulinq.org", "user").await;
        let user = authenticate(
            &db,
            &request(),
            "user@test.edulinq.org",
            &Password::from_cleartext("user"),
        )
        .await
        .unwrap();
        assert_eq!("user@test.edulinq.org", user.email);
    }

    #[tokio::test]
    async fn test_authenticate_root_is_reserved() {
        let db = one_user_db("user@test.edulinq.org", "user").await;
        let error =
            authenticate(&db, &request(), "root", &Password::from_cleartext("anything"))
                .await
                .unwrap_err();
        assert_eq!("-051", error.locator);
        assert_eq!(HTTP_STATUS_AUTH_ERROR, error.http_status);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let db = one_user_db("user@test.edulinq.org", "user").await;
        let error = authenticate(
            &db,
            &request(),
            "nobody@test.edulinq.org",
            &Password::from_cleartext("user"),
        )
        .await
        .unwrap_err();
        assert_eq!("-013", error.locator);
        assert_eq!(HTTP_STATUS_AUTH_ERROR, error.http_status);
    }

    #[tokio::test]
    async fn test_authenticate_bad_password() {
        let db = one_user_db("user@test.edulinq.org", "user").await;
        let error = authenticate(
            &db,
            &request(),
            "user@test.edulinq.org",
            &Password::from_cleartext("wrong"),
        )
        .await
        .unwrap_err();
        assert_eq!("-014", error.locator);
        assert_eq!(HTTP_STATUS_AUTH_ERROR, error.http_status);
    }

    #[tokio::test]
    async fn test_authenticate_fetch_error() {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(FailingDb::default());
        let error = authenticate(
            &db,
            &request(),
            "user@test.edulinq.org",
            &Password::from_cleartext("user"),
        )
        .await
        .unwrap_err();
        assert_eq!("-012", error.locator);
        assert_eq!(HTTP_STATUS_SERVER_ERROR, error.http_status);
    }
}
