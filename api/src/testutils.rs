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

//! Common test code for driving the request pipeline.

use crate::response::ApiResponse;
use axum::Router;
use axum::extract::Request;
use http::{HeaderValue, Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use tower::util::ServiceExt;

/// Maximum body size accepted back from the app under test.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Boundary used for handcrafted multipart bodies.
const MULTIPART_BOUNDARY: &str = "autograder-test-boundary";

/// Builder for a single request to the API server.
#[must_use]
pub struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub fn new<U: AsRef<str>>(app: Router, (method, uri): (Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Sets the header `name` to `value` in the outgoing request.
    pub fn with_header<V: fmt::Display>(mut self, name: &'static str, value: V) -> Self {
        self.builder = self.builder.header(
            name,
            HeaderValue::try_from(value.to_string()).expect("Test header values must be valid"),
        );
        self
    }

    /// Finishes building the request and sends it with an empty payload.
    pub async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(axum::body::Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends the JSON-serialized `content` in the `content`
    /// field of an urlencoded form, the way API clients do.
    pub async fn send_content<T: Serialize>(self, content: &T) -> ResponseChecker {
        let json = serde_json::to_string(content).unwrap();
        let body = serde_urlencoded::to_string([("content", json.as_str())]).unwrap();
        let request = self
            .builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .body(axum::body::Body::from(body))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends a raw urlencoded form.
    pub async fn send_form(self, fields: &[(&str, &str)]) -> ResponseChecker {
        let body = serde_urlencoded::to_string(fields).unwrap();
        let request = self
            .builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .body(axum::body::Body::from(body))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends a multipart form carrying the JSON-serialized
    /// `content` plus one part per `(filename, data)` pair.
    pub async fn send_multipart<T: Serialize>(
        self,
        content: &T,
        files: &[(&str, &[u8])],
    ) -> ResponseChecker {
        let json = serde_json::to_string(content).unwrap();

        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"content\"\r\n\r\n");
        body.extend_from_slice(json.as_bytes());
        body.extend_from_slice(b"\r\n");

        for (filename, data) in files {
            body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    filename, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());

        let request = self
            .builder
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(axum::body::Body::from(body))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Type alias for the complex type returned by the `oneshot` function.
type HttpResponse = hyper::Response<axum::body::Body>;

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub struct ResponseChecker {
    /// Actual response that we received from the app.
    response: HttpResponse,

    /// Expected HTTP status code in the response above.
    exp_status: StatusCode,
}

impl From<HttpResponse> for ResponseChecker {
    fn from(response: HttpResponse) -> Self {
        Self { response, exp_status: StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub fn expect_status(mut self, status: StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Performs common validation operations on the response.
    fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
    }

    /// Returns the value of the header `name`, if present.
    pub fn header(&self, name: &str) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .map(|value| value.to_str().expect("Header must be printable").to_owned())
    }

    /// Finishes checking the response and expects it to carry a response envelope, which is
    /// validated against the HTTP status and returned.
    pub async fn into_envelope(self) -> ApiResponse {
        self.verify();

        let status = self.response.status();
        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        let envelope: ApiResponse = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                let body = String::from_utf8_lossy(&body).into_owned();
                panic!("Invalid response envelope due to {}; content was {}", e, body);
            }
        };

        assert_eq!(u16::from(status), envelope.http_status);
        assert_eq!(envelope.success, envelope.http_status == 200);
        assert!(envelope.start_timestamp <= envelope.end_timestamp);
        envelope
    }

    /// Finishes checking the response and expects a successful envelope whose content decodes
    /// as `T`.
    pub async fn expect_content<T: DeserializeOwned>(self) -> T {
        let envelope = self.into_envelope().await;
        assert!(envelope.success, "Expected success but got: {:?}", envelope);
        serde_json::from_value(envelope.content).unwrap()
    }

    /// Finishes checking the response and expects a failed envelope with the given locator.
    pub async fn expect_locator(self, exp_locator: &str) -> ApiResponse {
        let envelope = self.into_envelope().await;
        assert!(!envelope.success, "Expected failure but got: {:?}", envelope);
        assert_eq!(exp_locator, envelope.locator);
        assert_eq!(serde_json::Value::Null, envelope.content);
        envelope
    }

    /// Finishes checking the response and returns the body of the response as UTF-8.
    pub async fn take_body_as_text(self) -> String {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Finishes checking the response and returns the response itself for out of band
    /// validation of properties not supported by the `ResponseChecker`.
    pub fn take_response(self) -> HttpResponse {
        self.verify();

        self.response
    }
}
