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

//! The route table and the per-request dispatcher.
//!
//! Routes are registered at startup and immutable afterwards.  The router tries every route in
//! registration order and picks the first whose method and anchored pattern both match; when
//! nothing matches and the path does not carry the API prefix, an optional static-file fallback
//! gets a chance before the final 404.
//!
//! For an API route the dispatcher runs the full request lifecycle: parse the `content` form
//! field, deserialize and validate the payload, call the handler (with panic recovery), wrap
//! the result in the response envelope, remove per-request upload directories, and emit exactly
//! one telemetry metric.

use crate::config::ServerOptions;
use crate::error::ApiError;
use crate::request::{self, NonceTable, Payload, Resolved};
use crate::response::ApiResponse;
use crate::telemetry::Telemetry;
use autograder_core::clocks::Clock;
use autograder_core::db::Db;
use autograder_core::model::{ApiRequestMetric, Timestamp};
use axum::body::Body;
use bytes::Bytes;
use futures::FutureExt;
use http::{Method, StatusCode, header};
use log::{debug, error, warn};
use regex::Regex;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Post form key for request content.
pub const API_REQUEST_CONTENT_KEY: &str = "content";

/// Maximum in-memory size of a POST form (20 MiB).
const MAX_FORM_MEM_SIZE_BYTES: u64 = 20 * 1024 * 1024;

/// The shared pieces of the server that the pipeline needs to serve requests.
#[derive(Clone)]
pub struct Pipeline {
    /// The persistence layer.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock used for envelope timestamps and metric durations.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Pipeline configuration.
    opts: ServerOptions,

    /// Single-use root nonces minted by the trusted local path.
    nonces: NonceTable,

    /// The telemetry emitter.
    telemetry: Telemetry,

    /// Version string stamped on every response envelope.
    version: String,
}

impl Pipeline {
    /// Creates the pipeline state.  In unit-testing mode telemetry is stored synchronously;
    /// otherwise a background task owns the writes.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: ServerOptions,
    ) -> Self {
        let telemetry = if opts.unit_testing_mode {
            Telemetry::new_sync(db.clone())
        } else {
            Telemetry::new_background(db.clone())
        };

        Pipeline {
            db,
            clock,
            opts,
            nonces: NonceTable::default(),
            telemetry,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Returns the persistence layer.
    pub(crate) fn db(&self) -> &Arc<dyn Db + Send + Sync> {
        &self.db
    }

    /// Returns the clock.
    pub(crate) fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Returns the pipeline configuration.
    pub fn opts(&self) -> &ServerOptions {
        &self.opts
    }

    /// Returns the root-nonce table so that trusted local front ends can mint nonces.
    pub fn nonces(&self) -> &NonceTable {
        &self.nonces
    }

    /// Returns the version string stamped on response envelopes.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// One file uploaded alongside the `content` field of a multipart POST.
pub(crate) struct Upload {
    /// Name the file was uploaded under.
    pub(crate) filename: String,

    /// Raw file contents.
    pub(crate) data: Bytes,
}

/// Paths to remove once the response is assembled.  Registration survives panics because the
/// dispatcher holds its own reference.
#[derive(Clone, Default)]
pub(crate) struct CleanupList(Arc<Mutex<Vec<PathBuf>>>);

impl CleanupList {
    /// Registers a directory for post-response removal.
    pub(crate) fn register(&self, path: PathBuf) {
        let mut paths = self.0.lock().expect("Cleanup list lock cannot be poisoned");
        paths.push(path);
    }

    /// Takes all registered directories.
    fn take(&self) -> Vec<PathBuf> {
        let mut paths = self.0.lock().expect("Cleanup list lock cannot be poisoned");
        std::mem::take(&mut *paths)
    }
}

/// The parsed pieces of an incoming API request handed to the typed dispatch chain.
pub(crate) struct RequestParts {
    /// Client identifier (the peer address, when known).
    pub(crate) sender: String,

    /// The JSON text extracted from the `content` form field.
    pub(crate) content: String,

    /// Files uploaded alongside the content.
    pub(crate) uploads: Vec<Upload>,

    /// Upload directories to remove after the response.
    pub(crate) cleanup: CleanupList,
}

/// The outcome of the typed dispatch chain for one request.
pub(crate) struct Dispatch {
    /// The handler's serialized result.  Null on failure.
    content: Value,

    /// The error the request failed with, if it failed.
    error: Option<ApiError>,

    /// Snapshot of the validated envelope, when validation got that far.
    resolved: Option<Resolved>,
}

impl Dispatch {
    /// Creates a failed outcome with no envelope information.
    fn from_error(error: ApiError) -> Self {
        Dispatch { content: Value::Null, error: Some(error), resolved: None }
    }
}

/// Future type returned by the type-erased dispatch chain.
type DispatchFuture = Pin<Box<dyn Future<Output = Dispatch> + Send>>;

/// The type-erased dispatch chain of one API route.
type ErasedHandler<S> =
    Arc<dyn Fn(Pipeline, S, RequestParts, String) -> DispatchFuture + Send + Sync>;

/// Everything the router keeps about one API route beyond its matcher.
pub(crate) struct ApiRouteData<S> {
    /// Human-readable description of the endpoint.
    pub(crate) description: &'static str,

    /// Name of the request payload type.
    pub(crate) request_type: String,

    /// Name of the response content type.
    pub(crate) response_type: String,

    /// Produces the schema of the request payload type.
    pub(crate) request_schema: Arc<dyn Fn() -> RootSchema + Send + Sync>,

    /// Produces the schema of the response content type.
    pub(crate) response_schema: Arc<dyn Fn() -> RootSchema + Send + Sync>,

    /// The typed dispatch chain.
    handler: ErasedHandler<S>,
}

/// What a route does when it matches.
pub(crate) enum RouteKind<S> {
    /// Serve an API endpoint.
    Api(ApiRouteData<S>),

    /// Permanently redirect to another location.
    Redirect {
        /// Where to send the client.
        target: String,
    },
}

/// A route as registered by the server, before pattern compilation.
pub struct Route<S> {
    /// The HTTP method this route answers to.
    method: Method,

    /// The path pattern, relative to the API prefix for API routes and absolute for redirects.
    pattern: String,

    /// What to do on a match.
    kind: RouteKind<S>,
}

impl<S: Clone + Send + Sync + 'static> Route<S> {
    /// Creates an API route served by `handler` under `pattern` (relative to the API prefix).
    ///
    /// The handler's payload type declares the endpoint's whole contract; see
    /// [`crate::request::Payload`].
    pub fn api<R, T, F, Fut>(pattern: &str, description: &'static str, handler: F) -> Self
    where
        R: Payload + JsonSchema,
        T: Serialize + JsonSchema + Send + 'static,
        F: Fn(S, R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let callback: ErasedHandler<S> =
            Arc::new(move |pipeline: Pipeline, state: S, parts: RequestParts, endpoint: String| {
                let handler = handler.clone();
                Box::pin(async move {
                    if parts.content.is_empty() {
                        return Dispatch::from_error(ApiError::bare_bad_request(
                            "-004",
                            &endpoint,
                            format!(
                                "JSON payload for POST form key '{}' is empty.",
                                API_REQUEST_CONTENT_KEY
                            ),
                        ));
                    }

                    let mut request: R = match serde_json::from_str(&parts.content) {
                        Ok(request) => request,
                        Err(e) => {
                            return Dispatch::from_error(
                                ApiError::bare_bad_request(
                                    "-005",
                                    &endpoint,
                                    format!(
                                        "JSON payload for POST form key '{}' is not valid JSON.",
                                        API_REQUEST_CONTENT_KEY
                                    ),
                                )
                                .err(e),
                            );
                        }
                    };

                    let resolved =
                        match request::validate(&pipeline, &parts, &mut request, &endpoint).await {
                            Ok(resolved) => resolved,
                            Err(error) => return Dispatch::from_error(error),
                        };

                    match (*handler)(state, request).await {
                        Ok(response) => match serde_json::to_value(&response) {
                            Ok(content) => {
                                Dispatch { content, error: None, resolved: Some(resolved) }
                            }
                            Err(e) => Dispatch {
                                content: Value::Null,
                                error: Some(
                                    ApiError::bare_internal(
                                        "-002",
                                        &endpoint,
                                        "Could not serialize API response.",
                                    )
                                    .err(e),
                                ),
                                resolved: Some(resolved),
                            },
                        },
                        Err(error) => Dispatch {
                            content: Value::Null,
                            error: Some(error),
                            resolved: Some(resolved),
                        },
                    }
                })
            });

        Route {
            method: Method::POST,
            pattern: pattern.to_owned(),
            kind: RouteKind::Api(ApiRouteData {
                description,
                request_type: R::schema_name(),
                response_type: T::schema_name(),
                request_schema: Arc::new(|| {
                    schemars::r#gen::SchemaGenerator::default().into_root_schema_for::<R>()
                }),
                response_schema: Arc::new(|| {
                    schemars::r#gen::SchemaGenerator::default().into_root_schema_for::<T>()
                }),
                handler: callback,
            }),
        }
    }

    /// Creates a route that answers `method` on the absolute `pattern` with a 301 to `target`.
    pub fn redirect(method: Method, pattern: &str, target: &str) -> Self {
        Route {
            method,
            pattern: pattern.to_owned(),
            kind: RouteKind::Redirect { target: target.to_owned() },
        }
    }
}

/// One registered route with its compiled matcher.
pub(crate) struct CompiledRoute<S> {
    /// The HTTP method this route answers to.
    method: Method,

    /// The anchored pattern the request path must match.
    regex: Regex,

    /// The route's path relative to the API prefix (API routes only).
    pub(crate) base_path: String,

    /// What to do on a match.
    kind: RouteKind<S>,
}

impl<S> CompiledRoute<S> {
    /// Returns the API data of this route, if it is an API route.
    pub(crate) fn api_data(&self) -> Option<&ApiRouteData<S>> {
        match &self.kind {
            RouteKind::Api(data) => Some(data),
            RouteKind::Redirect { .. } => None,
        }
    }
}

/// The route table plus everything needed to serve it.
pub struct ApiRouter<S> {
    /// Shared pipeline state.
    pipeline: Pipeline,

    /// The registered routes, in registration order.
    routes: Vec<CompiledRoute<S>>,
}

impl<S: Clone + Send + Sync + 'static> ApiRouter<S> {
    /// Creates an empty route table over `pipeline`.
    pub fn new(pipeline: Pipeline) -> Self {
        ApiRouter { pipeline, routes: Vec::new() }
    }

    /// Returns the pipeline this router serves.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Registers a route.  API route patterns are placed under the versioned API prefix;
    /// redirect patterns are taken as-is.
    pub fn add(&mut self, route: Route<S>) {
        let full_pattern = match &route.kind {
            RouteKind::Api(_) => {
                format!("{}{}", self.pipeline.opts().api_prefix(), route.pattern)
            }
            RouteKind::Redirect { .. } => route.pattern.clone(),
        };

        let regex = Regex::new(&format!("^{}$", full_pattern))
            .expect("Route patterns are hardcoded and must be valid regular expressions");

        self.routes.push(CompiledRoute {
            method: route.method,
            regex,
            base_path: route.pattern,
            kind: route.kind,
        });
    }

    /// Returns the registered routes for the describer.
    pub(crate) fn routes(&self) -> &[CompiledRoute<S>] {
        &self.routes
    }

    /// Wraps this table into an axum `Router` serving every request through the table.
    pub fn into_router(self, state: S) -> axum::Router {
        let router = Arc::new(self);
        axum::Router::new().fallback(move |request: axum::extract::Request| {
            let router = router.clone();
            let state = state.clone();
            async move {
                // A disconnecting client must not cancel a request in flight: the work runs on
                // its own task and the response is discarded if nobody is left to read it.
                match tokio::spawn(async move { router.handle(state, request).await }).await {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Request task died: {}", e);
                        plain_error_response()
                    }
                }
            }
        })
    }

    /// Serves one request from the route table.
    pub(crate) async fn handle(
        &self,
        state: S,
        request: axum::extract::Request,
    ) -> axum::response::Response {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        debug!("Incoming request: method={} url={}", method, path);

        let matched = self
            .routes
            .iter()
            .find(|route| route.method == method && route.regex.is_match(&path));

        match matched {
            Some(route) => match &route.kind {
                RouteKind::Redirect { target } => redirect_response(target),
                RouteKind::Api(data) => self.serve_api(data, state, request, path).await,
            },

            None => {
                // If this path does not look like an API request and static fallback is
                // enabled, then try to match the path with a static file.
                if self.pipeline.opts().static_fallback
                    && !path.starts_with(&self.pipeline.opts().api_prefix())
                {
                    return self.serve_static(&path).await;
                }

                not_found_response()
            }
        }
    }

    /// Runs the API request lifecycle for a matched route.
    async fn serve_api(
        &self,
        data: &ApiRouteData<S>,
        state: S,
        request: axum::extract::Request,
        endpoint: String,
    ) -> axum::response::Response {
        let arrival = Timestamp::from(self.pipeline.clock().now_utc());

        let sender = request
            .extensions()
            .get::<axum::extract::ConnectInfo<SocketAddr>>()
            .map(|info| info.0.to_string())
            .unwrap_or_default();

        let cleanup = CleanupList::default();

        let dispatch = match parse_parts(request, sender, cleanup.clone(), &endpoint).await {
            Err(error) => Dispatch::from_error(error),
            Ok(parts) => {
                let future =
                    (*data.handler)(self.pipeline.clone(), state, parts, endpoint.clone());
                match AssertUnwindSafe(future).catch_unwind().await {
                    Ok(dispatch) => dispatch,
                    Err(panic) => {
                        let value = panic_message(panic);
                        error!(
                            "Recovered from a panic when handling an API endpoint: \
                             endpoint={} value={}",
                            endpoint, value
                        );
                        Dispatch::from_error(
                            ApiError::bare_internal(
                                "-001",
                                &endpoint,
                                "Recovered from a panic when handling an API endpoint.",
                            )
                            .add("value", value),
                        )
                    }
                }
            }
        };

        self.finish(endpoint, arrival, dispatch, cleanup).await
    }

    /// Assembles and writes the envelope, after cleanup and before telemetry.
    async fn finish(
        &self,
        endpoint: String,
        arrival: Timestamp,
        dispatch: Dispatch,
        cleanup: CleanupList,
    ) -> axum::response::Response {
        // Every upload directory goes away before the response is written, on all exit paths
        // including panic recovery.
        for dir in cleanup.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove upload directory {}: {}", dir.display(), e);
                }
            }
        }

        let end = Timestamp::from(self.pipeline.clock().now_utc());

        // This is the last interaction we will have with the error, so log it here.
        let envelope = match &dispatch.error {
            Some(error) => {
                error.log();
                error.to_response(self.pipeline.version(), end)
            }
            None => {
                let resolved = dispatch
                    .resolved
                    .as_ref()
                    .expect("Successful dispatches always carry the validated envelope");
                ApiResponse::good(
                    resolved.base.request_id.clone(),
                    self.pipeline.version(),
                    resolved.base.timestamp,
                    end,
                    dispatch.content.clone(),
                )
            }
        };

        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                // Retry once with a stripped envelope before bailing out with plain text.
                let fallback =
                    ApiError::bare_internal("-002", &endpoint, "Could not serialize API response.")
                        .err(e);
                fallback.log();
                let fallback_envelope = fallback.to_response(self.pipeline.version(), end);
                match serde_json::to_string(&fallback_envelope) {
                    Ok(payload) => {
                        let response = self.json_response(fallback_envelope.http_status, payload);
                        self.emit_metric(&endpoint, arrival, end, &dispatch, Some(&fallback))
                            .await;
                        return response;
                    }
                    Err(e) => {
                        error!("Failed to encode API result as JSON, hard failing: {}", e);
                        self.emit_metric(&endpoint, arrival, end, &dispatch, Some(&fallback))
                            .await;
                        return plain_error_response();
                    }
                }
            }
        };

        let response = self.json_response(envelope.http_status, payload);
        self.emit_metric(&endpoint, arrival, end, &dispatch, dispatch.error.as_ref()).await;
        response
    }

    /// Builds the HTTP response around a serialized envelope.
    fn json_response(&self, status: u16, payload: String) -> axum::response::Response {
        let mut builder = http::Response::builder()
            .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
            .header(header::CONTENT_TYPE, "application/json");

        // When in testing mode, allow cross-origin requests.
        if self.pipeline.opts().testing_mode {
            builder = builder.header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        }

        builder
            .body(Body::from(payload))
            .expect("Response construction with static headers cannot fail")
    }

    /// Emits the one telemetry metric for this request.
    async fn emit_metric(
        &self,
        endpoint: &str,
        arrival: Timestamp,
        end: Timestamp,
        dispatch: &Dispatch,
        error: Option<&ApiError>,
    ) {
        let start = match &dispatch.resolved {
            Some(resolved) => resolved.base.timestamp,
            None => match error {
                Some(error) if error.timestamp != Timestamp::default() => error.timestamp,
                _ => arrival,
            },
        };

        let mut metric = ApiRequestMetric {
            timestamp: start,
            duration: end.millis_since(start),
            endpoint: Some(endpoint.to_owned()),
            ..ApiRequestMetric::default()
        };

        if let Some(resolved) = &dispatch.resolved {
            metric.sender = none_if_empty(&resolved.base.sender);
            metric.user = none_if_empty(&resolved.user_email);
            metric.course = none_if_empty(&resolved.course_id);
            metric.assignment = none_if_empty(&resolved.assignment_id);
        }

        if let Some(error) = error {
            if metric.sender.is_none() {
                metric.sender = none_if_empty(&error.sender);
            }
            if metric.user.is_none() {
                metric.user = none_if_empty(&error.user_email);
            }
            if metric.course.is_none() {
                metric.course = none_if_empty(&error.course_id);
            }
            if metric.assignment.is_none() {
                metric.assignment = none_if_empty(&error.assignment_id);
            }
            metric.locator = none_if_empty(&error.locator);
        }

        self.pipeline.telemetry.emit(metric).await;
    }

    /// Serves `path` from the static root, refusing any path that tries to escape it.
    async fn serve_static(&self, path: &str) -> axum::response::Response {
        let rel = path.trim_start_matches('/');
        if rel.split('/').any(|part| part == "..") {
            return not_found_response();
        }

        let full = if rel.is_empty() {
            self.pipeline.opts().static_root.join("index.html")
        } else {
            self.pipeline.opts().static_root.join(rel)
        };

        match tokio::fs::read(&full).await {
            Ok(data) => http::Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, static_content_type(&full))
                .body(Body::from(data))
                .expect("Response construction with static headers cannot fail"),
            Err(_) => not_found_response(),
        }
    }
}

/// Picks a content type for a static file based on its extension.
fn static_content_type(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Builds a plain 404 response.
fn not_found_response() -> axum::response::Response {
    http::Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("404 page not found\n"))
        .expect("Response construction with static headers cannot fail")
}

/// Builds a permanent redirect to `target`.
fn redirect_response(target: &str) -> axum::response::Response {
    http::Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, target)
        .body(Body::empty())
        .expect("Redirect targets are hardcoded and must be valid header values")
}

/// Builds the response of last resort, when even the error envelope cannot be serialized.
fn plain_error_response() -> axum::response::Response {
    http::Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("Server Error\n"))
        .expect("Response construction with static headers cannot fail")
}

/// Extracts a printable message from a recovered panic value.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Returns `None` for an empty string, `Some` otherwise.
fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_owned()) }
}

/// Splits the incoming POST body into the `content` JSON text plus any uploaded files.
async fn parse_parts(
    request: axum::extract::Request,
    sender: String,
    cleanup: CleanupList,
    endpoint: &str,
) -> Result<RequestParts, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_owned();

    let body = request.into_body();

    let mut content = String::new();
    let mut uploads = Vec::new();

    if content_type.contains("multipart/form-data") {
        let boundary = multer::parse_boundary(&content_type).map_err(|e| {
            ApiError::bare_bad_request("-003", endpoint, "POST request is improperly formatted.")
                .err(e)
        })?;

        let constraints = multer::Constraints::new()
            .size_limit(multer::SizeLimit::new().whole_stream(MAX_FORM_MEM_SIZE_BYTES));
        let mut multipart =
            multer::Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    return Err(ApiError::bare_bad_request(
                        "-003",
                        endpoint,
                        "POST request is improperly formatted.",
                    )
                    .err(e));
                }
            };

            let name = field.name().unwrap_or("").to_owned();
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await.map_err(|e| {
                ApiError::bare_bad_request(
                    "-003",
                    endpoint,
                    "POST request is improperly formatted.",
                )
                .err(e)
            })?;

            if name == API_REQUEST_CONTENT_KEY && file_name.is_none() {
                content = String::from_utf8_lossy(&data).into_owned();
            } else {
                uploads.push(Upload { filename: file_name.unwrap_or(name), data });
            }
        }
    } else {
        let bytes = axum::body::to_bytes(body, MAX_FORM_MEM_SIZE_BYTES as usize)
            .await
            .map_err(|e| {
                ApiError::bare_bad_request(
                    "-003",
                    endpoint,
                    "POST request is improperly formatted.",
                )
                .err(e)
            })?;

        let fields: Vec<(String, String)> =
            serde_urlencoded::from_bytes(&bytes).map_err(|e| {
                ApiError::bare_bad_request(
                    "-003",
                    endpoint,
                    "POST request is improperly formatted.",
                )
                .err(e)
            })?;

        for (key, value) in fields {
            if key == API_REQUEST_CONTENT_KEY {
                content = value;
            }
        }
    }

    Ok(RequestParts { sender, content, uploads, cleanup })
}
