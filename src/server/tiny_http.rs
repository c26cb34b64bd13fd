//! tiny_http server adapter
//!
//! Handles routing, authentication, body parsing, and response conversion
//! for tiny_http. Routing itself is [`route`], which takes plain values so
//! it can be exercised without a socket.

use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use serde::{Serialize, de::DeserializeOwned};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::api::{
    self, ApiError, ApiResponse, AppContext, CreateDonationPayload, CreateMatchPayload,
    CreateRequestPayload,
};
use crate::core::models::Caller;

/// A routed response before it is turned into HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code
    pub status: u16,
    /// JSON body
    pub body: String,
}

// =============================================================================
// SERVER LOOP
// =============================================================================

/// Serve the API on `bind` until the process is stopped
///
/// Requests are handled by a fixed pool of worker threads sharing one
/// listener; store writes stay serialized by the store itself.
pub fn serve(ctx: &AppContext, bind: &str) -> anyhow::Result<()> {
    let server = Server::http(bind).map_err(|e| anyhow::anyhow!("Failed to start server: {e}"))?;
    let server = Arc::new(server);
    let workers = thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
    info!("Listening on http://{bind} with {workers} worker(s)");

    let mut handles = Vec::with_capacity(workers);
    for index in 0..workers {
        let server = Arc::clone(&server);
        let ctx = ctx.clone();
        let handle = thread::Builder::new().name(format!("http-{index}")).spawn(move || {
            loop {
                match server.recv() {
                    Ok(mut request) => {
                        let response = handle_api_request(&ctx, &mut request);
                        if let Err(e) = request.respond(response) {
                            warn!("Failed to send response: {e}");
                        }
                    },
                    Err(e) => {
                        warn!("Listener stopped: {e}");
                        break;
                    },
                }
            }
        })?;
        handles.push(handle);
    }

    for handle in handles {
        if handle.join().is_err() {
            warn!("HTTP worker panicked");
        }
    }
    Ok(())
}

// =============================================================================
// REQUEST HANDLING
// =============================================================================

/// Handle an API request and return a response
#[must_use]
pub fn handle_api_request(ctx: &AppContext, request: &mut Request) -> Response<Cursor<Vec<u8>>> {
    let url = request.url().to_string();
    let method = request.method().clone();
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        let error = ApiError::bad_request(format!("Failed to read request body: {e}"));
        return into_response(&error_reply(&error));
    }

    let reply = route(ctx, &method, &url, authorization.as_deref(), &body);
    debug!("{method} {url} -> {}", reply.status);
    into_response(&reply)
}

/// Map a request to a handler and render its result
///
/// Every route requires a bearer token resolved by the identity provider.
#[must_use]
pub fn route(
    ctx: &AppContext,
    method: &Method,
    url: &str,
    authorization: Option<&str>,
    body: &str,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    // Supports both /api/v1/... (versioned) and /api/... (legacy)
    let Some(api_path) = path.strip_prefix("/api/v1").or_else(|| path.strip_prefix("/api")) else {
        return not_found_reply(&format!("Not found: {method} {path}"));
    };

    let caller = match ctx.authenticate(authorization) {
        Ok(caller) => caller,
        Err(e) => return error_reply(&e),
    };

    dispatch(ctx, &caller, method, api_path, body)
        .unwrap_or_else(|| not_found_reply(&format!("API endpoint not found: {method} {api_path}")))
}

fn dispatch(
    ctx: &AppContext,
    caller: &Caller,
    method: &Method,
    api_path: &str,
    body: &str,
) -> Option<Reply> {
    let reply = match (method, api_path) {
        (&Method::Get, "/donations/my-requests") => handle_result(api::list_requests(ctx, caller)),
        (&Method::Get, "/donations/my-offers") => handle_result(api::list_donations(ctx, caller)),
        (&Method::Get, "/matching/my-matches") => handle_result(api::list_matches(ctx, caller)),

        (&Method::Post, "/donations/requests") => {
            match parse_json_body::<CreateRequestPayload>(body) {
                Ok(payload) => handle_result(api::create_request(ctx, caller, payload)),
                Err(e) => error_reply(&e),
            }
        },
        (&Method::Post, "/donations/offers") => {
            match parse_json_body::<CreateDonationPayload>(body) {
                Ok(payload) => handle_result(api::create_donation(ctx, caller, payload)),
                Err(e) => error_reply(&e),
            }
        },
        (&Method::Post, "/matching/create-match") => {
            match parse_json_body::<CreateMatchPayload>(body) {
                Ok(payload) => handle_result(api::create_match(ctx, caller, payload)),
                Err(e) => error_reply(&e),
            }
        },

        // GET /matching/find-matches/{id}
        (&Method::Get, _) if api_path.starts_with("/matching/find-matches/") => {
            let id = api_path.strip_prefix("/matching/find-matches/")?;
            match parse_id(id) {
                Ok(id) => handle_result(api::find_matches(ctx, caller, id)),
                Err(e) => error_reply(&e),
            }
        },

        // POST /donations/requests/{id}/cancel
        (&Method::Post, _) if api_path.starts_with("/donations/requests/") => {
            let id = api_path
                .strip_prefix("/donations/requests/")
                .and_then(|s| s.strip_suffix("/cancel"))?;
            match parse_id(id) {
                Ok(id) => handle_result(api::cancel_request(ctx, caller, id)),
                Err(e) => error_reply(&e),
            }
        },

        // POST /matching/matches/{id}/complete
        (&Method::Post, _) if api_path.starts_with("/matching/matches/") => {
            let id = api_path
                .strip_prefix("/matching/matches/")
                .and_then(|s| s.strip_suffix("/complete"))?;
            match parse_id(id) {
                Ok(id) => handle_result(api::complete_match(ctx, caller, id)),
                Err(e) => error_reply(&e),
            }
        },

        _ => return None,
    };
    Some(reply)
}

// =============================================================================
// BODY PARSING
// =============================================================================

fn parse_json_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::bad_request(format!("Invalid JSON: {e}")))
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request(format!("Invalid id: {raw}")))
}

// =============================================================================
// RESPONSE CONVERSION
// =============================================================================

/// Convert a handler result to a reply
fn handle_result<T: Serialize>(result: Result<T, ApiError>) -> Reply {
    match result {
        Ok(data) => json_reply(&ApiResponse::success(data), 200),
        Err(e) => error_reply(&e),
    }
}

fn error_reply(error: &ApiError) -> Reply {
    if error.status_code() >= 500 {
        warn!("{error}");
    }
    let response = ApiResponse::<()>::error(error.code.as_str(), &error.message);
    json_reply(&response, error.status_code())
}

fn not_found_reply(message: &str) -> Reply {
    json_reply(&ApiResponse::<()>::error("NOT_FOUND", message), 404)
}

fn json_reply<T: Serialize>(data: &T, status: u16) -> Reply {
    let body = serde_json::to_string(data).unwrap_or_else(|_| r#"{"success":false}"#.to_string());
    Reply { status, body }
}

fn into_response(reply: &Reply) -> Response<Cursor<Vec<u8>>> {
    let response =
        Response::from_data(reply.body.clone().into_bytes()).with_status_code(StatusCode(reply.status));
    match Header::from_bytes("Content-Type", "application/json") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
