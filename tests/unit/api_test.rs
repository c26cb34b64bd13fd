//! Handler and routing tests over an in-memory context

use donormatch::api::{self, AppContext, CreateMatchPayload, CreateRequestPayload, ErrorCode};
use donormatch::server::tiny_http::{Reply, route};
use serde_json::{Value, json};
use tiny_http::Method;

use crate::common::fixtures::{DONOR_TOKEN, REQUESTER_TOKEN, STRANGER_TOKEN, app_context};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn call(ctx: &AppContext, method: Method, url: &str, token: Option<&str>, body: &str) -> (u16, Value) {
    let auth = token.map(bearer);
    let Reply { status, body } = route(ctx, &method, url, auth.as_deref(), body);
    (status, serde_json::from_str(&body).unwrap())
}

fn post(ctx: &AppContext, url: &str, token: &str, body: &Value) -> (u16, Value) {
    call(ctx, Method::Post, url, Some(token), &body.to_string())
}

fn get(ctx: &AppContext, url: &str, token: &str) -> (u16, Value) {
    call(ctx, Method::Get, url, Some(token), "")
}

fn offer_o_negative(ctx: &AppContext) -> u64 {
    let (status, body) = post(
        ctx,
        "/api/donations/offers",
        DONOR_TOKEN,
        &json!({ "type": "blood", "bloodType": "O-", "quantity": "2", "unit": "units", "urgency": "high" }),
    );
    assert_eq!(status, 200, "{body}");
    body["data"]["id"].as_u64().unwrap()
}

fn request_a_positive(ctx: &AppContext) -> u64 {
    let (status, body) = post(
        ctx,
        "/api/donations/requests",
        REQUESTER_TOKEN,
        &json!({
            "type": "blood",
            "bloodType": "A+",
            "quantity": 2,
            "urgency": "high",
            "medicalJustification": "post-operative bleeding"
        }),
    );
    assert_eq!(status, 200, "{body}");
    body["data"]["id"].as_u64().unwrap()
}

// =============================================================================
// Full flow
// =============================================================================

#[test]
fn test_offer_request_match_complete_flow() {
    let ctx = app_context();
    let donation_id = offer_o_negative(&ctx);
    let request_id = request_a_positive(&ctx);

    let (status, body) = get(&ctx, &format!("/api/matching/find-matches/{request_id}"), REQUESTER_TOKEN);
    assert_eq!(status, 200, "{body}");
    let candidates = body["data"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    let candidate = &candidates[0];
    assert_eq!(candidate["donationId"], donation_id);
    assert_eq!(candidate["compatibilityScore"], 80);
    assert_eq!(candidate["band"], "strong");
    assert_eq!(candidate["donor"]["name"], "Dan Donor");
    assert_eq!(candidate["donor"]["location"], "Grenoble");
    assert_eq!(candidate["donor"]["phone"], "+33 4 00 00 00 00");
    let distance = candidate["distance"].as_f64().unwrap();
    assert!((80.0..110.0).contains(&distance), "Lyon to Grenoble was {distance} km");

    let (status, body) = post(
        &ctx,
        "/api/matching/create-match",
        REQUESTER_TOKEN,
        &json!({
            "donationId": donation_id,
            "requestId": request_id,
            "compatibilityScore": 80,
            "distance": distance
        }),
    );
    assert_eq!(status, 200, "{body}");
    let match_id = body["data"]["id"].as_u64().unwrap();
    assert_eq!(body["data"]["status"], "active");

    let (_, body) = get(&ctx, "/api/donations/my-requests", REQUESTER_TOKEN);
    assert_eq!(body["data"][0]["status"], "fulfilled");
    let (_, body) = get(&ctx, "/api/donations/my-offers", DONOR_TOKEN);
    assert_eq!(body["data"][0]["status"], "reserved");

    for token in [DONOR_TOKEN, REQUESTER_TOKEN] {
        let (_, body) = get(&ctx, "/api/matching/my-matches", token);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }
    let (_, body) = get(&ctx, "/api/matching/my-matches", STRANGER_TOKEN);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) =
        post(&ctx, &format!("/api/matching/matches/{match_id}/complete"), DONOR_TOKEN, &json!({}));
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["status"], "completed");
    let (_, body) = get(&ctx, "/api/donations/my-offers", DONOR_TOKEN);
    assert_eq!(body["data"][0]["status"], "consumed");
}

#[test]
fn test_second_match_on_same_donation_is_conflict() {
    let ctx = app_context();
    let donation_id = offer_o_negative(&ctx);
    let first = request_a_positive(&ctx);
    let second = request_a_positive(&ctx);
    let payload = |request_id: u64| {
        json!({ "donationId": donation_id, "requestId": request_id, "compatibilityScore": 80, "distance": 1.5 })
    };

    let (status, _) = post(&ctx, "/api/matching/create-match", REQUESTER_TOKEN, &payload(first));
    assert_eq!(status, 200);
    let (status, body) = post(&ctx, "/api/matching/create-match", REQUESTER_TOKEN, &payload(second));
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[test]
fn test_only_parties_can_create_a_match() {
    let ctx = app_context();
    let donation_id = offer_o_negative(&ctx);
    let request_id = request_a_positive(&ctx);
    let payload = json!({ "donationId": donation_id, "requestId": request_id, "compatibilityScore": 80, "distance": 1.5 });

    let (status, body) = post(&ctx, "/api/matching/create-match", STRANGER_TOKEN, &payload);
    assert_eq!(status, 403, "{body}");
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    let (_, body) = get(&ctx, "/api/donations/my-offers", DONOR_TOKEN);
    assert_eq!(body["data"][0]["status"], "available");

    let (status, body) = post(&ctx, "/api/matching/create-match", DONOR_TOKEN, &payload);
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["status"], "active");
}

#[test]
fn test_only_the_requester_can_find_matches() {
    let ctx = app_context();
    offer_o_negative(&ctx);
    let request_id = request_a_positive(&ctx);
    let url = format!("/api/matching/find-matches/{request_id}");

    for token in [STRANGER_TOKEN, DONOR_TOKEN] {
        let (status, body) = get(&ctx, &url, token);
        assert_eq!(status, 403, "{body}");
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
    assert_eq!(get(&ctx, &url, REQUESTER_TOKEN).0, 200);
}

#[test]
fn test_cancel_then_find_is_invalid_state() {
    let ctx = app_context();
    let request_id = request_a_positive(&ctx);

    let (status, _) =
        post(&ctx, &format!("/api/donations/requests/{request_id}/cancel"), STRANGER_TOKEN, &json!({}));
    assert_eq!(status, 403);

    let (status, body) =
        post(&ctx, &format!("/api/donations/requests/{request_id}/cancel"), REQUESTER_TOKEN, &json!({}));
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = get(&ctx, &format!("/api/matching/find-matches/{request_id}"), REQUESTER_TOKEN);
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[test]
fn test_lists_are_newest_first() {
    let ctx = app_context();
    let first = request_a_positive(&ctx);
    let second = request_a_positive(&ctx);

    let (_, body) = get(&ctx, "/api/donations/my-requests", REQUESTER_TOKEN);
    let ids: Vec<u64> = body["data"].as_array().unwrap().iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![second, first]);

    let (_, body) = get(&ctx, "/api/donations/my-requests", DONOR_TOKEN);
    assert!(body["data"].as_array().unwrap().is_empty());
}

// =============================================================================
// Routing and auth
// =============================================================================

#[test]
fn test_missing_token_is_unauthorized() {
    let ctx = app_context();
    let (status, body) = call(&ctx, Method::Get, "/api/donations/my-requests", None, "");
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[test]
fn test_unknown_token_is_unauthorized() {
    let ctx = app_context();
    let (status, _) = get(&ctx, "/api/donations/my-requests", "token-nobody");
    assert_eq!(status, 401);
}

#[test]
fn test_versioned_prefix_and_query_string_are_accepted() {
    let ctx = app_context();
    let (status, body) = get(&ctx, "/api/v1/donations/my-offers?page=1", DONOR_TOKEN);
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[test]
fn test_unknown_routes_are_not_found() {
    let ctx = app_context();
    assert_eq!(get(&ctx, "/api/donations/everything", DONOR_TOKEN).0, 404);
    assert_eq!(get(&ctx, "/health", DONOR_TOKEN).0, 404);
    assert_eq!(call(&ctx, Method::Delete, "/api/donations/my-offers", Some(DONOR_TOKEN), "").0, 404);
}

#[test]
fn test_invalid_json_is_bad_request() {
    let ctx = app_context();
    let (status, body) = call(&ctx, Method::Post, "/api/donations/offers", Some(DONOR_TOKEN), "{not json");
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[test]
fn test_non_numeric_id_is_bad_request() {
    let ctx = app_context();
    let (status, _) = get(&ctx, "/api/matching/find-matches/abc", REQUESTER_TOKEN);
    assert_eq!(status, 400);
}

#[test]
fn test_unknown_request_is_not_found() {
    let ctx = app_context();
    let (status, body) = get(&ctx, "/api/matching/find-matches/404", REQUESTER_TOKEN);
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_request_without_justification_is_rejected() {
    let ctx = app_context();
    let (status, body) = post(
        &ctx,
        "/api/donations/requests",
        REQUESTER_TOKEN,
        &json!({ "type": "organ", "organType": "kidney", "medicalJustification": "   " }),
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[test]
fn test_unknown_blood_type_names_the_field() {
    let ctx = app_context();
    let payload = CreateRequestPayload {
        kind: Some("blood".to_string()),
        blood_type: Some("C+".to_string()),
        medical_justification: Some("anemia".to_string()),
        ..CreateRequestPayload::default()
    };
    let caller = ctx.caller("rita").unwrap();

    let err = api::create_request(&ctx, &caller, payload).unwrap_err();

    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.message.starts_with("bloodType"), "{}", err.message);
}

#[test]
fn test_offer_without_location_needs_profile_location() {
    let ctx = app_context();
    let (status, body) = post(
        &ctx,
        "/api/donations/offers",
        STRANGER_TOKEN,
        &json!({ "type": "tissue", "organType": "skin" }),
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = post(
        &ctx,
        "/api/donations/offers",
        STRANGER_TOKEN,
        &json!({ "type": "tissue", "organType": "skin", "location": "Annecy" }),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["location"], "Annecy");
}

#[test]
fn test_score_out_of_range_is_invalid_argument() {
    let ctx = app_context();
    let donation_id = offer_o_negative(&ctx);
    let request_id = request_a_positive(&ctx);

    let caller = ctx.caller("rita").unwrap();

    let err = api::create_match(
        &ctx,
        &caller,
        CreateMatchPayload {
            donation_id,
            request_id,
            compatibility_score: 150,
            distance: 1.0,
        },
    )
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(err.status_code(), 400);
}
