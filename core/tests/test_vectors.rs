//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Bodies are compared as parsed JSON
//! so field order does not matter.

use serde_json::Value;
use storefront_cart::{AddItem, CartClient, CartError, ChangeLineItem, HttpMethod, HttpRequest, HttpResponse, UpdateCart};

const ROOT_URL: &str = "http://localhost:3000";

fn client() -> CartClient {
    CartClient::new(ROOT_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{ROOT_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, expected["body"], "{name}: body");
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn expected_status(case: &Value) -> Option<u16> {
    case.get("expected_error")
        .map(|e| e["status"].as_u64().unwrap() as u16)
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let input: UpdateCart = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_cart(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_update_cart(simulated_response(&case));
        match expected_status(&case) {
            Some(status) => assert_eq!(result.unwrap_err(), CartError::Status { status }, "{name}: error"),
            None => assert_eq!(result.unwrap().into_json(), case["expected_result"], "{name}: parsed result"),
        }
    }
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

#[test]
fn change_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/change.json")) {
        let name = case["name"].as_str().unwrap();
        let input: ChangeLineItem = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_change_line_item(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_change_line_item(simulated_response(&case));
        match expected_status(&case) {
            Some(status) => assert_eq!(result.unwrap_err(), CartError::Status { status }, "{name}: error"),
            None => assert_eq!(result.unwrap().into_json(), case["expected_result"], "{name}: parsed result"),
        }
    }
}

// ---------------------------------------------------------------------------
// Add
// ---------------------------------------------------------------------------

#[test]
fn add_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/add.json")) {
        let name = case["name"].as_str().unwrap();
        let items: Vec<AddItem> = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_add_to_cart(&items).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_add_to_cart(simulated_response(&case));
        match expected_status(&case) {
            Some(status) => assert_eq!(result.unwrap_err(), CartError::Status { status }, "{name}: error"),
            None => assert!(result.is_ok(), "{name}: expected success"),
        }
    }
}
