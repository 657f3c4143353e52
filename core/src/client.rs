//! Stateless HTTP request builder and response parser for the cart endpoints.
//!
//! # Design
//! `CartClient` holds only the platform root URL and carries no state
//! between calls. Each endpoint is split into a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming an `HttpResponse`. The
//! caller performs the round-trip, so everything here is deterministic.
//!
//! Payload rules live in this file: optional fields are omitted rather than
//! sent as `null`, and notes, attributes and line properties are
//! percent-encoded.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encode::{percent_encode, percent_encode_map};
use crate::error::CartError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AddItem, Cart, ChangeLineItem, LineLocator, LineUpdates, ShippingRates, UpdateCart};

pub const CART_PATH: &str = "cart.js";
pub const UPDATE_PATH: &str = "cart/update.js";
pub const CHANGE_PATH: &str = "cart/change.js";
pub const ADD_PATH: &str = "cart/add.js";
pub const CLEAR_PATH: &str = "cart/clear.js";
pub const PREPARE_SHIPPING_RATES_PATH: &str = "cart/prepare_shipping_rates.json";
pub const ASYNC_SHIPPING_RATES_PATH: &str = "cart/async_shipping_rates.json";

#[derive(Serialize)]
struct UpdatePayload {
    updates: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ChangePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    quantity: u32,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selling_plan: Option<u64>,
}

#[derive(Serialize)]
struct AddPayload<'a> {
    items: &'a [AddItem],
}

/// Synchronous, stateless client for the cart endpoints.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct CartClient {
    root_url: String,
}

impl CartClient {
    /// `root_url` is the platform's request root, e.g. `https://shop.test/en/`.
    /// A missing trailing slash is added; extra ones are collapsed.
    pub fn new(root_url: &str) -> Self {
        Self {
            root_url: format!("{}/", root_url.trim_end_matches('/')),
        }
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.root_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    fn post_empty(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<HttpRequest, CartError> {
        let body = serde_json::to_string(payload).map_err(|e| CartError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers: vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn build_fetch_cart(&self) -> HttpRequest {
        self.get(CART_PATH)
    }

    pub fn build_update_cart(&self, input: &UpdateCart) -> Result<HttpRequest, CartError> {
        let updates = match &input.updates {
            LineUpdates::ByLine(lines) => lines.iter().map(|(line, qty)| (line.to_string(), *qty)).collect(),
            LineUpdates::ByKey(keys) => keys.clone(),
        };
        let payload = UpdatePayload {
            updates,
            note: input.note.as_deref().filter(|note| !note.is_empty()).map(percent_encode),
            attributes: percent_encode_map(&input.attributes),
        };
        self.post_json(UPDATE_PATH, &payload)
    }

    pub fn build_change_line_item(&self, input: &ChangeLineItem) -> Result<HttpRequest, CartError> {
        let (line, id) = match &input.locator {
            LineLocator::Line(line) => (Some(*line), None),
            LineLocator::Key(key) => (None, Some(key.clone())),
        };
        let payload = ChangePayload {
            line,
            id,
            quantity: input.quantity,
            properties: percent_encode_map(&input.properties),
            selling_plan: input.selling_plan,
        };
        self.post_json(CHANGE_PATH, &payload)
    }

    pub fn build_add_to_cart(&self, items: &[AddItem]) -> Result<HttpRequest, CartError> {
        self.post_json(ADD_PATH, &AddPayload { items })
    }

    pub fn build_clear_cart(&self) -> HttpRequest {
        self.post_empty(CLEAR_PATH)
    }

    pub fn build_prepare_shipping_rates(&self) -> HttpRequest {
        self.post_empty(PREPARE_SHIPPING_RATES_PATH)
    }

    pub fn build_fetch_shipping_rates(&self) -> HttpRequest {
        self.get(ASYNC_SHIPPING_RATES_PATH)
    }

    pub fn parse_fetch_cart(&self, response: HttpResponse) -> Result<Cart, CartError> {
        parse_json(response)
    }

    pub fn parse_update_cart(&self, response: HttpResponse) -> Result<Cart, CartError> {
        parse_json(response)
    }

    pub fn parse_change_line_item(&self, response: HttpResponse) -> Result<Cart, CartError> {
        parse_json(response)
    }

    /// The add response body is discarded; only the status matters.
    pub fn parse_add_to_cart(&self, response: HttpResponse) -> Result<(), CartError> {
        check_status(&response)
    }

    /// The clear response body is discarded; only the status matters.
    pub fn parse_clear_cart(&self, response: HttpResponse) -> Result<(), CartError> {
        check_status(&response)
    }

    /// Returns the raw acknowledgement text. It is not JSON.
    pub fn parse_prepare_shipping_rates(&self, response: HttpResponse) -> Result<String, CartError> {
        check_status(&response)?;
        Ok(response.body)
    }

    pub fn parse_fetch_shipping_rates(&self, response: HttpResponse) -> Result<ShippingRates, CartError> {
        parse_json(response)
    }
}

/// Any status outside 200..=299 is a failure; the body is not consulted.
fn check_status(response: &HttpResponse) -> Result<(), CartError> {
    if response.is_success() {
        return Ok(());
    }
    Err(CartError::Status {
        status: response.status,
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, CartError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| CartError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn client() -> CartClient {
        CartClient::new("http://shop.test/")
    }

    fn body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn root_url_gets_exactly_one_trailing_slash() {
        assert_eq!(CartClient::new("http://shop.test").root_url(), "http://shop.test/");
        assert_eq!(CartClient::new("http://shop.test/en//").root_url(), "http://shop.test/en/");
        let req = CartClient::new("http://shop.test/en").build_fetch_cart();
        assert_eq!(req.url, "http://shop.test/en/cart.js");
    }

    #[test]
    fn build_fetch_cart_produces_correct_request() {
        let req = client().build_fetch_cart();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://shop.test/cart.js");
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_update_cart_by_line_without_optionals() {
        let input = UpdateCart::new(LineUpdates::by_line([(1, 2), (2, 0)]));
        let req = client().build_update_cart(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://shop.test/cart/update.js");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(body(&req), json!({"updates": {"1": 2, "2": 0}}));
    }

    #[test]
    fn build_update_cart_encodes_note() {
        let input = UpdateCart::new(LineUpdates::by_line([(1, 1)])).with_note("gift wrap");
        let req = client().build_update_cart(&input).unwrap();
        assert_eq!(body(&req)["note"], "gift%20wrap");
    }

    #[test]
    fn build_update_cart_omits_empty_note() {
        let input = UpdateCart::new(LineUpdates::by_line([(1, 1)])).with_note("");
        let req = client().build_update_cart(&input).unwrap();
        assert!(body(&req).get("note").is_none());
    }

    #[test]
    fn build_update_cart_by_key_with_attributes() {
        let input = UpdateCart::new(LineUpdates::by_key([("1001:abc", 4)]))
            .with_attribute("Delivery date", "Fri 3rd");
        let req = client().build_update_cart(&input).unwrap();
        assert_eq!(
            body(&req),
            json!({
                "updates": {"1001:abc": 4},
                "attributes": {"Delivery%20date": "Fri%203rd"}
            })
        );
    }

    #[test]
    fn build_change_line_item_by_line() {
        let input = ChangeLineItem::new(LineLocator::Line(2), 3);
        let req = client().build_change_line_item(&input).unwrap();
        assert_eq!(req.url, "http://shop.test/cart/change.js");
        assert_eq!(body(&req), json!({"line": 2, "quantity": 3}));
    }

    #[test]
    fn build_change_line_item_by_key_with_optionals() {
        let input = ChangeLineItem::new(LineLocator::Key("1001:abc".to_string()), 1)
            .with_property("Engraving", "A & B")
            .with_selling_plan(77);
        let req = client().build_change_line_item(&input).unwrap();
        assert_eq!(
            body(&req),
            json!({
                "id": "1001:abc",
                "quantity": 1,
                "properties": {"Engraving": "A%20%26%20B"},
                "selling_plan": 77
            })
        );
    }

    #[test]
    fn build_add_to_cart_wraps_items() {
        let items = [AddItem::new(1001, 1), AddItem::new(1002, 2).with_selling_plan(5)];
        let req = client().build_add_to_cart(&items).unwrap();
        assert_eq!(req.url, "http://shop.test/cart/add.js");
        assert_eq!(
            body(&req),
            json!({"items": [
                {"id": 1001, "quantity": 1},
                {"id": 1002, "quantity": 2, "selling_plan": 5}
            ]})
        );
    }

    #[test]
    fn build_bodiless_posts() {
        for (req, path) in [
            (client().build_clear_cart(), "cart/clear.js"),
            (client().build_prepare_shipping_rates(), "cart/prepare_shipping_rates.json"),
        ] {
            assert_eq!(req.method, HttpMethod::Post);
            assert_eq!(req.url, format!("http://shop.test/{path}"));
            assert!(req.body.is_none());
            assert_eq!(req.header("content-type"), None);
        }
    }

    #[test]
    fn build_fetch_shipping_rates_is_get() {
        let req = client().build_fetch_shipping_rates();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://shop.test/cart/async_shipping_rates.json");
    }

    #[test]
    fn parse_fetch_cart_success() {
        let cart = client()
            .parse_fetch_cart(response(200, r#"{"item_count":0,"items":[]}"#))
            .unwrap();
        assert_eq!(cart.as_json()["item_count"], 0);
    }

    #[test]
    fn parse_fetch_cart_bad_json() {
        let err = client().parse_fetch_cart(response(200, "<html>")).unwrap_err();
        assert!(matches!(err, CartError::Deserialization(_)));
    }

    #[test]
    fn parse_update_cart_carries_exact_status() {
        let err = client()
            .parse_update_cart(response(422, r#"{"status":422}"#))
            .unwrap_err();
        assert_eq!(err, CartError::Status { status: 422 });
    }

    #[test]
    fn parse_status_error_ignores_body() {
        let err = client().parse_change_line_item(response(500, "not json")).unwrap_err();
        assert_eq!(err, CartError::Status { status: 500 });
    }

    #[test]
    fn parse_add_and_clear_discard_body() {
        assert!(client().parse_add_to_cart(response(200, "anything")).is_ok());
        assert!(client().parse_clear_cart(response(200, "")).is_ok());
        let err = client().parse_add_to_cart(response(422, "")).unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn parse_prepare_shipping_rates_returns_text() {
        let text = client()
            .parse_prepare_shipping_rates(response(202, "null"))
            .unwrap();
        assert_eq!(text, "null");
    }

    #[test]
    fn parse_fetch_shipping_rates_success() {
        let rates = client()
            .parse_fetch_shipping_rates(response(200, r#"{"shipping_rates":[]}"#))
            .unwrap();
        assert_eq!(rates.as_json()["shipping_rates"], json!([]));
    }
}
