//! In-memory storefront serving the platform's cart endpoints.
//!
//! One shared cart backed by a fixed variant catalog. Line positions are
//! 1-based. Free-text fields (note, attributes, properties) are stored exactly
//! as received.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::warn;
use uuid::Uuid;

/// (variant id, title, price in minor units)
pub const CATALOG: &[(u64, &str, u64)] = &[
    (1001, "Linen Shirt", 4500),
    (1002, "Canvas Tote", 2500),
    (1003, "Wool Socks", 1200),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub key: String,
    pub id: u64,
    pub variant_id: u64,
    pub title: String,
    pub quantity: u32,
    pub price: u64,
    pub line_price: u64,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub selling_plan: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub token: String,
    pub note: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub item_count: u32,
    pub total_price: u64,
    pub currency: String,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Default)]
pub struct CartState {
    token: String,
    note: Option<String>,
    attributes: BTreeMap<String, String>,
    lines: Vec<LineItem>,
    shipping_rates_prepared: bool,
}

impl CartState {
    fn new() -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            ..Self::default()
        }
    }

    fn snapshot(&self) -> Cart {
        let items: Vec<LineItem> = self
            .lines
            .iter()
            .map(|line| LineItem {
                line_price: line.price * u64::from(line.quantity),
                ..line.clone()
            })
            .collect();
        Cart {
            token: self.token.clone(),
            note: self.note.clone(),
            attributes: self.attributes.clone(),
            item_count: items.iter().fold(0, |acc: u32, l| acc.saturating_add(l.quantity)),
            total_price: items.iter().fold(0, |acc: u64, l| acc.saturating_add(l.line_price)),
            currency: "USD".to_string(),
            items,
        }
    }

    /// Numeric keys inside the line range are positions; anything else is a line key.
    fn resolve(&self, key: &str) -> Option<usize> {
        if let Ok(position) = key.parse::<usize>() {
            if (1..=self.lines.len()).contains(&position) {
                return Some(position - 1);
            }
        }
        self.lines.iter().position(|line| line.key == key)
    }

    fn remove_empty_lines(&mut self) {
        self.lines.retain(|line| line.quantity > 0);
    }
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub updates: BTreeMap<String, u32>,
    pub note: Option<String>,
    pub attributes: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
pub struct ChangeRequest {
    pub line: Option<u32>,
    pub id: Option<String>,
    pub quantity: u32,
    pub properties: Option<BTreeMap<String, String>>,
    pub selling_plan: Option<u64>,
}

#[derive(Deserialize)]
pub struct AddRequest {
    pub items: Vec<AddLine>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct AddLine {
    pub id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    pub selling_plan: Option<u64>,
}

pub type Db = Arc<RwLock<CartState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(CartState::new()));
    Router::new()
        .route("/cart.js", get(get_cart))
        .route("/cart/update.js", post(update_cart))
        .route("/cart/change.js", post(change_cart))
        .route("/cart/add.js", post(add_to_cart))
        .route("/cart/clear.js", post(clear_cart))
        .route("/cart/prepare_shipping_rates.json", post(prepare_shipping_rates))
        .route("/cart/async_shipping_rates.json", get(async_shipping_rates))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reject(status: StatusCode, description: impl Into<String>) -> Response {
    let description = description.into();
    warn!(status = status.as_u16(), %description, "rejecting cart request");
    let body = json!({
        "status": status.as_u16(),
        "message": "Cart Error",
        "description": description,
    });
    (status, Json(body)).into_response()
}

async fn get_cart(State(db): State<Db>) -> Json<Cart> {
    Json(db.read().await.snapshot())
}

async fn update_cart(State(db): State<Db>, Json(input): Json<UpdateRequest>) -> Response {
    let mut cart = db.write().await;
    let mut resolved = Vec::with_capacity(input.updates.len());
    for (key, quantity) in &input.updates {
        match cart.resolve(key) {
            Some(index) => resolved.push((index, *quantity)),
            None => return reject(StatusCode::BAD_REQUEST, format!("no line matches {key}")),
        }
    }
    for (index, quantity) in resolved {
        cart.lines[index].quantity = quantity;
    }
    cart.remove_empty_lines();
    if let Some(note) = input.note {
        cart.note = Some(note);
    }
    if let Some(attributes) = input.attributes {
        cart.attributes.extend(attributes);
    }
    Json(cart.snapshot()).into_response()
}

async fn change_cart(State(db): State<Db>, Json(input): Json<ChangeRequest>) -> Response {
    let mut cart = db.write().await;
    let index = match (input.line, input.id.as_deref()) {
        (Some(line), _) => {
            let line = line as usize;
            (1..=cart.lines.len()).contains(&line).then(|| line - 1)
        }
        (None, Some(key)) => cart.lines.iter().position(|l| l.key == key),
        (None, None) => {
            return reject(StatusCode::BAD_REQUEST, "no valid id or line parameter");
        }
    };
    let Some(index) = index else {
        return reject(StatusCode::BAD_REQUEST, "no valid id or line parameter");
    };
    let line = &mut cart.lines[index];
    line.quantity = input.quantity;
    if let Some(properties) = input.properties {
        line.properties = properties;
    }
    if input.selling_plan.is_some() {
        line.selling_plan = input.selling_plan;
    }
    cart.remove_empty_lines();
    Json(cart.snapshot()).into_response()
}

async fn add_to_cart(State(db): State<Db>, Json(input): Json<AddRequest>) -> Response {
    if let Some(unknown) = input
        .items
        .iter()
        .find(|item| !CATALOG.iter().any(|(id, _, _)| *id == item.id))
    {
        return reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("variant {} cannot be found", unknown.id),
        );
    }

    let mut cart = db.write().await;
    // Applied to a copy so a rejected item leaves the cart untouched.
    let mut lines = cart.lines.clone();
    let mut added = Vec::with_capacity(input.items.len());
    for item in input.items {
        let existing = lines.iter().position(|line| {
            line.variant_id == item.id
                && line.properties == item.properties
                && line.selling_plan == item.selling_plan
        });
        let index = match existing {
            Some(index) => {
                let Some(quantity) = lines[index].quantity.checked_add(item.quantity) else {
                    return reject(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("quantity for variant {} exceeds the maximum", item.id),
                    );
                };
                lines[index].quantity = quantity;
                index
            }
            None => {
                let Some((_, title, price)) = CATALOG.iter().find(|(id, _, _)| *id == item.id) else {
                    continue;
                };
                lines.push(LineItem {
                    key: format!("{}:{}", item.id, Uuid::new_v4().simple()),
                    id: item.id,
                    variant_id: item.id,
                    title: title.to_string(),
                    quantity: item.quantity,
                    price: *price,
                    line_price: 0,
                    properties: item.properties,
                    selling_plan: item.selling_plan,
                });
                lines.len() - 1
            }
        };
        let line = &lines[index];
        added.push(LineItem {
            line_price: line.price * u64::from(line.quantity),
            ..line.clone()
        });
    }
    cart.lines = lines;
    Json(json!({ "items": added })).into_response()
}

async fn clear_cart(State(db): State<Db>) -> Json<Cart> {
    let mut cart = db.write().await;
    cart.lines.clear();
    cart.shipping_rates_prepared = false;
    Json(cart.snapshot())
}

async fn prepare_shipping_rates(State(db): State<Db>) -> Response {
    let mut cart = db.write().await;
    if cart.lines.is_empty() {
        return reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "this cart does not have requires_shipping line items",
        );
    }
    cart.shipping_rates_prepared = true;
    (StatusCode::ACCEPTED, "null").into_response()
}

async fn async_shipping_rates(State(db): State<Db>) -> Response {
    let cart = db.read().await;
    if !cart.shipping_rates_prepared {
        return (StatusCode::ACCEPTED, Json(Value::Null)).into_response();
    }
    let subtotal = cart.snapshot().total_price;
    let standard = if subtotal >= 10000 { "0.00" } else { "5.00" };
    Json(json!({
        "shipping_rates": [
            {"name": "Standard", "code": "standard", "price": standard},
            {"name": "Express", "code": "express", "price": "15.00"},
        ]
    }))
    .into_response()
}
