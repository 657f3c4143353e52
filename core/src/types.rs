//! Domain types for the cart endpoints.
//!
//! # Design
//! `Cart` and `ShippingRates` are opaque: their shape belongs to the platform
//! and the client hands them back unmodified. The input types are typed
//! requests; `CartClient` turns them into wire payloads, applying the
//! percent-encoding and omission rules there. They implement `Deserialize`
//! so callers (and the JSON test vectors) can load them from config or
//! fixtures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The platform's cart document, returned as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(pub Value);

impl Cart {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

/// Shipping rate options computed by the platform, returned as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingRates(pub Value);

impl ShippingRates {
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

/// Target quantities keyed either by 1-based line position or by line item key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineUpdates {
    ByLine(BTreeMap<u32, u32>),
    ByKey(BTreeMap<String, u32>),
}

impl LineUpdates {
    pub fn by_line(updates: impl IntoIterator<Item = (u32, u32)>) -> Self {
        LineUpdates::ByLine(updates.into_iter().collect())
    }

    pub fn by_key<K: Into<String>>(updates: impl IntoIterator<Item = (K, u32)>) -> Self {
        LineUpdates::ByKey(updates.into_iter().map(|(k, q)| (k.into(), q)).collect())
    }
}

/// Input for `cart/update.js`.
///
/// An empty or absent note and an empty attribute map are left out of the
/// request entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateCart {
    pub updates: LineUpdates,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl UpdateCart {
    pub fn new(updates: LineUpdates) -> Self {
        Self {
            updates,
            note: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Identifies one line item: by 1-based position or by line item key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineLocator {
    Line(u32),
    Key(String),
}

/// Input for `cart/change.js`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeLineItem {
    pub locator: LineLocator,
    pub quantity: u32,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub selling_plan: Option<u64>,
}

impl ChangeLineItem {
    pub fn new(locator: LineLocator, quantity: u32) -> Self {
        Self {
            locator,
            quantity,
            properties: BTreeMap::new(),
            selling_plan: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_selling_plan(mut self, selling_plan: u64) -> Self {
        self.selling_plan = Some(selling_plan);
        self
    }
}

/// One entry of the `items` array sent to `cart/add.js`. Sent as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    /// Variant id.
    pub id: u64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_plan: Option<u64>,
}

impl AddItem {
    pub fn new(id: u64, quantity: u32) -> Self {
        Self {
            id,
            quantity,
            properties: BTreeMap::new(),
            selling_plan: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_selling_plan(mut self, selling_plan: u64) -> Self {
        self.selling_plan = Some(selling_plan);
        self
    }
}
