//! Async cart operations over a `Transport`.
//!
//! Each operation builds its request with `CartClient`, executes it, and
//! parses the response. Failures are logged with the operation name and
//! returned unchanged; nothing is retried. `add_to_cart` and `clear_cart`
//! follow a successful write with a fresh `fetch_cart`.

use tracing::{debug, error};

use crate::client::CartClient;
use crate::error::CartError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{AddItem, Cart, ChangeLineItem, ShippingRates, UpdateCart};

#[derive(Debug, Clone)]
pub struct CartApi<T> {
    client: CartClient,
    transport: T,
}

impl<T: Transport> CartApi<T> {
    pub fn new(root_url: &str, transport: T) -> Self {
        Self {
            client: CartClient::new(root_url),
            transport,
        }
    }

    pub fn client(&self) -> &CartClient {
        &self.client
    }

    pub async fn fetch_cart(&self) -> Result<Cart, CartError> {
        let result = self.round_trip("fetch_cart", Ok(self.client.build_fetch_cart())).await;
        report("fetch_cart", result.and_then(|r| self.client.parse_fetch_cart(r)))
    }

    pub async fn update_cart(&self, input: &UpdateCart) -> Result<Cart, CartError> {
        let result = self.round_trip("update_cart", self.client.build_update_cart(input)).await;
        report("update_cart", result.and_then(|r| self.client.parse_update_cart(r)))
    }

    pub async fn change_line_item(&self, input: &ChangeLineItem) -> Result<Cart, CartError> {
        let result = self.round_trip("change_line_item", self.client.build_change_line_item(input)).await;
        report("change_line_item", result.and_then(|r| self.client.parse_change_line_item(r)))
    }

    /// Adds `items`, then returns the cart as re-fetched afterwards.
    pub async fn add_to_cart(&self, items: &[AddItem]) -> Result<Cart, CartError> {
        let result = self.round_trip("add_to_cart", self.client.build_add_to_cart(items)).await;
        report("add_to_cart", result.and_then(|r| self.client.parse_add_to_cart(r)))?;
        self.fetch_cart().await
    }

    /// Empties the cart, then returns the cart as re-fetched afterwards.
    pub async fn clear_cart(&self) -> Result<Cart, CartError> {
        let result = self.round_trip("clear_cart", Ok(self.client.build_clear_cart())).await;
        report("clear_cart", result.and_then(|r| self.client.parse_clear_cart(r)))?;
        self.fetch_cart().await
    }

    /// Starts the platform's shipping-rate computation. Returns its raw text
    /// acknowledgement; poll `fetch_shipping_rates` for the result.
    pub async fn prepare_shipping_rates(&self) -> Result<String, CartError> {
        let result = self
            .round_trip("prepare_shipping_rates", Ok(self.client.build_prepare_shipping_rates()))
            .await;
        report(
            "prepare_shipping_rates",
            result.and_then(|r| self.client.parse_prepare_shipping_rates(r)),
        )
    }

    pub async fn fetch_shipping_rates(&self) -> Result<ShippingRates, CartError> {
        let result = self
            .round_trip("fetch_shipping_rates", Ok(self.client.build_fetch_shipping_rates()))
            .await;
        report(
            "fetch_shipping_rates",
            result.and_then(|r| self.client.parse_fetch_shipping_rates(r)),
        )
    }

    /// A build failure short-circuits here so it is reported like any other.
    async fn round_trip(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, CartError>,
    ) -> Result<HttpResponse, CartError> {
        let request = request?;
        debug!(operation, method = request.method.as_str(), url = %request.url, "sending cart request");
        let response = self.transport.execute(request).await?;
        debug!(
            operation,
            status = response.status,
            content_type = response.header("content-type").unwrap_or_default(),
            "cart response received"
        );
        Ok(response)
    }
}

fn report<V>(operation: &'static str, result: Result<V, CartError>) -> Result<V, CartError> {
    result.inspect_err(|e| error!(operation, error = %e, "cart operation failed"))
}
