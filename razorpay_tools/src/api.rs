use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use storefront_common::{Paise, INR_CURRENCY_CODE};

use crate::{
    config::RazorpayConfig,
    data_objects::{CreateOrderRequest, RemoteOrder},
    RazorpayApiError,
};

/// Attempts made against the gateway's order creation endpoint before giving up.
///
/// The receipt id stays constant across attempts, so a retry after an ambiguous failure cannot spawn a duplicate
/// remote order.
const CREATE_ORDER_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let creds = format!("{}:{}", config.key_id, config.key_secret.reveal());
        let val = HeaderValue::from_str(&format!("Basic {}", base64::encode(creds)))
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("https://{}/v1{path}", self.config.host)
    }

    /// Create an order on the gateway and return its gateway order id.
    ///
    /// The amount is in paise. The receipt id must be unique per logical checkout; it is sent unchanged on every
    /// retry so the gateway can deduplicate. Client and server errors (4xx) are not retried.
    pub async fn create_order(&self, amount: Paise, receipt: &str) -> Result<String, RazorpayApiError> {
        let body = CreateOrderRequest {
            amount,
            currency: INR_CURRENCY_CODE.to_string(),
            receipt: receipt.to_string(),
            payment_capture: 1,
        };
        let mut last_err = RazorpayApiError::RetriesExhausted(CREATE_ORDER_ATTEMPTS);
        for attempt in 1..=CREATE_ORDER_ATTEMPTS {
            debug!("💳️ Creating gateway order for {amount} (receipt {receipt}, attempt {attempt})");
            match self.rest_query::<RemoteOrder, _>(Method::POST, "/orders", Some(&body)).await {
                Ok(order) => {
                    info!("💳️ Gateway order {} created for receipt {receipt}", order.id);
                    return Ok(order.id);
                },
                Err(e @ RazorpayApiError::QueryError { status, .. }) if status < 500 => {
                    warn!("💳️ Gateway rejected order creation for receipt {receipt}. {e}");
                    return Err(e);
                },
                Err(e) => {
                    warn!("💳️ Gateway order creation attempt {attempt} failed for receipt {receipt}. {e}");
                    last_err = e;
                },
            }
        }
        Err(last_err)
    }

    pub async fn fetch_order(&self, gateway_order_id: &str) -> Result<RemoteOrder, RazorpayApiError> {
        let path = format!("/orders/{gateway_order_id}");
        debug!("💳️ Fetching gateway order {gateway_order_id}");
        self.rest_query::<RemoteOrder, ()>(Method::GET, &path, None).await
    }
}
