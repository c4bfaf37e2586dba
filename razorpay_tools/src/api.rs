use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{GatewayErrorBody, GatewayErrorDetail, NewOrder, RazorpayOrder},
    RazorpayApiError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can open a payment order with the gateway. No state is kept locally; the order id is handed to the
/// client, which completes the charge directly with the gateway.
#[allow(async_fn_in_trait)]
pub trait OrderIssuer {
    async fn create_order(&self, order: NewOrder) -> Result<RazorpayOrder, RazorpayApiError>;
}

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        if !self.config.is_configured() {
            return Err(RazorpayApiError::NotConfigured);
        }
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req =
            self.client.request(method, url).basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| RazorpayApiError::RestResponseError(e.to_string()))?;
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            serde_json::from_str::<T>(&text).map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let detail = serde_json::from_str::<GatewayErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| GatewayErrorDetail { description: text.clone(), ..Default::default() });
            warn!(
                "💳️ Gateway returned {status}. code: {}, source: {:?}, step: {:?}, reason: {:?}",
                detail.code, detail.source, detail.step, detail.reason
            );
            Err(RazorpayApiError::QueryError {
                status: status.as_u16(),
                code: detail.code,
                description: detail.description,
            })
        }
    }
}

impl OrderIssuer for RazorpayApi {
    async fn create_order(&self, order: NewOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        info!("💳️ Creating order for {} (minor units) {}. Receipt: {}", order.amount, order.currency, order.receipt);
        let result = self.rest_query::<RazorpayOrder, NewOrder>(Method::POST, "/orders", Some(order)).await?;
        info!("💳️ Order {} created", result.id);
        Ok(result)
    }
}
