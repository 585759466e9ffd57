//! Client for the restaurant backend that persists bills.

use crate::config::{BackendSettings, RestaurantProfile};
use async_trait::async_trait;
use bill_ledger::{BillSnapshot, SubmissionError};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::error::AppError;
use service_core::http::retry_http_call;
use service_core::observability::RequestIdExt;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Per-request data forwarded to the backend.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub bearer_token: Option<String>,
    pub request_id: Option<String>,
}

/// Profile fields as served by `GET /restaurant/profile`. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<ProfileAddress>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "gst_number")]
    pub gst_number: Option<String>,
    #[serde(default, alias = "receipt_footer")]
    pub receipt_footer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, alias = "zip_code")]
    pub zip_code: String,
}

impl ProfileResponse {
    /// Overlay the fields the backend provided on top of `fallback`.
    pub fn merged_over(self, fallback: &RestaurantProfile) -> RestaurantProfile {
        let address = self.address.map(|a| {
            format!("{}, {}, {} - {}", a.street, a.city, a.state, a.zip_code)
        });

        RestaurantProfile {
            name: non_blank(self.name).unwrap_or_else(|| fallback.name.clone()),
            address: address.or_else(|| fallback.address.clone()),
            phone: non_blank(self.phone).or_else(|| fallback.phone.clone()),
            gst_number: non_blank(self.gst_number).or_else(|| fallback.gst_number.clone()),
            receipt_footer: non_blank(self.receipt_footer)
                .unwrap_or_else(|| fallback.receipt_footer.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default, alias = "bill_number", rename = "billNumber")]
    bill_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Persistence and profile collaborator used by the bill handlers.
#[async_trait]
pub trait BillingBackend: Send + Sync {
    /// Persist `snapshot`, returning the bill number the backend confirmed.
    async fn submit_bill(
        &self,
        snapshot: &BillSnapshot,
        ctx: &CallContext,
    ) -> Result<String, SubmissionError>;

    async fn restaurant_profile(
        &self,
        ctx: &CallContext,
    ) -> Result<ProfileResponse, SubmissionError>;
}

pub struct HttpBillingBackend {
    client: Client,
    settings: BackendSettings,
}

impl HttpBillingBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.url.trim_end_matches('/')
    }

    fn token<'a>(&'a self, ctx: &'a CallContext) -> Option<&'a str> {
        ctx.bearer_token.as_deref().or_else(|| {
            self.settings
                .service_token
                .as_ref()
                .map(|token| token.expose_secret().as_str())
        })
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> SubmissionError {
    error!(url = %url, error = %e, "Backend request failed");
    SubmissionError::Unreachable(e.to_string())
}

async fn rejection(response: reqwest::Response) -> SubmissionError {
    let status = response.status();
    let message = response
        .json::<BackendErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    SubmissionError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl BillingBackend for HttpBillingBackend {
    #[instrument(skip(self, snapshot, ctx), fields(bill_number = %snapshot.bill_number()))]
    async fn submit_bill(
        &self,
        snapshot: &BillSnapshot,
        ctx: &CallContext,
    ) -> Result<String, SubmissionError> {
        let url = format!("{}/bills", self.base_url());
        let token = self.token(ctx);

        let response = retry_http_call(&self.settings.retry, "submit_bill", || {
            let mut request = self
                .client
                .post(&url)
                .json(snapshot)
                .with_request_id(ctx.request_id.as_deref());
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            request.send()
        })
        .await
        .map_err(|e| transport_error(&url, e))?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            warn!(error = %err, "Backend rejected bill");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;

        // An empty 2xx body still means the bill was stored.
        let confirmed = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<SubmitResponse>(&body)
                .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?
                .bill_number
                .filter(|number| !number.trim().is_empty())
        };
        let confirmed = confirmed.unwrap_or_else(|| snapshot.bill_number().to_string());

        info!(confirmed_bill_number = %confirmed, "Bill accepted by backend");
        Ok(confirmed)
    }

    #[instrument(skip(self, ctx))]
    async fn restaurant_profile(
        &self,
        ctx: &CallContext,
    ) -> Result<ProfileResponse, SubmissionError> {
        let url = format!("{}/restaurant/profile", self.base_url());
        let token = self.token(ctx);

        let response = retry_http_call(&self.settings.retry, "restaurant_profile", || {
            let mut request = self
                .client
                .get(&url)
                .with_request_id(ctx.request_id.as_deref());
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            request.send()
        })
        .await
        .map_err(|e| transport_error(&url, e))?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        response
            .json::<ProfileResponse>()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
    }
}
