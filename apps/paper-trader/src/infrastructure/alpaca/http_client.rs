//! HTTP client wrapper for the trading and market data APIs.
//!
//! Every request is sent exactly once. Rate limits and server errors are
//! returned to the caller, who decides whether to try again.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::AlpacaConfig;
use super::error::AlpacaError;

/// Query parameters as key/value pairs.
pub type Query<'a> = [(&'a str, String)];

/// Which Alpaca API a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Api {
    Trading,
    Data,
}

/// HTTP client for the Alpaca APIs.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    trading_base_url: String,
    data_base_url: String,
}

impl AlpacaHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if !config.has_credentials() {
            return Err(AlpacaError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            trading_base_url: config.trading_base_url().to_string(),
            data_base_url: config.data_base_url().to_string(),
        })
    }

    /// GET from the trading API.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<T, AlpacaError> {
        self.request(Method::GET, Api::Trading, path, query, None::<&()>)
            .await
    }

    /// POST a JSON body to the trading API.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.request(Method::POST, Api::Trading, path, &[], Some(body))
            .await
    }

    /// DELETE on the trading API, returning the decoded body.
    ///
    /// An empty body decodes as JSON `null`, so `T` may be an `Option`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.request(Method::DELETE, Api::Trading, path, &[], None::<&()>)
            .await
    }

    /// GET from the market data API.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.request(Method::GET, Api::Data, path, query, None::<&()>)
            .await
    }

    /// Send one request. Nothing is retried; failures surface at once.
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        api: Api,
        path: &str,
        query: &Query<'_>,
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let base_url = match api {
            Api::Trading => &self.trading_base_url,
            Api::Data => &self.data_base_url,
        };
        let url = format!("{base_url}{path}");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        tracing::debug!(method = %method, path = %path, "Alpaca request");

        let response = request
            .send()
            .await
            .map_err(|e| AlpacaError::Network(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| AlpacaError::Network(e.to_string()))?;
            let text = if text.trim().is_empty() { "null" } else { text.as_str() };
            return serde_json::from_str(text).map_err(|e| AlpacaError::JsonParse(e.to_string()));
        }

        // Handle error response
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let error_body = response.text().await.unwrap_or_default();

        let (error_code, error_message) =
            match serde_json::from_str::<AlpacaErrorResponse>(&error_body) {
                Ok(err) => (
                    err.code
                        .map_or_else(|| status.as_u16().to_string(), |c| c.to_string()),
                    err.message,
                ),
                Err(_) => (status.as_u16().to_string(), error_body),
            };

        tracing::debug!(
            status = status.as_u16(),
            code = %error_code,
            error = %error_message,
            "Alpaca request failed"
        );
        Err(status_error(status, path, error_code, error_message, retry_after))
    }
}

/// Map a failed response onto an `AlpacaError`.
fn status_error(
    status: StatusCode,
    path: &str,
    code: String,
    message: String,
    retry_after: Option<u64>,
) -> AlpacaError {
    match status {
        StatusCode::UNAUTHORIZED => AlpacaError::AuthenticationFailed,
        StatusCode::NOT_FOUND => AlpacaError::NotFound {
            resource: path.to_string(),
        },
        StatusCode::FORBIDDEN | StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::Rejected(message),
        StatusCode::TOO_MANY_REQUESTS => AlpacaError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        _ => AlpacaError::Api { code, message },
    }
}
