// HTTP client for the mechanic-tagging service.
//
// Two endpoints: `POST /analyze` submits raw card-list text and returns the
// card -> mechanic -> tier mapping, and `GET /api/default-mechanics` returns
// the mechanics description used to prefill the editor. Error variants map
// one-to-one onto the messages shown in the banner.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::rows::AnalysisResult;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

const ACCESS_DENIED_MESSAGE: &str = "Access denied: incorrect access code.";
const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Failures talking to the analysis service. `Display` is the exact text
/// shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 403 from the analysis endpoint: the access code was rejected.
    #[error("{message}")]
    AccessDenied { message: String },

    /// Any other non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Transport failure reaching the service.
    #[error("Network error: could not reach the server.")]
    Network(#[source] reqwest::Error),

    /// The response arrived but its shape could not be rendered.
    #[error("Error rendering results: {message}")]
    Render { message: String },
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Client for the tagging service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit card-list text for analysis.
    ///
    /// Returns the parsed result together with the exact result JSON,
    /// pretty-printed for the raw view.
    pub async fn analyze(
        &self,
        card_data: &str,
        access_code: Option<&str>,
        mechanics: Option<&str>,
    ) -> Result<(AnalysisResult, String), ApiError> {
        let mut body = serde_json::json!({ "card_data": card_data });
        if let Some(code) = access_code {
            body["access_code"] = Value::String(code.to_string());
        }
        if let Some(text) = mechanics {
            body["mechanics"] = Value::String(text.to_string());
        }

        debug!("submitting {} bytes of card data", card_data.len());
        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;
        parse_analyze_response(status, &text)
    }

    /// Fetch the default mechanics description shown in the editor.
    pub async fn default_mechanics(&self) -> Result<String, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/default-mechanics", self.base_url))
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: UNEXPECTED_ERROR_MESSAGE.to_string(),
            });
        }

        let value: Value = response.json().await.map_err(|e| ApiError::Render {
            message: e.to_string(),
        })?;
        value
            .get("mechanics")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Render {
                message: "missing `mechanics` field in response".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Turn an `/analyze` response into a result or the matching error.
///
/// The server wraps successes as `{ "result": ... }` and failures as
/// `{ "error": "..." }`. The result value is usually the mapping itself but
/// may be a JSON string when the server passed raw model text through; such
/// strings are re-parsed here.
pub(crate) fn parse_analyze_response(
    status: StatusCode,
    body: &str,
) -> Result<(AnalysisResult, String), ApiError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            if status.is_success() {
                return Err(ApiError::Render {
                    message: e.to_string(),
                });
            }
            // Non-JSON error body: fall back to the generic message.
            return Err(status_error(status, None));
        }
    };

    if !status.is_success() {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(status_error(status, message));
    }

    let result = value.get("result").ok_or_else(|| ApiError::Render {
        message: "missing `result` field in response".to_string(),
    })?;

    // A string result is raw model text the server could not parse; give it
    // one more chance as JSON before reporting a render error.
    let parsed_string;
    let result = match result {
        Value::String(raw) => {
            parsed_string = serde_json::from_str::<Value>(raw).map_err(|e| ApiError::Render {
                message: e.to_string(),
            })?;
            &parsed_string
        }
        other => other,
    };

    let analysis = AnalysisResult::from_value(result)
        .map_err(|message| ApiError::Render { message })?;
    let raw_json =
        serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
    Ok((analysis, raw_json))
}

fn status_error(status: StatusCode, message: Option<String>) -> ApiError {
    if status == StatusCode::FORBIDDEN {
        ApiError::AccessDenied {
            message: message.unwrap_or_else(|| ACCESS_DENIED_MESSAGE.to_string()),
        }
    } else {
        ApiError::Server {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
