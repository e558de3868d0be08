use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::{Error, Result, Stage};

/// Longest server error body quoted back in an error message.
const MAX_ERROR_BODY: usize = 200;

/// JSON-over-HTTP access to one server endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Validation(format!("invalid server URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Validation(format!(
                "invalid server URL {:?}: not a base URL",
                base_url.as_str()
            )));
        }
        Ok(Self { http, base_url })
    }

    /// `base_url` with the given path segments appended.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        segments: &[&str],
    ) -> Result<T> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::communication(stage, e))?;

        decode(stage, response).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        segments: &[&str],
        body: &Value,
    ) -> Result<T> {
        let url = self.endpoint(segments);
        debug!("POST {} {}", url, body);

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::communication(stage, e))?;

        decode(stage, response).await
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

async fn decode<T: DeserializeOwned>(stage: Stage, response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::communication(stage, e))?;

    if !status.is_success() {
        return Err(Error::protocol(
            stage,
            format!("server returned {status}: {}", error_reason(&body)),
        ));
    }

    serde_json::from_slice(&body)
        .map_err(|e| Error::protocol(stage, format!("could not decode response body: {e}")))
}

/// Pull the most useful message out of an error body. The server reports
/// either `{"error": {"reason": ...}}` or, on older versions, a plain
/// `{"error": "..."}` string.
fn error_reason(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("error") {
            Some(Value::String(reason)) => return reason.clone(),
            Some(error) => {
                if let Some(reason) = error.get("reason").and_then(Value::as_str) {
                    return reason.to_string();
                }
            }
            None => {}
        }
    }

    let text = String::from_utf8_lossy(body);
    let mut end = text.len().min(MAX_ERROR_BODY);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
