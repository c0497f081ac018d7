use super::logging::{debug_payload_enabled, emit_debug_payload};
use super::stream::{lines_from_bytes, ByteStream, LineStream};
use crate::config::Config;
use crate::error::TransportError;
use crate::types::Message;
use crate::util::is_local_endpoint_url;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::json;
#[cfg(test)]
use std::sync::Arc;

const REQUEST_ID_HEADER: &str = "x-snowflake-request-id";
const TOKEN_TYPE_HEADER: &str = "x-snowflake-authorization-token-type";
const TOKEN_TYPE: &str = "PROGRAMMATIC_ACCESS_TOKEN";

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, messages: &[Message]) -> Result<ByteStream, TransportError>;
}

/// A successfully opened run: the server's request id and the body as lines.
pub struct AgentStream {
    pub request_id: Option<String>,
    pub lines: LineStream,
}

#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    run_url: String,
    token: Option<String>,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl AgentClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            http,
            run_url: config.run_url(),
            token: config.token.clone(),
            #[cfg(test)]
            mock_stream_producer: None,
        })
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            run_url: "http://localhost:8000/api/v2/databases/D/schemas/S/agents/A:run".to_string(),
            token: None,
            mock_stream_producer: Some(mock_producer),
        }
    }

    pub fn run_url(&self) -> &str {
        &self.run_url
    }

    /// Starts a streaming run over the whole transcript.
    ///
    /// HTTP failures (status >= 400) are returned before any line is read.
    pub async fn submit(&self, messages: &[Message]) -> Result<AgentStream, TransportError> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                let body = producer.create_mock_stream(messages)?;
                return Ok(AgentStream {
                    request_id: Some("mock-request".to_string()),
                    lines: lines_from_bytes(body),
                });
            }
        }

        let payload = json!({
            "messages": messages,
            "stream": true,
        });
        if debug_payload_enabled() {
            emit_debug_payload(&self.run_url, &payload);
        }

        let mut request = self
            .http
            .post(&self.run_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(TOKEN_TYPE_HEADER, TOKEN_TYPE)
            .json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::info!(url = %self.run_url, messages = messages.len(), "submitting agent run");
        let response = request
            .send()
            .await
            .map_err(|error| map_request_error(error, &self.run_url))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "agent run rejected");
            return Err(TransportError::Status {
                status_code: status.as_u16(),
                body,
            });
        }

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|error| TransportError::Stream(error.to_string()))),
        );

        Ok(AgentStream {
            request_id,
            lines: lines_from_bytes(body),
        })
    }
}

fn map_request_error(error: reqwest::Error, request_url: &str) -> TransportError {
    let message = if error.is_connect() && is_local_endpoint_url(request_url) {
        format!("cannot reach local agent endpoint: {error}. Start your local server or update CORTEX_AGENT_URL.")
    } else if error.is_connect() {
        format!("cannot reach agent endpoint: {error}")
    } else if error.is_timeout() {
        format!("timed out: {error}")
    } else {
        error.to_string()
    };

    TransportError::Request {
        url: request_url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client::MockAgentClient;

    #[tokio::test]
    async fn test_mock_submit_yields_framed_lines() {
        let mock = MockAgentClient::new(vec![vec![
            "event: response.status\ndata: {\"message\":\"Planning\"}".to_string(),
        ]]);
        let client = AgentClient::new_mock(Arc::new(mock.clone()));

        let stream = client
            .submit(&[Message::user("hi")])
            .await
            .expect("mock stream");
        let lines: Vec<String> = stream
            .lines
            .map(|line| line.expect("line"))
            .collect()
            .await;

        assert_eq!(
            lines,
            vec!["event: response.status", "data: {\"message\":\"Planning\"}", ""]
        );
        assert_eq!(mock.submitted(), vec![vec![Message::user("hi")]]);
    }

    #[tokio::test]
    async fn test_mock_submit_surfaces_status_failure() {
        let mock = MockAgentClient::failing(TransportError::Status {
            status_code: 503,
            body: "unavailable".to_string(),
        });
        let client = AgentClient::new_mock(Arc::new(mock));

        let result = client.submit(&[Message::user("hi")]).await;
        assert!(matches!(
            result,
            Err(TransportError::Status {
                status_code: 503,
                ..
            })
        ));
    }

    #[test]
    fn test_client_uses_configured_run_url() {
        let config = Config {
            host: Some("acme.snowflakecomputing.com".to_string()),
            database: "DB".to_string(),
            schema: "SC".to_string(),
            agent: "AG".to_string(),
            url_override: None,
            token: Some("pat".to_string()),
            request_timeout: None,
        };
        let client = AgentClient::new(&config).expect("client should build");
        assert_eq!(
            client.run_url(),
            "https://acme.snowflakecomputing.com/api/v2/databases/DB/schemas/SC/agents/AG:run"
        );
    }
}
