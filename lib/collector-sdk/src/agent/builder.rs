use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::agent::buffer::Buffer;
use crate::agent::collector_agent::{AgentError, CollectorAgent};

pub struct CollectorAgentBuilder {
    endpoint: Option<String>,
    token: Option<String>,
    user_agent: Option<String>,
    buffer_size: usize,
    connect_timeout: Duration,
    request_timeout: Duration,
    accept_invalid_certs: bool,
    flush_interval: Duration,
}

impl Default for CollectorAgentBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            user_agent: None,
            buffer_size: 1000,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            accept_invalid_certs: false,
            flush_interval: Duration::from_secs(5),
        }
    }
}

fn non_empty_string(value: Option<String>) -> Option<String> {
    value.filter(|str| !str.is_empty())
}

impl CollectorAgentBuilder {
    /// The collector ingestion endpoint reports are POSTed to.
    pub fn endpoint(mut self, endpoint: String) -> Self {
        if let Some(endpoint) = non_empty_string(Some(endpoint)) {
            self.endpoint = Some(endpoint);
        }
        self
    }
    /// Access token sent as a bearer credential with every batch.
    pub fn token(mut self, token: String) -> Self {
        if let Some(token) = non_empty_string(Some(token)) {
            self.token = Some(token);
        }
        self
    }
    /// User-Agent header to be sent with each request
    pub fn user_agent(mut self, user_agent: String) -> Self {
        if let Some(user_agent) = non_empty_string(Some(user_agent)) {
            self.user_agent = Some(user_agent);
        }
        self
    }
    /// A maximum number of reports to hold in a buffer before sending to the collector
    /// Default: 1000
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
    /// A timeout for only the connect phase of a request to the collector
    /// Default: 5 seconds
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
    /// A timeout for the entire request to the collector
    /// Default: 15 seconds
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
    /// Accepts invalid SSL certificates
    /// Default: false
    pub fn accept_invalid_certs(mut self, accept_invalid_certs: bool) -> Self {
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }
    /// Frequency of flushing the buffer to the collector
    /// Default: 5 seconds
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    pub fn build(self) -> Result<CollectorAgent, AgentError> {
        let token = self.token.ok_or(AgentError::MissingToken)?;

        let mut default_headers = HeaderMap::new();
        if let Some(user_agent) = &self.user_agent {
            if let Ok(value) = HeaderValue::from_str(user_agent) {
                default_headers.insert(USER_AGENT, value);
            }
        }

        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .default_headers(default_headers)
            .build()
            .map_err(AgentError::HttpClientCreationError)?;

        Ok(CollectorAgent {
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "https://collector.invalid/errors".to_string()),
            token,
            buffer: Buffer::new(self.buffer_size),
            client,
            flush_interval: self.flush_interval,
        })
    }
}
