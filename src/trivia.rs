//! Client for the external trivia question source (Open Trivia DB API).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::{catalog::Difficulty, question::RawQuestion};

/// Failures while obtaining a question set. All of them surface as `SourceUnavailable`.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The configured endpoint is not a usable URL.
    #[error("invalid question source url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("request to question source failed")]
    Transport(#[source] reqwest::Error),
    /// The source answered with a non-success HTTP status.
    #[error("question source returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// The body was not the expected JSON envelope.
    #[error("question source sent an unreadable body")]
    InvalidBody(#[source] reqwest::Error),
    /// The source reported a non-zero application response code.
    #[error("question source reported response code {0}")]
    ResponseCode(u8),
    /// Fewer or more questions than requested came back.
    #[error("expected {expected} questions, received {received}")]
    Incomplete { expected: usize, received: usize },
    /// An item could not be turned into a question.
    #[error("malformed question: {0}")]
    Decode(String),
}

/// Parameters of one question-set request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionRequest {
    pub amount: u32,
    pub category: u32,
    pub difficulty: Difficulty,
}

/// Anything that can hand out raw multiple-choice questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self, request: QuestionRequest) -> Result<Vec<RawQuestion>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<RawQuestion>,
}

/// HTTP client for an Open Trivia DB compatible endpoint.
///
/// Makes a single attempt per request: no retries, no client-side timeout.
#[derive(Clone)]
pub struct OpenTriviaClient {
    client: Client,
    base_url: Url,
}

impl OpenTriviaClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let parsed = Url::parse(base_url).map_err(|source| SourceError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            client: Client::new(),
            base_url: parsed,
        })
    }

    /// Full request URL for `request`, with base64 transport encoding.
    pub fn request_url(&self, request: QuestionRequest) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("amount", &request.amount.to_string())
            .append_pair("category", &request.category.to_string())
            .append_pair("difficulty", request.difficulty.as_str())
            .append_pair("type", "multiple")
            .append_pair("encode", "base64");
        url
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaClient {
    async fn fetch(&self, request: QuestionRequest) -> Result<Vec<RawQuestion>, SourceError> {
        let url = self.request_url(request);
        tracing::debug!(%url, "Fetching quiz questions");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SourceError::Transport)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body: TriviaResponse = response.json().await.map_err(SourceError::InvalidBody)?;
        if body.response_code != 0 {
            return Err(SourceError::ResponseCode(body.response_code));
        }

        let expected = request.amount as usize;
        if body.results.len() != expected {
            return Err(SourceError::Incomplete {
                expected,
                received: body.results.len(),
            });
        }

        Ok(body.results)
    }
}
