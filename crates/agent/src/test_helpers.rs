//! Shared fakes for assistant tests.

use async_trait::async_trait;
use cityguide_core::error::{ProviderError, StoreError, WeatherError};
use cityguide_core::knowledge::{RecordMetadata, RetrievalHit, Retriever};
use cityguide_core::message::{Message, MessageToolCall};
use cityguide_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use cityguide_tools::{DailyForecast, WeatherProvider};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        Ok(responses[count].clone())
    }
}

/// A provider whose every call fails.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    make_tool_call_response(Vec::new(), text)
}

/// Create a response with tool calls and optional content.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, content: &str) -> ProviderResponse {
    let mut msg = Message::assistant(content);
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{}", name),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// Returns the first `k` of a fixed hit list, whatever the query.
pub struct FixedRetriever {
    hits: Vec<RetrievalHit>,
}

impl FixedRetriever {
    pub fn new(hits: Vec<RetrievalHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}

/// A Downtown record with the given name, category and price level.
pub fn hit(name: &str, category: &str, price_level: &str) -> RetrievalHit {
    RetrievalHit {
        id: name.to_lowercase().replace(' ', "-"),
        text: format!("{name} description"),
        metadata: RecordMetadata {
            name: name.into(),
            category: category.into(),
            neighborhood: "Downtown".into(),
            transit: "Line 1".into(),
            price_level: price_level.into(),
            duration_hours: "2".into(),
            highlights: format!("{name} highlights"),
            tips: "Go early".into(),
            ..Default::default()
        },
        distance: 0.1,
    }
}

pub struct FixedWeather(pub DailyForecast);

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn today(&self) -> Result<DailyForecast, WeatherError> {
        Ok(self.0)
    }
}

pub struct FailingWeather;

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn today(&self) -> Result<DailyForecast, WeatherError> {
        Err(WeatherError::Status(503))
    }
}
