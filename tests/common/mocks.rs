use async_trait::async_trait;
use medscan_rust::{
    Error, Result,
    llm::{ChatCompletionRequest, ChatCompletionResponse, Choice, LlmClient},
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock LLM client for testing.
///
/// Replies are consumed in order; every request is recorded.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    pub responses: Mutex<VecDeque<Result<ChatCompletionResponse>>>,
    pub requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, content: &str) -> Self {
        self.add_response(create_mock_chat_response(content));
        self
    }

    pub fn with_error(self, error: &str) -> Self {
        self.add_error(error);
        self
    }

    pub fn add_response(&self, response: ChatCompletionResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn add_error(&self, error: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::service(error)));
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::service("No more mock responses available")))
    }
}

pub fn create_mock_chat_response(content: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "test-id".to_string(),
        model: "test-model".to_string(),
        choices: vec![Choice {
            index: 0,
            content: Some(content.to_string()),
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

pub fn create_empty_chat_response() -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "test-id".to_string(),
        model: "test-model".to_string(),
        choices: vec![],
        usage: None,
    }
}
