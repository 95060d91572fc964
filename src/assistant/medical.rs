use super::prompts::{ANALYSIS_PROMPT, simplify_prompt};
use crate::{
    Error, Result,
    config::LlmConfig,
    image::{self, ImageKind},
    llm::{ChatCompletionRequest, ChatMessage, ContentPart, ImageDetail, LlmClient},
};
use std::{path::Path, sync::Arc};
use tracing::{debug, info};

/// The two model calls behind the page: image analysis and the
/// explain-it-simply follow-up. Each call is a single attempt.
pub struct MedicalAssistant {
    llm_client: Arc<dyn LlmClient>,
    vision_model: String,
    text_model: String,
    max_tokens: u32,
    image_detail: ImageDetail,
}

impl MedicalAssistant {
    pub fn new(llm_client: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            llm_client,
            vision_model: config.vision_model.clone(),
            text_model: config.text_model.clone(),
            max_tokens: config.max_tokens,
            image_detail: config.image_detail,
        }
    }

    /// Encodes the file at `path` and runs [`Self::analyze`] on it.
    pub async fn analyze_image(&self, path: &Path) -> Result<String> {
        let encoded = image::encode_image(path).await?;
        self.analyze(ImageKind::from_path(path), &encoded).await
    }

    pub async fn analyze(&self, kind: ImageKind, base64_image: &str) -> Result<String> {
        info!(
            "Requesting image analysis from {} ({} base64 chars)",
            self.vision_model,
            base64_image.len()
        );

        let request = ChatCompletionRequest {
            model: self.vision_model.clone(),
            messages: vec![ChatMessage::user_parts(vec![
                ContentPart::Text(ANALYSIS_PROMPT.to_string()),
                ContentPart::ImageUrl {
                    url: image::data_uri(kind, base64_image),
                    detail: self.image_detail,
                },
            ])],
            max_tokens: Some(self.max_tokens),
        };

        self.complete(request).await
    }

    pub async fn simplify(&self, analysis: &str) -> Result<String> {
        if analysis.trim().is_empty() {
            return Err(Error::InvalidTransition {
                current: "no analysis result".to_string(),
                requested: "simplify".to_string(),
            });
        }

        info!("Requesting simplified explanation from {}", self.text_model);

        let request = ChatCompletionRequest {
            model: self.text_model.clone(),
            messages: vec![ChatMessage::user_text(simplify_prompt(analysis))],
            max_tokens: Some(self.max_tokens),
        };

        self.complete(request).await
    }

    async fn complete(&self, request: ChatCompletionRequest) -> Result<String> {
        let response = self.llm_client.create_chat_completion(request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Completion {} used {} tokens ({} prompt, {} completion)",
                response.id, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response.first_text()?.to_string())
    }
}
