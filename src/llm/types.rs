use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    ImageUrlArgs,
};
use serde::{Deserialize, Serialize};

/// How closely the vision model should look at an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Auto,
    Low,
    #[default]
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    ImageUrl { url: String, detail: ImageDetail },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single `user` turn; both model calls are one-shot user prompts.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub content: MessageContent,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Choice {
    pub index: u32,
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl MessageContent {
    /// Concatenated text of all text parts; images are skipped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn image_urls(&self) -> Vec<&str> {
        match self {
            Self::Text(_) => Vec::new(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::ImageUrl { url, .. } => Some(url.as_str()),
                    ContentPart::Text(_) => None,
                })
                .collect(),
        }
    }
}

impl ChatMessage {
    pub fn user(content: MessageContent) -> Self {
        Self { content }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(MessageContent::Text(text.into()))
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::user(MessageContent::Parts(parts))
    }

    pub fn to_openai_message(&self) -> Result<ChatCompletionRequestMessage, crate::Error> {
        let content = match &self.content {
            MessageContent::Text(text) => ChatCompletionRequestUserMessageContent::Text(text.clone()),
            MessageContent::Parts(parts) => ChatCompletionRequestUserMessageContent::Array(
                parts
                    .iter()
                    .map(ContentPart::to_openai_part)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| crate::Error::service(format!("Failed to build user message: {}", e)))?;
        Ok(msg.into())
    }
}

impl ContentPart {
    fn to_openai_part(&self) -> Result<ChatCompletionRequestUserMessageContentPart, crate::Error> {
        let part: ChatCompletionRequestUserMessageContentPart = match self {
            Self::Text(text) => ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(text.clone())
                .build()?
                .into(),
            Self::ImageUrl { url, detail } => {
                let image_url = ImageUrlArgs::default()
                    .url(url.clone())
                    .detail(detail.to_openai())
                    .build()?;
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(image_url)
                    .build()?
                    .into()
            }
        };
        Ok(part)
    }
}

impl ImageDetail {
    fn to_openai(self) -> async_openai::types::ImageDetail {
        match self {
            Self::Auto => async_openai::types::ImageDetail::Auto,
            Self::Low => async_openai::types::ImageDetail::Low,
            Self::High => async_openai::types::ImageDetail::High,
        }
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice, or a service error when the reply has none.
    pub fn first_text(&self) -> crate::Result<&str> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| crate::Error::service("Response contained no choices"))?;

        choice.content.as_deref().ok_or_else(|| {
            crate::Error::service(format!("Choice {} has no text content", choice.index))
        })
    }
}
