use serde::{Deserialize, Serialize};

pub const DEFAULT_VISION_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_MAX_TOKENS: u64 = 1300;

pub const IMAGE_DATA_URL_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentBlock {
    pub fn is_text(&self) -> bool {
        matches!(self, ContentBlock::Text { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u64,
}

impl ChatCompletionRequest {
    pub fn image_count(&self) -> usize {
        self.messages
            .iter()
            .flat_map(|message| message.content.iter())
            .filter(|block| !block.is_text())
            .count()
    }
}

pub fn image_data_url(encoded: &str) -> String {
    format!("data:{IMAGE_DATA_URL_MIME};base64,{encoded}")
}

pub fn build_request(
    model: &str,
    max_tokens: u64,
    prompt: &str,
    encoded_images: &[String],
) -> ChatCompletionRequest {
    let mut content = Vec::with_capacity(encoded_images.len() + 1);
    content.push(ContentBlock::Text {
        text: prompt.to_string(),
    });
    content.extend(encoded_images.iter().map(|encoded| ContentBlock::ImageUrl {
        image_url: ImageUrl {
            url: image_data_url(encoded),
        },
    }));

    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content,
        }],
        max_tokens,
    }
}
