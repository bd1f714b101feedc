use serde::Serialize;

use crate::types::Message;

/// Body of a `POST chat/completions` request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// Model identifier, e.g. `openai/gpt-4o`.
    pub model: String,

    /// The full conversation to send, oldest first.
    pub messages: Vec<Message>,

    /// Whether to stream the response as server-sent events.
    pub stream: bool,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// Create a new streaming request.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let request = ChatCompletionRequest::new("openai/gpt-4o", vec![Message::user("Hello")])
            .with_temperature(Some(0.5));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "openai/gpt-4o",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": true,
                "temperature": 0.5,
            })
        );
    }

    #[test]
    fn temperature_omitted_when_unset() {
        let request = ChatCompletionRequest::new("openai/gpt-4o", vec![]);
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("temperature"));
    }
}
