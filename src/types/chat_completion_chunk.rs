use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Fragment;

/// One `data:` payload of a streamed chat completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    /// Generation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The model that actually served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Incremental choices; normally exactly one.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Set when the provider fails after the stream has started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StreamError>,
}

/// One choice within a [`ChatCompletionChunk`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Index of the choice.
    #[serde(default)]
    pub index: u32,

    /// What changed since the previous chunk.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Why generation stopped, present on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// The incremental content of a [`ChunkChoice`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkDelta {
    /// Role, sent on the first chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Response text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reasoning text from reasoning-capable models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Error object embedded in a stream chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamError {
    /// Numeric status or string code; providers use both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<serde_json::Value>,

    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
}

impl StreamError {
    /// Convert into the crate error type.
    pub fn into_error(self) -> Error {
        match self.code {
            Some(serde_json::Value::Number(n)) => {
                let status = n
                    .as_u64()
                    .and_then(|n| u16::try_from(n).ok())
                    .unwrap_or(500);
                Error::api(status, None, self.message, None)
            }
            Some(serde_json::Value::String(code)) => {
                Error::api(500, Some(code), self.message, None)
            }
            _ => Error::api(500, None, self.message, None),
        }
    }
}

impl ChatCompletionChunk {
    /// Split the chunk into display fragments.
    ///
    /// Reasoning precedes text within a choice.  Empty strings are dropped.  A chunk carrying an
    /// error object yields that error instead.
    pub fn into_fragments(self) -> Result<Vec<Fragment>> {
        if let Some(error) = self.error {
            return Err(error.into_error());
        }
        let mut fragments = Vec::new();
        for choice in self.choices {
            if let Some(reasoning) = choice.delta.reasoning
                && !reasoning.is_empty()
            {
                fragments.push(Fragment::Reasoning(reasoning));
            }
            if let Some(content) = choice.delta.content
                && !content.is_empty()
            {
                fragments.push(Fragment::Text(content));
            }
        }
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_chunk() {
        let json = r#"{"id":"gen-1","model":"openai/gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":"Hi"},"finish_reason":null}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.id.as_deref(), Some("gen-1"));
        assert_eq!(chunk.into_fragments().unwrap(), vec![Fragment::text("Hi")]);
    }

    #[test]
    fn reasoning_then_content() {
        let json = r#"{"choices":[{"delta":{"reasoning":"think","content":"answer"}}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(json).unwrap();
        assert_eq!(
            chunk.into_fragments().unwrap(),
            vec![Fragment::reasoning("think"), Fragment::text("answer")]
        );
    }

    #[test]
    fn empty_delta_yields_nothing() {
        let json = r#"{"choices":[{"delta":{"content":""},"finish_reason":"stop"}]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.into_fragments().unwrap().is_empty());
    }

    #[test]
    fn error_chunk_with_numeric_code() {
        let json = r#"{"error":{"code":502,"message":"Provider returned error"},"choices":[]}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(json).unwrap();
        let err = chunk.into_fragments().unwrap_err();
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().contains("Provider returned error"));
    }

    #[test]
    fn error_chunk_with_string_code() {
        let json = r#"{"error":{"code":"server_error","message":"overloaded"}}"#;
        let chunk: ChatCompletionChunk = serde_json::from_str(json).unwrap();
        let err = chunk.into_fragments().unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert!(err.to_string().contains("server_error"));
    }
}
