/// One incremental piece of a streamed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Response text that becomes part of the assistant message.
    Text(String),

    /// Reasoning tokens streamed ahead of the answer.  Shown, never stored.
    Reasoning(String),
}

impl Fragment {
    /// Create a text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(text.into())
    }

    /// Create a reasoning fragment.
    pub fn reasoning(text: impl Into<String>) -> Self {
        Fragment::Reasoning(text.into())
    }

    /// The raw text carried by this fragment.
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Text(text) | Fragment::Reasoning(text) => text,
        }
    }
}
