// Public modules
pub mod chat_completion_chunk;
pub mod chat_completion_request;
pub mod fragment;
pub mod message;
pub mod model;

// Re-exports
pub use chat_completion_chunk::{ChatCompletionChunk, ChunkChoice, ChunkDelta, StreamError};
pub use chat_completion_request::ChatCompletionRequest;
pub use fragment::Fragment;
pub use message::{Message, MessageRole};
pub use model::{DEFAULT_MODEL, KNOWN_MODELS, is_model_id, short_name};
