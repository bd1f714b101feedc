//! Model identifiers offered by the `/model` menu.

/// Model used when neither `--model` nor `DEFAULT_MODEL` is given.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";

/// Popular OpenRouter models, in menu order.
pub const KNOWN_MODELS: &[&str] = &[
    "anthropic/claude-3.5-sonnet",
    "anthropic/claude-3-haiku",
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "openai/o1-preview",
    "openai/o1-mini",
    "openai/gpt-3.5-turbo",
    "meta-llama/llama-3.1-8b-instruct:free",
    "microsoft/wizardlm-2-8x22b",
    "google/gemini-pro-1.5",
    "mistralai/mistral-7b-instruct:free",
    "deepseek/deepseek-r1:free",
    "google/gemma-3n-e4b-it:free",
];

/// Returns true if `model` looks like an OpenRouter `vendor/name` identifier.
pub fn is_model_id(model: &str) -> bool {
    match model.split_once('/') {
        Some((vendor, name)) => {
            !vendor.is_empty() && !name.is_empty() && !model.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// The part of a model identifier after the vendor prefix.
pub fn short_name(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_known() {
        assert!(KNOWN_MODELS.contains(&DEFAULT_MODEL));
    }

    #[test]
    fn known_models_are_ids() {
        for model in KNOWN_MODELS {
            assert!(is_model_id(model), "{model}");
        }
    }

    #[test]
    fn model_id_shape() {
        assert!(is_model_id("openai/gpt-4o"));
        assert!(!is_model_id("gpt-4o"));
        assert!(!is_model_id("/gpt-4o"));
        assert!(!is_model_id("openai/"));
        assert!(!is_model_id("openai/gpt 4o"));
    }

    #[test]
    fn short_names() {
        assert_eq!(short_name("deepseek/deepseek-r1:free"), "deepseek-r1:free");
        assert_eq!(short_name("local-model"), "local-model");
    }
}
