use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Model id reserved for user-authored messages.
pub const USER_MODEL_ID: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    #[default]
    Gray,
    Green,
    Blue,
    Purple,
    Orange,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: String,
    pub color: ColorTag,
    pub is_active: bool,
}

impl Model {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: ColorTag) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("at least one model must be registered")]
    Empty,
    #[error("model id '{0}' is registered twice")]
    DuplicateId(String),
    #[error("model id '{0}' is reserved")]
    ReservedId(String),
}

/// Ordered set of chat models. Order is fixed at construction and drives both
/// pane layout and reply order.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            models: vec![
                Model::new("chatgpt", "ChatGPT", ColorTag::Green),
                Model::new("claude", "Claude", ColorTag::Blue),
                Model::new("deepseek", "DeepSeek", ColorTag::Purple),
            ],
        }
    }
}

impl ModelRegistry {
    pub fn new(models: Vec<Model>) -> std::result::Result<Self, RegistryError> {
        if models.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for model in &models {
            if model.id == USER_MODEL_ID {
                return Err(RegistryError::ReservedId(model.id.clone()));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(RegistryError::DuplicateId(model.id.clone()));
            }
        }

        Ok(Self { models })
    }

    pub fn list_models(&self) -> &[Model] {
        &self.models
    }

    pub fn active_models(&self) -> Vec<&Model> {
        self.models.iter().filter(|model| model.is_active).collect()
    }

    pub fn get(&self, model_id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == model_id)
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.get(model_id).is_some()
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_active(&mut self, model_id: &str) -> Result<bool> {
        let model = self
            .models
            .iter_mut()
            .find(|model| model.id == model_id)
            .ok_or_else(|| ChatError::ModelNotFound(model_id.to_string()))?;
        model.is_active = !model.is_active;
        debug!(model = %model.id, active = model.is_active, "model toggled");
        Ok(model.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorTag, Model, ModelRegistry, RegistryError};
    use crate::error::ChatError;

    fn active_ids(registry: &ModelRegistry) -> Vec<String> {
        registry
            .active_models()
            .into_iter()
            .map(|model| model.id.clone())
            .collect()
    }

    #[test]
    fn default_registry_has_three_active_models_in_order() {
        let registry = ModelRegistry::default();
        assert_eq!(active_ids(&registry), vec!["chatgpt", "claude", "deepseek"]);
        assert_eq!(registry.get("claude").map(|m| m.color), Some(ColorTag::Blue));
    }

    #[test]
    fn toggle_twice_restores_flag_and_active_list_tracks_each_step() {
        let mut registry = ModelRegistry::default();

        assert_eq!(registry.toggle_active("claude"), Ok(false));
        assert_eq!(active_ids(&registry), vec!["chatgpt", "deepseek"]);

        assert_eq!(registry.toggle_active("claude"), Ok(true));
        assert_eq!(active_ids(&registry), vec!["chatgpt", "claude", "deepseek"]);
    }

    #[test]
    fn toggle_unknown_model_is_not_found() {
        let mut registry = ModelRegistry::default();
        let error = registry
            .toggle_active("gemini")
            .expect_err("unknown model should fail");
        assert_eq!(error, ChatError::ModelNotFound("gemini".to_string()));
        assert_eq!(registry.active_models().len(), 3);
    }

    #[test]
    fn rejects_duplicate_reserved_and_empty_lists() {
        let duplicate = ModelRegistry::new(vec![
            Model::new("a", "A", ColorTag::Red),
            Model::new("a", "Again", ColorTag::Blue),
        ]);
        assert_eq!(
            duplicate.expect_err("duplicate ids should fail"),
            RegistryError::DuplicateId("a".to_string())
        );

        let reserved = ModelRegistry::new(vec![Model::new("user", "User", ColorTag::Gray)]);
        assert_eq!(
            reserved.expect_err("reserved id should fail"),
            RegistryError::ReservedId("user".to_string())
        );

        assert_eq!(
            ModelRegistry::new(Vec::new()).expect_err("empty list should fail"),
            RegistryError::Empty
        );
    }
}
