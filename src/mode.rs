//! Mode-scoped configuration blocks
//!
//! A block is a discrete set of settings and activations tagged with the
//! [`BuildMode`] it belongs to. Applying a block is a pure filter: it either
//! applies in full (mode matches) or not at all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extensions::{Activation, ActivationList};
use crate::settings::{SettingValue, SettingsRegistry};
use crate::types::BuildMode;

/// Settings and activations applied together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigBlock {
    /// `(key, value)` pairs applied in order
    pub settings: Vec<(String, SettingValue)>,
    pub activations: Vec<Activation>,
}

impl ConfigBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.settings.push((key.into(), value.into()));
        self
    }

    pub fn activate(mut self, activation: Activation) -> Self {
        self.activations.push(activation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty() && self.activations.is_empty()
    }

    /// Apply unconditionally
    pub fn apply(&self, registry: &mut SettingsRegistry, activations: &mut ActivationList) {
        for (key, value) in &self.settings {
            registry.set(key.clone(), value.clone());
        }
        for activation in &self.activations {
            activations.push(activation.clone());
        }
    }
}

/// A block that only applies in one build mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeScoped {
    pub mode: BuildMode,
    #[serde(flatten)]
    pub block: ConfigBlock,
}

impl ModeScoped {
    pub fn new(mode: BuildMode, block: ConfigBlock) -> Self {
        Self { mode, block }
    }

    pub fn applies_to(&self, mode: BuildMode) -> bool {
        self.mode == mode
    }

    /// Apply the block if `mode` matches; returns whether it was applied
    pub fn apply_if(
        &self,
        mode: BuildMode,
        registry: &mut SettingsRegistry,
        activations: &mut ActivationList,
    ) -> bool {
        if !self.applies_to(mode) {
            debug!(block = %self.mode, active = %mode, "skipping mode-scoped block");
            return false;
        }
        self.block.apply(registry, activations);
        true
    }
}
