use serde::{Deserialize, Serialize};

use crate::config::defaults::default_enable_tools;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_enable_tools")]
    pub enable_tools: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            enable_tools: default_enable_tools(),
        }
    }
}
