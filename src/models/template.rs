use serde::{Deserialize, Serialize};

use super::EntryType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePrompt {
    pub question: String,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalTemplate {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", alias = "entryType")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub prompts: Vec<TemplatePrompt>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub prompts: Vec<TemplatePrompt>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<TemplatePrompt>>,
}

impl TemplatePrompt {
    /// Parse `question` or `question|placeholder`.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('|') {
            Some((question, hint)) => Self {
                question: question.trim().to_string(),
                placeholder: Some(hint.trim().to_string()).filter(|h| !h.is_empty()),
            },
            None => Self {
                question: spec.trim().to_string(),
                placeholder: None,
            },
        }
    }
}

impl JournalTemplate {
    /// Render the prompts as a markdown skeleton for a new entry.
    pub fn to_skeleton(&self) -> String {
        self.prompts
            .iter()
            .map(|p| match &p.placeholder {
                Some(hint) => format!("## {}\n\n{}\n", p.question, hint),
                None => format!("## {}\n\n", p.question),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
