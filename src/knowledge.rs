//! Smart-contract knowledge base for the chat assistant.
//!
//! The knowledge base is a JSON object mapping contract names to their
//! documentation. It is loaded once at startup and rendered into a single
//! prompt context string.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Context used when no knowledge base could be loaded.
pub const EMPTY_CONTEXT: &str = "No contract knowledge base available.";

/// Documentation for one contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractEntry {
    pub description: String,
    #[serde(default)]
    pub key_features: Option<Map<String, Value>>,
    #[serde(default)]
    pub functions: Option<Map<String, Value>>,
    #[serde(default)]
    pub events: Option<Map<String, Value>>,
    #[serde(default)]
    pub use_cases: Option<Vec<String>>,
    #[serde(default)]
    pub workflow: Option<Map<String, Value>>,
    #[serde(default)]
    pub participant_lifecycle: Option<Map<String, Value>>,
}

/// Contracts in file order.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    contracts: Vec<(String, ContractEntry)>,
}

impl KnowledgeBase {
    /// Parse a knowledge base document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Map<String, Value> =
            serde_json::from_str(json).context("Knowledge base must be a JSON object")?;

        let contracts = raw
            .into_iter()
            .map(|(name, value)| {
                let entry: ContractEntry = serde_json::from_value(value)
                    .with_context(|| format!("Invalid knowledge base entry: {}", name))?;
                Ok((name, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { contracts })
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse knowledge base: {}", path.display()))
    }

    /// Load from a file, falling back to an empty knowledge base.
    ///
    /// A missing file is not fatal; the chat endpoint still works with
    /// limited context.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(kb) => {
                if kb.is_empty() {
                    warn!("Knowledge base {} has no contracts", path.display());
                } else {
                    info!("Loaded {} contracts from {}", kb.len(), path.display());
                }
                kb
            }
            Err(e) => {
                warn!("{:#}. Chatbot functionality will be limited.", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Render every contract into the prompt context.
    pub fn format_context(&self) -> String {
        if self.contracts.is_empty() {
            return EMPTY_CONTEXT.to_string();
        }

        self.contracts
            .iter()
            .map(|(name, entry)| format_contract(name, entry))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn format_contract(name: &str, entry: &ContractEntry) -> String {
    let mut section = vec![format!("📘 {}: {}", name, entry.description)];

    if let Some(ref features) = entry.key_features {
        section.push("\nKey Features:".to_string());
        for (feature, desc) in features {
            section.push(format!("- {}: {}", humanize(feature), value_text(desc)));
        }
    }

    if let Some(ref functions) = entry.functions {
        section.push("\nFunctions:".to_string());
        for (func, desc) in functions {
            section.push(format!("- {}(): {}", func, value_text(desc)));
        }
    }

    if let Some(ref events) = entry.events {
        section.push("\nEvents:".to_string());
        for (event, desc) in events {
            section.push(format!("- {}: {}", event, value_text(desc)));
        }
    }

    if let Some(ref use_cases) = entry.use_cases {
        section.push(format!("\nUse Cases: {}", use_cases.join(", ")));
    }

    if let Some(ref workflow) = entry.workflow {
        section.push("\nWorkflow:".to_string());
        for (step, desc) in workflow {
            section.push(format!("- {}: {}", humanize(step), value_text(desc)));
        }
    }

    if let Some(ref lifecycle) = entry.participant_lifecycle {
        section.push("\nParticipant Lifecycle:".to_string());
        for (stage, desc) in lifecycle {
            section.push(format!("- {}: {}", title_case(stage), value_text(desc)));
        }
    }

    section.join("\n")
}

/// `snake_case_key` -> `Snake Case Key`.
fn humanize(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Strings render bare; anything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
