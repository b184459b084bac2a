//! Chatbot rule definitions: fetching them from the API and the state used to browse them.

pub mod client;
pub mod storage;
pub mod viewer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use client::RulesClient;
pub use storage::{LocalStorage, TOKEN_KEY};
pub use viewer::RulesViewer;

/// A rule mapping user questions to a SQL template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    /// Grouping shown in the category filter.
    pub category: String,
    /// Human readable description.
    pub description: String,
    /// Phrases that trigger the rule.
    pub patterns: Vec<String>,
    /// Example question.
    pub example: String,
    /// SQL executed when the rule matches.
    pub sql_template: String,
}

impl Rule {
    /// Case-insensitive substring match over description, patterns and category.
    ///
    /// `needle` must already be lowercase.  An empty needle matches every rule.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.to_lowercase().contains(needle))
    }
}

/// Body of `GET /api/ai/rules/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesResponse {
    /// Rules for the requested category, or all of them.
    pub rules: Vec<Rule>,
    /// Every known category.
    pub categories: Vec<String>,
}

/// Anything able to list rules, optionally restricted to one category.
#[async_trait]
pub trait RulesSource {
    /// Fetches the rules.
    async fn fetch_rules(&self, category: Option<&str>) -> Result<RulesResponse>;
}
