use crate::config::{rank_in, AppConfig, ProviderAlias, OTHER_PROVIDER};
use std::collections::HashMap;

/// Maps raw labels to canonical provider names and ranks them.
#[derive(Debug, Clone)]
pub struct ProviderTable {
    aliases: Vec<ProviderAlias>,
    priority: HashMap<String, u32>,
}

impl ProviderTable {
    pub fn new(aliases: Vec<ProviderAlias>, priority: HashMap<String, u32>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|a| ProviderAlias {
                key: a.key.trim().to_lowercase(),
                provider: a.provider,
            })
            .filter(|a| !a.key.is_empty())
            .collect();
        Self { aliases, priority }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.provider_aliases.clone(), config.provider_priority.clone())
    }

    /// First alias key contained in the trimmed, lower-cased label wins.
    /// No match gives "Other".
    pub fn resolve(&self, label: &str) -> &str {
        let label = label.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|a| label.contains(a.key.as_str()))
            .map(|a| a.provider.as_str())
            .unwrap_or(OTHER_PROVIDER)
    }

    /// Resolves the declared group, then the source name when the group names no provider.
    pub fn resolve_entry(&self, declared_group: &str, source_name: &str) -> &str {
        let label = if declared_group.trim().is_empty() {
            source_name
        } else {
            declared_group
        };
        match self.resolve(label) {
            OTHER_PROVIDER if label != source_name => self.resolve(source_name),
            provider => provider,
        }
    }

    /// Lower is better; providers without a rank share the rank of "Other"
    pub fn rank(&self, provider: &str) -> u32 {
        rank_in(&self.priority, provider)
    }
}

impl Default for ProviderTable {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
