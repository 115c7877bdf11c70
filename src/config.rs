use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "sources.json";
pub const OTHER_PROVIDER: &str = "Other";

const MIN_TIMEOUT_SECS: u64 = 15;
const MAX_TIMEOUT_SECS: u64 = 30;

/// One remote playlist feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One row of the ordered alias table: a lower-case substring and the provider it names
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderAlias {
    pub key: String,
    pub provider: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub sources: Vec<Source>,
    pub output_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_fetches: usize,
    /// Order matters: first matching key wins
    pub provider_aliases: Vec<ProviderAlias>,
    /// Lower rank wins a duplicate URL
    pub provider_priority: HashMap<String, u32>,
    /// Order matters: first matching keyword wins
    pub sport_keywords: Vec<String>,
    /// Base labels (category text before the provider) that never make it to the output
    pub category_blacklist: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output_path: PathBuf::from("docs/live-events.m3u"),
            request_timeout_secs: 20,
            user_agent: format!("live-events/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_fetches: 4,
            provider_aliases: default_provider_aliases(),
            provider_priority: default_provider_priority(),
            sport_keywords: default_sport_keywords(),
            category_blacklist: default_category_blacklist(),
        }
    }
}

fn alias(key: &str, provider: &str) -> ProviderAlias {
    ProviderAlias {
        key: key.to_string(),
        provider: provider.to_string(),
    }
}

pub fn default_provider_aliases() -> Vec<ProviderAlias> {
    vec![
        alias("thetvapp", "TheTVApp"),
        alias("tvapp", "TheTVApp"),
        alias("tvpass", "TVPass"),
        alias("ppvland", "PPV Land"),
        alias("ppv land", "PPV Land"),
        alias("ppv", "PPV Land"),
        alias("streamedsu", "StreamedSU"),
        alias("streamed", "StreamedSU"),
        alias("moveonjoy", "MoveOnJoy"),
        // "buddylive" must be tried before its prefix "buddy"
        alias("buddylive", "BuddyLive"),
        alias("buddy", "Buddy Channels"),
        alias("daddylive", "DaddyLive"),
        alias("sportsurge", "SportSurge"),
    ]
}

pub fn default_provider_priority() -> HashMap<String, u32> {
    [
        ("PPV Land", 1),
        ("TheTVApp", 2),
        ("StreamedSU", 3),
        ("TVPass", 4),
        ("DaddyLive", 5),
        ("BuddyLive", 6),
        ("Buddy Channels", 7),
        ("SportSurge", 8),
        ("MoveOnJoy", 9),
        (OTHER_PROVIDER, 99),
    ]
    .into_iter()
    .map(|(name, rank)| (name.to_string(), rank))
    .collect()
}

pub fn default_sport_keywords() -> Vec<String> {
    [
        "NFL", "NBA", "NHL", "MLB", "NCAAF", "NCAAB", "Football", "Basketball", "Hockey",
        "Baseball", "Cricket", "Darts", "Soccer", "UFC", "MMA", "Boxing", "Wrestling",
        "Tennis", "Golf", "Rugby", "Motorsport",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_category_blacklist() -> Vec<String> {
    [
        "24/7 Movies",
        "24/7 Programs",
        "24/7 Channels",
        "24/7",
        "Radio",
        "Radio/Music",
        "Local TV",
        "MoveOnJoy+",
        "News Other",
        "Sport Outdoors",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AppConfig {
    /// Loads the configuration. An explicit path must exist; otherwise the per-user
    /// config dir and then the working directory are tried before falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        warn!("No {} found, running with built-in defaults", CONFIG_FILE_NAME);
        Ok(AppConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.normalize();
        debug!("Loaded config from {} with {} sources", path.display(), config.sources.len());
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(proj_dirs) = ProjectDirs::from("com", "live-events", "live-events") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        paths
    }

    fn normalize(&mut self) {
        self.request_timeout_secs = self.request_timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        self.max_concurrent_fetches = self.max_concurrent_fetches.max(1);
        for a in self.provider_aliases.iter_mut() {
            a.key = a.key.trim().to_lowercase();
        }
        self.provider_aliases.retain(|a| !a.key.is_empty());
    }

    /// Checks the source list. Empty names or URLs are errors, duplicate names only warn.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut seen = HashSet::new();
        for (i, source) in self.sources.iter().enumerate() {
            if source.name.trim().is_empty() {
                anyhow::bail!("source #{} has an empty name", i + 1);
            }
            if source.url.trim().is_empty() {
                anyhow::bail!("source '{}' has an empty url", source.name);
            }
            if !seen.insert(source.name.as_str()) {
                warn!("Source name '{}' is listed more than once", source.name);
            }
        }
        Ok(())
    }

    pub fn rank_of(&self, provider: &str) -> u32 {
        rank_in(&self.provider_priority, provider)
    }
}

/// Rank of a provider; unknown providers share the rank of "Other"
pub fn rank_in(priority: &HashMap<String, u32>, provider: &str) -> u32 {
    priority
        .get(provider)
        .or_else(|| priority.get(OTHER_PROVIDER))
        .copied()
        .unwrap_or(u32::MAX)
}
