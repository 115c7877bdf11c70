//! Category assignment.
//!
//! A category is `"{label} | {provider}"` or one of a few fixed override strings.
//! Classification walks an ordered rule table and takes the first rule that
//! produces a category; the last rule always does.

use crate::sports::SportMatcher;
use serde::{Deserialize, Serialize};

pub const SEPARATOR: &str = " | ";
const DEFAULT_LABEL: &str = "Events";
const EVENT_ALIASES: [&str; 3] = ["event", "events", "live events"];

/// Final display bucket of an entry. Compared and ordered as the exact string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn compose(label: &str, provider: &str) -> Self {
        Self(format!("{label}{SEPARATOR}{provider}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the last separator, i.e. the category minus its provider suffix
    pub fn base_label(&self) -> &str {
        match self.0.rsplit_once(SEPARATOR) {
            Some((base, _)) => base,
            None => &self.0,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rule of the classification table
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A provider's group (compared trimmed, lower-cased) maps to a fixed category
    /// before sport detection gets a chance to absorb it
    ProviderGroup {
        provider: String,
        group: String,
        category: String,
    },
    /// A provider's sport bucket gets a fixed name
    ProviderSport {
        provider: String,
        sport: String,
        category: String,
    },
    /// `"{Sport} | {Provider}"` when a sport keyword matched
    Sport,
    /// `"{Label} | {Provider}"`, always matches
    Label,
}

struct Subject<'a> {
    group: &'a str,
    group_lower: String,
    provider: &'a str,
    sport: Option<&'a str>,
}

impl Rule {
    fn apply(&self, subject: &Subject<'_>) -> Option<Category> {
        match self {
            Rule::ProviderGroup { provider, group, category } => {
                (subject.provider == provider.as_str() && subject.group_lower == *group)
                    .then(|| Category::new(category.as_str()))
            }
            Rule::ProviderSport { provider, sport, category } => {
                (subject.provider == provider.as_str() && subject.sport == Some(sport.as_str()))
                    .then(|| Category::new(category.as_str()))
            }
            Rule::Sport => subject.sport.map(|sport| Category::compose(sport, subject.provider)),
            Rule::Label => Some(Category::compose(&normalize_label(subject.group), subject.provider)),
        }
    }
}

fn normalize_label(group: &str) -> String {
    if group.is_empty() || EVENT_ALIASES.contains(&group.to_lowercase().as_str()) {
        DEFAULT_LABEL.to_string()
    } else {
        group.to_string()
    }
}

pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::ProviderGroup {
            provider: "StreamedSU".to_string(),
            group: "other".to_string(),
            category: "Other | StreamedSU".to_string(),
        },
        Rule::ProviderSport {
            provider: "PPV Land".to_string(),
            sport: "Football".to_string(),
            category: "Global Football Streams | PPV Land".to_string(),
        },
        Rule::Sport,
        Rule::Label,
    ]
}

#[derive(Debug, Clone)]
pub struct Classifier {
    sports: SportMatcher,
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(sports: SportMatcher) -> Self {
        Self::with_rules(sports, default_rules())
    }

    /// A table without a trailing `Rule::Label` still classifies: the label rule is appended.
    pub fn with_rules(sports: SportMatcher, mut rules: Vec<Rule>) -> Self {
        if rules.last() != Some(&Rule::Label) {
            rules.push(Rule::Label);
        }
        Self { sports, rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Pure: the same group and provider always give the same category
    pub fn classify(&self, declared_group: &str, provider: &str) -> Category {
        let group = declared_group.trim();
        let subject = Subject {
            group,
            group_lower: group.to_lowercase(),
            provider,
            sport: self.sports.detect(group),
        };
        self.rules
            .iter()
            .find_map(|rule| rule.apply(&subject))
            .unwrap_or_else(|| Category::compose(&normalize_label(group), provider))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(SportMatcher::default())
    }
}
