use crate::classifier::Category;
use std::collections::HashSet;

pub const FAVORITES_GROUP: &str = "favorites";

/// Rejects non-event content by the base label of its category.
#[derive(Debug, Clone)]
pub struct CategoryGate {
    blacklist: HashSet<String>,
}

fn norm(label: &str) -> String {
    label.trim().to_lowercase()
}

impl CategoryGate {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist = labels
            .into_iter()
            .map(|l| norm(l.as_ref()))
            .filter(|l| !l.is_empty())
            .collect();
        Self { blacklist }
    }

    /// The "Favorites" group is a provider's personal shortlist and never an event
    pub fn is_favorites(declared_group: &str) -> bool {
        norm(declared_group) == FAVORITES_GROUP
    }

    pub fn admits(&self, category: &Category) -> bool {
        !self.blacklist.contains(&norm(category.base_label()))
    }
}

impl Default for CategoryGate {
    fn default() -> Self {
        Self::new(crate::config::default_category_blacklist())
    }
}
