//! Accumulated output of a run: category buckets plus the URL index that keeps
//! every stream URL in at most one bucket.

use crate::classifier::Category;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// Entry currently retained for a stream URL
#[derive(Debug, Clone, PartialEq)]
pub struct Retained {
    pub provider: String,
    pub category: Category,
}

/// What happened to an offered entry
#[derive(Debug, Clone, PartialEq)]
pub enum Offer {
    Inserted,
    /// The URL moved here from a lower-priority provider
    Replaced { previous: Retained },
    /// The URL is already held by an equal or better provider
    Discarded { holder: Retained },
}

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    // stream url -> metadata line, in insertion order
    buckets: BTreeMap<Category, IndexMap<String, String>>,
    url_index: HashMap<String, Retained>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps one entry per URL, preferring the lower `rank`. Ties keep the first one seen.
    pub fn offer<F>(
        &mut self,
        stream_url: &str,
        category: Category,
        provider: &str,
        metadata_line: &str,
        rank: F,
    ) -> Offer
    where
        F: Fn(&str) -> u32,
    {
        let outcome = match self.url_index.get(stream_url).cloned() {
            None => Offer::Inserted,
            Some(previous) if rank(provider) < rank(&previous.provider) => {
                self.remove_from_bucket(&previous.category, stream_url);
                Offer::Replaced { previous }
            }
            Some(holder) => return Offer::Discarded { holder },
        };

        self.buckets
            .entry(category.clone())
            .or_default()
            .insert(stream_url.to_string(), metadata_line.to_string());
        self.url_index.insert(
            stream_url.to_string(),
            Retained {
                provider: provider.to_string(),
                category,
            },
        );
        outcome
    }

    fn remove_from_bucket(&mut self, category: &Category, stream_url: &str) {
        if let Some(bucket) = self.buckets.get_mut(category) {
            bucket.shift_remove(stream_url);
            if bucket.is_empty() {
                self.buckets.remove(category);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.url_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.url_index.is_empty()
    }

    pub fn retained(&self, stream_url: &str) -> Option<&Retained> {
        self.url_index.get(stream_url)
    }

    pub fn category_of(&self, stream_url: &str) -> Option<&Category> {
        self.retained(stream_url).map(|r| &r.category)
    }

    /// Categories in ascending string order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.buckets.keys()
    }

    /// Buckets in output order; each maps stream url to metadata line in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Category, &IndexMap<String, String>)> {
        self.buckets.iter()
    }
}
