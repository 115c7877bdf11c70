use crate::catalog::{Catalog, Offer};
use crate::classifier::Classifier;
use crate::config::{AppConfig, Source};
use crate::errors::{AggregateError, FeedError};
use crate::fetch::FeedClient;
use crate::gate::CategoryGate;
use crate::parser::parse_entries;
use crate::playlist;
use crate::provider::ProviderTable;
use crate::sports::SportMatcher;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counters for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub entries_parsed: usize,
    pub favorites_dropped: usize,
    pub blacklisted: usize,
    pub duplicates_discarded: usize,
    pub duplicates_replaced: usize,
    pub surviving: usize,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            sources_ok: 0,
            sources_failed: 0,
            entries_parsed: 0,
            favorites_dropped: 0,
            blacklisted: 0,
            duplicates_discarded: 0,
            duplicates_replaced: 0,
            surviving: 0,
        }
    }
}

impl RunSummary {
    pub fn sources_total(&self) -> usize {
        self.sources_ok + self.sources_failed
    }

    pub fn to_message(&self) -> String {
        let elapsed = (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0;
        format!(
            "{} channels from {}/{} sources in {:.1}s (parsed {}, favorites {}, blacklisted {}, duplicates {} dropped / {} replaced)",
            self.surviving,
            self.sources_ok,
            self.sources_total(),
            elapsed,
            self.entries_parsed,
            self.favorites_dropped,
            self.blacklisted,
            self.duplicates_discarded,
            self.duplicates_replaced,
        )
    }
}

/// Single writer over the run state. Feeds are applied one at a time in the order given.
pub struct Aggregator {
    providers: ProviderTable,
    classifier: Classifier,
    gate: CategoryGate,
    catalog: Catalog,
    summary: RunSummary,
}

impl Aggregator {
    pub fn new(providers: ProviderTable, classifier: Classifier, gate: CategoryGate) -> Self {
        Self {
            providers,
            classifier,
            gate,
            catalog: Catalog::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ProviderTable::from_config(config),
            Classifier::new(SportMatcher::new(&config.sport_keywords)),
            CategoryGate::new(&config.category_blacklist),
        )
    }

    /// Parses one fetched feed and merges its entries into the catalog
    pub fn ingest_feed(&mut self, source: &Source, text: &str) {
        self.summary.sources_ok += 1;
        let before = self.summary.clone();

        for entry in parse_entries(text, &source.name) {
            self.summary.entries_parsed += 1;

            if CategoryGate::is_favorites(&entry.declared_group) {
                self.summary.favorites_dropped += 1;
                continue;
            }

            let group = entry.declared_group.trim();
            let provider = self.providers.resolve_entry(group, &source.name);
            let category = self.classifier.classify(group, provider);

            if !self.gate.admits(&category) {
                self.summary.blacklisted += 1;
                continue;
            }

            let providers = &self.providers;
            match self.catalog.offer(
                &entry.stream_url,
                category,
                provider,
                &entry.metadata_line,
                |p| providers.rank(p),
            ) {
                Offer::Inserted => {}
                Offer::Replaced { previous } => {
                    self.summary.duplicates_replaced += 1;
                    debug!(
                        "{} moved from '{}' ({}) to {}",
                        entry.stream_url, previous.category, previous.provider, provider
                    );
                }
                Offer::Discarded { .. } => self.summary.duplicates_discarded += 1,
            }
        }

        let parsed = self.summary.entries_parsed - before.entries_parsed;
        if parsed == 0 {
            warn!("Source '{}' returned no playlist entries", source.name);
        } else {
            info!(
                "Source '{}': {} entries, {} favorites, {} blacklisted, {} duplicates",
                source.name,
                parsed,
                self.summary.favorites_dropped - before.favorites_dropped,
                self.summary.blacklisted - before.blacklisted,
                (self.summary.duplicates_discarded + self.summary.duplicates_replaced)
                    - (before.duplicates_discarded + before.duplicates_replaced),
            );
        }
    }

    /// A source that could not be fetched is skipped
    pub fn record_failure(&mut self, source: &Source, error: &FeedError) {
        self.summary.sources_failed += 1;
        warn!(
            "Skipping source '{}' ({}): {}. {}",
            source.name,
            source.url,
            error,
            error.suggestion()
        );
    }

    pub fn apply(&mut self, source: &Source, result: Result<String, FeedError>) {
        match result {
            Ok(text) => self.ingest_feed(source, &text),
            Err(e) => self.record_failure(source, &e),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Ends the run. An empty catalog is an error: publishing it would hide a systemic failure.
    pub fn finish(mut self) -> Result<(Catalog, RunSummary), AggregateError> {
        self.summary.surviving = self.catalog.len();
        if self.catalog.is_empty() {
            return Err(AggregateError::EmptyResult {
                sources_total: self.summary.sources_total(),
                sources_failed: self.summary.sources_failed,
            });
        }
        info!("{}", self.summary.to_message());
        Ok((self.catalog, self.summary))
    }
}

/// Consumes fetch results in order and returns the finished catalog
pub async fn run<'a, S>(config: &AppConfig, feeds: S) -> Result<(Catalog, RunSummary), AggregateError>
where
    S: Stream<Item = (&'a Source, Result<String, FeedError>)>,
{
    let mut aggregator = Aggregator::from_config(config);
    futures::pin_mut!(feeds);
    while let Some((source, result)) = feeds.next().await {
        aggregator.apply(source, result);
    }
    aggregator.finish()
}

/// Fetches every configured source, aggregates, and writes the playlist unless `dry_run`.
/// Nothing is written when the run fails.
pub async fn run_and_write(
    config: &AppConfig,
    output: &Path,
    dry_run: bool,
) -> Result<RunSummary, anyhow::Error> {
    if config.sources.is_empty() {
        warn!("No sources configured");
    }
    let client = FeedClient::new(config)?;
    let (catalog, summary) = run(config, client.fetch_all(&config.sources)).await?;

    if dry_run {
        info!("Dry run, not writing {}", output.display());
    } else {
        playlist::write_playlist(output, &catalog)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THETVAPP: &str = r#"#EXTM3U
#EXTINF:-1 group-title="NBA",Lakers @ Celtics
http://cdn/1
#EXTINF:-1 group-title="Favorites",Pinned
http://cdn/2
#EXTINF:-1 group-title="24/7 Movies",Movie Loop
http://cdn/3
"#;

    #[test]
    fn test_ingest_counts() {
        let mut aggregator = Aggregator::from_config(&AppConfig::default());
        aggregator.ingest_feed(&Source::new("TheTVApp", "http://feed"), THETVAPP);

        let summary = aggregator.summary();
        assert_eq!(summary.sources_ok, 1);
        assert_eq!(summary.entries_parsed, 3);
        assert_eq!(summary.favorites_dropped, 1);
        assert_eq!(summary.blacklisted, 1);

        let (catalog, summary) = aggregator.finish().unwrap();
        assert_eq!(summary.surviving, 1);
        assert_eq!(catalog.category_of("http://cdn/1").unwrap().as_str(), "NBA | TheTVApp");
    }

    #[test]
    fn test_finish_empty_is_error() {
        let mut aggregator = Aggregator::from_config(&AppConfig::default());
        aggregator.record_failure(&Source::new("A", "http://a"), &FeedError::ServerError("A".to_string(), 404));
        assert_eq!(aggregator.summary().sources_failed, 1);
        aggregator.ingest_feed(&Source::new("B", "http://b"), "not a playlist");

        match aggregator.finish() {
            Err(AggregateError::EmptyResult { sources_total, sources_failed }) => {
                assert_eq!(sources_total, 2);
                assert_eq!(sources_failed, 1);
            }
            other => panic!("expected EmptyResult, got {:?}", other.map(|(_, s)| s)),
        }
    }

    #[test]
    fn test_summary_message() {
        let summary = RunSummary {
            sources_ok: 2,
            sources_failed: 1,
            surviving: 10,
            ..Default::default()
        };
        let msg = summary.to_message();
        assert!(msg.starts_with("10 channels from 2/3 sources"));
    }
}
