use futures::stream;
use live_events_lib::aggregator::{self, Aggregator};
use live_events_lib::config::{AppConfig, Source};
use live_events_lib::errors::{AggregateError, FeedError};
use live_events_lib::playlist::render;
use std::collections::HashMap;

fn extinf(group: &str, name: &str) -> String {
    format!("#EXTINF:-1 tvg-id=\"\" group-title=\"{}\",{}", group, name)
}

fn feed(entries: &[(&str, &str, &str)]) -> String {
    let mut text = String::from("#EXTM3U\n");
    for (group, name, url) in entries {
        text.push_str(&extinf(group, name));
        text.push('\n');
        text.push_str(url);
        text.push('\n');
    }
    text
}

#[tokio::test]
async fn test_priority_wins_in_any_order() {
    let config = AppConfig::default();
    let a = Source::new("Sports Mix", "http://a");
    let b = Source::new("PPV Land", "http://b");
    let feed_a = feed(&[("Sports", "Match", "http://x/1")]);
    let feed_b = feed(&[("Football", "Match", "http://x/1")]);

    for order in [[(&a, &feed_a), (&b, &feed_b)], [(&b, &feed_b), (&a, &feed_a)]] {
        let feeds = stream::iter(order.iter().map(|(s, f)| (*s, Ok::<_, FeedError>(f.to_string()))));
        let (catalog, _) = aggregator::run(&config, feeds).await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.category_of("http://x/1").unwrap().as_str(),
            "Global Football Streams | PPV Land"
        );
        let playlist = render(&catalog);
        assert_eq!(playlist.matches("http://x/1").count(), 1);
    }
}

#[test]
fn test_equal_priority_keeps_first_seen() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    aggregator.ingest_feed(&Source::new("Feed One", "http://1"), &feed(&[("NHL", "Game", "http://x/9")]));
    aggregator.ingest_feed(&Source::new("Feed Two", "http://2"), &feed(&[("Hockey", "Game", "http://x/9")]));

    let (catalog, summary) = aggregator.finish().unwrap();
    assert_eq!(catalog.category_of("http://x/9").unwrap().as_str(), "NHL | Other");
    assert_eq!(summary.duplicates_discarded, 1);
    assert_eq!(summary.duplicates_replaced, 0);
}

#[test]
fn test_no_url_in_two_categories() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    let sources = [
        ("Random", feed(&[("Soccer", "a", "http://u/1"), ("NBA", "b", "http://u/2")])),
        ("TheTVApp", feed(&[("Basketball", "b", "http://u/2"), ("Soccer", "c", "http://u/3")])),
        ("PPV Land", feed(&[("Football", "a", "http://u/1"), ("UFC", "c", "http://u/3")])),
        ("Random 2", feed(&[("Events", "d", "http://u/1"), ("Events", "e", "http://u/4")])),
    ];
    for (name, text) in &sources {
        aggregator.ingest_feed(&Source::new(*name, "http://feed"), text);
    }
    let (catalog, _) = aggregator.finish().unwrap();
    let playlist = render(&catalog);

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for line in playlist.lines().filter(|l| l.starts_with("http")) {
        *seen.entry(line).or_default() += 1;
    }
    assert_eq!(seen.len(), 4);
    assert!(seen.values().all(|count| *count == 1));

    assert_eq!(catalog.category_of("http://u/1").unwrap().as_str(), "Global Football Streams | PPV Land");
    assert_eq!(catalog.category_of("http://u/2").unwrap().as_str(), "Basketball | TheTVApp");
    assert_eq!(catalog.category_of("http://u/3").unwrap().as_str(), "UFC | PPV Land");
    assert_eq!(catalog.category_of("http://u/4").unwrap().as_str(), "Events | Other");
}

#[test]
fn test_blacklist_uses_base_label() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    aggregator.ingest_feed(
        &Source::new("TheTVApp", "http://feed"),
        &feed(&[
            ("Radio", "Talk", "http://r/1"),
            ("24/7 Programs", "Loop", "http://r/2"),
            ("Sport Outdoors", "Fishing", "http://r/3"),
            ("Soccer", "Derby", "http://r/4"),
        ]),
    );
    let (catalog, summary) = aggregator.finish().unwrap();

    assert_eq!(summary.blacklisted, 3);
    assert_eq!(catalog.len(), 1);
    let playlist = render(&catalog);
    assert!(!playlist.contains("Radio"));
    assert!(!playlist.contains("24/7"));
    assert!(playlist.contains("group-title=\"Soccer | TheTVApp\""));
}

#[test]
fn test_favorites_never_survive() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    aggregator.ingest_feed(
        &Source::new("PPV Land", "http://feed"),
        &feed(&[("favorites", "Fav", "http://f/1"), ("FAVORITES", "Fav 2", "http://f/2"), ("NFL", "Game", "http://f/3")]),
    );
    let (catalog, summary) = aggregator.finish().unwrap();

    assert_eq!(summary.favorites_dropped, 2);
    assert!(catalog.category_of("http://f/1").is_none());
    assert!(catalog.category_of("http://f/2").is_none());
    assert_eq!(catalog.category_of("http://f/3").unwrap().as_str(), "NFL | PPV Land");
}

#[test]
fn test_streamed_other_stays_other() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    aggregator.ingest_feed(
        &Source::new("StreamedSU", "http://feed"),
        &feed(&[("Other", "NFL Soccer Cricket Special", "http://s/1")]),
    );
    let (catalog, _) = aggregator.finish().unwrap();
    assert_eq!(catalog.category_of("http://s/1").unwrap().as_str(), "Other | StreamedSU");
}

#[test]
fn test_output_layout() {
    let mut aggregator = Aggregator::from_config(&AppConfig::default());
    aggregator.ingest_feed(
        &Source::new("TVPass", "http://feed"),
        "#EXTM3U\n#EXTINF:-1,Mystery Channel\nhttp://t/2\n\n#EXTINF:-1 group-title=\"live events\",Concert\nhttp://t/1\n",
    );
    let (catalog, _) = aggregator.finish().unwrap();

    let expected = concat!(
        "#EXTM3U\n",
        "#EXTINF:-1 group-title=\"Events | TVPass\",Concert\n",
        "http://t/1\n",
        "#EXTINF:-1 group-title=\"TVPass | TVPass\",Mystery Channel\n",
        "http://t/2\n",
    );
    assert_eq!(render(&catalog), expected);
}

#[tokio::test]
async fn test_all_sources_failing_is_fatal() {
    let config = AppConfig::default();
    let a = Source::new("A", "http://a");
    let b = Source::new("B", "http://b");
    let feeds = stream::iter(vec![
        (&a, Err(FeedError::ServerError("A".to_string(), 500))),
        (&b, Err(FeedError::ConnectionTimeout("B".to_string(), 20))),
    ]);

    match aggregator::run(&config, feeds).await {
        Err(AggregateError::EmptyResult { sources_total, sources_failed }) => {
            assert_eq!(sources_total, 2);
            assert_eq!(sources_failed, 2);
        }
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("an empty run must fail"),
    }
}

#[tokio::test]
async fn test_failed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("docs").join("live-events.m3u");
    let config = AppConfig {
        sources: vec![Source::new("Broken", "not a url"), Source::new("Also Broken", "")],
        ..Default::default()
    };

    let err = aggregator::run_and_write(&config, &output, false).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AggregateError>(),
        Some(AggregateError::EmptyResult { sources_failed: 2, .. })
    ));
    assert!(!output.exists());
    assert!(!dir.path().join("docs").exists());
}

#[tokio::test]
async fn test_failing_source_is_skipped() {
    let config = AppConfig::default();
    let bad = Source::new("Down", "http://down");
    let good = Source::new("TheTVApp", "http://up");
    let feeds = stream::iter(vec![
        (&bad, Err(FeedError::ServerError("Down".to_string(), 503))),
        (&good, Ok(feed(&[("MLB", "Game", "http://g/1")]))),
    ]);

    let (catalog, summary) = aggregator::run(&config, feeds).await.unwrap();
    assert_eq!(summary.sources_failed, 1);
    assert_eq!(summary.sources_ok, 1);
    assert_eq!(catalog.category_of("http://g/1").unwrap().as_str(), "MLB | TheTVApp");
}
