/// Finds the sport named in a group label.
///
/// Keywords are matched as case-insensitive substrings in the order they were
/// configured; the first hit wins, so "NCAAF" listed ahead of "Football" claims
/// "NCAAF Football" for itself.
#[derive(Debug, Clone)]
pub struct SportMatcher {
    // (lower-cased needle, display form)
    keywords: Vec<(String, String)>,
}

impl SportMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_lowercase(), k))
            .collect();
        Self { keywords }
    }

    /// Returns the display form of the first keyword found in `label`
    pub fn detect(&self, label: &str) -> Option<&str> {
        let lower = label.to_lowercase();
        self.keywords
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))
            .map(|(_, display)| display.as_str())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for SportMatcher {
    fn default() -> Self {
        Self::new(crate::config::default_sport_keywords())
    }
}
