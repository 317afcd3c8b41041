//! The accumulated, URL-deduplicated result set of one deep-search run.

use std::collections::HashSet;

use deepsearch_web::SearchResult;

/// Insertion-ordered results with no two entries sharing a `url`.
///
/// Owned by a single run; rounds are folded in with [`ResultSet::merge`].
/// An empty `url` is an ordinary key: only the first result without one is
/// kept.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    items: Vec<SearchResult>,
    seen: HashSet<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `result` unless its URL is already present.
    pub fn push(&mut self, result: SearchResult) -> bool {
        if !self.seen.insert(result.url.clone()) {
            return false;
        }
        self.items.push(result);
        true
    }

    /// Append every result whose URL is new, in batch order. Returns how many were kept.
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = SearchResult>,
    {
        batch.into_iter().filter(|r| self.push(r.clone())).count()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<SearchResult> {
        self.items
    }

    /// Result count per engine, in first-seen order. A missing engine counts as `unknown`.
    pub fn source_breakdown(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for result in &self.items {
            let label = result.engine_label();
            match counts.iter_mut().find(|(engine, _)| engine == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label.to_string(), 1)),
            }
        }
        counts
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl IntoIterator for ResultSet {
    type Item = SearchResult;
    type IntoIter = std::vec::IntoIter<SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<SearchResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = SearchResult>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str, engine: &str) -> SearchResult {
        SearchResult {
            title: format!("Title {url}"),
            content: String::new(),
            url: url.to_string(),
            engine: engine.to_string(),
            score: 0.0,
        }
    }

    #[test]
    fn merge_keeps_first_seen_order_and_skips_known_urls() {
        let mut set = ResultSet::new();
        assert_eq!(set.merge(vec![hit("a", "x"), hit("b", "x")]), 2);
        assert_eq!(set.merge(vec![hit("b", "y"), hit("c", "y"), hit("a", "y")]), 1);

        let urls: Vec<&str> = set.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["a", "b", "c"]);
        assert_eq!(set.as_slice()[1].engine, "x");
    }

    #[test]
    fn duplicates_inside_one_batch_are_dropped() {
        let set: ResultSet = vec![hit("a", "x"), hit("a", "y")].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(set.contains_url("a"));
    }

    #[test]
    fn empty_urls_collapse_to_the_first() {
        let mut set = ResultSet::new();
        assert!(set.push(hit("", "x")));
        assert!(!set.push(hit("", "y")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn breakdown_counts_in_first_seen_order() {
        let set: ResultSet = vec![
            hit("1", "bing"),
            hit("2", ""),
            hit("3", "bing"),
            hit("4", "wikipedia"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            set.source_breakdown(),
            vec![
                ("bing".to_string(), 2),
                ("unknown".to_string(), 1),
                ("wikipedia".to_string(), 1)
            ]
        );
    }
}
