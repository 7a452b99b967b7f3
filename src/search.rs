//! Product search state

use crate::products::ProductWithUnit;

/// What applying a result set did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were stored and the modal opened.
    Shown(usize),

    /// Nothing matched; the modal stays hidden and previous results are kept.
    NoMatches,
}

/// Search field, last results and results modal.
///
/// Fetching is not done here; results arrive through [`ProductSearch::with_results`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSearch {
    text: String,
    results: Vec<ProductWithUnit>,
    modal_visible: bool,
    enabled: bool,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            text: String::new(),
            results: Vec::new(),
            modal_visible: false,
            enabled: true,
        }
    }
}

impl ProductSearch {
    /// Current search text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Results of the last search that matched anything.
    pub fn results(&self) -> &[ProductWithUnit] {
        &self.results
    }

    /// Whether the results modal is open.
    pub fn modal_visible(&self) -> bool {
        self.modal_visible
    }

    /// Whether searching is currently permitted.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The text to search for, or `None` when the field is blank.
    pub fn query(&self) -> Option<&str> {
        let query = self.text.trim();

        (!query.is_empty()).then_some(query)
    }

    /// Replace the search text. Does not search.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self
        }
    }

    /// Apply a fetched result set.
    #[must_use]
    pub fn with_results(self, results: Vec<ProductWithUnit>) -> (Self, SearchOutcome) {
        if results.is_empty() {
            return (self, SearchOutcome::NoMatches);
        }

        let count = results.len();

        (
            Self {
                results,
                modal_visible: true,
                ..self
            },
            SearchOutcome::Shown(count),
        )
    }

    /// Close the modal. Stored results are kept until the next search replaces them.
    #[must_use]
    pub fn cancelled(self) -> Self {
        Self {
            modal_visible: false,
            ..self
        }
    }

    /// Allow or forbid searching.
    #[must_use]
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}

#[cfg(test)]
mod tests {
    use crate::test::fixtures::{manzana, pera};

    use super::*;

    #[test]
    fn updating_text_does_not_touch_results() {
        let (search, _) = ProductSearch::default().with_results(vec![manzana()]);

        let search = search.with_text("pe");

        assert_eq!(search.text(), "pe");
        assert_eq!(search.results(), [manzana()]);
    }

    #[test]
    fn empty_results_report_no_matches_and_keep_modal_hidden() {
        let (search, outcome) = ProductSearch::default().with_text("xyz").with_results(vec![]);

        assert_eq!(outcome, SearchOutcome::NoMatches);
        assert!(!search.modal_visible());
        assert!(search.results().is_empty());
    }

    #[test]
    fn results_are_stored_and_modal_opened() {
        let (search, outcome) = ProductSearch::default()
            .with_text("a")
            .with_results(vec![manzana(), pera()]);

        assert_eq!(outcome, SearchOutcome::Shown(2));
        assert!(search.modal_visible());
        assert_eq!(search.results().len(), 2);
    }

    #[test]
    fn no_matches_keeps_previous_results() {
        let (search, _) = ProductSearch::default().with_results(vec![pera()]);
        let (search, _) = search.cancelled().with_results(vec![]);

        assert_eq!(search.results(), [pera()]);
    }

    #[test]
    fn cancelling_only_hides_the_modal() {
        let (search, _) = ProductSearch::default()
            .with_text("man")
            .with_results(vec![manzana()]);

        let search = search.cancelled();

        assert!(!search.modal_visible());
        assert_eq!(search.results(), [manzana()]);
        assert_eq!(search.text(), "man");
    }

    #[test]
    fn blank_text_has_no_query() {
        assert_eq!(ProductSearch::default().query(), None);
        assert_eq!(ProductSearch::default().with_text("   ").query(), None);
        assert_eq!(ProductSearch::default().with_text(" pera ").query(), Some("pera"));
    }
}
