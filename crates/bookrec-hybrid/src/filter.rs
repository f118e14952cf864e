//! Category and tone constraints, applied after the metadata join.

use serde::{Deserialize, Serialize};

use bookrec_core::types::BookRecord;

/// Active constraints for one query. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
    pub category: Option<String>,
    pub tone: Option<String>,
}

impl CandidateFilter {
    pub fn new(category: Option<&str>, tone: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        Self { category: clean(category), tone: clean(tone) }
    }

    pub fn is_active(&self) -> bool { self.category.is_some() || self.tone.is_some() }

    pub fn has_category(&self) -> bool { self.category.is_some() }

    /// Case-insensitive match on the resolved category and dominant tone.
    /// A book missing the field never satisfies an active constraint.
    pub fn accepts(&self, book: &BookRecord) -> bool {
        matches_field(self.category.as_deref(), book.category()) && matches_field(self.tone.as_deref(), book.dominant_tone.as_deref())
    }
}

fn matches_field(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(w), Some(a)) => w.eq_ignore_ascii_case(a.trim()),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(simple: Option<&str>, raw: Option<&str>, tone: Option<&str>) -> BookRecord {
        let mut b = BookRecord::new(1, "t");
        b.simple_category = simple.map(str::to_string);
        b.raw_category = raw.map(str::to_string);
        b.dominant_tone = tone.map(str::to_string);
        b
    }

    #[test]
    fn inactive_filter_accepts_everything() {
        let f = CandidateFilter::default();
        assert!(!f.is_active());
        assert!(f.accepts(&book(None, None, None)));
    }

    #[test]
    fn category_is_case_insensitive() {
        let f = CandidateFilter::new(Some("non-fiction"), None);
        assert!(f.accepts(&book(Some("Non-Fiction"), None, None)));
        assert!(!f.accepts(&book(Some("Fiction"), None, None)));
    }

    #[test]
    fn category_falls_back_to_raw() {
        let f = CandidateFilter::new(Some("History"), None);
        assert!(f.accepts(&book(None, Some("History"), None)));
        assert!(!f.accepts(&book(Some("Biography"), Some("History"), None)));
        assert!(!f.accepts(&book(None, None, None)));
    }

    #[test]
    fn tone_must_match_dominant_tone() {
        let f = CandidateFilter::new(None, Some("fear"));
        assert!(f.accepts(&book(None, None, Some("Fear"))));
        assert!(!f.accepts(&book(None, None, Some("joy"))));
        assert!(!f.accepts(&book(None, None, None)));
    }

    #[test]
    fn blank_values_mean_no_filter() {
        let f = CandidateFilter::new(Some("  "), Some(""));
        assert!(!f.is_active());
    }
}
