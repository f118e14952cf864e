//! Turning UI choices into engine filters and results into readable text.

use std::io::{self, Write};

use bookrec_core::types::Recommendation;
use bookrec_hybrid::QueryOutcome;

/// Dropdown value meaning "no filter".
pub const ALL: &str = "All";

/// UI tone labels and the emotion each one filters on.
pub const TONE_LABELS: [(&str, &str); 5] =
    [("Happy", "joy"), ("Surprising", "surprise"), ("Angry", "anger"), ("Suspenseful", "fear"), ("Sad", "sadness")];

pub const CATEGORIES: [&str; 7] = ["Biography", "Fantasy", "Fiction", "History", "Non-Fiction", "Science", "Thriller"];

pub const NO_MATCHES: &str = "No books found matching your criteria. Try adjusting the filters or using different keywords in your description.";

pub fn category_filter(choice: Option<&str>) -> Option<String> {
    choice.map(str::trim).filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL)).map(str::to_string)
}

/// Map a UI tone label (or a raw emotion name) to the emotion label stored
/// in the metadata table.
pub fn tone_filter(choice: Option<&str>) -> Option<String> {
    let choice = choice.map(str::trim).filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL))?;
    let emotion = TONE_LABELS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(choice))
        .map_or_else(|| choice.to_ascii_lowercase(), |(_, emotion)| (*emotion).to_string());
    Some(emotion)
}

/// `A`, `A and B`, or `A et al.`; list punctuation from the source data is removed.
pub fn format_authors(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '[' | ']' | '\'' | '"')).map(|c| if c == ';' { ',' } else { c }).collect();
    let authors: Vec<&str> = cleaned.split(',').map(str::trim).filter(|a| !a.is_empty()).collect();
    match authors.as_slice() {
        [] => "Unknown Author".to_string(),
        [one] => (*one).to_string(),
        [a, b] => format!("{a} and {b}"),
        [first, ..] => format!("{first} et al."),
    }
}

/// Larger cover image over https, or `None` when the table has no usable URL.
pub fn cover_url(thumbnail: Option<&str>) -> Option<String> {
    let url = thumbnail?.trim().trim_matches(|c| c == '\'' || c == '"');
    if url.is_empty() || url.eq_ignore_ascii_case("nan") { return None; }
    let url = match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    };
    let sep = if url.contains('?') { '&' } else { '?' };
    Some(format!("{url}{sep}fife=w800"))
}

pub fn truncate_description(desc: &str, max_chars: usize) -> String {
    if desc.chars().count() <= max_chars { return desc.to_string(); }
    let head: String = desc.chars().take(max_chars).collect();
    format!("{head}...")
}

pub fn render(rank: usize, rec: &Recommendation) -> String {
    let mood = rec.tone_probability.map_or_else(|| "N/A".to_string(), |p| format!("{p:.2}"));
    let mut out = format!(
        "{}. {} by {}\n   score={:.4}  rating={:.1} ({} ratings)  category={}  tone={} ({})  [{}]\n   {}",
        rank,
        rec.title,
        format_authors(&rec.authors),
        rec.score,
        rec.rating,
        rec.ratings_count,
        rec.category.as_deref().unwrap_or("-"),
        rec.tone.as_deref().unwrap_or("-"),
        mood,
        rec.match_reason,
        truncate_description(&rec.description, 120),
    );
    if let Some(url) = cover_url(rec.thumbnail.as_deref()) {
        out.push_str("\n   ");
        out.push_str(&url);
    }
    out
}

/// One query per line; blank lines and `#` comments are ignored.
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')).map(str::to_string).collect()
}

/// Plain-text batch report. Failed queries get an `Error:` line in place of results.
pub fn write_batch_report<W: Write>(out: &mut W, outcomes: &[QueryOutcome]) -> io::Result<()> {
    for outcome in outcomes {
        writeln!(out, "\n🔍 Query: {}", outcome.query)?;
        writeln!(out, "{}", "-".repeat(60))?;
        let results = match &outcome.result {
            Ok(results) => results,
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                continue;
            }
        };
        if results.is_empty() { writeln!(out, "{NO_MATCHES}")?; }
        for (i, rec) in results.iter().enumerate() {
            writeln!(
                out,
                "{}. {} | {} (Rating: {:.2}, Score: {:.3})",
                i + 1,
                rec.title,
                rec.category.as_deref().unwrap_or("Unknown"),
                rec.rating,
                rec.score
            )?;
            writeln!(out, "   Author: {}", format_authors(&rec.authors))?;
            let desc = if rec.description.is_empty() { "No description".to_string() } else { truncate_description(&rec.description.replace('\n', " "), 100) };
            writeln!(out, "   Desc: {desc}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookrec_core::types::BookRecord;
    use bookrec_core::Error;

    #[test]
    fn authors_are_summarized() {
        assert_eq!(format_authors(""), "Unknown Author");
        assert_eq!(format_authors("['Ann Lee']"), "Ann Lee");
        assert_eq!(format_authors("Ann Lee;Bo Park"), "Ann Lee and Bo Park");
        assert_eq!(format_authors("A, B, C"), "A et al.");
    }

    #[test]
    fn tone_labels_map_to_emotions() {
        assert_eq!(tone_filter(Some("Suspenseful")).as_deref(), Some("fear"));
        assert_eq!(tone_filter(Some("happy")).as_deref(), Some("joy"));
        assert_eq!(tone_filter(Some("Sadness")).as_deref(), Some("sadness"));
        assert_eq!(tone_filter(Some("All")), None);
        assert_eq!(tone_filter(None), None);
    }

    #[test]
    fn all_category_means_no_filter() {
        assert_eq!(category_filter(Some("All")), None);
        assert_eq!(category_filter(Some("Non-Fiction")).as_deref(), Some("Non-Fiction"));
    }

    #[test]
    fn cover_urls_are_upgraded() {
        assert_eq!(cover_url(Some("http://books.google.com/x?id=1")).as_deref(), Some("https://books.google.com/x?id=1&fife=w800"));
        assert_eq!(cover_url(Some("https://img/x")).as_deref(), Some("https://img/x?fife=w800"));
        assert_eq!(cover_url(Some("nan")), None);
        assert_eq!(cover_url(None), None);
    }

    #[test]
    fn long_descriptions_are_cut() {
        assert_eq!(truncate_description("abcdef", 3), "abc...");
        assert_eq!(truncate_description("abc", 3), "abc");
    }

    #[test]
    fn query_files_skip_blanks_and_comments() {
        let text = "# smoke queries\nA cyberpunk novel about artificial intelligence\n\n  A book about machine learning  \n";
        assert_eq!(parse_queries(text), ["A cyberpunk novel about artificial intelligence", "A book about machine learning"]);
    }

    #[test]
    fn batch_report_records_failures_and_continues() {
        let mut book = BookRecord::new(9_780_000_000_001, "Neuromancer");
        book.authors = "William Gibson".into();
        book.simple_category = Some("Fiction".into());
        book.average_rating = 3.9;
        book.description = "line one\nline two".into();
        let outcomes = vec![
            QueryOutcome { query: "cyberpunk".into(), result: Ok(vec![Recommendation::from_record(&book, 1.25)]) },
            QueryOutcome { query: "romans".into(), result: Err(Error::RecommendationFailed("index offline".into())) },
            QueryOutcome { query: "nothing".into(), result: Ok(Vec::new()) },
        ];
        let mut buf = Vec::new();
        write_batch_report(&mut buf, &outcomes).unwrap();
        let report = String::from_utf8(buf).unwrap();

        assert!(report.contains("🔍 Query: cyberpunk"));
        assert!(report.contains("1. Neuromancer | Fiction (Rating: 3.90, Score: 1.250)"));
        assert!(report.contains("   Author: William Gibson"));
        assert!(report.contains("   Desc: line one line two"));
        assert!(report.contains("Error: Recommendation failed: index offline"));
        let after_error = report.split("🔍 Query: romans").nth(1).unwrap();
        assert!(after_error.contains("🔍 Query: nothing"));
        assert!(after_error.contains(NO_MATCHES));
    }
}
