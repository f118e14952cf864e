//! Identifier normalization.
//!
//! Identifiers reach us from the index metadata as loosely formatted strings
//! (`"978-0-13-468599-1"`, `"'9780134685991'"`, stray whitespace). Both the
//! metadata loader and the engine join on the integer produced here.

/// Key reserved for "no usable identifier". Never stored in the metadata table.
pub const UNJOINABLE: u64 = 0;

/// Keep only ASCII digits and parse them as an integer.
///
/// Returns [`UNJOINABLE`] when nothing is left after stripping or the digits
/// overflow a `u64`.
pub fn normalize_isbn(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() { return UNJOINABLE; }
    digits.parse::<u64>().unwrap_or(UNJOINABLE)
}
