//! Spreadsheet-style column names.
//!
//! Columns are numbered from 1 and written in bijective base 26: `A` is 1,
//! `Z` is 26, `AA` is 27 and so on. There is no zero digit.

/// Converts a 1-based column number to its letter name.
///
/// Returns an empty string for `0`, which has no name.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::column_name;
///
/// assert_eq!(column_name(1), "A");
/// assert_eq!(column_name(26), "Z");
/// assert_eq!(column_name(27), "AA");
/// assert_eq!(column_name(703), "AAA");
/// ```
pub fn column_name(number: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = number;
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push(char::from(b'A' + digit as u8));
        remaining = (remaining - digit) / 26;
    }
    letters.iter().rev().collect()
}

/// Converts a column name back to its 1-based number.
///
/// Letters are case-insensitive. Returns `None` for an empty name, for any
/// non-letter character, or when the number does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use cellgrid::domain::column_number;
///
/// assert_eq!(column_number("A"), Some(1));
/// assert_eq!(column_number("az"), Some(52));
/// assert_eq!(column_number("A1"), None);
/// ```
pub fn column_number(name: &str) -> Option<usize> {
    if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }

    name.chars().try_fold(0usize, |sum, ch| {
        let digit = (ch.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        sum.checked_mul(26)?.checked_add(digit)
    })
}
