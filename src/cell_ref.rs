//! Utilities for Excel-style cell references, column letters and ranges.

/// Last addressable column index, column `ZZZ`.
pub const MAX_COLUMN_INDEX: u32 = 18_277;

/// Number of addressable columns (`A` through `ZZZ`).
pub const MAX_COLUMNS: u32 = MAX_COLUMN_INDEX + 1;

/// Last addressable row index (row 1,048,576).
pub const MAX_ROW_INDEX: u32 = 1_048_575;

/// Convert a 0-based column index to Excel column letters (A, B, ..., Z, AA, AB, ...)
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(col) + 1; // Convert to 1-based
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        result.insert(0, char::from(b'A' + offset));
        n /= 26;
    }
    result
}

/// Convert column letters ("A", "zz", "ZZZ") to a 0-based column index.
///
/// Returns `None` for empty input, non-letters, or overflow.
pub fn letter_to_col(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    col.checked_sub(1)
}

/// Whether a column index is inside `A..=ZZZ`.
pub fn is_valid_col(col: u32) -> bool {
    col <= MAX_COLUMN_INDEX
}

/// Whether `(row, col)` is an addressable cell.
pub fn is_valid_cell(row: u32, col: u32) -> bool {
    row <= MAX_ROW_INDEX && is_valid_col(col)
}

/// Parse a cell reference like "A1" or "$B$10" into `(row, col)`, both 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let trimmed = cell_ref.trim();
    let body: String = trimmed.chars().filter(|&c| c != '$').collect();
    let split = body.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = body.split_at(split);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let col = letter_to_col(letters)?;
    let row: u32 = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col))
}

/// Format a 0-indexed `(row, col)` as an A1 reference.
pub fn format_cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), u64::from(row) + 1)
}

/// Parse a cell range like "A1:B10" or "A1" into (start_row, start_col, end_row, end_col).
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    if let Some((start, end)) = range.split_once(':') {
        let (start_row, start_col) = parse_cell_ref(start)?;
        let (end_row, end_col) = parse_cell_ref(end)?;
        Some((
            start_row.min(end_row),
            start_col.min(end_col),
            start_row.max(end_row),
            start_col.max(end_col),
        ))
    } else {
        let (row, col) = parse_cell_ref(range)?;
        Some((row, col, row, col))
    }
}

/// Format an inclusive range as "A1:C5" (or "A1" for a single cell).
pub fn format_cell_range(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> String {
    if start_row == end_row && start_col == end_col {
        return format_cell_ref(start_row, start_col);
    }
    format!(
        "{}:{}",
        format_cell_ref(start_row, start_col),
        format_cell_ref(end_row, end_col)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_col_letters_roundtrip_edges() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
        assert_eq!(col_to_letter(MAX_COLUMN_INDEX), "ZZZ");
        assert_eq!(letter_to_col("ZZZ"), Some(MAX_COLUMN_INDEX));
        assert_eq!(letter_to_col("aa"), Some(26));
        assert_eq!(letter_to_col(""), None);
        assert_eq!(letter_to_col("A1"), None);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("$B$10"), Some((9, 1)));
        assert_eq!(parse_cell_ref(" c3 "), Some((2, 2)));
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("1A"), None);
        assert_eq!(parse_cell_ref("A1B"), None);
    }

    #[test]
    fn test_cell_ceiling() {
        assert!(is_valid_cell(MAX_ROW_INDEX, MAX_COLUMN_INDEX));
        assert!(!is_valid_cell(MAX_ROW_INDEX + 1, 0));
        assert!(!is_valid_cell(0, MAX_COLUMN_INDEX + 1));
        assert!(!is_valid_cell(u32::MAX, 0));
    }

    #[test]
    fn test_ranges() {
        assert_eq!(parse_cell_range("B2:A1"), Some((0, 0, 1, 1)));
        assert_eq!(parse_cell_range("C5"), Some((4, 2, 4, 2)));
        assert_eq!(format_cell_range(0, 0, 4, 2), "A1:C5");
        assert_eq!(format_cell_range(3, 1, 3, 1), "B4");
    }
}
