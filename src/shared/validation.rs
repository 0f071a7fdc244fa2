use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating stored file names
    /// A single path component with no separators or control characters
    /// - Valid: "a.txt", "Quarterly Report (final).pdf", "2024-brief.docx"
    /// - Invalid: "dir/a.txt", "..\\a.txt", "", "a\u{0}b"
    pub static ref FILE_NAME_REGEX: Regex = Regex::new(r"^[^/\\\x00-\x1f]{1,255}$").unwrap();
}

/// Check that a name can be stored as a single flat file
pub fn is_valid_file_name(name: &str) -> bool {
    name != "." && name != ".." && FILE_NAME_REGEX.is_match(name)
}
