//! Terminal output utilities.

/// Format a value as a quoted, right-aligned field.
///
/// Width is counted in characters, so network names with non-ASCII letters
/// line up with the rest of the column.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    let len = quoted.chars().count();

    if len >= width {
        quoted
    } else {
        format!("{}{quoted}", " ".repeat(width - len))
    }
}
