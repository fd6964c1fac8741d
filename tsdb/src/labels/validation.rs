use super::error::LabelError;

/// Characters allowed in label names besides ASCII alphanumerics.
const EXTRA_ALLOWED: &str = "-./_";

fn is_valid_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || EXTRA_ALLOWED.contains(c)
}

/// The index of the first invalid character in `name`, or `None` if every
/// character is allowed.
pub fn invalid_index_in(name: &str) -> Option<usize> {
    name.char_indices()
        .find(|(_, c)| !is_valid_label_char(*c))
        .map(|(index, _)| index)
}

/// Ensures that a string is a valid metric name or tag name/value.
///
/// `what` is a human readable description of what is being validated, used
/// in the error.
pub fn check_label_name(what: &'static str, name: &str) -> Result<(), LabelError> {
    match invalid_index_in(name) {
        None => Ok(()),
        Some(index) => Err(LabelError::InvalidName {
            what,
            name: name.to_string(),
            character: name[index..].chars().next().unwrap_or('\u{fffd}'),
            index,
        }),
    }
}
