use std::fmt::{self, Display};

/// Displays a byte string, such as a file magic, escaping anything that isn't printable ASCII.
///
/// ```
/// # use vexx_utils::AsciiDisplay;
/// assert_eq!(AsciiDisplay(b"XXEV").to_string(), "XXEV");
/// assert_eq!(AsciiDisplay(b"VE\0\xff").to_string(), "VE\\x00\\xff");
/// assert_eq!(AsciiDisplay(b"a\\b").to_string(), "a\\\\b");
/// ```
pub struct AsciiDisplay<'a>(pub &'a [u8]);

impl Display for AsciiDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}
