//! Various utilities shared by the VEXX reader and its tooling

pub mod color;

mod ascii_display;
pub use ascii_display::*;

mod result_ext;
pub use result_ext::AnyhowResultExt;

pub type AnyResult<T = (), E = anyhow::Error> = anyhow::Result<T, E>;

/// Shorthand for `Ok(())`, cause it looks ugly
pub const fn ok<E>() -> Result<(), E> {
    Ok(())
}

/// Aligns the value. Alignment doesn't have to be a power of two.
///
/// ```
/// use vexx_utils::align;
/// assert_eq!(16, align(10, 8));
/// assert_eq!(12, align(12, 4));
/// assert_eq!(7, align(7, 1));
/// ```
pub const fn align(n: usize, a: usize) -> usize {
    (n + a - 1) / a * a
}

/// Converts a 4-byte string into a u32, as it would be read from a little endian stream.
///
/// ## Example
/// ```
/// use vexx_utils::string_as_u32;
/// assert_eq!(string_as_u32("VEXX"), 0x58584556);
/// ```
pub const fn string_as_u32(s: &str) -> u32 {
    if s.len() == 4 {
        let bytes = s.as_bytes();
        let mut result = 0u32;
        result |= (bytes[0] as u32) << 0;
        result |= (bytes[1] as u32) << 8;
        result |= (bytes[2] as u32) << 16;
        result |= (bytes[3] as u32) << 24;
        result
    } else {
        panic!("Invalid string length");
    }
}
