//! Tiled pixel storage
//!
//! Swizzled textures are stored as a sequence of tiles, each one being 8 rows of 16 bytes. Tiles
//! are laid out left to right, top to bottom, and every tile stores its rows contiguously. Both
//! functions here work on raw bytes, so they don't care about the pixel format.

pub const TILE_ROW_BYTES: usize = 16;
pub const TILE_ROWS: usize = 8;
pub const TILE_SIZE: usize = TILE_ROW_BYTES * TILE_ROWS;

/// Whether a `len` byte buffer with a `row_bytes` pitch is made up of whole tiles.
pub fn is_tiled(len: usize, row_bytes: usize) -> bool {
    row_bytes != 0 && row_bytes % TILE_ROW_BYTES == 0 && len % (row_bytes * TILE_ROWS) == 0
}

/// Rearranges a tiled buffer into linear rows of `row_bytes` bytes.
///
/// Returns `None` if the buffer isn't made up of whole tiles.
///
/// ```
/// use vexx::swizzle::{swizzle, unswizzle};
/// let linear: Vec<u8> = (0..=255).collect();
/// let tiled = swizzle(&linear, 32).unwrap();
/// assert_eq!(&tiled[16..32], &linear[32..48]);
/// assert_eq!(unswizzle(&tiled, 32).unwrap(), linear);
/// ```
pub fn unswizzle(data: &[u8], row_bytes: usize) -> Option<Vec<u8>> {
    permute(data, row_bytes, |tiled, linear| (tiled, linear))
}

/// Rearranges linear rows of `row_bytes` bytes into tiles. Inverse of [`unswizzle`].
pub fn swizzle(data: &[u8], row_bytes: usize) -> Option<Vec<u8>> {
    permute(data, row_bytes, |tiled, linear| (linear, tiled))
}

/// Moves every tile row between its tiled and linear position. `pick` returns the
/// `(source, destination)` offsets.
fn permute(
    data: &[u8],
    row_bytes: usize,
    pick: impl Fn(usize, usize) -> (usize, usize),
) -> Option<Vec<u8>> {
    if !is_tiled(data.len(), row_bytes) {
        return None;
    }

    let tiles_x = row_bytes / TILE_ROW_BYTES;
    let mut result = vec![0; data.len()];
    for tile in 0..data.len() / TILE_SIZE {
        let (tx, ty) = (tile % tiles_x, tile / tiles_x);
        for row in 0..TILE_ROWS {
            let tiled = tile * TILE_SIZE + row * TILE_ROW_BYTES;
            let linear = (ty * TILE_ROWS + row) * row_bytes + tx * TILE_ROW_BYTES;
            let (src, dst) = pick(tiled, linear);
            result[dst..dst + TILE_ROW_BYTES].copy_from_slice(&data[src..src + TILE_ROW_BYTES]);
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 256) as u8).collect()
    }

    #[test]
    fn round_trips() {
        for (row_bytes, rows) in [(16, 8), (32, 8), (64, 16), (48, 24)] {
            let data = pattern(row_bytes * rows);
            let tiled = swizzle(&data, row_bytes).unwrap();
            assert_eq!(tiled.len(), data.len());
            assert_eq!(unswizzle(&tiled, row_bytes).unwrap(), data);
            assert_eq!(swizzle(&unswizzle(&data, row_bytes).unwrap(), row_bytes).unwrap(), data);
        }
    }

    #[test]
    fn single_tile_is_unchanged() {
        let data = pattern(TILE_SIZE);
        assert_eq!(unswizzle(&data, 16).unwrap(), data);
    }

    #[test]
    fn tiles_are_row_major() {
        // Two tiles side by side, filled with their own index
        let mut tiled = vec![0u8; TILE_SIZE];
        tiled.extend(vec![1u8; TILE_SIZE]);
        let linear = unswizzle(&tiled, 32).unwrap();
        for row in linear.chunks(32) {
            assert_eq!(&row[..16], &[0; 16]);
            assert_eq!(&row[16..], &[1; 16]);
        }
    }

    #[test]
    fn partial_tiles_are_rejected() {
        assert!(unswizzle(&pattern(100), 16).is_none());
        assert!(unswizzle(&pattern(TILE_SIZE), 8).is_none());
        assert!(swizzle(&pattern(32 * 4), 32).is_none());
        assert!(unswizzle(&[], 0).is_none());
    }
}
