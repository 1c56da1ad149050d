//! Bounds checked, endianness aware views over the file buffer
//!
//! Every decoder in this crate reads through a [`ByteRange`]. A range never owns its bytes, it
//! only borrows the backing buffer, so slicing is free. Offsets passed to accessors are always
//! relative to the beginning of the view, and any read that would leave the view fails with
//! [`DecodeError::OutOfBounds`] instead of reading neighbouring data.

use crate::error::DecodeError;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Little,
    Big,
}

macro_rules! typed_getter {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $size:expr, $read:ident) => {
        $(#[$meta])*
        pub fn $name(&self, offset: usize) -> Result<$ty, DecodeError> {
            let bytes = self.bytes_at(offset, $size)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$read(bytes),
                Endian::Big => BigEndian::$read(bytes),
            })
        }
    };
}

macro_rules! typed_vec_getter {
    ($(#[$meta:meta])* $name:ident, $single:ident, $ty:ty, $size:expr) => {
        $(#[$meta])*
        pub fn $name(&self, offset: usize, count: usize) -> Result<Vec<$ty>, DecodeError> {
            // Checking the whole span upfront keeps huge counts from allocating
            self.bytes_at(offset, count.saturating_mul($size))?;
            (0..count).map(|i| self.$single(offset + i * $size)).collect()
        }
    };
}

/// A window into a shared, read-only byte buffer.
#[derive(Clone, Copy)]
pub struct ByteRange<'a> {
    data: &'a [u8],
    begin: usize,
    end: usize,
    endian: Endian,
}

impl<'a> ByteRange<'a> {
    /// Creates a view over the entire buffer.
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            begin: 0,
            end: data.len(),
            endian,
        }
    }

    /// Creates a view on the same buffer with absolute boundaries. The current window's bounds are
    /// not taken into account, only the backing buffer's.
    pub fn absolute(&self, begin: usize, end: usize) -> Result<Self, DecodeError> {
        if begin > end || end > self.data.len() {
            return Err(DecodeError::OutOfBounds {
                offset: begin,
                len: end.saturating_sub(begin),
                begin: 0,
                end: self.data.len(),
            });
        }
        Ok(Self {
            begin,
            end,
            ..*self
        })
    }

    /// Creates a sub-view starting at `offset`, relative to this view. Without a `len`, the new
    /// view extends to the end of this one.
    pub fn slice(&self, offset: usize, len: Option<usize>) -> Result<Self, DecodeError> {
        let span = match len {
            Some(len) => self.span(offset, len)?,
            None => self.span(offset, self.len().saturating_sub(offset))?,
        };
        Ok(Self {
            begin: span.start,
            end: span.end,
            ..*self
        })
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Absolute range of this view within the backing buffer.
    pub fn range(&self) -> Range<usize> {
        self.begin..self.end
    }

    /// The bytes inside this view.
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[self.begin..self.end]
    }

    /// The bytes at `offset..offset + len`, relative to this view.
    pub fn bytes_at(&self, offset: usize, len: usize) -> Result<&'a [u8], DecodeError> {
        let span = self.span(offset, len)?;
        Ok(&self.data[span])
    }

    fn span(&self, offset: usize, len: usize) -> Result<Range<usize>, DecodeError> {
        let out_of_bounds = || DecodeError::OutOfBounds {
            offset: self.begin.saturating_add(offset),
            len,
            begin: self.begin,
            end: self.end,
        };
        let start = self.begin.checked_add(offset).ok_or_else(out_of_bounds)?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        if end > self.end {
            return Err(out_of_bounds());
        }
        Ok(start..end)
    }

    pub fn u8(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes_at(offset, 1)?[0])
    }

    pub fn i8(&self, offset: usize) -> Result<i8, DecodeError> {
        Ok(self.u8(offset)? as i8)
    }

    typed_getter!(u16, u16, 2, read_u16);
    typed_getter!(i16, i16, 2, read_i16);
    typed_getter!(u32, u32, 4, read_u32);
    typed_getter!(i32, i32, 4, read_i32);
    typed_getter!(f32, f32, 4, read_f32);

    /// Reads an `n` byte wide unsigned integer.
    fn uint_n(&self, offset: usize, n: usize) -> Result<u64, DecodeError> {
        let bytes = self.bytes_at(offset, n)?;
        Ok(match self.endian {
            Endian::Little => LittleEndian::read_uint(bytes, n),
            Endian::Big => BigEndian::read_uint(bytes, n),
        })
    }

    fn int_n(&self, offset: usize, n: usize) -> Result<i64, DecodeError> {
        let bytes = self.bytes_at(offset, n)?;
        Ok(match self.endian {
            Endian::Little => LittleEndian::read_int(bytes, n),
            Endian::Big => BigEndian::read_int(bytes, n),
        })
    }

    pub fn u24(&self, offset: usize) -> Result<u32, DecodeError> {
        Ok(self.uint_n(offset, 3)? as u32)
    }

    pub fn i24(&self, offset: usize) -> Result<i32, DecodeError> {
        Ok(self.int_n(offset, 3)? as i32)
    }

    pub fn u40(&self, offset: usize) -> Result<u64, DecodeError> {
        self.uint_n(offset, 5)
    }

    pub fn i40(&self, offset: usize) -> Result<i64, DecodeError> {
        self.int_n(offset, 5)
    }

    pub fn u48(&self, offset: usize) -> Result<u64, DecodeError> {
        self.uint_n(offset, 6)
    }

    pub fn i48(&self, offset: usize) -> Result<i64, DecodeError> {
        self.int_n(offset, 6)
    }

    /// Reads an IEEE 754 half precision float, widened to `f32`.
    pub fn f16(&self, offset: usize) -> Result<f32, DecodeError> {
        Ok(half::f16::from_bits(self.u16(offset)?).to_f32())
    }

    typed_vec_getter!(f32_vec, f32, f32, 4);
    typed_vec_getter!(i16_vec, i16, i16, 2);
    typed_vec_getter!(u16_vec, u16, u16, 2);

    pub fn f32_array<const N: usize>(&self, offset: usize) -> Result<[f32; N], DecodeError> {
        self.bytes_at(offset, N * 4)?;
        let mut result = [0.0; N];
        for (i, value) in result.iter_mut().enumerate() {
            *value = self.f32(offset + i * 4)?;
        }
        Ok(result)
    }

    pub fn i16_array<const N: usize>(&self, offset: usize) -> Result<[i16; N], DecodeError> {
        self.bytes_at(offset, N * 2)?;
        let mut result = [0; N];
        for (i, value) in result.iter_mut().enumerate() {
            *value = self.i16(offset + i * 2)?;
        }
        Ok(result)
    }

    pub fn u8_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let mut result = [0; N];
        result.copy_from_slice(self.bytes_at(offset, N)?);
        Ok(result)
    }

    /// Reads a NUL terminated string starting at `offset`. A missing terminator means the string
    /// runs to the end of the view.
    pub fn cstring(&self, offset: usize) -> Result<String, DecodeError> {
        let bytes = self.bytes_at(offset, self.len().saturating_sub(offset))?;
        let bytes = match bytes.iter().position(|&b| b == 0) {
            Some(terminator) => &bytes[..terminator],
            None => bytes,
        };
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Interprets the whole view as a string, with all NUL bytes removed.
    pub fn string(&self) -> String {
        let bytes: Vec<u8> = self.bytes().iter().copied().filter(|&b| b != 0).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl<'a> std::fmt::Debug for ByteRange<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRange")
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("endian", &self.endian)
            .finish()
    }
}
