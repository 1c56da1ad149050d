use super::Aabb;
use crate::{error::DecodeError, range::ByteRange};
use glam::{Mat4, Vec4};
use std::ops::Range;

fn read_matrix(body: &ByteRange) -> Result<Mat4, DecodeError> {
    match body.len() >= 64 {
        true => Ok(Mat4::from_cols_array(&body.f32_array(0)?)),
        false => Ok(Mat4::IDENTITY),
    }
}

/// Root node of a file. Its body stores the name of the source scene.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub source: String,
}

impl World {
    pub fn read(body: &ByteRange) -> Self {
        Self {
            source: body.string(),
        }
    }
}

/// Any node that's nothing more than a positioned point in space. Bodies shorter than a full
/// matrix leave the identity in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub matrix: Mat4,
}

impl Transform {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            matrix: read_matrix(body)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LensFlare {
    pub matrix: Mat4,
    /// Absolute range of the uninterpreted bytes following the matrix
    pub trailing: Range<usize>,
}

impl LensFlare {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        let trailing = match body.len() > 64 {
            true => body.slice(64, None)?.range(),
            false => body.end()..body.end(),
        };
        Ok(Self {
            matrix: read_matrix(body)?,
            trailing,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Vec4,
}

impl AmbientLight {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            color: Vec4::from_array(body.f32_array(0)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub unknown: [u32; 3],
    /// Seconds per frame, typically 1/60
    pub frame_duration: f32,
    pub params: [f32; 4],
    pub flags: [u16; 2],
}

impl Camera {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            unknown: [body.u32(0)?, body.u32(4)?, body.u32(8)?],
            frame_duration: body.f32(12)?,
            params: body.f32_array(16)?,
            flags: [body.u16(32)?, body.u16(34)?],
        })
    }
}

/// A named track section, with its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub unknown: [u8; 16],
    pub aabb: Aabb,
    pub name: String,
}

impl Section {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            unknown: body.u8_array(0)?,
            aabb: Aabb::read_f32(body, 16)?,
            name: body.slice(48, None)?.string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    pub unknown: [f32; 2],
    pub name1: String,
    pub name2: String,
    pub trailing: [u8; 32],
}

impl Sound {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            unknown: body.f32_array(0)?,
            name1: body.slice(8, Some(8))?.string(),
            name2: body.slice(16, Some(16))?.string(),
            trailing: body.u8_array(32)?,
        })
    }
}
