use crate::{error::DecodeError, range::ByteRange};
use glam::Vec3;

/// Raw value marking an unset base coordinate.
const UNSET_COORDINATE: u32 = 0x400000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    pub keys: Vec<u16>,
    pub values: Vec<Vec3>,
}

/// Keyframed transform. Both tracks are stored as 16-bit fixed point vectors: the first one is
/// scaled by the per-axis range and offset by the base position, the second one is normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimTransform {
    pub unknown: u16,
    pub has_position: bool,
    pub track1_end: u32,
    pub track1_start: u32,
    pub base: Vec3,
    pub scale: Vec3,
    pub track1: Option<KeyframeTrack>,
    pub track2: Option<KeyframeTrack>,
}

impl AnimTransform {
    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        let unknown = body.u16(0)?;
        let count1 = body.u16(2)? as usize;
        let count2 = body.u16(4)? as usize;
        let has_position = body.u16(6)? != 0;
        let track1_end = body.u32(8)?;
        let track1_start = body.u32(12)?;

        let mut base = Vec3::ZERO;
        let mut scale = Vec3::ZERO;
        if has_position {
            for axis in 0..3 {
                let offset = 16 + axis * 4;
                if body.u32(offset)? != UNSET_COORDINATE {
                    base[axis] = body.f32(offset)?;
                }
                scale[axis] = body.f32(32 + axis * 4)? * 32767.0;
            }
        }

        let mut offset = track1_start as usize;

        let track1 = match count1 {
            0 => None,
            n => {
                let keys = body.u16_vec(offset, n)?;
                let raw = body.i16_vec(offset + n * 2, n * 3)?;
                offset += n * 8;
                let values = raw
                    .chunks_exact(3)
                    .map(|v| {
                        let normalized = Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32) / 32767.0;
                        base + normalized * scale
                    })
                    .collect();
                Some(KeyframeTrack { keys, values })
            }
        };

        let track2 = match count2 {
            0 => None,
            n => {
                let keys = body.u16_vec(offset, n)?;
                let raw = body.i16_vec(offset + n * 2, n * 3)?;
                let values = raw
                    .chunks_exact(3)
                    .map(|v| Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32) / 32768.0)
                    .collect();
                Some(KeyframeTrack { keys, values })
            }
        };

        Ok(Self {
            unknown,
            has_position,
            track1_end,
            track1_start,
            base,
            scale,
            track1,
            track2,
        })
    }
}
