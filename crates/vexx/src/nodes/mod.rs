//! Decoders of node bodies
//!
//! Each decoder takes the body range of a single node and returns its [`NodeKind`]. Decoders never
//! look outside of the body range they're given, and they don't influence the tree layout, which
//! is driven by node headers alone.

use crate::{
    config::DecodeOptions, error::DecodeError, node::NodeKind, range::ByteRange,
    registry::Generation, registry::NodeType,
};
use glam::Vec3;

mod anim;
pub(crate) mod collision;
pub(crate) mod mesh;
mod simple;
pub(crate) mod texture;

pub use anim::*;
pub use collision::*;
pub use mesh::*;
pub use simple::*;
pub use texture::*;

/// State shared by body decoders of a single document.
pub struct DecodeContext<'o> {
    pub generation: Generation,
    pub options: &'o DecodeOptions,
    warnings: Vec<DecodeError>,
}

impl<'o> DecodeContext<'o> {
    pub fn new(generation: Generation, options: &'o DecodeOptions) -> Self {
        Self {
            generation,
            options,
            warnings: Vec::new(),
        }
    }

    /// Records a non-fatal problem with the node that's currently being decoded.
    pub fn warn(&mut self, error: DecodeError) {
        self.warnings.push(error);
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<DecodeError> {
        std::mem::take(&mut self.warnings)
    }
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Reads a float box, stored as two 16-byte rows (`xyz` + padding each).
    pub fn read_f32(range: &ByteRange, offset: usize) -> Result<Self, DecodeError> {
        Ok(Self {
            min: Vec3::from_array(range.f32_array(offset)?),
            max: Vec3::from_array(range.f32_array(offset + 16)?),
        })
    }

    /// Reads a 16-bit integer box, stored as two 8-byte rows.
    pub fn read_i16(range: &ByteRange, offset: usize) -> Result<Self, DecodeError> {
        let min: [i16; 3] = range.i16_array(offset)?;
        let max: [i16; 3] = range.i16_array(offset + 8)?;
        Ok(Self {
            min: Vec3::new(min[0] as f32, min[1] as f32, min[2] as f32),
            max: Vec3::new(max[0] as f32, max[1] as f32, max[2] as f32),
        })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Dispatches a body to the decoder of its kind.
pub fn decode_body(
    node_type: NodeType,
    ctx: &mut DecodeContext,
    body: &ByteRange,
) -> Result<NodeKind, DecodeError> {
    use NodeType::*;
    Ok(match node_type {
        World => NodeKind::World(simple::World::read(body)),
        Transform | StartPosition | ShipCollisionFx | ShipMuzzle | EngineFlare | EngineFire
        | Trail | LodGroup | Absorb | WingTip => NodeKind::Transform(simple::Transform::read(body)?),
        LensFlare => NodeKind::LensFlare(simple::LensFlare::read(body)?),
        AmbientLight => NodeKind::AmbientLight(simple::AmbientLight::read(body)?),
        Camera => NodeKind::Camera(simple::Camera::read(body)?),
        Section => NodeKind::Section(simple::Section::read(body)?),
        Sound => NodeKind::Sound(simple::Sound::read(body)?),
        AnimTransform => NodeKind::AnimTransform(anim::AnimTransform::read(body)?),
        Mesh | WeaponPad | SeaReflect | Skycube | SpeedupPad | Sea => {
            NodeKind::Mesh(mesh::Mesh::read(ctx, body)?)
        }
        FloorCollision | WallCollision | ResetCollision | TrackWallCollision => {
            NodeKind::Collision(collision::Collision::read(ctx, body)?)
        }
        Texture => NodeKind::Texture(texture::Texture::read(body)?),
        _ => NodeKind::Marker,
    })
}
