//! Collision bodies
//!
//! ```c
//! struct Collision {
//!     u32 signature;
//!     u32 block_count;
//!     Block blocks[block_count];
//! };
//!
//! struct Block {
//!     u32 points_count;
//!     Points points[points_count];
//! };
//!
//! struct Points {
//!     u32 type;        // 1: f32 vertex triples, 2: u16 index triples, 3: unknown
//!     u16 point_size;
//!     u16 point_count;
//!     u8 data[point_size * point_count];
//! };
//! ```

use super::DecodeContext;
use crate::{error::DecodeError, range::ByteRange};
use glam::Vec3;
use std::ops::Range;

pub const POINTS_VERTICES: u32 = 1;
pub const POINTS_INDICES: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum PointsData {
    Vertices(Vec<Vec3>),
    Indices(Vec<[u16; 3]>),
    /// Uninterpreted data, as an absolute range
    Other(Range<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Points {
    pub kind: u32,
    pub point_size: u16,
    pub point_count: u16,
    pub data: PointsData,
}

impl Points {
    const HEADER_SIZE: usize = 8;

    fn read(ctx: &mut DecodeContext, range: &ByteRange) -> Result<Self, DecodeError> {
        let kind = range.u32(0)?;
        let point_size = range.u16(4)?;
        let point_count = range.u16(6)?;
        let data_range = range.slice(
            Self::HEADER_SIZE,
            Some(point_size as usize * point_count as usize),
        )?;

        // A pool that doesn't fit its record demotes only that record
        let data = Self::read_pool(kind, point_count as usize, &data_range).unwrap_or_else(|e| {
            ctx.warn(DecodeError::structural(
                range.begin(),
                format!("collision points of type {kind} don't fit their record: {e}"),
            ));
            PointsData::Other(data_range.range())
        });

        Ok(Self {
            kind,
            point_size,
            point_count,
            data,
        })
    }

    fn read_pool(kind: u32, count: usize, data: &ByteRange) -> Result<PointsData, DecodeError> {
        Ok(match kind {
            POINTS_VERTICES => PointsData::Vertices(
                data.f32_vec(0, count * 3)?
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect(),
            ),
            POINTS_INDICES => PointsData::Indices(
                data.u16_vec(0, count * 3)?
                    .chunks_exact(3)
                    .map(|t| [t[0], t[1], t[2]])
                    .collect(),
            ),
            _ => PointsData::Other(data.range()),
        })
    }

    /// Serialized size of the record.
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.point_size as usize * self.point_count as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionBlock {
    pub points: Vec<Points>,
}

impl CollisionBlock {
    /// The block's vertex pool, if it has one.
    pub fn vertices(&self) -> Option<&[Vec3]> {
        self.points.iter().find_map(|p| match &p.data {
            PointsData::Vertices(v) => Some(v.as_slice()),
            _ => None,
        })
    }

    /// The block's triangle index pool, if it has one.
    pub fn indices(&self) -> Option<&[[u16; 3]]> {
        self.points.iter().find_map(|p| match &p.data {
            PointsData::Indices(i) => Some(i.as_slice()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub signature: u32,
    pub blocks: Vec<CollisionBlock>,
}

impl Collision {
    pub fn read(ctx: &mut DecodeContext, body: &ByteRange) -> Result<Self, DecodeError> {
        let signature = body.u32(0)?;
        let block_count = body.u32(4)?;

        let mut offset = 8;
        let mut blocks = Vec::new();
        for _ in 0..block_count {
            let points_count = body.u32(offset)?;
            offset += 4;

            let mut block = CollisionBlock::default();
            for _ in 0..points_count {
                let points = Points::read(ctx, &body.slice(offset, None)?)?;
                offset += points.size();
                block.points.push(points);
            }
            blocks.push(block);
        }

        Ok(Self { signature, blocks })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{config::DecodeOptions, range::Endian, registry::Generation, test_support::Writer};

    pub fn read_collision(body: &[u8]) -> (Result<Collision, DecodeError>, Vec<DecodeError>) {
        let options = DecodeOptions::default();
        let mut ctx = DecodeContext::new(Generation::V4, &options);
        let collision = Collision::read(&mut ctx, &ByteRange::new(body, Endian::Little));
        (collision, ctx.take_warnings())
    }

    /// A single quad split into two triangles, with an ignored record in between.
    pub fn quad_collision() -> Vec<u8> {
        let mut w = Writer::new();
        w.u32(0xffffff).u32(1);
        w.u32(3);
        w.u32(POINTS_VERTICES).u16(12).u16(4);
        w.f32s(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        w.u32(3).u16(4).u16(2).zeros(8);
        w.u32(POINTS_INDICES).u16(6).u16(2);
        for index in [0, 1, 2, 1, 2, 3] {
            w.u16(index);
        }
        w.finish()
    }

    #[test]
    fn single_block() {
        let (collision, warnings) = read_collision(&quad_collision());
        let collision = collision.unwrap();

        assert!(warnings.is_empty());
        assert_eq!(collision.blocks.len(), 1);
        let block = &collision.blocks[0];
        assert_eq!(block.points.len(), 3);
        assert_eq!(block.vertices().unwrap().len(), 4);
        assert_eq!(block.vertices().unwrap()[3], Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(block.indices().unwrap(), &[[0, 1, 2], [1, 2, 3]]);
        assert!(matches!(block.points[1].data, PointsData::Other(_)));
    }

    #[test]
    fn block_without_indices() {
        let mut w = Writer::new();
        w.u32(0).u32(2);
        w.u32(1).u32(POINTS_VERTICES).u16(12).u16(1).f32s(&[1.0, 2.0, 3.0]);
        w.u32(0);
        let collision = read_collision(&w.finish()).0.unwrap();

        assert_eq!(collision.blocks.len(), 2);
        assert!(collision.blocks[0].indices().is_none());
        assert!(collision.blocks[1].points.is_empty());
    }

    #[test]
    fn truncated_points() {
        let mut body = quad_collision();
        body.truncate(body.len() - 2);
        assert!(read_collision(&body).0.is_err());
    }

    #[test]
    fn undersized_points_keep_sibling_blocks() {
        let quad = quad_collision();
        let mut w = Writer::new();
        w.u32(0xffffff).u32(2);
        // 4 vertices declared with 4 bytes each, too small for a triple
        w.u32(1).u32(POINTS_VERTICES).u16(4).u16(4).zeros(16);
        // The quad's block, without its collision header
        w.raw(&quad[8..]);
        let (collision, warnings) = read_collision(&w.finish());
        let collision = collision.unwrap();

        assert_eq!(collision.blocks.len(), 2);
        let bad = &collision.blocks[0];
        assert_eq!(bad.points[0].size(), 24);
        assert!(matches!(bad.points[0].data, PointsData::Other(ref r) if r.len() == 16));
        assert!(bad.vertices().is_none());
        assert!(matches!(warnings[..], [DecodeError::Structural { offset: 12, .. }]));

        assert_eq!(collision.blocks[1].vertices().unwrap().len(), 4);
        assert_eq!(collision.blocks[1].indices().unwrap().len(), 2);
    }
}
