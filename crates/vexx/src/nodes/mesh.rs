//! Mesh bodies
//!
//! A mesh body starts with a 48-byte header, followed either by a material table and a list of
//! geometry chunks, or (for meshes stored elsewhere) by an external id and a list of chunk links.
//!
//! Each geometry chunk is a ready to draw PSP GU vertex buffer:
//! ```c
//! struct MeshChunk {
//!     u16 signature;
//!     u8 material_id;
//!     u8 unknown1;
//!     u16 stride_count1;
//!     u16 stride_count2;
//!     u8 primitive;       // GU primitive type
//!     u8 unknown2;
//!     u16 vtype;          // see `stride`
//!     u16 size1;          // chunk size, minus the 64 bytes of header and metadata
//!     u16 size2;
//!     u8 metadata[48];
//!     Vertex group1[stride_count1];
//!     // padding to 16 bytes
//!     Vertex group2[stride_count2];
//!     // padding to 16 bytes
//! };
//! ```

use super::{Aabb, DecodeContext};
use crate::{
    error::DecodeError,
    range::ByteRange,
    stride::{Channel, VertexFormat},
};
use glam::{Vec2, Vec3};
use vexx_utils::align;

/// Value of the header's reserved field marking an external mesh.
const EXTERNAL_MARKER: u16 = 0xff00;

/// GU primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Sprites,
    Unknown(u8),
}

impl From<u8> for PrimitiveType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineStrip,
            3 => Self::Triangles,
            4 => Self::TriangleStrip,
            5 => Self::TriangleFan,
            6 => Self::Sprites,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshHeader {
    pub mesh_type: u16,
    pub mesh_count: u16,
    pub length1: u32,
    pub length2: u32,
    pub unknown: u16,
    pub reserved: u16,
    pub aabb: Aabb,
}

impl MeshHeader {
    pub const SIZE: usize = 48;

    pub fn read(body: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            mesh_type: body.u16(0)?,
            mesh_count: body.u16(2)?,
            length1: body.u32(4)?,
            length2: body.u32(8)?,
            unknown: body.u16(12)?,
            reserved: body.u16(14)?,
            aabb: Aabb::read_f32(body, 16)?,
        })
    }

    pub fn is_external(&self) -> bool {
        self.reserved == EXTERNAL_MARKER
    }

    /// Body offset of the first geometry chunk. Zero if the mesh has none.
    pub fn chunk_start(&self) -> usize {
        match self.length2 {
            0 => self.length1 as usize,
            n => n as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshMaterial {
    pub texture_id: u32,
}

impl MeshMaterial {
    pub const SIZE: usize = 20;
}

/// Reference to a chunk of an external mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLink {
    pub unknown: f32,
    pub uv: Vec2,
    pub quat1: [i16; 4],
    pub quat2: [i16; 4],
}

impl ChunkLink {
    pub const SIZE: usize = 64;

    fn read(range: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            unknown: range.f32(12)?,
            uv: Vec2::new(range.f32(16)?, range.f32(20)?),
            quat1: range.i16_array(24)?,
            quat2: [
                range.i16(48)?,
                range.i16(52)?,
                range.i16(56)?,
                range.i16(60)?,
            ],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub signature: u16,
    pub material_id: u8,
    pub unknown1: u8,
    pub stride_count1: u16,
    pub stride_count2: u16,
    pub primitive: PrimitiveType,
    pub unknown2: u8,
    pub vtype: u16,
    pub size1: u16,
    pub size2: u16,
}

impl ChunkHeader {
    pub const SIZE: usize = 16;

    fn read(range: &ByteRange) -> Result<Self, DecodeError> {
        Ok(Self {
            signature: range.u16(0)?,
            material_id: range.u8(2)?,
            unknown1: range.u8(3)?,
            stride_count1: range.u16(4)?,
            stride_count2: range.u16(6)?,
            primitive: range.u8(8)?.into(),
            unknown2: range.u8(9)?,
            vtype: range.u16(10)?,
            size1: range.u16(12)?,
            size2: range.u16(14)?,
        })
    }

    /// Size of the whole chunk, as declared by the chunk itself.
    pub fn declared_size(&self) -> usize {
        Self::SIZE + ChunkMetadata::SIZE + self.size1 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkMetadata {
    /// Present when positions are 16-bit fixed point.
    Scaled {
        scale: f32,
        unknown: f32,
        aabb: Aabb,
        padding: [u8; 8],
        floats: [f32; 4],
    },
    Raw([u8; 48]),
}

impl ChunkMetadata {
    pub const SIZE: usize = 48;

    fn read(range: &ByteRange, format: &VertexFormat) -> Result<Self, DecodeError> {
        match format.position.size {
            2 => Ok(Self::Scaled {
                scale: range.f32(0)?,
                unknown: range.f32(4)?,
                aabb: Aabb::read_i16(range, 8)?,
                padding: range.u8_array(24)?,
                floats: range.f32_array(32)?,
            }),
            _ => Ok(Self::Raw(range.u8_array(0)?)),
        }
    }

    pub fn scale(&self) -> f32 {
        match self {
            ChunkMetadata::Scaled { scale, .. } => *scale,
            ChunkMetadata::Raw(_) => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub uv: Option<Vec2>,
    pub color: Option<u32>,
    pub normal: Option<Vec3>,
    pub position: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshChunk {
    /// Absolute offset of the chunk
    pub offset: usize,
    pub header: ChunkHeader,
    pub format: VertexFormat,
    pub metadata: Option<ChunkMetadata>,
    pub group1: Vec<Vertex>,
    pub group2: Vec<Vertex>,
    /// Whether the declared chunk size matched its vertex layout. Invalid chunks carry no
    /// vertices.
    pub valid: bool,
}

/// Expected size of a chunk with the given layout, both vertex groups padded to 16 bytes.
pub fn expected_chunk_size(count1: usize, count2: usize, stride: usize) -> usize {
    let group2_start = align(ChunkHeader::SIZE + ChunkMetadata::SIZE + count1 * stride, 16);
    align(group2_start + count2 * stride, 16)
}

impl MeshChunk {
    fn read(ctx: &mut DecodeContext, range: &ByteRange) -> Result<Self, DecodeError> {
        let header = ChunkHeader::read(range)?;
        let format = VertexFormat::decode(header.vtype as u32, ctx.generation.vertex_alignment());
        let mut chunk = Self {
            offset: range.begin(),
            header,
            format,
            metadata: None,
            group1: Vec::new(),
            group2: Vec::new(),
            valid: false,
        };

        if chunk.header.vtype == 0 {
            ctx.warn(DecodeError::structural(
                chunk.offset,
                "mesh chunk has no vertex type",
            ));
            return Ok(chunk);
        }

        let count1 = chunk.header.stride_count1 as usize;
        let count2 = chunk.header.stride_count2 as usize;
        let stride = format.stride;
        let expected = expected_chunk_size(count1, count2, stride);
        let declared = chunk.header.declared_size();
        if expected != declared {
            ctx.warn(DecodeError::SizeMismatch {
                what: "mesh chunk",
                expected,
                found: declared,
            });
            return Ok(chunk);
        }

        let data = match range.slice(0, Some(declared)) {
            Ok(data) => data,
            Err(e) => {
                ctx.warn(e);
                return Ok(chunk);
            }
        };

        let metadata = ChunkMetadata::read(&data.slice(ChunkHeader::SIZE, None)?, &format)?;
        let scale = metadata.scale();
        let group1_start = ChunkHeader::SIZE + ChunkMetadata::SIZE;
        let group2_start = align(group1_start + count1 * stride, 16);

        chunk.group1 = read_vertices(&data, group1_start, count1, &format, scale)?;
        chunk.group2 = read_vertices(&data, group2_start, count2, &format, scale)?;
        chunk.metadata = Some(metadata);
        chunk.valid = true;
        Ok(chunk)
    }

    pub fn size(&self) -> usize {
        self.header.declared_size()
    }

    pub fn primitive(&self) -> PrimitiveType {
        self.header.primitive
    }

    /// Both vertex groups, in order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.group1.iter().chain(self.group2.iter())
    }
}

fn read_vertices(
    data: &ByteRange,
    start: usize,
    count: usize,
    format: &VertexFormat,
    scale: f32,
) -> Result<Vec<Vertex>, DecodeError> {
    let records = data.slice(start, Some(count * format.stride))?;
    (0..count)
        .map(|i| read_vertex(&records, i, format, scale))
        .collect()
}

fn read_vertex(
    r: &ByteRange,
    index: usize,
    format: &VertexFormat,
    scale: f32,
) -> Result<Vertex, DecodeError> {
    let stride = format.stride;

    let uv_element = |c: &Channel, e: usize| -> Result<f32, DecodeError> {
        let offset = c.element_offset(stride, index, e);
        Ok(match c.size {
            1 => r.i8(offset)? as f32 + 128.0,
            2 => r.i16(offset)? as f32 + 32768.0,
            _ => r.f32(offset)?,
        })
    };
    let normal_element = |c: &Channel, e: usize| -> Result<f32, DecodeError> {
        let offset = c.element_offset(stride, index, e);
        Ok(match c.size {
            1 => r.i8(offset)? as f32,
            2 => r.i16(offset)? as f32,
            _ => r.f32(offset)?,
        })
    };
    let position_element = |c: &Channel, e: usize| -> Result<f32, DecodeError> {
        let offset = c.element_offset(stride, index, e);
        Ok(match c.size {
            1 => r.i8(offset)? as f32 + 128.0,
            2 => r.i16(offset)? as f32 * scale / 32767.0,
            _ => r.f32(offset)?,
        })
    };

    let mut vertex = Vertex::default();

    if format.texture.is_present() {
        let c = &format.texture;
        vertex.uv = Some(Vec2::new(uv_element(c, 0)?, uv_element(c, 1)?));
    }

    if format.color.is_present() {
        let offset = format.color.element_offset(stride, index, 0);
        vertex.color = Some(match format.color.size {
            2 => r.u16(offset)? as u32,
            _ => r.u32(offset)?,
        });
    }

    if format.normal.is_present() {
        let c = &format.normal;
        vertex.normal = Some(Vec3::new(
            normal_element(c, 0)?,
            normal_element(c, 1)?,
            normal_element(c, 2)?,
        ));
    }

    if format.position.is_present() {
        let c = &format.position;
        vertex.position = Some(Vec3::new(
            position_element(c, 0)?,
            position_element(c, 1)?,
            position_element(c, 2)?,
        ));
    }

    Ok(vertex)
}

/// Decoded mesh body.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub header: MeshHeader,
    pub materials: Vec<MeshMaterial>,
    pub chunks: Vec<MeshChunk>,
    /// Set for meshes whose geometry lives in another file
    pub external_id: Option<u32>,
    pub links: Vec<ChunkLink>,
}

impl Mesh {
    pub fn read(ctx: &mut DecodeContext, body: &ByteRange) -> Result<Self, DecodeError> {
        let header = MeshHeader::read(body)?;
        let mut mesh = Self {
            header,
            materials: Vec::new(),
            chunks: Vec::new(),
            external_id: None,
            links: Vec::new(),
        };

        if mesh.header.is_external() {
            mesh.external_id = Some(body.u32(MeshHeader::SIZE)?);
            let mut links = body.slice((2 * MeshHeader::SIZE).min(body.len()), None)?;
            while links.len() > ChunkLink::SIZE {
                mesh.links.push(ChunkLink::read(&links)?);
                links = links.slice(ChunkLink::SIZE, None)?;
            }
            return Ok(mesh);
        }

        for i in 0..mesh.header.mesh_count as usize {
            let offset = MeshHeader::SIZE + i * MeshMaterial::SIZE;
            let record = body.slice(offset, Some(MeshMaterial::SIZE))?;
            mesh.materials.push(MeshMaterial {
                texture_id: record.u32(4)?,
            });
        }

        let start = mesh.header.chunk_start();
        if start == 0 {
            ctx.warn(DecodeError::structural(
                body.begin(),
                "mesh declares no chunk data",
            ));
            return Ok(mesh);
        }

        let mut chunks = match body.slice(start, None) {
            Ok(chunks) => chunks,
            Err(e) => {
                ctx.warn(e);
                return Ok(mesh);
            }
        };

        while chunks.len() > ChunkHeader::SIZE + ChunkMetadata::SIZE {
            if mesh.chunks.len() >= ctx.options.max_mesh_chunks {
                ctx.warn(DecodeError::LimitReached {
                    what: "mesh chunk",
                    limit: ctx.options.max_mesh_chunks,
                });
                break;
            }

            let chunk = MeshChunk::read(ctx, &chunks)?;
            let material = chunk.header.material_id as usize;
            if material >= mesh.materials.len() {
                ctx.warn(DecodeError::IndexOutOfRange {
                    what: "mesh chunk material",
                    index: material,
                    len: mesh.materials.len(),
                });
                break;
            }

            let size = chunk.size();
            mesh.chunks.push(chunk);
            chunks = match chunks.slice(size, None) {
                Ok(rest) => rest,
                Err(_) => break,
            };
        }

        Ok(mesh)
    }

    pub fn is_external(&self) -> bool {
        self.external_id.is_some()
    }
}
