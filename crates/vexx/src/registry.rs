//! Node type tables for both format generations
//!
//! The same conceptual kind of node carries a different numeric tag depending on the game the
//! file comes from. Older titles (file versions 3 and 4) number the engine's base kinds one lower
//! than version 6 files, while the game specific kinds starting at `0x3b9` share their values.
//! A couple of kinds only ever appear in version 6 files.

use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Format generation, determined by the file's version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    V4,
    V6,
}

impl Generation {
    pub fn from_version(version: u32) -> Option<Self> {
        match version {
            3 | 4 => Some(Self::V4),
            6 => Some(Self::V6),
            _ => None,
        }
    }

    /// Alignment of mesh vertex records.
    pub fn vertex_alignment(self) -> usize {
        match self {
            Generation::V4 => 4,
            Generation::V6 => 1,
        }
    }

    fn table(self) -> &'static AHashMap<u32, NodeType> {
        match self {
            Generation::V4 => &V4_TYPES,
            Generation::V6 => &V6_TYPES,
        }
    }
}

macro_rules! node_types {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Conceptual kind of a node, independent of its generation specific tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeType {
            $($variant),*
        }

        impl NodeType {
            pub const ALL: &'static [NodeType] = &[$(NodeType::$variant),*];

            /// Display name, as used by the game's own tooling.
            pub const fn name(self) -> &'static str {
                match self {
                    $(NodeType::$variant => $name),*
                }
            }
        }
    };
}

node_types! {
    Group => "GROUP",
    Transform => "TRANSFORM",
    World => "WORLD",
    Camera => "CAMERA",
    CurveShape => "CURVE_SHAPE",
    NurbsSurface => "NURBS_SURFACE",
    Mesh => "MESH",
    AmbientLight => "AMBIENT_LIGHT",
    DirectionalLight => "DIRECTIONAL_LIGHT",
    PointLight => "POINT_LIGHT",
    LodGroup => "LOD_GROUP",
    FloorCollision => "FLOOR_COLLISION",
    WallCollision => "WALL_COLLISION",
    WoTrack => "WO_TRACK",
    StartPosition => "START_POSITION",
    SpeedupPad => "SPEEDUP_PAD",
    WeaponPad => "WEAPON_PAD",
    EngineFlare => "ENGINE_FLARE",
    AnimTransform => "ANIM_TRANSFORM",
    Texture => "TEXTURE",
    DynamicPointLight => "DYNAMIC_POINT_LIGHT",
    DynamicShadowOccluder => "DYNAMIC_SHADOW_OCCLUDER",
    ParticleSystem => "PARTICLE_SYSTEM",
    Airbrake => "AIRBRAKE",
    Skycube => "SKYCUBE",
    Quake => "QUAKE",
    Trail => "TRAIL",
    Section => "SECTION",
    Gate => "GATE",
    Shadow => "SHADOW",
    Speaker => "SPEAKER",
    ResetCollision => "RESET_COLLISION",
    WoSpot => "WO_SPOT",
    WoPoint => "WO_POINT",
    ShipCollisionFx => "SHIP_COLLISION_FX",
    FogCube => "FOG_CUBE",
    MeshNodeGhost => "MESH_NODE_GHOST",
    Seaweed => "SEAWEED",
    Sea => "SEA",
    SeaReflect => "SEA_REFLECT",
    CloudCube => "CLOUD_CUBE",
    CloudGroup => "CLOUD_GROUP",
    WeatherPosition => "WEATHER_POSITION",
    Unused1 => "UNUSED_1",
    AnimationTrigger => "ANIMATION_TRIGGER",
    GridCamera => "GRID_CAMERA",
    LensFlare => "LENS_FLARE",
    TextureBlob => "TEXTURE_BLOB",
    Blob => "BLOB",
    Sound => "SOUND",
    ShipMuzzle => "SHIP_MUZZLE",
    ExitGlow => "EXIT_GLOW",
    EngineFire => "ENGINE_FIRE",
    MagFloorCollision => "MAG_FLOOR_COLLISION",
    CageCollision => "CAGE_COLLISION",
    SoundCone => "SOUND_CONE",
    CanonFlash => "CANON_FLASH",
    WingTip => "WING_TIP",
    TrackWallCollision => "TRACK_WALL_COLLISION",
    Absorb => "ABSORB",
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds shared by both generations, with identical tags.
const SHARED_TAGS: &[(u32, NodeType)] = &[
    (0x000, NodeType::Group),
    (0x3b9, NodeType::FloorCollision),
    (0x3ba, NodeType::WallCollision),
    (0x3bb, NodeType::WoTrack),
    (0x3bc, NodeType::StartPosition),
    (0x3bd, NodeType::SpeedupPad),
    (0x3be, NodeType::WeaponPad),
    (0x3bf, NodeType::EngineFlare),
    (0x3c0, NodeType::AnimTransform),
    (0x3c1, NodeType::Texture),
    (0x3c2, NodeType::DynamicPointLight),
    (0x3c3, NodeType::DynamicShadowOccluder),
    (0x3c4, NodeType::ParticleSystem),
    (0x3c5, NodeType::Airbrake),
    (0x3c6, NodeType::Skycube),
    (0x3c7, NodeType::Quake),
    (0x3c8, NodeType::Trail),
    (0x3c9, NodeType::Section),
    (0x3ca, NodeType::Gate),
    (0x3cb, NodeType::Shadow),
    (0x3cc, NodeType::Speaker),
    (0x3cd, NodeType::ResetCollision),
    (0x3ce, NodeType::WoSpot),
    (0x3cf, NodeType::WoPoint),
    (0x3d0, NodeType::ShipCollisionFx),
    (0x3d3, NodeType::FogCube),
    (0x3d4, NodeType::MeshNodeGhost),
    (0x3d5, NodeType::Seaweed),
    (0x3d6, NodeType::Sea),
    (0x3d7, NodeType::SeaReflect),
    (0x3d8, NodeType::CloudCube),
    (0x3d9, NodeType::CloudGroup),
    (0x3da, NodeType::WeatherPosition),
    (0x3db, NodeType::Unused1),
    (0x3dc, NodeType::AnimationTrigger),
    (0x3dd, NodeType::GridCamera),
    (0x3de, NodeType::LensFlare),
    (0x3df, NodeType::TextureBlob),
    (0x3e0, NodeType::Blob),
    (0x3e1, NodeType::Sound),
    (0x3e2, NodeType::ShipMuzzle),
    (0x3e4, NodeType::ExitGlow),
    (0x3e5, NodeType::EngineFire),
];

const V4_TAGS: &[(u32, NodeType)] = &[
    (0x06d, NodeType::Transform),
    (0x0f3, NodeType::World),
    (0x0f6, NodeType::Camera),
    (0x100, NodeType::CurveShape),
    (0x122, NodeType::NurbsSurface),
    (0x124, NodeType::Mesh),
    (0x12b, NodeType::AmbientLight),
    (0x130, NodeType::DirectionalLight),
    (0x2ed, NodeType::LodGroup),
];

const V6_TAGS: &[(u32, NodeType)] = &[
    (0x06e, NodeType::Transform),
    (0x0f4, NodeType::World),
    (0x0f7, NodeType::Camera),
    (0x101, NodeType::CurveShape),
    (0x123, NodeType::NurbsSurface),
    (0x125, NodeType::Mesh),
    (0x12c, NodeType::AmbientLight),
    (0x131, NodeType::DirectionalLight),
    (0x132, NodeType::PointLight),
    (0x2ee, NodeType::LodGroup),
    (0x3e6, NodeType::MagFloorCollision),
    (0x3e7, NodeType::CageCollision),
    (0x3e9, NodeType::SoundCone),
    (0x3eb, NodeType::CanonFlash),
    (0x3ec, NodeType::WingTip),
    (0x3ed, NodeType::TrackWallCollision),
    (0x3ee, NodeType::Absorb),
];

static V4_TYPES: Lazy<AHashMap<u32, NodeType>> =
    Lazy::new(|| SHARED_TAGS.iter().chain(V4_TAGS).copied().collect());

static V6_TYPES: Lazy<AHashMap<u32, NodeType>> =
    Lazy::new(|| SHARED_TAGS.iter().chain(V6_TAGS).copied().collect());

/// Looks up the kind registered for `tag` in the given generation.
pub fn lookup(generation: Generation, tag: u32) -> Option<NodeType> {
    generation.table().get(&tag).copied()
}

/// Reverse lookup, returns the tag used by `node_type` in the given generation, if the kind exists
/// there at all.
pub fn tag_of(generation: Generation, node_type: NodeType) -> Option<u32> {
    generation
        .table()
        .iter()
        .find(|&(_, &ty)| ty == node_type)
        .map(|(&tag, _)| tag)
}
