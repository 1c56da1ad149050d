/// A single 8-bit per channel RGBA color, as stored in texture palettes and material colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RGBA8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RGBA8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for RGBA8 {
    #[inline]
    fn from(value: [u8; 4]) -> Self {
        Self::from_array(value)
    }
}

impl Into<[u8; 4]> for RGBA8 {
    #[inline]
    fn into(self) -> [u8; 4] {
        self.to_array()
    }
}
