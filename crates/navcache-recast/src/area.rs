/// Per-triangle terrain classification written into the recast mesh.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AreaType {
    Null = 0,
    Water = 1,
    Door = 2,
    Pathgrid = 3,
    #[default]
    Ground = 63,
}

impl AreaType {
    pub const ALL: [AreaType; 5] = [
        AreaType::Null,
        AreaType::Water,
        AreaType::Door,
        AreaType::Pathgrid,
        AreaType::Ground,
    ];

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(AreaType::Null),
            1 => Some(AreaType::Water),
            2 => Some(AreaType::Door),
            3 => Some(AreaType::Pathgrid),
            63 => Some(AreaType::Ground),
            _ => None,
        }
    }

    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, AreaType::Null)
    }
}
