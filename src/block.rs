use crate::color::{hex, Rgb};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    Grass,
    Dirt,
    Stone,
    Wood,
    Leaves,
    Water,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockFace {
    Top,
    Bottom,
    North,
    South,
    East,
    West,
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Top,
        BlockFace::Bottom,
        BlockFace::North,
        BlockFace::South,
        BlockFace::East,
        BlockFace::West,
    ];

    pub fn normal(self) -> cgmath::Vector3<i32> {
        match self {
            BlockFace::Top => cgmath::Vector3::new(0, 1, 0),
            BlockFace::Bottom => cgmath::Vector3::new(0, -1, 0),
            BlockFace::North => cgmath::Vector3::new(0, 0, -1),
            BlockFace::South => cgmath::Vector3::new(0, 0, 1),
            BlockFace::East => cgmath::Vector3::new(1, 0, 0),
            BlockFace::West => cgmath::Vector3::new(-1, 0, 0),
        }
    }

    pub fn normal_f32(self) -> [f32; 3] {
        let n = self.normal();
        [n.x as f32, n.y as f32, n.z as f32]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BlockInfo {
    pub name: &'static str,
    pub color: Rgb,
    pub opacity: f32,
    pub occludes: bool,
}

pub const VARIANT_COUNT: usize = 6;

const BLOCK_INFOS: [BlockInfo; VARIANT_COUNT] = [
    BlockInfo {
        name: "Grass",
        color: hex(0x4ade80),
        opacity: 1.0,
        occludes: true,
    },
    BlockInfo {
        name: "Dirt",
        color: hex(0x8b5a2b),
        opacity: 1.0,
        occludes: true,
    },
    BlockInfo {
        name: "Stone",
        color: hex(0x6b7280),
        opacity: 1.0,
        occludes: true,
    },
    BlockInfo {
        name: "Wood",
        color: hex(0x5c4033),
        opacity: 1.0,
        occludes: true,
    },
    BlockInfo {
        name: "Leaves",
        color: hex(0x228b22),
        opacity: 1.0,
        occludes: true,
    },
    BlockInfo {
        name: "Water",
        color: hex(0x00d4aa),
        opacity: 0.7,
        occludes: false,
    },
];

impl BlockType {
    fn info(self) -> &'static BlockInfo {
        &BLOCK_INFOS[self as usize]
    }

    pub fn occludes(self) -> bool {
        self.info().occludes
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Linear RGBA used for the block's lambert material.
    pub fn color(self) -> [f32; 4] {
        let info = self.info();
        info.color.with_alpha(info.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_table_lines_up_with_variants() {
        assert_eq!(BlockType::Grass.name(), "Grass");
        assert_eq!(BlockType::Leaves.name(), "Leaves");
        assert_eq!(BlockType::Water.name(), "Water");
    }

    #[test]
    fn only_water_is_translucent() {
        assert!(BlockType::Water.color()[3] < 1.0);
        assert!(!BlockType::Water.occludes());
        assert!(BlockType::Stone.occludes());
    }
}
