use anyhow::ensure;
use cgmath::{Matrix4, Rad, Vector3};
use rand::Rng;

use crate::block::BlockType;

pub const DEFAULT_TERRAIN_EXTENT: i32 = 8;
pub const TERRAIN_BASE_Y: i32 = -2;
const PEAK_HEIGHT: f32 = 3.0;
const HEIGHT_FALLOFF: f32 = 0.3;
const DIRT_DEPTH: i32 = 2;

pub const TRUNK_HEIGHT: i32 = 4;
/// The trunk starts this many units above the grid's y = 0 plane.
const TRUNK_BASE_Y: i32 = 1;
const CANOPY_BASE_Y: i32 = TRUNK_BASE_Y + TRUNK_HEIGHT - 1;
const CANOPY_HALF_WIDTH: i32 = 2;
const CANOPY_LAYERS: i32 = 3;
const CANOPY_MANHATTAN_LIMIT: i32 = 3;

/// Chance that any one cell of a floating island's cuboid holds a block.
pub const ISLAND_INCLUSION_PROBABILITY: f64 = 0.7;
const ISLAND_HALF_HEIGHT: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub pos: BlockPos,
    pub kind: BlockType,
}

impl Block {
    pub const fn new(pos: BlockPos, kind: BlockType) -> Self {
        Self { pos, kind }
    }
}

/// Height of the terrain column at `(x, z)`: a mound peaking at the origin.
pub fn column_height(x: i32, z: i32) -> i32 {
    let dist = ((x * x + z * z) as f32).sqrt();
    ((PEAK_HEIGHT - dist * HEIGHT_FALLOFF).floor() as i32).max(0)
}

pub fn column_material(y: i32, height: i32) -> BlockType {
    if y == height {
        BlockType::Grass
    } else if y >= height - DIRT_DEPTH {
        BlockType::Dirt
    } else {
        BlockType::Stone
    }
}

/// Local leaf offsets of a canopy, relative to the canopy base above the trunk.
pub fn canopy_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
    (-CANOPY_HALF_WIDTH..=CANOPY_HALF_WIDTH).flat_map(|lx| {
        (0..CANOPY_LAYERS).flat_map(move |ly| {
            (-CANOPY_HALF_WIDTH..=CANOPY_HALF_WIDTH)
                .filter(move |lz| lx.abs() + ly.abs() + lz.abs() <= CANOPY_MANHATTAN_LIMIT)
                .map(move |lz| (lx, ly, lz))
        })
    })
}

#[derive(Debug, Clone, Copy)]
pub struct TerrainBuilder {
    extent: i32,
}

impl TerrainBuilder {
    pub fn new(extent: i32) -> anyhow::Result<Self> {
        ensure!(extent >= 1, "terrain extent must be at least 1, got {extent}");
        Ok(Self { extent })
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    pub fn build_terrain(&self) -> Vec<Block> {
        let side = (2 * self.extent + 1) as usize;
        let mut blocks = Vec::with_capacity(side * side * 4);

        for x in -self.extent..=self.extent {
            for z in -self.extent..=self.extent {
                let height = column_height(x, z);
                for y in TERRAIN_BASE_Y..=height {
                    blocks.push(Block::new(
                        BlockPos::new(x, y, z),
                        column_material(y, height),
                    ));
                }
            }
        }

        blocks
    }

    pub fn build_tree(&self, x: i32, z: i32) -> Vec<Block> {
        let mut blocks = Vec::new();

        for dy in 0..TRUNK_HEIGHT {
            blocks.push(Block::new(
                BlockPos::new(x, TRUNK_BASE_Y + dy, z),
                BlockType::Wood,
            ));
        }

        let canopy_base = BlockPos::new(x, CANOPY_BASE_Y, z);
        blocks.extend(
            canopy_offsets()
                .map(|(lx, ly, lz)| Block::new(canopy_base.offset(lx, ly, lz), BlockType::Leaves)),
        );

        blocks
    }
}

/// How a floating island bobs and spins over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IslandMotion {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
    pub spin_rate: f32,
}

#[derive(Debug, Clone)]
pub struct FloatingIsland {
    anchor: Vector3<f32>,
    size: i32,
    motion: IslandMotion,
    blocks: Vec<Block>,
    height: f32,
    rotation: Rad<f32>,
}

impl FloatingIsland {
    /// Scatters blocks over the island's cuboid; block positions are local to
    /// the anchor.
    pub fn generate(
        anchor: Vector3<f32>,
        size: i32,
        motion: IslandMotion,
        rng: &mut impl Rng,
    ) -> anyhow::Result<Self> {
        ensure!(size >= 1, "island half-size must be at least 1, got {size}");

        let mut blocks = Vec::new();
        for ix in -size..=size {
            for iy in -ISLAND_HALF_HEIGHT..=ISLAND_HALF_HEIGHT {
                for iz in -size..=size {
                    if !rng.gen_bool(ISLAND_INCLUSION_PROBABILITY) {
                        continue;
                    }
                    let kind = if iy == ISLAND_HALF_HEIGHT {
                        BlockType::Grass
                    } else {
                        BlockType::Stone
                    };
                    blocks.push(Block::new(BlockPos::new(ix, iy, iz), kind));
                }
            }
        }

        Ok(Self {
            anchor,
            size,
            motion,
            blocks,
            height: anchor.y,
            rotation: Rad(0.0),
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn anchor(&self) -> Vector3<f32> {
        self.anchor
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn rotation(&self) -> Rad<f32> {
        self.rotation
    }

    pub fn animate(&mut self, time_seconds: f32) {
        let motion = self.motion;
        self.height = self.anchor.y
            + (time_seconds * motion.frequency + motion.phase).sin() * motion.amplitude;
        if motion.spin_rate != 0.0 {
            self.rotation = Rad(time_seconds * motion.spin_rate);
        }
    }

    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(self.anchor.x, self.height, self.anchor.z))
            * Matrix4::from_angle_y(self.rotation)
    }
}
