use std::collections::HashMap;

use crate::block::{BlockFace, BlockType};
use crate::terrain::{Block, BlockPos};

const HALF_BLOCK: f32 = 0.5;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 6
    }

    fn push_quad(&mut self, quad: [Vertex; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Resolves overlapping placements: the first block placed in a cell keeps it.
pub fn occupancy(blocks: &[Block]) -> HashMap<BlockPos, BlockType> {
    let mut cells = HashMap::with_capacity(blocks.len());
    for block in blocks {
        cells.entry(block.pos).or_insert(block.kind);
    }
    cells
}

/// Meshes a group of unit cubes, skipping faces hidden by an opaque neighbour
/// of the same group.
pub fn generate_block_mesh(blocks: &[Block]) -> MeshData {
    let cells = occupancy(blocks);
    let mut mesh = MeshData::new();

    let mut ordered: Vec<(&BlockPos, &BlockType)> = cells.iter().collect();
    ordered.sort_by_key(|(pos, _)| (pos.y, pos.x, pos.z));

    for (&pos, &kind) in ordered {
        for face in BlockFace::ALL {
            let n = face.normal();
            let neighbour = pos.offset(n.x, n.y, n.z);
            let hidden = match cells.get(&neighbour) {
                Some(other) => other.occludes() || *other == kind,
                None => false,
            };
            if !hidden {
                mesh.push_quad(build_face(face, kind, pos));
            }
        }
    }

    mesh
}

fn build_face(face: BlockFace, block: BlockType, pos: BlockPos) -> [Vertex; 4] {
    let normal = face.normal_f32();
    let color = block.color();
    let h = HALF_BLOCK;
    let (ox, oy, oz) = (pos.x as f32, pos.y as f32, pos.z as f32);

    let corners = match face {
        BlockFace::Top => [
            [ox - h, oy + h, oz - h],
            [ox - h, oy + h, oz + h],
            [ox + h, oy + h, oz + h],
            [ox + h, oy + h, oz - h],
        ],
        BlockFace::Bottom => [
            [ox - h, oy - h, oz - h],
            [ox + h, oy - h, oz - h],
            [ox + h, oy - h, oz + h],
            [ox - h, oy - h, oz + h],
        ],
        BlockFace::North => [
            [ox - h, oy - h, oz - h],
            [ox - h, oy + h, oz - h],
            [ox + h, oy + h, oz - h],
            [ox + h, oy - h, oz - h],
        ],
        BlockFace::South => [
            [ox + h, oy - h, oz + h],
            [ox + h, oy + h, oz + h],
            [ox - h, oy + h, oz + h],
            [ox - h, oy - h, oz + h],
        ],
        BlockFace::East => [
            [ox + h, oy - h, oz - h],
            [ox + h, oy + h, oz - h],
            [ox + h, oy + h, oz + h],
            [ox + h, oy - h, oz + h],
        ],
        BlockFace::West => [
            [ox - h, oy - h, oz + h],
            [ox - h, oy + h, oz + h],
            [ox - h, oy + h, oz - h],
            [ox - h, oy - h, oz - h],
        ],
    };

    corners.map(|position| Vertex {
        position,
        normal,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x: i32, y: i32, z: i32, kind: BlockType) -> Block {
        Block::new(BlockPos::new(x, y, z), kind)
    }

    #[test]
    fn empty_group_has_no_geometry() {
        let mesh = generate_block_mesh(&[]);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.vertices.is_empty());
        assert_eq!(MeshData::default().face_count(), 0);
    }

    #[test]
    fn lone_block_has_six_faces() {
        let mesh = generate_block_mesh(&[block(0, 0, 0, BlockType::Stone)]);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
    }

    #[test]
    fn shared_face_between_solids_is_culled() {
        let mesh = generate_block_mesh(&[
            block(0, 0, 0, BlockType::Stone),
            block(1, 0, 0, BlockType::Dirt),
        ]);
        assert_eq!(mesh.face_count(), 10);
    }

    #[test]
    fn water_does_not_hide_neighbours() {
        let mesh = generate_block_mesh(&[
            block(0, 0, 0, BlockType::Stone),
            block(0, 1, 0, BlockType::Water),
        ]);
        // stone keeps its top face, water loses its bottom face to stone
        assert_eq!(mesh.face_count(), 11);
    }

    #[test]
    fn duplicate_cells_keep_first_block() {
        let cells = occupancy(&[
            block(0, 4, 0, BlockType::Wood),
            block(0, 4, 0, BlockType::Leaves),
        ]);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[&BlockPos::new(0, 4, 0)], BlockType::Wood);
    }

    #[test]
    fn face_vertices_sit_on_the_face_plane() {
        let mesh = generate_block_mesh(&[block(2, 3, -1, BlockType::Grass)]);
        for vertex in &mesh.vertices {
            let [nx, ny, nz] = vertex.normal;
            let [px, py, pz] = vertex.position;
            let along = (px - 2.0) * nx + (py - 3.0) * ny + (pz + 1.0) * nz;
            assert!((along - 0.5).abs() < 1e-6);
        }
    }
}
