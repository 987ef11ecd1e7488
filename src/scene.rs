use cgmath::{InnerSpace, Point3, Vector3};
use rand::Rng;
use winit::event::WindowEvent;

use crate::camera::{OrbitCamera, OrbitController, Projection};
use crate::color::{hex, Rgb};
use crate::scheduler::FrameTick;
use crate::terrain::{Block, FloatingIsland, IslandMotion, TerrainBuilder};

pub const BACKGROUND: Rgb = hex(0x0a0a12);
pub const FIELD_OF_VIEW_DEG: f32 = 60.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

pub const TREE_ANCHORS: [(i32, i32); 3] = [(-4, -4), (5, 3), (-3, 5)];

struct IslandSpec {
    anchor: [f32; 3],
    size: i32,
    motion: IslandMotion,
}

const ISLANDS: [IslandSpec; 2] = [
    IslandSpec {
        anchor: [-8.0, 8.0, -8.0],
        size: 2,
        motion: IslandMotion {
            amplitude: 0.5,
            frequency: 1.0,
            phase: 0.0,
            spin_rate: 0.1,
        },
    },
    IslandSpec {
        anchor: [10.0, 6.0, -5.0],
        size: 1,
        motion: IslandMotion {
            amplitude: 0.3,
            frequency: 0.8,
            phase: 1.0,
            spin_rate: 0.0,
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: [f32; 3],
    pub sun_direction: Vector3<f32>,
    pub sun_color: [f32; 3],
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: hex(0x404040).linear_scaled(0.6),
            sun_direction: Vector3::new(10.0, 20.0, 10.0).normalize(),
            sun_color: hex(0x00d4aa).linear_scaled(0.8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: BACKGROUND,
            near: 10.0,
            far: 50.0,
        }
    }
}

/// Voxel terrain demo: static mound and trees, bobbing islands, orbit camera.
pub struct VoxelScene {
    static_blocks: Vec<Block>,
    islands: Vec<FloatingIsland>,
    camera: OrbitCamera,
    controller: OrbitController,
    eye: Point3<f32>,
    lighting: Lighting,
    fog: Fog,
}

impl VoxelScene {
    pub fn compose(builder: &TerrainBuilder, rng: &mut impl Rng) -> anyhow::Result<Self> {
        let mut static_blocks = builder.build_terrain();
        for (x, z) in TREE_ANCHORS {
            static_blocks.extend(builder.build_tree(x, z));
        }

        let islands = ISLANDS
            .iter()
            .map(|spec| {
                let [x, y, z] = spec.anchor;
                FloatingIsland::generate(Vector3::new(x, y, z), spec.size, spec.motion, rng)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let camera = OrbitCamera::default();
        Ok(Self {
            static_blocks,
            islands,
            eye: camera.position(),
            camera,
            controller: OrbitController::new(),
            lighting: Lighting::default(),
            fog: Fog::default(),
        })
    }

    pub fn static_blocks(&self) -> &[Block] {
        &self.static_blocks
    }

    pub fn islands(&self) -> &[FloatingIsland] {
        &self.islands
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn fog(&self) -> &Fog {
        &self.fog
    }

    pub fn block_count(&self) -> usize {
        self.static_blocks.len() + self.islands.iter().map(|i| i.blocks().len()).sum::<usize>()
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_events(event, &mut self.camera)
    }

    #[cfg(test)]
    pub fn controller_mut(&mut self) -> (&mut OrbitController, &mut OrbitCamera) {
        (&mut self.controller, &mut self.camera)
    }

    /// Camera follows the orbit every tick; islands move on beat frames only.
    pub fn advance(&mut self, tick: FrameTick, time_seconds: f32) {
        self.eye = self.camera.position();
        if tick.on_beat {
            for island in &mut self.islands {
                island.animate(time_seconds);
            }
        }
    }

    /// Built from the eye of the last tick, so hidden frames keep the view.
    pub fn view_projection(&self, projection: &Projection) -> cgmath::Matrix4<f32> {
        projection.build_matrix() * OrbitCamera::look_from(self.eye)
    }
}
