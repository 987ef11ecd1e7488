mod block;
mod camera;
mod color;
mod config;
mod mesh;
mod overlay;
mod particles;
mod renderer;
mod scene;
mod scheduler;
mod terrain;

use std::collections::BTreeMap;
use std::time::Instant;

use cgmath::{Matrix4, SquareMatrix};
use clap::Parser;
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::camera::Projection;
use crate::config::{Cli, SceneKind, ShowcaseConfig};
use crate::mesh::generate_block_mesh;
use crate::overlay::QuadBatch;
use crate::particles::{RisingBlocks, SkyField, Viewport};
use crate::renderer::{MeshHandle, Renderer};
use crate::scene::{VoxelScene, BACKGROUND, FAR_PLANE, FIELD_OF_VIEW_DEG, NEAR_PLANE};
use crate::scheduler::FrameScheduler;
use crate::terrain::TerrainBuilder;

enum ActiveScene {
    Sky(SkyField),
    Blocks(RisingBlocks),
    Terrain(VoxelScene),
}

struct State<'window> {
    window: &'window Window,
    renderer: Option<Renderer<'window>>,
    scene: ActiveScene,
    scheduler: FrameScheduler,
    projection: Projection,
    batch: QuadBatch,
    overlay_dirty: bool,
    island_meshes: Vec<Option<MeshHandle>>,
    occluded: bool,
    minimized: bool,
    started: Instant,
}

impl<'window> State<'window> {
    fn new(window: &'window Window, config: &ShowcaseConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let projection = Projection::new(
            size.width,
            size.height,
            FIELD_OF_VIEW_DEG.to_radians(),
            NEAR_PLANE,
            FAR_PLANE,
        );
        let viewport = Viewport::new(size.width as f32, size.height as f32);
        let mut rng = config.rng();

        let mut renderer = match Renderer::new(window) {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                log::warn!("rendering unavailable, scene stays inert: {err:#}");
                None
            }
        };

        let scene = match config.scene {
            SceneKind::Sky => {
                let field = SkyField::new(viewport, rng);
                log::info!(
                    "sky: {} stars under {} clouds",
                    field.stars().len(),
                    field.clouds().len()
                );
                ActiveScene::Sky(field)
            }
            SceneKind::Blocks => {
                let field = RisingBlocks::new(viewport, rng);
                log::info!("blocks: {} rising squares", field.blocks().len());
                ActiveScene::Blocks(field)
            }
            SceneKind::Terrain => {
                let builder = TerrainBuilder::new(config.extent)?;
                let voxels = VoxelScene::compose(&builder, &mut rng)?;
                log::info!(
                    "terrain extent {}: {} blocks, {} floating islands",
                    builder.extent(),
                    voxels.block_count(),
                    voxels.islands().len()
                );
                ActiveScene::Terrain(voxels)
            }
        };

        let mut island_meshes = Vec::new();
        if let ActiveScene::Terrain(voxels) = &scene {
            let mut mix: BTreeMap<&str, usize> = BTreeMap::new();
            for block in voxels.static_blocks() {
                *mix.entry(block.kind.name()).or_default() += 1;
            }
            log::debug!("static block mix: {mix:?}");
            for island in voxels.islands() {
                log::debug!(
                    "island at {:?}, half-size {}, {} blocks",
                    island.anchor(),
                    island.size(),
                    island.blocks().len()
                );
            }

            let static_mesh = generate_block_mesh(voxels.static_blocks());
            log::debug!("static mesh: {} faces", static_mesh.face_count());
            if let Some(renderer) = renderer.as_mut() {
                renderer.upload_mesh(&static_mesh, Matrix4::identity());
                for island in voxels.islands() {
                    let mesh = generate_block_mesh(island.blocks());
                    island_meshes.push(renderer.upload_mesh(&mesh, island.transform()));
                }
            }
        }

        if let Some(renderer) = renderer.as_mut() {
            renderer.set_clear_color(BACKGROUND.linear());
        }

        let mut state = Self {
            window,
            renderer,
            scene,
            scheduler: FrameScheduler::new(),
            projection,
            batch: QuadBatch::new(viewport.width, viewport.height),
            overlay_dirty: false,
            island_meshes,
            occluded: false,
            minimized: size.width == 0 || size.height == 0,
            started: Instant::now(),
        };
        state.repaint_overlay();
        state.refresh_visibility();
        Ok(state)
    }

    fn window(&self) -> &Window {
        self.window
    }

    /// Pointer input only reaches the orbit camera once the renderer is up.
    fn input(&mut self, event: &WindowEvent) -> bool {
        match &mut self.scene {
            ActiveScene::Terrain(voxels) if self.renderer.is_some() => voxels.input(event),
            _ => false,
        }
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.minimized = new_size.width == 0 || new_size.height == 0;
        self.refresh_visibility();
        if self.minimized {
            return;
        }

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(new_size);
        }
        self.projection.resize(new_size.width, new_size.height);
        log::debug!(
            "resized to {}x{} (aspect {:.3})",
            new_size.width,
            new_size.height,
            self.projection.aspect()
        );

        let viewport = Viewport::new(new_size.width as f32, new_size.height as f32);
        match &mut self.scene {
            ActiveScene::Sky(field) => field.resize(viewport),
            ActiveScene::Blocks(field) => field.resize(viewport),
            ActiveScene::Terrain(_) => {}
        }
        self.repaint_overlay();
    }

    fn set_occluded(&mut self, occluded: bool) {
        self.occluded = occluded;
        self.refresh_visibility();
    }

    fn refresh_visibility(&mut self) {
        let ratio = if self.occluded || self.minimized {
            0.0
        } else {
            1.0
        };
        self.scheduler.observe_visibility(ratio);
    }

    fn repaint_overlay(&mut self) {
        match &self.scene {
            ActiveScene::Sky(field) => field.paint(&mut self.batch),
            ActiveScene::Blocks(field) => field.paint(&mut self.batch),
            ActiveScene::Terrain(_) => return,
        }
        self.overlay_dirty = true;
    }

    /// Advances one frame. Returns false while nothing should be drawn.
    fn update(&mut self) -> bool {
        if self.renderer.is_none() {
            return false;
        }
        let Some(tick) = self.scheduler.tick() else {
            return false;
        };

        let time_seconds = self.started.elapsed().as_secs_f32();
        let repaint = match &mut self.scene {
            ActiveScene::Sky(field) => field.advance(tick),
            ActiveScene::Blocks(field) => field.advance(tick),
            ActiveScene::Terrain(voxels) => {
                voxels.advance(tick, time_seconds);
                false
            }
        };
        if repaint {
            self.repaint_overlay();
        }
        true
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        match &self.scene {
            ActiveScene::Terrain(voxels) => {
                renderer.update_scene(
                    voxels.view_projection(&self.projection),
                    voxels.eye(),
                    voxels.lighting(),
                    voxels.fog(),
                );
                for (island, handle) in voxels.islands().iter().zip(&self.island_meshes) {
                    if let Some(handle) = handle {
                        renderer.update_model(*handle, island.transform());
                    }
                }
            }
            ActiveScene::Sky(_) | ActiveScene::Blocks(_) => {
                if self.overlay_dirty {
                    renderer.update_overlay(&self.batch);
                    self.overlay_dirty = false;
                }
            }
        }

        renderer.render()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ShowcaseConfig::from_cli(Cli::parse())?;
    match config.seed {
        Some(seed) => log::info!("opening {:?} scene with seed {seed}", config.scene),
        None => log::info!("opening {:?} scene with a random seed", config.scene),
    }

    let (width, height) = config.window_size;
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(config.scene.title())
        .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64))
        .build(&event_loop)?;

    let mut state = State::new(&window, &config)?;

    event_loop.run(move |event, target| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(physical_size) => state.resize(*physical_size),
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let new_size = state.window().inner_size();
                        state.resize(new_size)
                    }
                    WindowEvent::Occluded(occluded) => state.set_occluded(*occluded),
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = state.render() {
                            log::error!("render failed: {err:?}");
                            target.exit();
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::AboutToWait => {
            if state.update() {
                target.set_control_flow(ControlFlow::Poll);
                state.window().request_redraw();
            } else {
                target.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    })?;

    Ok(())
}
