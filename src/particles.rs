use std::f32::consts::TAU;

use rand::{rngs::SmallRng, Rng};

use crate::color::{hex, Rgb};
use crate::overlay::{stop, GradientStop, QuadBatch};
use crate::scheduler::FrameTick;

pub const CLOUD_COUNT: usize = 8;
pub const STAR_COUNT: usize = 50;
pub const BLOCK_COUNT: usize = 30;

const CLOUD_PIXEL: f32 = 8.0;
const CLOUD_BAND: f32 = 0.5;
const STAR_BAND: f32 = 0.6;
const BLOCK_SPAWN_DEPTH: f32 = 100.0;

const SKY_GRADIENT: [GradientStop; 4] = [
    stop(0.0, hex(0x0a0a1a)),
    stop(0.4, hex(0x1a1a3e)),
    stop(0.7, hex(0x2a2a5e)),
    stop(1.0, hex(0x0a0a12)),
];

const BLOCKS_GRADIENT: [GradientStop; 3] = [
    stop(0.0, hex(0x050508)),
    stop(0.5, hex(0x0a0a1a)),
    stop(1.0, hex(0x0a0a12)),
];

const BLOCK_PRIMARY: Rgb = hex(0x00d4aa);
const BLOCK_SECONDARY: Rgb = hex(0x00a884);
const BLOCK_HIGHLIGHT: Rgb = hex(0x4de8c8);
const WHITE: Rgb = hex(0xffffff);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cloud {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub opacity: f32,
    pub pixels: Vec<(f32, f32)>,
}

impl Cloud {
    fn spawn(viewport: Viewport, rng: &mut impl Rng) -> Self {
        let width = rng.gen_range(60.0..140.0);
        let height = rng.gen_range(30.0..60.0);
        Self {
            x: rng.gen_range(0.0..viewport.width),
            y: rng.gen_range(0.0..viewport.height * CLOUD_BAND),
            width,
            height,
            speed: rng.gen_range(0.2..0.5),
            opacity: rng.gen_range(0.1..0.3),
            pixels: cloud_pixels(width, height, rng),
        }
    }

    fn update(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        self.x += self.speed;
        if self.x > viewport.width + self.width {
            self.x = -self.width;
            self.y = rng.gen_range(0.0..viewport.height * CLOUD_BAND);
        }
    }

    fn paint(&self, batch: &mut QuadBatch) {
        let color = WHITE.with_alpha(self.opacity);
        for &(px, py) in &self.pixels {
            batch.add_rect(self.x + px, self.y + py, CLOUD_PIXEL, CLOUD_PIXEL, color);
        }
    }
}

/// Lights grid cells with a chance that falls off towards the cloud's edge.
fn cloud_pixels(width: f32, height: f32, rng: &mut impl Rng) -> Vec<(f32, f32)> {
    let cols = (width / CLOUD_PIXEL).floor() as i32;
    let rows = (height / CLOUD_PIXEL).floor() as i32;
    let half_cols = cols as f32 / 2.0;
    let half_rows = rows as f32 / 2.0;
    let max_dist = (half_cols * half_cols + half_rows * half_rows).sqrt().max(f32::EPSILON);

    let mut pixels = Vec::new();
    for i in 0..cols {
        for j in 0..rows {
            let dx = i as f32 - half_cols;
            let dy = j as f32 - half_rows;
            let dist = (dx * dx + dy * dy).sqrt();
            if rng.gen::<f32>() > dist / max_dist * 0.7 {
                pixels.push((i as f32 * CLOUD_PIXEL, j as f32 * CLOUD_PIXEL));
            }
        }
    }
    pixels
}

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    pub twinkle_speed: f32,
    pub twinkle_phase: f32,
}

impl Star {
    fn spawn(viewport: Viewport, rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen_range(0.0..viewport.width),
            y: rng.gen_range(0.0..viewport.height * STAR_BAND),
            size: if rng.gen_bool(0.1) { 3.0 } else { 2.0 },
            opacity: rng.gen_range(0.2..0.7),
            twinkle_speed: rng.gen_range(0.01..0.03),
            twinkle_phase: rng.gen_range(0.0..TAU),
        }
    }

    fn update(&mut self) {
        self.twinkle_phase += self.twinkle_speed;
    }

    pub fn alpha(&self) -> f32 {
        self.opacity * (self.twinkle_phase.sin() * 0.3 + 0.7)
    }

    fn paint(&self, batch: &mut QuadBatch) {
        batch.add_rect(self.x, self.y, self.size, self.size, WHITE.with_alpha(self.alpha()));
    }
}

/// Hero sky: twinkling stars under drifting pixel clouds.
pub struct SkyField {
    viewport: Viewport,
    clouds: Vec<Cloud>,
    stars: Vec<Star>,
    rng: SmallRng,
}

impl SkyField {
    pub fn new(viewport: Viewport, mut rng: SmallRng) -> Self {
        let clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud::spawn(viewport, &mut rng))
            .collect();
        let stars = (0..STAR_COUNT)
            .map(|_| Star::spawn(viewport, &mut rng))
            .collect();
        Self {
            viewport,
            clouds,
            stars,
            rng,
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Integrates one step on beat frames. Returns whether anything moved.
    pub fn advance(&mut self, tick: FrameTick) -> bool {
        if !tick.on_beat {
            return false;
        }
        for star in &mut self.stars {
            star.update();
        }
        for cloud in &mut self.clouds {
            cloud.update(self.viewport, &mut self.rng);
        }
        true
    }

    pub fn paint(&self, batch: &mut QuadBatch) {
        batch.clear(self.viewport.width, self.viewport.height);
        batch.add_vertical_gradient(&SKY_GRADIENT);
        for star in &self.stars {
            star.paint(batch);
        }
        for cloud in &self.clouds {
            cloud.paint(batch);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RisingBlock {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl RisingBlock {
    fn spawn(viewport: Viewport, rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen_range(0.0..viewport.width),
            y: viewport.height + rng.gen_range(0.0..BLOCK_SPAWN_DEPTH),
            size: rng.gen_range(8.0..24.0),
            speed: rng.gen_range(0.3..0.8),
            color: if rng.gen_bool(0.5) {
                BLOCK_PRIMARY
            } else {
                BLOCK_SECONDARY
            },
            opacity: rng.gen_range(0.1..0.4),
            rotation: rng.gen_range(0.0..TAU),
            rotation_speed: (rng.gen::<f32>() - 0.5) * 0.02,
        }
    }

    fn update(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        self.y -= self.speed;
        self.rotation += self.rotation_speed;
        if self.y < -self.size * 2.0 {
            *self = Self::spawn(viewport, rng);
        }
    }

    fn paint(&self, batch: &mut QuadBatch) {
        batch.add_rotated_square(
            self.x,
            self.y,
            self.size,
            self.rotation,
            self.color.with_alpha(self.opacity),
        );
        batch.add_rotated_square(
            self.x,
            self.y,
            self.size * 0.5,
            self.rotation,
            BLOCK_HIGHLIGHT.with_alpha(self.opacity * 0.5),
        );
    }
}

/// Hero blocks: teal squares rising and turning from below the bottom edge.
pub struct RisingBlocks {
    viewport: Viewport,
    blocks: Vec<RisingBlock>,
    rng: SmallRng,
}

impl RisingBlocks {
    pub fn new(viewport: Viewport, mut rng: SmallRng) -> Self {
        let blocks = (0..BLOCK_COUNT)
            .map(|_| RisingBlock::spawn(viewport, &mut rng))
            .collect();
        Self {
            viewport,
            blocks,
            rng,
        }
    }

    pub fn blocks(&self) -> &[RisingBlock] {
        &self.blocks
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn advance(&mut self, tick: FrameTick) -> bool {
        if !tick.on_beat {
            return false;
        }
        for block in &mut self.blocks {
            block.update(self.viewport, &mut self.rng);
        }
        true
    }

    pub fn paint(&self, batch: &mut QuadBatch) {
        batch.clear(self.viewport.width, self.viewport.height);
        batch.add_vertical_gradient(&BLOCKS_GRADIENT);
        for block in &self.blocks {
            block.paint(batch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameScheduler;
    use rand::SeedableRng;

    const VIEW: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    fn beat() -> FrameTick {
        FrameTick {
            index: 2,
            on_beat: true,
        }
    }

    fn assert_block_in_spawn_range(block: &RisingBlock, viewport: Viewport) {
        assert!(block.x >= 0.0 && block.x < viewport.width);
        assert!(block.y >= viewport.height && block.y < viewport.height + 100.0);
        assert!(block.size >= 8.0 && block.size < 24.0);
        assert!(block.speed >= 0.3 && block.speed < 0.8);
        assert!(block.opacity >= 0.1 && block.opacity < 0.4);
        assert!(block.rotation_speed.abs() <= 0.01);
        assert!(block.color == BLOCK_PRIMARY || block.color == BLOCK_SECONDARY);
    }

    #[test]
    fn sky_field_spawns_within_bands() {
        let field = SkyField::new(VIEW, SmallRng::seed_from_u64(11));
        assert_eq!(field.clouds().len(), CLOUD_COUNT);
        assert_eq!(field.stars().len(), STAR_COUNT);

        for cloud in field.clouds() {
            assert!(cloud.x >= 0.0 && cloud.x < VIEW.width);
            assert!(cloud.y >= 0.0 && cloud.y < VIEW.height * 0.5);
            assert!(cloud.width >= 60.0 && cloud.width < 140.0);
            assert!(cloud.height >= 30.0 && cloud.height < 60.0);
            assert!(cloud
                .pixels
                .iter()
                .all(|&(px, py)| px < cloud.width && py < cloud.height));
        }
        for star in field.stars() {
            assert!(star.y >= 0.0 && star.y < VIEW.height * 0.6);
            assert!(star.size == 2.0 || star.size == 3.0);
            assert!(star.opacity >= 0.2 && star.opacity < 0.7);
        }
    }

    #[test]
    fn clouds_wrap_to_left_edge() {
        let mut field = SkyField::new(VIEW, SmallRng::seed_from_u64(5));
        for _ in 0..20_000 {
            field.advance(beat());
            assert_eq!(field.clouds().len(), CLOUD_COUNT);
            for cloud in field.clouds() {
                assert!(cloud.x >= -cloud.width && cloud.x <= VIEW.width + cloud.width + 1.0);
                assert!(cloud.y >= 0.0 && cloud.y < VIEW.height * 0.5);
            }
        }
    }

    #[test]
    fn star_twinkle_stays_within_modulation() {
        let mut field = SkyField::new(VIEW, SmallRng::seed_from_u64(9));
        for _ in 0..500 {
            field.advance(beat());
        }
        for star in field.stars() {
            let alpha = star.alpha();
            assert!(alpha >= star.opacity * 0.4 - 1e-6);
            assert!(alpha <= star.opacity + 1e-6);
        }
    }

    #[test]
    fn off_beat_frames_leave_fields_untouched() {
        let mut field = RisingBlocks::new(VIEW, SmallRng::seed_from_u64(1));
        let before = field.blocks().to_vec();
        let moved = field.advance(FrameTick {
            index: 1,
            on_beat: false,
        });
        assert!(!moved);
        assert_eq!(field.blocks(), &before[..]);
    }

    #[test]
    fn rising_blocks_recycle_into_spawn_range() {
        let mut field = RisingBlocks::new(VIEW, SmallRng::seed_from_u64(3));
        for block in field.blocks() {
            assert_block_in_spawn_range(block, VIEW);
        }

        let mut recycled = 0;
        for _ in 0..5_000 {
            let before = field.blocks().to_vec();
            field.advance(beat());
            assert_eq!(field.blocks().len(), BLOCK_COUNT);
            for (old, new) in before.iter().zip(field.blocks()) {
                if new.y > old.y {
                    recycled += 1;
                    assert!(old.y - old.speed < -old.size * 2.0);
                    assert_block_in_spawn_range(new, VIEW);
                }
            }
        }
        assert!(recycled > 0);
    }

    #[test]
    fn hidden_scheduler_freezes_particles() {
        let mut scheduler = FrameScheduler::new();
        let mut field = RisingBlocks::new(VIEW, SmallRng::seed_from_u64(8));
        for _ in 0..4 {
            if let Some(tick) = scheduler.tick() {
                field.advance(tick);
            }
        }
        scheduler.observe_visibility(0.0);
        let before = field.blocks().to_vec();
        for _ in 0..100 {
            if let Some(tick) = scheduler.tick() {
                field.advance(tick);
            }
        }
        assert_eq!(field.blocks(), &before[..]);
    }

    #[test]
    fn resize_changes_later_spawn_bounds() {
        let mut field = RisingBlocks::new(VIEW, SmallRng::seed_from_u64(21));
        let small = Viewport::new(200.0, 100.0);
        field.resize(small);
        for _ in 0..20_000 {
            field.advance(beat());
        }
        // Slowest block covers 0.3 px per step, enough to pass the old 820 px
        // span several times, so every block has been reset at least once.
        for block in field.blocks() {
            assert!(block.x < small.width);
            assert!(block.y < small.height + 100.0);
        }
    }

    #[test]
    fn paint_draws_background_then_particles() {
        let field = RisingBlocks::new(VIEW, SmallRng::seed_from_u64(4));
        let mut batch = QuadBatch::new(VIEW.width, VIEW.height);
        field.paint(&mut batch);
        let quads = batch.indices().len() / 6;
        assert_eq!(quads, 2 + BLOCK_COUNT * 2);

        let sky = SkyField::new(VIEW, SmallRng::seed_from_u64(4));
        sky.paint(&mut batch);
        let pixels: usize = sky.clouds().iter().map(|c| c.pixels.len()).sum();
        assert_eq!(batch.indices().len() / 6, 3 + STAR_COUNT + pixels);
    }
}
