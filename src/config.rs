use anyhow::ensure;
use clap::{Parser, ValueEnum};
use rand::{rngs::SmallRng, SeedableRng};

use crate::terrain::DEFAULT_TERRAIN_EXTENT;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Twinkling stars and drifting pixel clouds
    Sky,
    /// Rising, rotating pixel blocks
    Blocks,
    /// Voxel terrain with floating islands and an orbit camera
    Terrain,
}

impl SceneKind {
    pub fn title(self) -> &'static str {
        match self {
            SceneKind::Sky => "Pixel Sky",
            SceneKind::Blocks => "Pixel Blocks",
            SceneKind::Terrain => "Voxel Terrain",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "voxel_showcase", about = "Canvas effects and a voxel terrain viewer")]
pub struct Cli {
    /// Which effect to open
    #[arg(long, value_enum, default_value_t = SceneKind::Terrain)]
    pub scene: SceneKind,

    /// Terrain half-extent in blocks; the grid spans 2N+1 columns per side
    #[arg(long, default_value_t = DEFAULT_TERRAIN_EXTENT, allow_negative_numbers = true)]
    pub extent: i32,

    /// Seed for island shapes and particle spawns; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseConfig {
    pub scene: SceneKind,
    pub extent: i32,
    pub seed: Option<u64>,
    pub window_size: (u32, u32),
}

impl ShowcaseConfig {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let config = Self {
            scene: cli.scene,
            extent: cli.extent,
            seed: cli.seed,
            window_size: (cli.width, cli.height),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.extent >= 1,
            "--extent must be at least 1, got {}",
            self.extent
        );
        ensure!(
            self.window_size.0 > 0 && self.window_size.1 > 0,
            "window size must be non-zero, got {}x{}",
            self.window_size.0,
            self.window_size.1
        );
        Ok(())
    }

    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ShowcaseConfig> {
        let cli = Cli::try_parse_from(std::iter::once("voxel_showcase").chain(args.iter().copied()))?;
        ShowcaseConfig::from_cli(cli)
    }

    #[test]
    fn defaults_open_terrain() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.scene, SceneKind::Terrain);
        assert_eq!(config.extent, 8);
        assert_eq!(config.seed, None);
        assert_eq!(config.window_size, (1280, 720));
    }

    #[test]
    fn parses_scene_and_seed() {
        let config = parse(&["--scene", "blocks", "--seed", "42", "--extent", "4"]).unwrap();
        assert_eq!(config.scene, SceneKind::Blocks);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.extent, 4);
    }

    #[test]
    fn rejects_empty_extent_and_window() {
        assert!(parse(&["--extent", "0"]).is_err());
        assert!(parse(&["--extent", "-2"]).is_err());
        assert!(parse(&["--width", "0"]).is_err());
    }

    #[test]
    fn same_seed_gives_same_stream() {
        use rand::Rng;
        let config = parse(&["--seed", "7"]).unwrap();
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
