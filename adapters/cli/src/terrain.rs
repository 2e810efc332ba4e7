//! Configurable terrain oracle standing in for the rovers' onboard cameras.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rover_fleet_core::{Position, TerrainOracle};
use serde::Deserialize;

const CELL_SEED_MULTIPLIER: u64 = 0x9e37_79b9_7f4a_7c15;

/// Terrain description loaded from a TOML file.
///
/// Every section is optional. Without a `[plateau]` table the plateau is
/// unbounded.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TerrainConfig {
    plateau: Option<PlateauBounds>,
    hazards: HazardConfig,
}

impl TerrainConfig {
    /// Loads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read terrain file at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid terrain file at {}", path.display()))
    }

    /// Parses and validates a configuration from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse terrain toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let density = self.hazards.density;
        if !(0.0..=1.0).contains(&density) {
            bail!("hazard density {density} must lie within 0.0 and 1.0");
        }

        if let Some(plateau) = self.plateau {
            if plateau.min_x > plateau.max_x || plateau.min_y > plateau.max_y {
                bail!(
                    "plateau corners ({}, {}) and ({}, {}) are inverted",
                    plateau.min_x,
                    plateau.min_y,
                    plateau.max_x,
                    plateau.max_y
                );
            }
        }

        Ok(())
    }
}

/// Inclusive rectangle of cells that exist on the plateau.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct PlateauBounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl PlateauBounds {
    fn contains(&self, cell: Position) -> bool {
        (self.min_x..=self.max_x).contains(&cell.x()) && (self.min_y..=self.max_y).contains(&cell.y())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct HazardConfig {
    cells: Vec<[i32; 2]>,
    density: f64,
    seed: u64,
}

/// Oracle answering from a plateau rectangle plus hazard cells.
///
/// Hazards may sit between safe cells, so a terrain with any hazard asks to be
/// consulted on every step. Random hazards are decided per cell from the configured seed, so the same
/// cell always gives the same answer regardless of probe order.
#[derive(Clone, Debug)]
pub(crate) struct PlateauTerrain {
    bounds: Option<PlateauBounds>,
    hazards: HashSet<Position>,
    density: f64,
    seed: u64,
}

impl From<TerrainConfig> for PlateauTerrain {
    fn from(config: TerrainConfig) -> Self {
        Self {
            bounds: config.plateau,
            hazards: config
                .hazards
                .cells
                .into_iter()
                .map(|[x, y]| Position::new(x, y))
                .collect(),
            density: config.hazards.density,
            seed: config.hazards.seed,
        }
    }
}

impl PlateauTerrain {
    fn random_hazard(&self, cell: Position) -> bool {
        if self.density <= 0.0 {
            return false;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(self.seed, cell));
        rng.gen_bool(self.density)
    }
}

impl TerrainOracle for PlateauTerrain {
    fn is_traversable(&self, cell: Position) -> bool {
        if self.bounds.is_some_and(|bounds| !bounds.contains(cell)) {
            return false;
        }

        !self.hazards.contains(&cell) && !self.random_hazard(cell)
    }

    fn has_interior_hazards(&self) -> bool {
        !self.hazards.is_empty() || self.density > 0.0
    }
}

fn cell_seed(seed: u64, cell: Position) -> u64 {
    let packed = (u64::from(cell.x() as u32) << 32) | u64::from(cell.y() as u32);
    seed ^ packed.wrapping_mul(CELL_SEED_MULTIPLIER)
}
