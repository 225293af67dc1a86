//! Cellular-automaton jungle generator.

use delve_core::{Grid, GridError, Point, Range, Terrain};
use delve_paths::{WalkablePather, bfs_map, components, euclidean_sq};

use super::{
    Automaton, Biome, Degradation, Level, LevelGenerator, SolidMask, check_size, connect, degrade,
    fallback_corridor, invalid, pick_far_cells,
};
use crate::rng::{RandomStream, Seed};

/// Parameters of the jungle generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JungleParams {
    /// Initial chance for a cell to be a tree.
    pub tree_density: f64,
    pub smoothing_passes: usize,
    /// Initial chance for a cell of the vegetation overlay.
    pub vegetation_density: f64,
    /// Initial chance for a cell of the water overlay.
    pub water_density: f64,
    /// Open share of the level an attempt must reach to be accepted.
    pub min_open_fraction: f64,
    pub max_attempts: usize,
    /// Monster spawns per this many open cells.
    pub cells_per_monster: usize,
}

impl Default for JungleParams {
    fn default() -> Self {
        Self {
            tree_density: 0.45,
            smoothing_passes: 4,
            vegetation_density: 0.52,
            water_density: 0.40,
            min_open_fraction: 0.30,
            max_attempts: 4,
            cells_per_monster: 80,
        }
    }
}

impl JungleParams {
    pub fn validate(&self) -> Result<(), GridError> {
        for (name, v) in [
            ("tree_density", self.tree_density),
            ("vegetation_density", self.vegetation_density),
            ("water_density", self.water_density),
            ("min_open_fraction", self.min_open_fraction),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(format!("{name} {v} outside [0, 1]")));
            }
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts must be positive"));
        }
        if self.cells_per_monster == 0 {
            return Err(invalid("cells_per_monster must be positive"));
        }
        Ok(())
    }

    /// Run the tree automaton up to `max_attempts` times and keep the most
    /// open layout. Returns it with its open fraction.
    fn best_cave(&self, rng: &mut RandomStream, width: i32, height: i32) -> (SolidMask, f64) {
        let ca = Automaton {
            fill: self.tree_density,
            passes: self.smoothing_passes,
        };
        let total = (width * height) as f64;
        let mut best: Option<(SolidMask, f64)> = None;
        for attempt in 0..self.max_attempts {
            let mut mask = ca.run(rng, width, height);
            mask.solidify_border();
            let open = mask.open_count() as f64 / total;
            log::debug!("jungle attempt {attempt}: {:.0}% open", open * 100.0);
            if best.as_ref().is_none_or(|(_, b)| open > *b) {
                best = Some((mask, open));
            }
            if open >= self.min_open_fraction {
                break;
            }
        }
        // max_attempts is validated to be positive.
        best.unwrap_or_else(|| (ca.run(rng, width, height), 0.0))
    }
}

impl LevelGenerator for JungleParams {
    fn generate(&self, seed: &Seed, width: i32, height: i32) -> Result<Level, GridError> {
        check_size(width, height)?;
        self.validate()?;

        let mut rng = RandomStream::new(seed.clone());
        let (cave, open_fraction) = self.best_cave(&mut rng, width, height);
        if cave.open_count() == 0 {
            return fallback_corridor(seed, Biome::Jungle, width, height, Terrain::Tree);
        }

        let mut grid = Grid::new(width, height, Terrain::Floor)?;
        grid.map_cells(|p, c| {
            if cave.at(p) {
                c.with_terrain(Terrain::Tree)
            } else {
                c
            }
        });

        // Overlays only ever replace open floor.
        for (terrain, density) in [
            (Terrain::Vegetation, self.vegetation_density),
            (Terrain::Water, self.water_density),
        ] {
            let layer = Automaton {
                fill: density,
                passes: self.smoothing_passes,
            }
            .run(&mut rng, width, height);
            grid.map_cells(|p, c| {
                if c.terrain == Terrain::Floor && layer.at(p) {
                    c.with_terrain(terrain)
                } else {
                    c
                }
            });
        }

        // Join every smaller region to the largest.
        let largest = {
            let pather = WalkablePather::new(&grid);
            let cc = components(grid.bounds(), &pather, |p| grid.is_walkable(p));
            cc.largest().and_then(|l| cc.members(l).first().copied())
        };
        let Some(anchor) = largest else {
            return fallback_corridor(seed, Biome::Jungle, width, height, Terrain::Tree);
        };
        connect::connect_regions(&mut grid, anchor, Terrain::Floor)?;

        let spawn = nearest_open(&grid, Point::new(0, height / 2)).unwrap_or(anchor);

        // Exit at the far end, in a camp clearing.
        let dm = bfs_map(grid.bounds(), &WalkablePather::new(&grid), &[spawn], i32::MAX);
        let far = dm.farthest().map_or(spawn, |n| n.pos);
        let interior = grid.bounds().expand(-1);
        let clearing = Range::new(far.x - 1, far.y - 1, far.x + 2, far.y + 2).intersect(interior);
        grid.fill_range(clearing, Terrain::Floor);
        let exit = if far != spawn {
            far
        } else {
            clearing.iter().find(|&p| p != spawn).unwrap_or(far)
        };
        grid.set(exit, Terrain::Exit)?;

        let open_cells = grid.count_fn(|_, c| !c.blocking());
        let monsters = (open_cells / self.cells_per_monster).clamp(1, 12);
        let monster_spawns = pick_far_cells(&grid, spawn, 8, monsters, &mut rng);

        log::debug!(
            "jungle {width}x{height} seed {seed}: {open_cells} open cells, exit at {exit}"
        );

        let degraded = if open_fraction < self.min_open_fraction {
            degrade(Biome::Jungle, seed, Degradation::SparseCave { open_fraction })
        } else {
            None
        };

        Ok(Level {
            grid,
            spawn,
            exits: vec![exit],
            features: Vec::new(),
            rooms: Vec::new(),
            monster_spawns,
            biome: Biome::Jungle,
            seed: seed.clone(),
            degraded,
        })
    }
}

/// The walkable cell closest to `target`, ties broken row-major.
fn nearest_open(grid: &Grid, target: Point) -> Option<Point> {
    grid.walkable_points().min_by_key(|&p| (euclidean_sq(p, target), p))
}
