//! Road-and-buildings town generator.

use delve_core::{Grid, GridError, Point, Range, Terrain};

use super::{Biome, Degradation, Level, LevelGenerator, check_size, connect, degrade, invalid};
use crate::rng::{RandomStream, Seed};

/// Parameters of the town generator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TownParams {
    /// Mean distance between vertical branch roads.
    pub branch_spacing: i32,
    /// Smallest building side, walls included.
    pub building_min_size: i32,
    /// Largest building side, walls included.
    pub building_max_size: i32,
    pub max_buildings: usize,
    pub min_buildings: usize,
    pub placement_attempts: usize,
    /// Chance for an unused open cell to grow a tree.
    pub tree_chance: f64,
}

impl Default for TownParams {
    fn default() -> Self {
        Self {
            branch_spacing: 8,
            building_min_size: 4,
            building_max_size: 8,
            max_buildings: 12,
            min_buildings: 2,
            placement_attempts: 300,
            tree_chance: 0.08,
        }
    }
}

impl TownParams {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.branch_spacing < 3 {
            return Err(invalid(format!("branch_spacing {} below 3", self.branch_spacing)));
        }
        if self.building_min_size < 3 || self.building_min_size > self.building_max_size {
            return Err(invalid(format!(
                "building size range {}..={} (minimum 3)",
                self.building_min_size, self.building_max_size
            )));
        }
        if self.min_buildings > self.max_buildings {
            return Err(invalid(format!(
                "min_buildings {} above max_buildings {}",
                self.min_buildings, self.max_buildings
            )));
        }
        if self.placement_attempts == 0 {
            return Err(invalid("placement_attempts must be positive"));
        }
        if !(0.0..=1.0).contains(&self.tree_chance) {
            return Err(invalid(format!("tree_chance {} outside [0, 1]", self.tree_chance)));
        }
        Ok(())
    }
}

/// A road cell and the directions buildings may face it from.
#[derive(Debug, Clone, Copy)]
struct RoadCell {
    pos: Point,
    horizontal: bool,
}

/// A placed building: its outer rectangle, door and the path cell joining
/// the door to the road.
#[derive(Debug, Clone, Copy)]
struct Building {
    rect: Range,
    door: Point,
    path: Point,
}

impl Building {
    /// Candidate building facing the road at `road` from direction `dir`
    /// (unit vector from the road toward the building). `off` is the door's
    /// offset along the wall, never a corner.
    fn facing(road: Point, dir: Point, w: i32, h: i32, off: i32) -> Self {
        let path = road + dir;
        let door = road + dir * 2;
        let min = match (dir.x, dir.y) {
            (0, -1) => Point::new(door.x - off, door.y - h + 1),
            (0, _) => Point::new(door.x - off, door.y),
            (-1, _) => Point::new(door.x - w + 1, door.y - off),
            _ => Point::new(door.x, door.y - off),
        };
        Self {
            rect: Range::with_size(min, w, h),
            door,
            path,
        }
    }

    fn interior(&self) -> Range {
        self.rect.expand(-1)
    }
}

impl LevelGenerator for TownParams {
    fn generate(&self, seed: &Seed, width: i32, height: i32) -> Result<Level, GridError> {
        check_size(width, height)?;
        self.validate()?;

        let mut rng = RandomStream::new(seed.clone());
        let mut grid = Grid::new(width, height, Terrain::Floor)?;
        let interior = grid.bounds().expand(-1);
        for p in grid.bounds().iter().filter(|&p| !interior.contains(p)) {
            grid.set(p, Terrain::Wall)?;
        }

        let roads = self.lay_roads(&mut grid, &mut rng)?;
        let buildings = self.place_buildings(&mut grid, &roads, &mut rng)?;

        // Scatter trees over ground that nothing uses.
        let reserved = |p: Point| {
            buildings
                .iter()
                .any(|b| b.rect.contains(p) || b.path == p)
        };
        for p in interior.iter() {
            if grid.terrain(p) == Some(Terrain::Floor)
                && !reserved(p)
                && rng.chance(self.tree_chance)
            {
                grid.set(p, Terrain::Tree)?;
            }
        }

        let spine = height / 2;
        let spawn = Point::new(width / 2, spine);
        let pruned = connect::prune_unreachable(&mut grid, spawn, Terrain::Tree)?;

        let exit = Point::new(width - 1, spine);
        grid.set(exit, Terrain::Exit)?;

        let mut doors: Vec<Point> = buildings.iter().map(|b| b.door).collect();
        doors.sort_unstable();
        let rooms: Vec<Range> = buildings.iter().map(Building::interior).collect();
        let monster_spawns = rooms.iter().map(|r| r.center()).collect();

        log::debug!(
            "town {width}x{height} seed {seed}: {} road cells, {} buildings, {pruned} cells pruned",
            roads.len(),
            buildings.len()
        );

        let degraded = if buildings.len() < self.min_buildings {
            degrade(
                Biome::Town,
                seed,
                Degradation::FewerBuildings {
                    placed: buildings.len(),
                    wanted: self.min_buildings,
                },
            )
        } else {
            None
        };

        Ok(Level {
            grid,
            spawn,
            exits: vec![exit],
            features: doors,
            rooms,
            monster_spawns,
            biome: Biome::Town,
            seed: seed.clone(),
            degraded,
        })
    }
}

impl TownParams {
    /// A horizontal spine road through the middle row and vertical branches
    /// at jittered spacing.
    fn lay_roads(
        &self,
        grid: &mut Grid,
        rng: &mut RandomStream,
    ) -> Result<Vec<RoadCell>, GridError> {
        let (width, height) = (grid.width(), grid.height());
        let spine = height / 2;
        let mut roads = Vec::new();
        for x in 1..width - 1 {
            let pos = Point::new(x, spine);
            grid.set(pos, Terrain::Road)?;
            roads.push(RoadCell { pos, horizontal: true });
        }

        let jitter = self.branch_spacing / 4;
        let mut x = 1 + self.branch_spacing / 2 + rng.next_int(-jitter, jitter);
        while x < width - 1 {
            for y in 1..height - 1 {
                let pos = Point::new(x, y);
                if y != spine {
                    grid.set(pos, Terrain::Road)?;
                    roads.push(RoadCell { pos, horizontal: false });
                }
            }
            x += self.branch_spacing + rng.next_int(-jitter, jitter);
        }
        Ok(roads)
    }

    /// Rejection-sample buildings beside road cells. Each building keeps one
    /// cell of margin from roads and other buildings, has exactly one door
    /// facing the road, and a one-cell path from door to road.
    fn place_buildings(
        &self,
        grid: &mut Grid,
        roads: &[RoadCell],
        rng: &mut RandomStream,
    ) -> Result<Vec<Building>, GridError> {
        let interior = grid.bounds().expand(-1);
        let mut placed: Vec<Building> = Vec::new();
        for _ in 0..self.placement_attempts {
            if placed.len() >= self.max_buildings {
                break;
            }
            let Some(&road) = rng.choice(roads) else {
                break;
            };
            let w = rng.next_int(self.building_min_size, self.building_max_size);
            let h = rng.next_int(self.building_min_size, self.building_max_size);
            let dirs = if road.horizontal {
                [Point::new(0, -1), Point::new(0, 1)]
            } else {
                [Point::new(-1, 0), Point::new(1, 0)]
            };
            let Some(&dir) = rng.choice(&dirs) else {
                continue;
            };
            let along = if dir.x == 0 { w } else { h };
            let off = rng.next_int(1, along - 2);
            let b = Building::facing(road.pos, dir, w, h, off);

            let margin = b.rect.expand(1);
            if !b.rect.in_range(interior)
                || margin.iter().any(|p| grid.terrain(p) == Some(Terrain::Road))
                || placed
                    .iter()
                    .any(|o| margin.overlaps(o.rect) || b.rect.contains(o.path))
            {
                continue;
            }

            grid.fill_range(b.rect, Terrain::StructureWall);
            grid.fill_range(b.interior(), Terrain::Floor);
            grid.set(b.door, Terrain::Door)?;
            grid.set(b.path, Terrain::Floor)?;
            placed.push(b);
        }
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::dungeon::wall_ring;

    fn town(seed: u64) -> Level {
        TownParams::default().generate(&Seed::Int(seed), 60, 40).unwrap()
    }

    #[test]
    fn spine_spawn_and_east_gate() {
        let level = town(1);
        assert_eq!(level.spawn, Point::new(30, 20));
        assert_eq!(level.grid.terrain(level.spawn), Some(Terrain::Road));
        assert_eq!(level.exits, vec![Point::new(59, 20)]);
        assert_eq!(level.grid.terrain(Point::new(59, 20)), Some(Terrain::Exit));
        assert!(level.is_connected());
    }

    #[test]
    fn each_building_has_one_door_facing_a_road() {
        let level = town(5);
        assert!(level.rooms.len() >= 2);
        assert_eq!(level.features.len(), level.rooms.len());
        for room in &level.rooms {
            let doors: Vec<Point> = wall_ring(*room)
                .filter(|&p| level.grid.terrain(p) == Some(Terrain::Door))
                .collect();
            assert_eq!(doors.len(), 1, "building {room}");
            let door = doors[0];
            // Door, path cell, road in a straight line.
            let out = door
                .neighbors_4()
                .into_iter()
                .find(|&n| !room.expand(1).contains(n))
                .unwrap();
            let dir = out - door;
            assert!(level.grid.is_walkable(out));
            assert_eq!(level.grid.terrain(out + dir), Some(Terrain::Road));
        }
    }

    #[test]
    fn buildings_do_not_overlap_roads_or_each_other() {
        let level = town(9);
        for (i, a) in level.rooms.iter().enumerate() {
            for p in a.expand(2) {
                assert_ne!(level.grid.terrain(p), Some(Terrain::Road), "{p}");
            }
            for b in &level.rooms[i + 1..] {
                assert!(!a.expand(2).overlaps(b.expand(1)));
            }
        }
    }

    #[test]
    fn no_room_for_buildings_degrades() {
        let params = TownParams {
            building_min_size: 20,
            building_max_size: 20,
            ..TownParams::default()
        };
        let level = params.generate(&Seed::Int(2), 20, 12).unwrap();
        assert!(level.rooms.is_empty());
        assert!(matches!(level.degraded, Some(Degradation::FewerBuildings { placed: 0, .. })));
        assert!(level.is_connected());
    }

    #[test]
    fn invalid_params() {
        let bad = TownParams {
            min_buildings: 20,
            max_buildings: 5,
            ..TownParams::default()
        };
        assert!(bad.validate().is_err());
        assert!(TownParams {
            branch_spacing: 1,
            ..TownParams::default()
        }
        .validate()
        .is_err());
    }
}
