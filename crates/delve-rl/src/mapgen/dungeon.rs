//! Rooms-and-corridors dungeon generator.

use delve_core::{Grid, GridError, Point, Range, Terrain};
use delve_paths::{UNREACHABLE, WalkablePather, bfs_map, euclidean_sq};

use super::{
    Biome, Degradation, Level, LevelGenerator, check_size, connect, degrade, fallback_corridor,
    invalid,
};
use crate::rng::{RandomStream, Seed};

/// Parameters of the dungeon generator.
///
/// Room sizes are floor sizes; each room is wrapped in walls shared with
/// nothing but corridors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DungeonParams {
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub room_min_size: i32,
    pub room_max_size: i32,
    /// Room placement tries before giving up.
    pub placement_attempts: usize,
    /// Chance for each corridor cell to be rubble.
    pub rubble_chance: f64,
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            min_rooms: 4,
            max_rooms: 9,
            room_min_size: 4,
            room_max_size: 9,
            placement_attempts: 200,
            rubble_chance: 0.04,
        }
    }
}

impl DungeonParams {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.min_rooms == 0 || self.min_rooms > self.max_rooms {
            return Err(invalid(format!(
                "room count range {}..={} is empty or zero",
                self.min_rooms, self.max_rooms
            )));
        }
        if i32::try_from(self.max_rooms).is_err() {
            return Err(invalid(format!("max_rooms {} too large", self.max_rooms)));
        }
        if self.room_min_size < 2 || self.room_min_size > self.room_max_size {
            return Err(invalid(format!(
                "room size range {}..={} (minimum 2)",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.placement_attempts == 0 {
            return Err(invalid("placement_attempts must be positive"));
        }
        if !(0.0..=1.0).contains(&self.rubble_chance) {
            return Err(invalid(format!("rubble_chance {} outside [0, 1]", self.rubble_chance)));
        }
        Ok(())
    }

    /// Rejection-sample non-overlapping rooms, keeping one wall cell between
    /// any two rooms and between rooms and the border.
    fn place_rooms(&self, rng: &mut RandomStream, width: i32, height: i32) -> Vec<Range> {
        let max_w = self.room_max_size.min(width - 2);
        let max_h = self.room_max_size.min(height - 2);
        if self.room_min_size > max_w || self.room_min_size > max_h {
            return Vec::new();
        }

        // Both counts fit in i32 once validated.
        let target = rng.next_int(self.min_rooms as i32, self.max_rooms as i32) as usize;
        let mut rooms: Vec<Range> = Vec::with_capacity(target);
        for _ in 0..self.placement_attempts {
            if rooms.len() >= target {
                break;
            }
            let w = rng.next_int(self.room_min_size, max_w);
            let h = rng.next_int(self.room_min_size, max_h);
            let x = rng.next_int(1, width - 1 - w);
            let y = rng.next_int(1, height - 1 - h);
            let cand = Range::with_size(Point::new(x, y), w, h);
            if rooms.iter().any(|&r| cand.expand(1).overlaps(r)) {
                continue;
            }
            rooms.push(cand);
        }
        rooms
    }
}

impl LevelGenerator for DungeonParams {
    fn generate(&self, seed: &Seed, width: i32, height: i32) -> Result<Level, GridError> {
        check_size(width, height)?;
        self.validate()?;

        let mut rng = RandomStream::new(seed.clone());
        let rooms = self.place_rooms(&mut rng, width, height);
        if rooms.is_empty() {
            return fallback_corridor(seed, Biome::Dungeon, width, height, Terrain::Wall);
        }

        let mut grid = Grid::new(width, height, Terrain::Wall)?;
        for &room in &rooms {
            grid.fill_range(room, Terrain::Floor);
        }
        let corridor = dig_corridors(&mut grid, &rooms, &mut rng)?;
        let doors = punch_doors(&mut grid, &rooms)?;

        let spawn = rooms[0].center();
        connect::connect_regions(&mut grid, spawn, Terrain::Floor)?;

        for p in corridor {
            if grid.terrain(p) == Some(Terrain::Floor) && rng.chance(self.rubble_chance) {
                grid.set(p, Terrain::Rubble)?;
            }
        }

        // Exit in the room farthest from the spawn.
        let dm = bfs_map(grid.bounds(), &WalkablePather::new(&grid), &[spawn], i32::MAX);
        let mut exit_room = None;
        let mut best = 0;
        for (i, room) in rooms.iter().enumerate().skip(1) {
            let d = dm.at(room.center());
            if d != UNREACHABLE && d > best {
                best = d;
                exit_room = Some(i);
            }
        }
        let exit = match exit_room {
            Some(i) => rooms[i].center(),
            None => match dm.farthest() {
                Some(node) if node.pos != spawn => node.pos,
                _ => return fallback_corridor(seed, Biome::Dungeon, width, height, Terrain::Wall),
            },
        };
        grid.set(exit, Terrain::Exit)?;

        let monster_spawns = rooms
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != 0 && Some(i) != exit_room)
            .map(|(_, r)| r.center())
            .collect();

        log::debug!(
            "dungeon {width}x{height} seed {seed}: {} rooms, {} doors, exit at {exit}",
            rooms.len(),
            doors.len()
        );

        let degraded = if rooms.len() < self.min_rooms {
            degrade(
                Biome::Dungeon,
                seed,
                Degradation::FewerRooms {
                    placed: rooms.len(),
                    wanted: self.min_rooms,
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
            biome: Biome::Dungeon,
            seed: seed.clone(),
            degraded,
        })
    }
}

/// Join the rooms along a minimum spanning tree of their centres (Prim,
/// squared distances) with L-shaped corridors. Returns the carved cells.
fn dig_corridors(
    grid: &mut Grid,
    rooms: &[Range],
    rng: &mut RandomStream,
) -> Result<Vec<Point>, GridError> {
    let centers: Vec<Point> = rooms.iter().map(|r| r.center()).collect();
    let mut in_tree = vec![false; centers.len()];
    in_tree[0] = true;
    let mut carved = Vec::new();

    for _ in 1..centers.len() {
        let mut best: Option<(i64, usize, usize)> = None;
        for i in (0..centers.len()).filter(|&i| in_tree[i]) {
            for j in (0..centers.len()).filter(|&j| !in_tree[j]) {
                let d = euclidean_sq(centers[i], centers[j]);
                if best.is_none_or(|(bd, _, _)| d < bd) {
                    best = Some((d, i, j));
                }
            }
        }
        let Some((_, i, j)) = best else {
            break;
        };
        in_tree[j] = true;

        let (a, b) = (centers[i], centers[j]);
        let bend = if rng.chance(0.5) {
            Point::new(b.x, a.y)
        } else {
            Point::new(a.x, b.y)
        };
        for p in segment(a, bend).chain(segment(bend, b)) {
            if grid.terrain(p) == Some(Terrain::Wall) {
                grid.set(p, Terrain::Floor)?;
                carved.push(p);
            }
        }
    }
    Ok(carved)
}

/// Cells of the axis-aligned segment from `a` to `b`, both inclusive.
fn segment(a: Point, b: Point) -> impl Iterator<Item = Point> {
    let step = Point::new((b.x - a.x).signum(), (b.y - a.y).signum());
    let n = (b.x - a.x).abs().max((b.y - a.y).abs());
    (0..=n).map(move |i| a + step * i)
}

/// Turn single-cell openings in each room's wall ring into doors. A room
/// whose openings are all wider gets its first opening as a door.
fn punch_doors(grid: &mut Grid, rooms: &[Range]) -> Result<Vec<Point>, GridError> {
    let mut doors = Vec::new();
    for &room in rooms {
        let outer = room.expand(1);
        let mut has_door = false;
        let mut first_opening = None;
        for p in wall_ring(room) {
            match grid.terrain(p) {
                Some(Terrain::Door) => has_door = true,
                Some(Terrain::Floor) => {
                    first_opening.get_or_insert(p);
                    let along_row = p.y == outer.min.y || p.y == outer.max.y - 1;
                    let (a, b) = if along_row {
                        (p.shift(-1, 0), p.shift(1, 0))
                    } else {
                        (p.shift(0, -1), p.shift(0, 1))
                    };
                    if grid.is_blocking(a) && grid.is_blocking(b) {
                        grid.set(p, Terrain::Door)?;
                        doors.push(p);
                        has_door = true;
                    }
                }
                _ => {}
            }
        }
        if let (false, Some(p)) = (has_door, first_opening) {
            grid.set(p, Terrain::Door)?;
            doors.push(p);
        }
    }
    doors.sort_unstable();
    doors.dedup();
    Ok(doors)
}

/// The wall cells around `room`, corners excluded, in row-major order.
pub(crate) fn wall_ring(room: Range) -> impl Iterator<Item = Point> {
    let outer = room.expand(1);
    outer.iter().filter(move |&p| {
        let on_row = p.y == outer.min.y || p.y == outer.max.y - 1;
        let on_col = p.x == outer.min.x || p.x == outer.max.x - 1;
        on_row != on_col
    })
}
