//! The owning scene: one level, the player and the monsters on it.
//!
//! The scene is the only holder of the level grid. Queries borrow it for the
//! length of one call; terrain edits go through [`Scene::set_terrain`], and
//! every cached view notices them through the grid revision. Monsters act
//! one after the other, each seeing the moves of those before it.

use delve_core::{GridError, Point, Terrain};
use delve_rl::{Level, RandomStream};
use serde::{Deserialize, Serialize};

use crate::actor::Player;
use crate::monster::{Decision, Monster};

/// Monster kinds the scene draws from: name and glyph.
const ROSTER: [(&str, char); 6] = [
    ("hungry rat", 'r'),
    ("berserking spider", 's'),
    ("barking hound", 'h'),
    ("venomous viper", 'v'),
    ("rampaging boar", 'b'),
    ("wind fox", 'f'),
];

/// Scene settings, loadable from the same JSON file as the level parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sight_radius: i32,
    pub monster_sight: i32,
    /// Cap on monsters placed from the level's spawn points.
    pub max_monsters: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sight_radius: 8,
            monster_sight: 6,
            max_monsters: 8,
        }
    }
}

/// Player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Step in a direction.
    Move(Point),
    /// Step along a shortest path toward a cell.
    Travel(Point),
    Wait,
}

/// Something that happened during a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    PlayerMoved(Point),
    PlayerBlocked,
    /// The player walked into a monster.
    PlayerBumped { name: String },
    ReachedExit(Point),
    MonsterMoved { name: String, from: Point, to: Point },
    MonsterAttacked { name: String },
}

pub struct Scene {
    level: Level,
    player: Player,
    monsters: Vec<Monster>,
    rng: RandomStream,
    turn: u32,
}

impl Scene {
    /// Put the player on the level's spawn and monsters on its spawn points.
    pub fn new(level: Level, config: &SceneConfig) -> Result<Self, GridError> {
        for r in [config.sight_radius, config.monster_sight] {
            if r <= 0 {
                return Err(GridError::InvalidRadius(r));
            }
        }
        // Monsters draw from their own stream, independent of the generator's.
        let mut rng = RandomStream::new(level.seed.value().rotate_left(17) ^ 0x5ce9e);
        let mut player = Player::new(level.spawn, config.sight_radius);
        player.viewer.refresh(&level.grid, level.spawn)?;

        let mut monsters = Vec::new();
        for &pos in &level.monster_spawns {
            if monsters.len() >= config.max_monsters {
                break;
            }
            if pos == level.spawn || !level.grid.is_walkable(pos) {
                continue;
            }
            let Some(&(name, glyph)) = rng.choice(&ROSTER) else {
                break;
            };
            monsters.push(Monster::new(name, glyph, pos, config.monster_sight));
        }
        log::info!(
            "{} level for seed {}: {} monsters",
            level.biome,
            level.seed,
            monsters.len()
        );

        Ok(Self {
            level,
            player,
            monsters,
            rng,
            turn: 0,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn monster_at(&self, p: Point) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.pos() == p)
    }

    /// Change the terrain at `p`. Cached views go stale through the grid
    /// revision and are recomputed on their next refresh.
    ///
    /// Blocking terrain cannot go under the player or a monster; the grid is
    /// left untouched and `BlockedOrigin` is returned.
    pub fn set_terrain(&mut self, p: Point, terrain: Terrain) -> Result<(), GridError> {
        self.level.grid.check(p)?;
        if terrain.blocking() && (p == self.player.pos() || self.monster_at(p).is_some()) {
            return Err(GridError::BlockedOrigin(p));
        }
        self.level.grid.set(p, terrain)?;
        let pos = self.player.pos();
        self.player.viewer.refresh(&self.level.grid, pos)?;
        Ok(())
    }

    /// Whether the player stands on an exit.
    pub fn at_exit(&self) -> bool {
        self.level.exits.contains(&self.player.pos())
    }

    /// Resolve a player action, then run the monsters' turn.
    pub fn act(&mut self, action: Action) -> Result<Vec<TurnEvent>, GridError> {
        let mut events = Vec::new();
        let grid = &self.level.grid;
        let next = match action {
            Action::Move(dir) => Some(self.player.pos() + dir),
            Action::Travel(goal) => self.player.next_travel_step(grid, goal)?,
            Action::Wait => None,
        };
        if let Some(to) = next {
            if let Some(m) = self.monster_at(to) {
                events.push(TurnEvent::PlayerBumped { name: m.name.clone() });
            } else if self.player.try_move(grid, to - self.player.pos())? {
                events.push(TurnEvent::PlayerMoved(to));
                if self.at_exit() {
                    events.push(TurnEvent::ReachedExit(to));
                }
            } else {
                events.push(TurnEvent::PlayerBlocked);
            }
        }
        self.end_turn(&mut events)?;
        Ok(events)
    }

    fn end_turn(&mut self, events: &mut Vec<TurnEvent>) -> Result<(), GridError> {
        self.turn += 1;
        self.process_monsters(events)?;
        let pos = self.player.pos();
        self.player.viewer.refresh(&self.level.grid, pos)?;
        Ok(())
    }

    /// Every monster decides and acts in turn order.
    fn process_monsters(&mut self, events: &mut Vec<TurnEvent>) -> Result<(), GridError> {
        let pp = self.player.pos();
        let mut taken: Vec<Point> = self.monsters.iter().map(Monster::pos).collect();
        for i in 0..self.monsters.len() {
            let occupied =
                |p: Point| p == pp || taken.iter().enumerate().any(|(j, &q)| j != i && q == p);
            let monster = &mut self.monsters[i];
            let from = monster.pos();
            match monster.decide(&self.level.grid, pp, occupied, &mut self.rng)? {
                Decision::Attack(_) => events.push(TurnEvent::MonsterAttacked {
                    name: monster.name.clone(),
                }),
                Decision::Move(to) => {
                    monster.move_to(to);
                    taken[i] = to;
                    events.push(TurnEvent::MonsterMoved {
                        name: monster.name.clone(),
                        from,
                        to,
                    });
                }
                Decision::Wait => {}
            }
        }
        Ok(())
    }

    /// Text rendering of what the player knows: visible cells and monsters,
    /// remembered terrain, blanks elsewhere. `reveal` shows everything.
    pub fn render(&self, reveal: bool) -> String {
        let grid = &self.level.grid;
        let viewer = &self.player.viewer;
        let mut s = String::with_capacity(grid.bounds().len() + grid.height() as usize);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p = Point::new(x, y);
                let shown = reveal || viewer.sees(p);
                let ch = if p == self.player.pos() {
                    '@'
                } else if let (true, Some(m)) = (shown, self.monster_at(p)) {
                    m.glyph
                } else if shown {
                    grid.terrain(p).map_or(' ', Terrain::glyph)
                } else {
                    viewer.remembered(p).map_or(' ', Terrain::glyph)
                };
                s.push(ch);
            }
            s.push('\n');
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::Grid;
    use delve_rl::{Biome, BiomeParams, Seed, generate};

    fn corridor_level(monsters: Vec<Point>) -> Level {
        let grid = Grid::from_ascii(
            "
            ############
            #..........#
            #..........#
            #.........>#
            ############",
        )
        .unwrap();
        Level {
            grid,
            spawn: Point::new(1, 1),
            exits: vec![Point::new(10, 3)],
            features: Vec::new(),
            rooms: Vec::new(),
            monster_spawns: monsters,
            biome: Biome::Dungeon,
            seed: Seed::Int(7),
            degraded: None,
        }
    }

    #[test]
    fn monsters_placed_off_the_spawn() {
        let level = generate("scene", 50, 30, &BiomeParams::defaults(Biome::Dungeon)).unwrap();
        let spawns = level.monster_spawns.len();
        let scene = Scene::new(level, &SceneConfig::default()).unwrap();
        assert_eq!(scene.monsters().len(), spawns.min(8));
        for m in scene.monsters() {
            assert_ne!(m.pos(), scene.player().pos());
            assert!(scene.level().grid.is_walkable(m.pos()));
        }
        assert!(scene.player().viewer.sees(scene.player().pos()));
    }

    #[test]
    fn rejects_non_positive_sight() {
        let cfg = SceneConfig {
            sight_radius: 0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            Scene::new(corridor_level(Vec::new()), &cfg),
            Err(GridError::InvalidRadius(0))
        ));
    }

    #[test]
    fn travel_reaches_the_exit() {
        let mut scene = Scene::new(corridor_level(Vec::new()), &SceneConfig::default()).unwrap();
        let exit = scene.level().exits[0];
        let mut reached = false;
        for _ in 0..20 {
            let events = scene.act(Action::Travel(exit)).unwrap();
            if events.contains(&TurnEvent::ReachedExit(exit)) {
                reached = true;
                break;
            }
        }
        assert!(reached);
        assert!(scene.at_exit());
        assert_eq!(scene.turn(), 9);
    }

    #[test]
    fn walls_block_and_monsters_bump() {
        let mut scene =
            Scene::new(corridor_level(vec![Point::new(2, 1)]), &SceneConfig::default()).unwrap();
        let events = scene.act(Action::Move(Point::new(0, -1))).unwrap();
        assert_eq!(events[0], TurnEvent::PlayerBlocked);
        // The adjacent monster sees the player and attacks instead of moving.
        assert!(events.iter().any(|e| matches!(e, TurnEvent::MonsterAttacked { .. })));
        let events = scene.act(Action::Move(Point::new(1, 0))).unwrap();
        assert!(matches!(events[0], TurnEvent::PlayerBumped { .. }));
        assert_eq!(scene.player().pos(), Point::new(1, 1));
    }

    #[test]
    fn hunters_close_in_without_stacking() {
        let level = corridor_level(vec![Point::new(9, 1), Point::new(9, 3), Point::new(10, 2)]);
        let cfg = SceneConfig {
            monster_sight: 12,
            ..SceneConfig::default()
        };
        let mut scene = Scene::new(level, &cfg).unwrap();
        for _ in 0..15 {
            scene.act(Action::Wait).unwrap();
            let mut cells: Vec<Point> = scene.monsters().iter().map(Monster::pos).collect();
            cells.push(scene.player().pos());
            let n = cells.len();
            cells.sort_unstable();
            cells.dedup();
            assert_eq!(cells.len(), n, "two actors share a cell");
        }
        let near = scene
            .monsters()
            .iter()
            .filter(|m| delve_paths::chebyshev(m.pos(), scene.player().pos()) == 1)
            .count();
        assert!(near >= 2);
    }

    #[test]
    fn terrain_edits_refresh_the_view() {
        let mut scene = Scene::new(corridor_level(Vec::new()), &SceneConfig::default()).unwrap();
        assert!(scene.player().viewer.sees(Point::new(5, 1)));
        scene.set_terrain(Point::new(3, 1), Terrain::Wall).unwrap();
        scene.set_terrain(Point::new(3, 2), Terrain::Wall).unwrap();
        scene.set_terrain(Point::new(3, 3), Terrain::Wall).unwrap();
        assert!(!scene.player().viewer.sees(Point::new(5, 1)));
        assert_eq!(scene.player().viewer.remembered(Point::new(5, 1)), Some(Terrain::Floor));
    }

    #[test]
    fn walls_cannot_bury_actors() {
        let monster = Point::new(8, 2);
        let mut scene = Scene::new(corridor_level(vec![monster]), &SceneConfig::default()).unwrap();
        let before = scene.level().grid.clone();
        let rev = before.revision();

        assert!(matches!(
            scene.set_terrain(monster, Terrain::Wall),
            Err(GridError::BlockedOrigin(p)) if p == monster
        ));
        let player = scene.player().pos();
        assert!(matches!(
            scene.set_terrain(player, Terrain::Wall),
            Err(GridError::BlockedOrigin(p)) if p == player
        ));
        assert_eq!(scene.level().grid, before);
        assert_eq!(scene.level().grid.revision(), rev);

        // Non-blocking terrain under an actor is fine.
        scene.set_terrain(monster, Terrain::Rubble).unwrap();
        scene.act(Action::Wait).unwrap();
        scene.act(Action::Wait).unwrap();
    }

    #[test]
    fn render_hides_the_unknown() {
        let mut level = corridor_level(vec![Point::new(9, 2)]);
        for y in 1..4 {
            level.grid.set(Point::new(5, y), Terrain::Wall).unwrap();
        }
        let scene = Scene::new(level, &SceneConfig::default()).unwrap();
        let fog = scene.render(false);
        let rows: Vec<&str> = fog.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].chars().nth(1), Some('@'));
        assert_eq!(rows[2].chars().nth(9), Some(' '));
        let full = scene.render(true);
        let full_rows: Vec<&str> = full.lines().collect();
        assert_eq!(full_rows[2].chars().nth(9), Some(scene.monsters()[0].glyph));
        assert_eq!(full_rows[3].chars().nth(10), Some('>'));
    }
}
