use delve::{Action, Scene, SceneConfig, TurnEvent};
use delve_core::Point;
use delve_rl::{Biome, BiomeParams, generate};

const BIOMES: [Biome; 3] = [Biome::Dungeon, Biome::Jungle, Biome::Town];

#[test]
fn travel_reaches_the_exit_on_every_biome() {
    let cfg = SceneConfig {
        max_monsters: 0,
        ..SceneConfig::default()
    };
    for biome in BIOMES {
        for seed in 0..5u64 {
            let level = generate(seed, 48, 28, &BiomeParams::defaults(biome)).unwrap();
            let exit = level.exits[0];
            let mut scene = Scene::new(level, &cfg).unwrap();
            let mut reached = false;
            for _ in 0..48 * 28 {
                let events = scene.act(Action::Travel(exit)).unwrap();
                assert!(!events.contains(&TurnEvent::PlayerBlocked), "{biome} seed {seed}");
                if scene.at_exit() {
                    reached = true;
                    break;
                }
            }
            assert!(reached, "{biome} seed {seed}");
        }
    }
}

#[test]
fn actors_never_share_a_cell() {
    for biome in BIOMES {
        let level = generate("crowd", 40, 24, &BiomeParams::defaults(biome)).unwrap();
        let mut scene = Scene::new(level, &SceneConfig::default()).unwrap();
        for _ in 0..40 {
            scene.act(Action::Wait).unwrap();
            let grid = &scene.level().grid;
            let mut cells: Vec<Point> = scene.monsters().iter().map(|m| m.pos()).collect();
            for &c in &cells {
                assert!(grid.is_walkable(c), "{biome}: monster on {c}");
            }
            cells.push(scene.player().pos());
            let n = cells.len();
            cells.sort_unstable();
            cells.dedup();
            assert_eq!(cells.len(), n, "{biome}");
        }
    }
}

#[test]
fn same_seed_same_story() {
    let run = || {
        let level = generate(31u64, 50, 30, &BiomeParams::defaults(Biome::Jungle)).unwrap();
        let exit = level.exits[0];
        let mut scene = Scene::new(level, &SceneConfig::default()).unwrap();
        let mut log = Vec::new();
        for _ in 0..25 {
            log.extend(scene.act(Action::Travel(exit)).unwrap());
        }
        (log, scene.render(true))
    };
    assert_eq!(run(), run());
}

#[test]
fn scene_config_from_json() {
    let cfg: SceneConfig = serde_json::from_str(r#"{"monster_sight": 3}"#).unwrap();
    assert_eq!(cfg.monster_sight, 3);
    assert_eq!(cfg.sight_radius, SceneConfig::default().sight_radius);
}
