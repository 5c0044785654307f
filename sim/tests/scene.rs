mod common;

use common::{Harness, land_tile, tower};
use floodrise_sim::{
    BuildingState, GameState, HeadlessVisuals, InputState, LandState, MemoryAssets, Player,
    PlayerConfig, Scene, SceneConfig, SimError, Water, WaterConfig,
};
use shared::{BodyDef, BodyKind, BodyTag, ColliderShapeDef, TICK_DT, Transform, Vec3};

fn assets() -> MemoryAssets {
    MemoryAssets::new()
        .with("land", land_tile(20.0))
        .with("skyscraper", tower())
}

fn quiet_config() -> SceneConfig {
    SceneConfig {
        water: WaterConfig {
            count: 0,
            ..WaterConfig::default()
        },
        buildings: Vec::new(),
        ..SceneConfig::default()
    }
}

#[test]
fn nothing_ticks_before_the_game_starts() {
    let mut scene = Scene::from_config(&quiet_config(), &mut assets(), HeadlessVisuals::new()).unwrap();

    assert_eq!(scene.state(), GameState::NotInGame);
    assert!(!scene.tick(TICK_DT));
    assert_eq!(scene.timer().elapsed(), 0.0);
    assert_eq!(scene.land().unwrap().state(), LandState::Loading);
}

#[test]
fn game_state_transitions() {
    let mut scene = Scene::new(&SceneConfig::default(), HeadlessVisuals::new());

    assert_eq!(scene.pause_resume(), GameState::NotInGame);
    assert!(scene.start());
    assert!(!scene.start());
    assert_eq!(scene.pause_resume(), GameState::Paused);

    assert!(!scene.tick(TICK_DT));
    assert_eq!(scene.timer().elapsed(), 0.0);

    assert_eq!(scene.pause_resume(), GameState::InGame);
    assert!(scene.tick(TICK_DT));
    assert!((scene.timer().elapsed() - TICK_DT).abs() < 1.0e-6);
}

#[test]
fn default_scene_loads_everything() {
    let mut scene = Scene::from_config(&SceneConfig::default(), &mut assets(), HeadlessVisuals::new()).unwrap();
    scene.start();
    scene.tick(TICK_DT);

    assert_eq!(scene.land().unwrap().state(), LandState::Loaded);
    assert_eq!(scene.land().unwrap().walls().len(), 4);
    let states: Vec<BuildingState> = scene.buildings().map(|b| b.state()).collect();
    assert_eq!(states, vec![BuildingState::Intact, BuildingState::Intact]);
    assert_eq!(scene.water().unwrap().particles().len(), 40);
    assert_eq!(scene.physics().bodies_tagged(BodyTag::Player).len(), 1);
    assert_eq!(scene.physics().bodies_tagged(BodyTag::WaterParticle).len(), 40);

    let hud = scene.hud();
    assert_eq!(hud.health, 100.0);
    assert!((hud.time_left - (120.0 - TICK_DT)).abs() < 1.0e-4);
}

#[test]
fn unknown_profile_is_rejected() {
    let mut config = quiet_config();
    config.buildings.push(floodrise_sim::BuildingPlacement {
        profile: "castle".to_string(),
        position: [0.0, 0.0, 0.0],
    });

    let result = Scene::from_config(&config, &mut assets(), HeadlessVisuals::new());
    assert!(matches!(result, Err(SimError::UnknownProfile(name)) if name == "castle"));
}

#[test]
fn missing_assets_leave_entities_loading() {
    let mut config = quiet_config();
    config.buildings = SceneConfig::default().buildings;
    let mut scene = Scene::from_config(&config, &mut MemoryAssets::new(), HeadlessVisuals::new()).unwrap();
    scene.start();
    for _ in 0..5 {
        scene.tick(TICK_DT);
    }

    assert_eq!(scene.land().unwrap().state(), LandState::Loading);
    let states: Vec<BuildingState> = scene.buildings().map(|b| b.state()).collect();
    // The assetless profile never waits.
    assert_eq!(states, vec![BuildingState::Loading, BuildingState::Intact]);
}

fn drop_weight(scene: &mut Scene<HeadlessVisuals>, at: Vec3) {
    scene.physics_mut().create_body(
        BodyDef::new(
            BodyKind::Dynamic,
            Transform::from_translation(at),
            ColliderShapeDef::Ball { radius: 0.5 },
        )
        .with_mass(50.0),
        BodyTag::Building,
    );
}

#[test]
fn dropped_weight_breaks_the_tower_but_not_the_box() {
    let mut config = quiet_config();
    config.buildings = SceneConfig::default().buildings;
    let mut scene = Scene::from_config(&config, &mut assets(), HeadlessVisuals::new()).unwrap();
    scene.start();
    scene.tick(TICK_DT);

    let box_body = scene.buildings().nth(1).unwrap().intact_body().unwrap();
    // Tower top at y = 14, box top at y = 20.
    drop_weight(&mut scene, Vec3::new(0.0, 17.0, 0.0));
    drop_weight(&mut scene, Vec3::new(-5.0, 23.0, -5.0));
    for _ in 0..180 {
        scene.tick(TICK_DT);
    }

    let buildings: Vec<_> = scene.buildings().collect();
    assert_eq!(buildings[0].state(), BuildingState::Fractured);
    assert_eq!(buildings[0].fragments().len(), 2);
    assert_eq!(buildings[1].state(), BuildingState::Intact);
    assert_eq!(buildings[1].intact_body(), Some(box_body));
    assert!(scene.physics().contains(box_body));
}

#[test]
fn rising_sea_drowns_a_player_standing_in_it() {
    let mut config = quiet_config();
    // Killer slab starts at y = 1, through the middle of the player.
    config.land.riser.start = 3.0;
    config.land.riser.end = 3.0;
    let mut scene = Scene::from_config(&config, &mut assets(), HeadlessVisuals::new()).unwrap();
    scene.start();

    let mut drowned_at = None;
    for tick in 0..10 {
        scene.tick(TICK_DT);
        if scene.hud().health <= 0.0 {
            drowned_at = Some(tick);
            break;
        }
    }

    assert!(drowned_at.is_some(), "player never drowned");
    assert!(scene.player().unwrap().is_dead());
    assert_eq!(scene.hud().health, 0.0);
}

#[test]
fn hud_tracks_the_flood() {
    let mut config = quiet_config();
    config.survive_seconds = 1.0;
    config.land.riser.start = -10.0;
    config.land.riser.end = -6.0;
    let mut scene = Scene::from_config(&config, &mut assets(), HeadlessVisuals::new()).unwrap();
    scene.start();

    scene.tick(0.25);
    scene.tick(0.25);
    // Loaded on the first tick; the second tick sees half the round gone.
    assert!((scene.hud().flood_height - 2.0).abs() < 1.0e-4, "{:?}", scene.hud());
    assert!((scene.hud().time_left - 0.5).abs() < 1.0e-5);
}

#[test]
fn player_moves_with_input() {
    let mut config = quiet_config();
    config.player.material.friction = 0.0;
    config.land.material.friction = 0.0;
    let mut scene = Scene::from_config(&config, &mut assets(), HeadlessVisuals::new()).unwrap();
    scene.start();
    let body = scene.player().unwrap().body();
    let start = scene.physics().translation(body).unwrap();

    scene.set_input(
        InputState {
            forward: true,
            ..InputState::default()
        },
        Vec3::new(1.0, 0.0, 0.0),
    );
    for _ in 0..30 {
        scene.tick(TICK_DT);
    }

    let end = scene.physics().translation(body).unwrap();
    assert!(end.x > start.x + 0.05, "{start:?} -> {end:?}");
    assert!((end.z - start.z).abs() < 0.05, "{start:?} -> {end:?}");

    // Moving along +X: the visual faces back along its heading.
    let yaw = scene.player().unwrap().yaw();
    assert!((yaw + std::f32::consts::FRAC_PI_2).abs() < 0.1, "{yaw}");
}

#[test]
fn player_health_saturates() {
    let mut harness = Harness::new();
    let mut player = Player::spawn(PlayerConfig::default(), &mut harness.ctx());

    assert_eq!(player.health(), 100.0);
    player.lose_health(30.0);
    assert_eq!(player.health(), 70.0);
    player.lose_health(500.0);
    assert_eq!(player.health(), 0.0);
    assert!(player.is_dead());

    let body = player.body();
    assert!(harness.physics.is_dynamic(body));
    assert_eq!(harness.physics.registry().lookup(body), Some(BodyTag::Player));
}

#[test]
fn water_spawns_in_a_jittered_cloud() {
    let mut harness = Harness::new();
    let config = WaterConfig {
        position: [0.0, 10.0, 0.0],
        count: 12,
        radius: 0.1,
        ..WaterConfig::default()
    };
    let mut water = Water::spawn(config, &mut harness.ctx());

    assert_eq!(water.particles().len(), 12);
    for particle in water.particles() {
        let at = harness.physics.translation(particle.body).unwrap();
        for (value, center) in [(at.x, 0.0), (at.y, 10.0), (at.z, 0.0)] {
            let offset = value - center;
            assert!((-1.0 - 1.0e-4..=0.5 + 1.0e-4).contains(&offset), "{at:?}");
        }
        assert!(harness.visuals.contains(particle.visual));
    }

    harness.physics.step();
    water.update(&mut harness.ctx());
    let first = water.particles()[0];
    let pose = harness.physics.pose(first.body).unwrap();
    assert_eq!(harness.visuals.get(first.visual).unwrap().transform, pose);
}
