//! The game scene: entity update list, game state and the per-tick pipeline.
//!
//! # Tick
//! Only runs while [`GameState::InGame`]:
//! 1. advance the round timer;
//! 2. step the world, collecting the contacts that started;
//! 3. route each contact (sorted by body creation order) to every entity owning either body,
//!    then update every entity in update-list order;
//! 4. apply queued [`GameEvent`]s and publish a fresh [`HudState`].
//!
//! Entities never see the scene itself. They get a [`TickContext`] borrowing the pieces of the
//! scene they are allowed to touch.

use rand::{SeedableRng, rngs::StdRng};
use shared::Vec3;

use crate::{
    asset::{AssetSource, SceneNode},
    building::Building,
    config::SceneConfig,
    error::SimError,
    land::Land,
    physics::{BodyId, ContactEvent, PhysicsContext},
    player::{InputState, Player},
    timer::GameTimer,
    visual::{VisualId, VisualSink},
    water::Water,
};

/// Things entities report back to the scene during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    PlayerDrowned { damage: f32 },
}

/// What the overlay shows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HudState {
    pub health: f32,
    pub time_left: f32,
    pub flood_height: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    #[default]
    NotInGame,
    InGame,
    Paused,
}

/// Borrowed view of the scene handed to entities.
pub struct TickContext<'a> {
    pub physics: &'a mut PhysicsContext,
    pub visuals: &'a mut dyn VisualSink,
    pub rng: &'a mut StdRng,
    pub events: &'a mut Vec<GameEvent>,
    pub timer: &'a GameTimer,
    /// Visual every entity attaches under.
    pub root: VisualId,
    /// Length of this tick (seconds).
    pub dt: f32,
}

/// Index into the update list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub usize);

#[derive(Debug)]
pub enum Entity {
    Building(Building),
    Land(Land),
    Water(Water),
    Player(Player),
}

impl Entity {
    pub fn owns(&self, body: BodyId) -> bool {
        match self {
            Entity::Building(b) => b.owns(body),
            Entity::Land(l) => l.owns(body),
            Entity::Water(w) => w.owns(body),
            Entity::Player(p) => p.owns(body),
        }
    }

    pub fn handle_contact(&mut self, contact: &ContactEvent, ctx: &mut TickContext<'_>) {
        match self {
            Entity::Building(b) => b.handle_contact(contact),
            Entity::Land(l) => l.handle_contact(contact, ctx),
            Entity::Water(_) | Entity::Player(_) => {}
        }
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        match self {
            Entity::Building(b) => b.update(ctx),
            Entity::Land(l) => l.update(ctx),
            Entity::Water(w) => w.update(ctx),
            Entity::Player(p) => p.update(ctx),
        }
    }
}

impl From<Building> for Entity {
    fn from(value: Building) -> Self {
        Entity::Building(value)
    }
}

impl From<Land> for Entity {
    fn from(value: Land) -> Self {
        Entity::Land(value)
    }
}

impl From<Water> for Entity {
    fn from(value: Water) -> Self {
        Entity::Water(value)
    }
}

impl From<Player> for Entity {
    fn from(value: Player) -> Self {
        Entity::Player(value)
    }
}

pub struct Scene<V: VisualSink> {
    physics: PhysicsContext,
    visuals: V,
    root: VisualId,
    rng: StdRng,
    timer: GameTimer,
    state: GameState,
    entities: Vec<Entity>,
    events: Vec<GameEvent>,
    hud: HudState,
}

impl<V: VisualSink> Scene<V> {
    /// An empty scene with the world, clock and RNG set up from `config`.
    pub fn new(config: &SceneConfig, mut visuals: V) -> Self {
        let root = visuals.attach(&SceneNode::new("scene"), None);
        let timer = GameTimer::new(config.survive_seconds);
        Self {
            physics: PhysicsContext::new(config.gravity, config.timestep),
            visuals,
            root,
            rng: StdRng::seed_from_u64(config.seed),
            hud: HudState {
                health: 0.0,
                time_left: timer.time_left(),
                flood_height: 0.0,
            },
            timer,
            state: GameState::NotInGame,
            entities: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The testing scene: land, player, every configured building and the water.
    pub fn from_config(
        config: &SceneConfig,
        assets: &mut dyn AssetSource,
        visuals: V,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let mut scene = Self::new(config, visuals);

        let land_asset = assets.request(&config.land.asset);
        scene.add_to_update_list(Land::new(config.land.clone(), land_asset));

        scene.spawn(|ctx| Player::spawn(config.player.clone(), ctx));

        for (index, placement) in config.buildings.iter().enumerate() {
            let profile = config.profile(&placement.profile)?.clone();
            let asset = profile.asset.as_deref().map(|key| assets.request(key));
            scene.add_to_update_list(Building::new(
                format!("{}_{index}", placement.profile),
                profile,
                Vec3::from(placement.position),
                asset,
            ));
        }

        scene.spawn(|ctx| Water::spawn(config.water.clone(), ctx));

        scene.hud = scene.snapshot_hud();
        log::info!("scene ready with {} entities", scene.entities.len());
        Ok(scene)
    }

    /// Append an entity; it updates after everything already in the list.
    pub fn add_to_update_list(&mut self, entity: impl Into<Entity>) -> EntityId {
        self.entities.push(entity.into());
        EntityId(self.entities.len() - 1)
    }

    /// Build an entity that needs the world right away, then add it.
    pub fn spawn<E: Into<Entity>>(&mut self, build: impl FnOnce(&mut TickContext<'_>) -> E) -> EntityId {
        let dt = self.physics.dt();
        let entity = {
            let mut ctx = TickContext {
                physics: &mut self.physics,
                visuals: &mut self.visuals,
                rng: &mut self.rng,
                events: &mut self.events,
                timer: &self.timer,
                root: self.root,
                dt,
            };
            build(&mut ctx)
        };
        self.add_to_update_list(entity)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Start the round. Only valid from `NotInGame`; reloading means building a fresh scene.
    pub fn start(&mut self) -> bool {
        if self.state != GameState::NotInGame {
            return false;
        }
        self.state = GameState::InGame;
        log::info!("game started");
        true
    }

    /// Toggle between `InGame` and `Paused`. No effect before the game starts.
    pub fn pause_resume(&mut self) -> GameState {
        self.state = match self.state {
            GameState::InGame => {
                log::info!("game paused");
                GameState::Paused
            }
            GameState::Paused => {
                log::info!("game resumed");
                GameState::InGame
            }
            GameState::NotInGame => GameState::NotInGame,
        };
        self.state
    }

    pub fn physics(&self) -> &PhysicsContext {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsContext {
        &mut self.physics
    }

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn root(&self) -> VisualId {
        self.root
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn hud(&self) -> HudState {
        self.hud
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    pub fn land(&self) -> Option<&Land> {
        self.entities.iter().find_map(|e| match e {
            Entity::Land(land) => Some(land),
            _ => None,
        })
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(|e| match e {
            Entity::Player(player) => Some(player),
            _ => None,
        })
    }

    fn player_mut(&mut self) -> Option<&mut Player> {
        self.entities.iter_mut().find_map(|e| match e {
            Entity::Player(player) => Some(player),
            _ => None,
        })
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.entities.iter().filter_map(|e| match e {
            Entity::Building(building) => Some(building),
            _ => None,
        })
    }

    pub fn water(&self) -> Option<&Water> {
        self.entities.iter().find_map(|e| match e {
            Entity::Water(water) => Some(water),
            _ => None,
        })
    }

    /// Forward held keys to the player for the next tick.
    pub fn set_input(&mut self, input: InputState, camera_forward: Vec3) {
        if let Some(player) = self.player_mut() {
            player.set_input(input, camera_forward);
        }
    }

    /// Run one tick of `dt` seconds. Returns `false` (and does nothing) unless in game.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.state != GameState::InGame {
            return false;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        self.timer.advance(dt);
        self.physics.set_dt(dt);
        let contacts = self.physics.step();

        {
            let mut ctx = TickContext {
                physics: &mut self.physics,
                visuals: &mut self.visuals,
                rng: &mut self.rng,
                events: &mut self.events,
                timer: &self.timer,
                root: self.root,
                dt,
            };

            for contact in &contacts {
                for entity in &mut self.entities {
                    if entity.owns(contact.a) || entity.owns(contact.b) {
                        entity.handle_contact(contact, &mut ctx);
                    }
                }
            }
            for entity in &mut self.entities {
                entity.update(&mut ctx);
            }
        }

        self.apply_events();
        self.hud = self.snapshot_hud();
        true
    }

    fn apply_events(&mut self) {
        let events = std::mem::take(&mut self.events);
        for event in events {
            match event {
                GameEvent::PlayerDrowned { damage } => {
                    if let Some(player) = self.player_mut() {
                        let was_alive = !player.is_dead();
                        player.lose_health(damage);
                        if was_alive && player.is_dead() {
                            log::info!("player is out of health");
                        }
                    }
                }
            }
        }
    }

    fn snapshot_hud(&self) -> HudState {
        HudState {
            health: self.player().map_or(0.0, Player::health),
            time_left: self.timer.time_left(),
            flood_height: self.land().map_or(0.0, Land::flood_height),
        }
    }
}
