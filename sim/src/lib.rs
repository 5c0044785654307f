pub mod asset;
pub mod building;
pub mod config;
pub mod error;
pub mod land;
pub mod physics;
pub mod player;
pub mod registry;
pub mod scene;
pub mod timer;
pub mod visual;
pub mod wall;
pub mod water;

pub use asset::{AssetHandle, AssetSource, AssetState, MemoryAssets, SceneNode};
pub use building::{Building, BuildingState, Fragment, FragmentDescriptor, fragment_mass};
pub use config::{
    BuildingPlacement, BuildingProfile, LandConfig, PlayerConfig, RiserConfig, SceneConfig,
    WaterConfig,
};
pub use error::SimError;
pub use land::{Land, LandState, SeaLevelRiser};
pub use physics::{BodyId, ContactEvent, PhysicsContext};
pub use player::{InputState, Player};
pub use registry::CollisionFilterRegistry;
pub use scene::{Entity, EntityId, GameEvent, GameState, HudState, Scene, TickContext};
pub use timer::GameTimer;
pub use visual::{HeadlessVisuals, VisualId, VisualRecord, VisualSink};
pub use wall::{WallCollider, spawn_walls};
pub use water::{Particle, Water};
