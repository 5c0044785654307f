//! Data-driven scene configuration.
//!
//! Every field has a default matching the stock testing scene, so an empty TOML document is a
//! valid config. Building variants are profiles keyed by name; placements refer to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{
    CollisionFilter, CollisionLayer, DEFAULT_BREAK_THRESHOLD, DEFAULT_WALL_HEIGHT,
    DEFAULT_WALL_THICKNESS, Damping, GRAVITY_MPS2, PLAYER_MAX_HEALTH, SphParams, SurfaceMaterial,
    TICK_DT, Vec3,
    constants::{PLAYER_JUMP_IMPULSE, PLAYER_MOVE_SPEED},
};

use crate::error::SimError;

pub const SKYSCRAPER: &str = "skyscraper";
pub const SKYSCRAPER_BOX: &str = "skyscraper_box";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Gravity magnitude (m/s^2), applied along -Y.
    pub gravity: f32,
    /// Fixed step (seconds).
    pub timestep: f32,
    /// Seed for every random choice the scene makes.
    pub seed: u64,
    /// Round length; the sea finishes rising when it runs out.
    pub survive_seconds: f32,
    pub land: LandConfig,
    pub player: PlayerConfig,
    pub water: WaterConfig,
    pub profiles: BTreeMap<String, BuildingProfile>,
    pub buildings: Vec<BuildingPlacement>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(SKYSCRAPER.to_string(), BuildingProfile::skyscraper());
        profiles.insert(
            SKYSCRAPER_BOX.to_string(),
            BuildingProfile {
                asset: None,
                ..BuildingProfile::skyscraper()
            },
        );

        Self {
            gravity: GRAVITY_MPS2,
            timestep: TICK_DT,
            seed: 0,
            survive_seconds: 120.0,
            land: LandConfig::default(),
            player: PlayerConfig::default(),
            water: WaterConfig::default(),
            profiles,
            buildings: vec![
                BuildingPlacement {
                    profile: SKYSCRAPER.to_string(),
                    position: [0.0, 10.0, 0.0],
                },
                BuildingPlacement {
                    profile: SKYSCRAPER_BOX.to_string(),
                    position: [-5.0, 10.0, -5.0],
                },
            ],
        }
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SimError> {
        let config: SceneConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.timestep.is_nan() || self.timestep <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.survive_seconds.is_nan() || self.survive_seconds <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "survive_seconds must be positive, got {}",
                self.survive_seconds
            )));
        }
        if self.water.radius.is_nan() || self.water.radius <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "water radius must be positive, got {}",
                self.water.radius
            )));
        }
        for placement in &self.buildings {
            self.profile(&placement.profile)?;
        }
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Result<&BuildingProfile, SimError> {
        self.profiles
            .get(name)
            .ok_or_else(|| SimError::UnknownProfile(name.to_string()))
    }
}

/// Parameters shared by every building of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingProfile {
    /// Asset key. `None` builds a plain box of `dimensions` with no fragments.
    pub asset: Option<String>,
    /// Full box size (meters) for assetless buildings.
    pub dimensions: [f32; 3],
    pub mass: f32,
    pub material: SurfaceMaterial,
    pub damping: Damping,
    pub fixed_rotation: bool,
    pub filter: CollisionFilter,
    /// Impact force a contact must exceed to break the building.
    pub break_threshold: f32,
    /// Keep the intact building fixed in place until it breaks.
    pub anchored: bool,
    /// Added to every fragment's volume-weighted mass.
    pub fragment_additional_mass: f32,
}

impl Default for BuildingProfile {
    fn default() -> Self {
        Self::skyscraper()
    }
}

impl BuildingProfile {
    pub fn skyscraper() -> Self {
        Self {
            asset: Some(SKYSCRAPER.to_string()),
            dimensions: [4.0, 20.0, 4.0],
            mass: 10.0,
            material: SurfaceMaterial {
                friction: 1.0,
                restitution: 0.0,
            },
            damping: Damping {
                linear: 0.9,
                angular: 0.9,
            },
            fixed_rotation: false,
            filter: CollisionFilter::all(),
            break_threshold: DEFAULT_BREAK_THRESHOLD,
            anchored: true,
            fragment_additional_mass: 0.0,
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::from(self.dimensions) * 0.5
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub profile: String,
    pub position: [f32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandConfig {
    pub asset: String,
    pub position: [f32; 3],
    pub material: SurfaceMaterial,
    pub filter: CollisionFilter,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Contour walls to leave out, by index in contour order.
    pub excluded_walls: Vec<usize>,
    pub riser: RiserConfig,
}

impl Default for LandConfig {
    fn default() -> Self {
        Self {
            asset: "land".to_string(),
            position: [0.0, 0.0, 0.0],
            material: SurfaceMaterial::default(),
            filter: CollisionFilter::layer(CollisionLayer::Land),
            wall_height: DEFAULT_WALL_HEIGHT,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            excluded_walls: Vec::new(),
            riser: RiserConfig::default(),
        }
    }
}

/// Sea level at the start and at the end of the round (world Y, meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiserConfig {
    pub start: f32,
    pub end: f32,
    pub material: SurfaceMaterial,
}

impl Default for RiserConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 8.0,
            material: SurfaceMaterial {
                friction: 0.5,
                restitution: 0.5,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub position: [f32; 3],
    pub radius: f32,
    pub half_height: f32,
    pub mass: f32,
    pub material: SurfaceMaterial,
    pub linear_damping: f32,
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub max_health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 1.0, 5.0],
            radius: 0.5,
            half_height: 1.0,
            mass: 1.0,
            material: SurfaceMaterial {
                friction: 0.5,
                restitution: 0.0,
            },
            linear_damping: 0.8,
            move_speed: PLAYER_MOVE_SPEED,
            jump_impulse: PLAYER_JUMP_IMPULSE,
            max_health: PLAYER_MAX_HEALTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub position: [f32; 3],
    pub count: usize,
    pub radius: f32,
    pub sph: SphParams,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 12.0, 6.0],
            count: 40,
            radius: 0.1,
            sph: SphParams::default(),
        }
    }
}
