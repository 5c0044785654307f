/// Fixed simulation step in seconds (one tick per rendered frame at 60 Hz).
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Gravity magnitude in meters per second squared (positive value).
/// The world applies it along -Y.
pub const GRAVITY_MPS2: f32 = 9.81;

/// Default impact force above which a building breaks apart.
///
/// Compared with a strict `>`: an impact of exactly this value leaves the building intact.
pub const DEFAULT_BREAK_THRESHOLD: f32 = 100.0;

/// Max distance from the mesh's minimum Y for a vertex to count as part of the bottom face (meters).
pub const BOTTOM_FACE_TOLERANCE: f32 = 0.01;

/// Two contour vertices closer than this are the same vertex (meters).
pub const CONTOUR_WELD_EPS: f32 = 1.0e-5;

/// Default thickness of boundary walls generated around a land tile (meters).
/// Thin is enough since walls are static and the solver never tunnels through them at player speeds.
pub const DEFAULT_WALL_THICKNESS: f32 = 0.1;

/// Default height of boundary walls (meters).
pub const DEFAULT_WALL_HEIGHT: f32 = 10.0;

/// Half height of the sea-level riser box (meters).
pub const SEA_LAYER_HALF_HEIGHT: f32 = 0.1;

/// How far below the visible sea level the player-killing collider sits (meters).
pub const DROWN_DEPTH: f32 = 2.0;

/// Damage dealt to the player when they touch the killer collider.
/// Large enough to kill outright.
pub const DROWN_DAMAGE: f32 = 100.0;

/// Starting player health.
pub const PLAYER_MAX_HEALTH: f32 = 100.0;

/// Volume (m^3) below which a hull is considered flat.
pub const HULL_DEGENERACY_EPS: f32 = 1.0e-7;

/// Collision mask a water particle switches to after touching the sea level:
/// every layer except other water particles.
pub const SETTLED_WATER_MASK: u32 = 0b101111;

/// Squared planar speed below which a heading is too short to derive a facing yaw from.
pub const YAW_EPS: f32 = 1.0e-6;

/// Planar move force per unit of player mass (N/kg).
pub const PLAYER_MOVE_SPEED: f32 = 5.0;

/// Upward impulse applied for one frame of jump input (N*s).
pub const PLAYER_JUMP_IMPULSE: f32 = 1.0;

/// SPH smoothing radius `h` (meters). Only particles closer than this interact.
pub const SPH_SMOOTHING_RADIUS: f32 = 0.1;

/// SPH rest density (kg/m^3).
pub const SPH_REST_DENSITY: f32 = 1000.0;

/// SPH viscosity coefficient.
pub const SPH_VISCOSITY: f32 = 0.1;

/// SPH pressure stiffness `k` in `p = k * (rho - rho0)`.
pub const SPH_STIFFNESS: f32 = 1.0;
