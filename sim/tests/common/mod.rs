#![allow(dead_code)]

use floodrise_sim::{
    GameEvent, GameTimer, HeadlessVisuals, PhysicsContext, SceneNode, TickContext, VisualId,
    VisualSink,
};
use rand::{SeedableRng, rngs::StdRng};
use shared::{MeshData, MeshSoup, TICK_DT};

/// Closed axis-aligned box between `min` and `max`.
pub fn box_mesh(min: [f32; 3], max: [f32; 3]) -> MeshData {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    let positions = vec![
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y0, z1],
        [x0, y0, z1],
        [x0, y1, z0],
        [x1, y1, z0],
        [x1, y1, z1],
        [x0, y1, z1],
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // bottom
        4, 6, 5, 4, 7, 6, // top
        0, 4, 5, 0, 5, 1, // -z
        3, 2, 6, 3, 6, 7, // +z
        0, 3, 7, 0, 7, 4, // -x
        1, 5, 6, 1, 6, 2, // +x
    ];
    MeshData::indexed(positions, indices)
}

/// Flat square tile `size` wide, one meter thick, top face at y = 0.
pub fn land_tile(size: f32) -> SceneNode {
    let h = size * 0.5;
    SceneNode::new("land").with_child(
        SceneNode::new("ground").with_mesh(box_mesh([-h, -1.0, -h], [h, 0.0, h])),
    )
}

/// Ground box of [`land_tile`] as a soup, in tile-local coordinates.
pub fn tile_soup(size: f32) -> MeshSoup {
    let h = size * 0.5;
    MeshSoup::from_mesh(&box_mesh([-h, -1.0, -h], [h, 0.0, h])).unwrap()
}

/// A 2 x 4 x 2 tower (volume 16) pre-cut into two 2 x 2 x 2 halves.
pub fn tower() -> SceneNode {
    SceneNode::new("tower")
        .with_child(SceneNode::new("whole").with_mesh(box_mesh([-1.0, 0.0, -1.0], [1.0, 4.0, 1.0])))
        .with_child(SceneNode::new("lower").with_mesh(box_mesh([-1.0, 0.0, -1.0], [1.0, 2.0, 1.0])))
        .with_child(SceneNode::new("upper").with_mesh(box_mesh([-1.0, 2.0, -1.0], [1.0, 4.0, 1.0])))
}

/// Everything a [`TickContext`] borrows, owned in one place.
pub struct Harness {
    pub physics: PhysicsContext,
    pub visuals: HeadlessVisuals,
    pub rng: StdRng,
    pub events: Vec<GameEvent>,
    pub timer: GameTimer,
    pub root: VisualId,
}

impl Harness {
    pub fn new() -> Self {
        let mut visuals = HeadlessVisuals::new();
        let root = visuals.attach(&SceneNode::new("root"), None);
        Self {
            physics: PhysicsContext::new(9.81, TICK_DT),
            visuals,
            rng: StdRng::seed_from_u64(7),
            events: Vec::new(),
            timer: GameTimer::new(10.0),
            root,
        }
    }

    pub fn ctx(&mut self) -> TickContext<'_> {
        TickContext {
            physics: &mut self.physics,
            visuals: &mut self.visuals,
            rng: &mut self.rng,
            events: &mut self.events,
            timer: &self.timer,
            root: self.root,
            dt: TICK_DT,
        }
    }
}
