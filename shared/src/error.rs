use thiserror::Error;

/// Failures while turning mesh data into collision geometry.
///
/// Degenerate input is reported instead of producing a silently broken shape; callers
/// decide whether to skip the piece or give up on the whole asset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("convex hull needs at least 4 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("convex hull input is degenerate (all {count} points are coplanar)")]
    Degenerate { count: usize },

    #[error("convex hull construction failed: {0}")]
    HullFailed(String),

    #[error("face index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("mesh has no vertices")]
    EmptyMesh,
}
