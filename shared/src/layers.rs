//! Collision layers and group/mask filters.
//!
//! Two colliders interact when each one's group intersects the other's mask. A filter with every
//! bit set in both fields collides with everything, including layers defined later.

use rapier3d::prelude::{Group, InteractionGroups};

use crate::{bitmask_flags::BitmaskFlags, define_bitmask_flags};

define_bitmask_flags!(CollisionLayer, u32, {
    Player,
    Land,
    Wall,
    Building,
    WaterParticle,
    SeaLevel,
});

pub type LayerSet = BitmaskFlags<u32>;

/// Membership (`group`) and interaction (`mask`) bits for one collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CollisionFilter {
    pub group: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl CollisionFilter {
    /// Member of every layer, collides with every layer.
    pub const fn all() -> Self {
        Self {
            group: u32::MAX,
            mask: u32::MAX,
        }
    }

    /// Member of `layer`, collides with every layer.
    pub fn layer(layer: CollisionLayer) -> Self {
        Self {
            group: LayerSet::from_flags(&[layer]).bits,
            mask: u32::MAX,
        }
    }

    /// Member of `layer`, collides only with `targets`.
    pub fn layer_against(layer: CollisionLayer, targets: &[CollisionLayer]) -> Self {
        Self {
            group: LayerSet::from_flags(&[layer]).bits,
            mask: LayerSet::from_flags(targets).bits,
        }
    }

    #[inline]
    pub fn with_mask(self, mask: u32) -> Self {
        Self { mask, ..self }
    }

    #[inline]
    pub fn mask_is_all(&self) -> bool {
        LayerSet::new(self.mask).is_all()
    }

    /// Symmetric group/mask test.
    pub fn interacts_with(&self, other: &CollisionFilter) -> bool {
        LayerSet::new(self.group).intersects(&LayerSet::new(other.mask))
            && LayerSet::new(other.group).intersects(&LayerSet::new(self.mask))
    }

    pub fn interaction_groups(&self) -> InteractionGroups {
        InteractionGroups::all()
            .with_memberships(Group::from_bits_truncate(self.group))
            .with_filter(Group::from_bits_truncate(self.mask))
    }
}
