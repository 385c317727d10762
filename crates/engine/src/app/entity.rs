use std::num::NonZeroU64;

use rand::Rng;

use super::{Direction, Vec2};
use crate::config::SpawnTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

/// Spawn-duration policy and visual treatment, keyed by a stable integer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityVariant {
    /// Base lifetime plus a uniform jitter in `0..=jitter_ms`.
    Jittered,
    /// Base lifetime plus a fixed offset.
    Offset,
}

impl EntityVariant {
    pub const ALL: [EntityVariant; 2] = [EntityVariant::Jittered, EntityVariant::Offset];

    pub const fn tag(self) -> u8 {
        match self {
            EntityVariant::Jittered => 0,
            EntityVariant::Offset => 1,
        }
    }

    pub fn lifetime_ms<R: Rng + ?Sized>(self, tuning: &SpawnTuning, rng: &mut R) -> NonZeroU64 {
        let extra = match self {
            EntityVariant::Jittered => rng.random_range(0..=tuning.jitter_ms),
            EntityVariant::Offset => tuning.fixed_offset_ms,
        };
        let total = tuning.base_lifetime_ms.saturating_add(extra);
        NonZeroU64::new(total).unwrap_or(NonZeroU64::MIN)
    }
}

/// One timed approach. Immutable once spawned; the queue owns the live copy
/// and everyone else works from snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    expiry_ms: u64,
    lifetime_ms: NonZeroU64,
    direction: Direction,
    variant: EntityVariant,
}

impl Entity {
    pub fn new(
        id: EntityId,
        expiry_ms: u64,
        lifetime_ms: NonZeroU64,
        direction: Direction,
        variant: EntityVariant,
    ) -> Self {
        Self {
            id,
            expiry_ms,
            lifetime_ms,
            direction,
            variant,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn expiry_ms(&self) -> u64 {
        self.expiry_ms
    }

    pub fn lifetime_ms(&self) -> u64 {
        self.lifetime_ms.get()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn variant(&self) -> EntityVariant {
        self.variant
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expiry_ms < now_ms
    }

    /// Time left as a fraction of the lifetime. Above 1.0 before the entity
    /// enters its lifetime window, negative once it is overdue.
    pub fn remaining_fraction(&self, now_ms: u64) -> f32 {
        let remaining = self.expiry_ms as i128 - now_ms as i128;
        remaining as f32 / self.lifetime_ms.get() as f32
    }

    pub fn is_visible(&self, now_ms: u64) -> bool {
        self.remaining_fraction(now_ms) <= 1.0
    }

    /// Position on the approach lane, `distance` at the start of the
    /// lifetime window and the origin at expiry.
    pub fn approach_position(&self, now_ms: u64, distance: f32) -> Vec2 {
        let fraction = self.remaining_fraction(now_ms).clamp(0.0, 1.0);
        Vec2::new(0.0, fraction * distance).rotate_toward(self.direction)
    }
}
