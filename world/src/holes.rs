//! Spawn locations available to a session.

use glam::Vec3;
use whack_core::{HoleId, HoleLayout};

/// Distance between neighbouring holes of the fallback grid in world units.
const FALLBACK_GRID_SPACING: f32 = 2.0;
/// Number of steps on each side of the origin along both grid axes.
const FALLBACK_GRID_REACH: i32 = 1;

/// Designated spawn location for targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hole {
    id: HoleId,
    position: Vec3,
}

impl Hole {
    /// Identifier of the hole, equal to its index in the registry.
    #[must_use]
    pub const fn id(&self) -> HoleId {
        self.id
    }

    /// World-space position where targets appear.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }
}

/// Ordered set of holes that sessions spawn targets into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoleRegistry {
    holes: Vec<Hole>,
    layout: HoleLayout,
}

impl HoleRegistry {
    /// Creates an empty registry. Sessions refuse to start until it is populated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from explicit hole positions, preserving their order.
    #[must_use]
    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let holes: Vec<Hole> = positions
            .into_iter()
            .enumerate()
            .map(|(index, position)| Hole {
                id: HoleId::new(index as u32),
                position,
            })
            .collect();
        let layout = if holes.is_empty() {
            HoleLayout::Unconfigured
        } else {
            HoleLayout::Explicit
        };
        Self { holes, layout }
    }

    /// Synthesises the 3x3 grid of holes centred on `origin`.
    ///
    /// Holes are spaced two units apart on the horizontal plane. The outer
    /// loop walks the x axis and the inner loop walks the z axis, so hole 0
    /// sits at `origin + (-2, 0, -2)` and hole 8 at `origin + (2, 0, 2)`.
    #[must_use]
    pub fn fallback_grid(origin: Vec3) -> Self {
        let mut positions = Vec::with_capacity(9);
        for x in -FALLBACK_GRID_REACH..=FALLBACK_GRID_REACH {
            for z in -FALLBACK_GRID_REACH..=FALLBACK_GRID_REACH {
                let offset = Vec3::new(
                    x as f32 * FALLBACK_GRID_SPACING,
                    0.0,
                    z as f32 * FALLBACK_GRID_SPACING,
                );
                positions.push(origin + offset);
            }
        }

        let mut registry = Self::from_positions(positions);
        registry.layout = HoleLayout::FallbackGrid;
        registry
    }

    /// Returns `self` when it holds holes, otherwise the fallback grid around `origin`.
    #[must_use]
    pub fn or_fallback(self, origin: Vec3) -> Self {
        if self.is_valid() {
            return self;
        }

        let registry = Self::fallback_grid(origin);
        tracing::info!(
            count = registry.len(),
            "no holes configured, created default holes in 3x3 grid"
        );
        registry
    }

    /// Replaces the hole set with the provided explicit positions.
    pub fn configure(&mut self, positions: impl IntoIterator<Item = Vec3>) {
        *self = Self::from_positions(positions);
    }

    /// Reports whether a session may start with this registry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Number of holes in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holes.len()
    }

    /// Reports whether the registry holds no holes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    /// Describes how the current hole set was produced.
    #[must_use]
    pub const fn layout(&self) -> HoleLayout {
        self.layout
    }

    /// Looks up a hole by identifier.
    #[must_use]
    pub fn get(&self, id: HoleId) -> Option<&Hole> {
        self.holes.get(id.index())
    }

    /// Iterator over the holes in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Hole> {
        self.holes.iter()
    }

    /// Identifiers of every hole in registry order.
    #[must_use]
    pub fn ids(&self) -> Vec<HoleId> {
        self.holes.iter().map(Hole::id).collect()
    }
}
