use crate::{jobs::JobRunner, types::ElementId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned query box given by its center and half-extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl QueryVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Builds the box spanning two opposite corners, in any order.
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Inclusive containment: points on a face count as inside.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        let min = self.min();
        let max = self.max();
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// The eight corners, bit `i` of the corner index choosing max on axis `i`.
    pub fn corners(&self) -> [Vec3; 8] {
        let min = self.min();
        let max = self.max();
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
    }
}

/// Whether an element displaced by `offset` from `origin` lies in `volume`.
#[inline]
pub fn is_inside(origin: Vec3, offset: Vec3, volume: &QueryVolume) -> bool {
    volume.contains(origin + offset)
}

/// Which side of the query volume a filter pass keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Inside,
    Outside,
}

impl Side {
    #[inline]
    pub fn keeps(self, inside: bool) -> bool {
        match self {
            Side::Inside => inside,
            Side::Outside => !inside,
        }
    }
}

/// Replaces `out` with the ascending indices whose displaced position lies
/// on `side` of `volume`.
///
/// ### Panics
/// Panics if `origins` and `offsets` differ in length.
pub fn classify(
    runner: &JobRunner,
    origins: &[Vec3],
    offsets: &[Vec3],
    volume: &QueryVolume,
    side: Side,
    out: &mut Vec<ElementId>,
) {
    assert_eq!(origins.len(), offsets.len());
    runner.filter_indices(origins.len(), out, |i| {
        side.keeps(is_inside(origins[i], offsets[i], volume))
    });
}
