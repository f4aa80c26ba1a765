//! Inside/outside partition of the grid and the visual state it implies.

use crate::{
    bounds::{QueryVolume, Side, classify},
    config::Config,
    jobs::JobRunner,
    types::{ElementId, Rgba},
};
use glam::Vec3;
use std::collections::TryReserveError;

/// Tick-local split of element indices against the query volume.
///
/// Both lists are ascending, disjoint, and together cover `[0, len)`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Partition {
    pub inside: Vec<ElementId>,
    pub outside: Vec<ElementId>,
}

impl Partition {
    /// Reserves room for `len` indices on each side.
    ///
    /// ### Returns
    /// - `Ok(partition)` with both lists empty.
    /// - `Err` if either reservation fails.
    pub fn try_with_capacity(len: usize) -> Result<Self, TryReserveError> {
        let mut partition = Self::default();
        partition.inside.try_reserve_exact(len)?;
        partition.outside.try_reserve_exact(len)?;
        Ok(partition)
    }

    /// Recomputes both lists from scratch; previous contents are discarded.
    pub fn recompute(
        &mut self,
        runner: &JobRunner,
        origins: &[Vec3],
        offsets: &[Vec3],
        volume: &QueryVolume,
    ) {
        classify(runner, origins, offsets, volume, Side::Inside, &mut self.inside);
        classify(runner, origins, offsets, volume, Side::Outside, &mut self.outside);
    }

    /// Puts every index in `outside`.
    pub fn all_outside(&mut self, len: usize) {
        self.inside.clear();
        self.outside.clear();
        self.outside.extend(0..len);
    }

    /// Resolves the side of every element.
    ///
    /// ### Panics
    /// Panics if an index is `>= len`, appears twice, or is missing.
    pub fn membership(&self, len: usize) -> Vec<Side> {
        let mut sides: Vec<Option<Side>> = vec![None; len];
        for (list, side) in [(&self.inside, Side::Inside), (&self.outside, Side::Outside)] {
            for &id in list {
                assert!(id < len, "partition index {id} out of range {len}");
                assert!(
                    sides[id].replace(side).is_none(),
                    "element {id} assigned to more than one side"
                );
            }
        }
        sides
            .into_iter()
            .enumerate()
            .map(|(id, side)| side.unwrap_or_else(|| panic!("element {id} missing from partition")))
            .collect()
    }
}

/// Target scale and color for each side of the partition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionStyle {
    pub highlight_scale: Vec3,
    pub highlight_color: Rgba,
    pub normal_scale: Vec3,
    pub normal_color: Rgba,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            highlight_scale: Vec3::splat(1.5),
            highlight_color: Rgba::GREEN,
            normal_scale: Vec3::ONE,
            normal_color: Rgba::WHITE,
        }
    }
}

impl From<&Config> for SelectionStyle {
    fn from(cfg: &Config) -> Self {
        Self {
            highlight_scale: Vec3::splat(cfg.highlight_scale),
            highlight_color: cfg.highlight_color,
            normal_scale: Vec3::splat(cfg.normal_scale),
            normal_color: cfg.normal_color,
        }
    }
}

impl SelectionStyle {
    #[inline]
    pub fn for_side(&self, side: Side) -> (Vec3, Rgba) {
        match side {
            Side::Inside => (self.highlight_scale, self.highlight_color),
            Side::Outside => (self.normal_scale, self.normal_color),
        }
    }
}

/// Writes the scale and color implied by `partition` for every element.
///
/// Re-applying the same partition leaves the buffers unchanged.
///
/// ### Panics
/// Panics if `scales` and `colors` differ in length, or if the partition
/// is not an exact cover of `[0, scales.len())`.
pub fn apply_selection(
    runner: &JobRunner,
    partition: &Partition,
    style: &SelectionStyle,
    scales: &mut [Vec3],
    colors: &mut [Rgba],
) {
    assert_eq!(scales.len(), colors.len());
    let sides = partition.membership(scales.len());

    runner.map_indexed(scales, |i| style.for_side(sides[i]).0);
    runner.map_indexed(colors, |i| style.for_side(sides[i]).1);
}
