//! Per-tick simulation phases for the noise grid.
//!
//! A tick runs them in order, each one finishing for every element before
//! the next starts:
//! 1. [`offset_phase`] — noise displacement of every element at `elapsed`.
//! 2. [`partition_phase`] — split indices into inside/outside the query volume.
//! 3. [`selection_phase`] — write the scale and color implied by the split.
//! 4. [`present_phase`] — assemble the index-ordered frame for the render sink.
//!
//! Phases only see borrowed buffers; the [`FrameDriver`](crate::driver::FrameDriver)
//! owns them and decides which phases run.

use crate::{
    bounds::QueryVolume,
    jobs::JobRunner,
    noise::NoiseMotion,
    render::Instance,
    selection::{Partition, SelectionStyle, apply_selection},
    types::Rgba,
};
use glam::Vec3;

/// Recomputes the noise displacement of every element.
///
/// For each index `i`:
///
/// 1. Reads the immutable lattice origin `origins[i]`.
/// 2. Evaluates [`NoiseMotion::offset`] at that origin and `elapsed`.
/// 3. Overwrites `offsets[i]` with the result.
///
/// Offsets are a pure function of origin and time, so the previous tick's
/// values are never read.
///
/// ### Parameters
/// - `runner` - Executes the per-element map, in parallel or sequentially.
/// - `motion` - Amplitude and per-axis frequencies of the displacement.
/// - `origins` - Lattice origins, one per element.
/// - `elapsed` - Seconds since the clock started.
/// - `offsets` - Output buffer, index-aligned with `origins`.
///
/// ### Panics
/// Panics if the two buffers differ in length.
pub fn offset_phase(
    runner: &JobRunner,
    motion: &NoiseMotion,
    origins: &[Vec3],
    elapsed: f32,
    offsets: &mut [Vec3],
) {
    assert_eq!(origins.len(), offsets.len());

    // Each task writes only its own slot.
    runner.map_indexed(offsets, |i| motion.offset(origins[i], elapsed));
}

/// Rebuilds `partition` against `volume`.
///
/// 1. Clears both index lists of the previous tick.
/// 2. Collects, in ascending order, every index whose displaced position
///    `origins[i] + offsets[i]` lies inside `volume` (faces included).
/// 3. Collects every remaining index into `outside`, also ascending.
///
/// ### Parameters
/// - `runner` - Executes the order-preserving filters.
/// - `origins` - Lattice origins, one per element.
/// - `offsets` - Displacements from [`offset_phase`] for this tick.
/// - `volume` - Axis-aligned query box for this tick.
/// - `partition` - Overwritten with the new split.
pub fn partition_phase(
    runner: &JobRunner,
    origins: &[Vec3],
    offsets: &[Vec3],
    volume: &QueryVolume,
    partition: &mut Partition,
) {
    partition.recompute(runner, origins, offsets, volume);
}

/// Applies the highlighted/normal visual state for `partition`.
///
/// Every index in `partition.inside` gets the highlight scale and color;
/// every index in `partition.outside` is restored to the normal ones.
/// Running it twice with the same partition changes nothing.
///
/// ### Parameters
/// - `runner` - Executes the per-element writes.
/// - `partition` - Split produced by [`partition_phase`].
/// - `style` - Target scale and color for each side.
/// - `scales` - Per-element scale, overwritten.
/// - `colors` - Per-element color, overwritten.
///
/// ### Panics
/// Panics if the partition is not an exact cover of the buffers' indices.
pub fn selection_phase(
    runner: &JobRunner,
    partition: &Partition,
    style: &SelectionStyle,
    scales: &mut [Vec3],
    colors: &mut [Rgba],
) {
    apply_selection(runner, partition, style, scales, colors);
}

/// Fills `frame` with one [`Instance`] per element, in index order.
///
/// For each index `i`:
///
/// 1. Computes the displayed position `origins[i] + offsets[i]`.
/// 2. Copies the scale and color written by [`selection_phase`].
/// 3. Stores the record, tagged with `i`, in `frame[i]`.
///
/// ### Parameters
/// - `runner` - Executes the per-element map.
/// - `origins`, `offsets`, `scales`, `colors` - Per-element inputs.
/// - `frame` - Output handed to the render sink afterwards.
///
/// ### Panics
/// Panics if any buffer length differs from `origins.len()`.
pub fn present_phase(
    runner: &JobRunner,
    origins: &[Vec3],
    offsets: &[Vec3],
    scales: &[Vec3],
    colors: &[Rgba],
    frame: &mut [Instance],
) {
    let len = origins.len();
    assert!(
        offsets.len() == len && scales.len() == len && colors.len() == len && frame.len() == len,
        "frame buffers must all hold {len} elements"
    );

    // Position is recomputed rather than cached, so it always matches `offsets`.
    runner.map_indexed(frame, |i| Instance {
        index: i,
        position: origins[i] + offsets[i],
        color: colors[i],
        scale: scales[i],
    });
}
