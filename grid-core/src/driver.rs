//! Frame driver: owns the per-element buffers and runs one tick at a time.
//!
//! The host calls [`FrameDriver::initialize`] once, then [`FrameDriver::tick`]
//! every frame, then [`FrameDriver::teardown`]. Ticks borrow the driver
//! mutably, so two ticks can never overlap.

use crate::{
    bounds::QueryVolume,
    clock::FrameTime,
    config::Config,
    error::GridError,
    grid::Grid,
    jobs::JobRunner,
    noise::NoiseMotion,
    phases,
    render::{Instance, RenderSink},
    selection::{Partition, SelectionStyle},
    types::Rgba,
};
use glam::{Mat4, Vec3};
use tracing::{info, trace};

/// Position of the driver within a tick.
///
/// Outside of [`FrameDriver::tick`] the driver is always `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    Idle,
    OffsetsComputed,
    Partitioned,
    StateApplied,
    Presented,
}

impl FrameStage {
    pub fn next(self) -> Self {
        match self {
            FrameStage::Idle => FrameStage::OffsetsComputed,
            FrameStage::OffsetsComputed => FrameStage::Partitioned,
            FrameStage::Partitioned => FrameStage::StateApplied,
            FrameStage::StateApplied => FrameStage::Presented,
            FrameStage::Presented => FrameStage::Idle,
        }
    }
}

/// Summary of one completed tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Zero-based tick number since the last initialize.
    pub tick: u64,
    pub elapsed: f32,
    pub inside: usize,
    pub outside: usize,
}

/// Buffers that only exist between initialize and teardown.
#[derive(Debug)]
struct FrameBuffers {
    grid: Grid,
    offsets: Vec<Vec3>,
    scales: Vec<Vec3>,
    colors: Vec<Rgba>,
    frame: Vec<Instance>,
    partition: Partition,
}

/// Reserves exactly `len` slots, mapping allocation failure to a
/// configuration error instead of aborting.
fn reserve<T>(buffer: &'static str, len: usize) -> Result<Vec<T>, GridError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|err| {
        GridError::InvalidConfiguration(format!(
            "cannot allocate {len} elements for '{buffer}': {err}"
        ))
    })?;
    Ok(v)
}

impl FrameBuffers {
    /// Generates the lattice and allocates every per-element buffer in its
    /// resting state: zero offsets, normal style, everything outside.
    ///
    /// ### Parameters
    /// - `edge_size` - Lattice edge length `E`; the grid holds `E³` elements.
    /// - `spacing` - Distance between neighbouring lattice points.
    /// - `style` - Provides the normal scale and color for the resting frame.
    ///
    /// ### Returns
    /// - `Ok(buffers)` when every allocation succeeded.
    /// - `Err(GridError::InvalidConfiguration)` if any buffer cannot be
    ///   allocated.
    fn allocate(
        edge_size: usize,
        spacing: f32,
        style: &SelectionStyle,
    ) -> Result<Self, GridError> {
        let len = edge_size * edge_size * edge_size;

        // Reserve everything first so a failure leaves nothing half-built.
        let origins = reserve("origins", len)?;
        let mut offsets = reserve("offsets", len)?;
        let mut scales = reserve("scales", len)?;
        let mut colors = reserve("colors", len)?;
        let mut frame = reserve("frame", len)?;
        let mut partition = Partition::try_with_capacity(len).map_err(|err| {
            GridError::InvalidConfiguration(format!(
                "cannot allocate {len} elements for 'partition': {err}"
            ))
        })?;

        let grid = Grid::generate_into(edge_size, spacing, origins);

        // Resting state: the frame shows the bare lattice.
        offsets.resize(len, Vec3::ZERO);
        scales.resize(len, style.normal_scale);
        colors.resize(len, style.normal_color);
        frame.extend(grid.origins.iter().enumerate().map(|(index, &position)| Instance {
            index,
            position,
            color: style.normal_color,
            scale: style.normal_scale,
        }));
        partition.all_outside(len);

        Ok(Self {
            grid,
            offsets,
            scales,
            colors,
            frame,
            partition,
        })
    }

    /// Confirms every buffer holds exactly `expected` elements.
    fn check_lengths(&self, expected: usize) -> Result<(), GridError> {
        let lengths = [
            ("origins", self.grid.len()),
            ("offsets", self.offsets.len()),
            ("scales", self.scales.len()),
            ("colors", self.colors.len()),
            ("frame", self.frame.len()),
        ];
        for (buffer, actual) in lengths {
            if actual != expected {
                return Err(GridError::BufferSizeMismatch {
                    buffer,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct FrameDriver {
    cfg: Config,
    len: usize,
    motion: NoiseMotion,
    style: SelectionStyle,
    runner: JobRunner,
    stage: FrameStage,
    ticks: u64,
    buffers: Option<FrameBuffers>,
}

impl FrameDriver {
    /// Validates `cfg` and prepares the job runner.
    ///
    /// No element buffers are allocated until [`FrameDriver::initialize`],
    /// so an invalid configuration never costs an allocation.
    ///
    /// ### Parameters
    /// - `cfg` - Grid, motion, styling and scheduling configuration.
    ///
    /// ### Returns
    /// - `Ok(driver)` in the uninitialized state.
    /// - `Err(GridError::InvalidConfiguration)` if [`Config::validate`]
    ///   rejects `cfg`.
    /// - `Err(GridError::ThreadPoolBuild)` if the worker pool cannot start.
    pub fn new(cfg: Config) -> Result<Self, GridError> {
        let len = cfg.validate()?;
        let runner = JobRunner::new(cfg.schedule, cfg.batch_size, cfg.num_threads)?;

        Ok(Self {
            len,
            motion: NoiseMotion::new(cfg.amplitude, cfg.frequencies),
            style: SelectionStyle::from(&cfg),
            runner,
            stage: FrameStage::Idle,
            ticks: 0,
            buffers: None,
            cfg,
        })
    }

    /// [`FrameDriver::new`] followed by [`FrameDriver::initialize`].
    pub fn with_initialized(cfg: Config) -> Result<Self, GridError> {
        let mut driver = Self::new(cfg)?;
        driver.initialize()?;
        Ok(driver)
    }

    /// Generates the grid and allocates every per-element buffer.
    ///
    /// After this call:
    /// - [`FrameDriver::frame`] holds the resting lattice in the normal style.
    /// - The partition puts every element outside.
    /// - The tick counter is back at zero.
    ///
    /// ### Returns
    /// - `Ok(())` once the driver is ready to tick.
    /// - `Err(GridError::AlreadyInitialized)` if called twice without a
    ///   [`FrameDriver::teardown`] in between.
    /// - `Err(GridError::InvalidConfiguration)` if the buffers cannot be
    ///   allocated on this machine.
    pub fn initialize(&mut self) -> Result<(), GridError> {
        if self.buffers.is_some() {
            return Err(GridError::AlreadyInitialized);
        }

        let buffers =
            FrameBuffers::allocate(self.cfg.edge_size as usize, self.cfg.spacing, &self.style)?;
        buffers.check_lengths(self.len)?;

        info!(
            elements = self.len,
            edge_size = self.cfg.edge_size,
            schedule = ?self.runner.schedule(),
            threads = self.runner.num_threads(),
            "frame driver initialized"
        );

        self.buffers = Some(buffers);
        self.stage = FrameStage::Idle;
        self.ticks = 0;
        Ok(())
    }

    /// Releases every per-element buffer.
    ///
    /// The driver keeps its configuration and worker pool, so
    /// [`FrameDriver::initialize`] may be called again afterwards.
    ///
    /// ### Returns
    /// - `Ok(())` once the buffers are dropped.
    /// - `Err(GridError::NotInitialized)` if there is nothing to release.
    pub fn teardown(&mut self) -> Result<(), GridError> {
        if self.buffers.take().is_none() {
            return Err(GridError::NotInitialized);
        }
        info!(elements = self.len, ticks = self.ticks, "frame driver torn down");
        self.stage = FrameStage::Idle;
        Ok(())
    }

    /// Runs one full tick and presents the result to `sink`.
    ///
    /// Stages run in [`FrameStage`] order, each completing for every element
    /// before the next begins:
    ///
    /// 1. [`phases::offset_phase`] displaces every element for `time.elapsed`.
    /// 2. [`phases::partition_phase`] splits the indices against `volume`.
    /// 3. [`phases::selection_phase`] writes the highlighted or normal state.
    /// 4. [`phases::present_phase`] builds the frame and hands it to `sink`.
    ///
    /// With `selection_enabled` off, stages 2 and 3 are skipped and every
    /// element keeps the normal state. The driver is `Idle` again on return.
    ///
    /// ### Parameters
    /// - `time` - Clock reading supplied by the host; only read, never advanced.
    /// - `volume` - Query volume for this tick.
    /// - `sink` - Receives exactly [`FrameDriver::len`] instances in element
    ///   index order.
    ///
    /// ### Returns
    /// - `Ok(report)` summarizing the tick.
    /// - `Err(GridError::NotInitialized)` outside the initialize/teardown
    ///   bracket; `sink` is not called in that case.
    pub fn tick<S>(
        &mut self,
        time: FrameTime,
        volume: &QueryVolume,
        sink: &mut S,
    ) -> Result<TickReport, GridError>
    where
        S: RenderSink + ?Sized,
    {
        let buffers = self.buffers.as_mut().ok_or(GridError::NotInitialized)?;
        debug_assert_eq!(self.stage, FrameStage::Idle);
        let runner = &self.runner;

        phases::offset_phase(
            runner,
            &self.motion,
            &buffers.grid.origins,
            time.elapsed,
            &mut buffers.offsets,
        );
        self.stage = self.stage.next();

        if self.cfg.selection_enabled {
            phases::partition_phase(
                runner,
                &buffers.grid.origins,
                &buffers.offsets,
                volume,
                &mut buffers.partition,
            );
        }
        self.stage = self.stage.next();

        if self.cfg.selection_enabled {
            phases::selection_phase(
                runner,
                &buffers.partition,
                &self.style,
                &mut buffers.scales,
                &mut buffers.colors,
            );
        }
        self.stage = self.stage.next();

        phases::present_phase(
            runner,
            &buffers.grid.origins,
            &buffers.offsets,
            &buffers.scales,
            &buffers.colors,
            &mut buffers.frame,
        );
        sink.present(&buffers.frame);
        self.stage = self.stage.next();

        let report = TickReport {
            tick: self.ticks,
            elapsed: time.elapsed,
            inside: buffers.partition.inside.len(),
            outside: buffers.partition.outside.len(),
        };
        trace!(
            tick = report.tick,
            elapsed = report.elapsed,
            delta = time.delta,
            inside = report.inside,
            outside = report.outside,
            "tick presented"
        );

        self.ticks += 1;
        self.stage = self.stage.next();
        Ok(report)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of elements, `edge_size³`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    /// Number of ticks completed since the last initialize.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn origins(&self) -> Option<&[Vec3]> {
        self.buffers.as_ref().map(|b| b.grid.origins.as_slice())
    }

    pub fn offsets(&self) -> Option<&[Vec3]> {
        self.buffers.as_ref().map(|b| b.offsets.as_slice())
    }

    pub fn partition(&self) -> Option<&Partition> {
        self.buffers.as_ref().map(|b| &b.partition)
    }

    /// Most recently presented frame, or the resting grid before the first tick.
    pub fn frame(&self) -> Option<&[Instance]> {
        self.buffers.as_ref().map(|b| b.frame.as_slice())
    }

    /// TRS matrices of [`FrameDriver::frame`], for instanced drawing.
    pub fn transforms(&self) -> Option<Vec<Mat4>> {
        self.frame()
            .map(|frame| frame.iter().map(Instance::transform).collect())
    }
}
