//! Core library for a noise-animated 3-D grid of cubes with box selection.
//!
//! Main components:
//! - [`grid`] — lattice generation and index enumeration.
//! - [`noise`] — Perlin noise and the per-element motion offset.
//! - [`bounds`] — query volume, containment and index filtering.
//! - [`selection`] — inside/outside partition and visual state reducer.
//! - [`phases`] — the per-tick pipeline stages.
//! - [`driver`] — lifecycle and tick state machine owning the buffers.
//! - [`jobs`] — parallel map/filter over index ranges.
//! - [`config`] — simulation configuration.
//! - [`render`], [`clock`] — collaborator interfaces.
//! - [`error`], [`types`] — shared errors, IDs and colors.

pub mod bounds;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod jobs;
pub mod noise;
pub mod phases;
pub mod render;
pub mod selection;
pub mod types;
