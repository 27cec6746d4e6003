//! Core 3-D root system growth library (Diggle's Rootmap model).
//!
//! Main components:
//! - [`types`] — root states and shared type aliases.
//! - [`config`] — growth parameters and simulation configuration.
//! - [`random`] — injectable uniform random sources.
//! - [`sampler`] — the stochastic direction update and its local frame.
//! - [`trajectory`] — single-step integration and trajectory building.
//! - [`branch`] — secondary roots derived from a primary trajectory.
//! - [`simulation`] — end-to-end run producing a [`simulation::RootSystem`].
//! - [`projection`] — 2-D projections of the result for plotting.
//! - [`error`] — error types for every layer.

pub mod branch;
pub mod config;
pub mod error;
pub mod projection;
pub mod random;
pub mod sampler;
pub mod simulation;
pub mod trajectory;
pub mod types;
