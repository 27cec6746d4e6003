//! Uniform random sources used by the growth model.
//!
//! Growth only ever needs plain draws in `[0, 1)`, so it talks to a
//! [`UniformSource`] instead of a concrete generator. Any [`rand::Rng`]
//! is a source; [`ReplaySource`] replays a fixed list of draws so that
//! tests can pin every random decision.

use log::warn;
use rand::Rng;

use crate::error::StepError;

/// A stream of uniform draws in `[0, 1)`.
pub trait UniformSource {
    /// Next draw, or `None` once a finite source has run dry.
    fn next_uniform(&mut self) -> Option<f64>;
}

impl<R: Rng> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> Option<f64> {
        Some(self.random::<f64>())
    }
}

/// Replays a fixed sequence of draws in order.
#[derive(Clone, Debug, Default)]
pub struct ReplaySource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ReplaySource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Number of draws handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }
}

impl UniformSource for ReplaySource {
    fn next_uniform(&mut self) -> Option<f64> {
        let draw = self.draws.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(draw)
    }
}

/// Draws until the value is non-zero, allowing at most `max_retries`
/// extra draws after the first.
///
/// Zero is rejected because the draw ends up inside a logarithm.
pub fn draw_nonzero<S: UniformSource + ?Sized>(
    source: &mut S,
    max_retries: usize,
) -> Result<f64, StepError> {
    for attempt in 0..=max_retries {
        let draw = source.next_uniform().ok_or(StepError::SourceExhausted)?;
        if draw != 0.0 {
            return Ok(draw);
        }
        warn!("uniform draw {} was zero, resampling", attempt + 1);
    }
    Err(StepError::DegenerateRandomDraw {
        attempts: max_retries + 1,
    })
}
