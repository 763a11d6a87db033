// src/sampling.rs - Per-call bookkeeping shared by the curve and line detectors

use rand::Rng;
use std::fmt;

/// Tracks which contour points are already claimed by an accepted primitive.
///
/// One pool lives for exactly one detection call. `used` is the authoritative
/// flag per contour index, `unused` is the shrinking list seeds are drawn from.
#[derive(Debug, Clone)]
pub struct SamplingPool {
    used: Vec<bool>,
    unused: Vec<usize>,
}

impl SamplingPool {
    pub fn new(len: usize) -> Self {
        Self {
            used: vec![false; len],
            unused: (0..len).collect(),
        }
    }

    /// Number of contour points
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    #[inline]
    pub fn is_used(&self, index: usize) -> bool {
        self.used[index]
    }

    pub fn unused_count(&self) -> usize {
        self.unused.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.unused.is_empty()
    }

    /// Cyclic index `offset` positions away from `index`
    #[inline]
    pub fn offset_index(&self, index: usize, offset: isize) -> usize {
        let n = self.len() as isize;
        (index as isize + offset).rem_euclid(n) as usize
    }

    /// Draw a seed from the unused pool plus `K` companions within
    /// ±`cluster_epsilon` positions of it.
    ///
    /// The draw is repeated up to `attempts` times until every companion is
    /// unused. Companions may coincide with the seed or each other; the caller
    /// rejects such degenerate samples geometrically.
    pub fn sample<R: Rng + ?Sized, const K: usize>(
        &self,
        rng: &mut R,
        cluster_epsilon: usize,
        attempts: usize,
    ) -> Option<(usize, [usize; K])> {
        if self.unused.is_empty() {
            return None;
        }
        let eps = cluster_epsilon as isize;

        'attempt: for _ in 0..attempts {
            let seed = self.unused[rng.gen_range(0..self.unused.len())];
            let mut companions = [seed; K];
            for slot in companions.iter_mut() {
                let index = self.offset_index(seed, rng.gen_range(-eps..=eps));
                if self.used[index] {
                    continue 'attempt;
                }
                *slot = index;
            }
            return Some((seed, companions));
        }

        None
    }

    /// Walk outward from `seed` collecting unused points accepted by `qualifies`.
    ///
    /// The forward walk starts at the seed itself, the backward walk at the
    /// point before it. Each direction takes at most `len / 2` steps and stops
    /// once `cluster_epsilon` steps pass without a qualifying point. Claimed
    /// points are skipped but still count as steps.
    pub fn walk_support<F>(&self, seed: usize, cluster_epsilon: usize, mut qualifies: F) -> Vec<usize>
    where
        F: FnMut(usize) -> bool,
    {
        let half = self.len() / 2;
        let mut support = Vec::new();

        for (first_step, sign) in [(0usize, 1isize), (1, -1)] {
            let mut last_hit = 0usize;
            let mut step = first_step;
            while step < half && step - last_hit < cluster_epsilon {
                let index = self.offset_index(seed, sign * step as isize);
                if !self.used[index] && qualifies(index) {
                    support.push(index);
                    last_hit = step;
                }
                step += 1;
            }
        }

        support
    }

    /// Mark `indices` as used and drop them from the unused pool
    pub fn claim(&mut self, indices: &[usize]) {
        for &index in indices {
            self.used[index] = true;
        }
        let used = &self.used;
        self.unused.retain(|&index| !used[index]);
    }
}

/// Why a single fitting trial was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No seed/companion combination of unused points could be drawn
    NoQualifyingSample,
    /// Sampled points were (near-)collinear or coincident
    Degenerate,
    RadiusOutOfRange,
    OrientationMismatch,
    NarrowSpan,
    TooShort,
}

/// Per-pass rejection counters, reported at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectionStats {
    pub no_sample: usize,
    pub degenerate: usize,
    pub radius: usize,
    pub orientation: usize,
    pub span: usize,
    pub length: usize,
}

impl RejectionStats {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::NoQualifyingSample => self.no_sample += 1,
            Rejection::Degenerate => self.degenerate += 1,
            Rejection::RadiusOutOfRange => self.radius += 1,
            Rejection::OrientationMismatch => self.orientation += 1,
            Rejection::NarrowSpan => self.span += 1,
            Rejection::TooShort => self.length += 1,
        }
    }
}

impl fmt::Display for RejectionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no_sample={} degenerate={} radius={} orientation={} span={} length={}",
            self.no_sample, self.degenerate, self.radius, self.orientation, self.span, self.length
        )
    }
}
