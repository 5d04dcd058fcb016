use crate::error::check_capacity;
use crate::{
    best_two, scan_row, AssociationBuffers, AssociationError, BestTwo, Buffer, MatchResult,
    ScoreFunction,
};
use derive_more::Constructor;
use log::*;
use std::cmp::Ordering;

/// Ratio used by [`Policy::default`], the commonly quoted value for Lowe's ratio test.
pub const DEFAULT_FIT_THRESHOLD: f64 = 0.8;

/// Associates each descriptor in `a` with its best match in `b`, rejecting matches
/// that are not clearly better than the second best.
///
/// A match is accepted if there is no second best, if the best score is exactly zero,
/// or if `best < fit_threshold * second_best`. Rejected entries are `None`.
///
/// # Arguments
/// * `a` - The source descriptors.
/// * `b` - The target descriptors.
/// * `score` - Scores a pair of descriptors, lower is better.
/// * `fit_threshold` - Ratio threshold in `(0, 1]`.
/// * `pairs` - Output; the first `a.len()` entries receive the association.
pub fn basic<D, S>(
    a: &[D],
    b: &[D],
    score: &S,
    fit_threshold: f64,
    pairs: &mut [Option<usize>],
) -> Result<(), AssociationError>
where
    S: ScoreFunction<D> + ?Sized,
{
    if !(fit_threshold > 0.0 && fit_threshold <= 1.0) {
        return Err(AssociationError::InvalidParameter {
            name: "fit_threshold",
            value: fit_threshold,
        });
    }
    check_capacity(Buffer::Pairs, a.len(), pairs.len())?;
    debug!(
        "Basic association of {} onto {} descriptors with fit threshold {}.",
        a.len(),
        b.len(),
        fit_threshold
    );
    for (i, (pair, a)) in pairs.iter_mut().zip(a).enumerate() {
        *pair = best_two(score, a, b).and_then(|found| {
            if passes_ratio_test(&found, fit_threshold) {
                Some(found.best.index)
            } else {
                trace!(
                    "Rejected {} -> {}: best {} second {:?}.",
                    i,
                    found.best.index,
                    found.best.score,
                    found.second.map(|s| s.score)
                );
                None
            }
        });
    }
    log_accepted(&pairs[..a.len()]);
    Ok(())
}

fn passes_ratio_test(found: &BestTwo, fit_threshold: f64) -> bool {
    match found.second {
        Some(second) if found.best.score != 0.0 => found.best.score < fit_threshold * second.score,
        _ => true,
    }
}

/// Associates every descriptor in `a` with its best match in `b` and reports the
/// raw score of that match. Nothing is rejected unless `b` is empty.
///
/// Useful to characterise the error distribution of a descriptor and metric.
pub fn error_report<D, S>(
    a: &[D],
    b: &[D],
    score: &S,
    pairs: &mut [Option<usize>],
    fit_scores: &mut [f64],
) -> Result<(), AssociationError>
where
    S: ScoreFunction<D> + ?Sized,
{
    check_capacity(Buffer::Pairs, a.len(), pairs.len())?;
    check_capacity(Buffer::FitScores, a.len(), fit_scores.len())?;
    debug!(
        "Error report association of {} onto {} descriptors.",
        a.len(),
        b.len()
    );
    for ((pair, fit), a) in pairs.iter_mut().zip(fit_scores.iter_mut()).zip(a) {
        *pair = best_two(score, a, b).map(|found| {
            *fit = found.best.score;
            found.best.index
        });
    }
    log_accepted(&pairs[..a.len()]);
    Ok(())
}

/// Associates every descriptor in `a` with its best match in `b` and reports how
/// many targets scored within `max_ratio` times the best score.
///
/// The count includes the best match itself, so it is never below one. It is
/// written to `fit_scores` as an integer valued float.
///
/// # Arguments
/// * `max_ratio` - Tolerance band, must be finite and at least `1`.
/// * `scratch` - Holds one row of scores, needs at least `b.len()` entries.
pub fn ambiguity_count<D, S>(
    a: &[D],
    b: &[D],
    score: &S,
    max_ratio: f64,
    scratch: &mut [f64],
    pairs: &mut [Option<usize>],
    fit_scores: &mut [f64],
) -> Result<(), AssociationError>
where
    S: ScoreFunction<D> + ?Sized,
{
    if !(max_ratio >= 1.0 && max_ratio.is_finite()) {
        return Err(AssociationError::InvalidParameter {
            name: "max_ratio",
            value: max_ratio,
        });
    }
    check_capacity(Buffer::Pairs, a.len(), pairs.len())?;
    check_capacity(Buffer::FitScores, a.len(), fit_scores.len())?;
    check_capacity(Buffer::Scratch, b.len(), scratch.len())?;
    debug!(
        "Ambiguity count association of {} onto {} descriptors with max ratio {}.",
        a.len(),
        b.len(),
        max_ratio
    );
    let row = &mut scratch[..b.len()];
    for ((pair, fit), a) in pairs.iter_mut().zip(fit_scores.iter_mut()).zip(a) {
        *pair = scan_row(score, a, b, row).map(|best| {
            let tolerance = max_ratio * best.score;
            *fit = row.iter().filter(|&&s| s <= tolerance).count() as f64;
            best.index
        });
    }
    log_accepted(&pairs[..a.len()]);
    Ok(())
}

/// Associates descriptors in `a` and `b` only where each is the other's best match.
///
/// The forward pass finds the best target for every source, the backward check
/// then keeps a match `i -> j` only if `i` is also the best source for `j`, ties
/// going to the earliest index in both directions. Accepted entries report the
/// match score; the fit score of rejected entries is unspecified.
///
/// # Arguments
/// * `scratch` - Holds the full score matrix, needs at least `a.len() * b.len()` entries.
pub fn mutual_consistency<D, S>(
    a: &[D],
    b: &[D],
    score: &S,
    scratch: &mut [f64],
    pairs: &mut [Option<usize>],
    fit_scores: &mut [f64],
) -> Result<(), AssociationError>
where
    S: ScoreFunction<D> + ?Sized,
{
    let (n, m) = (a.len(), b.len());
    check_capacity(Buffer::Pairs, n, pairs.len())?;
    check_capacity(Buffer::FitScores, n, fit_scores.len())?;
    check_capacity(Buffer::Scratch, n.saturating_mul(m), scratch.len())?;
    debug!(
        "Mutual consistency association of {} onto {} descriptors.",
        n, m
    );
    let pairs = &mut pairs[..n];
    if m == 0 {
        pairs.fill(None);
        return Ok(());
    }

    // Forward pass, row i of the matrix holds the scores of a[i] against all of b.
    let matrix = &mut scratch[..n * m];
    for ((pair, fit), (a, row)) in pairs
        .iter_mut()
        .zip(fit_scores.iter_mut())
        .zip(a.iter().zip(matrix.chunks_exact_mut(m)))
    {
        *pair = scan_row(score, a, b, row).map(|best| {
            *fit = best.score;
            best.index
        });
    }

    // Backward check over the columns of the same matrix.
    let matrix = &scratch[..n * m];
    for (i, pair) in pairs.iter_mut().enumerate() {
        if let Some(j) = *pair {
            if !is_column_best(matrix, m, i, j) {
                trace!("Rejected {} -> {}: not mutual.", i, j);
                *pair = None;
            }
        }
    }
    log_accepted(pairs);
    Ok(())
}

/// Whether row `i` is the earliest lowest score in column `j` of a row-major matrix with `m` columns.
fn is_column_best(matrix: &[f64], m: usize, i: usize, j: usize) -> bool {
    let own = matrix[i * m + j];
    matrix[j..]
        .iter()
        .step_by(m)
        .enumerate()
        .all(|(k, &s)| match k.cmp(&i) {
            Ordering::Less => s > own,
            Ordering::Equal => true,
            Ordering::Greater => s >= own,
        })
}

fn log_accepted(pairs: &[Option<usize>]) {
    debug!(
        "Accepted {} of {} associations.",
        pairs.iter().flatten().count(),
        pairs.len()
    );
}

/// Selects the acceptance rule of a [`GreedyAssociator`] and carries its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    /// Ratio test against the second best, see [`basic`].
    Basic { fit_threshold: f64 },
    /// Always assign and report the raw score, see [`error_report`].
    ErrorReport,
    /// Always assign and report the near tie count, see [`ambiguity_count`].
    AmbiguityCount { max_ratio: f64 },
    /// Forward/backward agreement, see [`mutual_consistency`].
    MutualConsistency,
}

impl Policy {
    pub fn basic(fit_threshold: f64) -> Self {
        Self::Basic { fit_threshold }
    }

    pub fn ambiguity_count(max_ratio: f64) -> Self {
        Self::AmbiguityCount { max_ratio }
    }

    /// Number of scratch entries this policy needs for `n` sources and `m` targets.
    pub fn scratch_len(&self, n: usize, m: usize) -> usize {
        match self {
            Self::Basic { .. } | Self::ErrorReport => 0,
            Self::AmbiguityCount { .. } => m,
            Self::MutualConsistency => n.saturating_mul(m),
        }
    }

    /// Whether this policy writes the fit score sequence.
    pub fn reports_fit_scores(&self) -> bool {
        !matches!(self, Self::Basic { .. })
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::basic(DEFAULT_FIT_THRESHOLD)
    }
}

/// Greedy descriptor association with a fixed score function and policy.
///
/// The associator holds no mutable state, so a shared reference can be used from
/// several threads at once as long as each call gets its own buffers.
///
/// ```
/// use cv_associate::{Euclidean, GreedyAssociator, Policy};
///
/// let a = [[1.0], [2.0], [3.0], [4.0]];
/// let b = [[3.0], [4.0], [1.0], [40.0]];
/// let associator = GreedyAssociator::new(Euclidean, Policy::basic(0.5));
/// let mut pairs = [None; 4];
/// associator.associate(&a, &b, &mut [], &mut pairs, &mut []).unwrap();
/// assert_eq!(pairs, [Some(2), None, Some(0), Some(1)]);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Constructor)]
pub struct GreedyAssociator<S> {
    pub score: S,
    pub policy: Policy,
}

impl<S> GreedyAssociator<S> {
    /// Runs the configured policy on caller supplied buffers.
    ///
    /// `fit_scores` is neither checked nor written by [`Policy::Basic`], and
    /// `scratch` only needs [`Policy::scratch_len`] entries.
    pub fn associate<D>(
        &self,
        a: &[D],
        b: &[D],
        scratch: &mut [f64],
        pairs: &mut [Option<usize>],
        fit_scores: &mut [f64],
    ) -> Result<(), AssociationError>
    where
        S: ScoreFunction<D>,
    {
        match self.policy {
            Policy::Basic { fit_threshold } => basic(a, b, &self.score, fit_threshold, pairs),
            Policy::ErrorReport => error_report(a, b, &self.score, pairs, fit_scores),
            Policy::AmbiguityCount { max_ratio } => {
                ambiguity_count(a, b, &self.score, max_ratio, scratch, pairs, fit_scores)
            }
            Policy::MutualConsistency => {
                mutual_consistency(a, b, &self.score, scratch, pairs, fit_scores)
            }
        }
    }

    /// Runs the configured policy on reusable buffers and returns a view of the result.
    ///
    /// The buffers are never resized here, call [`AssociationBuffers::reserve`] first.
    pub fn associate_into<'a, D>(
        &self,
        a: &[D],
        b: &[D],
        buffers: &'a mut AssociationBuffers,
    ) -> Result<MatchResult<'a>, AssociationError>
    where
        S: ScoreFunction<D>,
    {
        buffers.len = 0;
        self.associate(
            a,
            b,
            &mut buffers.scratch,
            &mut buffers.pairs,
            &mut buffers.fit_scores,
        )?;
        buffers.len = a.len();
        Ok(buffers.result(self.policy))
    }
}
