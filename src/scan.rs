//! The scanning primitive shared by every association policy.
//!
//! All scans visit the targets in index order and only replace a register on a
//! strictly lower score, so ties always resolve to the earliest index.

use crate::ScoreFunction;
use derive_more::Constructor;
use float_ord::FloatOrd;

/// A target index together with the score it achieved.
#[derive(Debug, Clone, Copy, PartialEq, Constructor)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub index: usize,
    pub score: f64,
}

/// The best and second best candidates for one source descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestTwo {
    /// Lowest score, earliest index on ties.
    pub best: Candidate,
    /// Lowest score among every index other than `best.index`.
    ///
    /// `None` if there was only a single target.
    pub second: Option<Candidate>,
}

impl BestTwo {
    /// `best / second`, the quantity the ratio test thresholds.
    ///
    /// `None` if there is no second best or it scored zero.
    pub fn ratio(&self) -> Option<f64> {
        self.second
            .filter(|second| second.score != 0.0)
            .map(|second| self.best.score / second.score)
    }
}

/// Finds the best and second best target for `a`.
///
/// Returns `None` if `targets` is empty.
pub fn best_two<D, S>(score: &S, a: &D, targets: &[D]) -> Option<BestTwo>
where
    S: ScoreFunction<D> + ?Sized,
{
    let mut best: Option<Candidate> = None;
    let mut second: Option<Candidate> = None;
    for (index, b) in targets.iter().enumerate() {
        let candidate = Candidate::new(index, score.score(a, b));
        match best {
            Some(current) if candidate.score < current.score => {
                // The displaced best beats everything else seen so far.
                second = Some(current);
                best = Some(candidate);
            }
            Some(_) => {
                if second.map_or(true, |s| candidate.score < s.score) {
                    second = Some(candidate);
                }
            }
            None => best = Some(candidate),
        }
    }
    best.map(|best| BestTwo { best, second })
}

/// Scores `a` against every target, writing the score of target `j` into `row[j]`.
///
/// Returns the best candidate, or `None` if `targets` is empty.
/// `row` must be at least `targets.len()` long; entries past that are left untouched.
pub fn scan_row<D, S>(score: &S, a: &D, targets: &[D], row: &mut [f64]) -> Option<Candidate>
where
    S: ScoreFunction<D> + ?Sized,
{
    let row = &mut row[..targets.len()];
    for (slot, b) in row.iter_mut().zip(targets) {
        *slot = score.score(a, b);
    }
    best_in_row(row)
}

/// The lowest score in an already computed row, earliest index on ties.
pub fn best_in_row(row: &[f64]) -> Option<Candidate> {
    row.iter()
        .enumerate()
        .min_by_key(|&(_, &s)| FloatOrd(s))
        .map(|(index, &score)| Candidate::new(index, score))
}
