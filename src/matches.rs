use crate::Policy;
use derive_more::Constructor;

/// An accepted correspondence from a source index to a target index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Constructor)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexMatch(pub usize, pub usize);

/// The association sequence and fit score sequence of one association call.
///
/// Entry `i` of [`MatchResult::pairs`] is `Some(j)` if source `i` was associated with
/// target `j`, or `None` if it was left unmatched. The meaning of the fit scores
/// depends on the policy that produced the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pairs: &'a [Option<usize>],
    fit_scores: &'a [f64],
    policy: Policy,
}

impl<'a> MatchResult<'a> {
    /// Wraps the first `pairs.len()` entries of the output buffers.
    ///
    /// Fit scores past `pairs.len()` are ignored. Returns `None` if `fit_scores`
    /// is too short for a policy that reports them.
    pub fn new(pairs: &'a [Option<usize>], fit_scores: &'a [f64], policy: Policy) -> Option<Self> {
        let fit_scores: &'a [f64] = if policy.reports_fit_scores() {
            fit_scores.get(..pairs.len())?
        } else {
            &[]
        };
        Some(Self {
            pairs,
            fit_scores,
            policy,
        })
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn pairs(&self) -> &'a [Option<usize>] {
        self.pairs
    }

    /// The raw fit score sequence, `None` for [`Policy::Basic`] which does not report one.
    ///
    /// Entries of rejected sources are unspecified, prefer [`MatchResult::fit_score`].
    pub fn fit_scores(&self) -> Option<&'a [f64]> {
        self.policy.reports_fit_scores().then_some(self.fit_scores)
    }

    /// The fit score of source `i` if it was matched and the policy reports one.
    pub fn fit_score(&self, i: usize) -> Option<f64> {
        self.pairs.get(i).copied().flatten()?;
        self.fit_scores().and_then(|fit| fit.get(i).copied())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.pairs.iter().flatten().count()
    }

    /// Iterates over the accepted correspondences in source order.
    pub fn matches(&self) -> impl Iterator<Item = IndexMatch> + 'a {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(i, pair)| pair.map(|j| IndexMatch(i, j)))
    }
}

/// Owned output and scratch storage that can be reused across association calls.
///
/// Capacity only changes through [`AssociationBuffers::with_capacity`] and
/// [`AssociationBuffers::reserve`]; association itself fails with
/// [`AssociationError::BufferTooSmall`](crate::AssociationError::BufferTooSmall)
/// rather than growing it.
#[derive(Debug, Clone, Default)]
pub struct AssociationBuffers {
    pub(crate) pairs: Vec<Option<usize>>,
    pub(crate) fit_scores: Vec<f64>,
    pub(crate) scratch: Vec<f64>,
    /// Number of sources in the last successful association.
    pub(crate) len: usize,
}

impl AssociationBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers large enough for `n` sources and `m` targets under `policy`.
    pub fn with_capacity(n: usize, m: usize, policy: Policy) -> Self {
        let mut buffers = Self::new();
        buffers.reserve(n, m, policy);
        buffers
    }

    /// Grows the buffers so they fit `n` sources and `m` targets under `policy`.
    ///
    /// Never shrinks. Invalidates the last result.
    pub fn reserve(&mut self, n: usize, m: usize, policy: Policy) {
        grow(&mut self.pairs, n, None);
        if policy.reports_fit_scores() {
            grow(&mut self.fit_scores, n, 0.0);
        }
        grow(&mut self.scratch, policy.scratch_len(n, m), 0.0);
        self.len = 0;
    }

    /// Number of sources the buffers can hold.
    pub fn capacity(&self) -> usize {
        self.pairs.len()
    }

    pub fn scratch_capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Number of sources in the last association, zero before the first.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The association sequence of the last call.
    pub fn pairs(&self) -> &[Option<usize>] {
        &self.pairs[..self.len]
    }

    pub(crate) fn result(&self, policy: Policy) -> MatchResult<'_> {
        let fit_scores: &[f64] = if policy.reports_fit_scores() {
            &self.fit_scores[..self.len]
        } else {
            &[]
        };
        MatchResult {
            pairs: &self.pairs[..self.len],
            fit_scores,
            policy,
        }
    }
}

fn grow<T: Copy>(buffer: &mut Vec<T>, len: usize, value: T) {
    if buffer.len() < len {
        buffer.resize(len, value);
    }
}
