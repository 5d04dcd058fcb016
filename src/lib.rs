//! # CV Associate
//!
//! Greedy association of feature descriptors between two frames or images.
//!
//! Given a source collection `a` (length `n`) and a target collection `b` (length `m`)
//! of descriptors, and a [`ScoreFunction`] where lower means more similar, every
//! policy finds the best target for each source by scanning all of `b` and then
//! decides whether to keep it:
//!
//! * [`basic`] keeps a match only if it passes a ratio test against the second best.
//! * [`error_report`] keeps every match and reports its raw score.
//! * [`ambiguity_count`] keeps every match and reports how many targets scored
//!   nearly as well as the best.
//! * [`mutual_consistency`] keeps a match only if the source is also the best match
//!   of the target (symmetric matching).
//!
//! Ties are always resolved in favor of the earliest index, so results are
//! reproducible. The scan is quadratic on purpose; the collections this is meant
//! for are small enough that a full scan beats building an index.
//!
//! No policy allocates. Output and scratch memory is supplied by the caller, either as
//! plain slices or through [`AssociationBuffers`], and can be reused frame after frame.
//! A buffer that is too small is reported as [`AssociationError::BufferTooSmall`]
//! before anything is written.
//!
//! ```
//! use cv_associate::{mutual_consistency, Euclidean};
//!
//! let a = [[1.0], [2.0], [3.0], [4.0]];
//! let b = [[3.0], [4.0], [1.0], [40.0]];
//! let mut scratch = [0.0; 16];
//! let mut pairs = [None; 4];
//! let mut fit_scores = [0.0; 4];
//! mutual_consistency(&a, &b, &Euclidean, &mut scratch, &mut pairs, &mut fit_scores).unwrap();
//! assert_eq!(pairs, [Some(2), None, Some(0), Some(1)]);
//! ```

mod error;
mod greedy;
mod matches;
mod scan;
mod score;

pub use error::*;
pub use greedy::*;
pub use matches::*;
pub use scan::*;
pub use score::*;
pub use space;
