use num_traits::AsPrimitive;
use space::Metric;

/// Scores how well two descriptors match. Lower is better.
///
/// Implementations must be deterministic and must only ever return finite,
/// non-negative values. The associators do not check this: a score function
/// that returns `NaN` or negative values produces unspecified associations.
/// Symmetry is not required.
pub trait ScoreFunction<D: ?Sized> {
    fn score(&self, a: &D, b: &D) -> f64;
}

impl<D: ?Sized, S: ScoreFunction<D> + ?Sized> ScoreFunction<D> for &S {
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        (**self).score(a, b)
    }
}

/// Euclidean (L2) distance between two real valued descriptors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Euclidean;

impl<D: AsRef<[f64]> + ?Sized> ScoreFunction<D> for Euclidean {
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        SquaredEuclidean.score(a, b).sqrt()
    }
}

/// Squared Euclidean distance.
///
/// Orders candidates exactly like [`Euclidean`] without the square root, but the
/// reported fit scores and the ratio used by [`basic`](crate::basic) are squared too.
/// A ratio threshold `t` for [`Euclidean`] corresponds to `t * t` here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SquaredEuclidean;

impl<D: AsRef<[f64]> + ?Sized> ScoreFunction<D> for SquaredEuclidean {
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        a.as_ref()
            .iter()
            .zip(b.as_ref())
            .map(|(&x, &y)| (x - y) * (x - y))
            .sum()
    }
}

/// Sum of absolute differences (L1 distance).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SumAbsoluteDifference;

impl<D: AsRef<[f64]> + ?Sized> ScoreFunction<D> for SumAbsoluteDifference {
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        a.as_ref()
            .iter()
            .zip(b.as_ref())
            .map(|(&x, &y)| (x - y).abs())
            .sum()
    }
}

/// Adapts a [`space::Metric`] so it can be used as a score function.
///
/// This is how binary descriptors plug in, for instance AKAZE descriptors
/// (`BitArray<64>`) scored with `bitarray::Hamming`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricScore<M>(pub M);

impl<D, M> ScoreFunction<D> for MetricScore<M>
where
    M: Metric<D>,
    M::Unit: AsPrimitive<f64>,
{
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        self.0.distance(a, b).as_()
    }
}

/// Wraps a closure as a score function.
#[derive(Debug, Clone, Copy)]
pub struct ScoreFn<F>(pub F);

impl<D: ?Sized, F> ScoreFunction<D> for ScoreFn<F>
where
    F: Fn(&D, &D) -> f64,
{
    #[inline]
    fn score(&self, a: &D, b: &D) -> f64 {
        (self.0)(a, b)
    }
}
