use cv_associate::{
    best_in_row, AssociationBuffers, Euclidean, GreedyAssociator, Policy, ScoreFunction,
    SquaredEuclidean,
};
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

const DIMENSIONS: usize = 8;

type Descriptor = [f64; DIMENSIONS];

fn policies() -> [Policy; 4] {
    [
        Policy::basic(0.8),
        Policy::ErrorReport,
        Policy::ambiguity_count(1.5),
        Policy::MutualConsistency,
    ]
}

/// Small integer valued 1d descriptors so ties are common.
fn small(values: &[u8]) -> Vec<[f64; 1]> {
    values.iter().map(|&v| [(v % 16) as f64]).collect()
}

fn random_descriptors(rng: &mut Pcg64, count: usize) -> Vec<Descriptor> {
    (0..count)
        .map(|_| rng.gen::<Descriptor>())
        .collect()
}

fn run<D>(
    a: &[D],
    b: &[D],
    policy: Policy,
) -> (Vec<Option<usize>>, Vec<f64>)
where
    Euclidean: ScoreFunction<D>,
{
    let mut buffers = AssociationBuffers::with_capacity(a.len(), b.len(), policy);
    let result = GreedyAssociator::new(Euclidean, policy)
        .associate_into(a, b, &mut buffers)
        .unwrap();
    (
        result.pairs().to_vec(),
        result.fit_scores().unwrap_or_default().to_vec(),
    )
}

#[quickcheck]
fn associations_are_in_range(a: Vec<u8>, b: Vec<u8>) -> bool {
    let (a, b) = (small(&a), small(&b));
    policies().into_iter().all(|policy| {
        let (pairs, _) = run(&a, &b, policy);
        pairs.len() == a.len() && pairs.iter().flatten().all(|&j| j < b.len())
    })
}

#[quickcheck]
fn empty_targets_are_unmatched(a: Vec<u8>) -> bool {
    let a = small(&a);
    policies()
        .into_iter()
        .all(|policy| run(&a, &[], policy).0.iter().all(Option::is_none))
}

#[quickcheck]
fn ambiguity_count_is_at_least_one(a: Vec<u8>, b: Vec<u8>) -> bool {
    let (a, b) = (small(&a), small(&b));
    if b.is_empty() {
        return true;
    }
    let (pairs, fit_scores) = run(&a, &b, Policy::ambiguity_count(2.0));
    pairs.iter().all(Option::is_some)
        && fit_scores
            .iter()
            .all(|&count| count >= 1.0 && count <= b.len() as f64 && count.fract() == 0.0)
}

#[quickcheck]
fn mutual_matches_agree_backwards(a: Vec<u8>, b: Vec<u8>) -> bool {
    let (a, b) = (small(&a), small(&b));
    let (pairs, fit_scores) = run(&a, &b, Policy::MutualConsistency);
    pairs.iter().enumerate().all(|(i, pair)| match *pair {
        Some(j) => {
            let column: Vec<f64> = a.iter().map(|ai| Euclidean.score(ai, &b[j])).collect();
            best_in_row(&column).map(|best| best.index) == Some(i)
                && fit_scores[i] == Euclidean.score(&a[i], &b[j])
        }
        None => true,
    })
}

#[quickcheck]
fn mutual_matches_are_a_subset_of_error_report(a: Vec<u8>, b: Vec<u8>) -> bool {
    let (a, b) = (small(&a), small(&b));
    let (mutual, _) = run(&a, &b, Policy::MutualConsistency);
    let (greedy, _) = run(&a, &b, Policy::ErrorReport);
    mutual
        .iter()
        .zip(&greedy)
        .all(|(m, g)| m.is_none() || m == g)
}

#[test]
fn deterministic() {
    let mut rng = Pcg64::from_seed([5; 32]);
    let a = random_descriptors(&mut rng, 60);
    let b = random_descriptors(&mut rng, 45);
    for policy in policies() {
        let (first_pairs, first_fit) = run(&a, &b, policy);
        let (second_pairs, second_fit) = run(&a, &b, policy);
        assert_eq!(first_pairs, second_pairs, "{:?}", policy);
        // Fit scores of rejected entries are unspecified.
        for (i, pair) in first_pairs.iter().enumerate() {
            if pair.is_some() && policy.reports_fit_scores() {
                assert_eq!(first_fit[i].to_bits(), second_fit[i].to_bits(), "{:?}", policy);
            }
        }
    }
}

#[test]
fn identical_sets_match_themselves() {
    let mut rng = Pcg64::from_seed([9; 32]);
    let a = random_descriptors(&mut rng, 50);
    for policy in policies() {
        let (pairs, _) = run(&a, &a, policy);
        let expected: Vec<_> = (0..a.len()).map(Some).collect();
        assert_eq!(pairs, expected, "{:?}", policy);
    }
}

#[test]
fn squared_euclidean_orders_like_euclidean() {
    let mut rng = Pcg64::from_seed([3; 32]);
    let a = random_descriptors(&mut rng, 40);
    let b = random_descriptors(&mut rng, 40);
    let mut squared_buffers =
        AssociationBuffers::with_capacity(a.len(), b.len(), Policy::MutualConsistency);
    let squared = GreedyAssociator::new(SquaredEuclidean, Policy::MutualConsistency)
        .associate_into(&a, &b, &mut squared_buffers)
        .unwrap();
    let (pairs, _) = run(&a, &b, Policy::MutualConsistency);
    assert_eq!(squared.pairs(), &pairs[..]);
}
