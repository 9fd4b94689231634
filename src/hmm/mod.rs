//! Discrete hidden Markov models.
//!
//! The free functions below are one-shot wrappers: each builds an
//! [`HmmTagger`] for a single sequence. Decode many sequences through one
//! tagger to reuse its work space.

pub mod context;
pub mod model;
pub mod tagger;
pub mod trainer;

use self::{
    model::Model,
    tagger::{HmmTagger, Tagger},
    trainer::TrainerOpt,
};

/// Estimates `(Pi, A, B)` from paired observation and state sequences by
/// counting, then normalizing each distribution.
///
/// With `smoothed`, every count starts at a floor of `1e-8` so that no
/// probability of the result is exactly zero.
///
/// Pairs must have matching lengths and indices must lie in `[0, N)` and
/// `[0, K)`; this is not checked. Use [`crate::Dataset`] and
/// [`crate::Trainer`] for validated input.
pub fn learn<X, Q>(observations: &[X], states: &[Q], N: usize, K: usize, smoothed: bool) -> Model
where
    X: AsRef<[usize]>,
    Q: AsRef<[usize]>,
{
    let opt = TrainerOpt {
        smoothing: smoothed,
        ..TrainerOpt::default()
    };
    let pairs = observations
        .iter()
        .zip(states)
        .map(|(x, q)| (x.as_ref(), q.as_ref()));
    trainer::estimate(pairs, N, K, &opt)
}

/// Log likelihood ln p(x | model), computed with the scaled forward algorithm.
///
/// Returns `-inf` when the model gives the sequence zero probability.
pub fn log_likelihood(x: &[usize], model: &Model) -> f64 {
    let mut tagger = HmmTagger::new(model);
    tagger.set_seq(x);
    tagger.lognorm()
}

/// Most probable state path for `x` and its log joint probability.
pub fn decode(x: &[usize], model: &Model) -> (Vec<usize>, f64) {
    decode_constrained(x, model, &[])
}

/// Most probable state path for `x` when position `t` is forced to
/// `constraints[t]` wherever it is `Some`.
///
/// Constraints apply from `t = 1` on; an entry at `t = 0` is ignored.
/// Forced positions are enforced with [`context::MASKED_SCORE`], so the
/// returned log probability includes that penalty whenever the forced state
/// could not otherwise be reached.
pub fn decode_constrained(x: &[usize], model: &Model, constraints: &[Option<usize>]) -> (Vec<usize>, f64) {
    let mut tagger = HmmTagger::new(model);
    tagger.set_seq(x);
    let mut labels = vec![0; x.len()];
    let logp = tagger.viterbi_constrained(&mut labels, constraints);
    (labels, logp)
}

/// Log joint probability ln p(x, path | model) of a given state path.
pub fn score(x: &[usize], path: &[usize], model: &Model) -> f64 {
    let mut tagger = HmmTagger::new(model);
    tagger.set_seq(x);
    tagger.score(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin() -> Model {
        Model::from_rows(
            vec![0.5, 0.5],
            &[vec![0.9, 0.1], vec![0.1, 0.9]],
            &[vec![0.8, 0.2], vec![0.2, 0.8]],
        )
        .unwrap()
    }

    #[test]
    fn learn_identity() {
        let xs: Vec<Vec<usize>> = vec![vec![0, 0], vec![1, 1]];
        let qs: Vec<Vec<usize>> = vec![vec![0, 0], vec![1, 1]];
        let model = learn(&xs, &qs, 2, 2, false);
        let (pi, a, b) = model.into_parts();
        assert_eq!(pi, vec![0.5, 0.5]);
        assert_eq!(a, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(b, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn learn_accepts_slices() {
        let xs: [&[usize]; 1] = [&[0, 1]];
        let qs: [&[usize]; 1] = [&[1, 0]];
        let model = learn(&xs, &qs, 2, 2, true);
        assert!(model.transition(0, 0) > 0.0);
        assert!((model.transition(1, 0) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn coin_scenario() {
        let model = coin();
        let x = [0, 0, 1];
        let (path, logp) = decode(&x, &model);
        assert_eq!(&path[..2], &[0, 0]);
        assert!((score(&x, &path, &model) - logp).abs() < 1e-12);
        let ll = log_likelihood(&x, &model);
        assert!(ll.is_finite() && ll < 0.0);
        assert!(ll >= logp);
    }

    #[test]
    fn empty_sequence() {
        let model = coin();
        assert_eq!(log_likelihood(&[], &model), 0.0);
        assert_eq!(decode(&[], &model), (vec![], 0.0));
    }
}
