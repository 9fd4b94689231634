use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::model::Model;
use crate::{
    error::{Error, Result},
    Dataset,
};

/// Estimation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerOpt {
    /// Start every count at `epsilon` instead of zero.
    pub smoothing: bool,
    /// Uniform floor added to every cell when smoothing. This is not add-one
    /// smoothing: the floor is tiny compared to a single observed count.
    pub epsilon: f64,
}

impl Default for TrainerOpt {
    fn default() -> Self {
        Self {
            smoothing: false,
            epsilon: 1e-8,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

impl TrainerOpt {
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        };
        match name {
            "smoothing" => self.smoothing = parse_flag(value).ok_or_else(invalid)?,
            "epsilon" => {
                let eps: f64 = value.parse().map_err(|_| invalid())?;
                if !(eps > 0.0 && eps.is_finite()) {
                    return Err(invalid());
                }
                self.epsilon = eps;
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    fn floor(&self) -> f64 {
        if self.smoothing {
            self.epsilon
        } else {
            0.0
        }
    }
}

/// Supervised estimator of model parameters from labeled sequences.
#[derive(Debug, Default)]
pub struct Trainer {
    opt: TrainerOpt,
}

impl Trainer {
    pub fn new(smoothing: bool) -> Self {
        Self {
            opt: TrainerOpt {
                smoothing,
                ..TrainerOpt::default()
            },
        }
    }

    /// Sets a parameter by name, e.g. `trainer.set("epsilon", "1e-6")`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.opt.set(name, value)?;
        log::debug!("set parameter {name}={value}");
        Ok(())
    }

    pub fn params(&self) -> &TrainerOpt {
        &self.opt
    }

    pub fn train(&self, ds: &Dataset) -> Model {
        estimate(
            ds.iter().map(|seq| (&seq.observations[..], &seq.states[..])),
            ds.num_states(),
            ds.num_symbols(),
            &self.opt,
        )
    }
}

/// Divides every row by its sum; an all-zero row stays all-zero.
fn normalize_rows(m: &mut [f64], width: usize) {
    for row in m.chunks_mut(width) {
        let sum: f64 = row.iter().sum();
        let sum = if sum == 0.0 { 1.0 } else { sum };
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
}

/// Counts initial states, transitions and emissions over labeled pairs and
/// normalizes the counts into a model.
///
/// Indices are not validated: values outside `[0, N)` / `[0, K)` panic.
pub(crate) fn estimate<'s, I>(pairs: I, N: usize, K: usize, opt: &TrainerOpt) -> Model
where
    I: IntoIterator<Item = (&'s [usize], &'s [usize])>,
{
    let begin = Instant::now();
    log::info!(
        "learn (N: {N}, K: {K}, smoothing: {}, epsilon: {})",
        opt.smoothing,
        opt.epsilon
    );
    let floor = opt.floor();
    let mut pi = vec![floor; N];
    let mut a = vec![floor; N * N];
    let mut b = vec![floor; N * K];

    let mut num_seqs = 0;
    let mut num_items = 0;
    for (x, q) in pairs {
        let T = q.len();
        if T == 0 {
            log::warn!("skip empty sequence #{num_seqs}");
            continue;
        }
        pi[q[0]] += 1.0;
        for t in 0..T - 1 {
            a[N * q[t]..N * (q[t] + 1)][q[t + 1]] += 1.0;
            b[K * q[t]..K * (q[t] + 1)][x[t]] += 1.0;
        }
        /* Emission of the last item. */
        b[K * q[T - 1]..K * (q[T - 1] + 1)][x[T - 1]] += 1.0;
        num_seqs += 1;
        num_items += T;
    }

    normalize_rows(&mut a, N);
    normalize_rows(&mut b, K);
    let total: f64 = pi.iter().sum();
    if total == 0.0 {
        log::warn!("no initial state observed, pi is undefined");
    }
    for v in pi.iter_mut() {
        *v /= total;
    }

    log::info!(
        "sequences: {num_seqs}, items: {num_items}, time cost: {:?}",
        begin.elapsed()
    );
    Model::from_parts(N, K, pi, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_params() {
        let mut trainer = Trainer::default();
        assert!(!trainer.params().smoothing);
        trainer.set("smoothing", "1").unwrap();
        trainer.set("epsilon", "1e-6").unwrap();
        assert!(trainer.params().smoothing);
        assert_eq!(trainer.params().epsilon, 1e-6);
        trainer.set("smoothing", "false").unwrap();
        assert!(!trainer.params().smoothing);
    }

    #[test]
    fn set_invalid_params() {
        let mut trainer = Trainer::new(true);
        for (name, value) in [("c2", "0.1"), ("smoothing", "yes"), ("epsilon", "abc"), ("epsilon", "-1"), ("epsilon", "inf")].iter() {
            match trainer.set(name, value) {
                Err(Error::InvalidParameter { .. }) => {}
                r => panic!("{}={} accepted: {:?}", name, value, r),
            }
        }
        assert_eq!(trainer.params(), &TrainerOpt { smoothing: true, epsilon: 1e-8 });
    }

    #[test]
    fn normalize_zero_row() {
        let mut m = vec![1.0, 3.0, 0.0, 0.0];
        normalize_rows(&mut m, 2);
        assert_eq!(m, vec![0.25, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn counts_last_emission_once() {
        let xs = [vec![1usize, 0, 1]];
        let qs = [vec![0usize, 0, 0]];
        let opt = TrainerOpt::default();
        let model = estimate(xs.iter().zip(qs.iter()).map(|(x, q)| (&x[..], &q[..])), 1, 2, &opt);
        /* three emissions from state 0: two of symbol 1, one of symbol 0 */
        assert!((model.emission(0, 0) - 1.0 / 3.0).abs() < 1e-12);
        assert!((model.emission(0, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(model.transition(0, 0), 1.0);
    }

    #[test]
    fn skip_empty_sequences() {
        let xs: [Vec<usize>; 2] = [vec![], vec![1]];
        let qs: [Vec<usize>; 2] = [vec![], vec![1]];
        let model = estimate(xs.iter().zip(qs.iter()).map(|(x, q)| (&x[..], &q[..])), 2, 2, &TrainerOpt::default());
        assert_eq!(model.initial(), &[0.0, 1.0]);
    }

    #[test]
    #[should_panic]
    fn symbol_out_of_range() {
        let xs = [vec![2usize, 0]];
        let qs = [vec![0usize, 1]];
        estimate(xs.iter().zip(qs.iter()).map(|(x, q)| (&x[..], &q[..])), 2, 2, &TrainerOpt::default());
    }

    #[test]
    #[should_panic]
    fn next_state_out_of_range() {
        let xs = [vec![0usize, 0]];
        let qs = [vec![0usize, 2]];
        estimate(xs.iter().zip(qs.iter()).map(|(x, q)| (&x[..], &q[..])), 2, 3, &TrainerOpt::default());
    }

    #[test]
    #[should_panic]
    fn last_symbol_out_of_range() {
        let xs = [vec![0usize, 1, 3]];
        let qs = [vec![0usize, 0, 0]];
        estimate(xs.iter().zip(qs.iter()).map(|(x, q)| (&x[..], &q[..])), 2, 3, &TrainerOpt::default());
    }
}
