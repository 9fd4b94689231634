use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Parameters of a discrete hidden Markov model.
///
/// Transition and emission tables are stored row-major: `a[N * i + j]` is
/// P(state j at t+1 | state i at t) and `b[K * i + k]` is P(symbol k | state i).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    num_states: usize,
    num_symbols: usize,
    /// Initial state distribution (Pi), length N.
    pi: Vec<f64>,
    /// Transition matrix (A), N x N.
    a: Vec<f64>,
    /// Emission matrix (B), N x K.
    b: Vec<f64>,
}

fn check_cells(name: &str, cells: &[f64]) -> Result<()> {
    match cells.iter().position(|&p| !p.is_finite() || p < 0.0) {
        Some(i) => Err(Error::InvalidModel(format!(
            "{name}[{i}] = {} is not a probability",
            cells[i]
        ))),
        None => Ok(()),
    }
}

impl Model {
    /// Builds a model from flat row-major tables.
    ///
    /// Rows are not required to sum to one: a state never seen in training
    /// keeps an all-zero row.
    pub fn new(
        num_states: usize,
        num_symbols: usize,
        pi: Vec<f64>,
        a: Vec<f64>,
        b: Vec<f64>,
    ) -> Result<Self> {
        if num_states == 0 || num_symbols == 0 {
            return Err(Error::InvalidModel(format!(
                "empty alphabet (N: {num_states}, K: {num_symbols})"
            )));
        }
        if pi.len() != num_states {
            return Err(Error::InvalidModel(format!(
                "pi has {} entries, expected {num_states}",
                pi.len()
            )));
        }
        if a.len() != num_states * num_states {
            return Err(Error::InvalidModel(format!(
                "a has {} entries, expected {}",
                a.len(),
                num_states * num_states
            )));
        }
        if b.len() != num_states * num_symbols {
            return Err(Error::InvalidModel(format!(
                "b has {} entries, expected {}",
                b.len(),
                num_states * num_symbols
            )));
        }
        check_cells("pi", &pi)?;
        check_cells("a", &a)?;
        check_cells("b", &b)?;
        Ok(Self::from_parts(num_states, num_symbols, pi, a, b))
    }

    /// Builds a model from one vector per matrix row.
    pub fn from_rows(pi: Vec<f64>, a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Self> {
        let N = pi.len();
        let K = b.first().map(|row| row.len()).unwrap_or_default();
        if a.iter().any(|row| row.len() != N) {
            return Err(Error::InvalidModel(format!("a rows must have {N} columns")));
        }
        if b.iter().any(|row| row.len() != K) {
            return Err(Error::InvalidModel(format!("b rows must have {K} columns")));
        }
        Self::new(N, K, pi, a.concat(), b.concat())
    }

    pub(crate) fn from_parts(
        num_states: usize,
        num_symbols: usize,
        pi: Vec<f64>,
        a: Vec<f64>,
        b: Vec<f64>,
    ) -> Self {
        Self {
            num_states,
            num_symbols,
            pi,
            a,
            b,
        }
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    pub fn initial(&self) -> &[f64] {
        &self.pi
    }

    pub fn transition(&self, i: usize, j: usize) -> f64 {
        self.transition_row(i)[j]
    }

    pub fn emission(&self, i: usize, k: usize) -> f64 {
        self.emission_row(i)[k]
    }

    pub fn transition_row(&self, i: usize) -> &[f64] {
        &self.a[self.num_states * i..self.num_states * (i + 1)]
    }

    pub fn emission_row(&self, i: usize) -> &[f64] {
        &self.b[self.num_symbols * i..self.num_symbols * (i + 1)]
    }

    /// Splits the model into `(Pi, A, B)` with one vector per matrix row.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let a = self.a.chunks(self.num_states).map(<[f64]>::to_vec).collect();
        let b = self.b.chunks(self.num_symbols).map(<[f64]>::to_vec).collect();
        (self.pi, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Model {
        Model::from_rows(
            vec![0.6, 0.4],
            &[vec![0.7, 0.3], vec![0.4, 0.6]],
            &[vec![0.1, 0.4, 0.5], vec![0.6, 0.3, 0.1]],
        )
        .unwrap()
    }

    #[test]
    fn from_rows() {
        let model = weather();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_symbols(), 3);
        assert_eq!(model.transition(1, 0), 0.4);
        assert_eq!(model.emission(0, 2), 0.5);
        assert_eq!(model.emission_row(1), &[0.6, 0.3, 0.1]);
    }

    #[test]
    fn into_parts() {
        let (pi, a, b) = weather().into_parts();
        assert_eq!(pi, vec![0.6, 0.4]);
        assert_eq!(a, vec![vec![0.7, 0.3], vec![0.4, 0.6]]);
        assert_eq!(b[1], vec![0.6, 0.3, 0.1]);
    }

    #[test]
    fn invalid_model() {
        let shapes = [
            Model::new(0, 2, vec![], vec![], vec![]),
            Model::new(2, 2, vec![1.0], vec![0.5; 4], vec![0.5; 4]),
            Model::new(2, 2, vec![0.5; 2], vec![0.5; 3], vec![0.5; 4]),
            Model::new(2, 2, vec![0.5; 2], vec![0.5; 4], vec![0.5; 5]),
            Model::new(2, 2, vec![0.5, -0.5], vec![0.5; 4], vec![0.5; 4]),
            Model::new(2, 2, vec![0.5; 2], vec![f64::NAN; 4], vec![0.5; 4]),
            Model::from_rows(vec![0.5; 2], &[vec![1.0], vec![1.0]], &[vec![1.0], vec![1.0]]),
        ];
        for r in shapes.iter() {
            match r {
                Err(Error::InvalidModel(..)) => {}
                _ => panic!("expected invalid model, got {:?}", r),
            }
        }
    }

    #[test]
    fn serde_roundtrip() {
        let model = weather();
        let s = serde_json::to_string(&model).unwrap();
        let restored: Model = serde_json::from_str(&s).unwrap();
        assert_eq!(model, restored);
    }
}
