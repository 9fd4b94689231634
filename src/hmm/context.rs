use bitflags::bitflags;

use super::model::Model;

/// Score assigned to states excluded by a constraint.
///
/// Finite so that masked cells never meet `-inf` in later additions.
pub const MASKED_SCORE: f64 = -1e8;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CtxOpt: u8 {
        const VITERBI = 0x01;
        const MARGINALS = 0x02;
        const ALL = 0xFF;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResetOpt: u8 {
        const STATE = 0x01;
        const TRANS = 0x02;
        const ALL = 0xFF;
    }
}

#[derive(Debug)]
pub struct HmmContext {
    /// Flag specifying the functionality.
    flag: CtxOpt,
    /// The number of distinct states (N).
    pub num_states: usize,
    /// The number of items (T) in the current sequence.
    num_items: usize,
    /// The number of items the buffers can hold.
    cap_items: usize,
    /// Logarithm of the likelihood of the current sequence.
    log_norm: f64,

    /// Log initial scores, a [N] vector holding ln Pi.
    pub(crate) init: Vec<f64>,
    /// Initial probabilities, a [N] vector holding Pi.
    pub(crate) exp_init: Vec<f64>,
    /// Log transition scores. This is a [N][N] matrix whose element [i][j]
    /// holds ln A[i][j].
    pub(crate) trans: Vec<f64>,
    /// Transition probabilities, the [N][N] matrix A.
    pub(crate) exp_trans: Vec<f64>,
    /// Log emission scores. This is a [T][N] matrix whose element [t][j]
    /// holds ln B[j][x_t].
    pub(crate) state: Vec<f64>,
    /// Emission probabilities, the [T][N] matrix whose element [t][j] is B[j][x_t].
    pub(crate) exp_state: Vec<f64>,

    /// Normalized forward scores, [T][N]. Each row sums to one.
    alpha_score: Vec<f64>,
    /// Backward scores, [T][N], scaled by the forward scale factors.
    beta_score: Vec<f64>,
    /// Scale factors, [T]. Element [t] is the total forward mass at t before
    /// normalization (omega_t).
    scale_factor: Vec<f64>,
    /// Work space, [N].
    row: Vec<f64>,

    /// Best log scores of paths arriving at (t, j), [T][N].
    /// Only allocated with `CtxOpt::VITERBI`.
    delta_score: Vec<f64>,
    /// Backward edges, [T][N]. Element [t][j] is the state at t-1 on the best
    /// path arriving at (t, j). Only allocated with `CtxOpt::VITERBI`.
    backward_edge: Vec<usize>,

    /// Posterior state probabilities, [T][N].
    /// Only allocated with `CtxOpt::MARGINALS`.
    pub(crate) mexp_state: Vec<f64>,
}

impl HmmContext {
    pub fn new(flag: CtxOpt, N: usize, T: usize) -> Self {
        let mut this = Self {
            flag,
            num_states: N,
            num_items: 0,
            cap_items: 0,
            log_norm: 0.0,
            init: vec![0.0; N],
            exp_init: vec![0.0; N],
            trans: vec![0.0; N * N],
            exp_trans: vec![0.0; N * N],
            state: Vec::new(),
            exp_state: Vec::new(),
            alpha_score: Vec::new(),
            beta_score: Vec::new(),
            scale_factor: Vec::new(),
            row: vec![0.0; N],
            delta_score: Vec::new(),
            backward_edge: Vec::new(),
            mexp_state: Vec::new(),
        };
        this.set_num_items(T);
        this.num_items = 0;
        this
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Sets the sequence length, growing the [T][N] buffers when needed.
    pub fn set_num_items(&mut self, T: usize) {
        let N = self.num_states;
        self.num_items = T;
        if self.cap_items < T {
            self.alpha_score.resize(T * N, 0.0);
            self.beta_score.resize(T * N, 0.0);
            self.scale_factor.resize(T, 0.0);
            self.state.resize(T * N, 0.0);
            self.exp_state.resize(T * N, 0.0);
            if self.flag.contains(CtxOpt::VITERBI) {
                self.delta_score.resize(T * N, 0.0);
                self.backward_edge.resize(T * N, 0);
            }
            if self.flag.contains(CtxOpt::MARGINALS) {
                self.mexp_state.resize(T * N, 0.0);
            }
            self.cap_items = T;
        }
    }

    pub fn reset(&mut self, opts: ResetOpt) {
        let T = self.num_items;
        let N = self.num_states;

        if opts.contains(ResetOpt::STATE) {
            for v in &mut self.state[..T * N] {
                *v = 0.0;
            }
            for v in &mut self.exp_state[..T * N] {
                *v = 0.0;
            }
        }
        if opts.contains(ResetOpt::TRANS) {
            for i in 0..N {
                self.init[i] = 0.0;
                self.exp_init[i] = 0.0;
            }
            for i in 0..N * N {
                self.trans[i] = 0.0;
                self.exp_trans[i] = 0.0;
            }
        }
        if self.flag.contains(CtxOpt::MARGINALS) {
            for v in &mut self.mexp_state[..T * N] {
                *v = 0.0;
            }
        }
        self.log_norm = 0.0;
    }

    /// Loads Pi and A, in both the probability and the log domain.
    pub fn set_transition(&mut self, model: &Model) {
        let N = self.num_states;
        for i in 0..N {
            self.exp_init[i] = model.initial()[i];
            self.init[i] = self.exp_init[i].ln();
            for (j, &p) in model.transition_row(i).iter().enumerate() {
                self.exp_trans[N * i + j] = p;
                self.trans[N * i + j] = p.ln();
            }
        }
    }

    /// Loads the emission column B[:, x_t] of every item.
    pub fn set_state(&mut self, model: &Model, x: &[usize]) {
        let N = self.num_states;
        for (t, &o) in x.iter().enumerate() {
            for j in 0..N {
                let p = model.emission_row(j)[o];
                self.exp_state[N * t + j] = p;
                self.state[N * t + j] = p.ln();
            }
        }
    }

    pub fn lognorm(&self) -> f64 {
        self.log_norm
    }

    /// Scaled forward recursion.
    ///
    /// `alpha[t]` is renormalized to sum to one and the mass it had before
    /// normalization is kept in `scale_factor[t]`, so that
    /// ln p(x) = sum_t ln(scale_factor[t]).
    pub fn alpha_score(&mut self) {
        let N = self.num_states;
        let T = self.num_items;
        if T == 0 {
            self.log_norm = 0.0;
            return;
        }

        /* alpha[0][j] = pi[j] * b[j][x_0] */
        for j in 0..N {
            self.alpha_score[j] = self.exp_init[j] * self.exp_state[j];
        }
        self.normalize_alpha(0);

        /* alpha[t][j] = (\sum_{i} alpha[t-1][i] * a[i][j]) * b[j][x_t] */
        for t in 1..T {
            for j in 0..N {
                self.alpha_score[N * t + j] = 0.0;
            }
            for i in 0..N {
                let prev = self.alpha_score[N * (t - 1) + i];
                for j in 0..N {
                    self.alpha_score[N * t + j] += prev * self.exp_trans[N * i + j];
                }
            }
            for j in 0..N {
                self.alpha_score[N * t + j] *= self.exp_state[N * t + j];
            }
            self.normalize_alpha(t);
        }

        self.log_norm = self.scale_factor[..T].iter().map(|c| c.ln()).sum();
    }

    fn normalize_alpha(&mut self, t: usize) {
        let N = self.num_states;
        let alpha = &mut self.alpha_score[N * t..N * (t + 1)];
        let sum: f64 = alpha.iter().sum();
        self.scale_factor[t] = sum;
        /* A zero mass stays zero: ln(0) marks the prefix as impossible. */
        if sum != 0.0 {
            for v in alpha.iter_mut() {
                *v /= sum;
            }
        }
    }

    /// Backward recursion scaled with the forward scale factors.
    ///
    /// Must run after [`alpha_score`](Self::alpha_score).
    pub fn beta_score(&mut self) {
        let N = self.num_states;
        let T = self.num_items;
        if T == 0 {
            return;
        }

        for i in 0..N {
            self.beta_score[N * (T - 1) + i] = 1.0;
        }

        for t in (0..T - 1).rev() {
            /* row[j] = b[j][x_{t+1}] * beta[t+1][j] */
            for j in 0..N {
                self.row[j] = self.beta_score[N * (t + 1) + j] * self.exp_state[N * (t + 1) + j];
            }
            let c = self.scale_factor[t + 1];
            for i in 0..N {
                let mut s = 0.0;
                for j in 0..N {
                    s += self.exp_trans[N * i + j] * self.row[j];
                }
                self.beta_score[N * t + i] = if c != 0.0 { s / c } else { s };
            }
        }
    }

    /// Posterior state probabilities p(s_t = i | x) = alpha'[t][i] * beta'[t][i].
    pub fn marginals(&mut self) {
        let N = self.num_states;
        let T = self.num_items;
        for i in 0..T * N {
            self.mexp_state[i] = self.alpha_score[i] * self.beta_score[i];
        }
    }

    /// Posterior probability of state `l` at position `t`.
    ///
    /// Must run after [`marginals`](Self::marginals). Panics when `t` or `l`
    /// lies outside the current sequence.
    pub fn marginal(&self, l: usize, t: usize) -> f64 {
        let N = self.num_states;
        assert!(t < self.num_items, "position {t} out of range (T: {})", self.num_items);
        assert!(l < N, "state {l} out of range (N: {N})");
        self.mexp_state[N * t + l]
    }

    /// Log-domain Viterbi decoding.
    ///
    /// For every `t >= 1` with `constraints[t] == Some(s)`, the scores of all
    /// states other than `s` at `t` are replaced by [`MASKED_SCORE`] once the
    /// backward edges of `t` are known. The entry at `t = 0` is ignored.
    /// Missing entries count as unconstrained.
    ///
    /// Ties resolve to the lowest state index. Returns the log probability of
    /// the best path and writes the path into `labels`.
    pub fn viterbi(&mut self, labels: &mut [usize], constraints: &[Option<usize>]) -> f64 {
        let N = self.num_states;
        let T = self.num_items;
        if T == 0 {
            return 0.0;
        }

        /* Compute the scores at (0, *). */
        for j in 0..N {
            self.delta_score[j] = self.init[j] + self.state[j];
        }

        /* Compute the scores at (t, *). */
        for t in 1..T {
            for j in 0..N {
                let mut max_score = f64::NEG_INFINITY;
                let mut argmax_score = 0;
                for i in 0..N {
                    /* Transit from (t-1, i) to (t, j). */
                    let score = self.delta_score[N * (t - 1) + i] + self.trans[N * i + j];
                    if score > max_score {
                        max_score = score;
                        argmax_score = i;
                    }
                }
                /* Backward link (t, j) -> (t-1, i). */
                self.backward_edge[N * t + j] = argmax_score;
                self.delta_score[N * t + j] = max_score + self.state[N * t + j];
            }

            if let Some(Some(s)) = constraints.get(t) {
                for i in (0..N).filter(|i| i != s) {
                    self.delta_score[N * t + i] = MASKED_SCORE;
                }
            }
        }

        /* Find the state at T-1 with the maximum score. */
        let mut max_score = f64::NEG_INFINITY;
        labels[T - 1] = 0;
        for i in 0..N {
            let score = self.delta_score[N * (T - 1) + i];
            if score > max_score {
                max_score = score;
                labels[T - 1] = i;
            }
        }
        /* Tag labels by tracing the backward links. */
        for t in (0..T - 1).rev() {
            labels[t] = self.backward_edge[N * (t + 1) + labels[t + 1]];
        }

        max_score
    }

    /// Log joint probability ln p(x, labels) of a given path.
    pub fn score(&self, labels: &[usize]) -> f64 {
        let N = self.num_states;
        let T = self.num_items;
        if T == 0 {
            return 0.0;
        }

        /* Stay at (0, labels[0]). */
        let mut i = labels[0];
        let mut r = self.init[i] + self.state[i];

        for t in 1..T {
            let j = labels[t];
            /* Transit from (t-1, i) to (t, j). */
            r += self.trans[N * i + j];
            r += self.state[N * t + j];
            i = j;
        }
        r
    }
}
