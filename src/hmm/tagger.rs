use super::{
    context::{CtxOpt, HmmContext, ResetOpt},
    model::Model,
};

/// Sequence decoder bound to a fixed set of model parameters.
pub trait Tagger {
    /// Sets the observation sequence to work on.
    fn set_seq(&mut self, x: &[usize]);
    /// Length of the current sequence.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Writes the most probable state path into `labels` and returns its log probability.
    fn viterbi(&mut self, labels: &mut [usize]) -> f64;
    /// Like [`viterbi`](Self::viterbi), pinning `t >= 1` to `constraints[t]` where set.
    fn viterbi_constrained(&mut self, labels: &mut [usize], constraints: &[Option<usize>]) -> f64;
    /// Log likelihood ln p(x) of the current sequence.
    fn lognorm(&mut self) -> f64;
    /// Posterior probability of state `l` at position `t`.
    ///
    /// Panics when `t` is past the current sequence or `l` is not a state.
    fn marginal_point(&mut self, l: usize, t: usize) -> f64;
    /// Log joint probability of the current sequence along `path`.
    fn score(&self, path: &[usize]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    None,
    Set,
    Alpha,
    AlphaBeta,
}

/// Tagger for discrete-emission models.
///
/// The work space is sized to the longest sequence seen so far and reused,
/// so one tagger per thread is enough to decode a whole corpus.
pub struct HmmTagger<'a> {
    model: &'a Model,
    ctx: HmmContext,
    level: Level,
}

impl<'a> HmmTagger<'a> {
    pub fn new(model: &'a Model) -> Self {
        let mut ctx = HmmContext::new(CtxOpt::VITERBI | CtxOpt::MARGINALS, model.num_states(), 0);
        ctx.reset(ResetOpt::TRANS);
        ctx.set_transition(model);
        Self {
            model,
            ctx,
            level: Level::None,
        }
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    fn forward(&mut self) {
        if self.level < Level::Alpha {
            self.ctx.alpha_score();
            self.level = Level::Alpha;
        }
    }

    fn forward_backward(&mut self) {
        self.forward();
        if self.level < Level::AlphaBeta {
            self.ctx.beta_score();
            self.ctx.marginals();
            self.level = Level::AlphaBeta;
        }
    }
}

impl<'a> Tagger for HmmTagger<'a> {
    fn set_seq(&mut self, x: &[usize]) {
        let T = x.len();
        self.ctx.set_num_items(T);
        self.ctx.reset(ResetOpt::STATE);
        self.ctx.set_state(self.model, x);
        log::debug!("set sequence (T: {T})");
        self.level = Level::Set;
    }

    fn len(&self) -> usize {
        self.ctx.num_items()
    }

    fn viterbi(&mut self, labels: &mut [usize]) -> f64 {
        self.ctx.viterbi(labels, &[])
    }

    fn viterbi_constrained(&mut self, labels: &mut [usize], constraints: &[Option<usize>]) -> f64 {
        if let Some(Some(s)) = constraints.first() {
            log::debug!("constraint at t=0 (state {s}) is not applied");
        }
        self.ctx.viterbi(labels, constraints)
    }

    fn lognorm(&mut self) -> f64 {
        self.forward();
        self.ctx.lognorm()
    }

    fn marginal_point(&mut self, l: usize, t: usize) -> f64 {
        self.forward_backward();
        self.ctx.marginal(l, t)
    }

    fn score(&self, path: &[usize]) -> f64 {
        self.ctx.score(path)
    }
}
