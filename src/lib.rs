//! Supervised learning, likelihood and decoding for discrete hidden Markov models.
//!
//! ```
//! use hmmsuite::{decode, learn, log_likelihood};
//!
//! let xs: Vec<Vec<usize>> = vec![vec![0, 0, 1], vec![1, 1, 0]];
//! let qs: Vec<Vec<usize>> = vec![vec![0, 0, 1], vec![1, 1, 0]];
//! let model = learn(&xs, &qs, 2, 2, true);
//!
//! let (path, logp) = decode(&[0, 0, 1], &model);
//! assert_eq!(path, vec![0, 0, 1]);
//! assert!(logp <= log_likelihood(&[0, 0, 1], &model));
//! ```
#![allow(non_snake_case)]

pub mod alphabet;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hmm;

pub use crate::{
    alphabet::Alphabet,
    dataset::{Dataset, Sequence},
    error::{Error, Result},
    evaluation::{Estimation, Evaluation},
    hmm::{
        context::MASKED_SCORE,
        decode, decode_constrained, learn, log_likelihood,
        model::Model,
        score,
        tagger::{HmmTagger, Tagger},
        trainer::{Trainer, TrainerOpt},
    },
};
