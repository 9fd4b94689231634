use std::{fmt::Display, iter::zip};

use crate::alphabet::Alphabet;

/// State-wise performance values.
#[derive(Debug, Default, Clone)]
struct LabelMeasure {
    /// Number of correct predictions.
    num_correct: usize,
    /// Number of occurrences of the state in the reference paths.
    num_observation: usize,
    /// Number of predictions.
    num_prediction: usize,
    precision: f64,
    recall: f64,
    fmeasure: f64,
}

/// Accumulates decoded paths against reference state sequences.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Number of states.
    pub num_labels: usize,
    tbl: Vec<LabelMeasure>,
    names: Vec<String>,

    /// Number of correctly predicted items.
    item_total_correct: usize,
    /// Total number of items.
    item_total_num: usize,
    item_accuracy: f64,

    /// Number of sequences predicted without a single error.
    inst_total_correct: usize,
    /// Total number of sequences.
    inst_total_num: usize,
    inst_accuracy: f64,

    macro_precision: f64,
    macro_recall: f64,
    macro_fmeasure: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
    pub item_accuracy: f64,
    pub sequence_accuracy: f64,
}

impl Evaluation {
    pub fn new(num_labels: usize) -> Self {
        Self {
            num_labels,
            tbl: vec![LabelMeasure::default(); num_labels],
            ..Default::default()
        }
    }

    /// Uses the alphabet's symbols instead of indices when displaying states.
    pub fn with_names(mut self, states: &Alphabet) -> Self {
        self.names = (0..self.num_labels)
            .map(|i| states.to_str(i).map_or_else(|| format!("#{i}"), str::to_string))
            .collect();
        self
    }

    pub fn accumulate(&mut self, reference: &[usize], prediction: &[usize]) {
        let mut matched = 0;
        for (&r, &p) in zip(reference, prediction) {
            self.tbl[r].num_observation += 1;
            self.tbl[p].num_prediction += 1;
            if r == p {
                self.tbl[r].num_correct += 1;
                matched += 1;
            }
            self.item_total_num += 1;
        }
        self.item_total_correct += matched;

        if matched == reference.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
    }

    pub fn evaluate(&mut self) -> Estimation {
        self.macro_precision = 0.0;
        self.macro_recall = 0.0;
        self.macro_fmeasure = 0.0;
        for lev in &mut self.tbl {
            lev.precision = 0.0;
            lev.recall = 0.0;
            lev.fmeasure = 0.0;
            if lev.num_observation == 0 {
                continue;
            }
            if lev.num_prediction > 0 {
                lev.precision = lev.num_correct as f64 / lev.num_prediction as f64;
            }
            lev.recall = lev.num_correct as f64 / lev.num_observation as f64;
            if lev.precision + lev.recall > 0.0 {
                lev.fmeasure = lev.precision * lev.recall * 2.0 / (lev.precision + lev.recall);
            }
            self.macro_precision += lev.precision;
            self.macro_recall += lev.recall;
            self.macro_fmeasure += lev.fmeasure;
        }

        if self.num_labels > 0 {
            self.macro_precision /= self.num_labels as f64;
            self.macro_recall /= self.num_labels as f64;
            self.macro_fmeasure /= self.num_labels as f64;
        }
        if self.item_total_num > 0 {
            self.item_accuracy = self.item_total_correct as f64 / self.item_total_num as f64;
        }
        if self.inst_total_num > 0 {
            self.inst_accuracy = self.inst_total_correct as f64 / self.inst_total_num as f64;
        }
        Estimation {
            precision: self.macro_precision,
            recall: self.macro_recall,
            fmeasure: self.macro_fmeasure,
            item_accuracy: self.item_accuracy,
            sequence_accuracy: self.inst_accuracy,
        }
    }

    fn name(&self, i: usize) -> String {
        self.names.get(i).cloned().unwrap_or_else(|| format!("#{i}"))
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by state (#match, #model, #ref) (precision, recall, F1):")?;
        for (i, lev) in self.tbl.iter().enumerate() {
            if lev.num_observation == 0 {
                writeln!(f, "\t{}: ({}, {}, {}) (******, ******, ******)", self.name(i), lev.num_correct, lev.num_prediction, lev.num_observation)?;
            } else {
                writeln!(f, "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})", self.name(i), lev.num_correct, lev.num_prediction, lev.num_observation,
                    lev.precision, lev.recall, lev.fmeasure
                )?;
            }
        }
        writeln!(f, "Macro-average precision, recall, F1: ({:.6}, {:.6}, {:.6})", self.macro_precision, self.macro_recall, self.macro_fmeasure)?;
        writeln!(f, "Item accuracy: {}/{} => {:.4}", self.item_total_correct, self.item_total_num, self.item_accuracy)?;
        writeln!(f, "Sequence accuracy: {}/{} => {:.4}", self.inst_total_correct, self.inst_total_num, self.inst_accuracy)
    }
}
