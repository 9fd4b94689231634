use std::slice::Iter;

use crate::{
    alphabet::Alphabet,
    error::{Error, Result},
};

/// One training example: observations and the states that emitted them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sequence {
    pub observations: Vec<usize>,
    pub states: Vec<usize>,
}

impl Sequence {
    pub fn push(&mut self, observation: usize, state: usize) {
        self.observations.push(observation);
        self.states.push(state);
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn clear(&mut self) {
        self.observations.clear();
        self.states.clear();
    }
}

/// Validated collection of labeled sequences over fixed alphabets.
#[derive(Debug, Default)]
pub struct Dataset {
    seqs: Vec<Sequence>,
    num_states: usize,
    num_symbols: usize,
    states: Alphabet,
    symbols: Alphabet,
}

impl Dataset {
    pub fn new(num_states: usize, num_symbols: usize) -> Self {
        Self {
            num_states,
            num_symbols,
            ..Default::default()
        }
    }

    /// Creates a dataset whose sizes come from symbolic alphabets.
    pub fn with_alphabets(states: Alphabet, symbols: Alphabet) -> Self {
        Self {
            num_states: states.len(),
            num_symbols: symbols.len(),
            states,
            symbols,
            ..Default::default()
        }
    }

    pub fn push(&mut self, observations: Vec<usize>, states: Vec<usize>) -> Result<()> {
        if observations.len() != states.len() {
            return Err(Error::LengthMismatch {
                observations: observations.len(),
                states: states.len(),
            });
        }
        if observations.is_empty() {
            return Err(Error::EmptySequence);
        }
        if let Some(&o) = observations.iter().find(|&&o| o >= self.num_symbols) {
            return Err(Error::OutOfRange {
                kind: "observation",
                value: o,
                size: self.num_symbols,
            });
        }
        if let Some(&s) = states.iter().find(|&&s| s >= self.num_states) {
            return Err(Error::OutOfRange {
                kind: "state",
                value: s,
                size: self.num_states,
            });
        }
        self.seqs.push(Sequence {
            observations,
            states,
        });
        Ok(())
    }

    /// Encodes a symbolic pair through the dataset alphabets and appends it.
    pub fn push_symbols<S: AsRef<str>, L: AsRef<str>>(&mut self, observations: &[S], states: &[L]) -> Result<()> {
        let x = self.symbols.encode(observations).map_err(|s| {
            log::warn!("unknown observation symbol: {s}");
            Error::UnknownSymbol(s)
        })?;
        let q = self.states.encode(states).map_err(|s| {
            log::warn!("unknown state symbol: {s}");
            Error::UnknownSymbol(s)
        })?;
        self.push(x, q)
    }

    pub fn states(&self) -> &Alphabet {
        &self.states
    }

    pub fn symbols(&self) -> &Alphabet {
        &self.symbols
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    pub fn iter(&self) -> Iter<'_, Sequence> {
        self.seqs.iter()
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sequence;
    type IntoIter = Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.seqs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push() {
        let mut ds = Dataset::new(2, 3);
        ds.push(vec![0, 2, 1], vec![0, 1, 1]).unwrap();
        ds.push(vec![1], vec![0]).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.max_length(), 3);
        assert_eq!(ds.total_items(), 4);
    }

    #[test]
    fn push_invalid() {
        let mut ds = Dataset::new(2, 3);
        match ds.push(vec![0, 1], vec![0]) {
            Err(Error::LengthMismatch { observations: 2, states: 1 }) => {}
            r => panic!("unexpected: {:?}", r),
        }
        match ds.push(vec![], vec![]) {
            Err(Error::EmptySequence) => {}
            r => panic!("unexpected: {:?}", r),
        }
        match ds.push(vec![3], vec![0]) {
            Err(Error::OutOfRange { kind: "observation", value: 3, size: 3 }) => {}
            r => panic!("unexpected: {:?}", r),
        }
        match ds.push(vec![0], vec![2]) {
            Err(Error::OutOfRange { kind: "state", value: 2, size: 2 }) => {}
            r => panic!("unexpected: {:?}", r),
        }
        assert!(ds.is_empty());
    }

    #[test]
    fn push_symbols() {
        let states = Alphabet::from(&["sunny", "rainy"][..]);
        let symbols = Alphabet::from(&["walk", "shop", "clean"][..]);
        let mut ds = Dataset::with_alphabets(states, symbols);
        assert_eq!(ds.num_states(), 2);
        assert_eq!(ds.num_symbols(), 3);
        ds.push_symbols(&["walk", "clean"], &["sunny", "rainy"]).unwrap();
        let seq = ds.iter().next().unwrap();
        assert_eq!(seq.observations, vec![0, 2]);
        assert_eq!(seq.states, vec![0, 1]);
        match ds.push_symbols(&["swim"], &["sunny"]) {
            Err(Error::UnknownSymbol(s)) => assert_eq!(s, "swim"),
            r => panic!("unexpected: {:?}", r),
        }
    }
}
