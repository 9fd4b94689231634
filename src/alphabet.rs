use std::collections::HashMap;

/// Bidirectional mapping between symbol strings and dense indices.
///
/// Indices are assigned in insertion order, so an alphabet built from
/// `["sunny", "rainy"]` maps `"sunny"` to state 0.
#[derive(Debug, Default, Clone)]
pub struct Alphabet {
    v: Vec<String>,
    m: HashMap<String, usize>,
}

impl<S: AsRef<str>> From<&[S]> for Alphabet {
    fn from(value: &[S]) -> Self {
        let mut alphabet = Self::default();
        for s in value {
            alphabet.find_or_insert(s.as_ref());
        }
        alphabet
    }
}

impl Alphabet {
    pub fn find_or_insert(&mut self, key: &str) -> usize {
        if let Some(&idx) = self.m.get(key) {
            return idx;
        }
        let idx = self.v.len();
        self.m.insert(key.to_string(), idx);
        self.v.push(key.to_string());
        idx
    }

    pub fn to_id(&self, s: &str) -> Option<usize> {
        self.m.get(s).copied()
    }

    pub fn to_str(&self, id: usize) -> Option<&str> {
        self.v.get(id).map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.v.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v.is_empty()
    }

    /// Encodes a symbolic sequence, failing on the first unknown symbol.
    pub fn encode<S: AsRef<str>>(&self, seq: &[S]) -> Result<Vec<usize>, String> {
        seq.iter()
            .map(|s| self.to_id(s.as_ref()).ok_or_else(|| s.as_ref().to_string()))
            .collect()
    }

    /// Decodes indices back to symbols; unknown indices become `"N/A"`.
    pub fn decode(&self, ids: &[usize]) -> Vec<&str> {
        ids.iter().map(|&i| self.to_str(i).unwrap_or("N/A")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_str() {
        let mut alphabet = Alphabet::default();
        for (s, id) in [("zero", 0), ("one", 1), ("two", 2), ("three", 3), ("two", 2), ("one", 1), ("zero", 0), ("four", 4)].iter() {
            assert_eq!(*id, alphabet.find_or_insert(s), "{} != {}", s, id);
        }
        assert_eq!(alphabet.len(), 5);
    }

    #[test]
    fn find_by_id() {
        let alphabet = Alphabet::from(&["zero", "one"][..]);
        assert_eq!(alphabet.to_str(0), Some("zero"));
        assert_eq!(alphabet.to_str(1), Some("one"));
        assert_eq!(alphabet.to_str(2), None);
    }

    #[test]
    fn encode_and_decode() {
        let alphabet = Alphabet::from(&["sunny", "rainy"][..]);
        let ids = alphabet.encode(&["rainy", "sunny", "rainy"]).unwrap();
        assert_eq!(ids, vec![1, 0, 1]);
        assert_eq!(alphabet.decode(&ids), vec!["rainy", "sunny", "rainy"]);
        assert_eq!(alphabet.decode(&[7]), vec!["N/A"]);
        assert_eq!(alphabet.encode(&["snowy"]), Err("snowy".to_string()));
    }
}
