/// Per-variable flag: may this variable trigger retention?
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMask {
    bits: Vec<bool>,
}

impl NameMask {
    pub fn from_vec(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Evaluates `matches` on every name, in variable order.
    pub fn from_names<S, F>(names: &[S], mut matches: F) -> Self
    where
        S: AsRef<str>,
        F: FnMut(&str) -> bool,
    {
        Self {
            bits: names.iter().map(|n| matches(n.as_ref())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_match(&self, v: usize) -> bool {
        self.bits.get(v).copied().unwrap_or(false)
    }

    pub fn matched(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}
