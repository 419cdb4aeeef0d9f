use parking_lot::Mutex;

/// Keep/discard decision per column. Index 0 is the key column and is always
/// kept; index `v + 1` belongs to variable `v`. Flags are only ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRecord {
    flags: Vec<bool>,
}

impl RetentionRecord {
    pub fn new(variable_count: usize) -> Self {
        let mut flags = vec![false; variable_count + 1];
        flags[0] = true;
        Self { flags }
    }

    pub fn variable_count(&self) -> usize {
        self.flags.len() - 1
    }

    /// Marks both variables of a qualifying pair.
    pub fn mark_pair(&mut self, x: usize, y: usize) {
        self.flags[x + 1] = true;
        self.flags[y + 1] = true;
    }

    /// Column-indexed flag (0 is the key column).
    pub fn is_kept(&self, column: usize) -> bool {
        self.flags[column]
    }

    pub fn is_variable_kept(&self, v: usize) -> bool {
        self.flags[v + 1]
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }

    /// Indices of retained variables, ascending.
    pub fn kept_variables(&self) -> Vec<usize> {
        (0..self.variable_count())
            .filter(|&v| self.is_variable_kept(v))
            .collect()
    }

    pub fn kept_count(&self) -> usize {
        self.flags[1..].iter().filter(|&&b| b).count()
    }
}

/// Retention record written concurrently by the threads of one worker.
#[derive(Debug)]
pub struct SharedRetention {
    inner: Mutex<RetentionRecord>,
}

impl SharedRetention {
    pub fn new(variable_count: usize) -> Self {
        Self {
            inner: Mutex::new(RetentionRecord::new(variable_count)),
        }
    }

    pub fn mark_pair(&self, x: usize, y: usize) {
        self.inner.lock().mark_pair(x, y);
    }

    pub fn into_inner(self) -> RetentionRecord {
        self.inner.into_inner()
    }
}
