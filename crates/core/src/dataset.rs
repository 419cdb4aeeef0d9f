use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{CorrError, Result};

/// How the numeric block is laid out relative to (observation, variable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// One row per observation, one column per variable.
    #[default]
    ObservationsByVariables,
    /// One row per variable, one column per observation ("transposed").
    VariablesByObservations,
}

impl Orientation {
    pub fn from_transposed(transposed: bool) -> Self {
        if transposed {
            Orientation::VariablesByObservations
        } else {
            Orientation::ObservationsByVariables
        }
    }

    pub fn is_transposed(self) -> bool {
        matches!(self, Orientation::VariablesByObservations)
    }

    fn variable_axis(self) -> Axis {
        match self {
            Orientation::ObservationsByVariables => Axis(1),
            Orientation::VariablesByObservations => Axis(0),
        }
    }
}

/// A loaded table: numeric values, variable names, observation keys.
#[derive(Debug, Clone)]
pub struct Dataset {
    values: Array2<f64>,
    orientation: Orientation,
    key_label: String,
    names: Vec<String>,
    keys: Vec<String>,
}

impl Dataset {
    pub fn new(
        values: Array2<f64>,
        orientation: Orientation,
        names: Vec<String>,
        keys: Vec<String>,
    ) -> Result<Self> {
        let variables = values.len_of(orientation.variable_axis());
        let observations = values.len() / variables.max(1);

        if variables == 0 || observations == 0 {
            return Err(CorrError::InvalidDataset(format!(
                "need at least one variable and one observation, got {} x {}",
                observations, variables
            )));
        }
        if names.len() != variables {
            return Err(CorrError::dimension_mismatch(
                "variable name count",
                variables,
                names.len(),
            ));
        }
        if keys.len() != observations {
            return Err(CorrError::dimension_mismatch(
                "observation key count",
                observations,
                keys.len(),
            ));
        }

        Ok(Self {
            values,
            orientation,
            key_label: String::new(),
            names,
            keys,
        })
    }

    /// Dataset in natural orientation with generated names (`v0`, `v1`, ...)
    /// and keys (`o0`, `o1`, ...).
    pub fn from_observations(values: Array2<f64>) -> Result<Self> {
        let (rows, cols) = values.dim();
        let names = (0..cols).map(|i| format!("v{}", i)).collect();
        let keys = (0..rows).map(|i| format!("o{}", i)).collect();
        Self::new(values, Orientation::ObservationsByVariables, names, keys)
    }

    pub fn with_key_label(mut self, label: impl Into<String>) -> Self {
        self.key_label = label.into();
        self
    }

    pub fn variable_count(&self) -> usize {
        self.names.len()
    }

    pub fn observation_count(&self) -> usize {
        self.keys.len()
    }

    /// The observed values of variable `v`, whichever way the data is stored.
    pub fn variable(&self, v: usize) -> ArrayView1<'_, f64> {
        self.values.index_axis(self.orientation.variable_axis(), v)
    }

    /// Value of variable `v` at observation `o`.
    pub fn value(&self, o: usize, v: usize) -> f64 {
        match self.orientation {
            Orientation::ObservationsByVariables => self.values[[o, v]],
            Orientation::VariablesByObservations => self.values[[v, o]],
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn key_label(&self) -> &str {
        &self.key_label
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}
