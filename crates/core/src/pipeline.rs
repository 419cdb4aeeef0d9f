use strum_macros::{Display, EnumString};

use crate::dataset::Dataset;
use crate::distributed::{self, Topology};
use crate::error::Result;
use crate::mask::NameMask;
use crate::matrix::{CorrelationMatrix, correlation_matrix};
use crate::reduce::{check_mask, reduce};
use crate::retention::RetentionRecord;
use crate::threshold::Threshold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Engine {
    #[strum(serialize = "Serial")]
    Serial,
    #[default]
    #[strum(serialize = "Distributed")]
    Distributed,
}

/// Outcome of a reduction run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub matrix: CorrelationMatrix,
    pub retention: RetentionRecord,
}

impl Summary {
    pub fn kept_variables(&self) -> Vec<usize> {
        self.retention.kept_variables()
    }

    pub fn discarded(&self) -> Vec<usize> {
        (0..self.retention.variable_count())
            .filter(|&v| !self.retention.is_variable_kept(v))
            .collect()
    }
}

/// Builds the correlation matrix and decides which variables to keep.
///
/// The serial engine runs on the ambient rayon pool and ignores `topology`.
pub fn summarize(
    dataset: &Dataset,
    threshold: &Threshold,
    mask: Option<&NameMask>,
    engine: Engine,
    topology: Topology,
) -> Result<Summary> {
    tracing::debug!(
        %engine,
        variables = dataset.variable_count(),
        observations = dataset.observation_count(),
        lower = threshold.lower(),
        upper = threshold.upper(),
        masked = mask.map(NameMask::matched),
        "summarizing"
    );

    let (matrix, retention) = match engine {
        Engine::Serial => {
            check_mask(mask, dataset.variable_count())?;
            let matrix = correlation_matrix(dataset);
            let retention = reduce(&matrix, threshold, mask)?;
            (matrix, retention)
        }
        Engine::Distributed => distributed::run(dataset, threshold, mask, topology)?,
    };

    Ok(Summary { matrix, retention })
}
