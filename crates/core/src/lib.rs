pub mod dataset;
pub mod distributed;
pub mod error;
pub mod mask;
pub mod matrix;
pub mod partition;
pub mod pearson;
pub mod pipeline;
pub mod reduce;
pub mod report;
pub mod retention;
pub mod threshold;

pub use dataset::{Dataset, Orientation};
pub use distributed::Topology;
pub use error::{ConfigError, CorrError, Result};
pub use mask::NameMask;
pub use matrix::{CorrelationMatrix, correlation_matrix};
pub use pearson::pearson_pair;
pub use pipeline::{Engine, Summary, summarize};
pub use retention::RetentionRecord;
pub use threshold::{Threshold, ThresholdMode};
