pub mod aggregate;
pub mod clean;
pub mod etl;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod validate;

pub use crate::domain::model::{RawRecord, RawSources, Relations, SummaryRow, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
