pub mod aggregate;
pub mod cache;
pub mod colors;
pub mod etl;
pub mod geo_match;
pub mod loader;
pub mod normalize;
pub mod records;
pub mod rounds;
pub mod session;
pub mod views;

pub use crate::domain::model::{AggregatedTally, ElectionReport, LoadedDataset, VoteRecord, Winner};
pub use crate::domain::ports::{ConfigProvider, DataSource, GeoProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
