// Concrete implementations of the domain ports: result files, IBGE geo services, report storage.

pub mod ibge;
#[cfg(feature = "lambda")]
pub mod s3;
pub mod source;
pub mod storage;

pub use ibge::IbgeGeoProvider;
pub use source::{ConfiguredSource, HttpBucketSource, LocalDataSource};
pub use storage::LocalStorage;
