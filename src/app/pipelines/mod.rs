pub mod report_pipeline;

pub use report_pipeline::ElectionPipeline;
