use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load phases in order.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting report generation");
        self.monitor.log_stats("Start");

        // Extract
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Loaded {} rows ({} regions skipped)",
            dataset.records.len(),
            dataset.warnings.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "🔄 {} winners, {} regions skipped",
            report.winners.len(),
            report.warnings.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("💾 Report saved to: {}", output_path);
        self.monitor.log_stats("Load");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(output_path)
    }
}
