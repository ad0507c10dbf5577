use clap::Parser;
use election_report::app::session_from_config;
use election_report::domain::ports::ConfigProvider;
use election_report::utils::error::EtlError;
use election_report::utils::{logger, validation::Validate};
use election_report::{CliConfig, ElectionPipeline, EtlEngine, LocalStorage};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting election-report CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let request = config.report_request()?;
    tracing::info!(
        "📋 {} / {:?} / {}",
        request.office,
        request.round,
        request.level.slug()
    );

    // 創建來源、存儲和管道
    let session = Arc::new(session_from_config(&config).await?);
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ElectionPipeline::new(session, storage, request, config.output_path.clone());

    // 創建ETL引擎並運行
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Report generated successfully!");
            println!("✅ Report generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &EtlError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    let exit_code = e.severity().exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
