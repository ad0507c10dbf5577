use clap::Parser;
use election_report::app::session_from_config;
use election_report::config::DataSourceConfig;
use election_report::domain::ports::ConfigProvider;
use election_report::utils::{logger, validation::Validate};
use election_report::{ElectionPipeline, EtlEngine, LocalStorage, TomlConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Election report generator with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the state from config (UF code)
    #[arg(long)]
    state: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based report tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(state) = args.state.clone() {
        tracing::info!("🔧 State overridden to: {}", state);
        config.report.state = Some(state);
        config.report.municipality = None;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let request = config.report_request()?;
    let session = Arc::new(session_from_config(&config).await?);
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ElectionPipeline::new(session, storage, request, config.output_path());

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Report generated successfully!");
            println!("✅ Report generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Office: {}", config.report.office);
    println!("  Round: {:?}", config.report.round);
    match config.report_request() {
        Ok(request) => println!("  Level: {}", request.level.slug()),
        Err(e) => println!("  Level: invalid ({})", e),
    }
    match config.data_source() {
        DataSourceConfig::Local {
            data_dir,
            election_year,
        } => println!("  Source: local folder {} ({})", data_dir, election_year),
        DataSourceConfig::Remote {
            base_url,
            election_year,
        } => println!("  Source: {} ({})", base_url, election_year),
        #[allow(unreachable_patterns)]
        other => println!("  Source: {:?}", other),
    }
    let geo = config.geo_endpoints();
    println!("  Boundaries: {}", geo.malhas_url);
    println!("  Names: {}", geo.localidades_url);
    println!("  Output: {}", config.output_path());
    println!("  Concurrent Requests: {}", config.concurrent_requests());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
