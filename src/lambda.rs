use election_report::adapters::s3::{client_for_region, S3Storage};
use election_report::app::session_from_config;
use election_report::domain::ports::ConfigProvider;
use election_report::utils::{logger, validation::Validate};
use election_report::{ElectionPipeline, EtlEngine, LambdaConfig, OfficeType, RoundSelection};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct Request {
    pub office: Option<OfficeType>,
    pub round: Option<RoundSelection>,
    pub state: Option<String>,
    pub municipality: Option<String>,
}

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub output_path: String,
    pub bundle: String,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting election report Lambda function");

    let payload = event.payload;
    let config = LambdaConfig::from_env()?.with_overrides(
        payload.office,
        payload.round,
        payload.state,
        payload.municipality,
    );
    config.validate()?;

    let request = config.report_request()?;
    let bundle = request.bundle_name();

    // 創建S3客戶端、存儲和管道
    let s3_client = client_for_region(&config.output_region).await;
    let storage = S3Storage::new(
        s3_client,
        config.output_bucket.clone(),
        config.output_prefix.clone(),
    );
    let session = Arc::new(session_from_config(&config).await?);
    let output_path = format!("s3://{}/{}", config.output_bucket, config.output_prefix);
    let pipeline = ElectionPipeline::new(session, storage, request, output_path);

    let engine = EtlEngine::new(pipeline);
    let output_path = engine.run().await.map_err(|e| {
        tracing::error!(
            "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        e
    })?;

    tracing::info!("Election report Lambda function completed successfully");
    Ok(Response {
        message: "Report generated successfully".to_string(),
        output_path,
        bundle,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
