use clap::Parser;
use election_report::app::session_from_config;
use election_report::domain::ports::ConfigProvider;
use election_report::utils::error::EtlError;
use election_report::{CliConfig, ElectionPipeline, EtlEngine, LocalStorage, TomlConfig};
use httpmock::prelude::*;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const HEADER: &str =
    "DT_GERACAO;SG_UF;NM_MUNICIPIO;DS_CARGO;NR_TURNO;NM_URNA_CANDIDATO;SG_PARTIDO;QT_VOTOS_NOMINAIS_VALIDOS";

/// TSE exports are latin1; every char used here fits in one byte.
fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

fn sp_file() -> Vec<u8> {
    latin1(&format!(
        "{}\n\
         01/10/2024;SP;São Paulo;Prefeito;1;A;PT;1000\n\
         01/10/2024;SP;São Paulo;Prefeito;1;A;PT;500\n\
         01/10/2024;SP;São Paulo;Prefeito;1;B;PL;900\n\
         01/10/2024;SP;Santos;Prefeito;1;C;PSDB;300\n\
         01/10/2024;SP;Santos;Vereador;1;D;PT;40\n",
        HEADER
    ))
}

fn rj_file() -> Vec<u8> {
    latin1(&format!(
        "{}\n\
         01/10/2024;RJ;Niterói;Prefeito;1;E;PDT;700\n\
         01/10/2024;RJ;Niterói;Prefeito;2;E;PDT;900\n\
         01/10/2024;RJ;Niterói;Prefeito;2;F;PL;950\n\
         01/10/2024;RJ;Niterói;Vereador;1;G;PSOL;80\n\
         01/10/2024;RJ;Niterói;Vereador;1;H;PL;60\n",
        HEADER
    ))
}

const SP_MESH: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {"codarea": "3550308"}, "geometry": null},
    {"type": "Feature", "properties": {"codarea": "3548500"}, "geometry": null},
    {"type": "Feature", "properties": {"codarea": "3509502"}, "geometry": null}
]}"#;

fn read_entry(bundle: &Path, name: &str) -> Option<String> {
    let zip_data = std::fs::read(bundle).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let mut file = archive.by_name(name).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    Some(content)
}

async fn run_report<C: ConfigProvider>(config: &C) -> election_report::Result<String> {
    let session = Arc::new(session_from_config(config).await?);
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ElectionPipeline::new(
        session,
        storage,
        config.report_request()?,
        config.output_path(),
    );
    EtlEngine::new_with_monitoring(pipeline, false).run().await
}

fn remote_config(server: &MockServer, output_path: &str, extra: &[&str]) -> CliConfig {
    let bucket_url = server.url("/data");
    let malhas_url = server.url("/malhas");
    let localidades_url = server.url("/localidades");
    let mut args = vec![
        "election-report",
        "--source",
        "remote",
        "--bucket-url",
        bucket_url.as_str(),
        "--malhas-url",
        malhas_url.as_str(),
        "--localidades-url",
        localidades_url.as_str(),
        "--output-path",
        output_path,
        "--request-timeout-secs",
        "5",
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

#[tokio::test]
async fn test_remote_state_report_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let sp_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/data/votacao_candidato_munzona_2024_SP.csv");
        then.status(200).body(sp_file());
    });
    let mesh_mock = server.mock(|when, then| {
        when.method(GET).path("/malhas/estados/SP/");
        then.status(200).body(SP_MESH);
    });
    let names_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/localidades/estados/SP/municipios");
        then.status(200).json_body(serde_json::json!([
            {"id": 3550308, "nome": "São Paulo"},
            {"id": 3548500, "nome": "Santos"},
            {"id": 3509502, "nome": "Campinas"}
        ]));
    });

    let config = remote_config(&server, &output_path, &["--state", "SP"]);
    let result = run_report(&config).await.unwrap();

    sp_mock.assert();
    mesh_mock.assert();
    names_mock.assert();
    assert!(result.ends_with("report_prefeito_final_sp.zip"));

    let bundle = temp_dir.path().join("report_prefeito_final_sp.zip");
    assert!(bundle.exists());

    let winners = read_entry(&bundle, "winners.csv").unwrap();
    assert!(winners.contains("SP,São Paulo,A,PT,1500"));
    assert!(winners.contains("SP,Santos,C,PSDB,300"));
    assert!(!winners.contains(",B,"));

    let map: serde_json::Value =
        serde_json::from_str(&read_entry(&bundle, "state_map.geojson").unwrap()).unwrap();
    let features = map["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[0]["properties"]["party"], "PT");
    assert_eq!(features[0]["properties"]["votes"], 1500);
    assert_eq!(features[0]["properties"]["name_join_key"], "SAO PAULO");
    assert_eq!(features[2]["properties"]["party"], "N/A");
    assert_eq!(features[2]["properties"]["votes"], 0);

    // the other 26 UFs are missing from the bucket
    let summary: serde_json::Value =
        serde_json::from_str(&read_entry(&bundle, "summary.json").unwrap()).unwrap();
    assert_eq!(summary["warnings"].as_array().unwrap().len(), 26);
    assert_eq!(summary["metrics"]["municipalities"], 2);
    assert_eq!(summary["state"]["leading_party"], "PSDB");
}

#[tokio::test]
async fn test_remote_report_survives_geo_outage() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/data/votacao_candidato_munzona_2024_SP.csv");
        then.status(200).body(sp_file());
    });
    server.mock(|when, then| {
        when.method(GET).path_contains("/malhas/");
        then.status(500);
    });

    let config = remote_config(&server, &output_path, &["--state", "sp"]);
    run_report(&config).await.unwrap();

    let bundle = temp_dir.path().join("report_prefeito_final_sp.zip");
    assert!(read_entry(&bundle, "state_winners.csv").is_some());
    assert!(read_entry(&bundle, "state_map.geojson").is_none());

    let summary: serde_json::Value =
        serde_json::from_str(&read_entry(&bundle, "summary.json").unwrap()).unwrap();
    assert!(summary["map"].as_str().unwrap().starts_with("unavailable"));
}

#[tokio::test]
async fn test_local_folder_councillor_country_report() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    std::fs::write(
        data_dir.path().join("votacao_candidato_munzona_2024_SP.csv"),
        sp_file(),
    )
    .unwrap();
    std::fs::write(
        data_dir.path().join("votacao_candidato_munzona_2024_RJ.csv"),
        rj_file(),
    )
    .unwrap();
    std::fs::write(
        data_dir.path().join("votacao_candidato_munzona_2024_BRASIL.csv"),
        b"not a region file",
    )
    .unwrap();

    let config = CliConfig::parse_from([
        "election-report",
        "--source",
        "local",
        "--data-dir",
        data_dir.path().to_str().unwrap(),
        "--office",
        "councillor",
        "--round",
        "second-round",
        "--output-path",
        output_dir.path().to_str().unwrap(),
    ]);

    let result = run_report(&config).await.unwrap();
    // councillors only have one round
    assert!(result.ends_with("report_vereador_round1_brasil.zip"));

    let bundle = output_dir.path().join("report_vereador_round1_brasil.zip");
    let winners = read_entry(&bundle, "winners.csv").unwrap();
    assert!(winners.contains("RJ,Niterói,G,PSOL,80"));
    assert!(winners.contains("SP,Santos,D,PT,40"));
    assert!(read_entry(&bundle, "state_winners.csv").is_none());

    let parties = read_entry(&bundle, "party_distribution.csv").unwrap();
    assert!(parties.starts_with("party,municipalities,color"));
    assert!(parties.contains("PSOL,1,"));
}

#[tokio::test]
async fn test_local_folder_runoff_and_municipality_view() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    std::fs::write(
        data_dir.path().join("votacao_candidato_munzona_2024_RJ.csv"),
        rj_file(),
    )
    .unwrap();

    let config = CliConfig::parse_from([
        "election-report",
        "--source",
        "local",
        "--data-dir",
        data_dir.path().to_str().unwrap(),
        "--state",
        "RJ",
        "--municipality",
        "NITEROI",
        "--output-path",
        output_dir.path().to_str().unwrap(),
    ]);

    run_report(&config).await.unwrap();

    let bundle = output_dir.path().join("report_prefeito_final_rj_niteroi.zip");
    let candidates = read_entry(&bundle, "municipality_candidates.csv").unwrap();
    let rows: Vec<&str> = candidates.lines().collect();
    assert_eq!(rows[0], "region,municipality,candidate,party,votes");
    assert_eq!(rows[1], "RJ,Niterói,F,PL,950");
    assert_eq!(rows[2], "RJ,Niterói,E,PDT,900");
}

#[tokio::test]
async fn test_empty_folder_reports_no_data() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    let config = CliConfig::parse_from([
        "election-report",
        "--source",
        "local",
        "--data-dir",
        data_dir.path().to_str().unwrap(),
        "--output-path",
        output_dir.path().to_str().unwrap(),
    ]);

    let err = run_report(&config).await.unwrap_err();
    assert!(matches!(err, EtlError::NoData { .. }));
    assert!(err.user_friendly_message().contains("Prefeito"));
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_toml_config_drives_local_report() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    std::fs::write(
        data_dir.path().join("votacao_candidato_munzona_2024_SP.csv"),
        sp_file(),
    )
    .unwrap();

    let toml_content = format!(
        r#"
[report]
office = "mayor"
round = "first_round"

[source]
type = "local"
data_dir = "{}"
election_year = 2024

[load]
output_path = "{}"
"#,
        data_dir.path().display(),
        output_dir.path().display()
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let result = run_report(&config).await.unwrap();
    assert!(result.ends_with("report_prefeito_round1_brasil.zip"));

    let bundle = output_dir.path().join("report_prefeito_round1_brasil.zip");
    let summary: serde_json::Value =
        serde_json::from_str(&read_entry(&bundle, "summary.json").unwrap()).unwrap();
    assert_eq!(summary["effective_round"], "first_round");
    assert_eq!(summary["metrics"]["total_votes"], 1800);
    assert!(summary["map"].is_null());
}
