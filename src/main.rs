use std::sync::Arc;

use anyhow::{bail, Context};
use charge_eta::{
    config::Config,
    features::{build_features, encode_time},
    torch::TorchEngine,
    ModelArtifact, Pipeline, Report, TelemetrySample,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env()?;
    tracing::info!(model = %cfg.model_path.display(), meta = %cfg.meta_path.display(), "loading model");

    let artifact = ModelArtifact::locate(&cfg.model_path, &cfg.meta_path)?;
    let engine = TorchEngine::load(artifact, cfg.intra_op_threads)?;
    let pipeline = Pipeline::new(engine)?.with_feature_logging(cfg.log_pred);
    let descriptor = pipeline.invoker().descriptor();
    tracing::info!(
        inputs = ?descriptor.inputs,
        outputs = ?descriptor.outputs,
        feat_list = ?descriptor.feat_list,
        "model descriptor"
    );

    // Warmup to make sure the module actually runs on a well-formed input
    let zeros = TelemetrySample {
        state_of_charge: 0.0,
        temperature_celsius: 0.0,
        current_amperes: 0.0,
        hour: 0,
        minute: 0,
    };
    let warm = build_features(&zeros, &encode_time(0, 0))?;
    let raw = pipeline.invoker().predict(&warm)?;
    tracing::info!(raw_minutes = raw, "warmup forward ok");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["predict", json] => predict_once(&pipeline, json),
        [] | ["serve"] => serve(pipeline, cfg.port).await,
        _ => bail!("usage: charge_eta [serve | predict '<telemetry json>']"),
    }
}

fn predict_once(pipeline: &Pipeline, json: &str) -> anyhow::Result<()> {
    let sample: TelemetrySample =
        serde_json::from_str(json).context("failed to parse telemetry JSON")?;
    let prediction = pipeline.predict(&sample)?;
    println!("{}", Report::new(&sample, &prediction));
    Ok(())
}

async fn serve(pipeline: Pipeline, port: u16) -> anyhow::Result<()> {
    let app = charge_eta::server::router(Arc::new(pipeline));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
