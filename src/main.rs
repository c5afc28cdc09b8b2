use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use flightontime_panel::{
    client, mock::MockService, terminal::{TerminalView, TextChart}, FormHandler, HttpTransport,
    PanelConfig, SubmitOutcome,
};

// ---------- Args ----------

// `key=value` form fields, e.g. empresa_aerea=GLO aerodromo_origem=SBGR
fn parse_fields(args: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    args.iter()
        .map(|a| match a.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => bail!("expected key=value, got {:?}", a),
        })
        .collect()
}

// ---------- Modes ----------

async fn serve_mock() -> anyhow::Result<()> {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let svc = MockService::with_global(&[
        ("cat__codigo_tipo_linha_I", 0.31),
        ("num__media_atraso_empresa", 0.22),
        ("num__hora_partida", 0.12),
    ]);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("mock prediction service listening on {}", bind_addr);
    axum::serve(listener, svc.router()).await?;
    Ok(())
}

async fn submit(fields: Vec<(String, String)>) -> anyhow::Result<()> {
    let cfg = PanelConfig::from_env().context("failed to load panel config")?;
    let transport = HttpTransport::new(&cfg).context("failed to build HTTP client")?;

    match client::health(&transport).await {
        Ok(h) => tracing::info!("service {} v{} ({})", h.status, h.version, h.message),
        Err(e) => tracing::warn!("health probe failed: {}", e),
    }

    let handler = FormHandler::new(transport, TerminalView::default(), TextChart::default(), cfg);
    match handler.submit(fields).await {
        SubmitOutcome::Rendered { .. } => Ok(()),
        SubmitOutcome::Failed(e) => Err(e).context("prediction failed"),
        SubmitOutcome::Superseded => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("serve-mock") => serve_mock().await,
        _ => submit(parse_fields(&args)?).await,
    }
}
