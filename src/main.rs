//src/main.rs

use school_dashboard::{config::AppState, models::rbac::Role};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG controla o nível (padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;
    let store = &app_state.store;

    let report = store.refresh_principal().await;
    tracing::info!("Cascata inicial: {:?}", report);

    // Argumentos opcionais: <papel> [ano] [período]
    let mut args = std::env::args().skip(1);

    if let Some(role) = args.next() {
        let role: Role = role.parse()?;
        let outcome = store.switch_role(role).await;
        tracing::info!("Troca de papel para {}: {:?}", role, outcome.is_switched());
    }
    if let Some(year) = args.next() {
        store.select_year(&year).await?;
    }
    if let Some(term) = args.next() {
        store.select_term(&term).await?;
    }

    let view = store.view().await;
    println!("{}", serde_json::to_string_pretty(&view)?);

    let failures = app_state.notifier.history().len();
    if failures > 0 {
        tracing::warn!("{} falha(s) notificada(s) durante a execução", failures);
    }

    Ok(())
}
