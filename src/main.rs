use dotenvy::dotenv;
use tracing::info;

use abostatus::infra::{
    app::create_app, expiry_sweeper::run_expiry_sweep_loop, setup::init_app_state,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Spawn the expiry sweeper background task (after tracing is initialized)
    let subscription_uc = app_state.subscription_use_cases.clone();
    let sweep_interval = app_state.config.sweep_interval_secs;
    let sweep_batch = app_state.config.sweep_batch_size;
    tokio::spawn(async move {
        run_expiry_sweep_loop(subscription_uc, sweep_interval, sweep_batch).await;
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
