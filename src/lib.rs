pub mod api;
pub mod cli;
pub mod dashboard;
pub mod formatter;
pub mod models;
pub mod render;
pub mod server;

use cli::Args;
use dashboard::{ BookmarkListController, ModalPrompt };
use log::info;
use server::{ DashboardHandle, Server };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let session = args.session();

    info!("--- Dashboard Configuration ---");
    info!("API Base URL: {}", args.api_base_url);
    info!("User: {}", session.user_id);
    info!("Tenant: {}", session.tenant_id);
    info!("HTTP Address: {}", args.http_addr);
    info!("WS Address: {}", args.ws_addr.as_deref().unwrap_or("disabled"));
    info!("Removal Delay: {}ms", args.removal_delay_ms);
    info!("Initial Load: {}", !args.skip_initial_load);
    info!("-------------------------------");

    let api = api::new_client(&args.api_base_url)?;
    let prompt = Arc::new(ModalPrompt::new());
    let controller = Arc::new(
        BookmarkListController::new(
            api,
            prompt.clone(),
            session,
            Duration::from_millis(args.removal_delay_ms)
        )
    );

    if !args.skip_initial_load {
        let initial = controller.clone();
        tokio::spawn(async move {
            initial.load().await;
        });
    }

    let server = Server::new(args.clone(), DashboardHandle::new(controller, prompt));
    server.run().await?;

    Ok(())
}
