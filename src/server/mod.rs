pub mod api;
pub mod websocket;

use crate::cli::Args;
use crate::dashboard::{ BookmarkListController, ModalPrompt };
use crate::render::HtmlRenderer;
use crate::server::websocket::handle_connection;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };
use lazy_static::lazy_static;
use log::{ debug, info, warn, error };
use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

lazy_static! {
    static ref CONNECTION_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> = RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN))
    );
}

/// Everything a presentation surface needs to drive the dashboard.
#[derive(Clone)]
pub struct DashboardHandle {
    pub controller: Arc<BookmarkListController>,
    pub prompt: Arc<ModalPrompt>,
    pub renderer: Arc<HtmlRenderer>,
}

impl DashboardHandle {
    pub fn new(controller: Arc<BookmarkListController>, prompt: Arc<ModalPrompt>) -> Self {
        Self {
            controller,
            prompt,
            renderer: Arc::new(HtmlRenderer::new()),
        }
    }

    /// Starts a removal in the background and returns once its
    /// confirmation modal is open. False if the bookmark is not displayed.
    pub async fn begin_removal(&self, query_id: &str) -> bool {
        if !self.controller.bookmarks().iter().any(|b| b.query_id == query_id) {
            return false;
        }

        let controller = self.controller.clone();
        let id = query_id.to_string();
        tokio::spawn(async move {
            let outcome = controller.request_delete(&id).await;
            debug!("Removal of {} finished: {:?}", id, outcome);
        });

        let opened = tokio::time::timeout(SETTLE_TIMEOUT, async {
            loop {
                let asking = self.controller.snapshot().confirming.as_deref() == Some(query_id);
                if asking && self.prompt.is_open() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }).await;
        if opened.is_err() {
            warn!("Confirmation for {} did not open in time", query_id);
        }
        true
    }

    /// Answers the open modal and waits for the controller to apply it.
    /// False when nothing was awaiting confirmation.
    pub async fn answer(&self, accept: bool) -> bool {
        self.resolve(|prompt| prompt.answer(accept)).await
    }

    /// Closes the modal from outside its buttons; a cancel.
    pub async fn dismiss(&self) -> bool {
        self.resolve(ModalPrompt::dismiss).await
    }

    async fn resolve(&self, resolve: impl FnOnce(&ModalPrompt) -> bool) -> bool {
        let mut snapshots = self.controller.subscribe();
        if !resolve(self.prompt.as_ref()) {
            return false;
        }
        let settled = tokio::time
            ::timeout(SETTLE_TIMEOUT, snapshots.wait_for(|s| s.confirming.is_none())).await
            .is_ok();
        if !settled {
            warn!("Dashboard did not settle after confirmation answer");
        }
        true
    }
}

pub struct Server {
    args: Args,
    handle: DashboardHandle,
}

impl Server {
    pub fn new(args: Args, handle: DashboardHandle) -> Self {
        Self { args, handle }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(ws_addr) = self.args.ws_addr.clone() {
            let listener = TcpListener::bind(&ws_addr).await?;
            info!("WS snapshot feed listening on: {}", ws_addr);
            let handle = self.handle.clone();
            tokio::spawn(async move {
                if let Err(e) = Self::accept_ws(listener, handle).await {
                    error!("WebSocket server error: {}", e);
                }
            });
        } else {
            info!("WS_ADDR not set. WebSocket snapshot feed disabled.");
        }

        api::start_http_server(&self.args.http_addr, self.handle.clone()).await
    }

    async fn accept_ws(
        listener: TcpListener,
        handle: DashboardHandle
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        loop {
            let (stream, peer) = listener.accept().await?;

            if CONNECTION_LIMITER.check().is_err() {
                warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
                continue;
            }

            info!("Incoming connection from: {}", peer);
            let handle = handle.clone();
            tokio::spawn(async move {
                match accept_async(stream).await {
                    Ok(ws) => handle_connection(peer, ws, handle).await,
                    Err(e) => error!("Handshake failed for {}: {}", peer, e),
                }
            });
        }
    }
}
