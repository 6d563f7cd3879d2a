use clap::Parser;
use serde::Serialize;

pub const DEFAULT_USER: &str = "default_user";
pub const DEFAULT_TENANT: &str = "default_tenant";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Remote API Args ---
    /// Base URL of the bookmark API (e.g., https://bookmarks.example.com)
    #[arg(
        long,
        env = "BOOKMARK_API_URL",
        default_value = "https://aca-manualmate-cc-prod-001.proudocean-fab4a47f.canadacentral.azurecontainerapps.io"
    )]
    pub api_base_url: String,

    // --- Session Args ---
    /// User whose bookmarks are shown
    #[arg(long, env = "BOOKMARK_USER", default_value = DEFAULT_USER)]
    pub user: String,

    /// Tenant the user belongs to
    #[arg(long, env = "BOOKMARK_TENANT", default_value = DEFAULT_TENANT)]
    pub tenant: String,

    // --- Server Args ---
    /// Host address and port for the dashboard HTTP server.
    #[arg(long, env = "HTTP_ADDR", default_value = "127.0.0.1:8080")]
    pub http_addr: String,

    /// Optional address for the WebSocket snapshot feed. Disabled when not set.
    #[arg(long, env = "WS_ADDR")]
    pub ws_addr: Option<String>,

    // --- Dashboard Behaviour Args ---
    /// Milliseconds a removed card stays on screen for its exit animation. 0 removes it immediately.
    #[arg(long, env = "REMOVAL_DELAY_MS", default_value = "300")]
    pub removal_delay_ms: u64,

    /// Do not fetch bookmarks when the dashboard starts.
    #[arg(long, env = "SKIP_INITIAL_LOAD", default_value = "false")]
    pub skip_initial_load: bool,
}

impl Args {
    pub fn session(&self) -> Session {
        Session::new(&self.user, &self.tenant)
    }
}

/// Identity sent with every request. Read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub tenant_id: String,
}

impl Session {
    pub fn new(user_id: &str, tenant_id: &str) -> Self {
        Self {
            user_id: non_empty_or(user_id, DEFAULT_USER),
            tenant_id: non_empty_or(tenant_id, DEFAULT_TENANT),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_USER, DEFAULT_TENANT)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback.to_string() } else { trimmed.to_string() }
}
