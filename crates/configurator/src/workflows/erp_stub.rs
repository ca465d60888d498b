//! Local stand-in for the ERP REST API used by the HTTP client tests.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ErpConfig;

/// Nothing listens on port 1, so connecting fails fast.
pub(crate) const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let address = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{address}")
}

pub(crate) fn enabled_config(base_url: &str) -> ErpConfig {
    ErpConfig {
        enabled: true,
        base_url: base_url.to_string(),
        api_key: "key".to_string(),
        api_secret: "secret".to_string(),
        timeout: Duration::from_secs(5),
        ..ErpConfig::default()
    }
}
