//! In-process stand-in for the remote service, used by HTTP tests.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::ApiClient;
use crate::config::ClientConfig;

/// Requests seen by a fake route, one formatted line each.
pub(crate) type Recorded = Arc<Mutex<Vec<String>>>;

pub(crate) fn recorder() -> Recorded {
    Arc::new(Mutex::new(Vec::new()))
}

/// Serves `router` on an ephemeral port and returns a client whose base URL
/// is `http://<addr>/api`.
#[allow(clippy::panic)]
pub(crate) async fn serve(router: Router) -> ApiClient {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind fake server");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("fake server address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    let Ok(config) = ClientConfig::with_base_url(&format!("http://{addr}/api")) else {
        panic!("fake base url");
    };
    let Ok(client) = ApiClient::new(&config) else {
        panic!("client builds");
    };
    client
}
