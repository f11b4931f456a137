//! One-shot axum endpoint for transport tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

/// The first request a [`capture_one_request`] endpoint received.
pub(crate) struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub body: String,
}

type Slot = Arc<Mutex<Option<oneshot::Sender<CapturedRequest>>>>;

async fn capture(
    State((status, slot)): State<(StatusCode, Slot)>,
    method: Method,
    uri: Uri,
    body: String,
) -> StatusCode {
    let sender = slot.lock().ok().and_then(|mut slot| slot.take());
    if let Some(sender) = sender {
        let _ = sender.send(CapturedRequest {
            method,
            path: uri.path().to_owned(),
            body,
        });
    }
    status
}

/// Serves every path with `status` and yields the first request it read.
pub(crate) async fn capture_one_request(
    status: u16,
) -> anyhow::Result<(Url, oneshot::Receiver<CapturedRequest>)> {
    let status = StatusCode::from_u16(status)?;
    let (sender, receiver) = oneshot::channel();
    let slot: Slot = Arc::new(Mutex::new(Some(sender)));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base = Url::parse(&format!("http://{}/", listener.local_addr()?))?;

    let app = Router::new().fallback(capture).with_state((status, slot));
    tokio::spawn(async move { axum::serve(listener, app).await });

    Ok((base, receiver))
}

/// Returns a URL on a port nothing listens on.
pub(crate) async fn unreachable_url() -> anyhow::Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(Url::parse(&format!("http://{addr}/"))?)
}
