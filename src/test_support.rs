use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Minimal HTTP/1.1 responder answering one request per connection.
/// Dropping it stops the accept loop.
pub(crate) struct TestServer {
    pub(crate) url: String,
    requests: Arc<AtomicU64>,
    _shutdown: watch::Sender<bool>,
}

impl TestServer {
    /// Requests read so far, counted per request rather than per connection.
    pub(crate) fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

pub(crate) async fn spawn_http_server(status: u16, delay: Duration) -> Result<TestServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind test server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read server addr: {}", err))?;
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let requests = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                accept = listener.accept() => {
                    let (socket, _) = match accept {
                        Ok(result) => result,
                        Err(_) => break,
                    };
                    tokio::spawn(handle_http(socket, status, delay, Arc::clone(&counter)));
                }
            }
        }
    });

    Ok(TestServer {
        url: format!("http://{}", addr),
        requests,
        _shutdown: shutdown_tx,
    })
}

/// A URL on a local port that nothing listens on.
pub(crate) fn unreachable_url() -> Result<String, String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("Failed to bind probe listener: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read probe addr: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

async fn handle_http(
    mut socket: TcpStream,
    status: u16,
    delay: Duration,
    requests: Arc<AtomicU64>,
) {
    let mut buffer = [0u8; 1024];
    match socket.read(&mut buffer).await {
        Ok(0) | Err(_) => return,
        Ok(_) => {
            requests.fetch_add(1, Ordering::SeqCst);
        }
    }
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let response = format!(
        "HTTP/1.1 {} TEST\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        status
    );
    if socket.write_all(response.as_bytes()).await.is_err() {
        return;
    }
    let _shutdown_result = socket.shutdown().await;
}
