//! Test helpers: throwaway HTTP servers and scripted transports.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use crate::client::ChatTransport;
use crate::error::{ChatError, ChatResult};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    listener.local_addr().expect("local addr")
}

/// Transport that replays queued results and records what it was sent.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ChatResult>>,
    sent: Mutex<Vec<String>>,
    health_checks: AtomicUsize,
    healthy: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Self::default()
        }
    }

    pub fn unhealthy() -> Self {
        Self::default()
    }

    pub fn push(&self, result: ChatResult) -> &Self {
        self.replies.lock().expect("replies lock").push_back(result);
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_message(&self, text: &str) -> ChatResult {
        self.sent.lock().expect("sent lock").push(text.to_string());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::unknown("no scripted reply")))
    }

    async fn check_backend_health(&self) -> bool {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.healthy
    }
}
