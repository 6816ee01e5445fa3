//! HTTP test server on an ephemeral port.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use chat_relay::config::RelayConfig;
use chat_relay::constants::SESSION_USER_HEADER;
use chat_relay::relay::Relay;
use chat_relay::web::{create_app, AppState};

/// Running axum server plus a client pointed at it
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(relay: Relay) -> Self {
        Self::start_with_config(relay, RelayConfig::default()).await
    }

    pub async fn start_with_config(relay: Relay, config: RelayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let app = create_app(AppState::new(relay, Arc::new(config)));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("test server");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get_as(&self, user: &str, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).header(SESSION_USER_HEADER, user)
    }

    pub fn post_as(&self, user: &str, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).header(SESSION_USER_HEADER, user)
    }

    /// POST an urlencoded form body
    pub async fn post_form_as(&self, user: &str, path: &str, body: &str) -> Response {
        self.post_as(user, path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("request")
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}
