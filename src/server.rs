//! Callback server for asynchronous payment notifications.
//!
//! The client only assembles a [`CallbackConfig`] and hands it to a
//! [`CallbackServer`]. [`AxumCallbackServer`] is the default implementation:
//! it accepts notifications at one path, as a GET query or a POST form, passes
//! the fields to the handler and answers `OK`.

use crate::errors::{AnypayError, Result, ValidationError};
use async_trait::async_trait;
use axum::{extract::State, routing::get, Form, Router};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Port used when neither the caller nor the configuration names one.
pub const DEFAULT_CALLBACK_PORT: u16 = 3000;

/// Fields of one notification, as sent by the service, ordered by key.
pub type Notification = BTreeMap<String, String>;

/// Callback invoked for every notification.
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// What the caller supplies to open a callback session.
#[derive(Clone)]
pub struct SessionParams {
    /// Path the service will deliver notifications to, e.g. `/anypay`
    pub url: String,

    /// Notification handler
    pub handler: NotificationHandler,
}

impl SessionParams {
    /// Creates session parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use anypay_rs::server::SessionParams;
    ///
    /// let params = SessionParams::new("/anypay", |notification| {
    ///     println!("payment {:?}", notification.get("pay_id"));
    /// });
    /// assert_eq!(params.url, "/anypay");
    /// ```
    pub fn new(
        url: impl Into<String>,
        handler: impl Fn(Notification) + Send + Sync + 'static,
    ) -> Self {
        Self {
            url: url.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionParams")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Fully resolved configuration handed to a [`CallbackServer`].
#[derive(Clone)]
pub struct CallbackConfig {
    /// Notification path, always starting with `/`
    pub url: String,

    /// Notification handler
    pub handler: NotificationHandler,

    /// Port to listen on; 0 picks an ephemeral port
    pub port: u16,
}

impl CallbackConfig {
    /// Validates session parameters and binds them to a port.
    pub fn new(params: SessionParams, port: u16) -> Result<Self> {
        let url = params.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingSessionUrl.into());
        }
        let url = if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        };

        Ok(Self {
            url,
            handler: params.handler,
            port,
        })
    }
}

impl fmt::Debug for CallbackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackConfig")
            .field("url", &self.url)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Starts a listener for payment notifications.
#[async_trait]
pub trait CallbackServer: Send + Sync {
    /// Starts serving `config` and returns a handle to the running server.
    async fn start(&self, config: CallbackConfig) -> Result<ServerHandle>;
}

/// A running callback server.
///
/// Dropping the handle detaches the server: it keeps serving until the
/// runtime shuts down. Call [`ServerHandle::shutdown`] to stop it.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Wraps a spawned server task.
    pub fn new(
        local_addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<io::Result<()>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown: Some(shutdown),
            task,
        }
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting notifications and waits for the server to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(result) => result.map_err(AnypayError::from),
            Err(e) => Err(AnypayError::ServerError(io::Error::new(
                io::ErrorKind::Other,
                e,
            ))),
        }
    }
}

/// Default [`CallbackServer`] built on axum.
#[derive(Debug, Clone)]
pub struct AxumCallbackServer {
    host: IpAddr,
}

impl AxumCallbackServer {
    /// Listens on all interfaces.
    pub fn new() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    /// Sets the interface to bind.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }
}

impl Default for AxumCallbackServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallbackServer for AxumCallbackServer {
    async fn start(&self, config: CallbackConfig) -> Result<ServerHandle> {
        let app = Router::new()
            .route(&config.url, get(notify).post(notify))
            .with_state(config.handler);

        let listener = TcpListener::bind(SocketAddr::new(self.host, config.port)).await?;
        let local_addr = listener.local_addr()?;

        tracing::debug!(%local_addr, path = %config.url, "callback server listening");

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // Sender dropped: the handle was detached, keep serving.
                    if rx.await.is_err() {
                        std::future::pending::<()>().await;
                    }
                })
                .await
        });

        Ok(ServerHandle::new(local_addr, tx, task))
    }
}

async fn notify(
    State(handler): State<NotificationHandler>,
    Form(notification): Form<Notification>,
) -> &'static str {
    handler(notification);
    "OK"
}
