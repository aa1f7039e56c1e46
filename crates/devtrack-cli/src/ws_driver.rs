//! WebSocket driver
//!
//! Connects to `{server}?action={action}`, reads text frames and writes the
//! rendered document to a file on every `present`.

use std::{future::Future, path::PathBuf, time::Duration};

use devtrack_app::{Driver, TransportEvent};
use devtrack_core::MemoryDocument;
use futures_util::{SinkExt, StreamExt};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, trace};
use url::Url;

use crate::error::WsError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// [`Driver`] over a real WebSocket and the local filesystem.
pub struct WsDriver {
    server: Url,
    stream: Option<WsStream>,
    document: MemoryDocument,
    out: PathBuf,
    rng: StdRng,
}

impl WsDriver {
    /// Driver for `server`, rendering a page located at `page_url` into `out`.
    pub fn new(server: Url, page_url: Url, out: PathBuf) -> Self {
        Self {
            server,
            stream: None,
            document: MemoryDocument::new(page_url),
            out,
            rng: StdRng::from_entropy(),
        }
    }

    /// Endpoint for the server-side `action`.
    pub fn endpoint(&self, action: &str) -> Url {
        let mut url = self.server.clone();
        url.query_pairs_mut().clear().append_pair("action", action);
        url
    }

    /// Output file.
    pub fn out(&self) -> &PathBuf {
        &self.out
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Driver for WsDriver {
    type Error = WsError;
    type Document = MemoryDocument;

    async fn connect(&mut self, action: &str) -> Result<(), WsError> {
        let url = self.endpoint(action);
        self.stream = None;
        debug!(%url, "connecting");
        let (stream, _response) = connect_async(url.as_str()).await.map_err(Box::new)?;
        self.stream = Some(stream);
        Ok(())
    }

    async fn recv(&mut self) -> TransportEvent {
        let reason = loop {
            let Some(stream) = self.stream.as_mut() else {
                break "not connected".to_owned();
            };

            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return TransportEvent::Message(text.as_str().to_owned());
                },
                Some(Ok(Message::Close(frame))) => {
                    break frame
                        .map(|frame| frame.reason.as_str().to_owned())
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "closed by server".to_owned());
                },
                Some(Ok(other)) => trace!(?other, "ignoring non-text frame"),
                Some(Err(error)) => break error.to_string(),
                None => break "stream ended".to_owned(),
            }
        };

        self.stream = None;
        TransportEvent::Closed { reason }
    }

    async fn send(&mut self, text: String) -> Result<(), WsError> {
        let stream = self.stream.as_mut().ok_or(WsError::NotConnected)?;
        stream.send(Message::Text(text.into())).await.map_err(Box::new)?;
        Ok(())
    }

    fn sleep(&mut self, delay: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(delay)
    }

    fn entropy(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn document(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    fn present(&mut self) -> Result<(), WsError> {
        let html = self.document.to_html();
        let staging = self.out.with_extension("html.tmp");
        let write =
            |path: &PathBuf, source| WsError::Write { path: path.display().to_string(), source };

        std::fs::write(&staging, html).map_err(|e| write(&staging, e))?;
        std::fs::rename(&staging, &self.out).map_err(|e| write(&self.out, e))?;
        trace!(out = %self.out.display(), "page written");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.stream = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(server: &str) -> WsDriver {
        WsDriver::new(
            Url::parse(server).unwrap(),
            Url::parse("http://localhost:8000/").unwrap(),
            PathBuf::from("devices.html"),
        )
    }

    #[test]
    fn endpoint_carries_action_query() {
        let driver = driver("ws://localhost:8000/");
        assert_eq!(
            driver.endpoint("goog-device-list").as_str(),
            "ws://localhost:8000/?action=goog-device-list"
        );
    }

    #[test]
    fn endpoint_replaces_existing_query() {
        let driver = driver("wss://devices.example/tracker?action=old&x=1");
        assert_eq!(
            driver.endpoint("appl-device-list").as_str(),
            "wss://devices.example/tracker?action=appl-device-list"
        );
    }
}
