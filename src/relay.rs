//! WebSocket frame relay for fmplapla streams.
//!
//! Once a stream token is issued, the station serves raw audio frames
//! over a websocket negotiated with a fixed sub-protocol. The relay
//! authenticates by sending the token as the first outbound message and
//! then forwards every received frame to the output sink in arrival
//! order. There is no retry and no buffering window: the session lives
//! exactly as long as the underlying connection, and any connection or
//! sink failure unwinds immediately.

use std::collections::HashMap;

use anyhow::{Context, Result};
use futures::{SinkExt, Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::{
    connect_async_tls_with_config,
    tungstenite::{
        handshake::client::generate_key,
        http::{Request, Uri},
        Message,
    },
    Connector,
};
use tracing::{debug, info};

/// Sub-protocol identifier the fmplapla edge expects during the handshake.
pub const SUBPROTOCOL: &str = "listener.fmplapla.com";

/// Connect to a stream location, authenticate with the token, and relay
/// every audio frame into `sink` until the origin closes the connection.
///
/// `headers` are forwarded verbatim on the upgrade request. Returns the
/// number of payload bytes written.
pub async fn record<W>(
    url: &str,
    token: &str,
    headers: &HashMap<String, String>,
    sink: &mut W,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    // Ensure crypto provider is installed
    let _ = rustls::crypto::ring::default_provider().install_default();

    let uri: Uri = url.parse().context("Invalid stream location URL")?;
    let host = uri.host().context("No host in stream location")?.to_string();

    let mut request = Request::builder()
        .method("GET")
        .uri(url)
        .header("Host", &host)
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header("Sec-WebSocket-Key", generate_key())
        .header("Sec-WebSocket-Protocol", SUBPROTOCOL);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    let request = request.body(()).context("Failed to build relay request")?;

    // Connect with TLS using rustls
    let connector = Connector::Rustls(std::sync::Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates({
                let mut roots = rustls::RootCertStore::empty();
                let certs = rustls_native_certs::load_native_certs();
                for cert in certs.certs {
                    let _ = roots.add(cert);
                }
                roots
            })
            .with_no_client_auth(),
    ));

    info!(%host, "Connecting stream relay");

    let (mut ws, response) = connect_async_tls_with_config(request, None, false, Some(connector))
        .await
        .context("Relay connection failed")?;

    debug!(status = ?response.status(), "Relay connected");

    // The token is the entire authentication exchange.
    ws.send(Message::Text(token.to_string()))
        .await
        .context("Failed to send stream token")?;

    forward_frames(&mut ws, sink).await
}

/// Forward frames to the sink until the connection ends.
///
/// Text frames are written as their UTF-8 bytes, binary frames verbatim,
/// both in exact arrival order. Control frames carry no audio and are
/// skipped. Returns the number of bytes written.
pub async fn forward_frames<S, W>(frames: &mut S, sink: &mut W) -> Result<u64>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;

    while let Some(frame) = frames.next().await {
        let payload: Vec<u8> = match frame.context("Relay receive failed")? {
            Message::Text(text) => text.into_bytes(),
            Message::Binary(data) => data,
            Message::Close(close) => {
                info!(frame = ?close, "Relay closed by origin");
                break;
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
        };

        sink.write_all(&payload).await.context("Sink write failed")?;
        written += payload.len() as u64;
    }

    sink.flush().await.context("Sink flush failed")?;
    debug!(bytes = written, "Relay finished");
    Ok(written)
}
