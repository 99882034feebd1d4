//! TCP server: bridges sockets to the [`RpcEngine`].
//!
//! One tokio task per connection.  Requests on a connection are handled
//! strictly in order; concurrency across connections is serialized by the
//! pin-table lock inside the service.

use std::future::Future;
use std::io;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::app::ports::HardwareDriver;
use crate::error::Error;

use super::codec::{DecodedFrame, LineDecoder};
use super::engine::{ClientId, RpcEngine};
use super::messages::Reply;

const READ_BUF_SIZE: usize = 1024;

/// Accept connections until `shutdown` resolves.
///
/// Returns once the listener is closed; connection tasks already running
/// finish their current request on their own.
pub async fn serve<D, F>(
    listener: TcpListener,
    engine: Arc<RpcEngine<D>>,
    max_frame_bytes: usize,
    shutdown: F,
) -> io::Result<()>
where
    D: HardwareDriver + Send + 'static,
    F: Future<Output = ()>,
{
    info!("Listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);

    let mut next_id: ClientId = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested; no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        next_id += 1;
                        let client_id = next_id;
                        info!("RPC[{}]: connected from {}", client_id, peer);

                        let engine = Arc::clone(&engine);
                        tokio::spawn(async move {
                            match handle_connection(stream, client_id, engine, max_frame_bytes).await {
                                Ok(()) => info!("RPC[{}]: disconnected", client_id),
                                Err(e) => warn!("RPC[{}]: connection error: {}", client_id, e),
                            }
                        });
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
        }
    }

    Ok(())
}

async fn handle_connection<D>(
    mut stream: TcpStream,
    client_id: ClientId,
    engine: Arc<RpcEngine<D>>,
    max_frame_bytes: usize,
) -> io::Result<()>
where
    D: HardwareDriver + Send + 'static,
{
    let mut decoder = LineDecoder::new(max_frame_bytes);
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }

        for frame in decoder.feed(&buf[..n]) {
            let reply = match frame {
                DecodedFrame::Line(line) => engine.dispatch_line(client_id, &line),
                DecodedFrame::Oversized => {
                    warn!("RPC[{}]: frame exceeds {} bytes", client_id, max_frame_bytes);
                    Reply::error(&Error::InvalidParameter("Request too large"))
                }
                DecodedFrame::Malformed => {
                    Reply::error(&Error::InvalidParameter("Request is not valid UTF-8"))
                }
            };

            let mut out = reply.to_line();
            debug!("RPC[{}]: -> {}", client_id, out);
            out.push('\n');
            stream.write_all(out.as_bytes()).await?;
        }
    }
}
