//! TCP accept loop and per-connection tasks.
//!
//! Every accepted socket gets a reader loop (this task) that decodes
//! [`ClientCommand`] frames and hands them to the [`Dispatcher`], and a
//! writer task that drains the connection's outbox onto the socket.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Duration;

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::protocol::{ClientCommand, ServerMessage};
use crate::session::ConnectionId;
use crate::transport::tcp::{FrameWriter, TcpTransport};

/// Bind `config.bind` and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    let dispatcher = Arc::new(Dispatcher::from_seed(config.seed));
    if let Some(s) = config.seed {
        info!("using fixed seed {} for random attacks", s);
    }
    serve(listener, dispatcher, config).await
}

/// Accept connections from `listener` forever.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("{}: set_nodelay failed: {}", addr, e);
        }
        let dispatcher = Arc::clone(&dispatcher);
        let config = config.clone();
        tokio::spawn(async move {
            handle_connection(stream, dispatcher, &config).await;
        });
    }
}

/// Run one connection to completion and clean up after it.
pub async fn handle_connection(stream: TcpStream, dispatcher: Arc<Dispatcher>, config: &ServerConfig) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    let transport: TcpTransport<ServerMessage, ClientCommand> = TcpTransport::with_timeout(
        stream,
        Duration::from_secs(config.write_timeout_secs),
    )
    .with_max_frame_size(config.max_frame_size);
    let (mut reader, writer) = transport.into_split();

    let (conn, outbox) = dispatcher.router().connect();
    info!("{} connected from {}", conn, peer);
    let writer_task = tokio::spawn(drain_outbox(conn, outbox, writer));

    loop {
        match reader.recv().await {
            Ok(Ok(command)) => {
                debug!("{} sent {}", conn, command.kind());
                dispatcher.dispatch(conn, command).await;
            }
            Ok(Err(e)) => {
                warn!("{} sent an undecodable command: {}", conn, e);
                dispatcher.router().send_to(
                    conn,
                    ServerMessage::Error {
                        reason: format!("invalid command: {}", e),
                    },
                );
            }
            Err(e) => {
                info!("{} closed: {}", conn, e);
                break;
            }
        }
    }

    // Dropping the router entry closes the outbox, which ends the writer.
    dispatcher.disconnect(conn);
    if let Err(e) = writer_task.await {
        warn!("{} writer task failed: {}", conn, e);
    }
}

async fn drain_outbox(
    conn: ConnectionId,
    mut outbox: UnboundedReceiver<ServerMessage>,
    mut writer: FrameWriter<ServerMessage>,
) {
    while let Some(message) = outbox.recv().await {
        if let Err(e) = writer.send(&message).await {
            warn!("{} write failed: {}", conn, e);
            break;
        }
    }
}
