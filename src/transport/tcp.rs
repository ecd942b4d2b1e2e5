//! Length-prefixed `bincode` frames over TCP.
//!
//! Each frame is a 4-byte big-endian payload length followed by the payload.
//! Zero-length frames and frames above the configured maximum are rejected
//! before any payload is read.

use std::marker::PhantomData;

use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::Transport;

/// Default timeout for a single send (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum frame payload (1 MiB).
pub const MAX_FRAME_SIZE: u32 = 1 << 20;

fn map_io(e: std::io::Error, op: &str) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow!("Connection closed by peer"),
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            anyhow!("Connection reset by peer")
        }
        _ => anyhow!("{} error: {}", op, e),
    }
}

/// Serialize `msg` and write it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, msg: &T, max_frame_size: u32) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = bincode::serialize(msg).map_err(|e| anyhow!("Serialization error: {}", e))?;
    if data.len() > max_frame_size as usize {
        return Err(anyhow!(
            "Message too large: {} bytes (max: {})",
            data.len(),
            max_frame_size
        ));
    }
    let len = (data.len() as u32).to_be_bytes();
    writer.write_all(&len).await.map_err(|e| map_io(e, "Write"))?;
    writer.write_all(&data).await.map_err(|e| map_io(e, "Write"))?;
    writer.flush().await.map_err(|e| map_io(e, "Write"))?;
    Ok(())
}

/// Read one frame's payload. Errors here leave the stream unusable.
pub async fn read_frame_bytes<R>(reader: &mut R, max_frame_size: u32) -> anyhow::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| map_io(e, "Read"))?;
    let len = u32::from_be_bytes(len_buf);
    if len == 0 {
        return Err(anyhow!("Invalid message length: 0"));
    }
    if len > max_frame_size {
        return Err(anyhow!(
            "Message too large: {} bytes (max: {})",
            len,
            max_frame_size
        ));
    }

    let mut buf = vec![0u8; len as usize];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| map_io(e, "Read"))?;
    Ok(buf)
}

/// Deserialize one frame payload.
pub fn decode_frame<T: DeserializeOwned>(payload: &[u8]) -> anyhow::Result<T> {
    bincode::deserialize(payload).map_err(|e| anyhow!("Deserialization error: {}", e))
}

/// Read one frame and deserialize it.
pub async fn read_frame<R, T>(reader: &mut R, max_frame_size: u32) -> anyhow::Result<T>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = read_frame_bytes(reader, max_frame_size).await?;
    decode_frame(&payload)
}

/// Receiving half of a split [`TcpTransport`]. No read timeout.
///
/// A frame that arrives whole but does not decode is reported inside the
/// outer `Ok`: the stream is still in sync and reading may continue.
pub struct FrameReader<Rx> {
    half: OwnedReadHalf,
    max_frame_size: u32,
    _rx: PhantomData<fn() -> Rx>,
}

impl<Rx: DeserializeOwned> FrameReader<Rx> {
    pub async fn recv(&mut self) -> anyhow::Result<anyhow::Result<Rx>> {
        let payload = read_frame_bytes(&mut self.half, self.max_frame_size).await?;
        Ok(decode_frame(&payload))
    }
}

/// Sending half of a split [`TcpTransport`].
pub struct FrameWriter<Tx> {
    half: OwnedWriteHalf,
    timeout_duration: Duration,
    max_frame_size: u32,
    _tx: PhantomData<fn(Tx)>,
}

impl<Tx: Serialize> FrameWriter<Tx> {
    pub async fn send(&mut self, msg: &Tx) -> anyhow::Result<()> {
        timeout(
            self.timeout_duration,
            write_frame(&mut self.half, msg, self.max_frame_size),
        )
        .await
        .map_err(|_| anyhow!("Send timeout after {:?}", self.timeout_duration))?
    }
}

/// Framed TCP connection sending `Tx` and receiving `Rx`.
pub struct TcpTransport<Tx, Rx> {
    stream: TcpStream,
    timeout_duration: Duration,
    recv_timeout: Option<Duration>,
    max_frame_size: u32,
    _marker: PhantomData<fn(Tx) -> Rx>,
}

impl<Tx, Rx> TcpTransport<Tx, Rx> {
    /// Sends time out after [`DEFAULT_TIMEOUT`]; receives wait indefinitely.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            timeout_duration: DEFAULT_TIMEOUT,
            recv_timeout: None,
            max_frame_size: MAX_FRAME_SIZE,
            _marker: PhantomData,
        }
    }

    /// Apply `timeout_duration` to both sends and receives.
    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        Self {
            timeout_duration,
            recv_timeout: Some(timeout_duration),
            ..Self::new(stream)
        }
    }

    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Split into independently owned halves so reads and writes can run in
    /// separate tasks.
    pub fn into_split(self) -> (FrameReader<Rx>, FrameWriter<Tx>) {
        let (read, write) = self.stream.into_split();
        (
            FrameReader {
                half: read,
                max_frame_size: self.max_frame_size,
                _rx: PhantomData,
            },
            FrameWriter {
                half: write,
                timeout_duration: self.timeout_duration,
                max_frame_size: self.max_frame_size,
                _tx: PhantomData,
            },
        )
    }
}

#[async_trait::async_trait]
impl<Tx, Rx> Transport<Tx, Rx> for TcpTransport<Tx, Rx>
where
    Tx: Serialize + Send + Sync + 'static,
    Rx: DeserializeOwned + Send + 'static,
{
    async fn send(&mut self, msg: Tx) -> anyhow::Result<()> {
        timeout(
            self.timeout_duration,
            write_frame(&mut self.stream, &msg, self.max_frame_size),
        )
        .await
        .map_err(|_| anyhow!("Send timeout after {:?}", self.timeout_duration))?
    }

    async fn recv(&mut self) -> anyhow::Result<Rx> {
        let recv_op = read_frame(&mut self.stream, self.max_frame_size);
        match self.recv_timeout {
            Some(limit) => timeout(limit, recv_op)
                .await
                .map_err(|_| anyhow!("Receive timeout after {:?}", limit))?,
            None => recv_op.await,
        }
    }
}
