//! # Transport Abstraction
//!
//! A minimal, async interface for one request/response exchange.
//!
//! ## Philosophy
//!
//! - **Byte-Oriented**: The transport knows nothing about envelopes or
//!   values. It moves opaque buffers.
//! - **Connection-per-call**: One `call` is one transport session. Nothing
//!   is pooled or reused; the session belongs to the call that opened it.

use std::fmt;
use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Frames larger than this are refused on both sides.
const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Errors that occur at the network/transport layer.
#[derive(Debug, Clone)]
pub enum Error {
    /// The remote address could not be reached.
    Connect(String),
    /// The peer vanished mid-exchange, or never answered.
    ConnectionLost(String),
    /// The payload exceeds the frame size limit.
    PayloadTooLarge,
    /// Generic I/O failure.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect failed: {}", msg),
            Self::ConnectionLost(msg) => write!(f, "connection lost: {}", msg),
            Self::PayloadTooLarge => write!(f, "payload too large for transport"),
            Self::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// A mechanism to send a byte buffer and receive the reply.
///
/// This trait is designed to be object-safe (`Arc<dyn Transport>`).
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends a payload and waits for the response.
    ///
    /// # invariants
    /// - Must return `Ok(vec)` with the raw reply bytes on success.
    /// - Must return `Err` if the network fails or the peer never answers.
    /// - Must not interpret the payload content.
    async fn call(&self, payload: &[u8]) -> Result<Vec<u8>>;
}

/// The production transport: one fresh TCP connection per call.
///
/// Frames are a `u32` little-endian length followed by the payload; the
/// matching reader lives in [`read_frame`]. No deadlines are applied, by
/// design; a stalled peer stalls the call.
pub struct TcpTransport {
    addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn call(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut stream = TcpStream::connect(self.addr)
            .await
            .map_err(|e| Error::Connect(format!("{}: {}", self.addr, e)))?;

        write_frame(&mut stream, payload).await?;

        match read_frame(&mut stream).await? {
            Some(response) => Ok(response),
            None => Err(Error::ConnectionLost("peer closed without answering".into())),
        }
    }
}

/// Writes one length-prefixed frame.
pub(crate) async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> Result<()> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(Error::PayloadTooLarge);
    }

    let len = (payload.len() as u32).to_le_bytes();
    stream.write_all(&len).await.map_err(|e| Error::Io(e.to_string()))?;
    stream.write_all(payload).await.map_err(|e| Error::Io(e.to_string()))?;
    stream.flush().await.map_err(|e| Error::Io(e.to_string()))?;
    Ok(())
}

/// Reads one length-prefixed frame.
///
/// Returns `Ok(None)` if the peer closed the connection cleanly before
/// sending anything; a close mid-frame is an error.
pub(crate) async fn read_frame(stream: &mut TcpStream) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = stream
            .read(&mut header[filled..])
            .await
            .map_err(|e| Error::Io(e.to_string()))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(Error::ConnectionLost("peer closed mid-header".into()));
        }
        filled += n;
    }

    let len = u32::from_le_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(Error::PayloadTooLarge);
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::ConnectionLost("peer closed mid-frame".into())
        } else {
            Error::Io(e.to_string())
        }
    })?;

    Ok(Some(payload))
}
