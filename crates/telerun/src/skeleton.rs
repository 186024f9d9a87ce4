//! # Skeleton
//!
//! The server-side dispatcher: a multithreaded TCP server whose clients are
//! stubs. One acceptor task owns the listen socket; every accepted connection
//! is serviced by its own worker task that reads exactly one call, resolves
//! it against the bound contract, invokes the implementation, and writes the
//! reply back.
//!
//! ## Lifecycle
//!
//! *constructed → running → stopped → running → …*
//!
//! `start` binds and returns immediately; `stop` is idempotent and blocks
//! until the acceptor has fully exited. Workers already in flight are not
//! cancelled. Top-level failures are routed through the [`Hooks`] trait.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use telerpc::Fault;
use telerpc::ReplyErrEncoder;
use telerpc::ReplyOkEncoder;
use telerpc::WireFrame;

use crate::contract;
use crate::contract::Contract;
use crate::handler::Handler;
use crate::resolve;
use crate::transport;

/// Skeleton lifecycle errors.
#[derive(Debug, Clone)]
pub enum Error {
    /// `start` (or `rebind`) called while the acceptor is running.
    AlreadyRunning,
    /// The listen socket could not be created or bound.
    Bind(String),
    /// The contract failed remote validation.
    Contract(contract::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "skeleton is already running"),
            Self::Bind(msg) => write!(f, "bind failed: {}", msg),
            Self::Contract(e) => write!(f, "invalid contract: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<contract::Error> for Error {
    fn from(e: contract::Error) -> Self {
        Self::Contract(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failure while servicing a single connection.
#[derive(Debug)]
pub enum ServiceError {
    /// Reading the call or writing the reply failed.
    Transport(transport::Error),
    /// The inbound bytes could not be understood, or the reply could not be
    /// encoded.
    Codec(telerpc::Error),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport failure: {}", e),
            Self::Codec(e) => write!(f, "codec failure: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Extension points for top-level failures in the listening and service
/// tasks. All methods have defaults; override what you need.
pub trait Hooks: Send + Sync + 'static {
    /// Called when `accept` fails. The return value decides whether the
    /// acceptor resumes: `true` to keep listening, `false` to shut down.
    ///
    /// The default resumes on transient per-connection conditions and stops
    /// on anything that suggests the listen socket itself is unusable.
    fn listen_error(&self, error: &io::Error) -> bool {
        tracing::warn!(%error, "failure while accepting a connection");
        matches!(
            error.kind(),
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::Interrupted
                | io::ErrorKind::TimedOut
                | io::ErrorKind::WouldBlock
        )
    }

    /// Called when a worker fails to service its connection. Other
    /// connections are unaffected. The default reports and moves on.
    fn service_error(&self, error: &ServiceError) {
        tracing::warn!(%error, "failure while servicing a call");
    }

    /// Called exactly once when the acceptor exits: with the fatal error if
    /// it crashed, or `None` after a deliberate `stop`. The default does
    /// nothing.
    fn stopped(&self, _cause: Option<&io::Error>) {}
}

/// The default hook set: report through `tracing`, decide per the trait
/// defaults.
pub struct LogHooks;

impl Hooks for LogHooks {}

struct Active {
    shutdown: watch::Sender<bool>,
    acceptor: JoinHandle<()>,
}

struct State {
    /// Configured up front, or recorded at the first successful `start`.
    address: Option<SocketAddr>,
    active: Option<Active>,
}

/// The server-side binding of a contract to an implementation object.
pub struct Skeleton {
    contract: Arc<Contract>,
    handler: Arc<dyn Handler>,
    hooks: Arc<dyn Hooks>,
    /// Serializes `start`/`stop` against each other.
    gate: tokio::sync::Mutex<()>,
    state: Mutex<State>,
}

impl Skeleton {
    /// Creates a skeleton with no initial address; `start` will pick one
    /// (an OS-assigned port on the loopback interface) and make it
    /// queryable via [`address`](Skeleton::address).
    pub fn new(contract: Arc<Contract>, handler: Arc<dyn Handler>) -> Result<Self> {
        Self::construct(contract, handler, None)
    }

    /// Creates a skeleton that will listen on the given address. Use this
    /// when the port number is significant.
    pub fn with_address(
        contract: Arc<Contract>,
        handler: Arc<dyn Handler>,
        address: SocketAddr,
    ) -> Result<Self> {
        Self::construct(contract, handler, Some(address))
    }

    fn construct(
        contract: Arc<Contract>,
        handler: Arc<dyn Handler>,
        address: Option<SocketAddr>,
    ) -> Result<Self> {
        contract::validate_remote(&contract)?;
        Ok(Self {
            contract,
            handler,
            hooks: Arc::new(LogHooks),
            gate: tokio::sync::Mutex::new(()),
            state: Mutex::new(State { address, active: None }),
        })
    }

    /// Replaces the hook set. Intended to be called before `start`.
    pub fn with_hooks(mut self, hooks: impl Hooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// The bound address, or `None` before the first successful `start` of
    /// an address-less skeleton.
    pub fn address(&self) -> Option<SocketAddr> {
        self.state.lock().unwrap().address
    }

    /// The contract this skeleton serves.
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// Starts the acceptor.
    ///
    /// Binds the listen socket, records the live address, spawns the
    /// acceptor task, and returns; the caller is never blocked on serving.
    /// Starting a running skeleton is an error. A skeleton whose acceptor
    /// has already exited on its own counts as stopped here.
    pub async fn start(&self) -> Result<()> {
        let _gate = self.gate.lock().await;

        let requested = {
            let mut state = self.state.lock().unwrap();
            if let Some(active) = &state.active {
                if !active.acceptor.is_finished() {
                    return Err(Error::AlreadyRunning);
                }
                state.active = None;
            }
            state.address
        };

        let bind_to = requested.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 0)));
        let listener = TcpListener::bind(bind_to)
            .await
            .map_err(|e| Error::Bind(format!("{}: {}", bind_to, e)))?;
        let bound = listener.local_addr().map_err(|e| Error::Bind(e.to_string()))?;

        let (shutdown, signal) = watch::channel(false);
        let acceptor = tokio::spawn(accept_loop(
            listener,
            signal,
            Arc::clone(&self.contract),
            Arc::clone(&self.handler),
            Arc::clone(&self.hooks),
        ));

        tracing::info!(contract = %self.contract.name, address = %bound, "skeleton started");

        let mut state = self.state.lock().unwrap();
        state.address = Some(bound);
        state.active = Some(Active { shutdown, acceptor });
        Ok(())
    }

    /// Stops the acceptor, if it is running; otherwise does nothing.
    ///
    /// Blocks until the acceptor has fully exited. Workers created for
    /// connections already accepted keep running to completion. The skeleton
    /// may be started again afterwards, optionally at a different address
    /// via [`rebind`](Skeleton::rebind).
    pub async fn stop(&self) {
        let _gate = self.gate.lock().await;

        let active = self.state.lock().unwrap().active.take();
        let Some(active) = active else { return };

        let _ = active.shutdown.send(true);
        let _ = active.acceptor.await;

        tracing::info!(contract = %self.contract.name, "skeleton stopped");
    }

    /// Changes the address used by the next `start`. Refused while running.
    pub fn rebind(&self, address: SocketAddr) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .active
            .as_ref()
            .is_some_and(|active| !active.acceptor.is_finished())
        {
            return Err(Error::AlreadyRunning);
        }
        state.address = Some(address);
        Ok(())
    }
}

/// Accepts connections until told to stop or the listener becomes unusable.
async fn accept_loop(
    listener: TcpListener,
    mut signal: watch::Receiver<bool>,
    contract: Arc<Contract>,
    handler: Arc<dyn Handler>,
    hooks: Arc<dyn Hooks>,
) {
    let cause = loop {
        tokio::select! {
            _ = signal.changed() => break None,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    let contract = Arc::clone(&contract);
                    let handler = Arc::clone(&handler);
                    let hooks = Arc::clone(&hooks);
                    tokio::spawn(async move {
                        if let Err(error) = service(stream, &contract, &handler).await {
                            hooks.service_error(&error);
                        }
                    });
                }
                Err(error) => {
                    if !hooks.listen_error(&error) {
                        break Some(error);
                    }
                }
            }
        }
    };

    hooks.stopped(cause.as_ref());
}

/// Services one connection: exactly one call, exactly one reply.
async fn service(
    mut stream: TcpStream,
    contract: &Contract,
    handler: &Arc<dyn Handler>,
) -> std::result::Result<(), ServiceError> {
    let Some(payload) = transport::read_frame(&mut stream)
        .await
        .map_err(ServiceError::Transport)?
    else {
        // The peer connected and left without asking anything.
        return Ok(());
    };

    let frame = WireFrame::decode(&payload).map_err(ServiceError::Codec)?;
    let WireFrame::Call(call) = frame else {
        return Err(ServiceError::Codec(telerpc::Error::ProtocolViolation(
            "received Reply frame while waiting for Call".into(),
        )));
    };

    // A mismatch is answered with a fault, never left unanswered: a silent
    // drop would leave the remote stub blocked on its read.
    let reply = if call.contract != contract.name {
        let fault = Fault::NoMethod(format!(
            "contract '{}' is not served here (bound: '{}')",
            call.contract, contract.name
        ));
        ReplyErrEncoder::new(&fault).into_bytes()
    } else {
        match resolve::resolve(contract, &call.method, &call.args) {
            Ok(signature) => match handler.invoke(signature, call.args).await {
                Ok(value) => ReplyOkEncoder::new(&value).into_bytes(),
                Err(payload) => ReplyErrEncoder::new(&Fault::App(payload)).into_bytes(),
            },
            Err(error) => ReplyErrEncoder::new(&Fault::NoMethod(error.to_string())).into_bytes(),
        }
    };

    let reply = reply.map_err(ServiceError::Codec)?;
    transport::write_frame(&mut stream, &reply)
        .await
        .map_err(ServiceError::Transport)?;

    Ok(())
}
