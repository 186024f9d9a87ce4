//! # Stub
//!
//! The client-side proxy. A stub looks like an implementation of a contract
//! but forwards every call over the network: open a connection, send the
//! call envelope, block for the reply, decode it, and hand back either the
//! return value or the failure, without ever conflating the two.
//!
//! ## Invariants
//!
//! - A stub is immutable and stateless. It never retries or pools
//!   connections, and applies no timeout beyond the platform socket
//!   defaults.
//! - Identity is value-based: two stubs are interchangeable exactly when
//!   they share a contract identifier and a remote address, however they
//!   were constructed.

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use telerpc::CallEncoder;
use telerpc::Fault;
use telerpc::StubRef;
use telerpc::Value;
use telerpc::WireFrame;

use crate::contract;
use crate::contract::Contract;
use crate::skeleton::Skeleton;
use crate::transport;
use crate::transport::TcpTransport;
use crate::transport::Transport;

/// Stub construction errors.
#[derive(Debug, Clone)]
pub enum Error {
    /// The contract failed remote validation.
    Contract(contract::Error),
    /// The skeleton has no address: none was configured and it has not been
    /// started.
    AddressUnset,
    /// A wire reference names a different contract than the one supplied.
    ContractMismatch { expected: String, found: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contract(e) => write!(f, "invalid contract: {}", e),
            Self::AddressUnset => write!(f, "skeleton has no address (configure one or start it)"),
            Self::ContractMismatch { expected, found } => {
                write!(f, "reference speaks '{}', expected '{}'", found, expected)
            }
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

/// Errors during a remote call.
///
/// `Transport` and `Codec` together form the uniform transport-failure kind:
/// any failure while connecting, exchanging bytes, or decoding (including a
/// malformed or absent response) lands in one of them. The other two arms
/// are the remote side speaking: a protocol mismatch report, or the
/// application's own error carried through verbatim.
#[derive(Debug)]
pub enum CallError {
    /// The network exchange failed.
    Transport(transport::Error),
    /// Bytes could not be produced or understood.
    Codec(telerpc::Error),
    /// The remote dispatcher found no matching method.
    Mismatch(String),
    /// The implementation raised this payload; it is not interpreted here.
    App(Value),
}

impl CallError {
    /// Whether this is the transport-failure kind (as opposed to the remote
    /// side having answered).
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Codec(_))
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport failure: {}", e),
            Self::Codec(e) => write!(f, "codec failure: {}", e),
            Self::Mismatch(detail) => write!(f, "protocol mismatch: {}", detail),
            Self::App(payload) => write!(f, "application fault: {:?}", payload),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<transport::Error> for CallError {
    fn from(e: transport::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<telerpc::Error> for CallError {
    fn from(e: telerpc::Error) -> Self {
        Self::Codec(e)
    }
}

/// A contract-conforming proxy bound to a remote address.
pub struct Stub {
    contract: Arc<Contract>,
    address: SocketAddr,
    transport: Arc<dyn Transport>,
}

impl Stub {
    /// Creates a stub for a remote skeleton at a known address.
    ///
    /// Use this primarily when bootstrapping: the server is already running
    /// somewhere and there is no direct way to obtain a reference.
    pub fn new(contract: Arc<Contract>, address: SocketAddr) -> Result<Self> {
        contract::validate_remote(&contract)?;
        Ok(Self {
            transport: Arc::new(TcpTransport::new(address)),
            contract,
            address,
        })
    }

    /// Creates a stub from a skeleton with an assigned address.
    ///
    /// The skeleton must either have been created with a fixed address, or
    /// have already been started.
    pub fn for_skeleton(contract: Arc<Contract>, skeleton: &Skeleton) -> Result<Self> {
        let address = skeleton.address().ok_or(Error::AddressUnset)?;
        Self::new(contract, address)
    }

    /// As [`for_skeleton`](Stub::for_skeleton), but overrides the host
    /// portion, keeping the skeleton's port.
    ///
    /// For setups where the skeleton's own address is not externally
    /// routable (NAT, private networks) and the creator knows a better one.
    pub fn for_skeleton_with_host(
        contract: Arc<Contract>,
        skeleton: &Skeleton,
        host: IpAddr,
    ) -> Result<Self> {
        let bound = skeleton.address().ok_or(Error::AddressUnset)?;
        Self::new(contract, SocketAddr::new(host, bound.port()))
    }

    /// Attaches a local contract description to a reference received over
    /// the wire. The names must agree.
    pub fn from_ref(contract: Arc<Contract>, reference: &StubRef) -> Result<Self> {
        if reference.contract != contract.name {
            return Err(Error::ContractMismatch {
                expected: contract.name.clone(),
                found: reference.contract.clone(),
            });
        }
        Self::new(contract, reference.addr)
    }

    /// Creates a stub over a caller-supplied transport. The address still
    /// defines the stub's identity; the transport defines only how bytes
    /// move.
    pub fn with_transport(
        contract: Arc<Contract>,
        address: SocketAddr,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        contract::validate_remote(&contract)?;
        Ok(Self { contract, address, transport })
    }

    /// The wire form of this stub, for passing it as an argument.
    pub fn to_ref(&self) -> StubRef {
        StubRef {
            contract: self.contract.name.clone(),
            addr: self.address,
        }
    }

    /// The contract this stub speaks.
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// The remote address this stub connects to.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Performs one remote call: one connection, one envelope each way.
    ///
    /// Returns the decoded value on success. An application fault is
    /// re-raised as [`CallError::App`] with its payload untouched; every
    /// network or codec failure is the transport-failure kind.
    pub async fn call(&self, method: &str, args: &[Value]) -> std::result::Result<Value, CallError> {
        let payload = CallEncoder::new(&self.contract.name, method, args).into_bytes()?;
        let response = self.transport.call(&payload).await?;

        let frame = WireFrame::decode(&response)?;
        let WireFrame::Reply(reply) = frame else {
            return Err(CallError::Codec(telerpc::Error::ProtocolViolation(
                "received Call frame while waiting for Reply".into(),
            )));
        };

        match reply.outcome {
            Ok(value) => Ok(value),
            Err(Fault::App(payload)) => Err(CallError::App(payload)),
            Err(Fault::NoMethod(detail)) => Err(CallError::Mismatch(detail)),
        }
    }
}

// Identity is (contract name, address); the transport is behavior, not
// identity, so independently constructed stubs compare equal.

impl PartialEq for Stub {
    fn eq(&self, other: &Self) -> bool {
        self.contract.name == other.contract.name && self.address == other.address
    }
}

impl Eq for Stub {}

impl Hash for Stub {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.contract.name.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.contract.name, self.address)
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("contract", &self.contract.name)
            .field("address", &self.address)
            .finish()
    }
}
