//! # Telerpc
//!
//! The wire protocol for remote method calls over Telepack.
//!
//! ## Architecture
//!
//! This library defines the closed set of values that may cross the network
//! (`Value`), a self-describing codec for them, and the two envelope shapes
//! of the protocol: a `Call` (contract, method, arguments) and a `Reply`
//! (exactly one of a return value or a fault).
//!
//! The codec is self-describing on purpose: arguments arrive untyped and the
//! receiving dispatcher resolves the target method by inspecting the runtime
//! shape of what was sent.

mod codec;
mod error;
mod frame;
mod value;

#[cfg(test)]
mod tests;

pub use codec::decode_value;
pub use codec::decode_values;
pub use codec::encode_value;
pub use error::Error;
pub use error::Fault;
pub use error::Result;
pub use frame::CallDecoder;
pub use frame::CallEncoder;
pub use frame::ReplyDecoder;
pub use frame::ReplyErrEncoder;
pub use frame::ReplyOkEncoder;
pub use frame::WireFrame;
pub use value::StubRef;
pub use value::Value;
