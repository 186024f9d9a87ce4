//! # Handler Seam
//!
//! The contract between the dispatcher and the implementation object. The
//! skeleton resolves each inbound call to a [`MethodSig`] and hands the
//! arguments here; what happens next belongs entirely to the implementation.

use crate::contract::MethodSig;

use telerpc::Value;

/// The outcome of a local invocation: a return value, or an application
/// fault payload that will be carried to the caller verbatim.
pub type Invocation = std::result::Result<Value, Value>;

/// An implementation object that a skeleton can dispatch into.
///
/// The skeleton invokes this concurrently from many worker tasks; staying
/// safe under concurrent invocation is the implementation's obligation, not
/// the dispatcher's. Methods returning nothing should produce
/// `Ok(Value::Unit)`.
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Invokes the resolved method with the decoded arguments.
    ///
    /// `method` is the signature the resolver selected, so overloaded names
    /// can be told apart by their parameter lists.
    async fn invoke(&self, method: &MethodSig, args: Vec<Value>) -> Invocation;
}
