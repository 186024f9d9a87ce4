//! # Wire Values
//!
//! The closed schema of everything that may be used as an argument or a
//! return value. There is no open-ended object graph: a type crosses the
//! network only if it has a case here.

use std::fmt;
use std::net::SocketAddr;

/// A dynamically-typed value as it travels over the wire.
///
/// Arguments and results are always carried in this form; method resolution
/// on the receiving side works by inspecting the runtime case of each
/// argument rather than any declared static type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent return value of a void method.
    Unit,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    List(Vec<Value>),
    /// A string-keyed mapping. Entry order is preserved on the wire.
    Map(Vec<(String, Value)>),
    /// A reference to a remote object; the receiver may call through it.
    Stub(StubRef),
}

impl Value {
    /// Short description of the value's case, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Char(_) => "char",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Stub(_) => "stub",
        }
    }
}

/// The wire form of a stub: which contract it speaks, and where.
///
/// Passing a `StubRef` as an argument is what makes nested RPC possible:
/// the receiving side can attach its own contract description and call back
/// through the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StubRef {
    /// The contract identifier the remote skeleton is bound to.
    pub contract: String,
    /// The skeleton's listen address.
    pub addr: SocketAddr,
}

impl fmt::Display for StubRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.contract, self.addr)
    }
}
