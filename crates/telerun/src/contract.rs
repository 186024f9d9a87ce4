//! # Contract Descriptions
//!
//! A contract is the runtime-inspectable description of a remote interface:
//! a name plus an ordered set of method signatures. It is built once and
//! drives both sides of the system, so there is no interface-description
//! language and no generation step.
//!
//! ## Philosophy
//!
//! - **Identity by name**: Two contracts describe the same interface exactly
//!   when their names are equal. Choose names accordingly.
//! - **Validation at the edges**: Remote-validity is checked when a skeleton
//!   or stub is constructed, never per call.

use telerpc::Value;

/// Contract validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A method does not declare the remote-fault kind among what it can
    /// signal, so a caller could not tell a network failure from an
    /// application error.
    NotRemoteSafe { contract: String, method: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotRemoteSafe { contract, method } => write!(
                f,
                "method '{}.{}' does not declare the remote-fault kind",
                contract, method
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// The declared type of a single method parameter.
///
/// The wire carries only tagged dynamic values, so compatibility is a
/// predicate over runtime cases rather than a static type relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    I32,
    I64,
    F32,
    F64,
    Char,
    Str,
    /// Any concrete list value.
    List,
    /// The mapping capability: any concrete map value satisfies it.
    Map,
    /// A remote reference speaking the named contract.
    Stub(String),
}

impl ParamType {
    /// Whether a runtime value is acceptable for this declared parameter.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::I32, Value::I32(_)) => true,
            (ParamType::I64, Value::I64(_)) => true,
            (ParamType::F32, Value::F32(_)) => true,
            (ParamType::F64, Value::F64(_)) => true,
            (ParamType::Char, Value::Char(_)) => true,
            (ParamType::Str, Value::Str(_)) => true,
            (ParamType::List, Value::List(_)) => true,
            (ParamType::Map, Value::Map(_)) => true,
            (ParamType::Stub(contract), Value::Stub(sref)) => sref.contract == *contract,
            _ => false,
        }
    }
}

/// The signature of one remote method: name, ordered parameters, and the
/// failure kinds it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<ParamType>,
    /// Whether the method declares that it can signal the remote-fault kind.
    pub declares_remote_fault: bool,
}

impl MethodSig {
    /// A signature that declares no failure kinds. Call [`remote_fault`]
    /// before using it in a remote contract.
    ///
    /// [`remote_fault`]: MethodSig::remote_fault
    pub fn new(name: impl Into<String>, params: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            params,
            declares_remote_fault: false,
        }
    }

    /// Marks the method as able to signal the remote-fault kind.
    pub fn remote_fault(mut self) -> Self {
        self.declares_remote_fault = true;
        self
    }
}

/// A named, immutable set of method signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub name: String,
    pub methods: Vec<MethodSig>,
}

impl Contract {
    pub fn new(name: impl Into<String>, methods: Vec<MethodSig>) -> Self {
        Self { name: name.into(), methods }
    }
}

/// Checks that a contract is usable for remote invocation.
///
/// Every method must declare the remote-fault kind; otherwise a caller has no
/// way to distinguish "the network or service failed" from "the method raised
/// its own error". Runs once, at skeleton and stub construction.
pub fn validate_remote(contract: &Contract) -> Result<()> {
    for method in &contract.methods {
        if !method.declares_remote_fault {
            return Err(Error::NotRemoteSafe {
                contract: contract.name.clone(),
                method: method.name.clone(),
            });
        }
    }
    Ok(())
}
