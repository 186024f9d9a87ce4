//! # Method Resolution
//!
//! Finds the unique method a wire call refers to. Arguments arrive untyped,
//! so resolution works over the contract's static table plus the runtime
//! case of each argument: filter by name, then by arity, then check every
//! parameter position with [`ParamType::admits`]. The first candidate that
//! satisfies all positions wins.
//!
//! A failed resolution is a protocol mismatch. The dispatcher must answer it
//! on the wire; leaving the caller waiting is not an option.

use crate::contract::Contract;
use crate::contract::MethodSig;

use telerpc::Value;

/// Resolution failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No declared method carries the requested name.
    UnknownName { contract: String, method: String },
    /// The name exists, but no candidate accepted this argument list.
    NoOverload { contract: String, method: String, arity: usize },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownName { contract, method } => {
                write!(f, "contract '{}' declares no method '{}'", contract, method)
            }
            Error::NoOverload { contract, method, arity } => write!(
                f,
                "no overload of '{}.{}' accepts {} argument(s) of these shapes",
                contract, method, arity
            ),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Resolves a call to a declared method.
///
/// Candidates with the wrong parameter count are excluded outright; among the
/// rest, every position must admit the corresponding runtime value.
pub fn resolve<'c>(contract: &'c Contract, method: &str, args: &[Value]) -> Result<&'c MethodSig> {
    let mut name_seen = false;

    for candidate in &contract.methods {
        if candidate.name != method {
            continue;
        }
        name_seen = true;

        if candidate.params.len() != args.len() {
            continue;
        }

        let compatible = candidate
            .params
            .iter()
            .zip(args)
            .all(|(param, arg)| param.admits(arg));

        if compatible {
            return Ok(candidate);
        }
    }

    if name_seen {
        Err(Error::NoOverload {
            contract: contract.name.clone(),
            method: method.to_string(),
            arity: args.len(),
        })
    } else {
        Err(Error::UnknownName {
            contract: contract.name.clone(),
            method: method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ParamType;

    use telerpc::StubRef;

    fn pingpong() -> Contract {
        Contract::new(
            "PingPong",
            vec![
                MethodSig::new("ping", vec![ParamType::I32]).remote_fault(),
                MethodSig::new("ping", vec![ParamType::F64]).remote_fault(),
                MethodSig::new("tally", vec![ParamType::Map]).remote_fault(),
                MethodSig::new("relay", vec![ParamType::Stub("PingPong".into())]).remote_fault(),
            ],
        )
    }

    #[test]
    fn test_overloads_resolved_by_runtime_case() {
        let contract = pingpong();

        let sig = resolve(&contract, "ping", &[Value::I32(5)]).unwrap();
        assert_eq!(sig.params, vec![ParamType::I32]);

        let sig = resolve(&contract, "ping", &[Value::F64(5.0)]).unwrap();
        assert_eq!(sig.params, vec![ParamType::F64]);
    }

    #[test]
    fn test_unknown_name() {
        let contract = pingpong();
        let err = resolve(&contract, "pong", &[Value::I32(1)]).unwrap_err();
        assert!(matches!(err, Error::UnknownName { .. }));
    }

    #[test]
    fn test_arity_excludes_candidates() {
        let contract = pingpong();

        let err = resolve(&contract, "ping", &[]).unwrap_err();
        assert!(matches!(err, Error::NoOverload { arity: 0, .. }));

        let err = resolve(&contract, "ping", &[Value::I32(1), Value::I32(2)]).unwrap_err();
        assert!(matches!(err, Error::NoOverload { arity: 2, .. }));
    }

    #[test]
    fn test_wrong_argument_case_is_a_mismatch() {
        let contract = pingpong();
        let err = resolve(&contract, "ping", &[Value::Str("5".into())]).unwrap_err();
        assert!(matches!(err, Error::NoOverload { .. }));
    }

    #[test]
    fn test_map_capability_admits_any_concrete_map() {
        let contract = pingpong();

        let empty = Value::Map(vec![]);
        assert!(resolve(&contract, "tally", &[empty]).is_ok());

        let one_entry = Value::Map(vec![("a".into(), Value::I32(1))]);
        assert!(resolve(&contract, "tally", &[one_entry]).is_ok());
    }

    #[test]
    fn test_stub_parameter_matches_by_contract_name() {
        let contract = pingpong();

        let same = Value::Stub(StubRef {
            contract: "PingPong".into(),
            addr: "127.0.0.1:7710".parse().unwrap(),
        });
        assert!(resolve(&contract, "relay", &[same]).is_ok());

        let other = Value::Stub(StubRef {
            contract: "Scoreboard".into(),
            addr: "127.0.0.1:7710".parse().unwrap(),
        });
        assert!(resolve(&contract, "relay", &[other]).is_err());
    }
}
