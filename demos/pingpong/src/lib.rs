//! The ping-pong demo service: a contract, a trivial implementation, and
//! nothing clever. Everything here lives outside the runtime core and talks
//! to it only through the public contract, skeleton, and stub interfaces.

use std::sync::Arc;

use telerpc::Value;
use telerun::contract::Contract;
use telerun::contract::MethodSig;
use telerun::contract::ParamType;
use telerun::handler::Handler;
use telerun::handler::Invocation;

/// The contract every party agrees on.
pub fn contract() -> Arc<Contract> {
    Arc::new(Contract::new(
        "PingPong",
        vec![
            MethodSig::new("ping", vec![ParamType::I32]).remote_fault(),
            // Same name, different argument type: exercises overload
            // resolution from the runtime value.
            MethodSig::new("ping", vec![ParamType::F64]).remote_fault(),
            // Takes the mapping capability, not one concrete type.
            MethodSig::new("tally", vec![ParamType::Map]).remote_fault(),
        ],
    ))
}

/// The reference implementation.
pub struct PingPong;

#[async_trait::async_trait]
impl Handler for PingPong {
    async fn invoke(&self, method: &MethodSig, args: Vec<Value>) -> Invocation {
        match (method.name.as_str(), &args[..]) {
            ("ping", [Value::I32(n)]) => Ok(Value::Str(format!("Pong {}", n))),
            ("ping", [Value::F64(n)]) => Ok(Value::Str(format!("Pong double {}", n))),
            ("tally", [Value::Map(entries)]) => {
                tracing::info!(entries = entries.len(), "tally received");
                Ok(Value::Str("ok".into()))
            }
            _ => Err(Value::Str(format!("no such play: {}", method.name))),
        }
    }
}
