//! # Codec
//!
//! The translation layer between [`Value`] and the telepack wire format.
//!
//! ## Invariants
//! - **Recursion Safety**: All recursive operations are bounded by `MAX_RECURSION_DEPTH`.
//! - **Self-Description**: Decoding needs no expected-type table; every value
//!   carries its own tag. The symmetric pair `encode_value`/`decode_value`
//!   is the whole wire contract.

use crate::error::Error;
use crate::error::Result;
use crate::value::StubRef;
use crate::value::Value;

use telepack::Decoder;
use telepack::Encoder;
use telepack::Tag;

/// The maximum nesting depth for values before refusing.
const MAX_RECURSION_DEPTH: usize = 64;

/// Encodes a [`Value`] into the encoder stream.
///
/// # Errors
/// Returns `Error::RecursionLimitExceeded` if the value is too deeply nested.
pub fn encode_value(enc: &mut Encoder, value: &Value) -> Result<()> {
    encode_value_impl(enc, value, 0)
}

fn encode_value_impl(enc: &mut Encoder, value: &Value, depth: usize) -> Result<()> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(Error::RecursionLimitExceeded);
    }

    match value {
        Value::Unit => enc.unit()?,
        Value::Bool(b) => enc.bool(*b)?,
        Value::I32(v) => enc.i32(*v)?,
        Value::I64(v) => enc.i64(*v)?,
        Value::F32(v) => enc.f32(*v)?,
        Value::F64(v) => enc.f64(*v)?,
        Value::Char(v) => enc.char(*v)?,
        Value::Str(v) => enc.str(v)?,
        Value::List(items) => {
            enc.list_begin()?;
            for item in items {
                encode_value_impl(enc, item, depth + 1)?;
            }
            enc.list_end()?;
        }
        Value::Map(entries) => {
            enc.map_begin()?;
            for (key, val) in entries {
                enc.variant_begin(key)?;
                encode_value_impl(enc, val, depth + 1)?;
                enc.variant_end()?;
            }
            enc.map_end()?;
        }
        Value::Stub(sref) => {
            enc.variant_begin("stub")?;
            enc.map_begin()?;
            enc.variant_begin("contract")?;
            enc.str(&sref.contract)?;
            enc.variant_end()?;
            enc.variant_begin("addr")?;
            enc.str(&sref.addr.to_string())?;
            enc.variant_end()?;
            enc.map_end()?;
            enc.variant_end()?;
        }
    }
    Ok(())
}

/// Decodes a List container into the values it holds.
///
/// Used for argument lists; the count is whatever the sender wrote.
pub fn decode_values(list_decoder: &mut Decoder) -> Result<Vec<Value>> {
    let mut iter = list_decoder.list()?;
    let mut values = Vec::new();
    while let Some(mut item) = iter.next() {
        values.push(decode_value_impl(&mut item, 0)?);
    }
    Ok(values)
}

/// Decodes a single self-described [`Value`].
pub fn decode_value(dec: &mut Decoder) -> Result<Value> {
    decode_value_impl(dec, 0)
}

fn decode_value_impl(dec: &mut Decoder, depth: usize) -> Result<Value> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(Error::RecursionLimitExceeded);
    }

    match dec.peek_tag()? {
        Tag::Unit => {
            dec.unit()?;
            Ok(Value::Unit)
        }
        Tag::BoolTrue | Tag::BoolFalse => Ok(Value::Bool(dec.bool()?)),
        Tag::I32 => Ok(Value::I32(dec.i32()?)),
        Tag::I64 => Ok(Value::I64(dec.i64()?)),
        Tag::F32 => Ok(Value::F32(dec.f32()?)),
        Tag::F64 => Ok(Value::F64(dec.f64()?)),
        Tag::Char => Ok(Value::Char(dec.char()?)),
        Tag::Str => Ok(Value::Str(dec.str()?.to_string())),

        Tag::List => {
            let mut iter = dec.list()?;
            let mut items = Vec::new();
            while let Some(mut item) = iter.next() {
                items.push(decode_value_impl(&mut item, depth + 1)?);
            }
            Ok(Value::List(items))
        }

        Tag::Map => {
            let mut iter = dec.map()?;
            let mut entries = Vec::new();
            while let Some((key, mut val)) = iter.next()? {
                entries.push((key.to_string(), decode_value_impl(&mut val, depth + 1)?));
            }
            Ok(Value::Map(entries))
        }

        Tag::Variant => {
            let (name, body) = dec.variant()?;
            match name {
                "stub" => Ok(Value::Stub(decode_stub_ref(body)?)),
                other => Err(Error::UnknownVariant(other.to_string())),
            }
        }

        // Result containers belong to the envelope layer, not the value layer.
        Tag::ResultOk | Tag::ResultErr => {
            Err(Error::ProtocolViolation("result container in value position".into()))
        }
    }
}

fn decode_stub_ref(mut body: Decoder) -> Result<StubRef> {
    let mut map = body.map()?;
    let mut contract = None;
    let mut addr = None;

    while let Some((key, mut val)) = map.next()? {
        match key {
            "contract" => contract = Some(val.str()?.to_string()),
            "addr" => addr = Some(val.str()?.to_string()),
            _ => val.skip()?,
        }
    }

    let contract = contract.ok_or(Error::MissingField("contract".into()))?;
    let addr = addr.ok_or(Error::MissingField("addr".into()))?;
    let addr = addr
        .parse()
        .map_err(|_| Error::ProtocolViolation(format!("unparseable stub address '{}'", addr)))?;

    Ok(StubRef { contract, addr })
}
