//! # Protocol Frames
//!
//! Defines the structure of the two envelopes: Call and Reply.
//!
//! A Call names the contract, the method, and carries the argument list.
//! A Reply carries exactly one of a return value or a [`Fault`]; the receiver
//! must check the fault arm before interpreting the value.
//!
//! ## Invariants
//! - **Panic Safety**: All decoding paths return `Result`, never panicking on unknown data.
//! - **Forward Compatibility**: Unknown header fields are safely skipped.
//!
//! There is no correlation field: the transport pairs one call with one reply
//! by using a dedicated connection per call.

use crate::codec::decode_value;
use crate::codec::decode_values;
use crate::codec::encode_value;
use crate::error::Error;
use crate::error::Fault;
use crate::error::Result;
use crate::value::Value;

use telepack::Decoder;
use telepack::Encoder;

/// Encodes an outbound Call envelope.
pub struct CallEncoder<'a> {
    pub contract: &'a str,
    pub method: &'a str,
    pub args: &'a [Value],
}

impl<'a> CallEncoder<'a> {
    pub fn new(contract: &'a str, method: &'a str, args: &'a [Value]) -> Self {
        Self { contract, method, args }
    }

    /// Encode this call into the encoder.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.variant_begin("Call")?;
        enc.map_begin()?;

        write_map_str(enc, "contract", self.contract)?;
        write_map_str(enc, "method", self.method)?;

        enc.variant_begin("args")?;
        enc.list_begin()?;
        for arg in self.args {
            encode_value(enc, arg)?;
        }
        enc.list_end()?;
        enc.variant_end()?;

        enc.map_end()?;
        enc.variant_end()?;
        Ok(())
    }

    /// Convenience: encode straight to a fresh byte vector.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        self.encode(&mut enc)?;
        Ok(enc.into_bytes()?)
    }
}

/// A decoded inbound Call envelope.
#[derive(Debug)]
pub struct CallDecoder {
    pub contract: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl CallDecoder {
    /// Decode a Call envelope body.
    pub fn decode(mut dec: Decoder) -> Result<Self> {
        let mut map = dec.map()?;
        let mut contract = None;
        let mut method = None;
        let mut args = None;

        while let Some((key, mut val)) = map.next()? {
            match key {
                "contract" => contract = Some(val.str()?.to_string()),
                "method" => method = Some(val.str()?.to_string()),
                "args" => args = Some(decode_values(&mut val)?),
                _ => val.skip()?,
            }
        }

        Ok(CallDecoder {
            contract: contract.ok_or(Error::MissingField("contract".into()))?,
            method: method.ok_or(Error::MissingField("method".into()))?,
            args: args.ok_or(Error::MissingField("args".into()))?,
        })
    }
}

/// Encodes an outbound Reply envelope (success).
pub struct ReplyOkEncoder<'a> {
    pub value: &'a Value,
}

impl<'a> ReplyOkEncoder<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// Encode this success reply into the encoder.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.variant_begin("Reply")?;
        enc.result_ok_begin()?;
        encode_value(enc, self.value)?;
        enc.result_ok_end()?;
        enc.variant_end()?;
        Ok(())
    }

    /// Convenience: encode straight to a fresh byte vector.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        self.encode(&mut enc)?;
        Ok(enc.into_bytes()?)
    }
}

/// Encodes an outbound Reply envelope (fault).
pub struct ReplyErrEncoder<'a> {
    pub fault: &'a Fault,
}

impl<'a> ReplyErrEncoder<'a> {
    pub fn new(fault: &'a Fault) -> Self {
        Self { fault }
    }

    /// Encode this fault reply into the encoder.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        enc.variant_begin("Reply")?;
        enc.result_err_begin()?;

        match self.fault {
            Fault::App(payload) => {
                enc.variant_begin("app")?;
                encode_value(enc, payload)?;
                enc.variant_end()?;
            }
            Fault::NoMethod(detail) => {
                enc.variant_begin("no-method")?;
                enc.str(detail)?;
                enc.variant_end()?;
            }
        }

        enc.result_err_end()?;
        enc.variant_end()?;
        Ok(())
    }

    /// Convenience: encode straight to a fresh byte vector.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new();
        self.encode(&mut enc)?;
        Ok(enc.into_bytes()?)
    }
}

/// A decoded inbound Reply envelope.
#[derive(Debug)]
pub struct ReplyDecoder {
    /// The outcome of the call: a return value, or the fault that replaced it.
    pub outcome: std::result::Result<Value, Fault>,
}

impl ReplyDecoder {
    /// Decode a Reply envelope body.
    pub fn decode(mut dec: Decoder) -> Result<Self> {
        let outcome = match dec.result()? {
            Ok(mut ok_body) => Ok(decode_value(&mut ok_body)?),
            Err(mut err_body) => Err(Self::decode_fault(&mut err_body)?),
        };
        Ok(ReplyDecoder { outcome })
    }

    fn decode_fault(dec: &mut Decoder) -> Result<Fault> {
        let (tag, mut body) = dec.variant()?;
        match tag {
            "app" => Ok(Fault::App(decode_value(&mut body)?)),
            "no-method" => Ok(Fault::NoMethod(body.str()?.to_string())),
            other => Err(Error::UnknownVariant(format!("fault: {}", other))),
        }
    }
}

/// Top-level frame decoder.
#[derive(Debug)]
pub enum WireFrame {
    Call(CallDecoder),
    Reply(ReplyDecoder),
}

impl WireFrame {
    /// Decode a frame from raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let (frame_type, body) = dec.variant()?;
        match frame_type {
            "Call" => Ok(WireFrame::Call(CallDecoder::decode(body)?)),
            "Reply" => Ok(WireFrame::Reply(ReplyDecoder::decode(body)?)),
            _ => Err(Error::UnknownVariant(format!("top-level frame: {}", frame_type))),
        }
    }
}

// Helper functions

fn write_map_str(enc: &mut Encoder, key: &str, val: &str) -> Result<()> {
    enc.variant_begin(key)?;
    enc.str(val)?;
    enc.variant_end()?;
    Ok(())
}
