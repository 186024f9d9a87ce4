use crate::*;

use telepack::Decoder;
use telepack::Encoder;

fn roundtrip(value: Value) -> Value {
    let mut enc = Encoder::new();
    encode_value(&mut enc, &value).expect("encoding failed");
    let bytes = enc.into_bytes().expect("scopes open");

    let mut dec = Decoder::new(&bytes);
    decode_value(&mut dec).expect("decoding failed")
}

fn stub_ref(contract: &str, addr: &str) -> StubRef {
    StubRef { contract: contract.to_string(), addr: addr.parse().unwrap() }
}

// ============================================================================
//  VALUE CODEC
// ============================================================================

#[test]
fn test_scalar_symmetry() {
    assert_eq!(roundtrip(Value::Unit), Value::Unit);
    assert_eq!(roundtrip(Value::Bool(true)), Value::Bool(true));
    assert_eq!(roundtrip(Value::I32(-5)), Value::I32(-5));
    assert_eq!(roundtrip(Value::I64(i64::MIN)), Value::I64(i64::MIN));
    assert_eq!(roundtrip(Value::F64(2.5)), Value::F64(2.5));
    assert_eq!(roundtrip(Value::Char('龍')), Value::Char('龍'));
    assert_eq!(roundtrip(Value::Str("Pong 5".into())), Value::Str("Pong 5".into()));
}

#[test]
fn test_integer_and_float_stay_distinct() {
    // The overload resolver depends on i32 and f64 decoding to different cases.
    assert_eq!(roundtrip(Value::I32(5)).kind(), "i32");
    assert_eq!(roundtrip(Value::F64(5.0)).kind(), "f64");
}

#[test]
fn test_nested_containers() {
    let value = Value::Map(vec![
        ("scores".into(), Value::List(vec![Value::I32(1), Value::I32(2)])),
        ("label".into(), Value::Str("deep".into())),
        ("inner".into(), Value::Map(vec![("empty".into(), Value::List(vec![]))])),
    ]);
    assert_eq!(roundtrip(value.clone()), value);
}

#[test]
fn test_stub_reference_roundtrip() {
    let value = Value::Stub(stub_ref("PingPong", "127.0.0.1:7710"));
    assert_eq!(roundtrip(value.clone()), value);
}

#[test]
fn test_stub_inside_argument_list() {
    let args = vec![
        Value::Stub(stub_ref("PingPong", "10.0.0.2:9000")),
        Value::I32(1),
    ];
    let bytes = CallEncoder::new("Consumer", "play", &args).into_bytes().unwrap();

    let WireFrame::Call(call) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Call frame");
    };
    assert_eq!(call.args, args);
}

#[test]
fn test_recursion_limit() {
    let mut value = Value::I32(0);
    for _ in 0..200 {
        value = Value::List(vec![value]);
    }

    let mut enc = Encoder::new();
    let err = encode_value(&mut enc, &value).unwrap_err();
    assert_eq!(err, Error::RecursionLimitExceeded);
}

// ============================================================================
//  ENVELOPES
// ============================================================================

#[test]
fn test_call_envelope_roundtrip() {
    let args = vec![Value::I32(5), Value::Str("extra".into())];
    let bytes = CallEncoder::new("PingPong", "ping", &args).into_bytes().unwrap();

    let WireFrame::Call(call) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Call frame");
    };
    assert_eq!(call.contract, "PingPong");
    assert_eq!(call.method, "ping");
    assert_eq!(call.args, args);
}

#[test]
fn test_reply_ok_roundtrip() {
    let bytes = ReplyOkEncoder::new(&Value::Str("Pong 5".into())).into_bytes().unwrap();

    let WireFrame::Reply(reply) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Reply frame");
    };
    assert_eq!(reply.outcome, Ok(Value::Str("Pong 5".into())));
}

#[test]
fn test_reply_app_fault_carries_payload() {
    let payload = Value::Map(vec![
        ("kind".into(), Value::Str("DivideByZero".into())),
        ("detail".into(), Value::Str("n must be nonzero".into())),
    ]);
    let bytes = ReplyErrEncoder::new(&Fault::App(payload.clone())).into_bytes().unwrap();

    let WireFrame::Reply(reply) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Reply frame");
    };
    assert_eq!(reply.outcome, Err(Fault::App(payload)));
}

#[test]
fn test_reply_no_method_fault() {
    let fault = Fault::NoMethod("no overload of 'ping' takes (str)".into());
    let bytes = ReplyErrEncoder::new(&fault).into_bytes().unwrap();

    let WireFrame::Reply(reply) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Reply frame");
    };
    assert_eq!(reply.outcome, Err(fault));
}

// ============================================================================
//  MALFORMED INPUT
// ============================================================================

#[test]
fn test_garbage_bytes_rejected() {
    let err = WireFrame::decode(&[0xFF, 0xFE, 0xFD]).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn test_unknown_top_level_frame_rejected() {
    let mut enc = Encoder::new();
    enc.variant_begin("Gossip").unwrap();
    enc.unit().unwrap();
    enc.variant_end().unwrap();
    let bytes = enc.into_bytes().unwrap();

    let err = WireFrame::decode(&bytes).unwrap_err();
    assert!(matches!(err, Error::UnknownVariant(_)));
}

#[test]
fn test_call_missing_method_rejected() {
    let mut enc = Encoder::new();
    enc.variant_begin("Call").unwrap();
    enc.map_begin().unwrap();
    enc.variant_begin("contract").unwrap();
    enc.str("PingPong").unwrap();
    enc.variant_end().unwrap();
    enc.variant_begin("args").unwrap();
    enc.list_begin().unwrap();
    enc.list_end().unwrap();
    enc.variant_end().unwrap();
    enc.map_end().unwrap();
    enc.variant_end().unwrap();
    let bytes = enc.into_bytes().unwrap();

    let err = WireFrame::decode(&bytes).unwrap_err();
    assert_eq!(err, Error::MissingField("method".into()));
}

#[test]
fn test_unknown_header_fields_are_skipped() {
    // A newer sender may add fields; an older reader must step over them.
    let mut enc = Encoder::new();
    enc.variant_begin("Call").unwrap();
    enc.map_begin().unwrap();
    enc.variant_begin("deadline-ms").unwrap();
    enc.i64(1500).unwrap();
    enc.variant_end().unwrap();
    enc.variant_begin("contract").unwrap();
    enc.str("PingPong").unwrap();
    enc.variant_end().unwrap();
    enc.variant_begin("method").unwrap();
    enc.str("ping").unwrap();
    enc.variant_end().unwrap();
    enc.variant_begin("args").unwrap();
    enc.list_begin().unwrap();
    enc.i32(5).unwrap();
    enc.list_end().unwrap();
    enc.variant_end().unwrap();
    enc.map_end().unwrap();
    enc.variant_end().unwrap();
    let bytes = enc.into_bytes().unwrap();

    let WireFrame::Call(call) = WireFrame::decode(&bytes).unwrap() else {
        panic!("expected Call frame");
    };
    assert_eq!(call.method, "ping");
    assert_eq!(call.args, vec![Value::I32(5)]);
}
