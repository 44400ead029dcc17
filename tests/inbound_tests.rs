mod common;

use embridge::{
    Arg, BridgeError, Handle, Int32, Int64,
    host::{HostClass, HostError, HostRef, HostValue},
};

use common::{bridge, call, point};

fn call_static<'a, T: embridge::FromEmbedded>(
    b: &'a embridge::Bridge,
    class: &'a str,
    method: &'a str,
    arg: Arg<'a>,
) -> Result<T, BridgeError> {
    call(b, "call_static", [Arg::from(class), Arg::from(method), arg])
}

#[test]
fn embedded_code_calls_static_host_methods() {
    let b = bridge();
    assert_eq!(
        call::<i64>(&b, "call_host_add", [Arg::Int(2), Arg::Int(3)]).unwrap(),
        5
    );
    assert_eq!(
        call_static::<Vec<u8>>(&b, "Test", "wrap_string", Arg::from("x")).unwrap(),
        b"[x]"
    );
}

#[test]
fn recursion_through_the_host() {
    let b = bridge();
    let result = call::<Vec<u8>>(&b, "test_rec_a", [Arg::from("")]).unwrap();
    assert_eq!(result, b"abababababab");
    assert_eq!(b.anchored(), 0);
}

#[test]
fn host_error_propagates_with_its_cause() {
    let b = bridge();
    let err = call::<()>(&b, "call_host_raise", [Arg::Unit]).unwrap_err();
    assert_eq!(err.to_string(), "Exception: test");

    let cause = err.host_cause().expect("host cause");
    assert_eq!(cause.class(), "Exception");
    assert_eq!(cause.message(), "test");

    let record = err.exception().unwrap();
    assert_eq!(record.message, "Exception: test");
    let embedded = record.frames.iter().take_while(|f| f.is_embedded()).count();
    assert!(embedded >= 1);
    assert_eq!(record.frames[embedded].method, "<init>");
    assert_eq!(record.frames.last().unwrap().method, "perform");
    assert_eq!(record.frames.len(), embedded + 2);
}

#[test]
fn embedded_code_can_catch_host_errors() {
    let b = bridge();
    assert_eq!(call::<Vec<u8>>(&b, "catch_host", [Arg::Unit]).unwrap(), b"test");
}

#[test]
fn throw_reraises_the_given_host_error() {
    let b = bridge();
    let original = HostError::new("Exception", "lol1");
    let err = call::<()>(&b, "test_throw", [Arg::from(HostRef::new(original.clone()))]).unwrap_err();
    assert!(matches!(err, BridgeError::Host(_)));
    assert_eq!(err.host_cause(), Some(&original));
}

#[test]
fn throw_of_a_non_error_is_an_embedded_failure() {
    let b = bridge();
    let err = call::<()>(&b, "test_throw", [Arg::from(point(1))]).unwrap_err();
    let BridgeError::Embedded(record) = err else {
        panic!("expected embedded exception");
    };
    assert!(record.message.starts_with("Invalid_argument("));
}

#[test]
fn throw_new_creates_a_host_error() {
    let b = bridge();
    let err = call::<()>(&b, "test_throw_new", [Arg::from("lol2")]).unwrap_err();
    let cause = err.host_cause().expect("host cause");
    assert_eq!(cause.class(), "Exception");
    assert_eq!(cause.message(), "lol2");
}

#[test]
fn instance_methods_receive_their_receiver() {
    let b = bridge();
    assert_eq!(
        call::<i64>(&b, "shift_point", [Arg::from(point(3)), Arg::Int(4)]).unwrap(),
        7
    );

    let err = call::<i64>(&b, "shift_point", [Arg::Object(None), Arg::Int(4)]).unwrap_err();
    assert_eq!(err.host_cause().unwrap().class(), "NullPointerException");

    let not_a_point = HostRef::new(HostError::new("Exception", "x"));
    let err = call::<i64>(&b, "shift_point", [Arg::from(not_a_point), Arg::Int(4)]).unwrap_err();
    assert_eq!(err.host_cause().unwrap().class(), "IllegalArgumentException");
}

#[test]
fn unknown_host_method_raises_not_found() {
    let b = bridge();
    let err = call::<()>(&b, "missing_host_method", [Arg::Unit]).unwrap_err();
    assert_eq!(err.exception().unwrap().message, "Not_found");
}

#[test]
fn arguments_are_marshalled_by_tag() {
    let b = bridge();
    b.host().register(HostClass::new("Inspect").static_method("kind", |call| {
        Ok(HostValue::from(call.arg(0)?.kind()))
    }));
    let kind = |arg: Arg<'_>| -> String {
        let bytes = call_static::<Vec<u8>>(&b, "Inspect", "kind", arg).unwrap();
        String::from_utf8(bytes).unwrap()
    };

    assert_eq!(kind(Arg::Unit), "unit");
    assert_eq!(kind(Arg::Int(1)), "int");
    assert_eq!(kind(Arg::Float(1.0)), "float");
    assert_eq!(kind(Arg::from("s")), "string");
    assert_eq!(kind(Arg::Bool(false)), "bool");
    assert_eq!(kind(Arg::from(Int32(1))), "int32");
    assert_eq!(kind(Arg::from(Int64(1))), "int64");
    assert_eq!(kind(Arg::Object(None)), "object");
    assert_eq!(kind(Arg::from(point(0))), "object");

    let tuple: Handle = call(&b, "get_value", [Arg::Unit]).unwrap();
    assert_eq!(kind(Arg::from(&tuple)), "value");
    // The inbound anchor is released when the host method returns.
    assert_eq!(b.anchored(), 1);
}

#[test]
fn host_methods_can_return_handles() {
    let b = bridge();
    b.host().register(HostClass::new("Inspect").static_method("same", |call| {
        let handle = call.arg(0)?.as_handle()?;
        let copy = call
            .bridge()
            .duplicate(handle)
            .map_err(|err| HostError::new("BridgeException", err.to_string()))?;
        Ok(HostValue::Value(copy))
    }));
    let tuple: Handle = call(&b, "get_value", [Arg::Unit]).unwrap();
    let back: Handle = call_static(&b, "Inspect", "same", Arg::from(&tuple)).unwrap();
    assert_eq!(call::<i64>(&b, "test_a", [Arg::from(&back)]).unwrap(), 42);
    assert_eq!(b.anchored(), 2);
}

#[test]
fn collection_is_deferred_inside_inbound_calls() {
    let b = bridge();
    b.host().register(HostClass::new("Inspect").static_method("collect", |call| {
        let collected = call
            .bridge()
            .collect()
            .map_err(|err| HostError::new("BridgeException", err.to_string()))?;
        Ok(HostValue::Bool(collected))
    }));
    assert!(!call_static::<bool>(&b, "Inspect", "collect", Arg::Unit).unwrap());
    assert!(b.collect().unwrap());
}

#[test]
fn returning_a_foreign_handle_raises_in_embedded_code() {
    let a = bridge();
    let b = bridge();
    let tuple: Handle = call(&a, "get_value", [Arg::Unit]).unwrap();
    let slot = parking_lot::Mutex::new(Some(tuple));
    b.host().register(HostClass::new("Inspect").static_method("foreign", move |_| {
        Ok(slot.lock().take().map_or(HostValue::Unit, HostValue::Value))
    }));

    let err = call_static::<Handle>(&b, "Inspect", "foreign", Arg::Unit).unwrap_err();
    assert_eq!(err.host_cause().unwrap().class(), "IllegalArgumentException");
    assert_eq!(a.anchored(), 0);
    assert_eq!(b.anchored(), 0);
}
