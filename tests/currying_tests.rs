mod common;

use embridge::{Arg, Handle};

use common::{bridge, call};

#[test]
fn partial_application_returns_a_callable_handle() {
    let b = bridge();
    let inc: Handle = call(&b, "test_int", [Arg::Int(1)]).unwrap();
    assert_eq!(b.anchored(), 1);

    let mut c = b.begin_call(&inc).unwrap();
    c.push(1i64).unwrap();
    assert_eq!(c.perform::<i64>().unwrap(), 2);

    // The partial application is reusable.
    let mut c = b.begin_call(&inc).unwrap();
    c.push(41i64).unwrap();
    assert_eq!(c.perform::<i64>().unwrap(), 42);
}

#[test]
fn three_step_currying() {
    let b = bridge();
    let p1: Handle = call(&b, "sum3", [Arg::Int(1)]).unwrap();
    let mut c = b.begin_call(&p1).unwrap();
    c.push(2i64).unwrap();
    let p2: Handle = c.perform().unwrap();
    let mut c = b.begin_call(&p2).unwrap();
    c.push(3i64).unwrap();
    assert_eq!(c.perform::<i64>().unwrap(), 6);
}

#[test]
fn over_application_applies_the_returned_function() {
    let b = bridge();
    // make_adder 10 returns `add 10`, which then receives 5.
    assert_eq!(
        call::<i64>(&b, "make_adder", [Arg::Int(10), Arg::Int(5)]).unwrap(),
        15
    );
}

#[test]
fn function_handles_can_be_passed_back_as_arguments() {
    let b = bridge();
    let adder: Handle = call(&b, "make_adder", [Arg::Int(3)]).unwrap();
    assert_eq!(
        call::<i64>(&b, "apply_fn", [Arg::from(&adder), Arg::Int(4)]).unwrap(),
        7
    );
}

#[test]
fn applying_a_non_function_raises() {
    let b = bridge();
    let value: Handle = call(&b, "get_value", [Arg::Unit]).unwrap();
    let mut c = b.begin_call(&value).unwrap();
    c.push(1i64).unwrap();
    let err = c.perform::<i64>().unwrap_err();
    let record = err.exception().expect("embedded exception");
    assert!(record.message.starts_with("Invalid_argument("), "{}", record.message);
}
