#![allow(dead_code)]

use embridge::{
    Arg, Bridge, BridgeConfig, BridgeError, FromEmbedded, Target,
    embedded::{Program, Value},
    host::{HostCall, HostClass, HostError, HostObject, HostRef, HostValue},
};

/// Host object used as receiver of inbound instance calls.
#[derive(Debug)]
pub struct Point {
    pub x: i64,
}

impl HostObject for Point {
    fn class_name(&self) -> &str {
        "Point"
    }
}

pub fn program() -> Program {
    Program::new().module("fixture", |m| {
        m.export("test_function", 1, |_, _| Ok(Value::Unit));
        m.export("test_raise", 1, |ctx, _| Err(ctx.failwith("test_raise")));
        m.export("test_int", 2, |ctx, args| {
            Ok(Value::Int(ctx.as_int(args[0])? + ctx.as_int(args[1])?))
        });
        m.export("test_float", 2, |ctx, args| {
            Ok(ctx.make_float(ctx.as_float(args[0])? + ctx.as_float(args[1])?))
        });
        m.export("test_string", 1, |ctx, args| {
            let mut s = ctx.as_bytes(args[0])?;
            s.push(b'!');
            Ok(ctx.make_bytes(&s))
        });
        m.export("test_bool", 1, |ctx, args| Ok(Value::Bool(!ctx.as_bool(args[0])?)));
        m.export("test_int32", 1, |ctx, args| {
            Ok(ctx.make_int32(ctx.as_int32(args[0])?.wrapping_add(1)))
        });
        m.export("test_int64", 1, |ctx, args| {
            Ok(ctx.make_int64(ctx.as_int64(args[0])?.wrapping_add(1)))
        });
        m.export("id", 1, |_, args| Ok(args[0]));
        m.export("answer", 0, |_, _| Ok(Value::Int(42)));
        m.export("sum3", 3, |ctx, args| {
            let mut total = 0;
            for arg in args {
                total += ctx.as_int(*arg)?;
            }
            Ok(Value::Int(total))
        });
        m.export("sum8", 8, |ctx, args| {
            let mut total = 0;
            for arg in args {
                total += ctx.as_int(*arg)?;
            }
            Ok(Value::Int(total))
        });

        let add = m.function("add", 2, |ctx, args| {
            Ok(Value::Int(ctx.as_int(args[0])? + ctx.as_int(args[1])?))
        });
        m.export("make_adder", 1, move |ctx, args| ctx.apply(Value::Fn(add), &args[..1]));
        m.export("apply_fn", 2, |ctx, args| ctx.apply(args[0], &args[1..]));

        m.export("get_value", 1, |ctx, _| {
            let b = ctx.make_bytes(b"abc");
            Ok(ctx.make_tuple(vec![Value::Int(42), b]))
        });
        m.export("test_a", 1, |ctx, args| ctx.field(args[0], 0));
        m.export("test_b", 1, |ctx, args| ctx.field(args[0], 1));

        let obj = m
            .class("test_obj")
            .method("test", 2, |ctx, args| Ok(Value::Int(ctx.as_int(args[1])? * 2)))
            .method("test_int", 3, |ctx, args| {
                Ok(Value::Int(ctx.as_int(args[1])? + ctx.as_int(args[2])?))
            })
            .method("get", 1, |ctx, args| ctx.field(args[0], 0))
            .build();
        m.export("get_obj", 1, move |ctx, _| {
            Ok(ctx.make_object(obj, vec![Value::Int(7)]))
        });

        m.export("alloc_garbage", 1, |ctx, args| {
            let n = ctx.as_int(args[0])?;
            for i in 0..n {
                ctx.make_bytes(format!("garbage {i}").as_bytes());
            }
            Ok(Value::Unit)
        });

        // inbound
        m.export("test_throw", 1, |ctx, args| Err(ctx.throw(args[0])));
        m.export("test_throw_new", 1, |ctx, args| {
            let message = ctx.as_bytes(args[0])?;
            Err(ctx.throw_new("Exception", &String::from_utf8_lossy(&message)))
        });
        m.export("test_rec_a", 1, |ctx, args| {
            let s = ctx.as_bytes(args[0])?;
            if s.len() > 10 {
                return Ok(args[0]);
            }
            let mut next = s;
            next.push(b'a');
            let rec_b = ctx.find_host_method("Test", "test_rec_b")?;
            let arg = ctx.make_bytes(&next);
            ctx.call_host_static(rec_b, &[arg])
        });
        m.export("call_host_add", 2, |ctx, args| {
            let add = ctx.find_host_method("Test", "add")?;
            ctx.call_host_static(add, args)
        });
        m.export("call_host_raise", 1, |ctx, _| {
            let raise = ctx.find_host_method("Test", "raise")?;
            ctx.call_host_static(raise, &[])
        });
        m.export("catch_host", 1, |ctx, _| {
            let raise = ctx.find_host_method("Test", "raise")?;
            match ctx.call_host_static(raise, &[]) {
                Ok(_) => Ok(ctx.make_bytes(b"no exception")),
                Err(raised) => match ctx.host_error(&raised) {
                    Some(err) => Ok(ctx.make_bytes(err.message().as_bytes())),
                    None => Err(raised),
                },
            }
        });
        m.export("shift_point", 2, |ctx, args| {
            let shift = ctx.find_host_method("Point", "shift")?;
            ctx.call_host(shift, args[0], &args[1..])
        });
        m.export("call_static", 3, |ctx, args| {
            let class = ctx.as_bytes(args[0])?;
            let name = ctx.as_bytes(args[1])?;
            let method = ctx.find_host_method(
                &String::from_utf8_lossy(&class),
                &String::from_utf8_lossy(&name),
            )?;
            ctx.call_host_static(method, &args[2..])
        });
        m.export("missing_host_method", 1, |ctx, _| {
            ctx.find_host_method("Test", "nope")?;
            Ok(Value::Unit)
        });
        m.export("nested_raise", 1, |ctx, args| {
            let inner = ctx.named("test_raise").unwrap_or(Value::Unit);
            ctx.apply(inner, args)
        });
    })
}

fn rec_b(call: &HostCall<'_>) -> Result<HostValue, HostError> {
    let mut s = call.arg(0)?.as_bytes()?.to_vec();
    s.push(b'b');
    match call_rec_a(call.bridge(), s) {
        Ok(result) => Ok(HostValue::Bytes(result)),
        // Hand the original host error back up unchanged.
        Err(BridgeError::Host(record)) => {
            let record = *record;
            Err(record
                .cause
                .unwrap_or_else(|| HostError::new("BridgeException", record.message)))
        }
        Err(err) => Err(HostError::new("BridgeException", err.to_string())),
    }
}

fn call_rec_a(bridge: &Bridge, s: Vec<u8>) -> Result<Vec<u8>, BridgeError> {
    let rec_a = bridge.resolve_callback("test_rec_a")?;
    let mut call = bridge.begin_call(&rec_a)?;
    call.push(s)?;
    call.perform()
}

pub fn register_host(bridge: &Bridge) {
    bridge.host().register(
        HostClass::new("Test")
            .static_method("test_rec_b", rec_b)
            .static_method("add", |call| {
                Ok(HostValue::Int(call.arg(0)?.as_int()? + call.arg(1)?.as_int()?))
            })
            .static_method("raise", |_| Err(HostError::new("Exception", "test")))
            .static_method("wrap_string", |call| {
                let mut s = b"[".to_vec();
                s.extend_from_slice(call.arg(0)?.as_bytes()?);
                s.push(b']');
                Ok(HostValue::Bytes(s))
            }),
    );
    bridge.host().register(HostClass::new("Point").method("shift", |call| {
        let point = call.this::<Point>()?;
        Ok(HostValue::Int(point.x + call.arg(0)?.as_int()?))
    }));
}

pub fn bridge() -> Bridge {
    bridge_with(BridgeConfig::default())
}

pub fn bridge_with(config: BridgeConfig) -> Bridge {
    let bridge = Bridge::launch(config, program()).expect("bridge startup");
    register_host(&bridge);
    bridge
}

/// Calls the callback `name` with `args` and converts the result to `T`.
#[track_caller]
pub fn call<'a, T: FromEmbedded>(
    bridge: &'a Bridge,
    name: &str,
    args: impl IntoIterator<Item = Arg<'a>>,
) -> Result<T, BridgeError> {
    let callback = bridge.resolve_callback(name)?;
    let mut call = bridge.begin_call(Target::Callback(&callback))?;
    for arg in args {
        call.push(arg)?;
    }
    call.perform()
}

pub fn point(x: i64) -> HostRef {
    HostRef::new(Point { x })
}
