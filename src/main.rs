use std::{env, process::ExitCode};

use embridge::{
    Bridge, BridgeConfig, BridgeError, Handle,
    config::CONFIG_ENV,
    embedded::{Program, Value, hash_variant},
    host::{HostClass, HostValue},
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let mut args: Vec<String> = env::args().collect();
    let verbose = args.iter().any(|arg| arg == "--verbose");
    if verbose {
        args.retain(|arg| arg != "--verbose");
    }
    init_tracing(verbose);

    let gc_threshold = match extract_gc_threshold(&mut args) {
        Some(value) => value,
        None => return ExitCode::FAILURE,
    };

    if args.len() < 2 {
        print_help();
        return ExitCode::SUCCESS;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
            ExitCode::SUCCESS
        }
        "selector" => {
            if args.len() < 3 {
                eprintln!("Usage: embridge selector <name>...");
                return ExitCode::FAILURE;
            }
            for name in &args[2..] {
                println!("{}\t{}", name, hash_variant(name.as_bytes()));
            }
            ExitCode::SUCCESS
        }
        "config" => {
            let config = match load_config(args.get(2).map(String::as_str)) {
                Some(config) => config,
                None => return ExitCode::FAILURE,
            };
            match serde_json::to_string_pretty(&config) {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
        "demo" => {
            let Some(mut config) = load_config(None) else {
                return ExitCode::FAILURE;
            };
            if let Some(threshold) = gc_threshold {
                config.runtime.gc_threshold = threshold;
            }
            match run_demo(config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    if let Some(record) = err.exception() {
                        eprintln!("{}", record.render());
                    }
                    ExitCode::FAILURE
                }
            }
        }
        other => {
            eprintln!("Error: unknown command `{}`", other);
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("embridge - call bridge between host code and an embedded runtime");
    println!();
    println!("Usage:");
    println!("  embridge selector <name>...   print the selector of each name");
    println!("  embridge config [file.json]   print the resolved configuration");
    println!("  embridge demo                 run calls against a built-in program");
    println!();
    println!("Flags:");
    println!("  --verbose                     log bridge activity (or set RUST_LOG)");
    println!("  --gc-threshold <n>            allocations between collections (demo)");
    println!();
    println!("Without a file, `config` and `demo` read ${} if set.", CONFIG_ENV);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "embridge=debug" } else { "embridge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract_gc_threshold(args: &mut Vec<String>) -> Option<Option<usize>> {
    let mut threshold = None;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--gc-threshold" {
            if i + 1 >= args.len() {
                eprintln!("Usage: embridge demo --gc-threshold <n>");
                return None;
            }
            let value = args.remove(i + 1);
            args.remove(i);
            match value.parse::<usize>() {
                Ok(parsed) if parsed > 0 => threshold = Some(parsed),
                _ => {
                    eprintln!("Error: --gc-threshold expects a positive integer.");
                    return None;
                }
            }
            continue;
        }
        i += 1;
    }
    Some(threshold)
}

fn load_config(path: Option<&str>) -> Option<BridgeConfig> {
    let loaded = match path {
        Some(path) => BridgeConfig::from_path(path),
        None => BridgeConfig::from_env(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(err) => {
            eprintln!("Error: {}", err);
            None
        }
    }
}

fn demo_program() -> Program {
    Program::new().module("demo", |m| {
        m.export("add", 2, |ctx, args| {
            Ok(Value::Int(ctx.as_int(args[0])? + ctx.as_int(args[1])?))
        });
        m.export("greet", 1, |ctx, args| {
            let mut out = b"hello, ".to_vec();
            out.extend(ctx.as_bytes(args[0])?);
            Ok(ctx.make_bytes(&out))
        });
        m.export("shout", 1, |ctx, args| {
            let method = ctx.find_host_method("Demo", "upper")?;
            ctx.call_host_static(method, args)
        });
        m.export("fail", 1, |ctx, _| Err(ctx.failwith("demo failure")));
    })
}

fn run_demo(config: BridgeConfig) -> Result<(), BridgeError> {
    let bridge = Bridge::launch(config, demo_program())?;
    bridge.host().register(HostClass::new("Demo").static_method("upper", |call| {
        let text = call.arg(0)?.as_bytes()?.to_ascii_uppercase();
        Ok(HostValue::Bytes(text))
    }));

    let add = bridge.resolve_callback("add")?;
    let mut call = bridge.begin_call(&add)?;
    call.push(20i64)?.push(22i64)?;
    println!("add 20 22 = {}", call.perform::<i64>()?);

    let mut call = bridge.begin_call(&add)?;
    call.push(1i64)?;
    let inc: Handle = call.perform()?;
    let mut call = bridge.begin_call(&inc)?;
    call.push(41i64)?;
    println!("(add 1) 41 = {}", call.perform::<i64>()?);

    let greet = bridge.resolve_callback("greet")?;
    let mut call = bridge.begin_call(&greet)?;
    call.push("world")?;
    let greeting: Vec<u8> = call.perform()?;
    println!("greet = {}", String::from_utf8_lossy(&greeting));

    let shout = bridge.resolve_callback("shout")?;
    let mut call = bridge.begin_call(&shout)?;
    call.push("quiet")?;
    let loud: Vec<u8> = call.perform()?;
    println!("shout = {}", String::from_utf8_lossy(&loud));

    let fail = bridge.resolve_callback("fail")?;
    let mut call = bridge.begin_call(&fail)?;
    call.push(())?;
    match call.perform::<()>() {
        Err(err) => {
            println!("fail raised: {}", err);
            if let Some(record) = err.exception() {
                println!("{}", record.render());
            }
        }
        Ok(()) => println!("fail returned normally"),
    }

    drop(inc);
    bridge.collect()?;
    println!(
        "anchored = {}, live objects = {}",
        bridge.anchored(),
        bridge.with_runtime(|rt| rt.live_objects())?
    );
    Ok(())
}
