pub mod bridge;
pub mod config;
pub mod embedded;
pub mod host;

pub use bridge::{
    Arg, Bridge, BridgeError, Call, Callback, ExceptionRecord, FromEmbedded, Handle, Int32, Int64,
    StackFrame, Target,
};
pub use config::{BridgeConfig, ConfigError, RuntimeConfig};
pub use embedded::Selector;
