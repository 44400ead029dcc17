use std::{borrow::Cow, fmt, panic::Location};

use serde::{Serialize, Serializer};

use crate::{
    bridge::error::BridgeError,
    embedded::{Raise, Runtime},
    host::HostError,
};

const EMBEDDED: &str = "<embedded>";
const HOST: &str = "<host>";

/// One frame of a stitched backtrace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Declaring side or class; `<embedded>` for embedded frames.
    pub origin: Cow<'static, str>,
    pub method: Cow<'static, str>,
    pub file: String,
    /// 1-based.
    pub line: u32,
}

impl StackFrame {
    pub fn embedded(file: &str, line: u32) -> Self {
        Self {
            origin: Cow::Borrowed(EMBEDDED),
            method: Cow::Borrowed(EMBEDDED),
            file: file.to_string(),
            line,
        }
    }

    pub fn host(method: &'static str, location: &'static Location<'static>) -> Self {
        Self {
            origin: Cow::Borrowed(HOST),
            method: Cow::Borrowed(method),
            file: location.file().to_string(),
            line: location.line(),
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.origin == EMBEDDED
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}.{}({}:{})", self.origin, self.method, self.file, self.line)
    }
}

/// Host-side view of an exception that crossed the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    pub message: String,
    #[serde(serialize_with = "serialize_cause")]
    pub cause: Option<HostError>,
    /// Innermost first.
    pub frames: Vec<StackFrame>,
}

fn serialize_cause<S: Serializer>(cause: &Option<HostError>, serializer: S) -> Result<S::Ok, S::Error> {
    match cause {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl ExceptionRecord {
    /// Message followed by one indented `at ...` line per frame.
    pub fn render(&self) -> String {
        let mut out = self.message.clone();
        for frame in &self.frames {
            out.push_str("\n    ");
            out.push_str(&frame.to_string());
        }
        out
    }
}

impl fmt::Display for ExceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Turns an exception that escaped the embedded runtime into a host error.
///
/// Frames are the embedded backtrace, then (for a host cause) the host
/// error's own frames, then the `perform` call site.
pub(crate) fn translate(
    runtime: &Runtime,
    raise: &Raise,
    call_site: &'static Location<'static>,
) -> BridgeError {
    let mut frames: Vec<StackFrame> = raise
        .backtrace()
        .iter()
        .map(|loc| StackFrame::embedded(loc.file(), loc.line()))
        .collect();

    match runtime.host_cause(raise) {
        Some(cause) => {
            frames.extend(cause.frames().iter().cloned());
            frames.push(StackFrame::host("perform", call_site));
            BridgeError::Host(Box::new(ExceptionRecord {
                message: cause.to_string(),
                cause: Some(cause),
                frames,
            }))
        }
        None => {
            frames.push(StackFrame::host("perform", call_site));
            BridgeError::Embedded(Box::new(ExceptionRecord {
                message: runtime.format_exception(raise),
                cause: None,
                frames,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExceptionRecord {
        ExceptionRecord {
            message: "Failure(\"boom\")".into(),
            cause: None,
            frames: vec![
                StackFrame::embedded("fixture.rs", 12),
                StackFrame::embedded("fixture.rs", 40),
                StackFrame {
                    origin: "<host>".into(),
                    method: "perform".into(),
                    file: "tests/exception_tests.rs".into(),
                    line: 7,
                },
            ],
        }
    }

    #[test]
    fn frame_display() {
        assert_eq!(
            StackFrame::embedded("lib.rs", 3).to_string(),
            "at <embedded>.<embedded>(lib.rs:3)"
        );
    }

    #[test]
    fn render_trace() {
        insta::assert_snapshot!(record().render(), @r###"
        Failure("boom")
            at <embedded>.<embedded>(fixture.rs:12)
            at <embedded>.<embedded>(fixture.rs:40)
            at <host>.perform(tests/exception_tests.rs:7)
        "###);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["message"], "Failure(\"boom\")");
        assert_eq!(json["cause"], serde_json::Value::Null);
        assert_eq!(json["frames"][0]["origin"], "<embedded>");
        assert_eq!(json["frames"][2]["line"], 7);
    }

    #[test]
    fn host_frames_use_caller_location() {
        let frame = StackFrame::host("perform", Location::caller());
        assert!(!frame.is_embedded());
        assert_eq!(frame.file, file!());
    }
}
