//! The output-sink collaborator and the native function table.
//!
//! The interpreter core never talks to stdout directly: `print` statements
//! and the `print` native both write through [`OutputSink`], so tests (and
//! embedders) can substitute a capturing sink.
//!
//! Native functions are plain `fn` pointers registered into the globals
//! table before any program runs.  They report failures as message-only
//! `Err(String)`; the interpreter attaches the call site's line.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::environment::Environment;
use crate::value::{NativeFunction, Value};

/// Destination for everything a program prints.
pub trait OutputSink {
    /// Write one already-stringified value followed by a line break.
    fn write_line(&mut self, text: &str);
}

/// Default sink: standard output.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Register the fixed native function set into `globals`:
/// `clock`, `print`, `sleep`, and `readTextFile`.
pub fn register(globals: &Rc<RefCell<Environment>>) {
    info!("Registering native functions");

    let mut globals = globals.borrow_mut();

    globals.define(
        "clock",
        Value::NativeFunction(Rc::new(NativeFunction {
            name: "clock",
            arity: 0,
            func: native_clock,
        })),
    );

    globals.define(
        "print",
        Value::NativeFunction(Rc::new(NativeFunction {
            name: "print",
            arity: 1,
            func: native_print,
        })),
    );

    globals.define(
        "sleep",
        Value::NativeFunction(Rc::new(NativeFunction {
            name: "sleep",
            arity: 1,
            func: native_sleep,
        })),
    );

    globals.define(
        "readTextFile",
        Value::NativeFunction(Rc::new(NativeFunction {
            name: "readTextFile",
            arity: 1,
            func: native_read_text_file,
        })),
    );
}

/// `clock()` → current time in fractional seconds since the Unix epoch.
fn native_clock(_out: &mut dyn OutputSink, _args: &[Value]) -> Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    debug!("Native 'clock' returned {}", timestamp);

    Ok(Value::Number(timestamp))
}

/// `print(value)` → writes the value's text form to the output sink.
fn native_print(out: &mut dyn OutputSink, args: &[Value]) -> Result<Value, String> {
    out.write_line(&args[0].to_string());

    Ok(Value::Nil)
}

/// `sleep(seconds)` → blocks the interpreter for `ceil(seconds)` seconds.
/// Not cancellable; the whole (single-threaded) interpreter stalls.
fn native_sleep(_out: &mut dyn OutputSink, args: &[Value]) -> Result<Value, String> {
    let Value::Number(seconds) = args[0] else {
        return Err("sleep() can only accept number values".to_string());
    };

    let whole: u64 = seconds.ceil().max(0.0) as u64;

    debug!("Native 'sleep' blocking for {}s", whole);

    thread::sleep(Duration::from_secs(whole));

    Ok(Value::Nil)
}

/// `readTextFile(path)` → file contents as a string, or `false` on any I/O
/// failure.  The path argument is stringified, whatever its kind.
fn native_read_text_file(_out: &mut dyn OutputSink, args: &[Value]) -> Result<Value, String> {
    let path: String = args[0].to_string();

    match fs::read_to_string(&path) {
        Ok(contents) => Ok(Value::String(contents)),

        Err(e) => {
            debug!("Native 'readTextFile' failed for {}: {}", path, e);

            Ok(Value::Bool(false))
        }
    }
}
