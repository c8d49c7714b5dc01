//! Runtime values: the tagged union every expression evaluates to, plus the
//! callable payloads (native and user-defined functions, classes).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::native::OutputSink;

/// Signature shared by all native (host-provided) functions.  The output
/// sink is passed so `print` can write through the interpreter's collaborator
/// rather than straight to stdout; most natives ignore it.
pub type NativeFn = fn(&mut dyn OutputSink, &[Value]) -> Result<Value, String>;

/// A host-provided callable registered into the globals table.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// A user-defined function value: the shared declaration AST plus the
/// environment captured at the definition point.  The captured environment is
/// what realizes lexical closures — the function can read and write its
/// birthplace's variables after that scope's block has exited.
#[derive(Debug)]
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
}

impl LoxFunction {
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

/// A declared class.  Only declaration and name binding are implemented;
/// the methods are carried for completeness but there is no instantiation
/// or dispatch.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub methods: Vec<Rc<FunctionDecl>>,
}

/// The runtime value union.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
}

impl PartialEq for Value {
    /// Value equality: `nil` equals only `nil`, primitives compare by
    /// content, callables and classes compare by identity.  Operands of
    /// different kinds are never equal — there is no cross-kind coercion.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// The single "stringify a value for output" contract: `nil` prints as
    /// the literal text, booleans and strings in their natural form, and
    /// numbers drop a trailing `.0` so `3.0` displays as `3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                // Integral values within i64 range print via itoa with no
                // fractional part; everything else gets full precision.
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();
                    f.write_str(buf.format(*n as i64))
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),

            Value::Function(function) => write!(f, "<fn {}>", function.name()),

            Value::Class(class) => write!(f, "{}", class.name),
        }
    }
}
