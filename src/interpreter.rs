//! Tree-walking evaluator.
//!
//! The interpreter owns the persistent `globals` environment, a "current"
//! environment pointer swapped around block and call execution, and the
//! resolver-populated scope-depth map.  Statement execution and expression
//! evaluation thread a single [`Unwind`] channel that keeps genuine runtime
//! failures and `return` control transfer statically distinguishable: a
//! `Return` is caught only at function-call boundaries and never reaches the
//! diagnostic sink.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};
use thiserror::Error;

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::native::{self, OutputSink, StdoutSink};
use crate::token::{Token, TokenType};
use crate::value::{LoxClass, LoxFunction, Value};

/// A runtime failure: type mismatch, division by zero, undefined variable,
/// bad call, or arity mismatch.  Carries the source line of the operator or
/// name token that triggered it.
#[derive(Debug, Error)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        let message: String = message.into();

        debug!("Runtime error on line {}: {}", line, message);

        RuntimeError { message, line }
    }
}

/// Non-local control transfer during execution.  `Error` aborts the program
/// unit; `Return` unwinds only to the nearest enclosing function call, which
/// converts it into the call's result.
#[derive(Debug, Error)]
pub enum Unwind {
    #[error(transparent)]
    Error(#[from] RuntimeError),

    #[error("return signal carrying: {0}")]
    Return(Value),
}

/// Result alias for execution/evaluation steps.
pub type ExecResult<T> = Result<T, Unwind>;

pub struct Interpreter {
    /// Root environment holding native functions and top-level `var`s.
    globals: Rc<RefCell<Environment>>,

    /// Environment of the scope currently executing.  Swapped (and always
    /// restored, error paths included) around blocks and calls.
    environment: Rc<RefCell<Environment>>,

    /// Resolver-computed scope depths, keyed by node identity.
    /// Absence of an entry means "resolve in globals".
    locals: HashMap<ExprId, usize>,

    /// Where `print` output goes.
    output: Box<dyn OutputSink>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter printing to stdout, with the native function
    /// table already registered into `globals`.
    pub fn new() -> Self {
        Self::with_output(Box::new(StdoutSink))
    }

    /// Create an interpreter writing program output to `output`.
    pub fn with_output(output: Box<dyn OutputSink>) -> Self {
        info!("Initializing Interpreter");

        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        native::register(&globals);

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Record that the node `id` resolves `depth` scopes up from its own.
    /// Called by the resolver; nodes it never calls this for are globals.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        debug!("Noting local {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Interprets a list of statements (a "program").
    ///
    /// A `Return` escaping to this level would mean a `return` outside any
    /// function slipped past the resolver; it is converted into an
    /// internal-invariant runtime error rather than a panic.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                Err(Unwind::Error(e)) => return Err(e),

                Err(Unwind::Return(_)) => {
                    return Err(RuntimeError::new(
                        0,
                        "Internal error: 'return' escaped to top level.",
                    ));
                }
            }
        }

        info!("Interpretation completed successfully");

        Ok(())
    }

    // ───────────────────────── statements ─────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> ExecResult<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                self.output.write_line(&value.to_string());

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let child: Rc<RefCell<Environment>> = Rc::new(RefCell::new(
                    Environment::with_enclosing(Rc::clone(&self.environment)),
                ));

                self.execute_block(statements, child)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                // No iteration cap: an infinite loop is the program's own
                // business, not a runtime error.
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                // Capture the environment active *now* — this is what lets
                // the function see its lexical birthplace later.
                let function = Value::Function(Rc::new(LoxFunction {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                }));

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, function);

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Return signal carrying {}", value);

                Err(Unwind::Return(value))
            }

            Stmt::Class { name, methods } => {
                // Declare first (as nil) so method bodies may refer to the
                // class by name, then rebind to the finished class value.
                self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

                let class = Value::Class(Rc::new(LoxClass {
                    name: name.lexeme.clone(),
                    methods: methods.clone(),
                }));

                self.environment
                    .borrow_mut()
                    .assign(&name.lexeme, class)
                    .map_err(|msg| RuntimeError::new(name.line, msg))?;

                Ok(())
            }
        }
    }

    /// Execute `statements` inside `environment`, restoring the previous
    /// environment on **every** exit path — normal completion, runtime
    /// error, and `Return` unwinding alike.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> ExecResult<()> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, environment);

        let mut result: ExecResult<()> = Ok(());

        for stmt in statements {
            result = self.execute(stmt);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    // ───────────────────────── expressions ────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> ExecResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(evaluate_literal(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&depth) => {
                        Environment::assign_at(&self.environment, depth, &name.lexeme, value.clone())
                            .map_err(|msg| RuntimeError::new(name.line, msg))?;
                    }

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(&name.lexeme, value.clone())
                            .map_err(|msg| RuntimeError::new(name.line, msg))?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());

                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                self.invoke_callable(&callee, paren, &args)
            }
        }
    }

    /// Variable read: through the depth map when the resolver recorded one,
    /// otherwise a global lookup.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> ExecResult<Value> {
        let result: Result<Value, String> = match self.locals.get(&id) {
            Some(&depth) => Environment::get_at(&self.environment, depth, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        result
            .map_err(|msg| RuntimeError::new(name.line, msg).into())
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> ExecResult<Value> {
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(operator.line, "Operand must be a number.").into()),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),

            _ => Err(RuntimeError::new(operator.line, "Invalid unary operator.").into()),
        }
    }

    /// Short-circuiting `and` / `or`.  The result is the truthiness-coerced
    /// boolean of whichever operand decided the outcome, and the right side
    /// is only evaluated when the left does not already decide it.
    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> ExecResult<Value> {
        let left: Value = self.evaluate(left)?;

        let decided: bool = match operator.token_type {
            TokenType::OR => is_truthy(&left),
            _ => !is_truthy(&left), // AND
        };

        if decided {
            return Ok(Value::Bool(is_truthy(&left)));
        }

        let right: Value = self.evaluate(right)?;

        Ok(Value::Bool(is_truthy(&right)))
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> ExecResult<Value> {
        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        let type_error = |message: &str| -> Unwind {
            RuntimeError::new(operator.line, message).into()
        };

        match operator.token_type {
            // `+` is overloaded: numeric addition, string concatenation, and
            // mixed concatenation through the display form when exactly one
            // side is a string.
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), b) => Ok(Value::String(format!("{}{}", a, b))),

                (a, Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),

                _ => Err(type_error(
                    "Operands must be two numbers or involve a string.",
                )),
            },

            TokenType::MINUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(type_error("Operands must be numbers for '-'.")),
            },

            TokenType::STAR => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(type_error("Operands must be numbers for '*'.")),
            },

            TokenType::SLASH => match (left, right) {
                (Value::Number(_), Value::Number(b)) if b == 0.0 => {
                    Err(type_error("Division by zero."))
                }

                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(type_error("Operands must be numbers for '/'.")),
            },

            // Equality works across all value kinds; only `==`/`!=` are
            // exempt from the numeric-operand rule.
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            TokenType::GREATER => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(type_error("Operands must be numbers for '>'.")),
            },

            TokenType::GREATER_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(type_error("Operands must be numbers for '>='.")),
            },

            TokenType::LESS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(type_error("Operands must be numbers for '<'.")),
            },

            TokenType::LESS_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(type_error("Operands must be numbers for '<='.")),
            },

            _ => Err(type_error("Invalid binary operator.")),
        }
    }

    // ─────────────────────────── calls ────────────────────────────

    /// Invokes a callable (native or user-defined function).
    fn invoke_callable(
        &mut self,
        callee: &Value,
        paren: &Token,
        args: &[Value],
    ) -> ExecResult<Value> {
        match callee {
            Value::NativeFunction(native) => {
                debug!("Calling native function '{}'", native.name);

                self.check_arity(native.arity, args.len(), paren)?;

                let result: Value = (native.func)(self.output.as_mut(), args)
                    .map_err(|msg| RuntimeError::new(paren.line, msg))?;

                Ok(result)
            }

            Value::Function(function) => {
                debug!("Calling user function '{}'", function.name());

                self.check_arity(function.arity(), args.len(), paren)?;

                self.call_function(function, args)
            }

            _ => Err(RuntimeError::new(paren.line, "Can only call functions.").into()),
        }
    }

    fn check_arity(&self, expected: usize, got: usize, paren: &Token) -> ExecResult<()> {
        if expected != got {
            return Err(RuntimeError::new(
                paren.line,
                format!("Expected {} arguments but got {}.", expected, got),
            )
            .into());
        }

        Ok(())
    }

    /// Run a user function: parameters bind in a fresh child of the
    /// *closure* environment (not the caller's — scoping is lexical), the
    /// body executes as a block, and a `Return` unwinding out of it becomes
    /// the call's result.  Falling off the end yields `nil`.
    fn call_function(&mut self, function: &LoxFunction, args: &[Value]) -> ExecResult<Value> {
        let call_env: Rc<RefCell<Environment>> = Rc::new(RefCell::new(
            Environment::with_enclosing(Rc::clone(&function.closure)),
        ));

        for (param, arg) in function.declaration.params.iter().zip(args.iter()) {
            call_env.borrow_mut().define(&param.lexeme, arg.clone());
        }

        match self.execute_block(&function.declaration.body, call_env) {
            Ok(()) => Ok(Value::Nil),

            Err(Unwind::Return(value)) => {
                debug!("Function '{}' returned {}", function.name(), value);

                Ok(value)
            }

            Err(e) => Err(e),
        }
    }
}

// ───────────────────────── value helpers ─────────────────────────

/// Nil and `false` are falsy; every other value, `0` and `""` included,
/// is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        _ => true,
    }
}

fn evaluate_literal(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}
