//! Converts AST nodes to the Crafting-Interpreters prefix form,
//! e.g. `1 + 2 * 3` → `(+ 1.0 (* 2.0 3.0))`.
//!
//! Used by the `parse` CLI subcommand and by the parser tests to assert tree
//! shape without depending on node identity.

use crate::ast::{Expr, LiteralValue, Stmt};

pub struct AstPrinter;

impl AstPrinter {
    /// Render a single expression.
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(LiteralValue::Number(n)) => {
                if n.fract() == 0.0 {
                    format!("{:.1}", n)
                } else {
                    n.to_string()
                }
            }

            Expr::Literal(LiteralValue::Str(s)) => s.clone(),

            Expr::Literal(LiteralValue::True) => "true".to_string(),

            Expr::Literal(LiteralValue::False) => "false".to_string(),

            Expr::Literal(LiteralValue::Nil) => "nil".to_string(),

            // ── compound nodes ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", Self::print(callee));

                for arg in arguments {
                    out.push(' ');
                    out.push_str(&Self::print(arg));
                }

                out.push(')');
                out
            }
        }
    }

    /// Render a statement (one line, no trailing newline).
    pub fn print_stmt(stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");

                for s in statements {
                    out.push(' ');
                    out.push_str(&Self::print_stmt(s));
                }

                out.push(')');
                out
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(eb) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(eb)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => {
                format!(
                    "(while {} {})",
                    Self::print(condition),
                    Self::print_stmt(body)
                )
            }

            Stmt::Function(decl) => {
                let mut out = format!("(fun {} (", decl.name.lexeme);

                for (i, param) in decl.params.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&param.lexeme);
                }

                out.push(')');

                for s in &decl.body {
                    out.push(' ');
                    out.push_str(&Self::print_stmt(s));
                }

                out.push(')');
                out
            }

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", Self::print(expr)),
                None => "(return)".to_string(),
            },

            Stmt::Class { name, methods } => {
                let mut out = format!("(class {}", name.lexeme);

                for method in methods {
                    out.push(' ');
                    out.push_str(&method.name.lexeme);
                }

                out.push(')');
                out
            }
        }
    }
}
