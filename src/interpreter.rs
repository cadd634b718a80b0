//! Tree-walking evaluator for Rinha programs.
//!
//! `run` is the crate's single entry point: it lexes, parses, and evaluates
//! a source string against an injected output sink, and never panics on a
//! malformed or ill-typed program — every failure mode becomes a fatal
//! `RinhaError` that is rendered into a diagnostic and returned in the
//! `RunOutcome`, never written directly by this module.
//!
//! On a fatal error the interpreter does not unwind its frame stack; a
//! fatal error always ends the run, so there is nothing to clean up for.

use crate::ast::{BinaryOperator, Expression, FunctionId, Statement, Value};
use crate::config::{FUNCTION_ARGS_SIZE, STRING_VALUE_SIZE};
use crate::error::{RinhaError, Result, SourceLocation};
use crate::frame::{Frame, FrameStack};
use crate::function::{self, FunctionRecord, FunctionTable};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::symbol::SymbolTable;
use std::collections::HashSet;
use std::io::Write;

/// Outcome of one `run` call: the value of the last top-level statement, a
/// success flag, and — on failure — the fully formatted fatal diagnostic.
pub struct RunOutcome {
    pub value: Value,
    pub ok: bool,
    pub diagnostic: Option<String>,
}

/// Runs `source` (named `name`, for diagnostics) to completion, writing any
/// `print` output to `out`.
pub fn run(name: &str, source: &str, out: &mut impl Write) -> RunOutcome {
    match execute(source, out) {
        Ok(value) => RunOutcome { value, ok: true, diagnostic: None },
        Err((err, depth)) => {
            RunOutcome { value: Value::Undefined, ok: false, diagnostic: Some(format_diagnostic(name, source, &err, depth)) }
        }
    }
}

fn execute(source: &str, out: &mut impl Write) -> std::result::Result<Value, (RinhaError, usize)> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| (e, 0))?;
    let (program, symbols) = Parser::new(tokens).parse().map_err(|e| (e, 0))?;

    let mut interpreter = Interpreter::new(symbols);
    let mut last = Value::Undefined;
    for statement in &program.statements {
        match interpreter.execute_statement(statement, out) {
            Ok(value) => last = value,
            Err(err) => return Err((err, interpreter.frames.depth())),
        }
    }
    Ok(last)
}

fn format_diagnostic(name: &str, source: &str, err: &RinhaError, depth: usize) -> String {
    match err.location() {
        Some(location) => {
            let line_text = source.lines().nth(location.line.saturating_sub(1)).unwrap_or("");
            let padding = " ".repeat(location.column.saturating_sub(1));
            format!(
                "{name}:{line}:{column}: {err}\nstack depth: {depth}\n    {line_text}\n    {padding}^",
                name = name,
                line = location.line,
                column = location.column,
                err = err,
                depth = depth,
                line_text = line_text,
                padding = padding,
            )
        }
        None => format!("{}: {}", name, err),
    }
}

/// Owns every piece of mutable state for one run: the frame stack, the
/// function table, the symbol table (kept around for diagnostic lookups),
/// and the global memoization kill-switch.
struct Interpreter {
    frames: FrameStack,
    functions: FunctionTable,
    symbols: SymbolTable,
    cache_enabled: bool,
}

impl Interpreter {
    fn new(symbols: SymbolTable) -> Self {
        Self { frames: FrameStack::new(), functions: FunctionTable::new(), symbols, cache_enabled: true }
    }

    fn execute_statement(&mut self, statement: &Statement, out: &mut impl Write) -> Result<Value> {
        match statement {
            Statement::Let { name, value } => {
                let value = self.evaluate(value, out)?;
                self.frames.current_mut().set(*name, value);
                Ok(Value::Undefined)
            }
            Statement::Expression(expr) => self.evaluate(expr, out),
        }
    }

    fn evaluate(&mut self, expr: &Expression, out: &mut impl Write) -> Result<Value> {
        match expr {
            Expression::Integer(n) => Ok(Value::Integer(*n)),
            Expression::String(s) => Ok(Value::String(s.clone())),
            Expression::Boolean(b) => Ok(Value::Boolean(*b)),
            Expression::Identifier(name, location) => self.frames.resolve(*name).cloned().ok_or_else(|| {
                RinhaError::UndefinedSymbol { name: self.symbols.name_of(*name).to_string(), location: *location }
            }),
            Expression::Assignment { name, value } => {
                let value = self.evaluate(value, out)?;
                self.frames.assign(*name, value.clone());
                Ok(value)
            }
            Expression::Binary { left, operator, right, location } => {
                let left = self.evaluate(left, out)?;
                let right = self.evaluate(right, out)?;
                apply_binary(*operator, left, right, *location)
            }
            Expression::Tuple(a, b) => {
                let a = self.evaluate(a, out)?;
                let b = self.evaluate(b, out)?;
                Ok(Value::Tuple(Box::new(a), Box::new(b)))
            }
            Expression::Call { callee, args, location } => self.call(callee, args, *location, out),
            Expression::FunctionLiteral { params, body } => {
                if params.len() > FUNCTION_ARGS_SIZE {
                    return Err(RinhaError::ResourceLimit {
                        message: format!("function declares {} parameters, limit is {}", params.len(), FUNCTION_ARGS_SIZE),
                    });
                }
                let captured = self.frames.current().iter().map(|(k, v)| (k, v.clone())).collect();
                let record = FunctionRecord::new(params.clone(), (**body).clone(), captured);
                Ok(Value::Function(self.functions.allocate(record)))
            }
            Expression::Print(inner) => {
                let value = self.evaluate(inner, out)?;
                writeln!(out, "{}", value.render())?;
                self.cache_enabled = false;
                Ok(value)
            }
            Expression::First(inner, location) => match self.evaluate(inner, out)? {
                Value::Tuple(first, _) => Ok(*first),
                other => Err(RinhaError::TypeError {
                    message: format!("first expects a tuple, found {}", other.type_name()),
                    location: *location,
                }),
            },
            Expression::Second(inner, location) => match self.evaluate(inner, out)? {
                Value::Tuple(_, second) => Ok(*second),
                other => Err(RinhaError::TypeError {
                    message: format!("second expects a tuple, found {}", other.type_name()),
                    location: *location,
                }),
            },
            Expression::If { condition, then_branch, else_branch, location } => {
                match self.evaluate(condition, out)? {
                    Value::Boolean(true) => self.evaluate(then_branch, out),
                    Value::Boolean(false) => match else_branch {
                        Some(branch) => self.evaluate(branch, out),
                        None => Ok(Value::Undefined),
                    },
                    other => Err(RinhaError::TypeError {
                        message: format!("if condition must be boolean, found {}", other.type_name()),
                        location: *location,
                    }),
                }
            }
            Expression::Block(statements) => {
                let mut last = Value::Undefined;
                for statement in statements {
                    last = self.execute_statement(statement, out)?;
                }
                Ok(last)
            }
        }
    }

    fn call(&mut self, callee: &Expression, args: &[Expression], location: SourceLocation, out: &mut impl Write) -> Result<Value> {
        let callee_value = self.evaluate(callee, out)?;
        let function_id = match callee_value {
            Value::Function(id) => id,
            other => {
                return Err(RinhaError::TypeError { message: format!("attempt to call a {} value", other.type_name()), location })
            }
        };

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.evaluate(arg, out)?);
        }

        self.ensure_function_checked(function_id);

        let record = self.functions.get(function_id);
        if self.cache_enabled && record.cache_enabled() {
            if let Some(cached) = record.cache_get(&arg_values) {
                return Ok(cached);
            }
        }
        if arg_values.len() != record.params.len() {
            return Err(RinhaError::TypeError {
                message: format!("expected {} argument(s), found {}", record.params.len(), arg_values.len()),
                location,
            });
        }

        let mut frame = Frame::new();
        for (&name, value) in record.captured.iter() {
            frame.set(name, value.clone());
        }
        for (&param, value) in record.params.iter().zip(arg_values.iter()) {
            frame.set(param, value.clone());
        }
        let body = record.body.clone();

        self.frames.push(frame, location)?;
        let result = self.evaluate(&body, out)?;
        self.frames.pop();

        if self.cache_enabled {
            let record = self.functions.get_mut(function_id);
            if record.cache_enabled() {
                record.cache_set(&arg_values, result.clone());
            }
        }

        Ok(result)
    }

    /// Runs the one-time impurity scan for `function_id`, resolving any
    /// directly-named callee in its body against the function's captured
    /// environment or the global frame (the only places a scan performed
    /// before the body ever runs can look).
    fn ensure_function_checked(&mut self, function_id: FunctionId) {
        if self.functions.get(function_id).cache_checked() {
            return;
        }
        let params: HashSet<_> = self.functions.get(function_id).params.iter().copied().collect();
        let body = self.functions.get(function_id).body.clone();
        let captured = self.functions.get(function_id).captured.clone();

        let functions = &self.functions;
        let global = self.frames.global();
        let impure = function::expression_is_impure(&body, &params, &|name| {
            let value = captured.get(&name).cloned().or_else(|| global.get(name).cloned());
            matches!(value, Some(Value::Function(id)) if !functions.get(id).cache_enabled())
        });

        self.functions.get_mut(function_id).mark_checked(impure);
    }
}

fn apply_binary(operator: BinaryOperator, left: Value, right: Value, location: SourceLocation) -> Result<Value> {
    use BinaryOperator::*;
    match operator {
        Add => match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_add(*b))),
            _ => {
                let mut rendered = left.render();
                rendered.push_str(&right.render());
                Ok(Value::String(truncate_string(rendered)))
            }
        },
        Subtract => integer_operands(&left, &right, operator, location).map(|(a, b)| Value::Integer(a.wrapping_sub(b))),
        Multiply => integer_operands(&left, &right, operator, location).map(|(a, b)| Value::Integer(a.wrapping_mul(b))),
        Divide => {
            let (a, b) = integer_operands(&left, &right, operator, location)?;
            if b == 0 {
                return Err(RinhaError::DivisionByZero { location });
            }
            Ok(Value::Integer(a.wrapping_div(b)))
        }
        Modulo => {
            let (a, b) = integer_operands(&left, &right, operator, location)?;
            if b == 0 {
                return Err(RinhaError::DivisionByZero { location });
            }
            Ok(Value::Integer(a % b))
        }
        Equal | NotEqual => {
            let equal = values_equal(&left, &right, location)?;
            Ok(Value::Boolean(if operator == Equal { equal } else { !equal }))
        }
        Less | LessEqual | Greater | GreaterEqual => {
            let (a, b) = integer_operands(&left, &right, operator, location)?;
            let result = match operator {
                Less => a < b,
                LessEqual => a <= b,
                Greater => a > b,
                GreaterEqual => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Boolean(result))
        }
        And | Or => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => {
                Ok(Value::Boolean(if operator == And { *a && *b } else { *a || *b }))
            }
            _ => Err(RinhaError::TypeError {
                message: format!("{} requires boolean operands", if operator == And { "&&" } else { "||" }),
                location,
            }),
        },
    }
}

/// Value equality as used by `==`/`!=`. Recurses componentwise into tuples
/// so that a type mismatch nested inside either side is caught at the
/// nesting level where it occurs, rather than only at the top level.
fn values_equal(left: &Value, right: &Value, location: SourceLocation) -> Result<bool> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::Function(a), Value::Function(b)) => Ok(a == b),
        (Value::Undefined, Value::Undefined) => Ok(true),
        (Value::Tuple(a1, a2), Value::Tuple(b1, b2)) => {
            Ok(values_equal(a1, b1, location)? && values_equal(a2, b2, location)?)
        }
        _ => Err(RinhaError::TypeError { message: "comparison of different types".to_string(), location }),
    }
}

fn integer_operands(left: &Value, right: &Value, operator: BinaryOperator, location: SourceLocation) -> Result<(i64, i64)> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok((*a, *b)),
        _ => Err(RinhaError::TypeError {
            message: format!("{:?} requires integer operands, found {} and {}", operator, left.type_name(), right.type_name()),
            location,
        }),
    }
}

fn truncate_string(mut s: String) -> String {
    if s.len() > STRING_VALUE_SIZE {
        let mut end = STRING_VALUE_SIZE;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(source: &str) -> (String, RunOutcome) {
        let mut out = Vec::new();
        let outcome = run("test.rinha", source, &mut out);
        (String::from_utf8(out).unwrap(), outcome)
    }

    #[test]
    fn scenario_hello_world() {
        let (stdout, outcome) = run_source(r#"print("Hello, World!");"#);
        assert!(outcome.ok);
        assert_eq!(stdout, "Hello, World!\n");
    }

    #[test]
    fn scenario_recursive_fibonacci() {
        let (stdout, outcome) =
            run_source("let fib = fn(n) => { if (n < 2) { n } else { fib(n-1) + fib(n-2) } }; print(fib(20));");
        assert!(outcome.ok);
        assert_eq!(stdout, "6765\n");
    }

    #[test]
    fn scenario_nested_calls() {
        let (stdout, outcome) = run_source("let sum = fn(a,b)=>{a+b}; print(sum(3,2)+sum(1,2));");
        assert!(outcome.ok);
        assert_eq!(stdout, "8\n");
    }

    #[test]
    fn scenario_arithmetic_precedence() {
        let (stdout, outcome) = run_source("let a = 9; let b = (a + 2) * 3 / 2; print(b * 6);");
        assert!(outcome.ok);
        assert_eq!(stdout, "96\n");
    }

    #[test]
    fn scenario_tuples_and_projections() {
        let (stdout, outcome) =
            run_source("print(second((first((55,60)), first((second((100,200)), 90)))));");
        assert!(outcome.ok);
        assert_eq!(stdout, "200\n");
    }

    #[test]
    fn scenario_chained_assignment_and_concatenation() {
        let (stdout, outcome) = run_source(r#"let a=5; let b=33; let c = a = b = 567; print("c = [" + c + "]");"#);
        assert!(outcome.ok);
        assert_eq!(stdout, "c = [567]\n");
    }

    #[test]
    fn scenario_closure_capture() {
        let (stdout, outcome) =
            run_source("let z = fn() => { let x = 2; let f = fn(y) => x + y; f }; let f = z(); print(f(1));");
        assert!(outcome.ok);
        assert_eq!(stdout, "3\n");
    }

    #[test]
    fn scenario_string_concat_with_leading_integer() {
        let (stdout, outcome) = run_source(r#"let a = "'/{} string test"; let b = 3 + a; print(b);"#);
        assert!(outcome.ok);
        assert_eq!(stdout, "3'/{} string test\n");
    }

    #[test]
    fn scenario_two_level_function_composition() {
        let (stdout, outcome) = run_source(
            "let sum0 = fn(arg1,arg2) => { arg1+arg2 }; \
             let sum1 = fn(var1,var2) => { sum0(var1,var2) + sum0(var1,var2) }; \
             print(sum1(3,2)+sum1(6,8));",
        );
        assert!(outcome.ok);
        assert_eq!(stdout, "38\n");
    }

    #[test]
    fn scenario_non_short_circuit_or_selects_then_branch_print() {
        let (stdout, outcome) = run_source(
            "if (true || print(\"SKIPPED\") == \"SKIPPED\") { print(\"COND1\") } else { print(\"COND2\") };",
        );
        assert!(outcome.ok);
        assert!(stdout.contains("SKIPPED"));
        assert!(stdout.contains("COND1"));
        assert!(!stdout.contains("COND2"));
    }

    #[test]
    fn determinism_for_pure_programs() {
        let source = "let fib = fn(n) => { if (n < 2) { n } else { fib(n-1) + fib(n-2) } }; print(fib(15));";
        let (first, _) = run_source(source);
        let (second, _) = run_source(source);
        assert_eq!(first, second);
    }

    #[test]
    fn memoization_does_not_change_observable_results() {
        let source = "let fib = fn(n) => { if (n < 2) { n } else { fib(n-1) + fib(n-2) } }; print(fib(25));";
        let (stdout, outcome) = run_source(source);
        assert!(outcome.ok);
        assert_eq!(stdout, "75025\n");
    }

    #[test]
    fn lexical_scope_soundness_rebinding_outer_name_does_not_affect_closure() {
        let (stdout, outcome) = run_source("let x = 1; let f = fn() => x; let x = 2; print(f());");
        assert!(outcome.ok);
        assert_eq!(stdout, "1\n");
    }

    #[test]
    fn first_second_round_trip() {
        let (stdout, outcome) = run_source("print(first((10, 20))); print(second((10, 20)));");
        assert!(outcome.ok);
        assert_eq!(stdout, "10\n20\n");
    }

    #[test]
    fn assignment_returns_assigned_value() {
        let (stdout, outcome) = run_source("let x = 0; print(x = 41 + 1);");
        assert!(outcome.ok);
        assert_eq!(stdout, "42\n");
    }

    #[test]
    fn string_concatenation_truncates_at_the_configured_bound() {
        let source = format!(r#"let a = "{}"; let b = a + a; print(b);"#, "x".repeat(STRING_VALUE_SIZE));
        let (stdout, outcome) = run_source(&source);
        assert!(outcome.ok);
        assert_eq!(stdout.trim_end().len(), STRING_VALUE_SIZE);
    }

    #[test]
    fn undefined_symbol_is_a_fatal_diagnostic_with_location() {
        let (_, outcome) = run_source("print(never_defined);");
        assert!(!outcome.ok);
        let diagnostic = outcome.diagnostic.unwrap();
        assert!(diagnostic.contains("Undefined symbol"));
        assert!(diagnostic.contains("test.rinha:1:7"));
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let (_, outcome) = run_source("print(1 / 0);");
        assert!(!outcome.ok);
        assert!(outcome.diagnostic.unwrap().contains("Division by zero"));
    }

    #[test]
    fn comparing_mismatched_types_is_a_type_error() {
        let (_, outcome) = run_source(r#"print(1 == "1");"#);
        assert!(!outcome.ok);
        assert!(outcome.diagnostic.unwrap().contains("comparison of different types"));
    }

    #[test]
    fn comparing_tuples_with_a_mismatched_component_type_is_a_type_error() {
        let (_, outcome) = run_source(r#"print((1, 2) == ("a", 2));"#);
        assert!(!outcome.ok);
        assert!(outcome.diagnostic.unwrap().contains("comparison of different types"));
    }

    #[test]
    fn comparing_tuples_componentwise_equal_values_is_true() {
        let (stdout, outcome) = run_source(r#"print((1, "a") == (1, "a"));"#);
        assert!(outcome.ok);
        assert_eq!(stdout, "true\n");
    }

    #[test]
    fn calling_a_non_function_value_is_a_type_error() {
        let (_, outcome) = run_source("let x = 1; print(x());");
        assert!(!outcome.ok);
        assert!(outcome.diagnostic.unwrap().contains("attempt to call"));
    }

    #[test]
    fn first_on_a_non_tuple_is_a_type_error() {
        let (_, outcome) = run_source("print(first(1));");
        assert!(!outcome.ok);
        assert!(outcome.diagnostic.unwrap().contains("first expects a tuple"));
    }
}
