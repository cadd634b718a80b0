//! Function records and the per-function memoization cache.
//!
//! Grounded on the reference implementation's `function_t`/`cache_t`
//! (`rinha.h`) and the memo-cache mechanics of `rinha_call_memo_cache_get_`/
//! `rinha_call_memo_cache_set_` in `rinha.c`: a per-function cache keyed by
//! a hash of up to three integer arguments, with exact-match verification,
//! first-writer-wins on collision, and two absorbing kill-switches (global,
//! tripped on the first `print`; per-function, tripped on detecting
//! impurity).

use crate::ast::{Expression, Statement, Value};
use crate::config::{CACHE_KEY_ARGS, CACHE_SIZE};
use crate::symbol::SymbolId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct CacheEntry {
    occupied: bool,
    args: [i64; CACHE_KEY_ARGS],
    value: Option<Value>,
}

/// One allocated function: its signature, body, captured environment, and
/// memoization state. Lives for the whole run once created.
#[derive(Debug)]
pub struct FunctionRecord {
    pub params: Vec<SymbolId>,
    pub body: Expression,
    /// Snapshot of the defining frame's populated slots, taken at
    /// closure-creation time (copy-on-capture, see `ast::Value`).
    pub captured: HashMap<SymbolId, Value>,
    /// Whether this function's body has been scanned for impurity yet.
    cache_checked: bool,
    /// Per-function kill-switch. Absorbing: once cleared, stays cleared.
    cache_enabled: bool,
    cache: Vec<CacheEntry>,
}

impl FunctionRecord {
    pub fn new(params: Vec<SymbolId>, body: Expression, captured: HashMap<SymbolId, Value>) -> Self {
        Self {
            params,
            body,
            captured,
            cache_checked: false,
            cache_enabled: true,
            cache: vec![CacheEntry::default(); CACHE_SIZE],
        }
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    pub fn cache_checked(&self) -> bool {
        self.cache_checked
    }

    /// Latches the result of the one-time impurity scan. Calling this a
    /// second time is a no-op: `cache_checked` is absorbing.
    pub fn mark_checked(&mut self, impure: bool) {
        if self.cache_checked {
            return;
        }
        self.cache_checked = true;
        if impure {
            self.cache_enabled = false;
        }
    }

    fn key_of(args: &[Value]) -> Option<[i64; CACHE_KEY_ARGS]> {
        if args.is_empty() || args.len() > CACHE_KEY_ARGS {
            return None;
        }
        let mut key = [0i64; CACHE_KEY_ARGS];
        for (i, arg) in args.iter().enumerate() {
            match arg {
                Value::Integer(n) => key[i] = *n,
                _ => return None,
            }
        }
        Some(key)
    }

    fn hash_key(key: &[i64; CACHE_KEY_ARGS]) -> usize {
        let mut h: i64 = 0;
        for &component in key {
            h = h.wrapping_mul(31).wrapping_add(component);
        }
        (h.rem_euclid(CACHE_SIZE as i64)) as usize
    }

    pub fn cache_get(&self, args: &[Value]) -> Option<Value> {
        let key = Self::key_of(args)?;
        let bucket = &self.cache[Self::hash_key(&key)];
        if bucket.occupied && bucket.args == key {
            bucket.value.clone()
        } else {
            None
        }
    }

    pub fn cache_set(&mut self, args: &[Value], value: Value) {
        let Some(key) = Self::key_of(args) else { return };
        let index = Self::hash_key(&key);
        let bucket = &mut self.cache[index];
        if bucket.occupied {
            return; // first writer wins
        }
        *bucket = CacheEntry { occupied: true, args: key, value: Some(value) };
    }
}

/// Conservative impurity scan: a function is impure if its body contains a
/// `print`, an assignment to a name that isn't one of its own parameters or
/// a `let` it introduces, or a call to a function already known to be
/// impure.
fn statement_is_impure(
    stmt: &Statement,
    locals: &std::collections::HashSet<SymbolId>,
    is_impure_call: &impl Fn(SymbolId) -> bool,
) -> bool {
    match stmt {
        Statement::Let { value, .. } => expression_is_impure(value, locals, is_impure_call),
        Statement::Expression(expr) => expression_is_impure(expr, locals, is_impure_call),
    }
}

pub(crate) fn expression_is_impure(
    expr: &Expression,
    locals: &std::collections::HashSet<SymbolId>,
    is_impure_call: &impl Fn(SymbolId) -> bool,
) -> bool {
    match expr {
        Expression::Print(_) => true,
        Expression::Integer(_) | Expression::String(_) | Expression::Boolean(_) | Expression::Identifier(..) => false,
        Expression::Assignment { name, value } => {
            !locals.contains(name) || expression_is_impure(value, locals, is_impure_call)
        }
        Expression::Binary { left, right, .. } => {
            expression_is_impure(left, locals, is_impure_call) || expression_is_impure(right, locals, is_impure_call)
        }
        Expression::Tuple(a, b) => {
            expression_is_impure(a, locals, is_impure_call) || expression_is_impure(b, locals, is_impure_call)
        }
        Expression::Call { callee, args, .. } => {
            let callee_impure = matches!(callee.as_ref(), Expression::Identifier(name, _) if is_impure_call(*name));
            callee_impure || args.iter().any(|a| expression_is_impure(a, locals, is_impure_call))
        }
        Expression::FunctionLiteral { .. } => false,
        Expression::First(inner, _) | Expression::Second(inner, _) => expression_is_impure(inner, locals, is_impure_call),
        Expression::If { condition, then_branch, else_branch, .. } => {
            expression_is_impure(condition, locals, is_impure_call)
                || expression_is_impure(then_branch, locals, is_impure_call)
                || else_branch
                    .as_ref()
                    .is_some_and(|e| expression_is_impure(e, locals, is_impure_call))
        }
        Expression::Block(statements) => {
            let mut locals = locals.clone();
            statements.iter().any(|s| {
                if let Statement::Let { name, .. } = s {
                    let impure = statement_is_impure(s, &locals, is_impure_call);
                    locals.insert(*name);
                    impure
                } else {
                    statement_is_impure(s, &locals, is_impure_call)
                }
            })
        }
    }
}

/// Registry of all function records allocated during a run, keyed by the
/// `FunctionId` embedded in `Value::Function`.
#[derive(Debug, Default)]
pub struct FunctionTable {
    records: Vec<FunctionRecord>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, record: FunctionRecord) -> crate::ast::FunctionId {
        let id = crate::ast::FunctionId(self.records.len() as u32);
        self.records.push(record);
        id
    }

    pub fn get(&self, id: crate::ast::FunctionId) -> &FunctionRecord {
        &self.records[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: crate::ast::FunctionId) -> &mut FunctionRecord {
        &mut self.records[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_round_trips_exact_argument_match() {
        let mut record = FunctionRecord::new(vec![SymbolId(0)], Expression::Integer(0), HashMap::new());
        record.cache_set(&[Value::Integer(5)], Value::Integer(120));
        assert_eq!(record.cache_get(&[Value::Integer(5)]), Some(Value::Integer(120)));
        assert_eq!(record.cache_get(&[Value::Integer(6)]), None);
    }

    #[test]
    fn cache_ignores_non_integer_arguments() {
        let mut record = FunctionRecord::new(vec![SymbolId(0)], Expression::Integer(0), HashMap::new());
        record.cache_set(&[Value::String("x".to_string())], Value::Integer(1));
        assert_eq!(record.cache_get(&[Value::String("x".to_string())]), None);
    }

    #[test]
    fn first_writer_wins_on_collision() {
        let mut record = FunctionRecord::new(vec![SymbolId(0)], Expression::Integer(0), HashMap::new());
        // Force a collision by hashing into the same bucket via CACHE_SIZE wrap.
        let a = [1i64, 0, 0];
        let b = [(1 + CACHE_SIZE as i64), 0, 0];
        assert_eq!(FunctionRecord::hash_key(&a), FunctionRecord::hash_key(&b));
        record.cache_set(&[Value::Integer(a[0])], Value::Integer(10));
        record.cache_set(&[Value::Integer(b[0])], Value::Integer(20));
        assert_eq!(record.cache_get(&[Value::Integer(a[0])]), Some(Value::Integer(10)));
    }

    #[test]
    fn impurity_scan_flags_print_in_body() {
        let body = Expression::Block(vec![Statement::Expression(Expression::Print(Box::new(
            Expression::Integer(1),
        )))]);
        let params = std::collections::HashSet::new();
        let impure = expression_is_impure(&body, &params, &|_| false);
        let mut record = FunctionRecord::new(vec![], body, HashMap::new());
        record.mark_checked(impure);
        assert!(!record.cache_enabled());
    }

    #[test]
    fn impurity_scan_allows_pure_body() {
        let body = Expression::Binary {
            left: Box::new(Expression::Identifier(SymbolId(0), Default::default())),
            operator: crate::ast::BinaryOperator::Add,
            right: Box::new(Expression::Integer(1)),
            location: Default::default(),
        };
        let params: std::collections::HashSet<SymbolId> = vec![SymbolId(0)].into_iter().collect();
        let impure = expression_is_impure(&body, &params, &|_| false);
        let mut record = FunctionRecord::new(vec![SymbolId(0)], body, HashMap::new());
        record.mark_checked(impure);
        assert!(record.cache_enabled());
    }
}
