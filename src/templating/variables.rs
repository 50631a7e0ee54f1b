//! Variable analysis over the parsed Tera AST.
//!
//! Tera fails on an undefined variable everywhere except where a bare
//! identifier is used as a condition (`{% if enabled %}`, operands of
//! `and` / `or`): there an undefined name is quietly false. Two passes work
//! around that:
//!
//! - [`value_references`] lists the variables read in positions where
//!   Tera would fail, so lenient policies can substitute all of them before
//!   the first render.
//! - [`require_defined_conditions`] rewrites bare condition identifiers into
//!   a call of the [`DEFINED_CONDITION_TEST`] tester, which fails on an
//!   undefined value when (and only when) the condition is evaluated.
//!
//! `is defined` tests and expressions starting with the `default` filter are
//! left alone in both passes; they are how templates read optional values.

use std::collections::HashSet;

use tera::ast::{Expr, ExprVal, FunctionCall, LogicOperator, Node, Test};
use tera::{Error, Result, Value};

/// Tester installed by the renderer under the `error` policy.
pub(crate) const DEFINED_CONDITION_TEST: &str = "ktmpl_defined_condition";

/// Truthiness of a defined value; fails for an undefined one.
///
/// The variable name travels as the first argument so the failure can name
/// it the way Tera names undefined variables.
pub(crate) fn defined_condition(value: Option<&Value>, args: &[Value]) -> Result<bool> {
    match value {
        Some(value) => Ok(is_truthy(value)),
        None => {
            let name = args.first().and_then(Value::as_str).unwrap_or("?");
            Err(Error::msg(format!("Variable `{name}` not found in context while rendering")))
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Rewrite every bare identifier evaluated as a condition into a
/// [`DEFINED_CONDITION_TEST`] call.
pub(crate) fn require_defined_conditions(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => rewrite_expr(expr, false),
            Node::Set(_, set) => rewrite_expr(&mut set.value, false),
            Node::FilterSection(_, section, _) => require_defined_conditions(&mut section.body),
            Node::Block(_, block, _) => require_defined_conditions(&mut block.body),
            Node::MacroDefinition(_, definition, _) => {
                require_defined_conditions(&mut definition.body);
            }
            Node::Forloop(_, forloop, _) => {
                rewrite_expr(&mut forloop.container, false);
                require_defined_conditions(&mut forloop.body);
                if let Some(body) = forloop.empty_body.as_mut() {
                    require_defined_conditions(body);
                }
            }
            Node::If(branches, _) => {
                for (_, condition, body) in &mut branches.conditions {
                    rewrite_expr(condition, true);
                    require_defined_conditions(body);
                }
                if let Some((_, body)) = branches.otherwise.as_mut() {
                    require_defined_conditions(body);
                }
            }
            _ => {}
        }
    }
}

fn rewrite_expr(expr: &mut Expr, condition: bool) {
    if condition && expr.filters.is_empty() {
        let ident = match &expr.val {
            ExprVal::Ident(ident) => Some(ident.clone()),
            _ => None,
        };
        if let Some(ident) = ident {
            // `negated` stays on the expression; Tera applies it after the test.
            expr.val = ExprVal::Test(Test {
                args: vec![Expr::new(ExprVal::String(ident.clone()))],
                ident,
                negated: false,
                name: DEFINED_CONDITION_TEST.to_string(),
            });
            return;
        }
    }

    if let ExprVal::Logic(logic) = &mut expr.val {
        let operands = matches!(logic.operator, LogicOperator::And | LogicOperator::Or);
        rewrite_expr(&mut logic.lhs, operands);
        rewrite_expr(&mut logic.rhs, operands);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Usage {
    /// Tera fails when the variable is undefined.
    Value,
    /// Bare condition; undefined reads as false.
    Condition,
}

/// Dotted paths of the context variables read where Tera fails on an
/// undefined value, in first-use order.
///
/// Names bound by `for` loops, `set` and macro arguments are excluded, as
/// are paths that are also used as bare conditions: giving those a
/// placeholder would turn the condition true.
pub(crate) fn value_references(nodes: &[Node]) -> Vec<String> {
    let mut scanner = Scanner::default();
    scanner.nodes(nodes);

    let conditions: HashSet<&str> = scanner
        .found
        .iter()
        .filter(|(_, usage)| *usage == Usage::Condition)
        .map(|(path, _)| path.as_str())
        .collect();
    let mut seen = HashSet::new();
    scanner
        .found
        .iter()
        .filter(|(path, usage)| *usage == Usage::Value && !conditions.contains(path.as_str()))
        .filter(|(path, _)| seen.insert(path.clone()))
        .map(|(path, _)| path.clone())
        .collect()
}

#[derive(Default)]
struct Scanner {
    scopes: Vec<HashSet<String>>,
    globals: HashSet<String>,
    found: Vec<(String, Usage)>,
}

impl Scanner {
    fn nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::VariableBlock(_, expr) => self.expr(expr, false),
            Node::Set(_, set) => {
                self.expr(&set.value, false);
                match self.scopes.last_mut() {
                    Some(scope) if !set.global => scope.insert(set.key.clone()),
                    _ => self.globals.insert(set.key.clone()),
                };
            }
            Node::FilterSection(_, section, _) => {
                self.call(&section.filter);
                self.nodes(&section.body);
            }
            Node::Block(_, block, _) => self.nodes(&block.body),
            Node::Forloop(_, forloop, _) => {
                self.expr(&forloop.container, false);
                let mut scope = HashSet::from(["loop".to_string(), forloop.value.clone()]);
                scope.extend(forloop.key.clone());
                self.scopes.push(scope);
                self.nodes(&forloop.body);
                self.scopes.pop();
                if let Some(body) = &forloop.empty_body {
                    self.nodes(body);
                }
            }
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    self.expr(condition, true);
                    self.nodes(body);
                }
                if let Some((_, body)) = &branches.otherwise {
                    self.nodes(body);
                }
            }
            // Macro bodies only see their arguments.
            _ => {}
        }
    }

    fn expr(&mut self, expr: &Expr, condition: bool) {
        match &expr.val {
            ExprVal::Ident(ident) if !expr.has_default_filter() => {
                let usage = if condition {
                    Usage::Condition
                } else {
                    Usage::Value
                };
                self.reference(ident, usage);
            }
            ExprVal::Ident(_) => {}
            ExprVal::Logic(logic) => {
                let operands = matches!(logic.operator, LogicOperator::And | LogicOperator::Or);
                self.expr(&logic.lhs, operands);
                self.expr(&logic.rhs, operands);
            }
            ExprVal::Math(math) => {
                self.expr(&math.lhs, false);
                self.expr(&math.rhs, false);
            }
            ExprVal::In(in_cond) => {
                self.expr(&in_cond.lhs, false);
                self.expr(&in_cond.rhs, false);
            }
            ExprVal::Test(test) => {
                for arg in &test.args {
                    self.expr(arg, false);
                }
            }
            ExprVal::FunctionCall(call) => self.call(call),
            ExprVal::MacroCall(call) => {
                for arg in call.args.values() {
                    self.expr(arg, false);
                }
            }
            ExprVal::Array(items) => {
                for item in items {
                    self.expr(item, false);
                }
            }
            ExprVal::StringConcat(concat) => {
                for value in &concat.values {
                    match value {
                        ExprVal::Ident(ident) => self.reference(ident, Usage::Value),
                        ExprVal::FunctionCall(call) => self.call(call),
                        _ => {}
                    }
                }
            }
            ExprVal::String(_) | ExprVal::Int(_) | ExprVal::Float(_) | ExprVal::Bool(_) => {}
        }
        for filter in &expr.filters {
            self.call(filter);
        }
    }

    fn call(&mut self, call: &FunctionCall) {
        for arg in call.args.values() {
            self.expr(arg, false);
        }
    }

    fn reference(&mut self, ident: &str, usage: Usage) {
        // Subscripts (`a[b]`) are dynamic; only the dotted head is tracked.
        let path = ident.split_once('[').map_or(ident, |(head, _)| head).trim_end_matches('.');
        let root = path.split('.').next().unwrap_or_default();
        if root.is_empty() || root.starts_with("__tera") || self.is_bound(root) {
            return;
        }
        self.found.push((path.to_string(), usage));
    }

    fn is_bound(&self, name: &str) -> bool {
        self.globals.contains(name) || self.scopes.iter().any(|scope| scope.contains(name))
    }
}
