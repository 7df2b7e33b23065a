//! Binary and unary operators on builtin values.
//!
//! Direct enum-based dispatch over the value pair. Operators on script
//! instances (`plus`, `minus`, `compareTo`, ...) and `String + instance`
//! need to call script code and are routed by the executing node before
//! it falls back here.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::errors::{
    division_by_zero, integer_overflow, modulo_by_zero, not_implemented, ErrorKind, RuntimeError,
};
use crate::value::{Obj, ObjList, ObjRange};

/// Binary operators that evaluate both operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `a..b`
    Range,
    /// `a..<b`
    RangeExclusive,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Range => "..",
            BinaryOp::RangeExclusive => "..<",
        }
    }

    /// Member a script class defines to overload this operator.
    pub fn method_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "plus",
            BinaryOp::Sub => "minus",
            BinaryOp::Mul => "times",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Eq | BinaryOp::NotEq => "equals",
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => "compareTo",
            BinaryOp::Range | BinaryOp::RangeExclusive => "rangeTo",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq)
    }

    /// Interpret a `compareTo` result for this comparison.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::LtEq => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            BinaryOp::GtEq => ordering != Ordering::Less,
            _ => false,
        }
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

impl UnaryOp {
    pub fn method_name(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "unaryMinus",
            UnaryOp::Plus => "unaryPlus",
        }
    }
}

/// Evaluate a binary operation on builtin values.
pub fn evaluate_binary(left: &Obj, right: &Obj, op: BinaryOp) -> Result<Obj, RuntimeError> {
    match op {
        BinaryOp::Eq => return Ok(Obj::Bool(left.equals(right))),
        BinaryOp::NotEq => return Ok(Obj::Bool(!left.equals(right))),
        _ => {}
    }
    match (left, right) {
        (Obj::Int(a), Obj::Int(b)) => eval_int_binary(*a, *b, op),
        (Obj::Int(_) | Obj::Real(_), Obj::Int(_) | Obj::Real(_)) => {
            match (left.as_real(), right.as_real()) {
                (Some(a), Some(b)) => eval_real_binary(a, b, op, left),
                _ => Err(not_implemented(op.method_name(), left.type_name())),
            }
        }
        (Obj::Str(a), _) => eval_string_binary(a, right, op),
        (Obj::List(a), Obj::List(b)) if op == BinaryOp::Add => {
            let mut items = a.snapshot();
            items.extend(b.snapshot());
            Ok(Obj::list(items))
        }
        _ => Err(not_implemented(op.method_name(), left.type_name())),
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> Result<Obj, RuntimeError> {
    let checked = |result: Option<i64>, name: &str| {
        result.map(Obj::Int).ok_or_else(|| integer_overflow(name))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div if b == 0 => Err(division_by_zero()),
        BinaryOp::Div => checked(a.checked_div(b), "division"),
        BinaryOp::Rem if b == 0 => Err(modulo_by_zero()),
        BinaryOp::Rem => checked(a.checked_rem(b), "remainder"),
        BinaryOp::Range => Ok(Obj::Range(ObjRange {
            start: a,
            end: b,
            inclusive: true,
        })),
        BinaryOp::RangeExclusive => Ok(Obj::Range(ObjRange {
            start: a,
            end: b,
            inclusive: false,
        })),
        _ => Ok(Obj::Bool(op.holds(a.cmp(&b)))),
    }
}

fn eval_real_binary(a: f64, b: f64, op: BinaryOp, left: &Obj) -> Result<Obj, RuntimeError> {
    match op {
        BinaryOp::Add => Ok(Obj::Real(a + b)),
        BinaryOp::Sub => Ok(Obj::Real(a - b)),
        BinaryOp::Mul => Ok(Obj::Real(a * b)),
        BinaryOp::Div => Ok(Obj::Real(a / b)),
        BinaryOp::Rem => Ok(Obj::Real(a % b)),
        BinaryOp::Range | BinaryOp::RangeExclusive => {
            Err(not_implemented(op.method_name(), left.type_name()))
        }
        _ => Ok(Obj::Bool(
            a.partial_cmp(&b).is_some_and(|ordering| op.holds(ordering)),
        )),
    }
}

fn eval_string_binary(a: &Arc<str>, right: &Obj, op: BinaryOp) -> Result<Obj, RuntimeError> {
    match (op, right) {
        (BinaryOp::Add, _) => Ok(Obj::string(format!("{a}{right}"))),
        (_, Obj::Str(b)) if op.is_comparison() => Ok(Obj::Bool(op.holds(a.as_ref().cmp(b.as_ref())))),
        _ => Err(not_implemented(op.method_name(), "String")),
    }
}

/// Evaluate a prefix operator on a builtin value.
pub fn evaluate_unary(operand: &Obj, op: UnaryOp) -> Result<Obj, RuntimeError> {
    match (op, operand) {
        (UnaryOp::Not, Obj::Bool(b)) => Ok(Obj::Bool(!b)),
        (UnaryOp::Neg, Obj::Int(n)) => n
            .checked_neg()
            .map(Obj::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Neg, Obj::Real(r)) => Ok(Obj::Real(-r)),
        (UnaryOp::Plus, Obj::Int(_) | Obj::Real(_)) => Ok(operand.clone()),
        _ => Err(not_implemented(op.method_name(), operand.type_name())),
    }
}

/// `target += value` done in place. Returns `None` when the target has no
/// in-place form and the caller should read, add and write back.
pub fn plus_assign(target: &Obj, value: &Obj) -> Option<Result<(), RuntimeError>> {
    match target {
        Obj::List(list) => Some(append(list, value)),
        _ => None,
    }
}

fn append(list: &ObjList, value: &Obj) -> Result<(), RuntimeError> {
    match value {
        Obj::List(other) => list.extend(other.snapshot()),
        _ => list.push(value.clone()),
    }
}

/// `++`/`--` on a builtin value.
pub fn increment(value: &Obj, delta: i64) -> Result<Obj, RuntimeError> {
    match value {
        Obj::Int(n) => n
            .checked_add(delta)
            .map(Obj::Int)
            .ok_or_else(|| integer_overflow("increment")),
        #[expect(
            clippy::cast_precision_loss,
            reason = "delta is always 1 or -1"
        )]
        Obj::Real(r) => Ok(Obj::Real(r + delta as f64)),
        _ => Err(not_implemented("increment", value.type_name())),
    }
}

/// Three-way comparison of builtin values, used by `compareTo` and sorting.
pub fn compare(left: &Obj, right: &Obj) -> Result<Ordering, RuntimeError> {
    match (left, right) {
        (Obj::Int(a), Obj::Int(b)) => Ok(a.cmp(b)),
        (Obj::Int(_) | Obj::Real(_), Obj::Int(_) | Obj::Real(_)) => left
            .as_real()
            .zip(right.as_real())
            .and_then(|(a, b)| a.partial_cmp(&b))
            .ok_or_else(|| RuntimeError::new(ErrorKind::Arithmetic, "cannot compare NaN")),
        (Obj::Str(a), Obj::Str(b)) => Ok(a.cmp(b)),
        (Obj::Bool(a), Obj::Bool(b)) => Ok(a.cmp(b)),
        _ => Err(not_implemented("compareTo", left.type_name())),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
