use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::{
    FilterError,
    ast::{CompareOp, Expr, Literal},
};
use crate::entity::{EntityProperties, json_kind};

/// Operand value during evaluation. Borrowed from the row where possible.
#[derive(Debug, Clone, PartialEq)]
enum Operand<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
    Other(&'static str),
}

impl Operand<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::Str(_) => "string",
            Self::Other(kind) => kind,
        }
    }
}

fn from_json(value: &Value) -> Operand<'_> {
    match value {
        Value::Null => Operand::Null,
        Value::Bool(b) => Operand::Bool(*b),
        Value::Number(n) => from_number(n),
        Value::String(s) => Operand::Str(s),
        other => Operand::Other(json_kind(other)),
    }
}

fn from_number(n: &Number) -> Operand<'static> {
    match n.as_i64() {
        Some(i) => Operand::Int(i),
        // u64 above i64::MAX and every fractional value land here.
        None => Operand::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn from_literal(literal: &Literal) -> Operand<'_> {
    match literal {
        Literal::String(s) => Operand::Str(s),
        Literal::Integer(i) => Operand::Int(*i),
        Literal::Float(f) => Operand::Float(*f),
        Literal::Bool(b) => Operand::Bool(*b),
        Literal::Null => Operand::Null,
    }
}

pub(super) fn evaluate(expr: &Expr, row: &EntityProperties) -> Result<bool, FilterError> {
    match value_of(expr, row)? {
        Operand::Bool(b) => Ok(b),
        other => Err(FilterError::NotBoolean { found: other.kind() }),
    }
}

fn value_of<'a>(expr: &'a Expr, row: &'a EntityProperties) -> Result<Operand<'a>, FilterError> {
    match expr {
        Expr::Field(name) => Ok(row.get(name).map_or(Operand::Null, from_json)),
        Expr::Literal(literal) => Ok(from_literal(literal)),
        // Both short-circuit left to right like the production evaluator.
        Expr::And(operands) => {
            for operand in operands {
                if !evaluate(operand, row)? {
                    return Ok(Operand::Bool(false));
                }
            }
            Ok(Operand::Bool(true))
        },
        Expr::Or(operands) => {
            for operand in operands {
                if evaluate(operand, row)? {
                    return Ok(Operand::Bool(true));
                }
            }
            Ok(Operand::Bool(false))
        },
        Expr::Not(inner) => Ok(Operand::Bool(!evaluate(inner, row)?)),
        Expr::Compare { op, left, right } => {
            let left = value_of(left, row)?;
            let right = value_of(right, row)?;
            compare(*op, &left, &right).map(Operand::Bool)
        },
    }
}

fn compare(op: CompareOp, left: &Operand<'_>, right: &Operand<'_>) -> Result<bool, FilterError> {
    let ordering = match (left, right) {
        (Operand::Null, Operand::Null) => return Ok(op == CompareOp::Eq),
        // A missing or null property never satisfies anything but `!= value`.
        (Operand::Null, _) | (_, Operand::Null) => return Ok(op == CompareOp::Ne),
        (Operand::Bool(l), Operand::Bool(r)) => {
            if op.is_ordering() {
                return Err(FilterError::UnsupportedOperator { op, operand: "boolean" });
            }
            l.cmp(r)
        },
        (Operand::Str(l), Operand::Str(r)) => l.cmp(r),
        (Operand::Int(l), Operand::Int(r)) => l.cmp(r),
        (Operand::Int(l), Operand::Float(r)) => match (*l as f64).partial_cmp(r) {
            Some(ordering) => ordering,
            None => return Ok(op == CompareOp::Ne),
        },
        (Operand::Float(l), Operand::Int(r)) => match l.partial_cmp(&(*r as f64)) {
            Some(ordering) => ordering,
            None => return Ok(op == CompareOp::Ne),
        },
        (Operand::Float(l), Operand::Float(r)) => match l.partial_cmp(r) {
            Some(ordering) => ordering,
            None => return Ok(op == CompareOp::Ne),
        },
        _ => {
            return Err(FilterError::TypeMismatch { op, left: left.kind(), right: right.kind() });
        },
    };
    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
    })
}
