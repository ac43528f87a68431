use serde::{Deserialize, Serialize};

use crate::command::{Value, Variables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

pub fn compare(op: CmpOp, lhs: f64, rhs: f64) -> bool {
    match op {
        CmpOp::Eq => lhs == rhs,
        CmpOp::Ne => lhs != rhs,
        CmpOp::Gt => lhs > rhs,
        CmpOp::Lt => lhs < rhs,
        CmpOp::Ge => lhs >= rhs,
        CmpOp::Le => lhs <= rhs,
    }
}

/// Boolean expression over game variables and the in-game clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Var { name: String, op: CmpOp, value: Value },
    Time { op: CmpOp, hour: u32 },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn var(name: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Condition {
        Condition::Var { name: name.into(), op, value: value.into() }
    }

    pub fn time(op: CmpOp, hour: u32) -> Condition {
        Condition::Time { op, hour }
    }

    pub fn all(conditions: Vec<Condition>) -> Condition {
        Condition::All(conditions)
    }

    pub fn any(conditions: Vec<Condition>) -> Condition {
        Condition::Any(conditions)
    }

    pub fn not(condition: Condition) -> Condition {
        Condition::Not(Box::new(condition))
    }
}

/// Evaluate a condition against the variable mapping and the current
/// hour (0-23). An absent condition gates nothing and is `true`.
///
/// Reading a variable that was never set materializes it as `0` in the
/// mapping; scripted content depends on that side effect.
pub fn evaluate(condition: Option<&Condition>, vars: &mut Variables, hour: u32) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    match condition {
        Condition::Var { name, op, value } => {
            let current = vars
                .entry(name.clone())
                .or_insert(Value::Num(0.0))
                .as_num();
            compare(*op, current, value.as_num())
        }
        Condition::Time { op, hour: rhs } => compare(*op, hour as f64, *rhs as f64),
        Condition::All(list) => list.iter().all(|c| evaluate(Some(c), vars, hour)),
        Condition::Any(list) => list.iter().any(|c| evaluate(Some(c), vars, hour)),
        Condition::Not(inner) => !evaluate(Some(inner), vars, hour),
    }
}
