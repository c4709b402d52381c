//! Style-document expressions
//!
//! Filters and data-driven paint values are plain JSON arrays in a MapLibre
//! style document (`["==", ["get", "status"], "logged"]`). [`Expression`]
//! wraps such a value with constructors so the composer never hand-writes
//! JSON, and with a small evaluator for the filter subset the composer emits.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(pub Value);

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn get(key: &str) -> Self {
        Self(json!(["get", key]))
    }

    pub fn has(key: &str) -> Self {
        Self(json!(["has", key]))
    }

    pub fn zoom() -> Self {
        Self(json!(["zoom"]))
    }

    /// Kernel density inside a heatmap layer
    pub fn heatmap_density() -> Self {
        Self(json!(["heatmap-density"]))
    }

    pub fn equals(left: Expression, right: impl Into<Value>) -> Self {
        Self(json!(["==", left.0, right.into()]))
    }

    pub fn not(inner: Expression) -> Self {
        Self(json!(["!", inner.0]))
    }

    pub fn all(parts: impl IntoIterator<Item = Expression>) -> Self {
        let mut items = vec![Value::from("all")];
        items.extend(parts.into_iter().map(|e| e.0));
        Self(Value::Array(items))
    }

    /// `["match", input, [labels...], matched, otherwise]`
    pub fn matches_any(input: Expression, labels: &[&str], matched: Value, otherwise: Value) -> Self {
        Self(json!(["match", input.0, labels, matched, otherwise]))
    }

    /// Linear interpolation over `(input, output)` stops
    pub fn interpolate_linear(input: Expression, stops: &[(f64, f64)]) -> Self {
        let mut items = vec![json!("interpolate"), json!(["linear"]), input.0];
        for (stop, value) in stops {
            items.push(json!(stop));
            items.push(json!(value));
        }
        Self(Value::Array(items))
    }

    /// Linear interpolation onto colour strings
    pub fn interpolate_colors(input: Expression, stops: &[(f64, String)]) -> Self {
        let mut items = vec![json!("interpolate"), json!(["linear"]), input.0];
        for (stop, color) in stops {
            items.push(json!(stop));
            items.push(json!(color));
        }
        Self(Value::Array(items))
    }

    /// `["step", input, base, threshold, value, ...]`
    pub fn step(input: Expression, base: f64, steps: &[(f64, f64)]) -> Self {
        let mut items = vec![json!("step"), input.0, json!(base)];
        for (threshold, value) in steps {
            items.push(json!(threshold));
            items.push(json!(value));
        }
        Self(Value::Array(items))
    }

    /// Point features that the clustering engine left unclustered
    pub fn not_cluster() -> Self {
        Self::not(Self::has(crate::constants::POINT_COUNT))
    }

    pub fn is_cluster() -> Self {
        Self::has(crate::constants::POINT_COUNT)
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Evaluates the expression against a feature's attributes.
    ///
    /// Supports the operators the composer emits: `get`, `has`, `==`, `!`,
    /// `all`, `match` and literals. Anything else evaluates to `null`.
    pub fn evaluate(&self, properties: &Map<String, Value>) -> Value {
        evaluate(&self.0, properties)
    }

    /// Filter semantics: only a literal `true` result passes.
    pub fn matches(&self, properties: &Map<String, Value>) -> bool {
        self.evaluate(properties) == Value::Bool(true)
    }
}

impl From<Expression> for Value {
    fn from(expression: Expression) -> Self {
        expression.0
    }
}

fn evaluate(value: &Value, properties: &Map<String, Value>) -> Value {
    let items = match value {
        Value::Array(items) => items,
        other => return other.clone(),
    };
    let (op, args) = match items.split_first() {
        Some((Value::String(op), args)) => (op.as_str(), args),
        _ => return value.clone(),
    };

    match (op, args) {
        ("get", [Value::String(key)]) => properties.get(key).cloned().unwrap_or(Value::Null),
        ("has", [Value::String(key)]) => Value::Bool(properties.contains_key(key)),
        ("==", [left, right]) => Value::Bool(evaluate(left, properties) == evaluate(right, properties)),
        ("!", [inner]) => match evaluate(inner, properties) {
            Value::Bool(b) => Value::Bool(!b),
            _ => Value::Null,
        },
        ("all", parts) => Value::Bool(
            parts
                .iter()
                .all(|part| evaluate(part, properties) == Value::Bool(true)),
        ),
        ("match", [input, Value::Array(labels), matched, otherwise]) => {
            let input = evaluate(input, properties);
            if labels.contains(&input) {
                evaluate(matched, properties)
            } else {
                evaluate(otherwise, properties)
            }
        }
        _ => Value::Null,
    }
}
