use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::functions::FunctionError;

pub struct Helpers;

impl Helpers {
    /// Stable string form of a value tuple, used as a group key.
    pub fn canonical_tuple(vals: &[Value]) -> Result<String, FunctionError> {
        serde_json::to_string(vals).map_err(|e| FunctionError::Other(format!("cannot encode group key: {e}")))
    }

    pub fn row_object(row: &Value) -> Result<&Map<String, Value>, FunctionError> {
        row.as_object().ok_or_else(|| FunctionError::Other(format!("row is not an object: {row}")))
    }

    /// Group values of `row` (missing columns read as null) and their key.
    pub fn group_key(row: &Map<String, Value>, group_by: &[String]) -> Result<(String, Vec<Value>), FunctionError> {
        let vals: Vec<Value> = group_by.iter()
            .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        Ok((Self::canonical_tuple(&vals)?, vals))
    }

    /// Ascending value order with nulls last. Numbers compare numerically;
    /// mixed kinds fall back to a fixed type rank.
    pub fn cmp_json_for_sort(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
            (lhs, rhs) => Self::type_rank(lhs).cmp(&Self::type_rank(rhs)),
        }
    }

    /// Lexicographic order of two group value tuples.
    pub fn cmp_groups(a: &[Value], b: &[Value]) -> Ordering {
        a.iter()
            .zip(b)
            .map(|(x, y)| Self::cmp_json_for_sort(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    }

    fn type_rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0, Value::Bool(_) => 1, Value::Number(_) => 2, Value::String(_) => 3,
            Value::Array(_) => 4, Value::Object(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Helpers;
    use serde_json::{json, Value};

    #[test]
    fn canonical_tuple_is_deterministic_for_same_values() {
        let a = vec![json!(1), json!("x"), json!(true)];
        let b = vec![json!(1), json!("x"), json!(true)];
        assert_eq!(Helpers::canonical_tuple(&a).unwrap(), Helpers::canonical_tuple(&b).unwrap());
    }

    #[test]
    fn canonical_tuple_differs_for_different_values() {
        let a = vec![json!(1), json!("x")];
        let b = vec![json!(1), json!("y")];
        assert_ne!(Helpers::canonical_tuple(&a).unwrap(), Helpers::canonical_tuple(&b).unwrap());
    }

    #[test]
    fn group_key_reads_missing_columns_as_null() {
        let row = json!({"student": "alice", "score": 3});
        let obj = row.as_object().unwrap();
        let (key, vals) = Helpers::group_key(obj, &["student".into(), "class".into()]).unwrap();
        assert_eq!(vals, vec![json!("alice"), Value::Null]);
        assert_eq!(key, r#"["alice",null]"#);
    }

    #[test]
    fn numbers_sort_numerically_with_nulls_last() {
        use std::cmp::Ordering::*;
        assert_eq!(Helpers::cmp_json_for_sort(&json!(9), &json!(10)), Less);
        assert_eq!(Helpers::cmp_json_for_sort(&json!(2.5), &json!(2)), Greater);
        assert_eq!(Helpers::cmp_json_for_sort(&json!(1), &Value::Null), Less);
        assert_eq!(Helpers::cmp_json_for_sort(&Value::Null, &json!("a")), Greater);
        assert_eq!(Helpers::cmp_json_for_sort(&json!(1), &json!("1")), Less);
    }

    #[test]
    fn groups_compare_column_by_column() {
        use std::cmp::Ordering::*;
        assert_eq!(Helpers::cmp_groups(&[json!("a"), json!(10)], &[json!("a"), json!(9)]), Greater);
        assert_eq!(Helpers::cmp_groups(&[json!("a"), json!(10)], &[json!("b"), json!(1)]), Less);
        assert_eq!(Helpers::cmp_groups(&[], &[]), Equal);
    }

    #[test]
    fn row_object_rejects_scalars() {
        assert!(Helpers::row_object(&json!(1)).is_err());
        assert!(Helpers::row_object(&json!({})).is_ok());
    }
}
