use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Category, PrimitiveCategory};

/// Ordered record type. Field order is significant: positional struct data
/// (a JSON array) is laid out in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructTypeInfo {
    pub fields: IndexMap<String, TypeInfo>,
}

impl StructTypeInfo {
    pub fn new<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, TypeInfo)>,
    {
        Self { fields: fields.into_iter().map(|(k, t)| (k.to_string(), t)).collect() }
    }

    pub fn field(&self, name: &str) -> Option<(usize, &TypeInfo)> {
        self.fields.get_full(name).map(|(idx, _, ty)| (idx, ty))
    }
}

/// Argument / return type descriptor exchanged with the engine at bind time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeInfo {
    Primitive(PrimitiveCategory),
    List(Box<TypeInfo>),
    Map(Box<TypeInfo>, Box<TypeInfo>),
    Struct(StructTypeInfo),
}

impl TypeInfo {
    pub fn string() -> Self { TypeInfo::Primitive(PrimitiveCategory::String) }
    pub fn double() -> Self { TypeInfo::Primitive(PrimitiveCategory::Double) }
    pub fn int() -> Self { TypeInfo::Primitive(PrimitiveCategory::Int) }

    pub fn structure<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, TypeInfo)>,
    {
        TypeInfo::Struct(StructTypeInfo::new(fields))
    }

    pub fn category(&self) -> Category {
        match self {
            TypeInfo::Primitive(_) => Category::Primitive,
            TypeInfo::List(_) => Category::List,
            TypeInfo::Map(_, _) => Category::Map,
            TypeInfo::Struct(_) => Category::Struct,
        }
    }

    pub fn primitive_category(&self) -> Option<PrimitiveCategory> {
        match self {
            TypeInfo::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            TypeInfo::Primitive(p) => p.type_name().to_string(),
            TypeInfo::List(elem) => format!("array<{}>", elem.type_name()),
            TypeInfo::Map(k, v) => format!("map<{},{}>", k.type_name(), v.type_name()),
            TypeInfo::Struct(s) => {
                let parts: Vec<String> = s.fields.iter()
                    .map(|(name, ty)| format!("{}:{}", name, ty.type_name()))
                    .collect();
                format!("struct<{}>", parts.join(","))
            }
        }
    }

    /// Classify a literal value. Lists take the type of their first element;
    /// objects become structs in key order.
    pub fn of_value(v: &Value) -> TypeInfo {
        match v {
            Value::Null => TypeInfo::Primitive(PrimitiveCategory::Void),
            Value::Bool(_) => TypeInfo::Primitive(PrimitiveCategory::Boolean),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i32::try_from(i).is_ok() { TypeInfo::int() } else { TypeInfo::Primitive(PrimitiveCategory::Long) }
                } else if n.is_u64() {
                    TypeInfo::Primitive(PrimitiveCategory::Long)
                } else {
                    TypeInfo::double()
                }
            }
            Value::String(_) => TypeInfo::string(),
            Value::Array(items) => {
                let elem = items.first().map(TypeInfo::of_value).unwrap_or(TypeInfo::Primitive(PrimitiveCategory::Void));
                TypeInfo::List(Box::new(elem))
            }
            Value::Object(map) => TypeInfo::Struct(StructTypeInfo {
                fields: map.iter().map(|(k, v)| (k.clone(), TypeInfo::of_value(v))).collect(),
            }),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn struct_type_name_keeps_field_order() {
        let t = TypeInfo::structure([("total", TypeInfo::double()), ("count", TypeInfo::int())]);
        assert_eq!(t.type_name(), "struct<total:double,count:int>");
        assert_eq!(t.category(), Category::Struct);
    }

    #[test]
    fn nested_type_names() {
        let t = TypeInfo::Map(Box::new(TypeInfo::string()), Box::new(TypeInfo::List(Box::new(TypeInfo::int()))));
        assert_eq!(t.to_string(), "map<string,array<int>>");
    }

    #[test]
    fn of_value_classifies_literals() {
        assert_eq!(TypeInfo::of_value(&json!(3)), TypeInfo::int());
        assert_eq!(TypeInfo::of_value(&json!(5_000_000_000i64)), TypeInfo::Primitive(PrimitiveCategory::Long));
        assert_eq!(TypeInfo::of_value(&json!(2.5)), TypeInfo::double());
        assert_eq!(TypeInfo::of_value(&json!("x")), TypeInfo::string());
        assert_eq!(TypeInfo::of_value(&Value::Null), TypeInfo::Primitive(PrimitiveCategory::Void));
        assert_eq!(TypeInfo::of_value(&json!([1, 2])).category(), Category::List);
        assert_eq!(
            TypeInfo::of_value(&json!({"total": 1.5, "count": 2})),
            TypeInfo::structure([("total", TypeInfo::double()), ("count", TypeInfo::int())])
        );
    }

    #[test]
    fn struct_field_lookup_reports_position() {
        let s = StructTypeInfo::new([("total", TypeInfo::double()), ("count", TypeInfo::int())]);
        assert_eq!(s.field("count"), Some((1, &TypeInfo::int())));
        assert!(s.field("avg").is_none());
    }
}
