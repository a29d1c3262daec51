use serde_json::Value;

use crate::{functions::FunctionError, types::{PrimitiveCategory, StructTypeInfo, TypeInfo}};

/// Reads primitive values of one bound category.
///
/// Inspectors are resolved once when a function is bound and then shared
/// read-only by every row. A string-like inspector routes numeric reads
/// through the value's text rendering, so `85` and `"85"` read the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveInspector {
    category: PrimitiveCategory,
}

impl PrimitiveInspector {
    pub fn new(category: PrimitiveCategory) -> Self { Self { category } }

    pub fn string() -> Self { Self::new(PrimitiveCategory::String) }

    pub fn category(&self) -> PrimitiveCategory { self.category }

    pub fn read_string(&self, v: &Value) -> Result<Option<String>, FunctionError> {
        match v {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(self.mismatch(other)),
        }
    }

    pub fn read_double(&self, v: &Value) -> Result<Option<f64>, FunctionError> {
        if self.category.is_string_like() {
            let Some(text) = self.read_string(v)? else { return Ok(None) };
            return text.trim().parse::<f64>()
                .map(Some)
                .map_err(|_| FunctionError::InvalidValue { message: format!("cannot read '{text}' as double") });
        }
        match v {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_f64()
                .map(Some)
                .ok_or_else(|| FunctionError::InvalidValue { message: format!("number {n} is not representable as double") }),
            Value::Bool(b) if self.category == PrimitiveCategory::Boolean => Ok(Some(if *b { 1.0 } else { 0.0 })),
            // JSON numbers cannot hold NaN or the infinities; those travel as text.
            Value::String(s) if matches!(self.category, PrimitiveCategory::Float | PrimitiveCategory::Double) => {
                match s.trim().parse::<f64>() {
                    Ok(d) if !d.is_finite() => Ok(Some(d)),
                    _ => Err(self.mismatch(v)),
                }
            }
            other => Err(self.mismatch(other)),
        }
    }

    pub fn read_int(&self, v: &Value) -> Result<Option<i64>, FunctionError> {
        if self.category.is_string_like() {
            let Some(text) = self.read_string(v)? else { return Ok(None) };
            return text.trim().parse::<i64>()
                .map(Some)
                .map_err(|_| FunctionError::InvalidValue { message: format!("cannot read '{text}' as integer") });
        }
        match v {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .map(Some)
                .ok_or_else(|| FunctionError::InvalidValue { message: format!("number {n} is not representable as integer") }),
            other => Err(self.mismatch(other)),
        }
    }

    fn mismatch(&self, got: &Value) -> FunctionError {
        FunctionError::InvalidValue {
            message: format!("expected {} value, got {}", self.category.type_name(), TypeInfo::of_value(got)),
        }
    }
}

/// Field handle resolved once against a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub index: usize,
    pub type_info: TypeInfo,
}

impl StructField {
    /// Inspector for a primitive field; `None` for composite fields.
    pub fn inspector(&self) -> Option<PrimitiveInspector> {
        self.type_info.primitive_category().map(PrimitiveInspector::new)
    }
}

/// Reads struct data laid out either positionally (`[a, b]`) or by name
/// (`{"a": .., "b": ..}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInspector {
    type_info: StructTypeInfo,
}

impl StructInspector {
    pub fn of(t: &TypeInfo) -> Option<Self> {
        match t {
            TypeInfo::Struct(s) => Some(Self { type_info: s.clone() }),
            _ => None,
        }
    }

    pub fn field_ref(&self, name: &str) -> Option<StructField> {
        self.type_info.field(name).map(|(index, ty)| StructField {
            name: name.to_string(),
            index,
            type_info: ty.clone(),
        })
    }

    /// `Ok(None)` when the whole struct is null.
    pub fn field_data<'v>(&self, data: &'v Value, field: &StructField) -> Result<Option<&'v Value>, FunctionError> {
        match data {
            Value::Null => Ok(None),
            Value::Array(items) => {
                if items.len() != self.type_info.fields.len() {
                    return Err(FunctionError::InvalidValue {
                        message: format!("struct data has {} fields, expected {}", items.len(), self.type_info.fields.len()),
                    });
                }
                Ok(items.get(field.index))
            }
            Value::Object(map) => map.get(&field.name)
                .map(Some)
                .ok_or_else(|| FunctionError::InvalidValue { message: format!("struct data has no field '{}'", field.name) }),
            other => Err(FunctionError::InvalidValue {
                message: format!("expected struct data, got {}", TypeInfo::of_value(other)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partial_type() -> TypeInfo {
        TypeInfo::structure([("total", TypeInfo::double()), ("count", TypeInfo::int())])
    }

    #[test]
    fn string_inspector_reads_numbers_through_text() {
        let oi = PrimitiveInspector::string();
        assert_eq!(oi.read_double(&json!(85)).unwrap(), Some(85.0));
        assert_eq!(oi.read_double(&json!("90.5")).unwrap(), Some(90.5));
        assert_eq!(oi.read_double(&json!(" 7 ")).unwrap(), Some(7.0));
        assert_eq!(oi.read_double(&Value::Null).unwrap(), None);
        assert_eq!(oi.read_string(&json!(12)).unwrap(), Some("12".to_string()));
    }

    #[test]
    fn string_inspector_rejects_garbage() {
        let err = PrimitiveInspector::string().read_double(&json!("ninety")).unwrap_err();
        assert!(err.to_string().contains("ninety"), "{err}");
        assert!(PrimitiveInspector::string().read_string(&json!([1])).is_err());
    }

    #[test]
    fn numeric_inspectors_read_numbers() {
        let d = PrimitiveInspector::new(PrimitiveCategory::Double);
        assert_eq!(d.read_double(&json!(1.25)).unwrap(), Some(1.25));
        assert!(d.read_double(&json!("1.25")).is_err());
        assert_eq!(d.read_double(&json!("Infinity")).unwrap(), Some(f64::INFINITY));
        assert_eq!(d.read_double(&json!("-Infinity")).unwrap(), Some(f64::NEG_INFINITY));
        assert!(d.read_double(&json!("NaN")).unwrap().is_some_and(f64::is_nan));
        assert!(PrimitiveInspector::new(PrimitiveCategory::Int).read_double(&json!("Infinity")).is_err());

        let i = PrimitiveInspector::new(PrimitiveCategory::Int);
        assert_eq!(i.read_int(&json!(23)).unwrap(), Some(23));
        assert_eq!(i.read_int(&json!(23.9)).unwrap(), Some(23));
        assert_eq!(i.read_int(&Value::Null).unwrap(), None);
    }

    #[test]
    fn struct_inspector_reads_positional_and_named_data() {
        let soi = StructInspector::of(&partial_type()).unwrap();
        let total = soi.field_ref("total").unwrap();
        let count = soi.field_ref("count").unwrap();
        assert_eq!(count.index, 1);

        let positional = json!([12.5, 3]);
        assert_eq!(soi.field_data(&positional, &total).unwrap(), Some(&json!(12.5)));
        assert_eq!(soi.field_data(&positional, &count).unwrap(), Some(&json!(3)));

        let named = json!({"count": 4, "total": 1.0});
        assert_eq!(soi.field_data(&named, &count).unwrap(), Some(&json!(4)));
        assert_eq!(soi.field_data(&Value::Null, &count).unwrap(), None);
    }

    #[test]
    fn struct_inspector_rejects_misshaped_data() {
        let soi = StructInspector::of(&partial_type()).unwrap();
        let total = soi.field_ref("total").unwrap();
        assert!(soi.field_data(&json!([1.0]), &total).is_err());
        assert!(soi.field_data(&json!({"count": 1}), &total).is_err());
        assert!(soi.field_data(&json!("x"), &total).is_err());
        assert!(soi.field_ref("avg").is_none());
        assert!(StructInspector::of(&TypeInfo::string()).is_none());
    }
}
