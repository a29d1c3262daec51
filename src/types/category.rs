use serde::{Deserialize, Serialize};

/// Coarse shape of an argument type, as the engine reports it at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Scalar value (number, text, bool, ...)
    Primitive,
    /// Homogeneous list
    List,
    /// Key/value map
    Map,
    /// Ordered record of named fields
    Struct,
}

/// Concrete kind of a primitive argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveCategory {
    Void,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Varchar,
    Char,
    Date,
    Timestamp,
    Decimal,
    Binary,
}

impl PrimitiveCategory {
    /// Lower-case type name used in error messages and explain output.
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveCategory::Void => "void",
            PrimitiveCategory::Boolean => "boolean",
            PrimitiveCategory::Byte => "tinyint",
            PrimitiveCategory::Short => "smallint",
            PrimitiveCategory::Int => "int",
            PrimitiveCategory::Long => "bigint",
            PrimitiveCategory::Float => "float",
            PrimitiveCategory::Double => "double",
            PrimitiveCategory::String => "string",
            PrimitiveCategory::Varchar => "varchar",
            PrimitiveCategory::Char => "char",
            PrimitiveCategory::Date => "date",
            PrimitiveCategory::Timestamp => "timestamp",
            PrimitiveCategory::Decimal => "decimal",
            PrimitiveCategory::Binary => "binary",
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, PrimitiveCategory::Byte | PrimitiveCategory::Short | PrimitiveCategory::Int | PrimitiveCategory::Long)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, PrimitiveCategory::Float | PrimitiveCategory::Double | PrimitiveCategory::Decimal)
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, PrimitiveCategory::String | PrimitiveCategory::Varchar | PrimitiveCategory::Char)
    }
}
