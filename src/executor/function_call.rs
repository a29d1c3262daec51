use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{functions::FunctionError, types::TypeInfo};

/// Column name -> declared type.
pub type Schema = IndexMap<String, TypeInfo>;

/// Argument of a function call: a column of the input rows or a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgExpr {
    Column(String),
    Literal(Value),
}

impl ArgExpr {
    pub fn col(name: &str) -> Self { ArgExpr::Column(name.to_string()) }
    pub fn lit(v: Value) -> Self { ArgExpr::Literal(v) }

    pub fn type_in(&self, schema: &Schema) -> Result<TypeInfo, FunctionError> {
        match self {
            ArgExpr::Column(name) => schema.get(name).cloned().ok_or_else(|| FunctionError::UnknownColumn(name.clone())),
            ArgExpr::Literal(v) => Ok(TypeInfo::of_value(v)),
        }
    }

    pub fn eval(&self, row: &Map<String, Value>) -> Value {
        match self {
            ArgExpr::Column(name) => row.get(name).cloned().unwrap_or(Value::Null),
            ArgExpr::Literal(v) => v.clone(),
        }
    }
}

impl fmt::Display for ArgExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgExpr::Column(name) => write!(f, "{name}"),
            ArgExpr::Literal(v) => write!(f, "{v}"),
        }
    }
}

/// A call of a registered function, as the planner would hand it over.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<ArgExpr>,
    pub distinct: bool,
    pub all_columns: bool,
}

impl FunctionCall {
    pub fn new(name: &str, args: Vec<ArgExpr>) -> Self {
        Self { name: name.to_string(), args, distinct: false, all_columns: false }
    }

    pub fn with_distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn arg_types(&self, schema: &Schema) -> Result<Vec<TypeInfo>, FunctionError> {
        self.args.iter().map(|a| a.type_in(schema)).collect()
    }

    pub fn arg_labels(&self) -> Vec<String> {
        if self.all_columns {
            return vec!["*".to_string()];
        }
        self.args.iter().map(|a| a.to_string()).collect()
    }
}
