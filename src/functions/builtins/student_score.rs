use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    functions::{
        format_double, Accumulator, AggregateEvaluator, AggregateFunction, AggregationPhase,
        EvaluatorFactory, FunctionError, ParameterInfo
    },
    types::{Category, PrimitiveCategory, PrimitiveInspector, StructField, StructInspector, TypeInfo}
};

/// Partial-state field names. Merge phases look the fields up by these names.
pub const TOTAL_FIELD: &str = "total";
pub const COUNT_FIELD: &str = "count";

const NAME: &str = "student_score";

/// Running total and count of one group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreTally {
    pub total: f64,
    pub count: i64,
}

impl ScoreTally {
    pub fn new() -> Self { Self::default() }

    pub fn reset(&mut self) {
        self.total = 0.0;
        self.count = 0;
    }

    pub fn add(&mut self, score: f64) {
        self.total += score;
        self.count += 1;
    }

    pub fn absorb(&mut self, other: &ScoreTally) -> Result<(), FunctionError> {
        self.count = self.count.checked_add(other.count).ok_or_else(|| FunctionError::InvalidValue {
            message: format!("merged count overflows: {} + {}", self.count, other.count),
        })?;
        self.total += other.total;
        Ok(())
    }

    /// `None` for an empty group.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }

    pub fn summary(&self) -> Option<String> {
        self.average().map(|avg| format!(
            "This student took {} subject, total score is {}, average score is {}.",
            self.count,
            format_double(self.total),
            format_double(avg),
        ))
    }

    /// `struct<total:double,count:int>`
    pub fn partial_type() -> TypeInfo {
        TypeInfo::structure([(TOTAL_FIELD, TypeInfo::double()), (COUNT_FIELD, TypeInfo::int())])
    }

    /// Positional struct data in `partial_type()` field order. A non-finite
    /// total is carried as its text form (`NaN`, `Infinity`, `-Infinity`).
    pub fn to_partial(&self) -> Result<Value, FunctionError> {
        let count = i32::try_from(self.count).map_err(|_| FunctionError::InvalidValue {
            message: format!("partial count {} does not fit int", self.count),
        })?;
        let total = serde_json::Number::from_f64(self.total)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(format_double(self.total)));
        Ok(Value::Array(vec![total, Value::from(count)]))
    }
}

/// `student_score(score)`: per-group count, total and average of the scores,
/// rendered as a sentence. Null scores are skipped; a group without any
/// score yields null.
pub struct StudentScore;

impl AggregateFunction for StudentScore {
    fn name(&self) -> &'static str { NAME }

    fn resolve(&self, info: &ParameterInfo) -> Result<Arc<dyn EvaluatorFactory>, FunctionError> {
        if info.all_columns {
            return Err(FunctionError::UnsupportedModifier { function: NAME.into(), modifier: "all columns (*)".into() });
        }
        if info.distinct {
            return Err(FunctionError::UnsupportedModifier { function: NAME.into(), modifier: "DISTINCT".into() });
        }
        let [arg] = info.parameters.as_slice() else {
            return Err(FunctionError::WrongArity { function: NAME.into(), expected: "exactly 1".into(), got: info.parameters.len() });
        };
        let Some(category) = arg.primitive_category() else {
            return Err(FunctionError::WrongCategory { function: NAME.into(), index: 0, type_name: arg.type_name() });
        };

        // Integral, floating and text scores all go through the text reader.
        match category {
            p if p.is_integral() || p.is_string_like() || matches!(p, PrimitiveCategory::Float | PrimitiveCategory::Double) => {
                debug!(function = NAME, input = %arg, "resolved aggregate");
                Ok(Arc::new(TextScoreFactory))
            }
            _ => Err(FunctionError::UnsupportedPrimitive { function: NAME.into(), index: 0, type_name: arg.type_name() }),
        }
    }
}

/// Evaluator family that reads raw scores as text and parses them.
pub struct TextScoreFactory;

impl EvaluatorFactory for TextScoreFactory {
    fn partial_type(&self) -> TypeInfo { ScoreTally::partial_type() }

    fn bind(&self, phase: AggregationPhase, inputs: &[TypeInfo]) -> Result<Box<dyn AggregateEvaluator>, FunctionError> {
        let [input] = inputs else {
            return Err(FunctionError::WrongArity { function: NAME.into(), expected: "exactly 1".into(), got: inputs.len() });
        };

        let input = if phase.accepts_raw() {
            if input.category() != Category::Primitive {
                return Err(FunctionError::WrongCategory { function: NAME.into(), index: 0, type_name: input.type_name() });
            }
            ScoreInput::Raw(PrimitiveInspector::string())
        } else {
            ScoreInput::Partial(PartialHandles::resolve(input)?)
        };

        let output = if phase.emits_final() { TypeInfo::string() } else { ScoreTally::partial_type() };
        debug!(function = NAME, %phase, output = %output, "bound aggregate evaluator");
        Ok(Box::new(ScoreEvaluator { handles: Arc::new(ScoreHandles { phase, input, output }) }))
    }
}

/// Cached field handles for reading partial state.
#[derive(Debug)]
struct PartialHandles {
    soi: StructInspector,
    total: StructField,
    count: StructField,
    total_oi: PrimitiveInspector,
    count_oi: PrimitiveInspector,
}

impl PartialHandles {
    fn resolve(input: &TypeInfo) -> Result<Self, FunctionError> {
        let soi = StructInspector::of(input)
            .ok_or_else(|| FunctionError::WrongCategory { function: NAME.into(), index: 0, type_name: input.type_name() })?;
        let total = soi.field_ref(TOTAL_FIELD)
            .ok_or_else(|| FunctionError::MissingField { function: NAME.into(), field: TOTAL_FIELD.into() })?;
        let count = soi.field_ref(COUNT_FIELD)
            .ok_or_else(|| FunctionError::MissingField { function: NAME.into(), field: COUNT_FIELD.into() })?;
        let total_oi = total.inspector()
            .filter(|oi| oi.category().is_numeric())
            .ok_or_else(|| FunctionError::UnsupportedPrimitive { function: NAME.into(), index: 0, type_name: total.type_info.type_name() })?;
        let count_oi = count.inspector()
            .filter(|oi| oi.category().is_integral())
            .ok_or_else(|| FunctionError::UnsupportedPrimitive { function: NAME.into(), index: 0, type_name: count.type_info.type_name() })?;
        Ok(Self { soi, total, count, total_oi, count_oi })
    }

    fn read(&self, partial: &Value) -> Result<Option<ScoreTally>, FunctionError> {
        let (Some(total), Some(count)) = (self.soi.field_data(partial, &self.total)?, self.soi.field_data(partial, &self.count)?) else {
            return Ok(None);
        };
        let null_field = |field: &str| FunctionError::InvalidValue { message: format!("partial field '{field}' is null") };
        let total = self.total_oi.read_double(total)?.ok_or_else(|| null_field(TOTAL_FIELD))?;
        let count = self.count_oi.read_int(count)?.ok_or_else(|| null_field(COUNT_FIELD))?;
        let count = i32::try_from(count)
            .ok()
            .filter(|c| *c >= 0)
            .ok_or_else(|| FunctionError::InvalidValue { message: format!("partial count {count} is outside 0..={}", i32::MAX) })?;
        Ok(Some(ScoreTally { total, count: i64::from(count) }))
    }
}

#[derive(Debug)]
enum ScoreInput {
    /// SinglePass / EmitPartial
    Raw(PrimitiveInspector),
    /// MergePartial / FinalMerge
    Partial(PartialHandles),
}

/// Read-only state fixed at bind time, shared by every accumulator of the
/// bound plan.
#[derive(Debug)]
struct ScoreHandles {
    phase: AggregationPhase,
    input: ScoreInput,
    output: TypeInfo,
}

impl ScoreHandles {
    fn violation(&self, operation: &'static str) -> FunctionError {
        FunctionError::PhaseViolation { function: NAME.into(), operation, phase: self.phase }
    }
}

struct ScoreEvaluator {
    handles: Arc<ScoreHandles>,
}

impl AggregateEvaluator for ScoreEvaluator {
    fn phase(&self) -> AggregationPhase { self.handles.phase }

    fn output_type(&self) -> &TypeInfo { &self.handles.output }

    fn new_accumulator(&self) -> Box<dyn Accumulator> {
        Box::new(ScoreAcc { tally: ScoreTally::new(), handles: Arc::clone(&self.handles) })
    }
}

struct ScoreAcc {
    tally: ScoreTally,
    handles: Arc<ScoreHandles>,
}

impl Accumulator for ScoreAcc {
    fn reset(&mut self) { self.tally.reset(); }

    fn iterate(&mut self, args: &[Value]) -> Result<(), FunctionError> {
        let ScoreInput::Raw(oi) = &self.handles.input else {
            return Err(self.handles.violation("iterate"));
        };
        let [v] = args else {
            return Err(FunctionError::WrongArity { function: NAME.into(), expected: "exactly 1".into(), got: args.len() });
        };
        match oi.read_double(v)? {
            Some(score) => self.tally.add(score),
            None => trace!(function = NAME, "null score skipped"),
        }
        Ok(())
    }

    fn merge(&mut self, partial: &Value) -> Result<(), FunctionError> {
        let ScoreInput::Partial(handles) = &self.handles.input else {
            return Err(self.handles.violation("merge"));
        };
        if let Some(other) = handles.read(partial)? {
            self.tally.absorb(&other)?;
        }
        Ok(())
    }

    fn terminate_partial(&self) -> Result<Value, FunctionError> {
        if self.handles.phase.emits_final() {
            return Err(self.handles.violation("terminate_partial"));
        }
        self.tally.to_partial()
    }

    fn terminate(&self) -> Result<Value, FunctionError> {
        if !self.handles.phase.emits_final() {
            return Err(self.handles.violation("terminate"));
        }
        Ok(self.tally.summary().map(Value::String).unwrap_or(Value::Null))
    }
}
