use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::TypeInfo;

/// Which slice of the partial-aggregation life cycle an evaluator performs.
///
/// | phase        | consumes    | emits       |
/// |--------------|-------------|-------------|
/// | SinglePass   | raw rows    | final value |
/// | EmitPartial  | raw rows    | partial     |
/// | MergePartial | partials    | partial     |
/// | FinalMerge   | partials    | final value |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationPhase {
    SinglePass,
    EmitPartial,
    MergePartial,
    FinalMerge,
}

impl AggregationPhase {
    pub fn accepts_raw(&self) -> bool {
        matches!(self, AggregationPhase::SinglePass | AggregationPhase::EmitPartial)
    }

    pub fn emits_final(&self) -> bool {
        matches!(self, AggregationPhase::SinglePass | AggregationPhase::FinalMerge)
    }

    /// Engine mode label.
    pub fn label(&self) -> &'static str {
        match self {
            AggregationPhase::SinglePass => "COMPLETE",
            AggregationPhase::EmitPartial => "PARTIAL1",
            AggregationPhase::MergePartial => "PARTIAL2",
            AggregationPhase::FinalMerge => "FINAL",
        }
    }
}

impl fmt::Display for AggregationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Call-site description handed to an aggregate resolver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterInfo {
    pub parameters: Vec<TypeInfo>,
    pub distinct: bool,
    /// `f(*)`
    pub all_columns: bool,
}

impl ParameterInfo {
    pub fn new(parameters: Vec<TypeInfo>) -> Self {
        Self { parameters, distinct: false, all_columns: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_select_input_and_output_kinds() {
        use AggregationPhase::*;
        let table: Vec<(AggregationPhase, bool, bool)> = [SinglePass, EmitPartial, MergePartial, FinalMerge]
            .into_iter()
            .map(|p| (p, p.accepts_raw(), p.emits_final()))
            .collect();
        assert_eq!(table, vec![
            (SinglePass, true, true),
            (EmitPartial, true, false),
            (MergePartial, false, false),
            (FinalMerge, false, true),
        ]);
    }

    #[test]
    fn labels_match_engine_modes() {
        assert_eq!(AggregationPhase::EmitPartial.to_string(), "PARTIAL1");
        assert_eq!(AggregationPhase::SinglePass.to_string(), "COMPLETE");
    }
}
