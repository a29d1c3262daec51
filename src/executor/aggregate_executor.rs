use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info_span, trace, Instrument};
use uuid::Uuid;

use crate::{
    executor::{ArgExpr, ExecutionConfig, ExecutionMode, FunctionCall, Helpers, Schema},
    functions::{Accumulator, AggregationPhase, EvaluatorFactory, FunctionError, FunctionRegistry, ParameterInfo},
    types::TypeInfo
};

/// One partial crossing the shuffle boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ShuffleRecord {
    key: String,
    group: Vec<Value>,
    partition: usize,
    partial: Value,
}

impl ShuffleRecord {
    fn encode(&self) -> Result<Vec<u8>, FunctionError> {
        serde_json::to_vec(self).map_err(|e| FunctionError::Other(format!("cannot encode partial: {e}")))
    }

    fn decode(bytes: &[u8]) -> Result<Self, FunctionError> {
        serde_json::from_slice(bytes).map_err(|e| FunctionError::Other(format!("cannot decode partial: {e}")))
    }
}

/// key -> (group values, final value)
type GroupResults = IndexMap<String, (Vec<Value>, Value)>;

/// Drives an aggregate call through its phases over grouped JSON rows.
pub struct AggregateExecutor {
    config: ExecutionConfig,
}

impl AggregateExecutor {
    pub fn new(config: ExecutionConfig) -> Self { Self { config } }

    pub fn config(&self) -> &ExecutionConfig { &self.config }

    /// Output rows carry the `group_by` columns plus one column named after
    /// the call's display string, ordered by group values with nulls last.
    /// Without `group_by`, an empty input still yields one row.
    pub async fn execute(
        &self,
        registry: &FunctionRegistry,
        call: &FunctionCall,
        group_by: &[String],
        schema: &Schema,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, FunctionError> {
        let execution_id = Uuid::new_v4();
        let span = info_span!("aggregate", %execution_id, function = %call.name, mode = ?self.config.mode);
        self.run(registry, call, group_by, schema, rows).instrument(span).await
    }

    async fn run(
        &self,
        registry: &FunctionRegistry,
        call: &FunctionCall,
        group_by: &[String],
        schema: &Schema,
        rows: Vec<Value>,
    ) -> Result<Vec<Value>, FunctionError> {
        let fun = registry.require_aggregate(&call.name)?;
        let arg_types = call.arg_types(schema)?;
        if let Some(missing) = group_by.iter().find(|c| !schema.contains_key(*c)) {
            return Err(FunctionError::UnknownColumn(missing.clone()));
        }
        let info = ParameterInfo { parameters: arg_types.clone(), distinct: call.distinct, all_columns: call.all_columns };
        let factory = fun.resolve(&info)?;
        let column = fun.display(&call.arg_labels());
        debug!(%column, rows = rows.len(), "resolved aggregate call");

        let mut groups = match self.config.mode {
            ExecutionMode::Local => Self::run_local(factory.as_ref(), &arg_types, &call.args, group_by, &rows)?,
            ExecutionMode::Distributed => self.run_distributed(factory, &arg_types, &call.args, group_by, rows).await?,
        };
        groups.sort_by(|_, (a, _), _, (b, _)| Helpers::cmp_groups(a, b));

        let mut out = Vec::with_capacity(groups.len());
        for (vals, value) in groups.into_values() {
            let mut m = Map::new();
            for (name, v) in group_by.iter().zip(vals) {
                m.insert(name.clone(), v);
            }
            m.insert(column.clone(), value);
            out.push(Value::Object(m));
        }
        Ok(out)
    }

    fn run_local(
        factory: &dyn EvaluatorFactory,
        arg_types: &[TypeInfo],
        args: &[ArgExpr],
        group_by: &[String],
        rows: &[Value],
    ) -> Result<GroupResults, FunctionError> {
        let eval = factory.bind(AggregationPhase::SinglePass, arg_types)?;
        let mut groups: IndexMap<String, (Vec<Value>, Box<dyn Accumulator>)> = IndexMap::new();

        for row in rows {
            let obj = Helpers::row_object(row)?;
            let (key, vals) = Helpers::group_key(obj, group_by)?;
            let entry = groups.entry(key).or_insert_with(|| (vals, eval.new_accumulator()));
            let values: Vec<Value> = args.iter().map(|a| a.eval(obj)).collect();
            entry.1.iterate(&values)?;
        }
        if groups.is_empty() && group_by.is_empty() {
            groups.insert(Helpers::canonical_tuple(&[])?, (Vec::new(), eval.new_accumulator()));
        }

        let mut out = GroupResults::with_capacity(groups.len());
        for (key, (vals, acc)) in groups {
            out.insert(key, (vals, acc.terminate()?));
        }
        Ok(out)
    }

    async fn run_distributed(
        &self,
        factory: Arc<dyn EvaluatorFactory>,
        arg_types: &[TypeInfo],
        args: &[ArgExpr],
        group_by: &[String],
        rows: Vec<Value>,
    ) -> Result<GroupResults, FunctionError> {
        let partitions = self.config.partitions.max(1);
        let mut buckets: Vec<Vec<Value>> = vec![Vec::new(); partitions];
        for (i, row) in rows.into_iter().enumerate() {
            buckets[i % partitions].push(row);
        }

        // map side: one evaluator per partition, each on its own task
        let mut tasks = Vec::with_capacity(partitions);
        for (partition, bucket) in buckets.into_iter().enumerate() {
            let factory = Arc::clone(&factory);
            let arg_types = arg_types.to_vec();
            let args = args.to_vec();
            let group_by = group_by.to_vec();
            tasks.push(tokio::task::spawn_blocking(move || {
                Self::map_partition(partition, factory.as_ref(), &arg_types, &args, &group_by, &bucket)
            }));
        }

        let mut wire: Vec<Vec<u8>> = Vec::new();
        for task in tasks {
            let encoded = task.await.map_err(|e| FunctionError::Other(format!("partition task failed: {e}")))??;
            wire.extend(encoded);
        }
        debug!(partitions, partials = wire.len(), "map side finished");

        let mut records = wire.iter()
            .map(|bytes| ShuffleRecord::decode(bytes))
            .collect::<Result<Vec<_>, _>>()?;

        if self.config.combine_partials {
            records = Self::combine(factory.as_ref(), records)?;
            debug!(partials = records.len(), "combiner finished");
        }

        Self::final_merge(factory.as_ref(), records, group_by.is_empty())
    }

    /// EmitPartial over one partition; returns the encoded partials.
    fn map_partition(
        partition: usize,
        factory: &dyn EvaluatorFactory,
        arg_types: &[TypeInfo],
        args: &[ArgExpr],
        group_by: &[String],
        rows: &[Value],
    ) -> Result<Vec<Vec<u8>>, FunctionError> {
        let eval = factory.bind(AggregationPhase::EmitPartial, arg_types)?;
        let mut groups: IndexMap<String, (Vec<Value>, Box<dyn Accumulator>)> = IndexMap::new();

        for row in rows {
            let obj = Helpers::row_object(row)?;
            let (key, vals) = Helpers::group_key(obj, group_by)?;
            let entry = groups.entry(key).or_insert_with(|| (vals, eval.new_accumulator()));
            let values: Vec<Value> = args.iter().map(|a| a.eval(obj)).collect();
            entry.1.iterate(&values)?;
        }

        let mut out = Vec::with_capacity(groups.len());
        for (key, (group, acc)) in groups {
            let record = ShuffleRecord { key, group, partition, partial: acc.terminate_partial()? };
            trace!(partition, key = %record.key, partial = %record.partial, "emit partial");
            out.push(record.encode()?);
        }
        Ok(out)
    }

    /// MergePartial: partitions `2k` and `2k + 1` share a combiner. One
    /// accumulator per combiner is recycled across keys with `reset`.
    fn combine(factory: &dyn EvaluatorFactory, records: Vec<ShuffleRecord>) -> Result<Vec<ShuffleRecord>, FunctionError> {
        let eval = factory.bind(AggregationPhase::MergePartial, &[factory.partial_type()])?;

        let mut by_combiner: IndexMap<usize, IndexMap<String, Vec<ShuffleRecord>>> = IndexMap::new();
        for record in records {
            by_combiner.entry(record.partition / 2).or_default()
                .entry(record.key.clone()).or_default()
                .push(record);
        }

        let mut out = Vec::new();
        for (combiner, keyed) in by_combiner {
            let mut acc = eval.new_accumulator();
            for (key, group_records) in keyed {
                acc.reset();
                let group = group_records.first().map(|r| r.group.clone()).unwrap_or_default();
                for record in &group_records {
                    acc.merge(&record.partial)?;
                }
                out.push(ShuffleRecord { key, group, partition: combiner, partial: acc.terminate_partial()? });
            }
        }
        Ok(out)
    }

    /// FinalMerge: one accumulator recycled across keys with `reset`.
    fn final_merge(factory: &dyn EvaluatorFactory, records: Vec<ShuffleRecord>, global: bool) -> Result<GroupResults, FunctionError> {
        let eval = factory.bind(AggregationPhase::FinalMerge, &[factory.partial_type()])?;

        let mut keyed: IndexMap<String, (Vec<Value>, Vec<Value>)> = IndexMap::new();
        for record in records {
            let entry = keyed.entry(record.key).or_insert_with(|| (record.group, Vec::new()));
            entry.1.push(record.partial);
        }
        if keyed.is_empty() && global {
            keyed.insert(Helpers::canonical_tuple(&[])?, (Vec::new(), Vec::new()));
        }

        let mut acc = eval.new_accumulator();
        let mut out = GroupResults::with_capacity(keyed.len());
        for (key, (group, partials)) in keyed {
            acc.reset();
            for partial in &partials {
                acc.merge(partial)?;
            }
            out.insert(key, (group, acc.terminate()?));
        }
        Ok(out)
    }
}
