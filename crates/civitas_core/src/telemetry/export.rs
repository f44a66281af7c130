use super::ExperimentRun;
use crate::error::TelemetryError;
use serde_json::Value;

/// The whole run as pretty-printed JSON.
pub fn to_json(run: &ExperimentRun) -> Result<String, TelemetryError> {
    Ok(serde_json::to_string_pretty(run)?)
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format!("\"{}\"", s.replace('"', "\"\"")),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// One row per snapshot over its scalar fields, in declaration order.
///
/// Nested maps and lists are left out.
pub fn to_csv(run: &ExperimentRun) -> Result<String, TelemetryError> {
    let rows = run
        .snapshots
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;

    let Some(Value::Object(first)) = rows.first() else {
        return Err(TelemetryError::EmptyRun {
            run_id: run.run_id.clone(),
        });
    };
    let columns: Vec<&String> = first
        .iter()
        .filter(|(_, v)| is_scalar(v))
        .map(|(k, _)| k)
        .collect();

    let mut out = columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(",");
    out.push('\n');
    for row in &rows {
        let line = columns
            .iter()
            .map(|c| csv_cell(row.get(c.as_str())))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
