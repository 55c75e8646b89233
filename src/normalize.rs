use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::drug::{Category, Drug};
use crate::ingest::IngestError;

/// A loosely typed input row keyed by column name.
pub type RawRecord = BTreeMap<String, String>;

/// Column names accepted for the drug name, in priority order.
pub const NAME_ALIASES: [&str; 2] = ["Drug Name", "name"];

/// Maps raw rows onto the fixed drug schema.
///
/// Every record keeps its input position as `id`, so ids of later records are
/// unaffected when earlier rows are dropped for carrying no attribute text.
pub fn normalize_records(records: &[RawRecord]) -> Vec<Drug> {
    let drugs: Vec<Drug> = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(index, record))
        .filter(|drug| {
            let keep = drug.has_any_attribute();
            if !keep {
                log::debug!("dropping record {} ({}): no attribute text", drug.id, drug.name);
            }
            keep
        })
        .collect();

    log::info!(
        "normalized {} of {} records into drugs",
        drugs.len(),
        records.len()
    );

    drugs
}

/// Normalizes a JSON document that must be an array of objects.
///
/// # Errors
/// Returns [`IngestError::MalformedInput`] when the document is not an array or
/// when any element is not an object.
pub fn normalize_value(value: Value) -> Result<Vec<Drug>, IngestError> {
    let records = records_from_value(value)?;
    Ok(normalize_records(&records))
}

pub(crate) fn records_from_value(value: Value) -> Result<Vec<RawRecord>, IngestError> {
    let Value::Array(items) = value else {
        return Err(IngestError::MalformedInput {
            reason: "JSON must be an array of objects".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(record_from_object(fields)),
            _ => Err(IngestError::MalformedInput {
                reason: format!("JSON array element {} is not an object", index + 1),
            }),
        })
        .collect()
}

fn record_from_object(fields: Map<String, Value>) -> RawRecord {
    fields
        .into_iter()
        .map(|(key, value)| (key.trim().to_string(), stringify(value)))
        .collect()
}

fn stringify(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn normalize_record(index: usize, record: &RawRecord) -> Drug {
    let name = first_match(record, &NAME_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Drug {}", index + 1));

    let mut drug = Drug {
        id: index,
        name,
        moa: String::new(),
        indications: String::new(),
        adverse: String::new(),
        interactions: String::new(),
        contraindications: String::new(),
    };

    for category in Category::ALL {
        if let Some(text) = first_match(record, &category.aliases()) {
            *drug.attribute_mut(category) = text.to_string();
        }
    }

    drug
}

fn first_match<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}
