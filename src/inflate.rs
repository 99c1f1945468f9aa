//! Reshaping helpers for downloaded documents.
//!
//! Data documents carry their measurements in a columnar `data` field (outer
//! index = variable, inner index = level), with variable names and per-variable
//! properties described by a `data_info` triple that may live on the data
//! document itself or on its paired metadata document.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Resolves a key that may appear on either a data document or its paired
/// metadata document.
///
/// The data document's copy wins when both carry the key. When the lookup
/// falls through to the metadata document, the pair is validated first: if
/// both documents carry mutual identity references (the data document's
/// `metadata` field vs the metadata document's `_id`), they must agree.
pub fn find_key<'a>(
    key: &str,
    data_doc: &'a Value,
    metadata_doc: Option<&'a Value>,
) -> Result<&'a Value> {
    if let Some(value) = data_doc.get(key) {
        return Ok(value);
    }

    let metadata_ref = data_doc.get("metadata");
    let Some(meta) = metadata_doc else {
        return Err(Error::MissingMetadata(display_id(metadata_ref)));
    };

    if let (Some(data_ref), Some(meta_id)) = (metadata_ref, meta.get("_id")) {
        if data_ref != meta_id {
            return Err(Error::MismatchedDocuments {
                expected: display_id(Some(data_ref)),
                got: display_id(Some(meta_id)),
            });
        }
    }

    meta.get(key)
        .ok_or_else(|| Error::KeyNotFound(key.to_string()))
}

/// Reinflates the columnar `data` field of a data document into per-level
/// mappings from variable name to value.
pub fn data_inflate(
    data_doc: &Value,
    metadata_doc: Option<&Value>,
) -> Result<Vec<Map<String, Value>>> {
    let info = DataInfo::resolve(data_doc, metadata_doc)?;
    let data = data_doc
        .get("data")
        .ok_or_else(|| Error::KeyNotFound("data".to_string()))?
        .as_array()
        .ok_or(Error::Malformed("data is not a list of per-variable lists"))?;

    if data.len() != info.names.len() {
        return Err(Error::ShapeMismatch {
            data: data.len(),
            names: info.names.len(),
        });
    }

    let columns = data
        .iter()
        .map(|column| {
            column
                .as_array()
                .ok_or(Error::Malformed("data column is not a list"))
        })
        .collect::<Result<Vec<_>>>()?;

    // Transpose: per-variable columns become per-level rows.
    let levels = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut inflated = Vec::with_capacity(levels);
    for level in 0..levels {
        let mut row = Map::new();
        for (name, column) in info.names.iter().zip(&columns) {
            row.insert((*name).to_string(), column[level].clone());
        }
        inflated.push(row);
    }
    Ok(inflated)
}

/// Maps each variable name to its units, read from the `data_info` triple.
pub fn units_inflate(data_doc: &Value, metadata_doc: Option<&Value>) -> Result<Map<String, Value>> {
    let info = DataInfo::resolve(data_doc, metadata_doc)?;
    let units_pos = info
        .properties
        .iter()
        .position(|p| *p == "units")
        .ok_or(Error::Malformed("data_info carries no units property"))?;

    let mut units = Map::new();
    for (i, name) in info.names.iter().enumerate() {
        let value = info
            .values
            .get(i)
            .and_then(Value::as_array)
            .and_then(|props| props.get(units_pos))
            .ok_or(Error::Malformed(
                "data_info property values are not aligned with variable names",
            ))?;
        units.insert((*name).to_string(), value.clone());
    }
    Ok(units)
}

/// The `[variableNames, propertyNames, propertyValuesPerVariable]` triple.
struct DataInfo<'a> {
    names: Vec<&'a str>,
    properties: Vec<&'a str>,
    values: &'a [Value],
}

impl<'a> DataInfo<'a> {
    fn resolve(data_doc: &'a Value, metadata_doc: Option<&'a Value>) -> Result<Self> {
        let info = find_key("data_info", data_doc, metadata_doc)?
            .as_array()
            .ok_or(Error::Malformed("data_info is not a list"))?;

        let names = str_list(info.first(), "data_info variable names are not strings")?;
        let properties = str_list(info.get(1), "data_info property names are not strings")?;
        let values = info
            .get(2)
            .and_then(Value::as_array)
            .ok_or(Error::Malformed("data_info property values are not a list"))?;

        Ok(Self {
            names,
            properties,
            values,
        })
    }
}

fn str_list<'a>(value: Option<&'a Value>, err: &'static str) -> Result<Vec<&'a str>> {
    let items = value.and_then(Value::as_array).ok_or(Error::Malformed(err))?;
    items
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::Malformed(err))
}

fn display_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<unknown>".to_string(),
    }
}
