use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value as JsonValue};

// ---------------------------------------------------------------------------
// Value – a single cell of a raw table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as delivered by the API or read back from the
/// CSV cache.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Numeric view of the cell. Numeric-looking strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if v.is_finite() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Integer view of the cell; floats are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v as i64)
                })
            }
            other => other.as_f64().map(|v| v as i64),
        }
    }

    /// Text view of the cell. Null and blank strings are treated as missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Bool(b) => Some(b.to_string()),
        }
    }

    /// Cache representation. Floats keep a decimal point so they read back
    /// as floats; null becomes an empty cell.
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(v) => format!("{v:?}"),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
        }
    }

    /// Guess the type of a CSV cell. This reverses [`Value::to_csv_field`]
    /// for every non-string cell; a string that looks numeric or boolean
    /// (`"01234"`, `"true"`) reads back as that type.
    pub fn from_csv_field(s: &str) -> Value {
        if s.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
        if s == "true" || s == "false" {
            return Value::Bool(s == "true");
        }
        Value::String(s.to_string())
    }
}

impl From<&JsonValue> for Value {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::String(n.to_string())
                }
            }
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Null => Value::Null,
            other => Value::String(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the raw tabular dataset for one API table
// ---------------------------------------------------------------------------

/// One JSON object as returned by the API.
pub type JsonRow = Map<String, JsonValue>;

/// A flat table: ordered column names and rows aligned with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from API rows. Columns appear in first-seen order;
    /// keys missing from a row become [`Value::Null`].
    pub fn from_json_rows(rows: &[JsonRow]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            for key in row.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = rows
            .iter()
            .map(|row| {
                let mut cells = vec![Value::Null; columns.len()];
                for (key, val) in row {
                    cells[index[key]] = Value::from(val);
                }
                cells
            })
            .collect();

        Table { columns, rows }
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One cleaned row of the emissions-by-source table.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    pub facility_id: Option<i64>,
    pub reporting_year: i32,
    pub industry_segment: String,
    pub reporting_category: Option<String>,
    /// Total reported CH4 emissions (metric tons).
    pub ch4_emissions: f64,
    /// Title-cased basin name, `"Unknown"` when not reported.
    pub basin: String,
}

/// One row of the emitter facilities table, reduced to the join attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub facility_id: i64,
    pub parent_company: Option<String>,
    pub state: Option<String>,
}

/// Facilities keyed by id for the many-to-one join.
pub type FacilityIndex = HashMap<i64, FacilityRecord>;
