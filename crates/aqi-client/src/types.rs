use serde::{Deserialize, Deserializer, Serialize};

/// A place candidate returned by place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "place_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl Place {
    /// Option label, e.g. "London - UK"
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.description)
    }
}

/// A reading value is either numeric or a pre-formatted string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Whole numbers print without a trailing ".0"
            ReadingValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            ReadingValue::Number(n) => write!(f, "{}", n),
            ReadingValue::Text(s) => f.write_str(s),
        }
    }
}

/// One measured air-quality metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique key within a reading list (e.g. "pm25")
    pub kind: String,
    pub name: String,
    pub value: ReadingValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Display color hint, e.g. "#0f0"
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
}

impl Reading {
    /// Unit to display, skipping blank units.
    pub fn unit_label(&self) -> Option<&str> {
        self.unit.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Sparse upstream entries send `null` where a field is blank.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `current_air_condition` payload (only the parts we consume).
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentConditions {
    pub latest: Option<LatestConditions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatestConditions {
    #[serde(default)]
    pub readings: Vec<Reading>,
}
