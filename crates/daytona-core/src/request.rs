//! Typed action payloads. Field values arrive from form posts, so ids and
//! integers are accepted either as JSON numbers or as numeric strings, and an
//! empty string means "not supplied".

use crate::errors::ValidationError;
use crate::model::HostKind;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn parse<T: DeserializeOwned>(params: &Value) -> Result<T, ValidationError> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(params).map_err(|e| ValidationError::Malformed(e.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText {
    Int(i64),
    Text(String),
}

impl IntOrText {
    fn into_int(self) -> Result<Option<i64>, String> {
        match self {
            IntOrText::Int(n) => Ok(Some(n)),
            IntOrText::Text(s) if s.trim().is_empty() => Ok(None),
            IntOrText::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| format!("'{}' is not a valid number", s)),
        }
    }
}

fn optional_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    match Option::<IntOrText>::deserialize(d)? {
        None => Ok(None),
        Some(raw) => raw.into_int().map_err(D::Error::custom),
    }
}

/// Like `optional_int`, but `0` also means "no id" (a fresh record).
fn optional_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(optional_int(d)?.filter(|id| *id != 0))
}

/// A record id that must be present and numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match IntOrText::deserialize(d)?.into_int().map_err(D::Error::custom)? {
            Some(id) => Ok(RecordId(id)),
            None => Err(D::Error::custom("empty id")),
        }
    }
}

/// A form flag: present and not explicitly false. `false`, `0`, `"false"`,
/// `"0"` and `"off"` count as unset; any other value, `""` included, sets it.
fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => !matches!(s.trim(), "false" | "0" | "off"),
        Some(Value::Number(n)) => n.as_i64() != Some(0),
        Some(_) => true,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveFrameworkRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub framework_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub execution_script_location: String,
    #[serde(default, deserialize_with = "optional_int")]
    pub default_timeout: Option<i64>,
    #[serde(default)]
    pub argument_passing_format: Option<String>,
    #[serde(default)]
    pub execution_host: Option<String>,
    #[serde(default)]
    pub statistics_host: Option<String>,
    #[serde(default)]
    pub report_files: Vec<ReportFileSpec>,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportFileSpec {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// One framework argument row as submitted. `id` set means "update that row".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArgumentSpec {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub values: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub widget_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveTestRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub framework_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub test_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "optional_int")]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "optional_int")]
    pub timeout: Option<i64>,
    #[serde(default)]
    pub cc_list: Option<String>,
    /// Values keyed by framework argument id.
    #[serde(default)]
    pub argument_values: BTreeMap<String, Value>,
    #[serde(default)]
    pub execution: Option<String>,
    #[serde(default)]
    pub statistics: Option<String>,
    #[serde(default)]
    pub reserved: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub strace: bool,
    #[serde(default)]
    pub strace_process: Option<String>,
    #[serde(default, deserialize_with = "optional_int")]
    pub strace_delay: Option<i64>,
    #[serde(default, deserialize_with = "optional_int")]
    pub strace_duration: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    pub perf: bool,
    #[serde(default)]
    pub perf_process: Option<String>,
    #[serde(default, deserialize_with = "optional_int")]
    pub perf_delay: Option<i64>,
    #[serde(default, deserialize_with = "optional_int")]
    pub perf_duration: Option<i64>,
}

impl SaveTestRequest {
    pub fn argument_value(&self, framework_arg_id: i64) -> Option<String> {
        match self.argument_values.get(&framework_arg_id.to_string())? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn hosts(&self, kind: HostKind) -> Option<&str> {
        match kind {
            HostKind::Execution => self.execution.as_deref(),
            HostKind::Statistics => self.statistics.as_deref(),
            HostKind::Reserved => self.reserved.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteFrameworkRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub framework_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteTestRequest {
    #[serde(default, deserialize_with = "optional_id")]
    pub test_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteTestsRequest {
    #[serde(default)]
    pub test_ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SetUserFrameworksRequest {
    #[serde(default)]
    pub frameworks: Vec<FrameworkToggle>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameworkToggle {
    pub framework_id: RecordId,
    #[serde(default, deserialize_with = "flag")]
    pub checked: bool,
}
