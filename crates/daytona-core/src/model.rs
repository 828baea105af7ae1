use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Framework,
    Test,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Framework => "framework",
            EntityKind::Test => "test",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkRow {
    pub framework_id: i64,
    pub framework_name: String,
    pub framework_owner: String,
    pub title: Option<String>,
    pub purpose: Option<String>,
    pub product_name: Option<String>,
    pub execution_script_location: String,
    pub default_timeout: i64,
    pub argument_passing_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkArgumentRow {
    pub framework_arg_id: i64,
    pub framework_id: i64,
    pub argument_name: String,
    pub argument_default: Option<String>,
    pub argument_values: Option<String>,
    pub argument_description: Option<String>,
    pub widget_type: Option<String>,
    pub argument_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRow {
    pub test_id: i64,
    pub framework_id: i64,
    pub username: String,
    pub title: Option<String>,
    pub end_status: String,
}

impl TestRow {
    pub fn is_imported(&self) -> bool {
        self.end_status == TestStatus::Imported.as_str()
    }
}

/// Lifecycle label stored in `tests.end_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    New,
    Scheduled,
    Imported,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::New => "new",
            TestStatus::Scheduled => "scheduled",
            TestStatus::Imported => "imported",
        }
    }
}

/// Role a host plays for a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Execution,
    Statistics,
    Reserved,
}

impl HostKind {
    pub const ALL: [HostKind; 3] = [HostKind::Execution, HostKind::Statistics, HostKind::Reserved];

    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Execution => "execution",
            HostKind::Statistics => "statistics",
            HostKind::Reserved => "reserved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilerKind {
    /// strace
    Tracing,
    /// perf
    Sampling,
}

impl ProfilerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfilerKind::Tracing => "STRACE",
            ProfilerKind::Sampling => "PERF",
        }
    }
}

pub const QUEUE_STATE_SCHEDULED: &str = "scheduled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkSummary {
    pub framework_id: i64,
    pub framework_name: String,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub test_id: i64,
    pub framework_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTest {
    pub test_id: i64,
    pub framework_id: i64,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkVisibility {
    pub framework_id: i64,
    pub visible: bool,
}
