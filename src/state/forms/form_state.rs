//! Form configuration, answer maps and committed entries

use super::field::{FieldSpec, FieldValue};
use crate::state::FormType;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-progress answers keyed by field name
pub type AnswerMap = BTreeMap<String, FieldValue>;

/// Validation messages keyed by field name
pub type ErrorMap = BTreeMap<String, String>;

/// Ordered field layout for one form type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub fields: Vec<FieldSpec>,
}

impl FormConfig {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Position of a field in display order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A committed, timestamped snapshot of answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    /// Creation time in unix milliseconds
    pub timestamp: i64,
    pub form_type: FormType,
    #[serde(flatten)]
    pub values: AnswerMap,
}

impl Entry {
    /// Create an entry with a fresh id stamped with the current time
    pub fn new(form_type: FormType, values: AnswerMap) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            form_type,
            values,
        }
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Creation time in the local timezone
    pub fn submitted_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }
}
