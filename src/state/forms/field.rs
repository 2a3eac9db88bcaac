//! Form field value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input kind of a configured field.
///
/// `text` and `dropdown` get dedicated handling; every other tag (`email`,
/// `number`, `password`, ...) is kept verbatim and rendered as a text input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Dropdown,
    Input(String),
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => Self::Text,
            "dropdown" => Self::Dropdown,
            _ => Self::Input(tag),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Dropdown => "dropdown",
            Self::Input(tag) => tag,
        }
    }

    pub fn is_dropdown(&self) -> bool {
        matches!(self, Self::Dropdown)
    }

    /// Whether typed input should be masked on screen
    pub fn is_masked(&self) -> bool {
        self.as_str() == "password"
    }

    /// Whether a typed character is acceptable for this kind
    pub fn accepts_char(&self, c: char) -> bool {
        match self.as_str() {
            "number" => c.is_ascii_digit() || c == '.' || c == '-',
            "tel" => c.is_ascii_digit() || "+-() ".contains(c),
            _ => !c.is_control(),
        }
    }
}

/// Static description of one input slot in a form configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldSpec {
    /// Create a new text field
    pub fn text(name: &str, label: &str, required: bool) -> Self {
        Self::input("text", name, label, required)
    }

    /// Create a field with a free-form input type tag
    pub fn input(kind: &str, name: &str, label: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::from(kind.to_string()),
            label: label.to_string(),
            required,
            options: None,
        }
    }

    /// Create a new dropdown field
    pub fn dropdown(name: &str, label: &str, required: bool, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Dropdown,
            label: label.to_string(),
            required,
            options: Some(options.iter().map(|o| o.to_string()).collect()),
        }
    }

    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Placeholder shown while the field has no value
    pub fn placeholder(&self) -> String {
        if self.kind.is_dropdown() {
            format!("Select {}", self.label)
        } else {
            format!("Enter {}", self.label)
        }
    }

    /// Option after `current`; `None` is the placeholder slot before the first option
    pub fn next_option(&self, current: Option<&str>) -> Option<&str> {
        let options = self.options();
        let next = match current.and_then(|c| options.iter().position(|o| o == c)) {
            None => options.first(),
            Some(i) => options.get(i + 1),
        };
        next.map(String::as_str)
    }

    /// Option before `current`, wrapping through the placeholder slot
    pub fn prev_option(&self, current: Option<&str>) -> Option<&str> {
        let options = self.options();
        let prev = match current.and_then(|c| options.iter().position(|o| o == c)) {
            None => options.last(),
            Some(0) => None,
            Some(i) => options.get(i - 1),
        };
        prev.map(String::as_str)
    }
}

/// Scalar answer stored for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Whether the value counts as an answer (empty text, zero and NaN do not)
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    /// Text value with `c` appended
    pub fn with_char(&self, c: char) -> FieldValue {
        let mut text = self.to_string();
        text.push(c);
        FieldValue::Text(text)
    }

    /// Text value with the last character removed
    pub fn without_last_char(&self) -> FieldValue {
        let mut text = self.to_string();
        text.pop();
        FieldValue::Text(text)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}
