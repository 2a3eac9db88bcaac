//! Application state definitions

use super::notifications::ToastState;
use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Predefined forms the user can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormType {
    #[default]
    UserInfo,
    Address,
    Payment,
}

impl FormType {
    pub const ALL: [FormType; 3] = [Self::UserInfo, Self::Address, Self::Payment];

    pub fn next(&self) -> Self {
        match self {
            Self::UserInfo => Self::Address,
            Self::Address => Self::Payment,
            Self::Payment => Self::UserInfo,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::UserInfo => Self::Payment,
            Self::Address => Self::UserInfo,
            Self::Payment => Self::Address,
        }
    }

    /// Identifier used in configuration files and entries
    pub fn id(&self) -> &'static str {
        match self {
            Self::UserInfo => "userInfo",
            Self::Address => "address",
            Self::Payment => "payment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UserInfo => "User Information",
            Self::Address => "Address Information",
            Self::Payment => "Payment Information",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FormType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| anyhow!("unknown form type '{s}'"))
    }
}

/// Element of the screen receiving key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    FormTypeSelector,
    Field(usize),
    Submit,
    Entries,
}

impl Focus {
    /// Next element in Tab order
    pub fn next(&self, field_count: usize, has_entries: bool) -> Self {
        match *self {
            Self::FormTypeSelector if field_count > 0 => Self::Field(0),
            Self::FormTypeSelector => Self::Submit,
            Self::Field(i) if i + 1 < field_count => Self::Field(i + 1),
            Self::Field(_) => Self::Submit,
            Self::Submit if has_entries => Self::Entries,
            Self::Submit | Self::Entries => Self::FormTypeSelector,
        }
    }

    /// Previous element in Tab order
    pub fn prev(&self, field_count: usize, has_entries: bool) -> Self {
        match *self {
            Self::FormTypeSelector if has_entries => Self::Entries,
            Self::FormTypeSelector => Self::Submit,
            Self::Field(0) => Self::FormTypeSelector,
            Self::Field(i) => Self::Field((i - 1).min(field_count.saturating_sub(1))),
            Self::Submit if field_count > 0 => Self::Field(field_count - 1),
            Self::Submit => Self::FormTypeSelector,
            Self::Entries => Self::Submit,
        }
    }

    /// Pull focus back onto something that still exists
    pub fn clamp(&self, field_count: usize, has_entries: bool) -> Self {
        match *self {
            Self::Field(_) if field_count == 0 => Self::Submit,
            Self::Field(i) if i >= field_count => Self::Field(field_count - 1),
            Self::Entries if !has_entries => Self::Submit,
            other => other,
        }
    }
}

/// UI state that is not owned by the form session
#[derive(Debug, Default)]
pub struct AppState {
    pub focus: Focus,
    /// Highlighted row in the entries table
    pub selected_entry: usize,
    pub toasts: ToastState,
}

impl AppState {
    pub fn new(toasts: ToastState) -> Self {
        Self {
            toasts,
            ..Default::default()
        }
    }

    /// Move entry selection down
    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.selected_entry < max - 1 {
            self.selected_entry += 1;
        }
    }

    /// Move entry selection up
    pub fn move_selection_up(&mut self) {
        if self.selected_entry > 0 {
            self.selected_entry -= 1;
        }
    }

    /// Keep the selection inside a list of `len` entries
    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected_entry >= len {
            self.selected_entry = len.saturating_sub(1);
        }
    }
}
