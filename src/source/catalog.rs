//! Built-in form catalog
//!
//! Serves the field layout for every form type from memory after a small
//! artificial delay. A `forms.json` in the config directory can replace
//! individual forms; its shape is an object keyed by form type id:
//!
//! ```json
//! { "address": { "fields": [ { "name": "city", "type": "text", "label": "City", "required": true } ] } }
//! ```

use super::traits::ConfigSource;
use crate::config::AppConfig;
use crate::state::{FieldSpec, FormConfig, FormType};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// In-memory configuration source
#[derive(Debug, Clone)]
pub struct CatalogSource {
    forms: HashMap<FormType, FormConfig>,
    latency: Duration,
    /// Why the `forms.json` overrides were ignored, if they were
    override_error: Option<String>,
}

impl CatalogSource {
    /// Catalog with the stock user, address and payment forms
    pub fn builtin() -> Self {
        let forms = FormType::ALL
            .into_iter()
            .map(|form_type| (form_type, builtin_form(form_type)))
            .collect();
        Self {
            forms,
            latency: Duration::ZERO,
            override_error: None,
        }
    }

    /// Built-in catalog merged with the user's `forms.json`, if any
    pub fn load(config: &AppConfig) -> Self {
        let catalog = Self::builtin().with_latency(config.simulated_latency());
        match AppConfig::forms_path() {
            Some(path) if path.exists() => catalog.with_overrides(&path),
            _ => catalog,
        }
    }

    /// Apply overrides from `path`; a broken file leaves the catalog as it was
    pub fn with_overrides(mut self, path: &Path) -> Self {
        if let Err(err) = self.merge_file(path) {
            tracing::warn!("Using built-in forms: {err:#}");
            self.override_error = Some(format!("{err:#}"));
        }
        self
    }

    /// Reason the form overrides were rejected
    pub fn override_error(&self) -> Option<&str> {
        self.override_error.as_deref()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replace forms with the ones defined in a JSON file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let count = self
            .merge_json(&content)
            .with_context(|| format!("Invalid form catalog {}", path.display()))?;
        tracing::info!("Loaded {count} form override(s) from {}", path.display());
        Ok(())
    }

    /// Replace forms with the ones defined in `json`; returns how many were replaced
    pub fn merge_json(&mut self, json: &str) -> Result<usize> {
        let overrides: HashMap<String, FormConfig> = serde_json::from_str(json)?;
        let parsed = overrides
            .into_iter()
            .map(|(id, form)| -> Result<(FormType, FormConfig)> {
                check_form(&form).with_context(|| format!("Form '{id}' is invalid"))?;
                Ok((id.parse::<FormType>()?, form))
            })
            .collect::<Result<Vec<_>>>()?;
        let count = parsed.len();
        self.forms.extend(parsed);
        Ok(count)
    }
}

#[async_trait]
impl ConfigSource for CatalogSource {
    async fn fetch_form_config(&self, form_type: FormType) -> Result<FormConfig> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.forms
            .get(&form_type)
            .cloned()
            .ok_or_else(|| anyhow!("No configuration for form type {form_type}"))
    }
}

/// Field names must be unique and only dropdowns carry options
fn check_form(form: &FormConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for field in &form.fields {
        if !seen.insert(field.name.as_str()) {
            bail!("duplicate field name '{}'", field.name);
        }
        match (&field.options, field.kind.is_dropdown()) {
            (Some(options), true) if !options.is_empty() => {}
            (_, true) => bail!("dropdown '{}' has no options", field.name),
            (Some(_), false) => bail!("field '{}' has options but is not a dropdown", field.name),
            (None, false) => {}
        }
    }
    Ok(())
}

fn builtin_form(form_type: FormType) -> FormConfig {
    let fields = match form_type {
        FormType::UserInfo => vec![
            FieldSpec::text("firstName", "First Name", true),
            FieldSpec::text("lastName", "Last Name", true),
            FieldSpec::input("email", "email", "Email", true),
            FieldSpec::input("tel", "phone", "Phone Number", false),
            FieldSpec::input("number", "age", "Age", false),
            FieldSpec::dropdown(
                "gender",
                "Gender",
                false,
                &["Male", "Female", "Other", "Prefer not to say"],
            ),
        ],
        FormType::Address => vec![
            FieldSpec::text("street", "Street Address", true),
            FieldSpec::text("city", "City", true),
            FieldSpec::text("state", "State / Province", true),
            FieldSpec::text("zipCode", "ZIP / Postal Code", true),
            FieldSpec::dropdown(
                "country",
                "Country",
                true,
                &["United States", "Canada", "United Kingdom", "Germany", "Japan", "Other"],
            ),
        ],
        FormType::Payment => vec![
            FieldSpec::text("cardholderName", "Cardholder Name", true),
            FieldSpec::text("cardNumber", "Card Number", true),
            FieldSpec::text("expiryDate", "Expiry Date (MM/YY)", true),
            FieldSpec::input("password", "cvv", "CVV", true),
            FieldSpec::dropdown(
                "paymentMethod",
                "Payment Method",
                true,
                &["Credit Card", "Debit Card", "PayPal"],
            ),
        ],
    };
    FormConfig::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_has_every_form_type() {
        let catalog = CatalogSource::builtin();
        for form_type in FormType::ALL {
            let form = catalog.forms.get(&form_type).unwrap();
            assert!(form.field_count() > 0);
            assert!(form.required_fields().count() > 0);
        }
    }

    #[test]
    fn test_builtin_field_names_are_unique() {
        for form_type in FormType::ALL {
            let form = builtin_form(form_type);
            let mut names: Vec<_> = form.fields.iter().map(|f| f.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), form.field_count());
        }
    }

    #[test]
    fn test_only_dropdowns_have_options() {
        for form_type in FormType::ALL {
            for field in builtin_form(form_type).fields {
                assert_eq!(field.kind.is_dropdown(), field.options.is_some());
            }
        }
    }

    #[test]
    fn test_fetch_returns_requested_form() {
        let catalog = CatalogSource::builtin();
        let form = tokio_test::block_on(catalog.fetch_form_config(FormType::Address)).unwrap();
        assert_eq!(form, builtin_form(FormType::Address));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_latency() {
        let catalog = CatalogSource::builtin().with_latency(Duration::from_millis(300));
        let started = tokio::time::Instant::now();
        catalog.fetch_form_config(FormType::Payment).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_fetch_missing_form_fails() {
        let mut catalog = CatalogSource::builtin();
        catalog.forms.remove(&FormType::Payment);
        let result = tokio_test::block_on(catalog.fetch_form_config(FormType::Payment));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_json_replaces_named_forms() {
        let mut catalog = CatalogSource::builtin();
        let json = r#"{"address":{"fields":[{"name":"city","type":"text","label":"City","required":true}]}}"#;

        assert_eq!(catalog.merge_json(json).unwrap(), 1);
        assert_eq!(
            catalog.forms.get(&FormType::Address),
            Some(&FormConfig::new(vec![FieldSpec::text("city", "City", true)]))
        );
        assert_eq!(
            catalog.forms.get(&FormType::UserInfo),
            Some(&builtin_form(FormType::UserInfo))
        );
    }

    #[test]
    fn test_merge_json_rejects_unknown_form_type() {
        let mut catalog = CatalogSource::builtin();
        let json = r#"{"shipping":{"fields":[]}}"#;
        assert!(catalog.merge_json(json).is_err());
    }

    #[test]
    fn test_merge_json_rejects_duplicate_field_names() {
        let mut catalog = CatalogSource::builtin();
        let json = r#"{"address":{"fields":[
            {"name":"city","type":"text","label":"City"},
            {"name":"city","type":"text","label":"Town"}
        ]}}"#;

        assert!(catalog.merge_json(json).is_err());
        assert_eq!(
            catalog.forms.get(&FormType::Address),
            Some(&builtin_form(FormType::Address))
        );
    }

    #[test]
    fn test_merge_json_rejects_misplaced_options() {
        let mut catalog = CatalogSource::builtin();
        let options_on_text = r#"{"payment":{"fields":[{"name":"cvv","type":"text","label":"CVV","options":["1"]}]}}"#;
        let dropdown_without_options = r#"{"payment":{"fields":[{"name":"method","type":"dropdown","label":"Method"}]}}"#;

        assert!(catalog.merge_json(options_on_text).is_err());
        assert!(catalog.merge_json(dropdown_without_options).is_err());
        assert_eq!(
            catalog.forms.get(&FormType::Payment),
            Some(&builtin_form(FormType::Payment))
        );
    }

    #[test]
    fn test_malformed_override_file_keeps_builtin_forms() {
        let path = std::env::temp_dir().join(format!("formdeck-forms-{}.json", std::process::id()));
        std::fs::write(&path, "{not json").unwrap();
        let catalog = CatalogSource::builtin().with_overrides(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(catalog.override_error().is_some());
        for form_type in FormType::ALL {
            assert_eq!(catalog.forms.get(&form_type), Some(&builtin_form(form_type)));
        }
    }

    #[test]
    fn test_valid_override_file_is_applied() {
        let path = std::env::temp_dir().join(format!("formdeck-forms-ok-{}.json", std::process::id()));
        let json = r#"{"address":{"fields":[{"name":"city","type":"text","label":"City","required":true}]}}"#;
        std::fs::write(&path, json).unwrap();
        let catalog = CatalogSource::builtin().with_overrides(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(catalog.override_error(), None);
        assert_eq!(catalog.forms.get(&FormType::Address).unwrap().field_count(), 1);
    }

    #[test]
    fn test_merge_file_missing_path_fails() {
        let mut catalog = CatalogSource::builtin();
        assert!(catalog
            .merge_file(Path::new("/nonexistent/formdeck/forms.json"))
            .is_err());
    }
}
