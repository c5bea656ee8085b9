//! Form association.
//!
//! A form-associated control exposes a name, a scalar value and a
//! [`ValidityReport`]. Validity is never stored on its own: it is derived
//! on every call from the control's `required` flag, its current value and
//! an optional custom message, with the custom message taking precedence.

use glint_core::Property;

use crate::widget::targets;

/// Whether a control satisfies its constraints, and why not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidityReport {
    /// `true` when `message` is empty.
    pub valid: bool,
    /// The validation message; empty when valid.
    pub message: String,
}

impl ValidityReport {
    /// Derive a report.
    ///
    /// `message = custom` if `custom` is non-empty, otherwise
    /// `required_message` if the control is required and empty, otherwise `""`.
    pub fn evaluate(custom: &str, required: bool, value_is_empty: bool, required_message: &str) -> Self {
        let message = if !custom.is_empty() {
            custom.to_owned()
        } else if required && value_is_empty {
            required_message.to_owned()
        } else {
            String::new()
        };
        Self {
            valid: message.is_empty(),
            message,
        }
    }

    /// A valid report.
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }
}

/// The custom-message half of a control's validity.
#[derive(Debug, Default)]
pub struct Validity {
    custom: Property<String>,
}

impl Validity {
    /// A validity with no custom message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the custom message; the empty string clears it. Returns whether it changed.
    pub fn set_custom(&self, message: &str) -> bool {
        self.custom.set(message.to_owned())
    }

    /// The current custom message.
    pub fn custom(&self) -> String {
        self.custom.get()
    }

    /// Derive a report from the control's current state.
    pub fn report(&self, required: bool, value_is_empty: bool, required_message: &str) -> ValidityReport {
        self.custom
            .with(|custom| ValidityReport::evaluate(custom, required, value_is_empty, required_message))
    }
}

/// A control that takes part in form submission and validation.
pub trait FormAssociated: Send + Sync {
    /// The name the value is submitted under.
    fn form_name(&self) -> Option<String>;

    /// The current value, or `None` when empty.
    fn form_value(&self) -> Option<String>;

    /// Derive the current validity.
    fn report_validity(&self) -> ValidityReport;

    /// Override the validity outcome; the empty string clears the override.
    fn set_custom_validity(&self, message: &str);

    /// Shorthand for `report_validity().valid`.
    fn check_validity(&self) -> bool {
        self.report_validity().valid
    }
}

/// Name/value pairs gathered from a set of controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Collect the entries of every control that has both a name and a value.
    pub fn collect(controls: &[&dyn FormAssociated]) -> Self {
        let entries = controls
            .iter()
            .filter_map(|control| Some((control.form_name()?, control.form_value()?)))
            .collect();
        Self { entries }
    }

    /// The first value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All entries in control order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validate every control, returning the reports of the invalid ones with
/// their position in `controls`.
pub fn check_all(controls: &[&dyn FormAssociated]) -> Vec<(usize, ValidityReport)> {
    let invalid: Vec<_> = controls
        .iter()
        .enumerate()
        .map(|(index, control)| (index, control.report_validity()))
        .filter(|(_, report)| !report.valid)
        .collect();
    if !invalid.is_empty() {
        tracing::debug!(target: targets::FORM, invalid = invalid.len(), total = controls.len(), "form validation failed");
    }
    invalid
}
