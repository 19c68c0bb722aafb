// ── Declarative form fields ──
//
// A `FieldDescriptor` describes one editable attribute of a record. The
// generic form renderer switches on `Widget`; validation and coercion of
// raw text input live here so the CLI and TUI share them.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Number, Value};

/// One choice of a select widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Input widget kind, with its per-kind configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Text,
    TextArea,
    Email,
    Number { min: Option<f64>, max: Option<f64> },
    Date,
    Select { options: Vec<SelectOption> },
}

impl Widget {
    /// Select widget whose values double as labels.
    pub fn select(values: &[&str]) -> Self {
        Self::Select {
            options: values.iter().map(|v| SelectOption::new(*v, *v)).collect(),
        }
    }

    /// Select widget from `(value, label)` pairs.
    pub fn choices(pairs: &[(&str, &str)]) -> Self {
        Self::Select {
            options: pairs
                .iter()
                .map(|(value, label)| SelectOption::new(*value, *label))
                .collect(),
        }
    }

    pub fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Email => "email",
            Self::Number { .. } => "number",
            Self::Date => "date",
            Self::Select { .. } => "select",
        }
    }
}

/// A validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Validator {
    Required { message: String },
    Email { message: String },
    Range { min: Option<f64>, max: Option<f64> },
}

/// Declarative description of one editable record attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub validators: Vec<Validator>,
    pub widget: Widget,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, widget: Widget) -> Self {
        let mut field = Self {
            name: name.into(),
            label: label.into(),
            validators: Vec::new(),
            widget,
        };
        if let Widget::Email = field.widget {
            field.validators.push(Validator::Email {
                message: "Invalid email address".into(),
            });
        }
        if let Widget::Number { min, max } = field.widget {
            if min.is_some() || max.is_some() {
                field.validators.push(Validator::Range { min, max });
            }
        }
        field
    }

    /// Mark the field as required, with the default message.
    pub fn required(mut self) -> Self {
        let message = format!("Please enter {}", self.label.to_lowercase());
        self.validators.insert(0, Validator::Required { message });
        self
    }

    pub fn is_required(&self) -> bool {
        self.validators
            .iter()
            .any(|v| matches!(v, Validator::Required { .. }))
    }

    /// Validate raw text input, returning the first failing rule's message.
    pub fn validate(&self, raw: &str) -> Result<(), String> {
        let value = raw.trim();

        if value.is_empty() {
            return match self.validators.iter().find_map(|v| match v {
                Validator::Required { message } => Some(message.clone()),
                _ => None,
            }) {
                Some(message) => Err(message),
                None => Ok(()),
            };
        }

        match &self.widget {
            Widget::Number { .. } => {
                if value.parse::<f64>().is_err() {
                    return Err(format!("{} must be a number", self.label));
                }
            }
            Widget::Date => {
                if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    return Err(format!("{} must be a date (YYYY-MM-DD)", self.label));
                }
            }
            Widget::Select { options } => {
                if !options.iter().any(|o| o.value == value) {
                    let allowed: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                    return Err(format!(
                        "{} must be one of: {}",
                        self.label,
                        allowed.join(", ")
                    ));
                }
            }
            Widget::Text | Widget::TextArea | Widget::Email => {}
        }

        for rule in &self.validators {
            match rule {
                Validator::Required { .. } => {}
                Validator::Email { message } => {
                    if !looks_like_email(value) {
                        return Err(message.clone());
                    }
                }
                Validator::Range { min, max } => {
                    let Ok(n) = value.parse::<f64>() else {
                        return Err(format!("{} must be a number", self.label));
                    };
                    if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                        return Err(format!(
                            "{} must be between {} and {}",
                            self.label,
                            min.map_or_else(|| "-inf".into(), |m| m.to_string()),
                            max.map_or_else(|| "inf".into(), |m| m.to_string()),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Turn raw text input into the JSON value sent to the backend.
    ///
    /// Empty numbers, dates and selects become `null`; text stays text.
    pub fn coerce(&self, raw: &str) -> Value {
        let value = raw.trim();
        match &self.widget {
            Widget::Text | Widget::TextArea | Widget::Email => Value::String(value.to_owned()),
            _ if value.is_empty() => Value::Null,
            Widget::Number { .. } => {
                if let Ok(n) = value.parse::<i64>() {
                    Value::Number(n.into())
                } else {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map_or_else(|| Value::String(value.to_owned()), Value::Number)
                }
            }
            Widget::Date | Widget::Select { .. } => Value::String(value.to_owned()),
        }
    }

    /// Option values of a select widget, empty otherwise.
    pub fn options(&self) -> &[SelectOption] {
        match &self.widget {
            Widget::Select { options } => options,
            _ => &[],
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_rejects_blank_input() {
        let field = FieldDescriptor::new("name", "Name", Widget::Text).required();
        assert_eq!(field.validate("   "), Err("Please enter name".into()));
        assert_eq!(field.validate("An"), Ok(()));
    }

    #[test]
    fn optional_blank_input_is_valid() {
        let field = FieldDescriptor::new("start_date", "Start date", Widget::Date);
        assert_eq!(field.validate(""), Ok(()));
        assert_eq!(field.coerce(""), Value::Null);
    }

    #[test]
    fn email_widget_carries_email_rule() {
        let field = FieldDescriptor::new("email", "Email", Widget::Email).required();
        assert!(field.validate("not-an-email").is_err());
        assert!(field.validate("a@b").is_err());
        assert_eq!(field.validate("an.nguyen@company.com"), Ok(()));
    }

    #[test]
    fn number_range_is_enforced() {
        let field = FieldDescriptor::new(
            "progress",
            "Progress",
            Widget::Number {
                min: Some(0.0),
                max: Some(100.0),
            },
        );
        assert!(field.validate("101").is_err());
        assert!(field.validate("abc").is_err());
        assert_eq!(field.validate("75"), Ok(()));
        assert_eq!(field.coerce("75"), json!(75));
        assert_eq!(field.coerce("12.5"), json!(12.5));
    }

    #[test]
    fn select_must_match_an_option() {
        let field = FieldDescriptor::new("type", "Type", Widget::select(&["income", "expense"]));
        assert!(field.validate("refund").is_err());
        assert_eq!(field.validate("income"), Ok(()));
        assert_eq!(field.options().len(), 2);
    }

    #[test]
    fn date_must_be_iso() {
        let field = FieldDescriptor::new("date", "Date", Widget::Date).required();
        assert!(field.validate("15/06/2024").is_err());
        assert_eq!(field.validate("2024-06-15"), Ok(()));
        assert_eq!(field.coerce("2024-06-15"), json!("2024-06-15"));
    }
}
