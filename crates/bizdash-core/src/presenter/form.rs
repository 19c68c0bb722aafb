// ── Form draft ──
//
// Raw text input for the create/update modal, keyed by field name.
// Validation and coercion defer to each `FieldDescriptor`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::model::{FieldDescriptor, Record, display_value};

/// Per-field validation messages, in form order.
pub type FieldErrors = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    values: IndexMap<String, String>,
}

impl FormDraft {
    /// One blank entry per field.
    pub fn empty(fields: &[FieldDescriptor]) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| (f.name.clone(), String::new()))
                .collect(),
        }
    }

    /// Pre-populate from an existing record. Missing and null fields are blank.
    pub fn from_record(fields: &[FieldDescriptor], record: &Record) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| {
                    let raw = match record.get(&f.name) {
                        None | Some(Value::Null) => String::new(),
                        Some(v) => display_value(v),
                    };
                    (f.name.clone(), raw)
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_owned(), value.into());
    }

    pub fn value_mut(&mut self, name: &str) -> Option<&mut String> {
        self.values.get_mut(name)
    }

    /// Run every field's validators. Any message blocks submit.
    pub fn validate(&self, fields: &[FieldDescriptor]) -> Result<(), FieldErrors> {
        let errors: FieldErrors = fields
            .iter()
            .filter_map(|f| {
                f.validate(self.get(&f.name))
                    .err()
                    .map(|msg| (f.name.clone(), msg))
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The JSON body sent to the backend, coerced per widget.
    pub fn to_values(&self, fields: &[FieldDescriptor]) -> Value {
        let map: Map<String, Value> = fields
            .iter()
            .map(|f| (f.name.clone(), f.coerce(self.get(&f.name))))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Resource;
    use serde_json::json;

    #[test]
    fn edit_draft_is_prepopulated() {
        let fields = Resource::Projects.fields();
        let record: Record = serde_json::from_value(json!({
            "id": 4,
            "name": "Website",
            "client": "ABC",
            "status": "active",
            "progress": 40,
            "end_date": null
        }))
        .unwrap();

        let draft = FormDraft::from_record(&fields, &record);
        assert_eq!(draft.get("name"), "Website");
        assert_eq!(draft.get("progress"), "40");
        assert_eq!(draft.get("end_date"), "");
        assert_eq!(draft.get("description"), "");
    }

    #[test]
    fn empty_draft_fails_required_fields() {
        let fields = Resource::Employees.fields();
        let errors = FormDraft::empty(&fields).validate(&fields).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["name"], "Please enter name");
    }

    #[test]
    fn values_are_coerced_per_widget() {
        let fields = Resource::Assets.fields();
        let mut draft = FormDraft::empty(&fields);
        draft.set("name", "Laptop");
        draft.set("category", "equipment");
        draft.set("value", "1500");
        draft.set("status", "active");

        assert!(draft.validate(&fields).is_ok());
        let body = draft.to_values(&fields);
        assert_eq!(body["value"], json!(1500));
        assert_eq!(body["location"], json!(""));
        assert_eq!(body["name"], json!("Laptop"));
    }
}
