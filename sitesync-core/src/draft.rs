//! Form drafts: user input accumulated before a create.
//!
//! A [`FormDraft`] holds raw string input for the fields of a [`FormSchema`].
//! It is validated against the loaded [`References`] and then turned into a
//! wire [`Payload`] with numbers parsed and empty optional fields defaulted.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::resource::{Resource, ResourceId};
use crate::sync::ValidationError;
use crate::upload::FileHandle;

/// How a field's input is checked and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    /// `YYYY-MM-DD`
    Date,
    /// One of a fixed set of values
    Choice(&'static [&'static str]),
    /// Id of an element of the named reference set
    Reference(&'static str),
    /// Id of the signed-in user, filled from the session
    CurrentUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Checks one raw input value. Empty input is only checked for presence.
    fn check(&self, raw: &str, refs: &References) -> Result<(), ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            if self.required {
                return Err(self.error(format!("{} is required", self.label)));
            }
            return Ok(());
        }
        self.encode(value)?;

        match self.kind {
            FieldKind::Reference(set) => {
                let id: ResourceId = value.parse().unwrap_or_else(|e| match e {});
                match refs.contains(set, &id) {
                    Some(true) => Ok(()),
                    Some(false) => Err(self.error(format!(
                        "Please select a valid {}",
                        self.label.to_lowercase()
                    ))),
                    None => Err(self.error(format!(
                        "{} options are not loaded",
                        self.label
                    ))),
                }
            }
            _ => Ok(()),
        }
    }

    /// Encodes non-empty input as its wire value.
    fn encode(&self, value: &str) -> Result<Value, ValidationError> {
        match self.kind {
            FieldKind::Text => Ok(Value::from(value)),
            FieldKind::Integer => value
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| self.error(format!("{} must be a whole number", self.label))),
            FieldKind::Decimal => value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| self.error(format!("{} must be a number", self.label))),
            FieldKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| self.error(format!("{} must be a date (YYYY-MM-DD)", self.label))),
            FieldKind::Choice(options) => {
                if options.contains(&value) {
                    Ok(Value::from(value))
                } else {
                    Err(self.error(format!(
                        "{} must be one of: {}",
                        self.label,
                        options.join(", ")
                    )))
                }
            }
            FieldKind::Reference(_) | FieldKind::CurrentUser => {
                let id: ResourceId = value.parse().unwrap_or_else(|e| match e {});
                Ok(id.to_value())
            }
        }
    }

    /// Wire value for empty input.
    fn empty_value(&self) -> Value {
        match (self.default, self.kind) {
            (Some(default), _) => Value::from(default),
            (None, FieldKind::Text) => Value::from(""),
            (None, _) => Value::Null,
        }
    }

    fn error(&self, message: String) -> ValidationError {
        ValidationError::for_field(self.name, message)
    }
}

/// Field layout of one resource kind's create form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSchema {
    pub fields: Vec<FieldSpec>,
    /// The form carries a file that is uploaded with the record
    pub requires_attachment: bool,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            requires_attachment: false,
        }
    }

    pub fn with_attachment(mut self) -> Self {
        self.requires_attachment = true;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the reference sets this form selects from, in field order.
    pub fn reference_sets(&self) -> Vec<&'static str> {
        let mut sets = Vec::new();
        for field in &self.fields {
            if let FieldKind::Reference(set) = field.kind {
                if !sets.contains(&set) {
                    sets.push(set);
                }
            }
        }
        sets
    }

    /// Encodes `field=value` pairs as a partial update body.
    ///
    /// Fields are checked for type but not against reference sets; an empty
    /// value clears an optional field and is rejected for a required one.
    pub fn patch<'a, I>(&self, pairs: I) -> Result<Map<String, Value>, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut patch = Map::new();
        for (name, raw) in pairs {
            let spec = self.field(name).ok_or_else(|| {
                ValidationError::for_field(name, format!("Unknown field '{}'", name))
            })?;
            let value = raw.trim();
            let encoded = if value.is_empty() {
                if spec.required {
                    return Err(spec.error(format!("{} is required", spec.label)));
                }
                spec.empty_value()
            } else {
                spec.encode(value)?
            };
            patch.insert(name.to_string(), encoded);
        }
        Ok(patch)
    }
}

/// Ids available for each reference set, used to validate selection fields.
#[derive(Debug, Clone, Default)]
pub struct References {
    sets: HashMap<String, HashSet<ResourceId>>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Resource>(&mut self, set: &str, items: &[T]) {
        self.sets
            .insert(set.to_string(), items.iter().map(Resource::id).collect());
    }

    pub fn with<T: Resource>(mut self, set: &str, items: &[T]) -> Self {
        self.insert(set, items);
        self
    }

    /// `None` if the set was never loaded.
    pub fn contains(&self, set: &str, id: &ResourceId) -> Option<bool> {
        self.sets.get(set).map(|ids| ids.contains(id))
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Map<String, Value>),
    /// Form fields plus one uploaded file
    Multipart {
        fields: Map<String, Value>,
        file: FileHandle,
    },
}

impl Payload {
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Payload::Json(fields) => fields,
            Payload::Multipart { fields, .. } => fields,
        }
    }
}

/// Mutable scratch state of a create form. Has no identity until submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    schema: FormSchema,
    values: BTreeMap<&'static str, String>,
    attachment: Option<FileHandle>,
}

impl FormDraft {
    /// Creates a draft in its initial shape: every field empty.
    pub fn new(schema: FormSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|f| (f.name, String::new()))
            .collect();
        Self {
            schema,
            values,
            attachment: None,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), ValidationError> {
        let spec = self.schema.field(field).ok_or_else(|| {
            ValidationError::for_field(field, format!("Unknown field '{}'", field))
        })?;
        self.values.insert(spec.name, value.into());
        Ok(())
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn attach(&mut self, file: FileHandle) {
        self.attachment = Some(file);
    }

    pub fn attachment(&self) -> Option<&FileHandle> {
        self.attachment.as_ref()
    }

    /// Returns the draft to its initial empty shape.
    pub fn reset(&mut self) {
        *self = Self::new(self.schema.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.attachment.is_none() && self.values.values().all(|v| v.trim().is_empty())
    }

    /// Checks every field in form order and reports the first unmet condition.
    pub fn validate(&self, refs: &References) -> Result<(), ValidationError> {
        for spec in &self.schema.fields {
            let raw = self.get(spec.name).unwrap_or_default();
            spec.check(raw, refs)?;
        }
        if self.schema.requires_attachment && self.attachment.is_none() {
            return Err(ValidationError::for_field(
                "file",
                "Please select a file to upload",
            ));
        }
        Ok(())
    }

    /// Builds the wire payload: numbers parsed, empty optional fields defaulted.
    pub fn to_payload(&self) -> Result<Payload, ValidationError> {
        let mut fields = Map::new();
        for spec in &self.schema.fields {
            let raw = self.get(spec.name).unwrap_or_default().trim();
            let value = if raw.is_empty() {
                spec.empty_value()
            } else {
                spec.encode(raw)?
            };
            fields.insert(spec.name.to_string(), value);
        }

        Ok(match &self.attachment {
            Some(file) => Payload::Multipart {
                fields,
                file: file.clone(),
            },
            None => Payload::Json(fields),
        })
    }
}
