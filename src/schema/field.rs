use super::options::{RawOption, SelectOption, normalize_options};

/// Primitive kind a raw form value is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// ISO calendar date (`YYYY-MM-DD`).
    Date,
    /// Date with time of day, as produced by `datetime-local` inputs.
    DateTime,
    Enum,
    /// Zero or more ids posted under one repeated field name.
    IdArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Minimum length in characters after trimming.
    MinLength(usize),
    /// Finite set of accepted ids (enum values, or ids of an array field).
    Domain(Vec<SelectOption>),
    Email,
}

/// Declarative description of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    constraints: Vec<Constraint>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            kind,
            required,
            constraints: Vec::new(),
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text, true)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldKind::Number, true)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date, true)
    }

    pub fn date_time(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime, true)
    }

    pub fn enumeration<I, T>(name: &'static str, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawOption>,
    {
        Self::new(name, FieldKind::Enum, true).one_of(options)
    }

    /// Array-of-id field. An empty selection is valid unless `required()` is called.
    pub fn ids(name: &'static str) -> Self {
        Self::new(name, FieldKind::IdArray, false)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.push(Constraint::MinLength(min));
        self
    }

    pub fn email(mut self) -> Self {
        self.constraints.push(Constraint::Email);
        self
    }

    pub fn one_of<I, T>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawOption>,
    {
        self.constraints
            .push(Constraint::Domain(normalize_options(options)));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_multi_valued(&self) -> bool {
        self.kind == FieldKind::IdArray
    }
}

/// Field table for one operation, keyed by its intent constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    intent: &'static str,
    fields: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn new(intent: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { intent, fields }
    }

    pub fn intent(&self) -> &'static str {
        self.intent
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}
