//! Form renderer.
//!
//! A [`FieldSpec`] names a field and its widget kind. [`render_field`]
//! binds it to a form's current values and errors, producing a
//! [`RenderedField`] that a shell can draw as is.

use serde::Serialize;
use strsim::jaro_winkler;

use intake_core::models::{Physician, GENDER_OPTIONS, IDENTIFICATION_TYPES, PHYSICIANS};
use intake_core::validation::{FieldValue, ValidationErrors};

use crate::values::FormValues;

/// Phone inputs start on Côte d'Ivoire.
pub const DEFAULT_COUNTRY: &str = "CI";

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Date picker format used when the time is selectable as well.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y - %-I:%M %p";

/// Minimum similarity for a select option to match a search query.
const MIN_OPTION_SIMILARITY: f64 = 0.85;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Input,
    Textarea,
    PhoneInput,
    Checkbox,
    DatePicker,
    Select,
    /// Custom content drawn by the shell (radio groups, file uploaders)
    Skeleton,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub image: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self { label: value.clone(), value, image: None }
    }
}

impl From<&Physician> for SelectOption {
    fn from(physician: &Physician) -> Self {
        Self {
            value: physician.name.to_string(),
            label: physician.name.to_string(),
            image: Some(physician.image.to_string()),
        }
    }
}

pub fn physician_options() -> Vec<SelectOption> {
    PHYSICIANS.iter().map(SelectOption::from).collect()
}

pub fn identification_type_options() -> Vec<SelectOption> {
    IDENTIFICATION_TYPES.iter().copied().map(SelectOption::new).collect()
}

pub fn gender_options() -> Vec<SelectOption> {
    GENDER_OPTIONS.iter().map(|g| SelectOption::new(g.as_str())).collect()
}

/// Options matching a typed query, best match first.
///
/// Substring matches always qualify; otherwise the label must be close
/// to the query by Jaro-Winkler similarity.
pub fn filter_options<'a>(options: &'a [SelectOption], query: &str) -> Vec<&'a SelectOption> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return options.iter().collect();
    }

    let mut scored: Vec<(f64, &SelectOption)> = options
        .iter()
        .filter_map(|option| {
            let label = option.label.to_lowercase();
            let score = if label.contains(&query) {
                1.0
            } else {
                label
                    .split_whitespace()
                    .map(|word| jaro_winkler(word, &query))
                    .fold(jaro_winkler(&label, &query), f64::max)
            };
            (score >= MIN_OPTION_SIMILARITY).then_some((score, option))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, option)| option).collect()
}

/// Declarative description of one form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub label: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub options: Vec<SelectOption>,
    pub date_format: Option<&'static str>,
    pub show_time_select: bool,
}

impl FieldSpec {
    pub fn new(field_type: FieldType, name: &'static str) -> Self {
        Self {
            name,
            field_type,
            label: None,
            placeholder: None,
            icon: None,
            options: Vec::new(),
            date_format: None,
            show_time_select: false,
        }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn date_format(mut self, format: &'static str) -> Self {
        self.date_format = Some(format);
        self
    }

    pub fn time_select(mut self) -> Self {
        self.show_time_select = true;
        self
    }
}

/// Widget bound to a field's current value.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Widget {
    Input {
        value: String,
        placeholder: Option<String>,
        icon: Option<String>,
    },
    Textarea {
        value: String,
        placeholder: Option<String>,
    },
    PhoneInput {
        value: String,
        placeholder: Option<String>,
        default_country: String,
    },
    Checkbox {
        checked: bool,
        label: String,
    },
    DatePicker {
        value: Option<String>,
        date_format: String,
        show_time_select: bool,
    },
    Select {
        selected: Option<String>,
        placeholder: Option<String>,
        options: Vec<SelectOption>,
    },
    Skeleton {
        selected: Option<String>,
        options: Vec<SelectOption>,
        file_names: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderedField {
    pub name: String,
    /// Shown above the widget; checkboxes carry theirs inside the widget
    pub label: Option<String>,
    pub widget: Widget,
    pub error: Option<String>,
}

/// Render one field against a form's values and errors.
pub fn render_field(spec: &FieldSpec, values: &FormValues, errors: &ValidationErrors) -> RenderedField {
    let value = values.get(spec.name);
    let placeholder = spec.placeholder.map(str::to_string);

    let widget = match spec.field_type {
        FieldType::Input => Widget::Input {
            value: text(value),
            placeholder,
            icon: spec.icon.map(str::to_string),
        },
        FieldType::Textarea => Widget::Textarea { value: text(value), placeholder },
        FieldType::PhoneInput => Widget::PhoneInput {
            value: text(value),
            placeholder,
            default_country: DEFAULT_COUNTRY.to_string(),
        },
        FieldType::Checkbox => Widget::Checkbox {
            checked: value.as_bool().unwrap_or(false),
            label: spec.label.unwrap_or(spec.name).to_string(),
        },
        FieldType::DatePicker => {
            let format = spec.date_format.unwrap_or(DEFAULT_DATE_FORMAT);
            Widget::DatePicker {
                value: format_date(value, format),
                date_format: format.to_string(),
                show_time_select: spec.show_time_select,
            }
        }
        FieldType::Select => Widget::Select {
            selected: selected(value),
            placeholder,
            options: spec.options.clone(),
        },
        FieldType::Skeleton => Widget::Skeleton {
            selected: selected(value),
            options: spec.options.clone(),
            file_names: match value {
                FieldValue::Files(files) => files.iter().map(|f| f.file_name.clone()).collect(),
                _ => Vec::new(),
            },
        },
    };

    RenderedField {
        name: spec.name.to_string(),
        label: match spec.field_type {
            FieldType::Checkbox => None,
            _ => spec.label.map(str::to_string),
        },
        widget,
        error: errors.first(spec.name).map(str::to_string),
    }
}

fn text(value: &FieldValue) -> String {
    value.as_text().unwrap_or_default().to_string()
}

fn selected(value: &FieldValue) -> Option<String> {
    value
        .as_text()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn format_date(value: &FieldValue, format: &str) -> Option<String> {
    match value {
        FieldValue::Date(d) => Some(d.format(format).to_string()),
        FieldValue::DateTime(dt) => Some(dt.format(format).to_string()),
        FieldValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
