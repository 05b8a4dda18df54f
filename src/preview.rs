/// Best-effort, human-readable decode of a knowledge-base URL for the options page
use crate::compose::{FILTERS_KEY, SORT_KEY, decode_rule_list};
use crate::labels::{
    CATEGORY_FIELD, LOCALE_FIELD, category_label, field_label, filter_type_label, sort_direction_label,
    value_label,
};
use serde_json::Value;
use std::fmt;
use url::Url;

/// One displayed line of a preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    pub label: String,
    pub operator: Option<String>,
    pub value: String,
}

impl PreviewEntry {
    fn new(label: impl Into<String>, value: impl Into<String>) -> PreviewEntry {
        PreviewEntry {
            label: label.into(),
            operator: None,
            value: value.into(),
        }
    }
}

impl fmt::Display for PreviewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operator {
            Some(op) => write!(f, "{} {} {}", self.label, op, self.value),
            None => write!(f, "{}: {}", self.label, self.value),
        }
    }
}

/// Decoded meaning of a pasted URL
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlPreview {
    pub locale: Option<String>,
    pub filters: Vec<PreviewEntry>,
    pub sort: Vec<PreviewEntry>,
    pub other: Vec<PreviewEntry>,
}

impl UrlPreview {
    pub fn is_empty(&self) -> bool {
        self.locale.is_none() && self.filters.is_empty() && self.sort.is_empty() && self.other.is_empty()
    }

    /// All rows in display order: locale, filters, sort, everything else
    pub fn entries(&self) -> Vec<PreviewEntry> {
        let mut rows = Vec::new();
        if let Some(locale) = &self.locale {
            rows.push(PreviewEntry::new(field_label(LOCALE_FIELD), locale.clone()));
        }
        rows.extend(self.filters.iter().cloned());
        rows.extend(self.sort.iter().cloned());
        rows.extend(self.other.iter().cloned());
        rows
    }
}

/// Decode filters, sort, locale and the remaining query keys of `url`.
///
/// Never fails: an unparsable URL gives an empty preview, and an unparsable
/// field shows up as its raw text.
pub fn parse_url_preview(url: &str) -> UrlPreview {
    let mut preview = UrlPreview::default();

    let parsed = match Url::parse(url.trim()) {
        Ok(parsed) => parsed,
        Err(_) => return preview,
    };

    for (key, value) in parsed.query_pairs() {
        match &*key {
            FILTERS_KEY => preview_filters(&value, &mut preview),
            SORT_KEY => preview_sort(&value, &mut preview),
            _ => preview.other.push(PreviewEntry::new(key.to_string(), value.to_string())),
        }
    }

    preview
}

fn preview_filters(raw: &str, preview: &mut UrlPreview) {
    let items: Vec<Value> = match decode_rule_list(raw) {
        Ok(items) => items,
        Err(e) => {
            log::debug!("Unreadable filters value: {}", e);
            preview.filters.push(PreviewEntry::new("Filters", raw));
            return;
        }
    };

    for item in items {
        match FilterParts::read(&item) {
            Some(rule) if rule.field == LOCALE_FIELD => {
                let locales = join_labels(&rule.values, value_label);
                preview.locale = Some(match preview.locale.take() {
                    Some(existing) => format!("{}, {}", existing, locales),
                    None => locales,
                });
            }
            Some(rule) => preview.filters.push(rule.describe()),
            None => preview.filters.push(PreviewEntry::new("Filter", item.to_string())),
        }
    }
}

/// A filter rule read loosely for display.
///
/// Unknown filter types are shown as written, and numeric or boolean values
/// (date bounds, counts) are shown as their JSON text.
struct FilterParts {
    field: String,
    filter_type: String,
    values: Vec<String>,
}

impl FilterParts {
    fn read(item: &Value) -> Option<FilterParts> {
        let field = item.get("field")?.as_str()?.to_string();
        let filter_type = item
            .get("filterType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let values = match item.get("values")? {
            Value::Array(values) => values.iter().map(scalar_text).collect::<Option<Vec<_>>>()?,
            value => vec![scalar_text(value)?],
        };

        Some(FilterParts {
            field,
            filter_type,
            values,
        })
    }

    fn describe(&self) -> PreviewEntry {
        let value = if self.field == CATEGORY_FIELD {
            join_labels(&self.values, category_label)
        } else {
            join_labels(&self.values, value_label)
        };

        PreviewEntry {
            label: field_label(&self.field),
            operator: Some(filter_type_label(&self.filter_type)),
            value,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn preview_sort(raw: &str, preview: &mut UrlPreview) {
    let items: Vec<Value> = match decode_rule_list(raw) {
        Ok(items) => items,
        Err(e) => {
            log::debug!("Unreadable sort value: {}", e);
            preview.sort.push(PreviewEntry::new("Sort", raw));
            return;
        }
    };

    for item in items {
        let field = string_field(&item, "field", "key");
        let direction = string_field(&item, "sortDirection", "order").unwrap_or_default();

        let entry = match field {
            Some(field) => PreviewEntry::new(
                "Sort",
                format!("{} ({})", field_label(&field), sort_direction_label(&direction)),
            ),
            None => PreviewEntry::new("Sort", item.to_string()),
        };
        preview.sort.push(entry);
    }
}

fn string_field(item: &Value, name: &str, alias: &str) -> Option<String> {
    item.get(name)
        .or_else(|| item.get(alias))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn join_labels(values: &[String], label: fn(&str) -> String) -> String {
    values.iter().map(|v| label(v)).collect::<Vec<_>>().join(", ")
}
