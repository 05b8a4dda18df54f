/// Filter and sort rule records carried in the `filters` / `sort` query parameters
use serde::{Deserialize, Deserializer, Serialize};

/// Comparison applied by a filter rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    In,
    NotIn,
    Contains,
    NotContains,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
}

impl FilterType {
    /// Wire name, as it appears in the JSON payload
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::In => "IN",
            FilterType::NotIn => "NOT_IN",
            FilterType::Contains => "CONTAINS",
            FilterType::NotContains => "NOT_CONTAINS",
            FilterType::Equals => "EQUALS",
            FilterType::NotEquals => "NOT_EQUALS",
            FilterType::GreaterThan => "GREATER_THAN",
            FilterType::LessThan => "LESS_THAN",
        }
    }
}

/// Filter values are either a single string or a list of strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterValues {
    One(String),
    Many(Vec<String>),
}

impl FilterValues {
    pub fn as_slice(&self) -> &[String] {
        match self {
            FilterValues::One(value) => std::slice::from_ref(value),
            FilterValues::Many(values) => values,
        }
    }
}

impl From<Vec<String>> for FilterValues {
    fn from(values: Vec<String>) -> Self {
        FilterValues::Many(values)
    }
}

/// A single filter rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub field: String,
    pub filter_type: FilterType,
    pub values: FilterValues,
}

impl FilterRule {
    pub fn new(field: &str, filter_type: FilterType, values: Vec<String>) -> FilterRule {
        FilterRule {
            field: field.to_string(),
            filter_type,
            values: values.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

// Read back case-insensitively; URLs copied from the site mix `DESC`, `desc` and `Desc`
impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.eq_ignore_ascii_case("ASC") {
            Ok(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("DESC") {
            Ok(SortDirection::Desc)
        } else {
            Err(serde::de::Error::unknown_variant(&raw, &["ASC", "DESC"]))
        }
    }
}

/// A single sort rule.
///
/// The site writes `{field, sortDirection}` but URLs copied out of it
/// sometimes carry `{key, order}`; both shapes decode to this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SortRule {
    #[serde(alias = "key")]
    pub field: String,
    #[serde(alias = "order")]
    pub sort_direction: SortDirection,
}

impl SortRule {
    pub fn new(field: &str, sort_direction: SortDirection) -> SortRule {
        SortRule {
            field: field.to_string(),
            sort_direction,
        }
    }
}
