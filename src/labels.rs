/// Human-readable labels for knowledge-base filter fields, values and categories.
///
/// Display only: a miss returns the raw identifier.
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const LOCALE_FIELD: &str = "KB_LOCALE";
pub const CATEGORY_FIELD: &str = "KB_FOLDER_ID";

static FIELD_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("KB_LOCALE", "Locale"),
        ("KB_FOLDER_ID", "Category"),
        ("KB_ARTICLE_STATUS", "Status"),
        ("KB_ARTICLE_TYPE", "Article type"),
        ("KB_TAGS", "Tags"),
        ("KB_AUTHOR", "Author"),
        ("KB_TITLE", "Title"),
        ("KB_CREATED_TIME", "Created"),
        ("KB_MODIFIED_TIME", "Last modified"),
        ("KB_PUBLISHED_TIME", "Published"),
        ("createdTime", "Created"),
        ("modifiedTime", "Last modified"),
        ("publishedTime", "Published"),
        ("title", "Title"),
        ("views", "Views"),
    ])
});

static VALUE_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("en_US", "English (US)"),
        ("en_GB", "English (UK)"),
        ("es_ES", "Spanish (Spain)"),
        ("es_419", "Spanish (Latin America)"),
        ("fr_FR", "French (France)"),
        ("fr_CA", "French (Canada)"),
        ("de_DE", "German"),
        ("it_IT", "Italian"),
        ("pt_BR", "Portuguese (Brazil)"),
        ("pt_PT", "Portuguese (Portugal)"),
        ("nl_NL", "Dutch"),
        ("pl_PL", "Polish"),
        ("tr_TR", "Turkish"),
        ("ja_JP", "Japanese"),
        ("ko_KR", "Korean"),
        ("zh_CN", "Chinese (Simplified)"),
        ("zh_TW", "Chinese (Traditional)"),
        ("PUBLISHED", "Published"),
        ("DRAFT", "Draft"),
        ("ARCHIVED", "Archived"),
        ("IN_REVIEW", "In review"),
        ("INTERNAL", "Internal"),
        ("EXTERNAL", "External"),
    ])
});

static FILTER_TYPE_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("IN", "is any of"),
        ("NOT_IN", "is none of"),
        ("CONTAINS", "contains"),
        ("NOT_CONTAINS", "does not contain"),
        ("EQUALS", "equals"),
        ("NOT_EQUALS", "does not equal"),
        ("GREATER_THAN", "is greater than"),
        ("LESS_THAN", "is less than"),
    ])
});

static CATEGORY_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("5f3c2a1be4b0a61d2c8e9f01", "Account & Billing"),
        ("5f3c2a1be4b0a61d2c8e9f02", "Playback Issues"),
        ("5f3c2a1be4b0a61d2c8e9f03", "Devices"),
        ("5f3c2a1be4b0a61d2c8e9f04", "Sign In & Password"),
        ("5f3c2a1be4b0a61d2c8e9f05", "Plans & Pricing"),
        ("5f3c2a1be4b0a61d2c8e9f06", "Parental Controls"),
        ("5f3c2a1be4b0a61d2c8e9f07", "Downloads"),
        ("5f3c2a1be4b0a61d2c8e9f08", "Policies"),
    ])
});

fn lookup(table: &HashMap<&'static str, &'static str>, key: &str) -> String {
    table.get(key).map_or_else(|| key.to_string(), |label| label.to_string())
}

pub fn field_label(field: &str) -> String {
    lookup(&FIELD_LABELS, field)
}

pub fn value_label(value: &str) -> String {
    lookup(&VALUE_LABELS, value)
}

pub fn filter_type_label(filter_type: &str) -> String {
    lookup(&FILTER_TYPE_LABELS, filter_type)
}

pub fn category_label(id: &str) -> String {
    lookup(&CATEGORY_LABELS, id)
}

/// Phrase for a sort direction; anything but `DESC` reads as ascending
pub fn sort_direction_label(direction: &str) -> &'static str {
    if direction.eq_ignore_ascii_case("DESC") {
        "newest first"
    } else {
        "oldest first"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(field_label("KB_FOLDER_ID"), "Category");
        assert_eq!(value_label("en_US"), "English (US)");
        assert_eq!(filter_type_label("NOT_IN"), "is none of");
        assert_eq!(category_label("5f3c2a1be4b0a61d2c8e9f03"), "Devices");
    }

    #[test]
    fn test_unknown_keys_fall_back_to_raw() {
        assert_eq!(field_label("KB_CUSTOM_FIELD"), "KB_CUSTOM_FIELD");
        assert_eq!(value_label("xx_YY"), "xx_YY");
        assert_eq!(filter_type_label("LIKE"), "LIKE");
        assert_eq!(category_label("deadbeef"), "deadbeef");
    }

    #[test]
    fn test_sort_direction_label() {
        assert_eq!(sort_direction_label("DESC"), "newest first");
        assert_eq!(sort_direction_label("desc"), "newest first");
        assert_eq!(sort_direction_label("ASC"), "oldest first");
        assert_eq!(sort_direction_label("sideways"), "oldest first");
    }
}
