/// Search URL composition: base params, run-time toggles, and rule-list encoding

use crate::error::RuleDecodeError;
use crate::rules::{FilterRule, FilterType};
use crate::settings::{RuntimeMode, SEARCH_KEY, Settings};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use url::{Url, form_urlencoded};

/// Knowledge-base search page every composed URL points at
pub const KB_SEARCH_URL: &str = "https://netflixcare.sprinklr.com/care/knowledge-base";

pub const FILTERS_KEY: &str = "filters";
pub const SORT_KEY: &str = "sort";
pub const SHARE_VIEW_KEY: &str = "shareView";

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const MAX_DECODE_PASSES: usize = 3;

/// Percent-encode a single query component
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Serialize a rule list to JSON and percent-encode it twice.
///
/// The site reads `filters` / `sort` as a once-encoded JSON string, and the
/// query string itself gets encoded once more on the way out.
pub fn encode_rule_list<T: Serialize>(rules: &[T]) -> String {
    let json = serde_json::to_string(rules).unwrap_or_else(|_| "[]".to_string());
    encode_component(&encode_component(&json))
}

/// Decode a `filters` / `sort` value, however many encoding layers it still carries
pub fn decode_rule_list<T: DeserializeOwned>(value: &str) -> Result<Vec<T>, RuleDecodeError> {
    let mut text = value.trim().to_string();
    for _ in 0..MAX_DECODE_PASSES {
        if text.starts_with('[') {
            break;
        }
        text = percent_decode_str(&text).decode_utf8()?.trim().to_string();
    }

    if !text.starts_with('[') {
        return Err(RuleDecodeError::NotAnArray(value.to_string()));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Encoded single `KB_LOCALE IN <locales>` filter
pub fn locale_filter(locales: &[&str]) -> String {
    let locales = locales.iter().map(|l| l.to_string()).collect();
    encode_rule_list(&[FilterRule::new("KB_LOCALE", FilterType::In, locales)])
}

/// Encoded empty rule list, used to clear filters or sort
pub fn empty_rule_list() -> String {
    encode_rule_list::<FilterRule>(&[])
}

/// Parse a URL's query string into a flat map.
///
/// Invalid URLs give an empty map, and `search` is never returned.
pub fn parse_params(url: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    match Url::parse(url.trim()) {
        Ok(parsed) => {
            for (key, value) in parsed.query_pairs() {
                out.insert(key.into_owned(), value.into_owned());
            }
        }
        Err(e) => {
            log::debug!("Ignoring unparsable base URL: {}", e);
        }
    }

    out.retain(|k, _| !k.eq_ignore_ascii_case(SEARCH_KEY));
    out
}

/// Search page URL carrying exactly `params`
pub fn build_url_from_params(params: &BTreeMap<String, String>) -> String {
    let pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    with_query(&pairs)
}

/// Build the destination URL for a search term
pub fn compose_search_url(term: &str, settings: &Settings, mode: RuntimeMode) -> String {
    let base = &settings.base_params;
    let mut query = QueryParams::default();

    if mode == RuntimeMode::CustomDefault {
        for (key, value) in base {
            if !is_composed_key(key) {
                query.set(key, value);
            }
        }
    }

    query.set(SEARCH_KEY, &encode_component(term));
    if settings.force_share_view {
        query.set(SHARE_VIEW_KEY, "1");
    }

    match mode {
        RuntimeMode::Unfiltered | RuntimeMode::Default => {
            query.set(FILTERS_KEY, &empty_rule_list());
            query.set(SORT_KEY, &empty_rule_list());
        }
        RuntimeMode::CustomDefault => {
            if settings.keep_filters {
                if let Some(filters) = base.get(FILTERS_KEY) {
                    query.set(FILTERS_KEY, filters);
                }
            }

            // No sort kept means an explicit empty sort, unlike filters which are just omitted
            match (settings.keep_sort, base.get(SORT_KEY)) {
                (false, _) => query.set(SORT_KEY, &empty_rule_list()),
                (true, Some(sort)) => query.set(SORT_KEY, sort),
                (true, None) => {}
            }
        }
    }

    with_query(&query.as_pairs())
}

fn is_composed_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(SEARCH_KEY) || key == FILTERS_KEY || key == SORT_KEY
}

fn with_query(pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return KB_SEARCH_URL.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    format!("{}?{}", KB_SEARCH_URL, query)
}

/// Insertion-ordered query map where `set` replaces in place
#[derive(Default)]
struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{FilterValues, SortDirection, SortRule};

    /// Query of a composed URL as the site sees it: one layer of decoding removed
    fn received(url: &str) -> BTreeMap<String, String> {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn decoded_search(url: &str) -> String {
        let query = received(url);
        percent_decode_str(&query["search"]).decode_utf8().unwrap().into_owned()
    }

    fn settings_with_base(pairs: &[(&str, &str)]) -> Settings {
        let mut settings = Settings::new();
        settings.base_params = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        settings
    }

    fn locale_rule() -> FilterRule {
        FilterRule::new("KB_LOCALE", FilterType::In, vec!["en_US".to_string()])
    }

    #[test]
    fn test_encode_empty_rule_list() {
        assert_eq!(empty_rule_list(), "%255B%255D");
    }

    #[test]
    fn test_encode_locale_filter() {
        assert_eq!(
            locale_filter(&["en_US"]),
            "%255B%257B%2522field%2522%253A%2522KB_LOCALE%2522%252C%2522filterType%2522%253A%2522IN%2522%252C%2522values%2522%253A%255B%2522en_US%2522%255D%257D%255D"
        );
    }

    #[test]
    fn test_rule_list_survives_one_unwrap() {
        let filters = vec![
            locale_rule(),
            FilterRule {
                field: "KB_TITLE".to_string(),
                filter_type: FilterType::NotContains,
                values: FilterValues::One("draft & old".to_string()),
            },
        ];
        let sort = vec![SortRule::new("modifiedTime", SortDirection::Desc)];

        let filters_once = percent_decode_str(&encode_rule_list(&filters)).decode_utf8().unwrap().into_owned();
        let sort_once = percent_decode_str(&encode_rule_list(&sort)).decode_utf8().unwrap().into_owned();

        assert_eq!(decode_rule_list::<FilterRule>(&filters_once).unwrap(), filters);
        assert_eq!(decode_rule_list::<SortRule>(&sort_once).unwrap(), sort);
    }

    #[test]
    fn test_decode_accepts_plain_json() {
        let rules: Vec<SortRule> = decode_rule_list(r#"[{"key":"createdTime","order":"ASC"}]"#).unwrap();
        assert_eq!(rules, vec![SortRule::new("createdTime", SortDirection::Asc)]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_rule_list::<FilterRule>("not-json").is_err());
        assert!(decode_rule_list::<FilterRule>("%5B%7Bbroken").is_err());
        assert!(decode_rule_list::<FilterRule>("").is_err());
    }

    #[test]
    fn test_parse_params_basic() {
        let params = parse_params(
            "https://netflixcare.sprinklr.com/care/knowledge-base?shareView=1&filters=%255B%255D&view=grid",
        );

        assert_eq!(params.len(), 3);
        assert_eq!(params["shareView"], "1");
        assert_eq!(params["filters"], "%5B%5D");
        assert_eq!(params["view"], "grid");
    }

    #[test]
    fn test_parse_params_strips_search() {
        let params = parse_params("https://example.com/kb?search=password&Search=x&tab=1");

        assert!(!params.contains_key("search"));
        assert!(!params.contains_key("Search"));
        assert_eq!(params.get("tab"), Some(&"1".to_string()));
    }

    #[test]
    fn test_parse_params_invalid_url() {
        assert!(parse_params("").is_empty());
        assert!(parse_params("not a url").is_empty());
        assert!(parse_params("netflixcare.sprinklr.com/care?filters=x").is_empty());
    }

    #[test]
    fn test_parse_params_repeated_key_last_wins() {
        let params = parse_params("https://example.com/?tab=1&tab=2");
        assert_eq!(params["tab"], "2");
    }

    #[test]
    fn test_build_url_from_params() {
        assert_eq!(build_url_from_params(&BTreeMap::new()), KB_SEARCH_URL);

        let mut params = BTreeMap::new();
        params.insert("filters".to_string(), locale_filter(&["en_US"]));
        params.insert("shareView".to_string(), "1".to_string());

        let url = build_url_from_params(&params);

        assert!(url.starts_with(KB_SEARCH_URL));
        assert_eq!(parse_params(&url), params);
    }

    #[test]
    fn test_search_term_round_trips() {
        let settings = Settings::new();
        for term in ["password reset", "a&b=c", "100% refund?", "café über", "  padded  "] {
            for mode in [RuntimeMode::Unfiltered, RuntimeMode::CustomDefault, RuntimeMode::Default] {
                let url = compose_search_url(term, &settings, mode);
                assert_eq!(decoded_search(&url), term);
            }
        }
    }

    #[test]
    fn test_password_reset_scenario() {
        let settings = Settings::new();

        let url = compose_search_url("password reset", &settings, RuntimeMode::Default);

        assert!(url.starts_with("https://netflixcare.sprinklr.com/care/knowledge-base?"));
        assert!(url.contains("search=password%2520reset"));
        assert!(url.contains("shareView=1"));
        assert!(url.contains("filters=%25255B%25255D"));
        assert!(url.contains("sort=%25255B%25255D"));

        let query = received(&url);
        assert!(decode_rule_list::<FilterRule>(&query["filters"]).unwrap().is_empty());
        assert!(decode_rule_list::<SortRule>(&query["sort"]).unwrap().is_empty());
    }

    #[test]
    fn test_share_view_only_when_forced() {
        let mut settings = Settings::new();
        settings.force_share_view = false;

        let url = compose_search_url("x", &settings, RuntimeMode::Default);

        assert!(!received(&url).contains_key("shareView"));
    }

    #[test]
    fn test_unfiltered_ignores_base_params() {
        let mut settings = settings_with_base(&[
            ("filters", locale_filter(&["fr_FR"]).as_str()),
            ("sort", "%5B%7B%22field%22%3A%22createdTime%22%2C%22sortDirection%22%3A%22ASC%22%7D%5D"),
            ("view", "grid"),
        ]);
        settings.keep_sort = true;

        let query = received(&compose_search_url("refund", &settings, RuntimeMode::Unfiltered));

        assert_eq!(query["filters"], empty_rule_list());
        assert_eq!(query["sort"], empty_rule_list());
        assert!(!query.contains_key("view"));
    }

    #[test]
    fn test_default_mode_matches_unfiltered() {
        let settings = settings_with_base(&[("filters", locale_filter(&["en_US"]).as_str()), ("view", "grid")]);

        assert_eq!(
            compose_search_url("billing", &settings, RuntimeMode::Default),
            compose_search_url("billing", &settings, RuntimeMode::Unfiltered)
        );
    }

    #[test]
    fn test_custom_default_keeps_base_filters_verbatim() {
        let base_filters = encode_rule_list(&[locale_rule()]);
        let settings = settings_with_base(&[("filters", base_filters.as_str())]);

        let query = received(&compose_search_url("refund", &settings, RuntimeMode::CustomDefault));

        assert_eq!(query["filters"], base_filters);
    }

    #[test]
    fn test_custom_default_without_keep_filters_omits_key() {
        let mut settings = settings_with_base(&[("filters", locale_filter(&["en_US"]).as_str())]);
        settings.keep_filters = false;

        let query = received(&compose_search_url("refund", &settings, RuntimeMode::CustomDefault));

        assert!(!query.contains_key("filters"));
    }

    #[test]
    fn test_custom_default_without_base_filters_omits_key() {
        let settings = settings_with_base(&[("view", "grid")]);
        assert!(settings.keep_filters);

        let query = received(&compose_search_url("refund", &settings, RuntimeMode::CustomDefault));

        assert!(!query.contains_key("filters"));
    }

    #[test]
    fn test_custom_default_sort_handling() {
        let base_sort = encode_rule_list(&[SortRule::new("modifiedTime", SortDirection::Desc)]);

        // not kept: forced empty
        let settings = settings_with_base(&[("sort", base_sort.as_str())]);
        let query = received(&compose_search_url("x", &settings, RuntimeMode::CustomDefault));
        assert_eq!(query["sort"], empty_rule_list());

        // kept and present: copied
        let mut settings = settings_with_base(&[("sort", base_sort.as_str())]);
        settings.keep_sort = true;
        let query = received(&compose_search_url("x", &settings, RuntimeMode::CustomDefault));
        assert_eq!(query["sort"], base_sort);

        // kept and absent: omitted
        let mut settings = settings_with_base(&[]);
        settings.keep_sort = true;
        let query = received(&compose_search_url("x", &settings, RuntimeMode::CustomDefault));
        assert!(!query.contains_key("sort"));
    }

    #[test]
    fn test_custom_default_passes_other_keys_through() {
        let mut settings = settings_with_base(&[("view", "grid"), ("shareView", "0"), ("search", "stale")]);
        settings.force_share_view = false;

        let query = received(&compose_search_url("fresh", &settings, RuntimeMode::CustomDefault));

        assert_eq!(query["view"], "grid");
        assert_eq!(query["shareView"], "0");
        assert_eq!(query["search"], "fresh");
    }

    #[test]
    fn test_forced_share_view_overrides_base() {
        let settings = settings_with_base(&[("shareView", "0")]);

        let query = received(&compose_search_url("x", &settings, RuntimeMode::CustomDefault));

        assert_eq!(query["shareView"], "1");
    }
}
