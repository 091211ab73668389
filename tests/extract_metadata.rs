use page_metadata::{
    default_rule_sets, derive_provider_name, evaluate_field, extract_metadata, Context,
    FieldRuleSet, FieldValue, RuleEntry,
};
use scraper::Html;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn extract(html: &str, url: &str) -> page_metadata::MetadataRecord {
    init_tracing();
    let document = Html::parse_document(html);
    extract_metadata(&document, url, None).unwrap()
}

#[test]
fn og_title_beats_title_element() {
    let record = extract(
        r#"<html><head>
            <title>Bar</title>
            <meta property="og:title" content="Foo">
        </head></html>"#,
        "https://example.com/",
    );
    assert_eq!(record.text("title"), Some("Foo"));
}

#[test]
fn larger_icon_wins_regardless_of_order() {
    let url = "https://example.com/";
    let large_first = extract(
        r#"<link rel="icon" sizes="32x32" href="/32.png">
           <link rel="icon" sizes="16x16" href="/16.png">"#,
        url,
    );
    let small_first = extract(
        r#"<link rel="icon" sizes="16x16" href="/16.png">
           <link rel="icon" sizes="32x32" href="/32.png">"#,
        url,
    );
    assert_eq!(large_first.text("icon"), Some("https://example.com/32.png"));
    assert_eq!(small_first.text("icon"), Some("https://example.com/32.png"));
}

#[test]
fn icon_href_is_made_absolute() {
    let record = extract(r#"<link rel="icon" href="/fav.png">"#, "https://a.com/x/y");
    assert_eq!(record.text("icon"), Some("https://a.com/fav.png"));
}

#[test]
fn url_defaults_to_document_url() {
    let record = extract("<html><head></head><body><p>no links</p></body></html>", "https://a.com/x/y");
    assert_eq!(record.text("url"), Some("https://a.com/x/y"));
}

#[test]
fn amp_canonical_anchor_has_highest_priority() {
    let record = extract(
        r#"<meta property="og:url" content="https://a.com/og">
           <link rel="canonical" href="https://a.com/canonical">
           <a class="amp-canurl" href="/amp-canonical">x</a>"#,
        "https://a.com/x/y",
    );
    assert_eq!(record.text("url"), Some("https://a.com/amp-canonical"));
}

#[test]
fn description_is_trimmed() {
    let record = extract(
        r#"<meta name="description" content="  Hello World  ">"#,
        "https://example.com/",
    );
    assert_eq!(record.text("description"), Some("Hello World"));
}

#[test]
fn description_name_matches_case_insensitively() {
    let record = extract(
        r#"<meta name="Description" content="Mixed case">"#,
        "https://example.com/",
    );
    assert_eq!(record.text("description"), Some("Mixed case"));
}

#[test]
fn keywords_are_split_in_order() {
    let record = extract(r#"<meta name="keywords" content="a, b,c">"#, "https://example.com/");
    assert_eq!(
        record.get("keywords"),
        Some(&FieldValue::List(vec!["a".into(), "b".into(), "c".into()]))
    );
}

#[test]
fn keywords_of_only_separators_are_absent() {
    let record = extract(
        r#"<title>T</title><meta name="KEYWORDS" content=" , ">"#,
        "https://x.com/a/b",
    );
    assert_eq!(record.get("keywords"), None);
    assert!(record.to_json()["keywords"].is_null());
    assert_eq!(record.text("title"), Some("T"));
}

#[test]
fn missing_type_is_absent_and_other_fields_complete() {
    let record = extract(
        r#"<title>Only a title</title><meta property="og:site_name" content="Site">"#,
        "https://www.example.co.uk/",
    );
    assert_eq!(record.get("type"), None);
    assert_eq!(record.text("title"), Some("Only a title"));
    assert_eq!(record.text("provider"), Some("Site"));
    assert_eq!(record.len(), 9);
}

#[test]
fn provider_falls_back_to_host() {
    let record = extract("<p></p>", "https://blog.example.com/post");
    assert_eq!(record.text("provider"), Some("blog example"));
    assert_eq!(derive_provider_name("www.example.co.uk"), "example");
}

#[test]
fn image_prefers_secure_url() {
    let record = extract(
        r#"<meta name="twitter:image" content="/twitter.png">
           <meta property="og:image" content="http://cdn.example.com/og.png">
           <meta property="og:image:secure_url" content="https://cdn.example.com/og.png">"#,
        "https://example.com/",
    );
    assert_eq!(record.text("image"), Some("https://cdn.example.com/og.png"));
}

#[test]
fn single_field_evaluation_with_custom_rules() {
    init_tracing();
    let rule_set = FieldRuleSet::new(vec![
        RuleEntry::attr(r#"meta[name="author"]"#, "content"),
        RuleEntry::text(".byline"),
    ]);
    let document = Html::parse_document(
        r#"<span class="byline">By Someone</span><meta name="author" content="Jane">"#,
    );
    let value = evaluate_field(&rule_set, &document, &Context::new("https://example.com/")).unwrap();
    assert_eq!(value, Some(FieldValue::Text("Jane".into())));
}

#[test]
fn builtin_table_can_be_extended() {
    let mut table = default_rule_sets();
    table.insert(
        "author",
        FieldRuleSet::new(vec![RuleEntry::attr(r#"meta[name="author"]"#, "content")]),
    );
    let document = Html::parse_document(r#"<meta name="author" content="Jane"><title>T</title>"#);
    let record = extract_metadata(&document, "https://example.com/", Some(&table)).unwrap();
    assert_eq!(record.text("author"), Some("Jane"));
    assert_eq!(record.text("title"), Some("T"));
    assert_eq!(record.len(), 10);
}

#[test]
fn table_is_shareable_across_threads() {
    let table = std::sync::Arc::new(default_rule_sets());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let table = table.clone();
            std::thread::spawn(move || {
                let html = format!("<title>Page {i}</title>");
                let document = Html::parse_document(&html);
                extract_metadata(&document, "https://example.com/", Some(table.as_ref()))
                    .unwrap()
                    .text("title")
                    .map(String::from)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(format!("Page {i}")));
    }
}
