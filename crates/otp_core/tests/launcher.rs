use otp_core::{
    build_preview_document, preview_filename, LauncherItem, LauncherOutput, ResultRecord,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn record() -> ResultRecord {
    ResultRecord {
        display_timestamp: "07 Mar 14:05".to_string(),
        code: "837261".to_string(),
        text: "Your access code is 837261".to_string(),
    }
}

#[test]
fn output_matches_launcher_schema() {
    let item = LauncherItem::from_record(&record(), Some("/tmp/otp-837261.html".to_string()));
    let output = LauncherOutput { items: vec![item] };
    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(
        value,
        json!({
            "items": [{
                "title": "837261",
                "arg": "837261",
                "subtitle": "[07 Mar 14:05] Your access code is 837261",
                "quicklookurl": "/tmp/otp-837261.html"
            }]
        })
    );
}

#[test]
fn missing_preview_omits_quicklookurl() {
    let item = LauncherItem::from_record(&record(), None);
    let value = serde_json::to_value(&item).unwrap();
    assert!(value.get("quicklookurl").is_none());
}

#[test]
fn empty_output_still_has_items_array() {
    let value = serde_json::to_value(LauncherOutput::default()).unwrap();
    assert_eq!(value, json!({ "items": [] }));
}

#[test]
fn preview_highlights_code_and_escapes_text() {
    let doc = build_preview_document("4821", "<b>code</b> 4821 & 4821");
    assert!(doc.contains("&lt;b&gt;code&lt;/b&gt; <mark>4821</mark> &amp; <mark>4821</mark>"));
    assert!(doc.starts_with("<html>"));
}

#[test]
fn preview_filename_is_keyed_by_code() {
    assert_eq!(preview_filename("837261"), "otp-837261.html");
}
