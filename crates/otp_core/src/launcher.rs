use serde::Serialize;

use crate::ResultRecord;

/// One row of the launcher's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LauncherItem {
    pub title: String,
    pub arg: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quicklookurl: Option<String>,
}

impl LauncherItem {
    pub fn from_record(record: &ResultRecord, quicklookurl: Option<String>) -> Self {
        Self {
            title: record.code.clone(),
            arg: record.code.clone(),
            subtitle: format!("[{}] {}", record.display_timestamp, record.text),
            quicklookurl,
        }
    }
}

/// Top-level payload printed for the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LauncherOutput {
    pub items: Vec<LauncherItem>,
}

/// Preview documents are keyed by code so re-rendering replaces the old file.
pub fn preview_filename(code: &str) -> String {
    format!("otp-{code}.html")
}

/// Standalone HTML document showing `text` with every occurrence of `code`
/// highlighted.
pub fn build_preview_document(code: &str, text: &str) -> String {
    let escaped = escape_html(text);
    let content = if code.is_empty() {
        escaped
    } else {
        escaped.replace(code, &format!("<mark>{code}</mark>"))
    };
    format!(
        r#"<html>
  <head>
    <meta charset="utf-8">
    <style>
      body {{
        font-family: "SF Pro", sans-serif;
      }}
      p {{
        color: var(--result-text-color);
        margin-top: 15px;
        margin-left: 10px;
        margin-right: 10px;
        font-size: 1.3em;
      }}
    </style>
  </head>
  <body>
    <p>{content}</p>
  </body>
</html>
"#
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
