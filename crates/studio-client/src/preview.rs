/// Sandboxed preview documents
///
/// Generated markup is untrusted. It is only ever shown through an
/// `<iframe sandbox srcdoc="…">` inside a small host page, so scripts in the
/// generated game run in an opaque origin and never touch the host.

/// Sandbox tokens granted to the preview frame. No `allow-same-origin`.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-pointer-lock";

/// Escape text for use inside a double-quoted HTML attribute
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The sandboxed frame element carrying `html` as its `srcdoc`
pub fn sandboxed_frame(html: &str) -> String {
    format!(
        r#"<iframe id="preview" sandbox="{SANDBOX_POLICY}" srcdoc="{}"></iframe>"#,
        escape_attribute(html)
    )
}

/// A complete host page embedding `html` in a sandboxed frame
pub fn host_page(title: &str, html: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{}</title>
<style>
  html, body {{ margin: 0; height: 100%; background: #111; }}
  #preview {{ border: 0; width: 100%; height: 100%; }}
</style>
</head>
<body>
{}
</body>
</html>
"#,
        escape_attribute(title),
        sandboxed_frame(html)
    )
}
