//! Entry page generation from the HTML template.

/// Insert a deferred `<script>` tag per bundle before the closing `</body>`.
///
/// Bundles already referenced by the template are not added twice. Without
/// a `</body>` the tags are appended.
pub fn inject_scripts(template: &str, scripts: &[&str]) -> String {
    let tags: String = scripts
        .iter()
        .filter(|src| !template.contains(&format!("src=\"{src}\"")))
        .map(|src| format!("    <script defer src=\"{src}\"></script>\n"))
        .collect();

    if tags.is_empty() {
        return template.to_string();
    }

    match template.to_ascii_lowercase().rfind("</body>") {
        Some(at) => {
            let mut page = String::with_capacity(template.len() + tags.len());
            page.push_str(&template[..at]);
            page.push_str(&tags);
            page.push_str(&template[at..]);
            page
        }
        None => format!("{template}\n{tags}"),
    }
}
