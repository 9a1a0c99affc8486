use scraper::Html;

const SKIPPED_PARENTS: [&str; 3] = ["script", "style", "noscript"];

/// Visible-text rendition of a product page: drops script/style blocks and
/// markup, collapses whitespace, and truncates to `limit` characters.
pub fn extract_page_text(html: &str, limit: usize) -> String {
    let document = Html::parse_document(html);

    let mut collected = String::new();
    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node
            .parent()
            .and_then(|parent| {
                parent
                    .value()
                    .as_element()
                    .map(|element| SKIPPED_PARENTS.contains(&element.name()))
            })
            .unwrap_or(false);
        if skipped {
            continue;
        }
        collected.push_str(&text.text);
        collected.push(' ');
    }

    let collapsed = collected.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(limit).collect()
}
