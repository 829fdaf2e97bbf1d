use serde::{Deserialize, Serialize};

/// One article recovered from the page, after normalization.
///
/// `title` and `link` are always non-empty; `id` is the explicit node
/// identifier when the page provides one and the link otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
}

impl ExtractedItem {
    /// Entry body: escaped description, preceded by an image tag when present.
    pub fn content_html(&self) -> String {
        let description = html_escape::encode_text(&self.description);
        match self.image {
            Some(ref image) => format!(
                r#"<img src="{}" style="max-width:100%; height:auto; margin-bottom:10px;"><br><br>{}"#,
                html_escape::encode_double_quoted_attribute(image),
                description
            ),
            None => description.into_owned(),
        }
    }
}
