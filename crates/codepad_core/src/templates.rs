//! Starter content for newly created files and upload validation.

use crate::model::ContentType;

pub const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Document</title>
</head>
<body>
    <h1>Hello World!</h1>
</body>
</html>"#;

pub const CSS_TEMPLATE: &str = r#"/* CSS Reset */
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    color: #333;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
    padding: 20px;
}"#;

pub const JS_TEMPLATE: &str = r#"// JavaScript starter
console.log('Hello World!');

const greet = (name) => {
    return `Hello, ${name}!`;
};

document.addEventListener('DOMContentLoaded', () => {
    console.log('DOM loaded');
});"#;

/// Starter content for a new file called `name`, `None` when the language has no template.
pub fn template_for(name: &str) -> Option<&'static str> {
    match ContentType::from_name(name) {
        ContentType::Html => Some(HTML_TEMPLATE),
        ContentType::Css => Some(CSS_TEMPLATE),
        ContentType::Js => Some(JS_TEMPLATE),
        ContentType::Plaintext => None,
    }
}

/// Content type of an uploaded file, `None` for anything but `.html`, `.css` and `.js`.
pub fn upload_language(name: &str) -> Option<ContentType> {
    Some(ContentType::from_name(name)).filter(|content_type| *content_type != ContentType::Plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_follow_extension() {
        assert_eq!(template_for("page.HTML"), Some(HTML_TEMPLATE));
        assert_eq!(template_for("reset.css"), Some(CSS_TEMPLATE));
        assert_eq!(template_for("main.js"), Some(JS_TEMPLATE));
        assert_eq!(template_for("notes.md"), None);
    }

    #[test]
    fn uploads_accept_web_languages_only() {
        assert_eq!(upload_language("INDEX.Html"), Some(ContentType::Html));
        assert_eq!(upload_language("a.js"), Some(ContentType::Js));
        assert_eq!(upload_language("photo.png"), None);
        assert_eq!(upload_language("css"), None);
    }
}
