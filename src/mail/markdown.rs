use pulldown_cmark::{Options, Parser, html};

const HTML_HEAD: &str = "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<style>\n.email-body { font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Helvetica, Arial, sans-serif; font-size: 14px; line-height: 1.5; color: #202124; }\n.email-body pre { background: #f6f8fa; padding: 8px; overflow-x: auto; }\n.email-body blockquote { margin: 0 0 0 8px; padding-left: 8px; border-left: 2px solid #dadce0; color: #5f6368; }\n</style>\n</head>\n<body>\n<div class=\"email-body\">\n";

const HTML_TAIL: &str = "</div>\n</body>\n</html>\n";

/// Renders markdown into a complete HTML document suitable as a message body.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, parser);

    let mut document = String::with_capacity(HTML_HEAD.len() + rendered.len() + HTML_TAIL.len());
    document.push_str(HTML_HEAD);
    document.push_str(&rendered);
    document.push_str(HTML_TAIL);
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_rendered_markdown_in_template() {
        let html = markdown_to_html("## Hello\n\nVisit **gmail**.");

        assert!(html.starts_with("<!doctype html>"));
        assert!(
            html.contains(
                "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
            )
        );
        assert!(html.contains("<div class=\"email-body\">"));
        assert!(html.contains("<h2>Hello</h2>"));
        assert!(html.contains("<strong>gmail</strong>"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");

        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }
}
