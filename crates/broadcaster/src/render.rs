//! Per-subscriber rendering of a stored brief.
//!
//! Brief content carries feed and analyzer text, so raw HTML in it is
//! rendered as text and links are kept only for web and mail addresses.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use pulldown_cmark_escape::escape_html;

/// Placeholder in stored brief content replaced with the subscriber's name.
pub const NAME_PLACEHOLDER: &str = "{{name}}";

/// Plain-text body: the stored Markdown with the name filled in.
pub fn personalize_text(markdown: &str, name: &str) -> String {
    fill_name(markdown, name)
}

/// HTML body: the stored Markdown with the name filled in, rendered and
/// wrapped in a minimal email shell.
pub fn personalize_html(markdown: &str, name: &str, title: &str) -> String {
    let markdown = fill_name(markdown, &escape(name));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n\
         <body style=\"font-family: Arial, Helvetica, sans-serif; line-height: 1.5; \
         max-width: 680px; margin: 0 auto; padding: 16px; color: #1a1a1a;\">\n{}</body>\n</html>\n",
        escape(title),
        markdown_to_html(&markdown)
    )
}

// Only the greeting placeholder is filled; later occurrences come from content.
fn fill_name(markdown: &str, name: &str) -> String {
    markdown.replacen(NAME_PLACEHOLDER, name, 1)
}

/// Render Markdown to an HTML fragment.
///
/// Raw HTML blocks and inline tags are emitted as escaped text. Link and
/// image targets outside http, https and mailto are blanked.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_allowed_url(&url) {
        url
    } else {
        CowStr::Borrowed("")
    }
}

fn is_allowed_url(url: &str) -> bool {
    let url = url.trim_start();
    let scheme_end = url.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        // Relative reference: no scheme at all.
        None => true,
        Some(i) if !url[i..].starts_with(':') => true,
        Some(i) => matches!(
            url[..i].to_ascii_lowercase().as_str(),
            "http" | "https" | "mailto"
        ),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIEF: &str = "# Federal Contracting Brief\n\nGood morning, {{name}}.\n\n\
                         ## GSA OASIS+\n\n- [Award](https://gsa.gov/1) - GSA.gov, Oct 16, 2026\n";

    #[test]
    fn test_text_substitutes_name() {
        let text = personalize_text(BRIEF, "Dana");
        assert!(text.contains("Good morning, Dana."));
        assert!(!text.contains(NAME_PLACEHOLDER));
    }

    #[test]
    fn test_html_renders_markdown() {
        let html = personalize_html(BRIEF, "Dana", "Federal Contracting Brief");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Federal Contracting Brief</title>"));
        assert!(html.contains("<h1>Federal Contracting Brief</h1>"));
        assert!(html.contains("<p>Good morning, Dana.</p>"));
        assert!(html.contains("<a href=\"https://gsa.gov/1\">Award</a>"));
    }

    #[test]
    fn test_feed_markup_is_rendered_as_text() {
        let brief = "Good morning, {{name}}.\n\n\
                     - [<img src=x onerror=alert(1)> Award](javascript:alert(document.cookie)) \
                     - <b>Wire</b>, Oct 16, 2026\n\n\
                     <script>alert(1)</script>\n";
        let html = personalize_html(brief, "Dana", "t");

        assert!(!html.contains("<img"));
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt; Award</a>"));
        assert!(html.contains("&lt;b&gt;Wire&lt;/b&gt;"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_link_schemes() {
        assert!(is_allowed_url("https://sam.gov/opp/1"));
        assert!(is_allowed_url("HTTP://gsa.gov"));
        assert!(is_allowed_url("mailto:desk@agency.gov"));
        assert!(is_allowed_url("/relative/path?a=b:c"));
        assert!(!is_allowed_url("javascript:alert(1)"));
        assert!(!is_allowed_url("  JavaScript:alert(1)"));
        assert!(!is_allowed_url("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_allowed_url("vbscript:msgbox"));
    }

    #[test]
    fn test_only_greeting_placeholder_is_filled() {
        let brief = "Good morning, {{name}}.\n\n- Template {{name}} leaked into a feed title\n";
        let text = personalize_text(brief, "Dana");
        assert!(text.starts_with("Good morning, Dana."));
        assert!(text.contains("Template {{name}} leaked"));

        let html = personalize_html(brief, "Dana", "t");
        assert!(html.contains("<p>Good morning, Dana.</p>"));
        assert!(html.contains("Template {{name}} leaked"));
    }

    #[test]
    fn test_html_escapes_name() {
        let html = personalize_html(BRIEF, "<b>Eve</b>", "t");
        assert!(html.contains("Good morning, &lt;b&gt;Eve&lt;/b&gt;."));
        assert!(!html.contains("<b>Eve</b>"));
    }
}
