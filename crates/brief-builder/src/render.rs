//! Markdown rendering of sections and the full brief.
//!
//! Entries are one Markdown list line each, so a section's `item_count`
//! always matches the number of entry lines under its item headings.

use brief_core::{
    BriefSection, ContentItem, InsightPrompt, NewBrief, ReliabilityClassifier, ReliabilityTier,
    Solicitation,
};
use chrono::{DateTime, NaiveDate, Utc};

/// Placeholder replaced with the subscriber's name at send time.
pub const NAME_PLACEHOLDER: &str = "{{name}}";
/// Marker prefixed to every signal entry.
pub const UNVERIFIED_MARKER: &str = "(Unverified)";
/// Title of the section built from unattributed news.
pub const GENERAL_TITLE: &str = "General Federal Contracting News";
/// Tag of the general section.
pub const GENERAL_TAG: &str = "general";

const LEGEND: &str = "**How to read this brief**\n\n\
- **Confirmed**: official sources or announcements.\n\
- **Developing**: credible reporting that is still unfolding.\n\
- **Signal**: rumors and unverified chatter. Treat these as leads, not facts.";

/// News split by reliability tier, preserving input order within each tier.
#[derive(Debug, Default)]
pub struct ClassifiedNews<'a> {
    pub confirmed: Vec<&'a ContentItem>,
    pub developing: Vec<&'a ContentItem>,
    pub signals: Vec<&'a ContentItem>,
}

impl<'a> ClassifiedNews<'a> {
    pub fn classify(classifier: &ReliabilityClassifier, items: &'a [ContentItem]) -> Self {
        let mut news = Self::default();
        for item in items {
            match classifier.classify(item) {
                ReliabilityTier::Confirmed => news.confirmed.push(item),
                ReliabilityTier::Developing => news.developing.push(item),
                ReliabilityTier::Signal => news.signals.push(item),
            }
        }
        news
    }

    pub fn len(&self) -> usize {
        self.confirmed.len() + self.developing.len() + self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything rendered into one section.
#[derive(Debug)]
pub struct SectionParts<'a> {
    pub title: &'a str,
    pub program_code: Option<&'a str>,
    pub news: ClassifiedNews<'a>,
    pub new_opportunities: &'a [Solicitation],
    pub closing_soon: &'a [Solicitation],
    pub narrative: Vec<(InsightPrompt, String)>,
}

/// Render a section, or `None` when it has no items.
pub fn render_section(parts: &SectionParts<'_>) -> Option<BriefSection> {
    let item_count = parts.news.len() + parts.new_opportunities.len() + parts.closing_soon.len();
    if item_count == 0 {
        return None;
    }

    let signals: Vec<String> = parts.news.signals.iter().map(|i| signal_entry(i)).collect();

    let mut content = format!("## {}\n", parts.title);
    push_group(
        &mut content,
        ReliabilityTier::Confirmed.label(),
        parts.news.confirmed.iter().map(|i| news_entry(i)).collect(),
    );
    push_group(
        &mut content,
        ReliabilityTier::Developing.label(),
        parts.news.developing.iter().map(|i| news_entry(i)).collect(),
    );
    push_group(&mut content, "Signals & Rumors", signals.clone());
    push_group(
        &mut content,
        "New Opportunities",
        parts.new_opportunities.iter().map(solicitation_entry).collect(),
    );
    push_group(
        &mut content,
        "Closing Soon",
        parts.closing_soon.iter().map(solicitation_entry).collect(),
    );

    for (prompt, text) in &parts.narrative {
        let text = text.trim();
        if !text.is_empty() {
            content.push_str(&format!("\n### {}\n\n{}\n", prompt.heading(), text));
        }
    }

    let tag = parts.program_code.unwrap_or(GENERAL_TAG).to_string();

    Some(BriefSection {
        program_code: parts.program_code.map(str::to_string),
        title: parts.title.to_string(),
        content,
        tags: vec![tag],
        item_count,
        signals: signals.join("\n"),
    })
}

fn push_group(out: &mut String, heading: &str, entries: Vec<String>) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("\n### {}\n\n", heading));
    for entry in entries {
        out.push_str(&entry);
        out.push('\n');
    }
}

/// One news entry: title link, source and publication date.
pub fn news_entry(item: &ContentItem) -> String {
    format!(
        "- {} - {}, {}",
        link(&item.title, &item.url),
        item.source,
        item.published_at.format("%b %-d, %Y")
    )
}

/// A news entry carrying the unverified marker.
pub fn signal_entry(item: &ContentItem) -> String {
    format!("- {} {}", UNVERIFIED_MARKER, &news_entry(item)[2..])
}

/// One solicitation entry: number and title link, agency, status and close date.
pub fn solicitation_entry(s: &Solicitation) -> String {
    let close = s
        .close_date
        .map(|d| format!(", closes {}", d.format("%b %-d, %Y")))
        .unwrap_or_default();
    format!(
        "- {} - {}, {}{}",
        link(&format!("{}: {}", s.opp_no, s.title), &s.url),
        s.agency,
        s.status,
        close
    )
}

/// A Markdown link, or the bare text when the URL is not an http(s) address.
fn link(text: &str, url: &str) -> String {
    let text = text.replace('[', "\\[").replace(']', "\\]");
    let url = url.trim();
    if is_web_url(url) {
        format!("[{}]({})", text, url)
    } else {
        text
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("https://") || lower.starts_with("http://"))
        && !url.contains(|c: char| c.is_whitespace() || c == '<' || c == '>')
}

/// Title of the brief for a day.
pub fn document_title(day: NaiveDate) -> String {
    format!("Federal Contracting Brief - {}", day.format("%B %-d, %Y"))
}

fn header(day: NaiveDate) -> String {
    format!(
        "# {}\n\nGood morning, {}. Here is your federal contracting brief for {}.",
        document_title(day),
        NAME_PLACEHOLDER,
        day.format("%A, %B %-d, %Y")
    )
}

/// Assemble the full brief from rendered sections.
pub fn compose(day: NaiveDate, created_at: DateTime<Utc>, sections: Vec<BriefSection>) -> NewBrief {
    let mut content = header(day);
    for section in &sections {
        content.push_str("\n\n");
        content.push_str(section.content.trim_end());
    }
    content.push_str("\n\n---\n\n");
    content.push_str(LEGEND);
    content.push('\n');

    let mut tags: Vec<String> = Vec::new();
    for tag in sections.iter().flat_map(|s| s.tags.iter()) {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }

    NewBrief {
        title: document_title(day),
        content,
        sections,
        tags,
        brief_date: day,
        created_at,
    }
}
