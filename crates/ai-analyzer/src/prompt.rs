//! Prompt construction.

use brief_core::{AnalysisRequest, InsightPrompt, Solicitation};

use crate::api_types::ChatMessage;

/// System prompt shared by every request.
pub const SYSTEM_PROMPT: &str = "You are a federal contracting analyst writing one section of a \
daily brief for capture and business-development teams. Be concise, concrete and neutral. \
Do not invent facts that are not in the provided material. Treat items marked as \
unconfirmed reporting with caution.";

/// Items listed per category.
const MAX_LISTED: usize = 10;

/// Build the chat messages for one program and prompt.
pub fn build_messages(request: &AnalysisRequest<'_>, prompt: InsightPrompt) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(request, prompt)),
    ]
}

fn user_prompt(request: &AnalysisRequest<'_>, prompt: InsightPrompt) -> String {
    let mut out = format!(
        "Program: {} ({})\nDate: {}\n",
        request.program_name,
        request.program_code,
        request.today.format("%Y-%m-%d")
    );
    if !request.keywords.is_empty() {
        out.push_str(&format!("Keywords: {}\n", request.keywords.join(", ")));
    }

    out.push_str("\nNews (last 24 hours):\n");
    if request.news.is_empty() {
        out.push_str("- none\n");
    }
    for item in request.news.iter().take(MAX_LISTED) {
        out.push_str(&format!("- {} ({})\n", item.title, item.source));
    }

    list_solicitations(&mut out, "New or updated opportunities", request.new_opportunities);
    list_solicitations(&mut out, "Closing within 7 days", request.closing_soon);

    out.push('\n');
    out.push_str(&match prompt {
        InsightPrompt::WhatThisMeans => format!(
            "In two or three sentences, explain what today's activity means for contractors \
             pursuing work on {}.",
            request.program_name
        ),
        InsightPrompt::NextActions => "List two to four concrete next actions for the coming \
             week as Markdown bullet points, each starting with \"- \"."
            .to_string(),
    });
    out
}

fn list_solicitations(out: &mut String, heading: &str, items: &[Solicitation]) {
    out.push_str(&format!("\n{}:\n", heading));
    if items.is_empty() {
        out.push_str("- none\n");
    }
    for s in items.iter().take(MAX_LISTED) {
        let close = s
            .close_date
            .map(|d| format!(", closes {}", d.format("%Y-%m-%d")))
            .unwrap_or_default();
        out.push_str(&format!("- {}: {} ({}{})\n", s.opp_no, s.title, s.agency, close));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_core::ContentItem;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_prompt_lists_inputs() {
        let news = vec![ContentItem::new("GSA awards OASIS+ task order", "", "u", "GSA", Utc::now())];
        let closing = vec![Solicitation {
            opp_no: "47QRCA-26-0001".to_string(),
            title: "Enterprise IT support".to_string(),
            agency: "GSA".to_string(),
            status: "OPEN".to_string(),
            close_date: NaiveDate::from_ymd_opt(2026, 10, 20),
            url: "https://sam.gov".to_string(),
            program_code: "oasis".to_string(),
        }];
        let keywords = vec!["oasis".to_string()];
        let request = AnalysisRequest {
            program_code: "oasis",
            program_name: "GSA OASIS+",
            keywords: &keywords,
            news: &news,
            new_opportunities: &[],
            closing_soon: &closing,
            today: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        };

        let messages = build_messages(&request, InsightPrompt::NextActions);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");

        let user = &messages[1].content;
        assert!(user.starts_with("Program: GSA OASIS+ (oasis)\nDate: 2026-10-16\n"));
        assert!(user.contains("- GSA awards OASIS+ task order (GSA)"));
        assert!(user.contains("New or updated opportunities:\n- none"));
        assert!(user.contains("- 47QRCA-26-0001: Enterprise IT support (GSA, closes 2026-10-20)"));
        assert!(user.contains("bullet points"));
    }
}
