//! Text summary builder for CLI output.
//!
//! Formats a render plan and history lists as human-readable lines for text mode.

use crate::history::{format_created_at, EMPTY_HISTORY_PLACEHOLDER};
use crate::model::HistoryRecord;
use crate::render::{RenderPlan, Section};

#[cfg(test)]
#[path = "text_summary_test.rs"]
mod text_summary_test;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Build the text form of a rendered result.
pub(crate) fn build_text_summary(plan: &RenderPlan) -> TextSummary {
    let mut lines = Vec::new();

    lines.push("== 分析總結 ==".to_string());
    lines.extend(plan.summary_lines.iter().cloned());
    if !plan.domains.is_empty() {
        lines.push(format!("領域: {}", plan.domains.join(" / ")));
    }

    lines.push(String::new());
    lines.push("== 相關法條 ==".to_string());
    match &plan.statutes {
        Section::Cards(cards) => {
            for card in cards {
                lines.push(format!(
                    "[{}] {} {}",
                    card.category.badge(),
                    card.law_name,
                    card.article_id
                ));
                lines.push(format!("    {}", card.content));
            }
        }
        Section::Placeholder(text) => lines.push((*text).to_string()),
    }

    lines.push(String::new());
    lines.push("== 參考判例 ==".to_string());
    match &plan.cases {
        Section::Cards(cards) => {
            for card in cards {
                lines.push(format!("[{}] {}", card.court, card.case_id));
                lines.push(format!("    {}", card.summary));
            }
        }
        Section::Placeholder(text) => lines.push((*text).to_string()),
    }

    TextSummary { lines }
}

/// One line per record: id, short date and query.
pub(crate) fn build_history_lines(records: &[HistoryRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec![EMPTY_HISTORY_PLACEHOLDER.to_string()];
    }
    records
        .iter()
        .map(|r| {
            format!(
                "#{:<5} {:<12} {}",
                r.id,
                format_created_at(&r.created_at),
                r.query.replace('\n', " ")
            )
        })
        .collect()
}
