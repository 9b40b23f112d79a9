//! Result rendering.
//!
//! `render` turns a `ConsultResult` into a `RenderPlan`: a description of what
//! the result region should show. It does no I/O; views decide how a plan is
//! drawn and callers carry out the plan's post-render action.

use crate::model::{CaseRef, ConsultResult, StatuteRef};

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

/// Statutes whose law name contains this character belong to criminal law.
pub const CRIMINAL_LAW_MARKER: char = '刑';
pub const NO_STATUTES_PLACEHOLDER: &str = "無相關法條。";
pub const NO_CASES_PLACEHOLDER: &str = "無相關判例。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LawCategory {
    Criminal,
    Civil,
}

impl LawCategory {
    pub fn classify(law_name: &str) -> Self {
        if law_name.contains(CRIMINAL_LAW_MARKER) {
            LawCategory::Criminal
        } else {
            LawCategory::Civil
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            LawCategory::Criminal => "criminal",
            LawCategory::Civil => "civil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatuteCard {
    pub category: LawCategory,
    pub law_name: String,
    pub article_id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseCard {
    /// Court badge text.
    pub court: String,
    pub case_id: String,
    pub summary: String,
}

/// A result section: either cards, or an explicit placeholder when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
    Cards(Vec<T>),
    Placeholder(&'static str),
}

impl<T> Section<T> {
    fn from_cards(cards: Vec<T>, placeholder: &'static str) -> Self {
        if cards.is_empty() {
            Section::Placeholder(placeholder)
        } else {
            Section::Cards(cards)
        }
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[T] {
        match self {
            Section::Cards(cards) => cards,
            Section::Placeholder(_) => &[],
        }
    }
}

/// Action the caller performs on the view after drawing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRenderAction {
    ScrollIntoView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    pub summary_lines: Vec<String>,
    pub domains: Vec<String>,
    pub statutes: Section<StatuteCard>,
    pub cases: Section<CaseCard>,
    pub post_render: PostRenderAction,
}

fn statute_card(s: &StatuteRef) -> StatuteCard {
    StatuteCard {
        category: LawCategory::classify(&s.law_name),
        law_name: s.law_name.clone(),
        article_id: s.article_id.clone(),
        content: s.content.clone(),
    }
}

fn case_card(c: &CaseRef) -> CaseCard {
    CaseCard {
        court: c.court.clone(),
        case_id: c.case_id.clone(),
        summary: c.summary.clone(),
    }
}

pub fn render(result: &ConsultResult) -> RenderPlan {
    RenderPlan {
        summary_lines: result.summary.split('\n').map(str::to_string).collect(),
        domains: result.domains.clone(),
        statutes: Section::from_cards(
            result.statutes.iter().map(statute_card).collect(),
            NO_STATUTES_PLACEHOLDER,
        ),
        cases: Section::from_cards(
            result.cases.iter().map(case_card).collect(),
            NO_CASES_PLACEHOLDER,
        ),
        post_render: PostRenderAction::ScrollIntoView,
    }
}
