use super::*;

fn statute(law_name: &str) -> StatuteRef {
    StatuteRef {
        law_name: law_name.to_owned(),
        article_id: format!("{law_name}_1"),
        content: "條文".to_owned(),
    }
}

fn result(summary: &str, statutes: Vec<StatuteRef>, cases: Vec<CaseRef>) -> ConsultResult {
    ConsultResult {
        summary: summary.to_owned(),
        statutes,
        cases,
        domains: Vec::new(),
    }
}

#[test]
fn classify_detects_criminal_marker_anywhere_in_name() {
    assert_eq!(LawCategory::classify("刑法"), LawCategory::Criminal);
    assert_eq!(LawCategory::classify("中華民國刑法"), LawCategory::Criminal);
    assert_eq!(LawCategory::classify("刑事訴訟法"), LawCategory::Criminal);
}

#[test]
fn classify_defaults_to_civil() {
    for name in ["民法", "勞動基準法", "土地法", ""] {
        assert_eq!(LawCategory::classify(name), LawCategory::Civil, "{name}");
    }
}

#[test]
fn badges_use_category_names() {
    assert_eq!(LawCategory::Criminal.badge(), "criminal");
    assert_eq!(LawCategory::Civil.badge(), "civil");
}

#[test]
fn summary_line_breaks_become_lines() {
    let plan = render(&result("第一段\n第二段\n\n結論", vec![], vec![]));
    assert_eq!(plan.summary_lines, vec!["第一段", "第二段", "", "結論"]);
}

#[test]
fn summary_is_otherwise_untouched() {
    let plan = render(&result("  <b>原文</b>\t保留  ", vec![], vec![]));
    assert_eq!(plan.summary_lines, vec!["  <b>原文</b>\t保留  "]);
}

#[test]
fn empty_sections_render_placeholders() {
    let plan = render(&result("s", vec![], vec![]));
    assert_eq!(plan.statutes, Section::Placeholder(NO_STATUTES_PLACEHOLDER));
    assert_eq!(plan.cases, Section::Placeholder(NO_CASES_PLACEHOLDER));
    assert!(plan.statutes.cards().is_empty());
}

#[test]
fn statutes_keep_order_and_classification() {
    let plan = render(&result("s", vec![statute("民法"), statute("刑法")], vec![]));
    let cats: Vec<LawCategory> = plan.statutes.cards().iter().map(|c| c.category).collect();
    assert_eq!(cats, vec![LawCategory::Civil, LawCategory::Criminal]);
    assert_eq!(plan.statutes.cards()[1].article_id, "刑法_1");
}

#[test]
fn cases_carry_court_badge() {
    let case = CaseRef {
        court: "最高法院".to_owned(),
        case_id: "112台上1".to_owned(),
        summary: "要旨".to_owned(),
    };
    let plan = render(&result("s", vec![], vec![case]));
    let cards = plan.cases.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].court, "最高法院");
    assert_eq!(cards[0].case_id, "112台上1");
}

#[test]
fn plan_requests_scroll_into_view() {
    let plan = render(&result("s", vec![], vec![]));
    assert_eq!(plan.post_render, PostRenderAction::ScrollIntoView);
}

#[test]
fn render_is_deterministic() {
    let r = result("a\nb", vec![statute("刑法")], vec![]);
    assert_eq!(render(&r), render(&r));
}
