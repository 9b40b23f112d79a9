use crate::prompts::SamplePrompt;
use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn key_line(key: &str, width: usize, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(width.saturating_sub(key.chars().count()) + 2)),
        Span::raw(desc.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let mut lines = vec![
        Line::from("Keybinds:"),
        key_line("Ctrl-C", 10, "Quit"),
        key_line("Enter", 10, "Submit the case"),
        key_line("Alt-Enter", 10, "New line"),
        key_line("Esc", 10, "Clear input"),
        key_line("Tab", 10, "Switch between input and history"),
        key_line("F6", 10, "Show/hide the history panel"),
        key_line("PgUp/PgDn", 10, "Scroll the analysis"),
        key_line("Ctrl-R", 10, "Refresh history"),
        key_line("F1", 10, "Show this help"),
    ];
    for (i, sample) in SamplePrompt::ALL.iter().enumerate() {
        lines.push(key_line(
            &format!("F{}", i + 2),
            10,
            &format!("Load example: {}", sample.title()),
        ));
    }
    lines.extend([
        Line::from(""),
        Line::from("History:"),
        key_line("↑/↓ or j/k", 10, "Navigate"),
        key_line("h", 10, "Hide the panel"),
        key_line("Enter", 10, "Restore selected"),
        key_line("d", 10, "Delete selected"),
        key_line("e", 10, "Export selected as JSON"),
        key_line("y", 10, "Copy selected analysis to clipboard"),
    ]);

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
