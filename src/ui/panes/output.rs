//! Program output pane rendering
//!
//! Shows what the generation service reported for the whole run: the
//! program's output (or the compile error), coloured by success, followed by
//! the service's short analysis.

use super::utils::{border_style, clamp_offset, inner_height};
use crate::trace::CompilationResult;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

/// Render the output pane.
///
/// `scroll_offset` of `usize::MAX` sticks to the bottom.
pub fn render_output_pane(
    frame: &mut Frame,
    area: Rect,
    result: &CompilationResult,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Terminal / Output ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused))
        .padding(Padding::new(1, 0, 0, 0));

    let all_items: Vec<ListItem> = output_lines(result)
        .into_iter()
        .map(ListItem::new)
        .collect();

    let visible_height = inner_height(area.height);
    clamp_offset(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn output_lines(result: &CompilationResult) -> Vec<Line<'static>> {
    let output_color = if result.success {
        DEFAULT_THEME.success
    } else {
        DEFAULT_THEME.error
    };

    let mut lines = vec![Line::from(Span::styled(
        "$ ./a.out",
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::DIM),
    ))];

    if result.output.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no output)",
            Style::default().fg(DEFAULT_THEME.comment),
        )));
    }
    for text in result.output.lines() {
        lines.push(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(output_color),
        )));
    }

    if let Some(analysis) = result.analysis.as_deref().filter(|a| !a.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "AI Analysis:",
            Style::default().fg(DEFAULT_THEME.primary),
        )));
        for text in analysis.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            )));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_output_in_error_colour() {
        let lines = output_lines(&CompilationResult::failure("offline"));
        let error_line = &lines[1];
        assert_eq!(error_line.spans[0].style.fg, Some(DEFAULT_THEME.error));
        assert!(lines
            .iter()
            .any(|l| l.spans.iter().any(|s| s.content == "AI Analysis:")));
    }
}
