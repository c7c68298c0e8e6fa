//! Source code pane rendering with syntax highlighting
//!
//! Displays the learner's C program with the line of the current trace step
//! highlighted. The highlighted line comes from the player's line channel, so
//! the pane only follows it and never works it out from the step itself.
//!
//! Highlighting is a small character scanner (comments, string and char
//! literals, preprocessor lines, keywords); it does not need to understand C.

use super::utils::{border_style, clamp_offset, inner_height};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Syntax highlighting for one line of C
fn highlight_source_code(line: &str) -> Line<'_> {
    if line.trim_start().starts_with('#') {
        return Line::from(Span::styled(
            line,
            Style::default().fg(DEFAULT_THEME.keyword),
        ));
    }

    let mut spans = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '/' && matches!(chars.peek(), Some((_, '/'))) {
            flush_word(line, &mut spans, &mut word_start, i, Some(c));
            spans.push(Span::styled(
                &line[i..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            return Line::from(spans);
        }

        if c == '"' || c == '\'' {
            flush_word(line, &mut spans, &mut word_start, i, Some(c));
            let mut end = line.len();
            while let Some((j, d)) = chars.next() {
                if d == '\\' {
                    chars.next();
                } else if d == c {
                    end = j + d.len_utf8();
                    break;
                }
            }
            spans.push(Span::styled(
                &line[i..end],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            continue;
        }

        if c.is_alphanumeric() || c == '_' {
            word_start.get_or_insert(i);
            continue;
        }

        flush_word(line, &mut spans, &mut word_start, i, Some(c));
        let style = match c {
            '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
            _ => Style::default().fg(DEFAULT_THEME.fg),
        };
        spans.push(Span::styled(&line[i..i + c.len_utf8()], style));
    }

    flush_word(line, &mut spans, &mut word_start, line.len(), None);
    Line::from(spans)
}

/// Emit the identifier or number that ends at `end`, if one is open
fn flush_word<'a>(
    line: &'a str,
    spans: &mut Vec<Span<'a>>,
    start: &mut Option<usize>,
    end: usize,
    next: Option<char>,
) {
    if let Some(s) = start.take() {
        let word = &line[s..end];
        spans.push(Span::styled(word, keyword_style(word, next == Some('('))));
    }
}

fn keyword_style(word: &str, is_call: bool) -> Style {
    match word {
        "int" | "char" | "void" | "bool" | "float" | "double" | "long" | "short" | "unsigned"
        | "signed" | "FILE" | "size_t" => Style::default().fg(DEFAULT_THEME.type_name),
        "struct" | "typedef" | "const" | "static" | "return" | "if" | "else" | "while" | "for"
        | "do" | "switch" | "case" | "default" | "break" | "continue" | "goto" | "sizeof" => {
            Style::default()
                .fg(DEFAULT_THEME.keyword)
                .add_modifier(Modifier::BOLD)
        }
        "NULL" | "EOF" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.chars().all(|c| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ if is_call => Style::default().fg(DEFAULT_THEME.function),
        _ => Style::default().fg(DEFAULT_THEME.fg),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the highlighted line is pinned to (None = centre on first render)
    pub target_line_row: Option<usize>,
    /// Whether the last render followed a highlighted line
    following_line: bool,
}

impl SourceScrollState {
    /// Scroll one row towards the top of the file
    pub fn scroll_up(&mut self) {
        match self.target_line_row {
            // The highlighted line moves down visually
            Some(row) if self.following_line => {
                self.target_line_row = Some(row.saturating_add(1));
            }
            _ => self.offset = self.offset.saturating_sub(1),
        }
    }

    /// Scroll one row towards the end of the file
    pub fn scroll_down(&mut self) {
        match self.target_line_row {
            Some(row) if self.following_line => {
                self.target_line_row = Some(row.saturating_sub(1));
            }
            _ => self.offset = self.offset.saturating_add(1),
        }
    }
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: Option<u32>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let block = Block::default()
        .title(" Source Code ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if source_code.trim().is_empty() {
        let paragraph = Paragraph::new("(no source loaded; pass --source FILE.c)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();
    let visible_height = inner_height(area.height);

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    let current_line = current_line
        .map(|line| line as usize)
        .filter(|&line| line >= 1 && line <= total_lines);

    scroll_state.following_line = current_line.is_some();

    // Keep the highlighted line at the pinned row while stepping
    if let Some(line) = current_line {
        scroll_state.offset = (line - 1).saturating_sub(target_row);
    }
    clamp_offset(&mut scroll_state.offset, total_lines, visible_height);

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = current_line == Some(line_num);

            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };
            let marker = if is_current { "▶" } else { " " };

            let mut content_line = highlight_source_code(line);
            if is_current {
                for span in &mut content_line.spans {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_highlight_preserves_text() {
        for src in [
            "int main() {",
            "    printf(\"%d\\n\", a[i]); // print",
            "    char c = '\\'';",
            "    int é = 1;",
        ] {
            assert_eq!(text(&highlight_source_code(src)), src);
        }
    }

    fn numbered_source(lines: usize) -> String {
        (1..=lines)
            .map(|n| format!("int v{} = {};", n, n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(source: &str, current_line: Option<u32>, state: &mut SourceScrollState) {
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|f| render_source_pane(f, f.area(), source, current_line, true, state))
            .unwrap();
    }

    #[test]
    fn test_scroll_moves_view_without_highlight() {
        let source = numbered_source(40);
        let mut state = SourceScrollState::default();
        render(&source, None, &mut state);
        assert_eq!(state.offset, 0);

        state.scroll_down();
        state.scroll_down();
        render(&source, None, &mut state);
        assert_eq!(state.offset, 2);

        state.scroll_up();
        render(&source, None, &mut state);
        assert_eq!(state.offset, 1);
    }

    #[test]
    fn test_scroll_shifts_pinned_row_with_highlight() {
        let source = numbered_source(40);
        let mut state = SourceScrollState::default();
        render(&source, Some(20), &mut state);
        let row = state.target_line_row.unwrap();
        let offset = state.offset;

        state.scroll_down();
        render(&source, Some(20), &mut state);
        assert_eq!(state.target_line_row, Some(row - 1));
        assert_eq!(state.offset, offset + 1);
    }

    #[test]
    fn test_call_names_styled_as_functions() {
        let line = highlight_source_code("fact(n - 1);");
        let fact = line.spans.iter().find(|s| s.content == "fact").unwrap();
        assert_eq!(fact.style.fg, Some(DEFAULT_THEME.function));
    }
}
