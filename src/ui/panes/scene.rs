//! Scene pane rendering
//!
//! Draws a projected [`Scene`]. Before a trace is available it shows the
//! kind's placeholder; afterwards it shows, for the current step:
//!
//! - the step header (step number, source line) and description
//! - the kind-specific body: array cells, call stack frames, loop counter,
//!   or every array of the step
//! - the variable table, in the order the step listed it
//! - the program output captured up to this step, when the step carries one
//!
//! The pane never looks at the trace itself; everything comes from the scene.

use super::utils::{border_style, clamp_offset, inner_height};
use crate::scene::{LiveScene, LoopCounter, Scene, SceneBody};
use crate::trace::NamedArray;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Scroll state for the scene pane
#[derive(Debug, Default)]
pub struct SceneScrollState {
    pub offset: usize,
}

/// Render the scene pane
pub fn render_scene_pane(
    frame: &mut Frame,
    area: Rect,
    scene: &Scene,
    is_focused: bool,
    scroll_state: &mut SceneScrollState,
) {
    let badge = if scene.is_live() {
        "Live Execution"
    } else {
        "Concept Preview"
    };
    let block = Block::default()
        .title(format!(" {} · {} ", badge, scene.kind()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let live = match scene {
        Scene::StaticPreview { kind } => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    kind.preview_label(),
                    Style::default()
                        .fg(DEFAULT_THEME.primary)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Run code to see execution",
                    Style::default().fg(DEFAULT_THEME.comment),
                )),
            ];
            let paragraph = Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }
        Scene::Live(live) => live,
    };

    let content_width = area.width.saturating_sub(2) as usize;
    let all_items = live_scene_lines(live, content_width)
        .into_iter()
        .map(ListItem::new)
        .collect::<Vec<_>>();

    let visible_height = inner_height(area.height);
    clamp_offset(&mut scroll_state.offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_uppercase(),
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::BOLD),
    ))
}

fn muted(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::ITALIC),
    ))
}

/// Every line of a live scene, before scrolling
fn live_scene_lines(live: &LiveScene, content_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let line_text = live
        .source_line
        .map_or_else(|| "-".to_string(), |line| line.to_string());
    lines.push(Line::from(vec![
        Span::styled(
            format!("Step {}", live.step_number),
            Style::default()
                .fg(DEFAULT_THEME.secondary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(
            format!("Line {}", line_text),
            Style::default().fg(DEFAULT_THEME.secondary),
        ),
    ]));
    for chunk in wrap_text(&live.description, content_width) {
        lines.push(Line::from(Span::styled(
            chunk,
            Style::default().fg(DEFAULT_THEME.fg),
        )));
    }
    lines.push(Line::from(""));

    match &live.body {
        SceneBody::Array { primary } => {
            let title = if primary.name.is_empty() {
                "Array Memory".to_string()
            } else {
                format!("{}[]", primary.name)
            };
            lines.push(Line::from(Span::styled(
                title,
                Style::default()
                    .fg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD),
            )));
            if primary.is_empty() {
                lines.push(muted("(no elements)"));
            } else {
                lines.extend(array_cells(primary, content_width));
            }
            lines.push(Line::from(""));
        }
        SceneBody::Stack { call_stack } => {
            lines.push(heading("Call Stack"));
            if call_stack.is_empty() {
                lines.push(muted("(main function not started)"));
            }
            // Innermost frame on top
            for (depth, function) in call_stack.iter().enumerate().rev() {
                let is_top = depth + 1 == call_stack.len();
                let name_style = if is_top {
                    Style::default()
                        .fg(DEFAULT_THEME.function)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(DEFAULT_THEME.muted_function)
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        if is_top { "▸ " } else { "  " },
                        Style::default().fg(DEFAULT_THEME.secondary),
                    ),
                    Span::styled(
                        format!("Frame {} ", depth),
                        Style::default().fg(DEFAULT_THEME.comment),
                    ),
                    Span::styled("│ ", Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(format!("{}()", function), name_style),
                ]));
            }
            lines.push(Line::from(""));
        }
        SceneBody::Loop { counter } => {
            lines.push(heading("Iteration"));
            let mut spans = vec![Span::styled(
                format!("  {}", counter.display()),
                Style::default()
                    .fg(DEFAULT_THEME.number)
                    .add_modifier(Modifier::BOLD),
            )];
            if let LoopCounter::Known { variable, .. } = counter {
                spans.push(Span::styled(
                    format!("  ({})", variable),
                    Style::default().fg(DEFAULT_THEME.comment),
                ));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        SceneBody::Generic { arrays } => {
            if !arrays.is_empty() {
                lines.push(heading("Arrays"));
                for array in arrays {
                    lines.push(Line::from(Span::styled(
                        array.name.clone(),
                        Style::default().fg(DEFAULT_THEME.variable),
                    )));
                    lines.extend(array_cells(array, content_width));
                }
                lines.push(Line::from(""));
            }
        }
    }

    lines.push(heading("Variables"));
    if live.variables.is_empty() {
        lines.push(muted("(no local variables)"));
    }
    let name_width = live
        .variables
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, value) in live.variables.iter() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<width$}", name, width = name_width),
                Style::default().fg(DEFAULT_THEME.variable),
            ),
            Span::styled(" : ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                value.to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.fg)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    if let Some(output) = live.output.as_deref().filter(|o| !o.is_empty()) {
        lines.push(Line::from(""));
        lines.push(heading("stdout"));
        for out_line in output.lines() {
            lines.push(Line::from(Span::styled(
                format!("  {}", out_line),
                Style::default().fg(DEFAULT_THEME.success),
            )));
        }
    }

    lines
}

/// Boxed cells with their indices underneath, wrapped to the pane width:
///
/// ```text
/// │ 5 │ 3 │ 10 │
///   0   1   2
/// ```
fn array_cells(array: &NamedArray, content_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut cells = Vec::new();
    let mut indices = Vec::new();
    let mut used = 1;

    for (idx, value) in array.values.iter().enumerate() {
        let cell_width = value.chars().count().max(idx.to_string().len()) + 2;
        if used + cell_width + 1 > content_width.max(cell_width + 2) && !cells.is_empty() {
            lines.push(finish_row(std::mem::take(&mut cells)));
            lines.push(Line::from(std::mem::take(&mut indices)));
            used = 1;
        }
        cells.push(Span::styled(
            format!("{:^width$}", value, width = cell_width),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ));
        indices.push(Span::styled(
            format!(" {:^width$}", idx, width = cell_width),
            Style::default().fg(DEFAULT_THEME.comment),
        ));
        used += cell_width + 1;
    }
    if !cells.is_empty() {
        lines.push(finish_row(cells));
        lines.push(Line::from(indices));
    }
    lines
}

fn finish_row(cells: Vec<Span<'static>>) -> Line<'static> {
    let sep = || Span::styled("│", Style::default().fg(DEFAULT_THEME.comment));
    let mut spans = vec![sep()];
    for cell in cells {
        spans.push(cell);
        spans.push(sep());
    }
    Line::from(spans)
}

/// Split text into chunks of at most `width` characters, on char boundaries
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{project, VisualizationKind};
    use crate::trace::TraceStep;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_array_cells_wrap_to_width() {
        let array = NamedArray::new("a", (0..20).map(|n| n.to_string()).collect());
        let lines = array_cells(&array, 24);
        assert!(lines.len() > 2);
        assert!(lines.iter().all(|l| text(l).chars().count() <= 24));
    }

    #[test]
    fn test_stack_rendered_innermost_first() {
        let step = TraceStep::new(3, Some(9)).with_call_stack(["main", "fact"]);
        let Scene::Live(live) = project(VisualizationKind::Stack, Some(&step)) else {
            panic!("expected live scene");
        };
        let rendered: Vec<String> = live_scene_lines(&live, 40).iter().map(text).collect();
        let fact = rendered.iter().position(|l| l.contains("fact()")).unwrap();
        let main = rendered.iter().position(|l| l.contains("main()")).unwrap();
        assert!(fact < main);
    }

    #[test]
    fn test_wrap_text_on_char_boundaries() {
        assert_eq!(wrap_text("héllo", 2), vec!["hé", "ll", "o"]);
        assert!(wrap_text("", 10).is_empty());
    }
}
