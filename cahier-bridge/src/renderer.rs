//! Notebook renderer: the cell list, the edit surfaces, and the footer,
//! drawn with ratatui.

use cahier_core::notebook::{EditBuffer, Mode, NotebookState};
use cahier_core::{Command, Status};

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph};
use ratatui::Frame;

// ════════════════════════════════════════════════════════════════════
// Colors
// ════════════════════════════════════════════════════════════════════

/// Pastel rainbow cycled through by the selected cell's border.
const RAINBOW: [(u8, u8, u8); 18] = [
    (0xFF, 0xB3, 0xBA), // pink
    (0xFF, 0xC7, 0xB3),
    (0xFF, 0xDA, 0xB3), // orange
    (0xFF, 0xED, 0xB3),
    (0xFF, 0xFF, 0xB3), // yellow
    (0xD7, 0xFF, 0xB3),
    (0xBA, 0xFF, 0xB3), // green
    (0xB3, 0xFF, 0xD7),
    (0xB3, 0xFF, 0xFF), // cyan
    (0xB3, 0xE5, 0xFF),
    (0xB3, 0xCC, 0xFF),
    (0xB3, 0xBA, 0xFF), // blue
    (0xC7, 0xB3, 0xFF),
    (0xD3, 0xB3, 0xFF),
    (0xE0, 0xB3, 0xFF), // purple
    (0xED, 0xB3, 0xFF),
    (0xFF, 0xB3, 0xF0), // magenta
    (0xFF, 0xB3, 0xD7),
];

const MUTED_PURPLE: Color = Color::Rgb(0xB1, 0x9C, 0xD9);
const LIGHT_GRAY: Color = Color::Rgb(0xE8, 0xE8, 0xE8);

/// Position in the rainbow: the list's color phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rainbow {
    phase: usize,
}

impl Rainbow {
    pub fn advance(&mut self) {
        self.phase = (self.phase + 1) % RAINBOW.len();
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn color(&self) -> Color {
        let (r, g, b) = RAINBOW[self.phase];
        Color::Rgb(r, g, b)
    }
}

// ════════════════════════════════════════════════════════════════════
// Text helpers
// ════════════════════════════════════════════════════════════════════

pub const EMPTY_STATE: &str = "📝 No commands yet. Press 'n' to create one.";

pub fn footer_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::View => "n: New cell - enter: Edit selected command - ctrl+d: Quit",
        Mode::Edit => "ctrl+s: Save - ctrl+r: Run - escape: Cancel - ctrl+d: Quit",
        Mode::NewEntry => "ctrl+r: Run - escape: Cancel - ctrl+d: Quit",
    }
}

/// `"3:"`, right-aligned in the gutter.
pub fn cell_label(index: usize) -> String {
    format!("{:>4} ", format!("{}:", index + 1))
}

/// Outcome marker shown at the end of a cell's first line.
pub fn status_badge(cmd: &Command) -> Option<(String, Color)> {
    match cmd.status {
        Status::Unset => None,
        Status::Running => Some(("● running".to_string(), Color::Yellow)),
        Status::Success => Some((format!("✔ {}", cmd.return_code), Color::Green)),
        Status::Failed => Some((format!("✘ {}", cmd.return_code), Color::Red)),
    }
}

/// Buffer contents split into lines, with the cursor drawn as a reversed
/// cell.
pub fn buffer_lines(buf: &EditBuffer, base: Style) -> Vec<Line<'static>> {
    let cursor_style = base.add_modifier(Modifier::REVERSED);
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();

    let flush = |run: &mut String, spans: &mut Vec<Span<'static>>| {
        if !run.is_empty() {
            spans.push(Span::styled(std::mem::take(run), base));
        }
    };

    let mut len = 0;
    for (i, c) in buf.text().chars().enumerate() {
        len = i + 1;
        let at_cursor = i == buf.cursor();
        if c == '\n' {
            flush(&mut run, &mut spans);
            if at_cursor {
                spans.push(Span::styled(" ", cursor_style));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
        } else if at_cursor {
            flush(&mut run, &mut spans);
            spans.push(Span::styled(c.to_string(), cursor_style));
        } else {
            run.push(c);
        }
    }
    flush(&mut run, &mut spans);
    if buf.cursor() >= len {
        spans.push(Span::styled(" ", cursor_style));
    }
    lines.push(Line::from(spans));
    lines
}

// ════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════

pub fn draw(frame: &mut Frame, state: &NotebookState, rainbow: &Rainbow) {
    let composer_height = match state.active_buffer() {
        Some(buf) if state.mode() == Mode::NewEntry => composer_height(buf),
        _ => 0,
    };

    let [title, list, composer, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(composer_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new(Span::styled(
            " Cahier ",
            Style::new().bg(Color::Indexed(99)).fg(Color::White),
        )),
        title,
    );

    draw_cells(frame, list, state, rainbow);

    if composer_height > 0 {
        if let Some(buf) = state.active_buffer() {
            draw_composer(frame, composer, buf);
        }
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            footer_hint(state.mode()),
            Style::new().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
        footer,
    );
}

/// Text lines plus the two border rows, between 3 and 10 rows tall.
pub fn composer_height(buf: &EditBuffer) -> u16 {
    let lines = buf.text().split('\n').count();
    lines.saturating_add(2).clamp(3, 10) as u16
}

fn draw_cells(frame: &mut Frame, area: Rect, state: &NotebookState, rainbow: &Rainbow) {
    if state.commands().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                EMPTY_STATE,
                Style::new().fg(MUTED_PURPLE).add_modifier(Modifier::ITALIC),
            ))
            .block(Block::new().padding(Padding::new(4, 4, 1, 1))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = state
        .commands()
        .iter()
        .enumerate()
        .map(|(i, cmd)| {
            let selected = state.focus() == Some(i);
            let inline = if selected && state.mode() == Mode::Edit {
                state.active_buffer()
            } else {
                None
            };
            cell_item(i, cmd, selected, inline, rainbow, area.width)
        })
        .collect();

    let mut list_state = ListState::default().with_selected(state.focus());
    frame.render_stateful_widget(List::new(items), area, &mut list_state);
}

fn cell_item(
    index: usize,
    cmd: &Command,
    selected: bool,
    editing: Option<&EditBuffer>,
    rainbow: &Rainbow,
    width: u16,
) -> ListItem<'static> {
    let (accent, bar, text_style) = if selected {
        let color = rainbow.color();
        (
            Style::new().fg(color).add_modifier(Modifier::BOLD),
            "┃ ",
            Style::new().add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::new().fg(MUTED_PURPLE), "│ ", Style::new().fg(LIGHT_GRAY))
    };
    let bar_style = if selected { accent } else { Style::new().fg(LIGHT_GRAY) };

    let body: Vec<Line<'static>> = match editing {
        Some(buf) => buffer_lines(buf, text_style),
        None => cmd
            .text
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
            .collect(),
    };

    let mut lines = Vec::with_capacity(body.len() + 1);
    for (n, line) in body.into_iter().enumerate() {
        let gutter = if n == 0 { cell_label(index) } else { " ".repeat(5) };
        let mut spans = vec![Span::styled(gutter, accent), Span::styled(bar, bar_style)];
        spans.extend(line.spans);

        if n == 0 {
            if let Some((badge, color)) = status_badge(cmd) {
                let used: usize = spans.iter().map(|s| s.width()).sum();
                let badge_width = Span::raw(badge.as_str()).width();
                let pad = (width as usize).saturating_sub(used + badge_width + 1).max(2);
                spans.push(Span::raw(" ".repeat(pad)));
                spans.push(Span::styled(badge, Style::new().fg(color)));
            }
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::default());

    ListItem::new(Text::from(lines))
}

fn draw_composer(frame: &mut Frame, area: Rect, buf: &EditBuffer) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(LIGHT_GRAY))
        .title(Span::styled(" New: ", Style::new().fg(MUTED_PURPLE)));
    frame.render_widget(
        Paragraph::new(Text::from(buffer_lines(buf, Style::new()))).block(block),
        area,
    );
}
