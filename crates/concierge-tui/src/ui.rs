use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use concierge_core::{parse_markup, Sender, Turn};
use crate::app::App;

/// Convert one turn's markup into styled lines. `<strong>` runs become bold.
fn markup_lines(text: &str) -> Vec<Line<'static>> {
    parse_markup(text)
        .into_iter()
        .map(|segments| {
            let spans: Vec<Span<'static>> = segments
                .into_iter()
                .map(|segment| {
                    if segment.strong {
                        Span::styled(segment.text, Style::default().add_modifier(Modifier::BOLD))
                    } else {
                        Span::raw(segment.text)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn turn_lines(turn: &Turn, persona_label: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match turn.sender {
        Sender::User => {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(turn.text.clone(), Style::default().fg(Color::Cyan))));
        }
        Sender::Ai => {
            lines.push(Line::from(Span::styled(
                format!("{}:", persona_label),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.extend(markup_lines(&turn.text));
            if turn.show_call_to_action {
                lines.push(Line::default());
                lines.push(Line::from(vec![
                    Span::styled(
                        " Get in Touch ",
                        Style::default().bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" Ctrl+G", Style::default().fg(Color::DarkGray)),
                ]));
            }
        }
    }

    lines.push(Line::default());
    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let persona = app.session.persona();

    let title = Line::from(vec![
        Span::styled(format!(" {} ", persona.name), Style::default().fg(Color::Cyan).bold()),
        Span::styled(persona.tagline.clone(), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(
            format!("{}: {}", app.client.provider().as_str(), app.client.model()),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let label = "Concierge";

    let view = app.session.view();
    let mut lines: Vec<Line> = Vec::new();
    for turn in view.turns {
        lines.extend(turn_lines(turn, label));
    }

    if view.busy {
        lines.push(Line::from(Span::styled(
            format!("{}:", label),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Store inner size for paging, then clamp the scroll to the content
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    // Measured with the same word wrapping the widget renders with
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = u16::try_from(chat.line_count(app.chat_width)).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(app.chat_height);
    if app.follow_bottom || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_bottom = true;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let chat = chat.block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.is_busy();
    let border_color = if busy { Color::DarkGray } else { Color::Yellow };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if busy { " Please wait " } else { " Send (Enter) " });

    let draft = app.session.draft();

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(
            app.session.persona().input_placeholder.clone(),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = draft
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        let style = if busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };
        Paragraph::new(visible_text).style(style)
    };

    frame.render_widget(input.block(input_block), area);

    if !busy {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Ctrl+G ", key_style),
        Span::styled(" get in touch ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    if let Some(status) = &app.status {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
