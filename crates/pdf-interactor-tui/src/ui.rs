use pdf_interactor_core::{Sender, UiPhase};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, BackendStatus, InputMode};

const INPUT_PLACEHOLDER: &str = "Ask a question about the PDF...";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("**") else {
            break;
        };

        if !rest[..start].is_empty() {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        let bold = &after_open[..end];
        if bold.is_empty() {
            spans.push(Span::raw("****"));
        } else {
            spans.push(Span::styled(
                bold.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after_open[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.phase() {
        UiPhase::Idle => render_upload_screen(app, frame, body_area),
        UiPhase::Active => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.input_mode == InputMode::SelectingFile {
        render_path_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match &app.backend_status {
        BackendStatus::Unknown => Span::raw(""),
        BackendStatus::Checking => {
            Span::styled(" backend: checking ", Style::default().fg(Color::Gray))
        }
        BackendStatus::Online(message) => {
            Span::styled(format!(" {} ", message), Style::default().fg(Color::Green))
        }
        BackendStatus::Offline => {
            Span::styled(" backend: offline ", Style::default().fg(Color::Red))
        }
    };

    let document = app
        .document_name
        .as_ref()
        .map(|name| format!(" [{}]", name))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" PDF Interactor ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(document, Style::default().fg(Color::White)),
        status,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let subtitle = Line::from(Span::styled(
        " Upload a PDF and start asking questions",
        Style::default().fg(Color::Gray).italic(),
    ));

    let header = Paragraph::new(vec![title, subtitle]).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" ASK ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::SelectingFile => (" FILE ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |k: &'static str, label: &'static str| {
        [
            Span::styled(k, key_style),
            Span::styled(label, label_style),
        ]
    };

    let hints: Vec<Span> = match (app.phase(), app.input_mode) {
        (_, InputMode::SelectingFile) => [hint(" Enter ", " select "), hint(" Esc ", " cancel ")].concat(),
        (UiPhase::Idle, _) => [
            hint(" s ", " select PDF "),
            hint(" u ", " upload "),
            hint(" q ", " quit "),
        ]
        .concat(),
        (UiPhase::Active, InputMode::Editing) => {
            [hint(" Enter ", " send "), hint(" Esc ", " stop typing ")].concat()
        }
        (UiPhase::Active, InputMode::Normal) if app.view.is_in_flight() => {
            [hint(" j/k ", " scroll "), hint(" q ", " quit ")].concat()
        }
        (UiPhase::Active, InputMode::Normal) => [
            hint(" i ", " ask "),
            hint(" j/k ", " scroll "),
            hint(" u ", " new upload "),
            hint(" q ", " quit "),
        ]
        .concat(),
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    spans.extend(hints);

    if let Some(err) = app.view.last_error().or(app.upload_error.as_deref()) {
        spans.push(Span::styled(
            format!(" error: {} ", err),
            Style::default().bg(Color::Black).fg(Color::Red),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_upload_screen(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let selected = match &app.selected_path {
        Some(path) => Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Gray)),
            Span::styled(path.display().to_string(), Style::default().fg(Color::Cyan)),
        ]),
        None => Line::from(Span::styled(
            "No file selected",
            Style::default().fg(Color::Gray).italic(),
        )),
    };

    let button_style = Style::default().fg(Color::Black).bg(Color::Cyan).bold();
    let lines = vec![
        Line::from(Span::styled("▲", Style::default().fg(Color::Cyan).bold())),
        Line::default(),
        Line::from("Upload a PDF to begin your conversation."),
        Line::default(),
        selected,
        Line::default(),
        Line::from(vec![
            Span::styled(" Select PDF (s) ", button_style),
            Span::raw("   "),
            Span::styled(" Upload (u) ", button_style),
        ]),
    ];

    let [content_area] = Layout::vertical([Constraint::Length(lines.len() as u16)])
        .flex(Flex::Center)
        .areas(inner);

    let prompt = Paragraph::new(lines).centered();
    frame.render_widget(prompt, content_area);
}

/// The wrapped conversation log.
///
/// Scroll math counts rows from this same paragraph, so both agree on wrapping.
pub fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for msg in app.view.messages() {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Sender::Ai => {
                lines.push(Line::from(Span::styled(
                    "AI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        if msg.text.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::default());
    }

    if app.view.is_in_flight() {
        lines.push(Line::from(Span::styled(
            "AI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false })
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_focused = app.input_mode == InputMode::Normal;
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if chat_focused { Color::Cyan } else { Color::DarkGray }))
        .title(format!(" Conversation ({} asked) ", app.message_count(Sender::User)));

    let chat = chat_paragraph(app)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_question_input(app, frame, input_area);
}

fn render_question_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let disabled = app.view.is_in_flight();

    let border_color = if disabled {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if disabled { " Waiting for answer... " } else { " Ask " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll so the cursor stays visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if app.view.input().is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER).style(Style::default().fg(Color::DarkGray).italic())
    } else {
        let visible_text: String = app
            .view
            .input()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    if editing && !disabled {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_path_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height);

    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Select PDF ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // Instructions only when there is room for them above the input
    let input_area = if inner.height >= 3 {
        let instructions = Paragraph::new("Path to the PDF. Enter to select, Esc to cancel.")
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));
        Rect::new(inner.x, inner.y + 2, inner.width, 1)
    } else {
        Rect::new(inner.x, inner.y, inner.width, 1)
    };

    let width = input_area.width as usize;
    let offset = if app.path_cursor >= width {
        app.path_cursor - width + 1
    } else {
        0
    };
    let visible: String = app.path_input.chars().skip(offset).take(width).collect();
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    let cursor_x = (app.path_cursor - offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_interactor_core::{AskError, Config};
    use ratatui::{backend::TestBackend, Terminal};

    fn test_app() -> App {
        App::new(&Config {
            api_url: Some("http://127.0.0.1:1".to_string()),
            greeting: None,
        })
    }

    fn draw(app: &mut App) -> String {
        draw_sized(app, 80, 20)
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_markdown_bold_spans() {
        let line = parse_markdown_line("a **b** c");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "b");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_markdown_unclosed_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "a **b");
    }

    #[test]
    fn test_idle_screen_shows_upload_prompt() {
        let mut app = test_app();
        let screen = draw(&mut app);
        assert!(screen.contains("PDF Interactor"));
        assert!(screen.contains("Upload a PDF to begin your conversation."));
        assert!(screen.contains("Select PDF"));
    }

    #[test]
    fn test_chat_screen_shows_messages_and_placeholder() {
        let mut app = test_app();
        app.start_chat();
        let screen = draw(&mut app);
        assert!(screen.contains("AI:"));
        assert!(screen.contains("Document loaded."));
        assert!(screen.contains(INPUT_PLACEHOLDER));
        assert_eq!(app.chat_width, 78);
    }

    #[tokio::test]
    async fn test_loading_indicator_and_error_footer() {
        let mut app = test_app();
        app.start_chat();
        app.view.update_input("hello");
        app.submit_question();
        assert!(draw(&mut app).contains("Thinking."));

        // Settle the pending question by hand
        if let Some(task) = app.ask_task.take() {
            task.abort();
        }
        app.view
            .finish_submit(Err(AskError::Status("Bad Gateway".to_string())));
        let screen = draw(&mut app);
        assert!(!screen.contains("Thinking"));
        assert!(screen.contains("error: API error: Bad Gateway"));
    }

    #[test]
    fn test_path_popup_fits_short_terminal() {
        let mut app = test_app();
        app.input_mode = InputMode::SelectingFile;
        app.path_input = "report.pdf".to_string();
        app.path_cursor = 10;

        for (width, height) in [(20, 4), (20, 2), (3, 1), (80, 20)] {
            draw_sized(&mut app, width, height);
        }
        assert!(draw_sized(&mut app, 20, 4).contains("report"));
    }

    #[test]
    fn test_long_answer_last_word_visible_after_autoscroll() {
        let mut app = test_app();
        app.start_chat();
        // First draw records the log size
        draw_sized(&mut app, 12, 12);

        let answer = format!("{} LASTWORD", ["abcdef"; 11].join(" "));
        app.view.update_input("q");
        app.view.begin_submit();
        app.view.finish_submit(Ok(answer));
        app.apply_view_events();

        assert_eq!(app.chat_scroll, app.max_chat_scroll());
        assert!(draw_sized(&mut app, 12, 12).contains("LASTWORD"));
    }

    #[test]
    fn test_restart_hint_hidden_while_pending() {
        let mut app = test_app();
        app.start_chat();
        app.input_mode = InputMode::Normal;
        assert!(draw(&mut app).contains("new upload"));

        app.view.update_input("hello");
        app.view.begin_submit();
        assert!(!draw(&mut app).contains("new upload"));
    }
}
