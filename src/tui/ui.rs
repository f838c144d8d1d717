//! UI rendering functions for the TUI.
//!
//! Implements the four-panel layout with workspace list, conversation view,
//! question input, and video source panel using ratatui widgets and layout
//! management. Answers render through the citation-aware markdown pipeline.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Focus};
use crate::citations::{citation_tag_label, displayed_citations, timestamp_label};
use crate::models::QaItem;
use crate::notify::NoticeLevel;
use crate::render::render_answer;

/// Main rendering function for the TUI.
///
/// Draws the question input at the top, the three content panels in the
/// middle, and the notice/shortcut bar at the bottom. The watch overlay,
/// when open, is drawn centered over everything else.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Question input
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Notice / shortcut bar
        ])
        .split(size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20), // Workspace list
            Constraint::Percentage(55), // Conversation
            Constraint::Percentage(25), // Video sources
        ])
        .split(main_chunks[1]);

    render_question_input(frame, app, main_chunks[0]);
    render_workspace_list(frame, app, content_chunks[0]);
    render_conversation(frame, app, content_chunks[1]);
    render_sources(frame, app, content_chunks[2]);
    render_status_bar(frame, app, main_chunks[2]);

    if app.watch().is_some() {
        render_watch_overlay(frame, app, size);
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

/// Renders the question input bar at the top of the screen.
///
/// Shows a cursor indicator when focused and a spinner note while an ask
/// is in flight.
fn render_question_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::QuestionInput);

    let title = match app.session() {
        Some(session) if session.pending_question().is_some() => "Question (waiting for answer)",
        Some(_) => "Question",
        None => "Question (open a workspace first)",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(is_focused));

    let mut content = app.question_input().to_string();
    if is_focused {
        content.push('█');
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Renders the workspace list panel.
fn render_workspace_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::Workspaces);

    let title = if app.workspaces_stale() {
        "Workspaces (stale)"
    } else {
        "Workspaces"
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(is_focused));

    let items: Vec<ListItem> = app
        .workspaces()
        .iter()
        .map(|workspace| {
            let mut spans = vec![Span::raw(workspace.name.clone())];
            if let (Some(videos), Some(questions)) = (workspace.video_count, workspace.qa_count) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("[{videos} videos | {questions} questions]"),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    list_state.select(app.workspace_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Renders the conversation panel: every exchange oldest first, followed by
/// the pending question placeholder when an ask is in flight.
fn render_conversation(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::Conversation);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Conversation")
        .border_style(border_style(is_focused));

    let mut text = Text::default();

    if let Some(session) = app.session() {
        for (index, item) in session.history().iter().enumerate() {
            let selected = app.qa_index() == Some(index);
            append_exchange(&mut text, item, selected);
        }

        if let Some(question) = session.pending_question() {
            append_question_line(&mut text, question, false);
            text.lines.push(Line::from(Span::styled(
                "Thinking...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        if session.history().is_empty() && session.pending_question().is_none() {
            text.lines
                .push(Line::from("No questions yet. Type one above and press Enter."));
        }
    } else {
        text.lines
            .push(Line::from("Select a workspace to start a conversation."));
    }

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.conversation_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn append_question_line(text: &mut Text<'static>, question: &str, selected: bool) {
    let marker = if selected { "> " } else { "" };
    text.lines.push(Line::from(Span::styled(
        format!("{marker}Q: {question}"),
        Style::default().add_modifier(Modifier::BOLD),
    )));
}

/// Appends one exchange: the question, the rendered answer, and a tag line
/// per displayed citation.
fn append_exchange(text: &mut Text<'static>, item: &QaItem, selected: bool) {
    append_question_line(text, &item.question, selected);

    let answer = render_answer(&item.answer);
    text.lines.extend(answer.lines);

    for citation in displayed_citations(&item.answer, &item.source_contexts) {
        text.lines.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", citation.ordinal),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                citation_tag_label(citation.context),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    if let Some(seconds) = item.response_time {
        text.lines.push(Line::from(Span::styled(
            format!("  answered in {seconds:.1}s"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    text.lines.push(Line::from(""));
}

/// Renders the video source panel with selection checkboxes.
fn render_sources(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = matches!(app.focus(), Focus::Sources);

    let scoped = app.scoped_video_ids().len();
    let title = format!("Videos ({scoped}/{})", app.videos().len());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(is_focused));

    let items: Vec<ListItem> = app
        .videos()
        .iter()
        .map(|video| {
            let checkbox = if app.selection().is_selected(&video.id) {
                "[x] "
            } else {
                "[ ] "
            };
            let line = Line::from(vec![
                Span::raw(checkbox),
                Span::raw(video.filename.clone()),
                Span::raw(" "),
                Span::styled(
                    format!("({})", timestamp_label(video.duration)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    list_state.select(app.source_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Renders the bottom bar: the transient notice when one is showing,
/// otherwise key hints and the settings summary.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = app.notice() {
        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        Line::from(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::raw("Tab:panels  Enter:ask  d:delete  1-9:watch clip  q:quit  "),
            Span::styled(
                app.settings().summary(),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the watch overlay centered over the main layout.
fn render_watch_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some((target, player)) = app.watch() else {
        return;
    };

    let overlay = centered_rect(60, 9, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(target.title.clone())
        .border_style(Style::default().fg(Color::Cyan));

    let status = if player.is_playing() {
        "playing"
    } else {
        "paused"
    };

    let text = Text::from(vec![
        Line::from(vec![Span::raw("Source: "), Span::raw(target.url.clone())]),
        Line::from(vec![
            Span::raw("Start:  "),
            Span::raw(timestamp_label(target.start_time)),
        ]),
        Line::from(vec![
            Span::raw("State:  "),
            Span::styled(status, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        overlay,
    );
}

/// Computes a centered rectangle of the given percentage width and fixed
/// height within `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}
