//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. State-only
//! changes happen directly on the [`App`]; anything that needs I/O (network
//! calls, persistence, deep-link resolution) is returned as a [`UiCommand`]
//! for the event loop to execute.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};
use crate::api::AskRequest;
use crate::models::{QaId, WorkspaceId};

/// Side effects requested by a key press.
#[derive(Debug)]
pub enum UiCommand {
    Quit,
    /// Open a workspace and load its history and videos.
    OpenWorkspace(WorkspaceId),
    /// Dispatch an accepted ask request.
    SubmitAsk(AskRequest),
    /// Delete the selected exchange.
    DeleteItem(WorkspaceId, QaId),
    /// Delete the workspace's entire history.
    ClearHistory(WorkspaceId),
    /// Open the cited clip with the given 1-based marker number.
    OpenCitation(usize),
    /// Play the source cursor's video from the beginning.
    OpenSelectedVideo,
    /// The video selection changed and should be persisted.
    SelectionChanged,
    /// The ask settings changed and should be persisted.
    SettingsChanged,
    /// Reload the workspace list.
    RefreshWorkspaces,
}

/// Handles a keyboard event, returning the side effect to run, if any.
///
/// # Event Handling
///
/// - `Ctrl+C`: quit from anywhere; `q` quits outside the question input
/// - `Tab` / `Shift+Tab`: cycle panel focus
/// - `Esc`: close the watch overlay, or return to the question input
/// - `Ctrl+G`/`Ctrl+R`/`Ctrl+E`: cycle generator, retriever, embedding model
/// - `Ctrl+B` / `Ctrl+H`: toggle reranker and history use
/// - Panel-specific keys are dispatched by focus
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    // A key press dismisses the current transient notice
    app.clear_notice();

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(UiCommand::Quit);
    }

    // The watch overlay captures all input while open
    if app.watch().is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
            app.close_watch();
        }
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('g') => {
                app.cycle_generator();
                return Some(UiCommand::SettingsChanged);
            }
            KeyCode::Char('r') => {
                app.cycle_retriever();
                return Some(UiCommand::SettingsChanged);
            }
            KeyCode::Char('e') => {
                app.cycle_embedding();
                return Some(UiCommand::SettingsChanged);
            }
            KeyCode::Char('b') => {
                app.toggle_reranker();
                return Some(UiCommand::SettingsChanged);
            }
            KeyCode::Char('h') => {
                app.toggle_history_use();
                return Some(UiCommand::SettingsChanged);
            }
            _ => return None,
        }
    }

    if key.code == KeyCode::Char('q')
        && key.modifiers.is_empty()
        && app.focus() != Focus::QuestionInput
    {
        return Some(UiCommand::Quit);
    }

    if key.code == KeyCode::Tab {
        app.next_focus();
        return None;
    }
    if key.code == KeyCode::BackTab {
        app.prev_focus();
        return None;
    }

    match app.focus() {
        Focus::Workspaces => handle_workspaces(app, key),
        Focus::QuestionInput => handle_question_input(app, key),
        Focus::Conversation => handle_conversation(app, key),
        Focus::Sources => handle_sources(app, key),
    }
}

/// Handles keyboard input when the workspace list is focused.
fn handle_workspaces(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next_workspace();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous_workspace();
            None
        }
        KeyCode::Char('r') => Some(UiCommand::RefreshWorkspaces),
        KeyCode::Enter => {
            let id = app.selected_workspace()?.id.clone();
            app.open_workspace(id.clone());
            Some(UiCommand::OpenWorkspace(id))
        }
        _ => None,
    }
}

/// Handles keyboard input when the question input is focused.
///
/// Enter attempts to submit; the attempt is silently ignored when the
/// question is blank, no videos are in scope, or an ask is in flight.
fn handle_question_input(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_question_char(c);
            None
        }
        KeyCode::Backspace => {
            app.pop_question_char();
            None
        }
        KeyCode::Enter => {
            let question = app.question_input().to_string();
            let video_ids = app.scoped_video_ids();
            let settings = *app.settings();
            let request = app
                .session_mut()?
                .begin_submit(&question, &video_ids, &settings)?;
            app.clear_question_input();
            Some(UiCommand::SubmitAsk(request))
        }
        KeyCode::Esc => {
            app.clear_question_input();
            None
        }
        _ => None,
    }
}

/// Handles keyboard input when the conversation panel is focused.
///
/// j/k move between exchanges, J/K scroll, `d` deletes the selected
/// exchange, `D` clears the history, and digits open the cited clip with
/// that marker number.
fn handle_conversation(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next_exchange();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous_exchange();
            None
        }
        KeyCode::Char('J') => {
            app.scroll_conversation_down(1);
            None
        }
        KeyCode::Char('K') => {
            app.scroll_conversation_up(1);
            None
        }
        KeyCode::Char('d') => {
            let workspace_id = app.session()?.workspace_id().clone();
            let qa_id = app.selected_exchange()?.id.clone();
            Some(UiCommand::DeleteItem(workspace_id, qa_id))
        }
        KeyCode::Char('D') => {
            let workspace_id = app.session()?.workspace_id().clone();
            Some(UiCommand::ClearHistory(workspace_id))
        }
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            Some(UiCommand::OpenCitation(c as usize - '0' as usize))
        }
        _ => None,
    }
}

/// Handles keyboard input when the source panel is focused.
fn handle_sources(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next_source();
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_previous_source();
            None
        }
        KeyCode::Char(' ') => {
            app.toggle_selected_source();
            Some(UiCommand::SelectionChanged)
        }
        KeyCode::Char('a') => {
            app.select_all_sources();
            Some(UiCommand::SelectionChanged)
        }
        KeyCode::Char('n') => {
            app.select_no_sources();
            Some(UiCommand::SelectionChanged)
        }
        KeyCode::Enter => app.selected_source().map(|_| UiCommand::OpenSelectedVideo),
        _ => None,
    }
}
