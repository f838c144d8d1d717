//! Terminal user interface for vidqa.
//!
//! Provides a four-panel TUI with workspace list, conversation view,
//! question input, and video source panel using ratatui for rendering and
//! crossterm for terminal management. Network calls run on worker threads
//! and report back over channels, so the render loop never blocks on the
//! QA service.

use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

mod app;
pub mod event;
mod ui;

pub use app::{App, Focus};
pub use event::UiCommand;

use crate::api::{ApiError, AskRequest, VideoQaApi, VideoQaClient, VideoQaClientBuilder};
use crate::models::{QaId, QaItem, Video, Workspace, WorkspaceId};
use crate::nav::WatchTarget;
use crate::notify::{Notice, Notifier, run_mutation};
use crate::settings::{AskSettings, VideoSelection};
use crate::store::Store;

/// Results arriving from worker threads.
#[derive(Debug)]
enum AppEvent {
    WorkspacesLoaded(Vec<Workspace>),
    HistoryLoaded(WorkspaceId, Vec<QaItem>),
    VideosLoaded(WorkspaceId, Vec<Video>),
    AskFinished(WorkspaceId, Result<QaItem, ApiError>),
    ItemDeleted(WorkspaceId, QaId),
    HistoryCleared(WorkspaceId),
}

/// Spawns worker threads for service calls and routes their results back
/// to the event loop.
///
/// Every mutation goes through [`run_mutation`], so failures always surface
/// exactly one error notice and deletions announce their success.
struct Dispatcher {
    client: Arc<VideoQaClient>,
    notifier: Notifier,
    tx: Sender<AppEvent>,
}

impl Dispatcher {
    fn load_workspaces(&self) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            if let Ok(workspaces) = run_mutation(&notifier, None, || client.get_workspaces()) {
                let _ = tx.send(AppEvent::WorkspacesLoaded(workspaces));
            }
        });
    }

    fn load_history(&self, workspace_id: WorkspaceId) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            if let Ok(history) = run_mutation(&notifier, None, || client.get_history(&workspace_id))
            {
                let _ = tx.send(AppEvent::HistoryLoaded(workspace_id, history));
            }
        });
    }

    fn load_videos(&self, workspace_id: WorkspaceId) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            if let Ok(videos) = run_mutation(&notifier, None, || client.get_videos(&workspace_id)) {
                let _ = tx.send(AppEvent::VideosLoaded(workspace_id, videos));
            }
        });
    }

    /// Dispatches an accepted ask. The answer itself is the success
    /// feedback, so no success message is configured.
    fn submit_ask(&self, request: AskRequest) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let workspace_id = request.workspace_id.clone();
            let result = run_mutation(&notifier, None, || client.ask_question(&request));
            let _ = tx.send(AppEvent::AskFinished(workspace_id, result));
        });
    }

    fn delete_item(&self, workspace_id: WorkspaceId, qa_id: QaId) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = run_mutation(&notifier, Some("QA item deleted successfully!"), || {
                client.delete_item(&workspace_id, &qa_id)
            });
            if result.is_ok() {
                let _ = tx.send(AppEvent::ItemDeleted(workspace_id, qa_id));
            }
        });
    }

    fn clear_history(&self, workspace_id: WorkspaceId) {
        let client = Arc::clone(&self.client);
        let notifier = self.notifier.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = run_mutation(&notifier, Some("QA history cleared successfully!"), || {
                client.delete_all_history(&workspace_id)
            });
            if result.is_ok() {
                let _ = tx.send(AppEvent::HistoryCleared(workspace_id));
            }
        });
    }
}

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This should always be called before exiting the TUI, even in error
/// cases, to prevent terminal corruption.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for panic handler.
///
/// Does not require a Terminal reference, making it safe to call from a
/// panic hook. Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Initializes a panic hook that restores the terminal before panicking.
///
/// The original panic hook is preserved and called after restoration.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Applies a worker thread result to the app.
///
/// Results carry the workspace id they belong to, so responses that arrive
/// after a workspace switch update the cache instead of being dropped.
fn apply_event(app: &mut App, store: &Store, dispatcher: &Dispatcher, event: AppEvent) {
    match event {
        AppEvent::WorkspacesLoaded(workspaces) => app.apply_workspaces(workspaces),
        AppEvent::HistoryLoaded(workspace_id, history) => app.apply_history(workspace_id, history),
        AppEvent::VideosLoaded(workspace_id, videos) => {
            let selection =
                VideoSelection::load(store, &workspace_id).unwrap_or(VideoSelection::All);
            app.apply_videos(&workspace_id, videos, selection);
        }
        AppEvent::AskFinished(workspace_id, Ok(item)) => {
            app.apply_ask_result(workspace_id, item);
            if app.workspaces_stale() {
                dispatcher.load_workspaces();
            }
        }
        AppEvent::AskFinished(workspace_id, Err(_)) => app.apply_ask_failure(&workspace_id),
        AppEvent::ItemDeleted(workspace_id, qa_id) => {
            app.apply_item_deleted(&workspace_id, &qa_id);
            if app.workspaces_stale() {
                dispatcher.load_workspaces();
            }
        }
        AppEvent::HistoryCleared(workspace_id) => {
            app.apply_history_cleared(&workspace_id);
            if app.workspaces_stale() {
                dispatcher.load_workspaces();
            }
        }
    }
}

/// Executes a command returned by key handling.
///
/// Returns `true` when the application should quit.
fn execute_command(
    app: &mut App,
    store: &Store,
    dispatcher: &Dispatcher,
    command: UiCommand,
) -> bool {
    match command {
        UiCommand::Quit => return true,
        UiCommand::OpenWorkspace(workspace_id) => {
            dispatcher.load_history(workspace_id.clone());
            dispatcher.load_videos(workspace_id);
        }
        UiCommand::SubmitAsk(request) => dispatcher.submit_ask(request),
        UiCommand::DeleteItem(workspace_id, qa_id) => dispatcher.delete_item(workspace_id, qa_id),
        UiCommand::ClearHistory(workspace_id) => dispatcher.clear_history(workspace_id),
        UiCommand::OpenCitation(ordinal) => {
            if let Some(target) = app.citation_target(dispatcher.client.base_url(), ordinal) {
                open_player(app, target);
            }
        }
        UiCommand::OpenSelectedVideo => {
            if let Some(video) = app.selected_source() {
                let target = WatchTarget::from_video(dispatcher.client.base_url(), video);
                open_player(app, target);
            }
        }
        UiCommand::SelectionChanged => {
            if let Some(session) = app.session() {
                let workspace_id = session.workspace_id().clone();
                if app.selection().save(store, &workspace_id).is_err() {
                    app.set_notice(Notice::error("Could not save the video selection."));
                }
            }
        }
        UiCommand::SettingsChanged => {
            if app.settings().save(store).is_err() {
                app.set_notice(Notice::error("Could not save the settings."));
            }
        }
        UiCommand::RefreshWorkspaces => dispatcher.load_workspaces(),
    }
    false
}

/// Opens the watch overlay and immediately signals metadata readiness.
///
/// The overlay has the media location in hand as soon as it opens, so the
/// one-time seek fires right away.
fn open_player(app: &mut App, target: WatchTarget) {
    app.open_watch(target);
    app.watch_metadata_ready();
}

/// Runs the main event loop for the TUI.
///
/// Polls for keyboard events, drains worker results and notices, updates
/// app state, and re-renders.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations
/// fail. Terminal state is always restored, even on error.
fn run_event_loop(
    app: &mut App,
    store: &Store,
    dispatcher: &Dispatcher,
    events: &Receiver<AppEvent>,
    notices: &Receiver<Notice>,
) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, store, dispatcher, events, notices, &mut terminal);

    // Always restore terminal state
    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

/// Internal event loop implementation.
///
/// Separated from `run_event_loop` to ensure terminal restoration happens
/// in the outer function.
fn run_event_loop_internal(
    app: &mut App,
    store: &Store,
    dispatcher: &Dispatcher,
    events: &Receiver<AppEvent>,
    notices: &Receiver<Notice>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        while let Ok(notice) = notices.try_recv() {
            app.set_notice(notice);
        }
        while let Ok(event) = events.try_recv() {
            apply_event(app, store, dispatcher, event);
        }

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && let Some(command) = event::handle_key_event(app, key)
            && execute_command(app, store, dispatcher, command)
        {
            break;
        }
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// Opens the persisted state store, builds the service client, kicks off
/// the initial workspace load, and starts the event loop.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the client cannot be
/// built, or terminal initialization fails.
pub fn run() -> Result<()> {
    init_panic_hook();

    let store = Store::open_default().context("Failed to open the state store")?;
    let settings = AskSettings::load(&store).context("Failed to load settings")?;

    let client = Arc::new(
        VideoQaClientBuilder::new()
            .build()
            .context("Failed to create the service client")?,
    );

    let (notifier, notices) = Notifier::new();
    let (tx, events) = channel();
    let dispatcher = Dispatcher {
        client,
        notifier,
        tx,
    };

    let mut app = App::new(settings);
    dispatcher.load_workspaces();

    run_event_loop(&mut app, &store, &dispatcher, &events, &notices)
        .context("TUI event loop failed")?;

    Ok(())
}
