use std::collections::HashMap;

use crate::citations::displayed_citations;
use crate::models::{QaItem, Video, VideoId, Workspace, WorkspaceId};
use crate::nav::{PlayerState, WatchTarget};
use crate::notify::Notice;
use crate::session::QaSession;
use crate::settings::{AskSettings, EmbeddingModel, GeneratorType, RetrieverType, VideoSelection};

/// Panel focus state for keyboard navigation.
///
/// Determines which panel receives keyboard input and how keys are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Workspace list panel (j/k navigation, Enter to open)
    Workspaces,
    /// Question input bar (typing edits the question, Enter submits)
    QuestionInput,
    /// Conversation panel (j/k exchange navigation, digits open citations)
    Conversation,
    /// Video source panel (j/k navigation, Space toggles selection)
    Sources,
}

/// Application state for the TUI.
///
/// Holds the workspace list, the active conversation session, the video
/// selection, persisted ask settings, and the transient notice and watch
/// overlay. Network results are applied through the `apply_*` methods from
/// the event loop; nothing here performs I/O.
#[derive(Debug)]
pub struct App {
    focus: Focus,
    workspaces: Vec<Workspace>,
    workspace_index: Option<usize>,
    /// Set when a completed mutation made the cached workspace counts stale.
    workspaces_stale: bool,
    session: Option<QaSession>,
    /// Histories for workspaces the user has visited. Late responses for a
    /// replaced session land here so the data is warm on return.
    history_cache: HashMap<WorkspaceId, Vec<QaItem>>,
    videos: Vec<Video>,
    selection: VideoSelection,
    settings: AskSettings,
    question_input: String,
    /// Selected exchange within the conversation (None when empty).
    qa_index: Option<usize>,
    source_index: Option<usize>,
    conversation_scroll: u16,
    notice: Option<Notice>,
    watch: Option<(WatchTarget, PlayerState)>,
}

impl App {
    /// Creates a new App with default state and the given persisted settings.
    pub fn new(settings: AskSettings) -> Self {
        Self {
            focus: Focus::Workspaces,
            workspaces: Vec::new(),
            workspace_index: None,
            workspaces_stale: false,
            session: None,
            history_cache: HashMap::new(),
            videos: Vec::new(),
            selection: VideoSelection::All,
            settings,
            question_input: String::new(),
            qa_index: None,
            source_index: None,
            conversation_scroll: 0,
            notice: None,
            watch: None,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn workspace_index(&self) -> Option<usize> {
        self.workspace_index
    }

    pub fn workspaces_stale(&self) -> bool {
        self.workspaces_stale
    }

    pub fn session(&self) -> Option<&QaSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QaSession> {
        self.session.as_mut()
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn selection(&self) -> &VideoSelection {
        &self.selection
    }

    pub fn settings(&self) -> &AskSettings {
        &self.settings
    }

    pub fn question_input(&self) -> &str {
        &self.question_input
    }

    pub fn qa_index(&self) -> Option<usize> {
        self.qa_index
    }

    pub fn source_index(&self) -> Option<usize> {
        self.source_index
    }

    pub fn conversation_scroll(&self) -> u16 {
        self.conversation_scroll
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn watch(&self) -> Option<&(WatchTarget, PlayerState)> {
        self.watch.as_ref()
    }

    /// Cycles focus to the next panel in Tab order.
    ///
    /// Order: `Workspaces` -> `QuestionInput` -> `Conversation` -> `Sources`
    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Workspaces => Focus::QuestionInput,
            Focus::QuestionInput => Focus::Conversation,
            Focus::Conversation => Focus::Sources,
            Focus::Sources => Focus::Workspaces,
        };
        self.auto_select_on_focus();
    }

    /// Cycles focus to the previous panel in reverse Tab order.
    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Workspaces => Focus::Sources,
            Focus::QuestionInput => Focus::Workspaces,
            Focus::Conversation => Focus::QuestionInput,
            Focus::Sources => Focus::Conversation,
        };
        self.auto_select_on_focus();
    }

    fn auto_select_on_focus(&mut self) {
        match self.focus {
            Focus::Workspaces => {
                if self.workspace_index.is_none() && !self.workspaces.is_empty() {
                    self.workspace_index = Some(0);
                }
            }
            Focus::Sources => {
                if self.source_index.is_none() && !self.videos.is_empty() {
                    self.source_index = Some(0);
                }
            }
            Focus::Conversation => {
                let len = self.history_len();
                if self.qa_index.is_none() && len > 0 {
                    self.qa_index = Some(len - 1);
                }
            }
            Focus::QuestionInput => {}
        }
    }

    fn history_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.history().len())
    }

    /// Moves the workspace selection down, wrapping at the end.
    pub fn select_next_workspace(&mut self) {
        self.workspace_index = wrap_next(self.workspace_index, self.workspaces.len());
    }

    /// Moves the workspace selection up, wrapping at the start.
    pub fn select_previous_workspace(&mut self) {
        self.workspace_index = wrap_previous(self.workspace_index, self.workspaces.len());
    }

    pub fn selected_workspace(&self) -> Option<&Workspace> {
        self.workspace_index.and_then(|i| self.workspaces.get(i))
    }

    /// Moves the exchange selection down in the conversation.
    pub fn select_next_exchange(&mut self) {
        self.qa_index = wrap_next(self.qa_index, self.history_len());
    }

    /// Moves the exchange selection up in the conversation.
    pub fn select_previous_exchange(&mut self) {
        self.qa_index = wrap_previous(self.qa_index, self.history_len());
    }

    pub fn selected_exchange(&self) -> Option<&QaItem> {
        let session = self.session.as_ref()?;
        self.qa_index.and_then(|i| session.history().get(i))
    }

    /// Moves the video selection cursor down.
    pub fn select_next_source(&mut self) {
        self.source_index = wrap_next(self.source_index, self.videos.len());
    }

    /// Moves the video selection cursor up.
    pub fn select_previous_source(&mut self) {
        self.source_index = wrap_previous(self.source_index, self.videos.len());
    }

    pub fn selected_source(&self) -> Option<&Video> {
        self.source_index.and_then(|i| self.videos.get(i))
    }

    /// Toggles the cursor's video in or out of the ask scope.
    pub fn toggle_selected_source(&mut self) {
        if let Some(video) = self.selected_source() {
            let id = video.id.clone();
            let videos = self.videos.clone();
            self.selection.toggle(&id, &videos);
        }
    }

    /// Puts every video in scope.
    pub fn select_all_sources(&mut self) {
        self.selection.select_all();
    }

    /// Takes every video out of scope.
    pub fn select_no_sources(&mut self) {
        self.selection.select_none();
    }

    /// The video ids currently in scope for questions.
    pub fn scoped_video_ids(&self) -> Vec<VideoId> {
        self.selection.resolve(&self.videos)
    }

    pub fn push_question_char(&mut self, c: char) {
        self.question_input.push(c);
    }

    pub fn pop_question_char(&mut self) {
        self.question_input.pop();
    }

    pub fn clear_question_input(&mut self) {
        self.question_input.clear();
    }

    pub fn scroll_conversation_down(&mut self, amount: u16) {
        self.conversation_scroll = self.conversation_scroll.saturating_add(amount);
    }

    pub fn scroll_conversation_up(&mut self, amount: u16) {
        self.conversation_scroll = self.conversation_scroll.saturating_sub(amount);
    }

    /// Shows a transient notice, replacing any prior one.
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Opens the watch overlay for a playback target.
    ///
    /// The player seeks to the target's start offset on its first
    /// metadata-ready signal and autoplays.
    pub fn open_watch(&mut self, target: WatchTarget) {
        let player = PlayerState::new(target.start_time);
        self.watch = Some((target, player));
    }

    /// Signals the open player that media metadata is available, returning
    /// the one-time seek position when one applies.
    pub fn watch_metadata_ready(&mut self) -> Option<f64> {
        self.watch
            .as_mut()
            .and_then(|(_, player)| player.on_metadata_ready())
    }

    pub fn close_watch(&mut self) {
        self.watch = None;
    }

    /// Resolves the n-th displayed citation of the selected exchange into a
    /// playback target. `ordinal` is the 1-based citation marker number.
    pub fn citation_target(&self, asset_base: &str, ordinal: usize) -> Option<WatchTarget> {
        let item = self.selected_exchange()?;
        displayed_citations(&item.answer, &item.source_contexts)
            .into_iter()
            .find(|c| c.ordinal == ordinal)
            .map(|c| WatchTarget::from_context(asset_base, c.context))
    }

    /// Replaces the workspace list, preserving the selection by id.
    pub fn apply_workspaces(&mut self, workspaces: Vec<Workspace>) {
        let selected_id = self.selected_workspace().map(|w| w.id.clone());
        self.workspaces = workspaces;
        self.workspaces_stale = false;
        self.workspace_index = selected_id
            .and_then(|id| self.workspaces.iter().position(|w| w.id == id))
            .or(if self.workspaces.is_empty() {
                None
            } else {
                Some(0)
            });
    }

    /// Opens a workspace: replaces the session and seeds its history from
    /// the cache while a fresh load is in flight.
    pub fn open_workspace(&mut self, workspace_id: WorkspaceId) {
        let mut session = QaSession::new(workspace_id.clone());
        if let Some(cached) = self.history_cache.get(&workspace_id) {
            session.set_history(cached.clone());
        }
        self.session = Some(session);
        self.videos = Vec::new();
        self.selection = VideoSelection::All;
        self.qa_index = None;
        self.source_index = None;
        self.conversation_scroll = 0;
        self.focus = Focus::QuestionInput;
    }

    /// Applies a loaded history. The cache is always updated; the active
    /// session only when it still belongs to that workspace.
    pub fn apply_history(&mut self, workspace_id: WorkspaceId, history: Vec<QaItem>) {
        if let Some(session) = self.session.as_mut()
            && session.workspace_id() == &workspace_id
        {
            session.set_history(history.clone());
            let len = session.history().len();
            self.qa_index = if len == 0 { None } else { Some(len - 1) };
        }
        self.history_cache.insert(workspace_id, history);
    }

    /// Applies a loaded video list and the workspace's persisted selection.
    pub fn apply_videos(
        &mut self,
        workspace_id: &WorkspaceId,
        videos: Vec<Video>,
        selection: VideoSelection,
    ) {
        if self.session.as_ref().map(QaSession::workspace_id) != Some(workspace_id) {
            return;
        }
        self.videos = videos;
        self.selection = selection;
        self.source_index = if self.videos.is_empty() { None } else { Some(0) };
    }

    /// Routes a finished ask to the session or, when the user has moved on,
    /// into the history cache so the answer is not lost.
    pub fn apply_ask_result(&mut self, workspace_id: WorkspaceId, item: QaItem) {
        if let Some(session) = self.session.as_mut()
            && session.workspace_id() == &workspace_id
        {
            let invalidations = session.complete_success(item);
            if invalidations.workspace_summary {
                self.workspaces_stale = true;
            }
            self.history_cache
                .insert(workspace_id, session.history().to_vec());
            self.qa_index = Some(session.history().len() - 1);
        } else {
            self.history_cache
                .entry(workspace_id)
                .or_default()
                .push(item);
            self.workspaces_stale = true;
        }
    }

    /// Records a failed ask for the given workspace.
    ///
    /// The error notice itself arrives through the notifier channel.
    pub fn apply_ask_failure(&mut self, workspace_id: &WorkspaceId) {
        if let Some(session) = self.session.as_mut()
            && session.workspace_id() == workspace_id
        {
            session.complete_failure();
        }
    }

    /// Removes a deleted exchange from the session and the cache.
    pub fn apply_item_deleted(&mut self, workspace_id: &WorkspaceId, qa_id: &crate::models::QaId) {
        if let Some(session) = self.session.as_mut()
            && session.workspace_id() == workspace_id
        {
            session.remove_item(qa_id);
            let len = session.history().len();
            self.qa_index = match self.qa_index {
                Some(_) if len == 0 => None,
                Some(i) => Some(i.min(len - 1)),
                None => None,
            };
        }
        if let Some(cached) = self.history_cache.get_mut(workspace_id) {
            cached.retain(|item| &item.id != qa_id);
        }
        self.workspaces_stale = true;
    }

    /// Clears the workspace's conversation after a delete-all.
    pub fn apply_history_cleared(&mut self, workspace_id: &WorkspaceId) {
        if let Some(session) = self.session.as_mut()
            && session.workspace_id() == workspace_id
        {
            session.clear_history();
            self.qa_index = None;
        }
        self.history_cache.insert(workspace_id.clone(), Vec::new());
        self.workspaces_stale = true;
    }

    /// Cycles the answer generation backend.
    pub fn cycle_generator(&mut self) {
        self.settings.generator_type = match self.settings.generator_type {
            GeneratorType::Gemini => GeneratorType::Qwen,
            GeneratorType::Qwen => GeneratorType::Gemini,
        };
    }

    /// Cycles the retrieval strategy.
    pub fn cycle_retriever(&mut self) {
        self.settings.retriever_type = match self.settings.retriever_type {
            RetrieverType::Vector => RetrieverType::Bm25,
            RetrieverType::Bm25 => RetrieverType::Hybrid,
            RetrieverType::Hybrid => RetrieverType::Vector,
        };
    }

    /// Cycles the embedding model.
    pub fn cycle_embedding(&mut self) {
        self.settings.embedding_model = match self.settings.embedding_model {
            EmbeddingModel::Dangvantuan => EmbeddingModel::Halong,
            EmbeddingModel::Halong => EmbeddingModel::Dangvantuan,
        };
    }

    pub fn toggle_reranker(&mut self) {
        self.settings.use_reranker = !self.settings.use_reranker;
    }

    pub fn toggle_history_use(&mut self) {
        self.settings.use_history = !self.settings.use_history;
    }
}

fn wrap_next(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None => 0,
        Some(i) if i + 1 >= len => 0,
        Some(i) => i + 1,
    })
}

fn wrap_previous(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None => len - 1,
        Some(0) => len - 1,
        Some(i) => i - 1,
    })
}
