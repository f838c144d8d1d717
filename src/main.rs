use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use vidqa::api::{ApiError, AskRequest, VideoQaApi, VideoQaClient, VideoQaClientBuilder};
use vidqa::citations::{citation_tag_label, displayed_citations, strip_citation_markers};
use vidqa::models::{QaId, QaItem, WorkspaceId};
use vidqa::settings::AskSettings;
use vidqa::store::Store;

/// vidqa - conversational question answering over video workspaces
#[derive(Parser)]
#[command(name = "vidqa")]
#[command(about = "Ask questions about your video workspaces and cite the answers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive terminal interface (default)
    Tui,
    /// Ask a question scoped to every video in a workspace
    Ask(AskCommand),
    /// Print a workspace's QA history
    History(HistoryCommand),
    /// Delete one recorded exchange
    Delete(DeleteCommand),
    /// Delete a workspace's entire QA history
    ClearHistory(ClearHistoryCommand),
    /// List all workspaces
    Workspaces,
}

/// Ask a question
#[derive(Parser)]
struct AskCommand {
    /// The workspace to ask in
    #[arg(short, long, value_name = "WORKSPACE_ID")]
    workspace: String,

    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Print the answer without citation markers
    #[arg(long)]
    plain: bool,
}

/// Print the QA history
#[derive(Parser)]
struct HistoryCommand {
    /// The workspace to read
    #[arg(short, long, value_name = "WORKSPACE_ID")]
    workspace: String,

    /// Print answers without citation markers
    #[arg(long)]
    plain: bool,
}

/// Delete a single exchange
#[derive(Parser)]
struct DeleteCommand {
    /// The workspace the exchange belongs to
    #[arg(short, long, value_name = "WORKSPACE_ID")]
    workspace: String,

    /// The id of the exchange to delete
    #[arg(value_name = "QA_ID")]
    id: String,
}

/// Clear a workspace's history
#[derive(Parser)]
struct ClearHistoryCommand {
    /// The workspace to clear
    #[arg(short, long, value_name = "WORKSPACE_ID")]
    workspace: String,
}

fn main() {
    // Load environment overrides (VIDQA_API_URL, VIDQA_ACCESS_TOKEN)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match &cli.command {
        None | Some(Commands::Tui) => vidqa::tui::run(),
        Some(Commands::Ask(cmd)) => handle_ask(cmd),
        Some(Commands::History(cmd)) => handle_history(cmd),
        Some(Commands::Delete(cmd)) => handle_delete(cmd),
        Some(Commands::ClearHistory(cmd)) => handle_clear_history(cmd),
        Some(Commands::Workspaces) => handle_workspaces(),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are local validation failures and rejections the service
/// reported with a 4xx status. Network failures, decode failures, and 5xx
/// responses are internal errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    match error.downcast_ref::<ApiError>() {
        Some(ApiError::Validation(_)) => true,
        Some(ApiError::Request { status, .. }) => (400..500).contains(status),
        Some(_) => false,
        None => error.to_string().contains("cannot be empty"),
    }
}

fn build_client() -> Result<VideoQaClient> {
    VideoQaClientBuilder::new()
        .build()
        .context("Failed to create the service client")
}

/// Handles the ask command: every video in the workspace is in scope, and
/// the persisted settings apply just as they do in the TUI.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let client = build_client()?;
    let workspace_id = WorkspaceId::new(&cmd.workspace);

    let settings = match Store::open_default() {
        Ok(store) => AskSettings::load(&store).unwrap_or_default(),
        Err(_) => AskSettings::default(),
    };

    let videos = client.get_videos(&workspace_id)?;
    if videos.is_empty() {
        anyhow::bail!("Workspace has no videos; there is nothing to ask about");
    }

    let request = AskRequest {
        workspace_id,
        question: cmd.question.trim().to_string(),
        video_ids: videos.into_iter().map(|v| v.id).collect(),
        settings,
    };

    let item = client.ask_question(&request)?;
    print_item(&item, cmd.plain);

    Ok(())
}

fn handle_history(cmd: &HistoryCommand) -> Result<()> {
    let client = build_client()?;
    let history = client.get_history(&WorkspaceId::new(&cmd.workspace))?;

    if history.is_empty() {
        println!("No questions asked yet.");
        return Ok(());
    }

    for item in &history {
        print_item(item, cmd.plain);
        println!();
    }

    Ok(())
}

fn handle_delete(cmd: &DeleteCommand) -> Result<()> {
    let client = build_client()?;
    client.delete_item(&WorkspaceId::new(&cmd.workspace), &QaId::new(&cmd.id))?;
    println!("QA item deleted successfully!");
    Ok(())
}

fn handle_clear_history(cmd: &ClearHistoryCommand) -> Result<()> {
    let client = build_client()?;
    client.delete_all_history(&WorkspaceId::new(&cmd.workspace))?;
    println!("QA history cleared successfully!");
    Ok(())
}

fn handle_workspaces() -> Result<()> {
    let client = build_client()?;
    let workspaces = client.get_workspaces()?;

    if workspaces.is_empty() {
        println!("No workspaces found.");
        return Ok(());
    }

    for workspace in &workspaces {
        print!("{}  {}", workspace.id, workspace.name);
        if let (Some(videos), Some(questions)) = (workspace.video_count, workspace.qa_count) {
            print!("  ({videos} videos, {questions} questions)");
        }
        println!();
    }

    Ok(())
}

/// Prints one exchange: the question, the answer, and a tag line per
/// displayed citation.
fn print_item(item: &QaItem, plain: bool) {
    println!("Q: {}", item.question);
    if plain {
        println!("A: {}", strip_citation_markers(&item.answer));
    } else {
        println!("A: {}", item.answer);
    }

    for citation in displayed_citations(&item.answer, &item.source_contexts) {
        println!("  [{}] {}", citation.ordinal, citation_tag_label(citation.context));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidqa::models::{ContextUnit, QaItemBuilder, VideoId};

    #[test]
    fn empty_question_is_a_user_error() {
        let cmd = AskCommand {
            workspace: "ws-1".to_string(),
            question: "   ".to_string(),
            plain: false,
        };
        let result = handle_ask(&cmd);
        assert!(result.is_err());
        assert!(is_user_error(&result.unwrap_err()));
    }

    #[test]
    fn not_found_response_is_a_user_error() {
        let error = anyhow::Error::new(ApiError::Request {
            status: 404,
            message: "Workspace not found".to_string(),
        });
        assert!(is_user_error(&error));
    }

    #[test]
    fn server_failure_is_an_internal_error() {
        let error = anyhow::Error::new(ApiError::Request {
            status: 502,
            message: "upstream failed".to_string(),
        });
        assert!(!is_user_error(&error));
        assert!(!is_user_error(&anyhow::Error::new(ApiError::Unknown)));
    }

    #[test]
    fn print_item_compiles_for_cited_answers() {
        // Exercises the display path used by ask and history
        let item = QaItemBuilder::new()
            .id("qa-1")
            .workspace_id("ws-1")
            .question("What is covered?")
            .answer("The basics. [1]")
            .source_contexts(vec![ContextUnit {
                id: "ctx-1".to_string(),
                video_id: VideoId::new("vid-1"),
                video_path: "data/videos/ws-1/intro.mp4".to_string(),
                text: "excerpt".to_string(),
                start_time: 0.0,
                end_time: 10.0,
            }])
            .build();

        print_item(&item, false);
        print_item(&item, true);
    }
}
