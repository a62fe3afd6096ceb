use std::path::PathBuf;

use pdf_interactor_core::{
    AskError, ChatView, Config, DocumentUpload, QaClient, Sender, SimulatedUpload,
    UiPhase,
};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    SelectingFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Checking,
    Online(String),
    Offline,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub view: ChatView,

    // Composed question cursor (char index into view.input())
    pub input_cursor: usize,

    // Document selection (Idle phase)
    pub path_input: String,
    pub path_cursor: usize,
    pub selected_path: Option<PathBuf>,
    pub document_name: Option<String>,
    pub upload_error: Option<String>,

    // Chat log scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the log, updated during render
    pub chat_width: u16,  // Inner width of the log, updated during render
    pub chat_area: Option<Rect>,

    // Background work
    pub ask_task: Option<JoinHandle<Result<String, AskError>>>,
    pub health_task: Option<JoinHandle<anyhow::Result<String>>>,
    pub backend_status: BackendStatus,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: QaClient,
    uploader: Box<dyn DocumentUpload + Send>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self::with_uploader(config, Box::new(SimulatedUpload))
    }

    pub fn with_uploader(config: &Config, uploader: Box<dyn DocumentUpload + Send>) -> Self {
        let api_url = config.api_url();
        info!(api_url = %api_url, "using Q&A backend");

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            view: ChatView::with_greeting(config.greeting()),

            input_cursor: 0,

            path_input: String::new(),
            path_cursor: 0,
            selected_path: None,
            document_name: None,
            upload_error: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            ask_task: None,
            health_task: None,
            backend_status: BackendStatus::Unknown,

            animation_frame: 0,

            client: QaClient::new(&api_url),
            uploader,
        }
    }

    pub fn phase(&self) -> UiPhase {
        self.view.phase()
    }

    /// Ping the backend once in the background; the result only feeds the header
    pub fn probe_backend(&mut self) {
        let client = self.client.clone();
        self.backend_status = BackendStatus::Checking;
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    /// Confirm the typed path as the selected document
    pub fn confirm_selected_path(&mut self) {
        let trimmed = self.path_input.trim();
        self.selected_path = if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        };
        self.input_mode = InputMode::Normal;
    }

    /// "Upload" the selected document and enter the chat phase.
    ///
    /// Does nothing while a question is pending.
    pub fn start_chat(&mut self) {
        if self.view.is_in_flight() {
            return;
        }

        match self.uploader.upload(self.selected_path.as_deref()) {
            Ok(receipt) => {
                self.document_name = receipt.document_name;
                self.upload_error = None;
                self.view.start();
                self.view.update_input(String::new());
                self.input_cursor = 0;
                self.input_mode = InputMode::Editing;
                self.apply_view_events();
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.upload_error = Some(err.to_string());
            }
        }
    }

    /// Submit the composed question on a background task
    pub fn submit_question(&mut self) {
        let Some(question) = self.view.begin_submit() else {
            return;
        };
        self.input_cursor = 0;

        let client = self.client.clone();
        self.ask_task = Some(tokio::spawn(async move { client.ask(&question).await }));
        self.apply_view_events();
    }

    /// Collect results of finished background tasks
    pub async fn poll_tasks(&mut self) {
        if self.ask_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.ask_task.take() {
                let result = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(AskError::Interrupted(e.to_string())),
                };
                self.view.finish_submit(result);
                self.apply_view_events();
            }
        }

        if self.health_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.backend_status = match task.await {
                    Ok(Ok(message)) => {
                        info!(%message, "backend is reachable");
                        BackendStatus::Online(message)
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "backend health check failed");
                        BackendStatus::Offline
                    }
                    Err(e) => {
                        warn!(error = %e, "backend health check task failed");
                        BackendStatus::Offline
                    }
                };
            }
        }
    }

    /// Subscriber for ChatView transitions: keep the log pinned to its end
    pub fn apply_view_events(&mut self) {
        let events = self.view.drain_events();
        if !events.is_empty() {
            self.scroll_chat_to_bottom();
        }
    }

    /// Total rendered lines of the chat log at the current width
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        let lines = crate::ui::chat_paragraph(self).line_count(wrap_width);
        lines.min(u16::MAX as usize) as u16
    }

    pub fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_line_count().saturating_sub(visible_height)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_chat_scroll());
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.view.is_in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn message_count(&self, sender: Sender) -> usize {
        self.view
            .messages()
            .iter()
            .filter(|m| m.sender == sender)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_interactor_core::upload::UploadError;
    use pdf_interactor_core::{Message, GREETING};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(url: &str) -> App {
        let config = Config {
            api_url: Some(url.to_string()),
            greeting: None,
        };
        App::new(&config)
    }

    async fn wait_until_settled(app: &mut App) {
        for _ in 0..200 {
            app.poll_tasks().await;
            if app.ask_task.is_none() && app.health_task.is_none() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("background task did not settle");
    }

    #[test]
    fn test_start_chat_enters_active_phase() {
        let mut app = app_for("http://127.0.0.1:1");
        app.path_input = " ./docs/guide.pdf ".to_string();
        app.confirm_selected_path();
        app.start_chat();

        assert_eq!(app.phase(), UiPhase::Active);
        assert_eq!(app.document_name.as_deref(), Some("guide.pdf"));
        assert_eq!(app.view.messages(), &[Message::ai(GREETING)]);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_blank_path_clears_selection() {
        let mut app = app_for("http://127.0.0.1:1");
        app.path_input = "   ".to_string();
        app.confirm_selected_path();
        assert_eq!(app.selected_path, None);
    }

    #[test]
    fn test_scroll_to_bottom_tracks_long_conversation() {
        let mut app = app_for("http://127.0.0.1:1");
        app.chat_height = 4;
        app.chat_width = 10;
        app.start_chat();

        // Greeting wraps to several rows at this width
        assert!(app.chat_line_count() > 4);
        assert!(app.chat_scroll > 0);
        assert_eq!(app.chat_scroll, app.max_chat_scroll());

        let bottom = app.chat_scroll;
        app.scroll_chat_up(100);
        assert_eq!(app.chat_scroll, 0);
        app.scroll_chat_down(100);
        assert_eq!(app.chat_scroll, bottom);
    }

    #[test]
    fn test_line_count_follows_word_wrap() {
        let mut app = app_for("http://127.0.0.1:1");
        app.chat_width = 10;
        app.start_chat();
        app.view.update_input("q");
        app.view.begin_submit();
        app.view.finish_submit(Ok("abcdef abcdef abcdef".to_string()));

        let greeting_only = {
            let mut fresh = app_for("http://127.0.0.1:1");
            fresh.chat_width = 10;
            fresh.start_chat();
            fresh.chat_line_count()
        };

        // "You:" + "q" + blank, then "AI:" + one row per word + blank
        assert_eq!(app.chat_line_count(), greeting_only + 3 + 5);
    }

    struct FailingUpload;

    impl DocumentUpload for FailingUpload {
        fn upload(
            &self,
            _path: Option<&std::path::Path>,
        ) -> Result<pdf_interactor_core::UploadReceipt, UploadError> {
            Err(UploadError::Failed("disk full".to_string()))
        }
    }

    #[test]
    fn test_failed_upload_stays_idle_with_error() {
        let config = Config {
            api_url: Some("http://127.0.0.1:1".to_string()),
            greeting: None,
        };
        let mut app = App::with_uploader(&config, Box::new(FailingUpload));
        app.start_chat();

        assert_eq!(app.phase(), UiPhase::Idle);
        assert!(app.view.messages().is_empty());
        assert_eq!(app.upload_error.as_deref(), Some("upload failed: disk full"));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[tokio::test]
    async fn test_restart_ignored_while_question_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "old answer" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let mut app = app_for(&server.uri());
        app.start_chat();
        app.view.update_input("old question");
        app.submit_question();
        app.start_chat();

        assert_eq!(app.view.messages().len(), 2);
        assert!(app.view.is_in_flight());

        wait_until_settled(&mut app).await;
        assert_eq!(
            app.view.messages(),
            &[
                Message::ai(GREETING),
                Message::user("old question"),
                Message::ai("old answer"),
            ]
        );

        app.start_chat();
        assert_eq!(app.view.messages(), &[Message::ai(GREETING)]);
    }

    #[tokio::test]
    async fn test_submit_question_settles_with_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "answer": "42" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app_for(&server.uri());
        app.start_chat();
        app.view.update_input("meaning?");
        app.submit_question();

        assert!(app.view.is_in_flight());
        app.view.update_input("again?");
        app.submit_question();
        assert_eq!(app.view.input(), "again?");

        wait_until_settled(&mut app).await;
        assert_eq!(app.view.messages().last(), Some(&Message::ai("42")));
        assert_eq!(app.message_count(Sender::User), 1);
        assert!(!app.view.is_in_flight());
    }

    #[tokio::test]
    async fn test_probe_backend_reports_offline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut app = app_for(&server.uri());
        app.probe_backend();
        assert_eq!(app.backend_status, BackendStatus::Checking);

        wait_until_settled(&mut app).await;
        assert!(app.backend_status == BackendStatus::Offline);
    }
}
