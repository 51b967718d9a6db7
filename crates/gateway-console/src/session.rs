//! The interactive watch session.
//!
//! One event loop owns every piece of console state. Network work runs on
//! spawned tasks and reports back as [`Msg`]s, so state only changes
//! between messages.

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::client::ConsoleApi;
use crate::diagnostic::{ActionFeedback, DiagnosticModalController};
use crate::error::SyncError;
use crate::key_check::{CheckCompletion, CopyInvalidFeedback, KeyValidationController};
use crate::platform::{Clipboard, UrlOpener};
use crate::poller::{POLL_INTERVAL, PollTask};
use crate::render;
use crate::secrets::AuthToken;
use crate::status::{self, StatusReport};
use crate::sync::{LogSynchronizer, RequestToken};
use crate::types::LogEntry;
use crate::view::{Banner, LogView, RenderInstruction};

pub enum Msg {
    PollTick,
    LogsFetched {
        token: RequestToken,
        result: Result<Vec<LogEntry>, SyncError>,
    },
    KeysChecked(CheckCompletion),
    Status(StatusReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Refresh,
    Show(String),
    Close,
    Copy,
    Ask,
    Check,
    CopyInvalid,
    Status,
    Help,
    Quit,
}

pub const HELP_TEXT: &str = "\
commands:
  refresh          fetch the call log now
  show <log-id>    open the full error of a call
  copy             copy the open error
  ask              copy the open error as a question and open the AI assistant
  close            close the open error
  check            validate every key on the proxy
  copy-invalid     copy the invalid keys from the last check
  status           probe the proxy's health
  quit             leave";

impl UserCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };
        let command = match verb {
            "refresh" | "r" => UserCommand::Refresh,
            "show" | "s" => match parts.next() {
                Some(id) => UserCommand::Show(id.to_string()),
                None => return Err("usage: show <log-id>".to_string()),
            },
            "close" => UserCommand::Close,
            "copy" => UserCommand::Copy,
            "ask" => UserCommand::Ask,
            "check" | "c" => UserCommand::Check,
            "copy-invalid" => UserCommand::CopyInvalid,
            "status" => UserCommand::Status,
            "help" | "?" => UserCommand::Help,
            "quit" | "q" | "exit" => UserCommand::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(command))
    }
}

pub struct Session<W: Write> {
    api: Arc<dyn ConsoleApi>,
    auth: Option<AuthToken>,
    sync: LogSynchronizer,
    view: LogView,
    modal: DiagnosticModalController,
    keys: KeyValidationController,
    clipboard: Box<dyn Clipboard>,
    opener: Box<dyn UrlOpener>,
    tx: mpsc::UnboundedSender<Msg>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(
        api: Arc<dyn ConsoleApi>,
        auth: Option<AuthToken>,
        modal: DiagnosticModalController,
        clipboard: Box<dyn Clipboard>,
        opener: Box<dyn UrlOpener>,
        tx: mpsc::UnboundedSender<Msg>,
        out: W,
    ) -> Self {
        Self {
            api,
            auth,
            sync: LogSynchronizer::new(),
            view: LogView::new(),
            modal,
            keys: KeyValidationController::new(),
            clipboard,
            opener,
            tx,
            out,
        }
    }

    pub fn view(&self) -> &LogView {
        &self.view
    }

    pub fn keys(&self) -> &KeyValidationController {
        &self.keys
    }

    pub fn modal(&self) -> &DiagnosticModalController {
        &self.modal
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn say(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.ends_with('\n') {
            let _ = write!(self.out, "{text}");
        } else {
            let _ = writeln!(self.out, "{text}");
        }
        let _ = self.out.flush();
    }

    fn spawn_fetch(&mut self) {
        let token = self.sync.issue_token();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.logs().await.map_err(SyncError::from);
            let _ = tx.send(Msg::LogsFetched { token, result });
        });
    }

    fn spawn_status(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let report = status::probe(api.as_ref()).await;
            let _ = tx.send(Msg::Status(report));
        });
    }

    fn spawn_check(&mut self) {
        let Some(ticket) = self.keys.begin() else {
            self.say("A key check is already running.");
            return;
        };
        self.say(render::key_check(&self.keys));
        let api = Arc::clone(&self.api);
        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = KeyValidationController::run(ticket, api.as_ref(), auth.as_ref()).await;
            let _ = tx.send(Msg::KeysChecked(completion));
        });
    }

    /// Kick off the initial health probe. Log polling is driven by
    /// [`Msg::PollTick`].
    pub fn start(&mut self) {
        self.spawn_status();
    }

    pub fn handle(&mut self, msg: Msg) {
        match msg {
            Msg::PollTick => self.spawn_fetch(),
            Msg::LogsFetched { token, result } => {
                let report = self.sync.merge(token, result);
                for instruction in report.instructions {
                    match &instruction {
                        RenderInstruction::Prepend(card) => self.say(render::card(card)),
                        RenderInstruction::ShowPlaceholder => self.say(render::NO_LOGS_TEXT),
                        RenderInstruction::ShowError(err) => {
                            self.say(render::banner(&Banner::Error(err.clone())))
                        }
                        RenderInstruction::ClearBanner => {}
                    }
                    self.view.apply(instruction);
                }
            }
            Msg::KeysChecked(completion) => {
                let _ = self.keys.complete(completion);
                self.say(render::key_check(&self.keys));
            }
            Msg::Status(report) => self.say(render::status(&report)),
        }
    }

    pub fn handle_command(&mut self, command: UserCommand) -> ControlFlow<()> {
        let now = Instant::now();
        match command {
            UserCommand::Refresh => self.spawn_fetch(),
            UserCommand::Show(id) => {
                let text = self.modal.open(self.sync.registry(), &id).to_string();
                let hint = format!(
                    "[{}] [{}] [close]",
                    self.modal.copy_label(now),
                    self.modal.ask_label(now)
                );
                self.say(format!("--- {id} ---\n{text}\n---\n{hint}"));
            }
            UserCommand::Close => self.modal.close(),
            UserCommand::Copy => {
                let feedback = self.modal.copy_error(self.clipboard.as_mut(), now);
                let label = self.modal.copy_label(now);
                self.report_action(feedback, label);
            }
            UserCommand::Ask => {
                let feedback =
                    self.modal
                        .ask_assistant(self.clipboard.as_mut(), self.opener.as_mut(), now);
                let label = self.modal.ask_label(now);
                self.report_action(feedback, label);
            }
            UserCommand::Check => self.spawn_check(),
            UserCommand::CopyInvalid => match self.keys.copy_invalid_keys(self.clipboard.as_mut()) {
                CopyInvalidFeedback::Copied { count } => {
                    self.say(format!("Copied {count} invalid keys to the clipboard."))
                }
                CopyInvalidFeedback::NothingToCopy => {}
                CopyInvalidFeedback::Failed(err) => self.say(format!("Copy failed: {err}")),
            },
            UserCommand::Status => self.spawn_status(),
            UserCommand::Help => self.say(HELP_TEXT),
            UserCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn report_action(&mut self, feedback: ActionFeedback, label: &str) {
        match feedback {
            ActionFeedback::NotOpen => self.say("Open an error with 'show <log-id>' first."),
            _ => self.say(format!("[{label}]")),
        }
    }

    pub fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        match UserCommand::parse(line) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => ControlFlow::Continue(()),
            Err(message) => {
                self.say(message);
                ControlFlow::Continue(())
            }
        }
    }
}

/// Run the watch session until `quit` or Ctrl-C.
pub async fn run<W: Write>(
    api: Arc<dyn ConsoleApi>,
    auth: Option<AuthToken>,
    modal: DiagnosticModalController,
    clipboard: Box<dyn Clipboard>,
    opener: Box<dyn UrlOpener>,
    out: W,
) -> std::io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let poll = PollTask::spawn(POLL_INTERVAL, tx.clone(), || Msg::PollTick);
    let mut session = Session::new(api, auth, modal, clipboard, opener, tx, out);
    session.say("Watching proxy logs. Type 'help' for commands.");
    session.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            Some(msg) = rx.recv() => session.handle(msg),
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if session.handle_line(&line).is_break() {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("stdin closed; continuing without commands");
                    stdin_open = false;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "reading stdin failed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    poll.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fakes::{MemoryClipboard, RecordingOpener};
    use crate::test_support::{Fail, FakeApi, log_entry};
    use crate::types::LogStatus;
    use pretty_assertions::assert_eq;

    fn session(api: Arc<FakeApi>) -> (Session<Vec<u8>>, mpsc::UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::new(
            api,
            AuthToken::new("secret"),
            DiagnosticModalController::default(),
            Box::new(MemoryClipboard::default()),
            Box::new(RecordingOpener::default()),
            tx,
            Vec::new(),
        );
        (session, rx)
    }

    fn printed(session: &Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(session.output()).into_owned()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(UserCommand::parse("  "), Ok(None));
        assert_eq!(
            UserCommand::parse("show log-1"),
            Ok(Some(UserCommand::Show("log-1".into())))
        );
        assert!(UserCommand::parse("show").is_err());
        assert!(UserCommand::parse("dance").is_err());
        assert_eq!(UserCommand::parse("q"), Ok(Some(UserCommand::Quit)));
    }

    #[tokio::test]
    async fn tick_fetches_and_renders_new_entries() {
        let mut failed = log_entry("log-2");
        failed.status = LogStatus::Failed;
        failed.error_info = Some("quota exceeded\nretry later".into());
        let api = Arc::new(FakeApi::with_logs(vec![log_entry("log-1"), failed]));
        let (mut session, mut rx) = session(Arc::clone(&api));

        session.handle(Msg::PollTick);
        let msg = rx.recv().await.unwrap();
        session.handle(msg);

        let ids: Vec<_> = session.view().cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["log-2", "log-1"]);
        assert!(printed(&session).contains("quota exceeded..."));

        session.handle_command(UserCommand::Show("log-2".into()));
        assert_eq!(session.modal().text(), Some("quota exceeded\nretry later"));
        assert!(printed(&session).contains("[Copy error]"));
    }

    #[tokio::test]
    async fn fetch_failure_prints_banner() {
        let api = Arc::new(FakeApi::new());
        api.fail_logs(Fail::Unauthorized);
        let (mut session, mut rx) = session(api);

        session.handle_command(UserCommand::Refresh);
        let msg = rx.recv().await.unwrap();
        session.handle(msg);

        assert!(printed(&session).contains("Failed to load logs"));
    }

    #[tokio::test]
    async fn empty_feed_prints_placeholder_once_then_entries() {
        let api = Arc::new(FakeApi::new());
        let (mut session, mut rx) = session(Arc::clone(&api));

        for _ in 0..3 {
            session.handle(Msg::PollTick);
            let msg = rx.recv().await.unwrap();
            session.handle(msg);
        }
        assert_eq!(printed(&session).matches(render::NO_LOGS_TEXT).count(), 1);

        api.set_logs(vec![log_entry("log-1")]);
        session.handle(Msg::PollTick);
        let msg = rx.recv().await.unwrap();
        session.handle(msg);
        assert_eq!(session.view().banner(), None);
        assert_eq!(session.view().cards().len(), 1);
    }

    #[tokio::test]
    async fn repeated_failure_prints_banner_once() {
        let api = Arc::new(FakeApi::new());
        api.fail_logs(Fail::Status(500, None));
        let (mut session, mut rx) = session(api);

        for _ in 0..3 {
            session.handle(Msg::PollTick);
            let msg = rx.recv().await.unwrap();
            session.handle(msg);
        }
        assert_eq!(printed(&session).matches("Failed to load logs").count(), 1);
    }

    #[tokio::test]
    async fn check_disables_trigger_until_completion() {
        let api = Arc::new(FakeApi::with_keys(&["valid-key-0001"], &["sk-ABCDEFGHIJKL"]));
        let (mut session, mut rx) = session(Arc::clone(&api));

        session.handle_command(UserCommand::Check);
        assert!(session.keys().is_busy());
        session.handle_command(UserCommand::Check);
        assert!(printed(&session).contains("already running"));

        let msg = rx.recv().await.unwrap();
        session.handle(msg);
        assert!(!session.keys().is_busy());
        assert!(printed(&session).contains("sk-A...IJKL"));
        assert_eq!(*api.seen_auth.lock().unwrap(), vec![Some("secret".to_string())]);

        session.handle_command(UserCommand::CopyInvalid);
        assert!(printed(&session).contains("Copied 1 invalid keys"));
    }

    #[tokio::test]
    async fn copy_without_open_error_hints() {
        let api = Arc::new(FakeApi::new());
        let (mut session, _rx) = session(api);
        session.handle_command(UserCommand::Copy);
        assert!(printed(&session).contains("show <log-id>"));
        assert!(session.handle_command(UserCommand::Quit).is_break());
    }
}
