//! Line-oriented terminal front end for a single conversation.
//!
//! Reads stdin, hands non-command lines to the controller and prints each new
//! turn. A line ending in `\` continues on the next line.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use url::Url;

use crate::chat::{
    ChatConfig, ClaudeModel, ConversationController, ConversationState, HttpRelayTransport, Message,
    RelayTransport, SendOutcome,
};
use crate::relay::Relay;

const HELP: &str = "Commands: /key <api key>, /model <id>, /models, /relay [url], /help, /quit\n\
End a line with \\ to keep typing on the next line.\n";

const NEEDS_KEY: &str = "Set your API key with /key before sending.\n";

/// One parsed input line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command<'a> {
    /// Replace the credential.
    Key(&'a str),
    /// Select a model by identifier.
    Model(&'a str),
    /// List known models.
    Models,
    /// Use the relay served at this URL; empty switches back to in-process.
    Relay(&'a str),
    /// Show usage.
    Help,
    /// Leave.
    Quit,
    /// Anything else: a message to send.
    Send(&'a str),
}

impl<'a> Command<'a> {
    /// Interpret one complete input.
    #[must_use]
    pub fn parse(input: &'a str) -> Self {
        let trimmed = input.trim();
        let (head, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(head, rest)| (head, rest.trim()));

        match head {
            "/key" => Self::Key(rest),
            "/model" => Self::Model(rest),
            "/models" => Self::Models,
            "/relay" => Self::Relay(rest),
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Send(input),
        }
    }
}

/// Accumulates continued lines into one input.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: String,
}

impl Composer {
    /// Feed one raw line; returns the finished input once a line does not
    /// end with a continuation backslash.
    pub fn push(&mut self, line: &str) -> Option<String> {
        if let Some(head) = line.strip_suffix('\\') {
            self.buffer.push_str(head);
            self.buffer.push('\n');
            return None;
        }
        self.buffer.push_str(line);
        Some(std::mem::take(&mut self.buffer))
    }

    /// Input still open when the stream ends, without its dangling line break.
    pub fn finish(&mut self) -> Option<String> {
        let mut rest = std::mem::take(&mut self.buffer);
        if rest.ends_with('\n') {
            rest.pop();
        }
        (!rest.is_empty()).then_some(rest)
    }
}

/// Format one turn for display, keeping its text verbatim.
#[must_use]
pub fn render_message(message: &Message, model: ClaudeModel) -> String {
    let speaker = if message.is_user() { "You" } else { model.label() };
    format!("{speaker}:\n{}\n\n", message.content)
}

/// Format the list of selectable models, marking the current one.
#[must_use]
pub fn render_models(current: ClaudeModel) -> String {
    ClaudeModel::ALL
        .into_iter()
        .map(|model| {
            let marker = if model == current { '*' } else { ' ' };
            format!("{marker} {} ({})\n", model.as_str(), model.label())
        })
        .collect()
}

/// Build a transport for the relay at `endpoint`, or an in-process relay.
///
/// # Errors
/// Returns an error if the HTTP client for the chosen transport cannot be built.
pub fn build_transport(endpoint: Option<Url>) -> anyhow::Result<Arc<dyn RelayTransport>> {
    let transport: Arc<dyn RelayTransport> = match endpoint {
        Some(url) => {
            tracing::info!("Using relay at {url}");
            Arc::new(HttpRelayTransport::new(url)?)
        }
        None => {
            tracing::info!("Using in-process relay");
            Arc::new(Relay::with_defaults()?)
        }
    };
    Ok(transport)
}

/// Run an interactive conversation on stdin/stdout until EOF or `/quit`.
///
/// # Errors
/// Returns an error if the transport cannot be built or the terminal cannot be
/// read or written.
pub async fn run_terminal(config: ChatConfig) -> anyhow::Result<()> {
    let controller = ConversationController::new(build_transport(None)?);
    let mut state = ConversationState::new(config.default_model);

    converse(
        controller,
        &mut state,
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
    )
    .await?;

    tracing::debug!(session = %state.session_id(), turns = state.history().len(), "Conversation ended");
    Ok(())
}

/// Drive one conversation from `input` to `out`.
async fn converse<R, W>(
    mut controller: ConversationController,
    state: &mut ConversationState,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut composer = Composer::default();

    out.write_all(format!("Chatting with {}. {HELP}{NEEDS_KEY}\n", state.model().label()).as_bytes())
        .await?;
    out.flush().await?;

    loop {
        let entry = match lines.next_line().await? {
            Some(line) => match composer.push(&line) {
                Some(entry) => entry,
                None => continue,
            },
            None => match composer.finish() {
                Some(entry) => entry,
                None => break,
            },
        };

        let reply = match Command::parse(&entry) {
            Command::Quit => break,
            Command::Help => HELP.to_string(),
            Command::Models => render_models(state.model()),
            Command::Key(key) => {
                state.set_credential(key);
                let notice = if state.has_credential() { "API key set.\n" } else { "API key cleared.\n" };
                notice.to_string()
            }
            Command::Model(id) => match id.parse::<ClaudeModel>() {
                Ok(model) => {
                    state.set_model(model);
                    format!("Switched to {}.\n", model.label())
                }
                Err(e) => format!("{e}. Try /models.\n"),
            },
            Command::Relay(target) => switch_relay(&mut controller, target),
            Command::Send(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                if state.is_input_disabled() {
                    NEEDS_KEY.to_string()
                } else {
                    send_turn(&controller, state, text, out).await?
                }
            }
        };

        out.write_all(reply.as_bytes()).await?;
        out.flush().await?;
    }

    Ok(())
}

/// Point `controller` at the relay named by `target`, or back in-process when empty.
fn switch_relay(controller: &mut ConversationController, target: &str) -> String {
    let endpoint = if target.is_empty() {
        None
    } else {
        match Url::parse(target) {
            Ok(url) => Some(url),
            Err(e) => return format!("Invalid relay URL: {e}\n"),
        }
    };

    let notice = endpoint
        .as_ref()
        .map_or_else(|| "Using the in-process relay.\n".to_string(), |url| format!("Using relay at {url}.\n"));
    match build_transport(endpoint) {
        Ok(transport) => {
            *controller = ConversationController::new(transport);
            notice
        }
        Err(e) => format!("Could not switch relay: {e}\n"),
    }
}

/// Show the user turn as soon as it is appended, then wait for the reply.
///
/// If the user turn cannot be shown the open turn is dropped, which returns the
/// conversation to idle before the error propagates.
async fn send_turn<W>(
    controller: &ConversationController,
    state: &mut ConversationState,
    text: &str,
    out: &mut W,
) -> anyhow::Result<String>
where
    W: AsyncWrite + Unpin,
{
    let turn = match ConversationController::begin(state, text) {
        Ok(turn) => turn,
        Err(SendOutcome::Busy) => return Ok("Still waiting for the previous reply.\n".to_string()),
        Err(_) => return Ok(String::new()),
    };

    let model = turn.state().model();
    if let Some(user_turn) = turn.state().history().last() {
        let shown = render_message(user_turn, model);
        out.write_all(shown.as_bytes()).await?;
        out.flush().await?;
    }

    Ok(match controller.complete(turn).await {
        SendOutcome::Settled(message) => render_message(&message, model),
        SendOutcome::Ignored | SendOutcome::Busy => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use axum::http::StatusCode;

    use super::*;
    use crate::relay::tests::{relay_for, spawn_upstream};

    /// Writer whose every write fails.
    struct Broken;

    impl AsyncWrite for Broken {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/key sk-123"), Command::Key("sk-123"));
        assert_eq!(Command::parse("/key"), Command::Key(""));
        assert_eq!(
            Command::parse("/model claude-3-haiku-20240307"),
            Command::Model("claude-3-haiku-20240307")
        );
        assert_eq!(Command::parse("/models"), Command::Models);
        assert_eq!(
            Command::parse("/relay http://localhost:3000/api/chat"),
            Command::Relay("http://localhost:3000/api/chat")
        );
        assert_eq!(Command::parse("/relay"), Command::Relay(""));
        assert_eq!(Command::parse(" /quit "), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/help"), Command::Help);
    }

    #[test]
    fn test_plain_text_is_sent_verbatim() {
        assert_eq!(Command::parse("  Hello there "), Command::Send("  Hello there "));
        assert_eq!(Command::parse("/unknown thing"), Command::Send("/unknown thing"));
    }

    #[test]
    fn test_composer_joins_continued_lines() {
        let mut composer = Composer::default();
        assert_eq!(composer.push("first\\"), None);
        assert_eq!(composer.push("  second\\"), None);
        assert_eq!(composer.push("third").as_deref(), Some("first\n  second\nthird"));
        assert_eq!(composer.push("next").as_deref(), Some("next"));
        assert_eq!(composer.finish(), None);
    }

    #[test]
    fn test_composer_keeps_open_input_at_end_of_stream() {
        let mut composer = Composer::default();
        assert_eq!(composer.push("first\\"), None);
        assert_eq!(composer.push("second\\"), None);

        assert_eq!(composer.finish().as_deref(), Some("first\nsecond"));
        assert_eq!(composer.finish(), None);
    }

    #[test]
    fn test_render_message() {
        let user = Message::user("Hello");
        let reply = Message::assistant("line 1\n  line 2");

        assert_eq!(render_message(&user, ClaudeModel::Opus3), "You:\nHello\n\n");
        assert_eq!(
            render_message(&reply, ClaudeModel::Opus3),
            "Claude 3 Opus:\nline 1\n  line 2\n\n"
        );
    }

    #[test]
    fn test_render_models_marks_current() {
        let listing = render_models(ClaudeModel::Haiku3);
        assert!(listing.contains("* claude-3-haiku-20240307 (Claude 3 Haiku)"));
        assert!(listing.contains("  claude-3-opus-20240229 (Claude 3 Opus)"));
    }

    #[tokio::test]
    async fn test_switch_relay() {
        let mut controller = ConversationController::new(build_transport(None).unwrap());

        assert!(switch_relay(&mut controller, "not a url").starts_with("Invalid relay URL"));
        assert_eq!(
            switch_relay(&mut controller, "http://localhost:3000/api/chat"),
            "Using relay at http://localhost:3000/api/chat.\n"
        );
        assert_eq!(switch_relay(&mut controller, ""), "Using the in-process relay.\n");
    }

    #[tokio::test]
    async fn test_unwritable_output_leaves_conversation_idle() {
        let (url, captured) = spawn_upstream(StatusCode::OK, r#"{"content":[{"text":"Hi"}]}"#).await;
        let controller = ConversationController::new(Arc::new(relay_for(&url)));
        let mut state = ConversationState::new(ClaudeModel::Sonnet3);
        state.set_credential("sk-test");

        let result = send_turn(&controller, &mut state, "Hello", &mut Broken).await;

        assert!(result.is_err());
        assert!(!state.is_pending());
        assert!(!state.is_input_disabled());
        assert_eq!(state.history().len(), 1);
        assert!(captured.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_conversation_sends_input_left_open_at_end_of_stream() {
        let (url, captured) = spawn_upstream(StatusCode::OK, r#"{"content":[{"text":"Hi"}]}"#).await;
        let controller = ConversationController::new(Arc::new(relay_for(&url)));
        let mut state = ConversationState::new(ClaudeModel::Sonnet3);
        let mut out = Vec::new();

        converse(controller, &mut state, "/key sk-test\nfirst\\\nsecond\\".as_bytes(), &mut out)
            .await
            .unwrap();

        let seen = captured.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1["messages"][0]["content"], "first\nsecond");

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("You:\nfirst\nsecond\n\n"));
        assert!(transcript.contains("Claude 3 Sonnet:\nHi\n\n"));
        assert!(!state.is_pending());
        assert_eq!(state.history().len(), 2);
    }
}
