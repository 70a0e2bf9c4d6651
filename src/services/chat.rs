use tokio::sync::mpsc;
use tracing::warn;

/// Outbound chat of the hosting context.
///
/// Delivery is fire-and-forget: implementations must not block and report failures through
/// logs only.
pub trait ChatSink: Send + Sync {
    /// Send an emphasized message (question announcements).
    fn announce(&self, text: &str);
    /// Send a regular message.
    fn say(&self, text: &str);
}

/// A message emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatLine {
    /// Emphasized message.
    Announce(String),
    /// Regular message.
    Say(String),
}

impl ChatLine {
    /// Text of the message regardless of its emphasis.
    pub fn text(&self) -> &str {
        match self {
            ChatLine::Announce(text) | ChatLine::Say(text) => text,
        }
    }
}

/// [`ChatSink`] forwarding messages to a channel drained by the host.
#[derive(Debug, Clone)]
pub struct ChannelChatSink {
    tx: mpsc::UnboundedSender<ChatLine>,
}

impl ChannelChatSink {
    /// Create the sink and the receiving half the host should drain.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, line: ChatLine) {
        if let Err(err) = self.tx.send(line) {
            warn!(text = err.0.text(), "chat receiver dropped; message lost");
        }
    }
}

impl ChatSink for ChannelChatSink {
    fn announce(&self, text: &str) {
        self.send(ChatLine::Announce(text.to_owned()));
    }

    fn say(&self, text: &str) {
        self.send(ChatLine::Say(text.to_owned()));
    }
}
