/// Rich inline message content.
///
/// A chat message is a sequence of segments: plain text interleaved with
/// rich elements such as mentions and images. The dispatch core never
/// interprets rich content itself; it hands segments to the type-indexed
/// argument parsers.
use serde::{Deserialize, Serialize};

/// One rich-content element inside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageSegment {
    /// Plain text.
    Text { text: String },
    /// An @-mention of a user by id.
    At { target: u64 },
    /// An image, referenced by its upload id.
    Image { image_id: String },
}

impl MessageSegment {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { text: content.into() }
    }

    /// Render the segment to its plain-text form.
    ///
    /// This is the default path for parsing a rich argument: render to
    /// text, then run the text parser. Parsers that understand a segment
    /// natively (e.g. mentions for member arguments) override it.
    pub fn render_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::At { target } => format!("@{target}"),
            Self::Image { image_id } => format!("[image:{image_id}]"),
        }
    }
}
