//! Player-facing feedback emitted by the simulation.
//!
//! The simulation never talks to the audio or text renderer directly. It
//! appends [`Feedback`] records to a [`FeedbackQueue`] which the host drains
//! once per frame.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Hex colour string understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color(pub &'static str);

impl Color {
    /// Keys, unlocks, announcements.
    pub const GOLD: Self = Self("#f1c40f");
    /// Red shards and refusals.
    pub const RED: Self = Self("#e74c3c");
    /// Green shards and restocks.
    pub const GREEN: Self = Self("#2ecc71");
    /// Neutral "nothing happened".
    pub const GREY: Self = Self("#95a5a6");
    /// Default text.
    pub const WHITE: Self = Self("#fff");
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Something opened or appeared.
    Success,
    /// The action was refused.
    Failure,
    /// A switch was pressed.
    Click,
}

/// One piece of feedback for the host to present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Feedback {
    /// Text floating up from a world position.
    FloatingText {
        /// Anchor in world space.
        pos: Vec2,
        /// Message.
        text: String,
        /// Text colour.
        color: Color,
    },
    /// Sound effect.
    Cue(Cue),
}

impl Feedback {
    /// The message, if this is floating text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::FloatingText { text, .. } => Some(text),
            Self::Cue(_) => None,
        }
    }
}

/// Append-only buffer of feedback produced during a tick.
#[derive(Debug, Clone, Default)]
pub struct FeedbackQueue {
    events: Vec<Feedback>,
}

impl FeedbackQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues floating text at a world position.
    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Color) {
        self.events.push(Feedback::FloatingText {
            pos,
            text: text.into(),
            color,
        });
    }

    /// Queues an audio cue.
    pub fn cue(&mut self, cue: Cue) {
        self.events.push(Feedback::Cue(cue));
    }

    /// Pending feedback, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Feedback] {
        &self.events
    }

    /// Takes all pending feedback.
    pub fn drain(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.events)
    }

    /// Number of pending records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether any pending record is the given cue.
    #[must_use]
    pub fn has_cue(&self, cue: Cue) -> bool {
        self.events.contains(&Feedback::Cue(cue))
    }

    /// Whether any pending floating text equals `text`.
    #[must_use]
    pub fn has_text(&self, text: &str) -> bool {
        self.events.iter().any(|event| event.text() == Some(text))
    }
}
