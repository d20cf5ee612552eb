//! Human-in-the-loop naming.
//!
//! Whenever metadata cannot name an item, the batch asks a [`Labeler`].
//! The terminal implementation plays the audio (if a player is configured)
//! and reads an answer; tests and scripted runs use [`ScriptedLabeler`].

mod prompt;

pub use prompt::{Player, PromptLabeler, ENV_PLAYER};

use std::collections::VecDeque;
use std::path::PathBuf;
use thiserror::Error;

/// Something that needs a name
#[derive(Debug, Clone)]
pub struct LabelItem {
    /// Question shown to the operator
    pub prompt: String,
    /// Audio to play before asking, if any
    pub audio: Option<PathBuf>,
}

impl LabelItem {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Failed to read operator input: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability to turn an item into a label, or decline it
pub trait Labeler {
    /// `Ok(None)` means skip this item
    fn present_for_labeling(&mut self, item: &LabelItem) -> Result<Option<String>, LabelError>;
}

/// Blank answers mean "skip"
pub(crate) fn normalize_answer(answer: &str) -> Option<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Answers from a fixed list, in order. Runs out into skips.
#[derive(Debug, Default)]
pub struct ScriptedLabeler {
    answers: VecDeque<String>,
    asked: Vec<LabelItem>,
}

impl ScriptedLabeler {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Items presented so far
    pub fn asked(&self) -> &[LabelItem] {
        &self.asked
    }
}

impl Labeler for ScriptedLabeler {
    fn present_for_labeling(&mut self, item: &LabelItem) -> Result<Option<String>, LabelError> {
        self.asked.push(item.clone());
        Ok(self.answers.pop_front().and_then(|a| normalize_answer(&a)))
    }
}
