//! Answer assembly: retrieved passages + question → grounded answer.
//!
//! The generation capability sits behind the [`Generator`] trait and is
//! normalized at that boundary into a fixed set of variants ([`Generation`]),
//! so downstream code never branches on response shape. Every exchange is
//! appended to the session's [`Conversation`], including failures, which
//! record the question with a failed-answer marker.

use crate::error::{LlmError, QaError};

/// Verbatim refusal the model is instructed to emit when the answer is not
/// in the supplied context.
pub const REFUSAL_SENTINEL: &str =
    "That information isn't in the loaded text. Try asking something else about the book.";

/// Substring used to recognize the refusal even when the model paraphrases
/// around it.
const REFUSAL_MARKER: &str = "isn't in the loaded text";

/// Normalized result of a generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The model answered from the context.
    Answer(String),
    /// The model declined: the answer is not in the context.
    NotInContext(String),
}

impl Generation {
    /// Classify raw model text into the fixed variant set.
    pub fn from_raw(text: String) -> Self {
        if text.contains(REFUSAL_MARKER) {
            Generation::NotInContext(text)
        } else {
            Generation::Answer(text)
        }
    }

    /// The user-visible answer text, whichever variant this is.
    pub fn into_text(self) -> String {
        match self {
            Generation::Answer(text) | Generation::NotInContext(text) => text,
        }
    }
}

/// A capability that completes a prompt, already normalized to [`Generation`].
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<Generation, LlmError>;
}

/// Build the fixed instruction prompt from a question and its retrieved
/// passages. Passages are concatenated verbatim; bounding total size is the
/// caller's job via the retrieval `k`.
pub fn build_prompt(question: &str, passages: &[String]) -> String {
    let context = passages.join("\n\n");
    format!(
        "You are an expert literary assistant helping readers understand and explore books.\n\
         Answer the question using ONLY the provided context from the book.\n\
         \n\
         If the answer is not found in the context, respond with:\n\
         \"{REFUSAL_SENTINEL}\"\n\
         \n\
         Be insightful and detailed. Quote relevant passages when helpful.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}

/// How a question was ultimately answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Grounded answer from the context.
    Answered(String),
    /// The model reported the answer is not in the context.
    NotInContext(String),
    /// Generation failed; no answer text exists.
    Failed { reason: String },
}

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: AnswerOutcome,
}

/// Append-only, process-lifetime conversation log. Never trimmed.
#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, question: &str, answer: AnswerOutcome) {
        self.entries.push(ConversationEntry {
            question: question.to_string(),
            answer,
        });
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assemble the context, invoke the generator, and log the exchange.
///
/// On success the answer text is returned and recorded. On failure the
/// question is still recorded, marked failed, and a `GenerationFailed`
/// error is surfaced.
pub fn answer(
    generator: &dyn Generator,
    conversation: &mut Conversation,
    question: &str,
    passages: &[String],
) -> Result<String, QaError> {
    let prompt = build_prompt(question, passages);
    tracing::debug!(passages = passages.len(), "invoking generator");

    match generator.generate(&prompt) {
        Ok(Generation::Answer(text)) => {
            conversation.push(question, AnswerOutcome::Answered(text.clone()));
            Ok(text)
        }
        Ok(Generation::NotInContext(text)) => {
            conversation.push(question, AnswerOutcome::NotInContext(text.clone()));
            Ok(text)
        }
        Err(e) => {
            tracing::warn!(error = %e, "generation failed");
            conversation.push(
                question,
                AnswerOutcome::Failed {
                    reason: e.to_string(),
                },
            );
            Err(e.into())
        }
    }
}
