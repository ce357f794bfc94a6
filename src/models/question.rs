// src/models/question.rs

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::trivia::SourceError;

/// Letter identifying one of the four answer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    /// Display order of the answer slots.
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];
}

/// One answer as shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub key: OptionKey,
    pub text: String,
}

/// A multiple-choice item exactly as the question source delivers it.
/// Text fields are still base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub difficulty: String,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

/// A decoded question ready to be asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    prompt: String,
    options: Vec<AnswerOption>,
    correct_option: OptionKey,
}

impl QuizQuestion {
    /// Builds a question from already decoded texts, placing the correct answer at
    /// `correct_position` (0..=3) among the incorrect ones.
    ///
    /// The correct key is the first slot whose text equals `correct`, so a source
    /// that repeats the correct text among the incorrect answers resolves to the
    /// earliest matching slot.
    pub fn assemble(
        prompt: String,
        correct: String,
        incorrect: Vec<String>,
        correct_position: usize,
    ) -> Result<Self, SourceError> {
        if incorrect.len() != OptionKey::ALL.len() - 1 {
            return Err(SourceError::Decode(format!(
                "expected 3 incorrect answers, got {}",
                incorrect.len()
            )));
        }

        let mut texts = incorrect;
        texts.insert(correct_position.min(texts.len()), correct.clone());

        let options: Vec<AnswerOption> = OptionKey::ALL
            .into_iter()
            .zip(texts)
            .map(|(key, text)| AnswerOption { key, text })
            .collect();

        let correct_option = options
            .iter()
            .find(|o| o.text == correct)
            .map(|o| o.key)
            .ok_or_else(|| SourceError::Decode("correct answer missing from options".into()))?;

        Ok(Self {
            prompt,
            options,
            correct_option,
        })
    }

    /// Decodes a raw source item and places its correct answer at a random slot.
    pub fn decode<R: Rng>(raw: &RawQuestion, rng: &mut R) -> Result<Self, SourceError> {
        let prompt = decode_text(&raw.question)?;
        let correct = decode_text(&raw.correct_answer)?;
        let incorrect = raw
            .incorrect_answers
            .iter()
            .map(|a| decode_text(a))
            .collect::<Result<Vec<_>, _>>()?;

        let position = rng.random_range(0..OptionKey::ALL.len());
        Self::assemble(prompt, correct, incorrect, position)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    pub fn correct_option(&self) -> OptionKey {
        self.correct_option
    }

    pub fn is_correct(&self, key: OptionKey) -> bool {
        self.correct_option == key
    }
}

fn decode_text(encoded: &str) -> Result<String, SourceError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SourceError::Decode(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| SourceError::Decode(format!("invalid utf-8: {}", e)))
}

/// DTO for sending the current question to the client (excludes the answer key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    /// Zero-based position in the quiz.
    pub index: usize,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
    pub selected: Option<OptionKey>,
    /// True on the last question: the next advance completes the quiz.
    pub is_final: bool,
}
