//! Practice exercises and generated feedback on sentences and essays.
//!
//! Sentence ordering comes from the bundled bank; every other mode is
//! generated.

use hsk_core::{HskLevel, PracticeMode, SentenceOrderingExercise, VocabularyWord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::generator::{ExerciseGenerator, GenerationResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceExample {
    pub sentence: String,
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCorrectionExercise {
    pub incorrect_sentence: String,
    pub correct_sentence: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceScrambleExercise {
    pub correct_sentence: String,
    pub scrambled_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingExercise {
    pub prompt: String,
    pub words: Vec<VocabularyWord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjunctionExercise {
    pub sentence_a: String,
    pub sentence_b: String,
    pub conjunction_options: Vec<String>,
    pub correct_conjunction: String,
    pub correct_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceFeedback {
    pub is_correct: bool,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "exercise", rename_all = "snake_case")]
pub enum Exercise {
    Example(SentenceExample),
    Correction(ErrorCorrectionExercise),
    Scramble(SentenceScrambleExercise),
    Writing(WritingExercise),
    Conjunction(ConjunctionExercise),
    Ordering(SentenceOrderingExercise),
}

/// Modes served by the generator.
pub fn is_generated(mode: PracticeMode) -> bool {
    matches!(
        mode,
        PracticeMode::Example
            | PracticeMode::Correction
            | PracticeMode::Scramble
            | PracticeMode::Writing
            | PracticeMode::Conjunction
    )
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default();
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

/// Prompt and response schema for a generated mode, `None` for other modes.
pub fn exercise_request(mode: PracticeMode, word: &VocabularyWord, level: HskLevel) -> Option<(String, Value)> {
    let context = format!(
        "The target word is \"{}\" (pinyin: {}, meaning: {}). The learner is at HSK level {}.",
        word.character,
        word.pinyin,
        word.translation,
        level.value()
    );

    let (task, schema) = match mode {
        PracticeMode::Example => (
            "Write one simple Chinese example sentence using the target word, ending with 。, \
             and give its translation."
                .to_string(),
            object(json!({ "sentence": string(), "translation": string() })),
        ),
        PracticeMode::Correction => (
            "Write a Chinese sentence using the target word that contains one common grammar \
             mistake. Give the corrected sentence and a short explanation of the mistake. \
             Both sentences end with 。."
                .to_string(),
            object(json!({
                "incorrect_sentence": string(),
                "correct_sentence": string(),
                "explanation": string(),
            })),
        ),
        PracticeMode::Scramble => (
            "Write a natural Chinese sentence using the target word, ending with 。. Then list \
             its words and phrases in scrambled order, with the final 。 as its own item."
                .to_string(),
            object(json!({ "correct_sentence": string(), "scrambled_words": string_array() })),
        ),
        PracticeMode::Writing => (
            format!(
                "Write a short essay prompt (about 80 characters expected) and list 5 related \
                 vocabulary words the learner should use, including \"{}\".",
                word.character
            ),
            object(json!({
                "prompt": string(),
                "words": {
                    "type": "ARRAY",
                    "items": object(json!({
                        "character": string(),
                        "pinyin": string(),
                        "translation": string(),
                    })),
                },
            })),
        ),
        PracticeMode::Conjunction => (
            "Write two short related Chinese sentences, at least one using the target word. Give \
             the conjunction pair that joins them, two plausible wrong conjunctions shuffled with \
             the right one, and the joined sentence. Every sentence ends with 。."
                .to_string(),
            object(json!({
                "sentence_a": string(),
                "sentence_b": string(),
                "conjunction_options": string_array(),
                "correct_conjunction": string(),
                "correct_sentence": string(),
            })),
        ),
        _ => return None,
    };

    Some((format!("{} {}", context, task), schema))
}

fn decode<T: for<'de> Deserialize<'de>>(value: Value) -> GenerationResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// Generate one exercise. Returns `Ok(None)` for modes the generator does not serve.
pub async fn generate_exercise(
    generator: &dyn ExerciseGenerator,
    mode: PracticeMode,
    word: &VocabularyWord,
    level: HskLevel,
) -> GenerationResult<Option<Exercise>> {
    let Some((prompt, schema)) = exercise_request(mode, word, level) else {
        return Ok(None);
    };

    let value = generator.generate(&prompt, &schema).await?;
    let exercise = match mode {
        PracticeMode::Example => Exercise::Example(decode(value)?),
        PracticeMode::Correction => Exercise::Correction(decode(value)?),
        PracticeMode::Scramble => Exercise::Scramble(decode(value)?),
        PracticeMode::Writing => Exercise::Writing(decode(value)?),
        PracticeMode::Conjunction => Exercise::Conjunction(decode(value)?),
        _ => return Ok(None),
    };
    Ok(Some(exercise))
}

/// Ask for feedback on a learner's sentence using `word`.
pub async fn sentence_feedback(
    generator: &dyn ExerciseGenerator,
    word: &VocabularyWord,
    sentence: &str,
    level: HskLevel,
) -> GenerationResult<SentenceFeedback> {
    let prompt = format!(
        "A Chinese learner at HSK level {} wrote this sentence to practise \"{}\" (pinyin: {}): \
         \"{}\". Decide whether it is grammatical and natural, and give brief, encouraging \
         feedback with a correction if needed.",
        level.value(),
        word.character,
        word.pinyin,
        sentence
    );
    let schema = object(json!({ "is_correct": { "type": "BOOLEAN" }, "feedback": string() }));

    decode(generator.generate(&prompt, &schema).await?)
}

/// Ask for overall feedback on an essay written for a writing prompt.
pub async fn essay_feedback(
    generator: &dyn ExerciseGenerator,
    essay: &str,
    words: &[String],
    level: HskLevel,
) -> GenerationResult<SentenceFeedback> {
    let word_list = words
        .iter()
        .map(|w| format!("\"{}\"", w))
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = format!(
        "A Chinese learner at HSK level {} wrote a short essay and was asked to use these words: \
         {}. The essay is: \"{}\". Check that each word is used correctly, look for grammar \
         mistakes and awkward phrasing, and give two or three sentences of encouraging overall \
         feedback. Mark it correct if it has at most minor errors.",
        level.value(),
        word_list,
        essay
    );
    let schema = object(json!({ "is_correct": { "type": "BOOLEAN" }, "feedback": string() }));

    decode(generator.generate(&prompt, &schema).await?)
}
