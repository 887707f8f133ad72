//! Multiple-choice translation quiz.

use crate::error::QuizError;
use crate::types::VocabularyWord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum lesson size for a choice quiz.
pub const MIN_CHOICE_WORDS: usize = 4;
pub const CHOICE_DISTRACTORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    pub word: VocabularyWord,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl ChoiceQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// One question per lesson word: pick the translation.
pub fn translation_choice_quiz<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>, QuizError> {
    if words.len() < MIN_CHOICE_WORDS {
        return Err(QuizError::NotEnoughWords {
            required: MIN_CHOICE_WORDS,
            available: words.len(),
        });
    }

    let mut questions: Vec<_> = words
        .iter()
        .map(|word| {
            let mut others: Vec<&str> = words
                .iter()
                .filter(|w| w.character != word.character && w.translation != word.translation)
                .map(|w| w.translation.as_str())
                .collect();
            others.shuffle(rng);

            let mut options = vec![word.translation.clone()];
            for translation in others {
                if options.len() > CHOICE_DISTRACTORS {
                    break;
                }
                if !options.iter().any(|o| o == translation) {
                    options.push(translation.to_string());
                }
            }
            options.shuffle(rng);

            ChoiceQuestion {
                word: word.clone(),
                options,
                correct_answer: word.translation.clone(),
            }
        })
        .collect();

    questions.shuffle(rng);
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn word(character: &str, translation: &str) -> VocabularyWord {
        VocabularyWord {
            character: character.to_string(),
            pinyin: String::new(),
            translation: translation.to_string(),
            audio_url: None,
        }
    }

    #[test]
    fn test_requires_four_words() {
        let words = vec![word("一", "one"), word("二", "two"), word("三", "three")];
        let err = translation_choice_quiz(&words, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, QuizError::NotEnoughWords { required: 4, available: 3 });
    }

    #[test]
    fn test_each_question_has_four_distinct_options() {
        let words = vec![
            word("一", "one"),
            word("二", "two"),
            word("三", "three"),
            word("四", "four"),
            word("五", "five"),
            word("六", "six"),
        ];
        let quiz = translation_choice_quiz(&words, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(quiz.len(), words.len());
        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            let unique: HashSet<_> = question.options.iter().collect();
            assert_eq!(unique.len(), 4);
            assert!(question.options.contains(&question.correct_answer));
            assert!(question.is_correct(&question.word.translation));
        }
    }

    #[test]
    fn test_shared_translations_never_duplicate_answer() {
        let words = vec![
            word("哎", "hey"),
            word("唉", "hey"),
            word("一", "one"),
            word("二", "two"),
        ];
        let quiz = translation_choice_quiz(&words, &mut StdRng::seed_from_u64(9)).unwrap();
        for question in &quiz {
            let hits = question.options.iter().filter(|o| **o == question.correct_answer).count();
            assert_eq!(hits, 1);
            assert_eq!(question.options.len(), 3);
        }
    }
}
