//! Build a multi-character word from its translation.

use crate::error::QuizError;
use crate::types::VocabularyWord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const BUILDING_DISTRACTORS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingQuestion {
    pub word: VocabularyWord,
    /// Single characters to pick from, in shuffled order.
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl BuildingQuestion {
    /// Whether the picked characters spell the word.
    pub fn is_correct<S: AsRef<str>>(&self, picked: &[S]) -> bool {
        picked.iter().map(AsRef::as_ref).collect::<String>() == self.correct_answer
    }
}

fn is_multi_character(word: &VocabularyWord) -> bool {
    word.character.chars().nth(1).is_some()
}

/// One question per multi-character lesson word.
pub fn word_building_quiz<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    rng: &mut R,
) -> Result<Vec<BuildingQuestion>, QuizError> {
    let candidates: Vec<_> = words.iter().filter(|w| is_multi_character(w)).collect();
    if candidates.is_empty() {
        return Err(QuizError::NotEnoughWords {
            required: 1,
            available: 0,
        });
    }

    let mut pool: Vec<char> = Vec::new();
    for c in words.iter().flat_map(|w| w.character.chars()) {
        if !pool.contains(&c) {
            pool.push(c);
        }
    }

    let mut questions: Vec<_> = candidates
        .into_iter()
        .map(|word| {
            let own: Vec<char> = word.character.chars().collect();
            let mut distractors: Vec<char> = pool.iter().copied().filter(|c| !own.contains(c)).collect();
            distractors.shuffle(rng);
            distractors.truncate(BUILDING_DISTRACTORS);

            let mut options: Vec<String> = own
                .iter()
                .chain(distractors.iter())
                .map(|c| c.to_string())
                .collect();
            options.shuffle(rng);

            BuildingQuestion {
                word: word.clone(),
                options,
                correct_answer: word.character.clone(),
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

    fn word(character: &str) -> VocabularyWord {
        VocabularyWord {
            character: character.to_string(),
            pinyin: String::new(),
            translation: format!("meaning of {}", character),
            audio_url: None,
        }
    }

    #[test]
    fn test_only_multi_character_words() {
        let words = vec![word("你好"), word("好"), word("老师"), word("书")];
        let quiz = word_building_quiz(&words, &mut StdRng::seed_from_u64(5)).unwrap();

        let mut built: Vec<_> = quiz.iter().map(|q| q.correct_answer.as_str()).collect();
        built.sort();
        assert_eq!(built, vec!["你好", "老师"]);
    }

    #[test]
    fn test_options_contain_word_plus_two_distractors() {
        let words = vec![word("你好"), word("老师"), word("学生")];
        let quiz = word_building_quiz(&words, &mut StdRng::seed_from_u64(5)).unwrap();

        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            for c in question.correct_answer.chars() {
                assert!(question.options.contains(&c.to_string()));
            }
            let own: Vec<_> = question.correct_answer.chars().map(|c| c.to_string()).collect();
            assert!(question.is_correct(&own));
        }
    }

    #[test]
    fn test_no_multi_character_words_is_an_error() {
        let words = vec![word("好"), word("书")];
        assert!(word_building_quiz(&words, &mut StdRng::seed_from_u64(5)).is_err());
    }
}
