//! HSK 4 sentence-ordering exercises.
//!
//! Each exercise gives three sentence fragments labelled A, B and C; the
//! learner puts them in reading order. The bank ships with the crate and is
//! drawn from past HSK 4 papers, so it only serves that level.

use crate::types::HskLevel;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const BUNDLED: &str = include_str!("../data/ordering.json");

/// The only level with ordering exercises.
pub const ORDERING_LEVEL: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingSentences {
    pub a: String,
    pub b: String,
    pub c: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceOrderingExercise {
    /// Paper and question number, e.g. `H41001-56`.
    pub id: String,
    pub sentences: OrderingSentences,
    /// Labels in reading order, e.g. `BCA`.
    pub correct_order: String,
}

impl SentenceOrderingExercise {
    /// Whether `order` lists the labels in reading order. Case, spaces and
    /// separators are ignored, so `"b, c, a"` matches `BCA`.
    pub fn is_correct(&self, order: &str) -> bool {
        let labels: String = order
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        labels == self.correct_order
    }
}

fn is_permutation_of_abc(order: &str) -> bool {
    let mut labels: Vec<char> = order.chars().collect();
    labels.sort_unstable();
    labels == ['A', 'B', 'C']
}

/// All ordering exercises, loaded once.
#[derive(Debug, Clone, Default)]
pub struct OrderingBank {
    exercises: Vec<SentenceOrderingExercise>,
}

impl OrderingBank {
    /// Parse a JSON array of exercises. Ids must be unique and every answer
    /// must use each of A, B and C once.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let exercises: Vec<SentenceOrderingExercise> = serde_json::from_str(json)?;

        let mut ids = HashSet::new();
        for exercise in &exercises {
            if !ids.insert(exercise.id.as_str()) {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "duplicate ordering exercise id: {}",
                    exercise.id
                )));
            }
            if !is_permutation_of_abc(&exercise.correct_order) {
                return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                    "invalid correct_order {} for {}",
                    exercise.correct_order, exercise.id
                )));
            }
        }
        Ok(Self { exercises })
    }

    /// The exercises shipped with the crate.
    pub fn bundled() -> serde_json::Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn serves(level: HskLevel) -> bool {
        level.value() == ORDERING_LEVEL
    }

    /// A random exercise for `level`; `None` for other levels or an empty bank.
    pub fn random<R: Rng + ?Sized>(&self, level: HskLevel, rng: &mut R) -> Option<&SentenceOrderingExercise> {
        if !Self::serves(level) {
            return None;
        }
        self.exercises.choose(rng)
    }

    pub fn get(&self, id: &str) -> Option<&SentenceOrderingExercise> {
        self.exercises.iter().find(|e| e.id == id)
    }
}
