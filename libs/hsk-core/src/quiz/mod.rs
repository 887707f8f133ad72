//! Lesson quizzes.

pub mod building;
pub mod choice;
pub mod matching;

pub use building::{word_building_quiz, BuildingQuestion};
pub use choice::{translation_choice_quiz, ChoiceQuestion};
pub use matching::{Advance, MatchingSession, MatchingView, Selection, Side};
