//! Word/translation matching game.
//!
//! A lesson is shuffled once and split into rounds. Each round shows the
//! round's characters on the left and the same words' translations, in an
//! independent shuffle, on the right. The player fills one slot per side; a
//! filled pair is evaluated at once. A wrong pair locks the board for a short
//! cool-down before both slots clear.

use crate::error::QuizError;
use crate::types::{Outcome, VocabularyWord};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const WORDS_PER_ROUND: usize = 5;
pub const NUMBER_OF_ROUNDS: usize = 3;
/// How long a wrong pair stays flagged before new selections are accepted.
pub const MISMATCH_COOLDOWN_MS: i64 = 800;

/// Shuffle the lesson once and cut it into [`NUMBER_OF_ROUNDS`] rounds of [`WORDS_PER_ROUND`].
pub fn build_rounds<R: Rng + ?Sized>(
    words: &[VocabularyWord],
    rng: &mut R,
) -> Result<Vec<Vec<VocabularyWord>>, QuizError> {
    let required = WORDS_PER_ROUND * NUMBER_OF_ROUNDS;
    if words.len() < required {
        return Err(QuizError::NotEnoughWords {
            required,
            available: words.len(),
        });
    }

    let mut shuffled = words.to_vec();
    shuffled.shuffle(rng);

    Ok(shuffled
        .chunks(WORDS_PER_ROUND)
        .take(NUMBER_OF_ROUNDS)
        .map(<[VocabularyWord]>::to_vec)
        .collect())
}

/// Which deck a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Result of selecting a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Selection {
    /// The card is matched, already selected, or the board is cooling down.
    Ignored,
    /// Waiting for a card on the other side.
    Pending,
    Matched {
        character: String,
        round_complete: bool,
    },
    Mismatched {
        left: String,
        right: String,
        cooldown_until: DateTime<Utc>,
    },
}

impl Selection {
    /// Mastery outcomes this selection implies, per character.
    pub fn mastery_updates(&self) -> Vec<(&str, Outcome)> {
        match self {
            Self::Matched { character, .. } => vec![(character.as_str(), Outcome::Correct)],
            Self::Mismatched { left, right, .. } => vec![
                (left.as_str(), Outcome::Incorrect),
                (right.as_str(), Outcome::Incorrect),
            ],
            Self::Ignored | Self::Pending => Vec::new(),
        }
    }
}

/// Result of moving past a completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Advance {
    NextRound { round: usize },
    GameComplete { score: usize, total: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mismatch {
    left: usize,
    right: usize,
    until: DateTime<Utc>,
}

/// One card as shown to the player.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub index: usize,
    pub text: String,
    pub matched: bool,
}

/// Snapshot of the board.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingView {
    pub round: usize,
    pub rounds: usize,
    pub left: Vec<CardView>,
    pub right: Vec<CardView>,
    pub selected_left: Option<usize>,
    pub selected_right: Option<usize>,
    /// Wrong pair still flagged, as `(left, right)` indices.
    pub incorrect: Option<(usize, usize)>,
    pub score: usize,
    pub total: usize,
    pub round_complete: bool,
    pub finished: bool,
}

/// State of one matching game.
#[derive(Debug, Clone)]
pub struct MatchingSession {
    rounds: Vec<Vec<VocabularyWord>>,
    round: usize,
    right: Vec<VocabularyWord>,
    matched: HashSet<String>,
    selected_left: Option<usize>,
    selected_right: Option<usize>,
    mismatch: Option<Mismatch>,
    score: usize,
    finished: bool,
}

impl MatchingSession {
    /// Build rounds from a lesson and start the first one.
    pub fn start<R: Rng + ?Sized>(words: &[VocabularyWord], rng: &mut R) -> Result<Self, QuizError> {
        let rounds = build_rounds(words, rng)?;
        Ok(Self::from_rounds(rounds, rng))
    }

    /// Start a game over prepared rounds. Empty rounds are dropped.
    pub fn from_rounds<R: Rng + ?Sized>(rounds: Vec<Vec<VocabularyWord>>, rng: &mut R) -> Self {
        let rounds: Vec<_> = rounds.into_iter().filter(|r| !r.is_empty()).collect();
        let mut session = Self {
            rounds,
            round: 0,
            right: Vec::new(),
            matched: HashSet::new(),
            selected_left: None,
            selected_right: None,
            mismatch: None,
            score: 0,
            finished: false,
        };
        if session.rounds.is_empty() {
            session.finished = true;
        } else {
            session.deal(rng);
        }
        session
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.right = self.rounds[self.round].clone();
        self.right.shuffle(rng);
        self.matched.clear();
        self.selected_left = None;
        self.selected_right = None;
        self.mismatch = None;
    }

    pub fn left_deck(&self) -> &[VocabularyWord] {
        self.rounds.get(self.round).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn right_deck(&self) -> &[VocabularyWord] {
        &self.right
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Words across all rounds.
    pub fn total_words(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_round_complete(&self) -> bool {
        !self.finished && self.matched.len() == self.left_deck().len()
    }

    pub fn is_matched(&self, character: &str) -> bool {
        self.matched.contains(character)
    }

    /// Clear an expired wrong pair. Returns whether the board is still locked.
    pub fn settle(&mut self, now: DateTime<Utc>) -> bool {
        match &self.mismatch {
            Some(m) if now >= m.until => {
                self.mismatch = None;
                self.selected_left = None;
                self.selected_right = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Select the card at `index` on `side`.
    pub fn select(&mut self, side: Side, index: usize, now: DateTime<Utc>) -> Result<Selection, QuizError> {
        if self.finished {
            return Err(QuizError::GameComplete);
        }

        let deck = match side {
            Side::Left => self.left_deck(),
            Side::Right => self.right_deck(),
        };
        let character = deck
            .get(index)
            .map(|w| w.character.clone())
            .ok_or(QuizError::InvalidCard { index })?;

        if self.settle(now) || self.matched.contains(&character) {
            return Ok(Selection::Ignored);
        }

        let slot = match side {
            Side::Left => &mut self.selected_left,
            Side::Right => &mut self.selected_right,
        };
        if *slot == Some(index) {
            return Ok(Selection::Ignored);
        }
        *slot = Some(index);

        match (self.selected_left, self.selected_right) {
            (Some(left), Some(right)) => Ok(self.evaluate(left, right, now)),
            _ => Ok(Selection::Pending),
        }
    }

    fn evaluate(&mut self, left: usize, right: usize, now: DateTime<Utc>) -> Selection {
        let left_char = self.left_deck()[left].character.clone();
        let right_char = self.right[right].character.clone();

        if left_char == right_char {
            self.matched.insert(left_char.clone());
            self.score += 1;
            self.selected_left = None;
            self.selected_right = None;
            Selection::Matched {
                character: left_char,
                round_complete: self.is_round_complete(),
            }
        } else {
            let until = now + Duration::milliseconds(MISMATCH_COOLDOWN_MS);
            self.mismatch = Some(Mismatch { left, right, until });
            Selection::Mismatched {
                left: left_char,
                right: right_char,
                cooldown_until: until,
            }
        }
    }

    /// Move to the next round, or finish the game after the last one.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Advance, QuizError> {
        if self.finished {
            return Err(QuizError::GameComplete);
        }
        if !self.is_round_complete() {
            return Err(QuizError::RoundInProgress);
        }

        if self.round + 1 < self.rounds.len() {
            self.round += 1;
            self.deal(rng);
            Ok(Advance::NextRound { round: self.round })
        } else {
            self.finished = true;
            Ok(Advance::GameComplete {
                score: self.score,
                total: self.total_words(),
            })
        }
    }

    /// Snapshot at `now`. A wrong pair whose cool-down has passed is shown
    /// as already cleared, matching what the next [`select`](Self::select) sees.
    pub fn view(&self, now: DateTime<Utc>) -> MatchingView {
        let mismatch = self.mismatch.as_ref().filter(|m| now < m.until);
        let (selected_left, selected_right) = match (&self.mismatch, mismatch) {
            (Some(_), None) => (None, None),
            _ => (self.selected_left, self.selected_right),
        };

        let cards = |deck: &[VocabularyWord], text: fn(&VocabularyWord) -> &str| {
            deck.iter()
                .enumerate()
                .map(|(index, w)| CardView {
                    index,
                    text: text(w).to_string(),
                    matched: self.matched.contains(&w.character),
                })
                .collect()
        };

        MatchingView {
            round: self.round,
            rounds: self.rounds.len(),
            left: cards(self.left_deck(), |w| &w.character),
            right: cards(&self.right, |w| &w.translation),
            selected_left,
            selected_right,
            incorrect: mismatch.map(|m| (m.left, m.right)),
            score: self.score,
            total: self.total_words(),
            round_complete: self.is_round_complete(),
            finished: self.finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mastery::update_word_mastery;
    use crate::store::{MemoryStore, ProgressStore};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(n: usize) -> Vec<VocabularyWord> {
        (0..n)
            .map(|i| VocabularyWord {
                character: format!("字{}", i),
                pinyin: format!("zi{}", i),
                translation: format!("word {}", i),
                audio_url: None,
            })
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn right_index_of(session: &MatchingSession, character: &str) -> usize {
        session
            .right_deck()
            .iter()
            .position(|w| w.character == character)
            .unwrap()
    }

    fn wrong_right_index(session: &MatchingSession, left: usize) -> usize {
        let character = &session.left_deck()[left].character;
        session
            .right_deck()
            .iter()
            .position(|w| &w.character != character && !session.is_matched(&w.character))
            .unwrap()
    }

    #[test]
    fn test_build_rounds_requires_fifteen_words() {
        let err = build_rounds(&words(14), &mut rng()).unwrap_err();
        assert_eq!(err, QuizError::NotEnoughWords { required: 15, available: 14 });
    }

    #[test]
    fn test_build_rounds_uses_each_word_once() {
        let list = words(20);
        let rounds = build_rounds(&list, &mut rng()).unwrap();
        assert_eq!(rounds.len(), NUMBER_OF_ROUNDS);
        assert!(rounds.iter().all(|r| r.len() == WORDS_PER_ROUND));

        let unique: HashSet<_> = rounds.iter().flatten().map(|w| w.character.clone()).collect();
        assert_eq!(unique.len(), 15);
    }

    #[test]
    fn test_right_deck_is_same_set_as_left() {
        let session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let mut left: Vec<_> = session.left_deck().iter().map(|w| &w.character).collect();
        let mut right: Vec<_> = session.right_deck().iter().map(|w| &w.character).collect();
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn test_round_completes_after_five_correct_pairs() {
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let now = Utc::now();

        // Pick right-first for odd indices to vary click order.
        for left in 0..WORDS_PER_ROUND {
            let character = session.left_deck()[left].character.clone();
            let right = right_index_of(&session, &character);
            let result = if left % 2 == 0 {
                assert_eq!(session.select(Side::Left, left, now).unwrap(), Selection::Pending);
                session.select(Side::Right, right, now).unwrap()
            } else {
                assert_eq!(session.select(Side::Right, right, now).unwrap(), Selection::Pending);
                session.select(Side::Left, left, now).unwrap()
            };
            assert_eq!(
                result,
                Selection::Matched {
                    character,
                    round_complete: left == WORDS_PER_ROUND - 1,
                }
            );
        }

        assert!(session.is_round_complete());
        assert_eq!(session.score(), 5);
    }

    #[test]
    fn test_mismatch_locks_board_then_clears() {
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let now = Utc::now();
        let wrong = wrong_right_index(&session, 0);

        session.select(Side::Left, 0, now).unwrap();
        let result = session.select(Side::Right, wrong, now).unwrap();
        assert!(matches!(result, Selection::Mismatched { .. }));
        assert_eq!(session.view(now).incorrect, Some((0, wrong)));

        let during = now + Duration::milliseconds(MISMATCH_COOLDOWN_MS - 1);
        assert_eq!(session.select(Side::Left, 1, during).unwrap(), Selection::Ignored);

        let after = now + Duration::milliseconds(MISMATCH_COOLDOWN_MS);
        assert_eq!(session.select(Side::Left, 1, after).unwrap(), Selection::Pending);
        let view = session.view(after);
        assert_eq!(view.incorrect, None);
        assert_eq!(view.selected_left, Some(1));
        assert_eq!(view.selected_right, None);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_view_clears_expired_mismatch() {
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let now = Utc::now();
        let wrong = wrong_right_index(&session, 0);
        session.select(Side::Left, 0, now).unwrap();
        session.select(Side::Right, wrong, now).unwrap();

        let during = session.view(now + Duration::milliseconds(MISMATCH_COOLDOWN_MS - 1));
        assert_eq!(during.incorrect, Some((0, wrong)));
        assert_eq!(during.selected_left, Some(0));
        assert_eq!(during.selected_right, Some(wrong));

        let after = session.view(now + Duration::milliseconds(MISMATCH_COOLDOWN_MS));
        assert_eq!(after.incorrect, None);
        assert_eq!(after.selected_left, None);
        assert_eq!(after.selected_right, None);
    }

    #[test]
    fn test_mismatch_penalizes_both_words() {
        let store = MemoryStore::new();
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let now = Utc::now();

        let left_char = session.left_deck()[0].character.clone();
        let wrong = wrong_right_index(&session, 0);
        let right_char = session.right_deck()[wrong].character.clone();

        // Give both words some score first.
        for c in [&left_char, &right_char] {
            update_word_mastery(&store, "mali", c, Outcome::Correct, now).unwrap();
            update_word_mastery(&store, "mali", c, Outcome::Correct, now).unwrap();
        }

        session.select(Side::Left, 0, now).unwrap();
        let result = session.select(Side::Right, wrong, now).unwrap();
        for (character, outcome) in result.mastery_updates() {
            update_word_mastery(&store, "mali", character, outcome, now).unwrap();
        }

        let progress = store.load_progress("mali").unwrap();
        assert_eq!(progress[&left_char].score, 1);
        assert_eq!(progress[&right_char].score, 1);
        assert!(!session.is_round_complete());
    }

    #[test]
    fn test_matched_and_selected_cards_are_ignored() {
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let now = Utc::now();
        let character = session.left_deck()[0].character.clone();
        let right = right_index_of(&session, &character);

        assert_eq!(session.select(Side::Left, 0, now).unwrap(), Selection::Pending);
        assert_eq!(session.select(Side::Left, 0, now).unwrap(), Selection::Ignored);
        session.select(Side::Right, right, now).unwrap();

        assert_eq!(session.select(Side::Left, 0, now).unwrap(), Selection::Ignored);
        assert_eq!(session.select(Side::Right, right, now).unwrap(), Selection::Ignored);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_invalid_index_is_an_error() {
        let mut session = MatchingSession::start(&words(15), &mut rng()).unwrap();
        let err = session.select(Side::Right, 5, Utc::now()).unwrap_err();
        assert_eq!(err, QuizError::InvalidCard { index: 5 });
    }

    #[test]
    fn test_full_game_reports_final_score() {
        let mut rng = rng();
        let mut session = MatchingSession::start(&words(15), &mut rng).unwrap();
        let now = Utc::now();

        assert_eq!(session.advance(&mut rng).unwrap_err(), QuizError::RoundInProgress);

        for round in 0..NUMBER_OF_ROUNDS {
            assert_eq!(session.round(), round);
            for left in 0..WORDS_PER_ROUND {
                let character = session.left_deck()[left].character.clone();
                let right = right_index_of(&session, &character);
                session.select(Side::Left, left, now).unwrap();
                session.select(Side::Right, right, now).unwrap();
            }
            let advance = session.advance(&mut rng).unwrap();
            if round + 1 < NUMBER_OF_ROUNDS {
                assert_eq!(advance, Advance::NextRound { round: round + 1 });
                assert!(session.view(now).left.iter().all(|c| !c.matched));
            } else {
                assert_eq!(advance, Advance::GameComplete { score: 15, total: 15 });
            }
        }

        assert!(session.is_finished());
        assert_eq!(session.select(Side::Left, 0, now).unwrap_err(), QuizError::GameComplete);
    }
}
