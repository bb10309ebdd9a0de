//! Shared keyboard state
//!
//! Folds every evaluated guess of a round into one best-known status per letter.
//! The fold takes the maximum status per letter, so it is monotone and the final
//! state does not depend on the order guesses were applied in.

use super::{Evaluation, LetterStatus};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

const ALPHABET_LEN: usize = 26;

/// Best status per distinct letter of a single guess
///
/// A letter that appears several times in the guess keeps the highest status among
/// its positions. Letters are kept in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterUpdates {
    entries: Vec<(u8, LetterStatus)>,
}

impl LetterUpdates {
    /// Reduce an evaluation to one status per letter
    #[must_use]
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        let mut index: FxHashMap<u8, usize> = FxHashMap::default();
        let mut entries: Vec<(u8, LetterStatus)> = Vec::with_capacity(evaluation.statuses().len());

        for (letter, status) in evaluation.iter() {
            match index.get(&letter) {
                Some(&i) => {
                    if status > entries[i].1 {
                        entries[i].1 = status;
                    }
                }
                None => {
                    index.insert(letter, entries.len());
                    entries.push((letter, status));
                }
            }
        }

        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, LetterStatus)> + '_ {
        self.entries.iter().copied()
    }
}

/// A letter whose keyboard status improved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterChange {
    pub letter: u8,
    pub from: LetterStatus,
    pub to: LetterStatus,
}

/// Best-known status for every letter `a..=z` in the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardState {
    letters: [LetterStatus; ALPHABET_LEN],
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardState {
    /// A keyboard with every letter `Unset`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            letters: [LetterStatus::Unset; ALPHABET_LEN],
        }
    }

    fn slot(letter: u8) -> Option<usize> {
        let letter = letter.to_ascii_lowercase();
        letter
            .is_ascii_lowercase()
            .then(|| usize::from(letter - b'a'))
    }

    /// Status of `letter`; anything outside `a..=z` is `Unset`
    #[must_use]
    pub fn status(&self, letter: u8) -> LetterStatus {
        Self::slot(letter).map_or(LetterStatus::Unset, |i| self.letters[i])
    }

    /// Fold one guess into the keyboard, returning the new state
    ///
    /// # Examples
    /// ```
    /// use twitch_wordle::core::{evaluate, KeyboardState, LetterStatus, LetterUpdates, Word};
    ///
    /// let answer = Word::new("crane").unwrap();
    /// let evaluation = evaluate(&answer, &Word::new("react").unwrap()).unwrap();
    ///
    /// let keyboard = KeyboardState::new().fold(&LetterUpdates::from_evaluation(&evaluation));
    /// assert_eq!(keyboard.status(b'a'), LetterStatus::InCorrectPlace);
    /// assert_eq!(keyboard.status(b't'), LetterStatus::NotInWord);
    /// assert_eq!(keyboard.status(b'z'), LetterStatus::Unset);
    /// ```
    #[must_use]
    pub fn fold(mut self, updates: &LetterUpdates) -> Self {
        self.apply(updates);
        self
    }

    /// Fold one guess in place and report the letters that improved
    pub fn apply(&mut self, updates: &LetterUpdates) -> Vec<LetterChange> {
        let mut changes = Vec::new();
        for (letter, candidate) in updates.iter() {
            let Some(i) = Self::slot(letter) else {
                continue;
            };
            let current = self.letters[i];
            if candidate > current {
                self.letters[i] = candidate;
                changes.push(LetterChange {
                    letter: letter.to_ascii_lowercase(),
                    from: current,
                    to: candidate,
                });
            }
        }
        changes
    }

    /// Pointwise maximum of two keyboards
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.letters.iter_mut().zip(other.letters) {
            *mine = (*mine).max(theirs);
        }
        self
    }

    /// Build a keyboard from a batch of evaluations in parallel
    ///
    /// Relies on the fold being commutative: each guess is folded into its own
    /// keyboard and the partial keyboards are merged.
    #[must_use]
    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        evaluations
            .par_iter()
            .map(|evaluation| Self::new().fold(&LetterUpdates::from_evaluation(evaluation)))
            .reduce(Self::new, Self::merge)
    }

    /// (letter, status) for `a..=z`
    pub fn iter(&self) -> impl Iterator<Item = (u8, LetterStatus)> + '_ {
        (b'a'..=b'z').zip(self.letters.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Word, evaluate};
    use LetterStatus::*;

    fn updates(answer: &str, guess: &str) -> LetterUpdates {
        let evaluation =
            evaluate(&Word::new(answer).unwrap(), &Word::new(guess).unwrap()).unwrap();
        LetterUpdates::from_evaluation(&evaluation)
    }

    #[test]
    fn repeated_letter_keeps_best_status() {
        // FLOOR vs ROBOT: first O is yellow, second O is green
        let u = updates("floor", "robot");
        let entries: Vec<(u8, LetterStatus)> = u.iter().collect();
        assert_eq!(
            entries,
            vec![
                (b'r', InWrongPlace),
                (b'o', InCorrectPlace),
                (b'b', NotInWord),
                (b't', NotInWord)
            ]
        );
    }

    #[test]
    fn updates_keep_first_appearance_order() {
        let u = updates("floor", "robot");
        let letters: Vec<u8> = u.iter().map(|(l, _)| l).collect();
        assert_eq!(letters, b"robt".to_vec());
    }

    #[test]
    fn fold_never_regresses() {
        let keyboard = KeyboardState::new()
            .fold(&updates("crane", "crane"))
            .fold(&updates("crane", "nacre"));

        for letter in b"crane" {
            assert_eq!(keyboard.status(*letter), InCorrectPlace);
        }
    }

    #[test]
    fn fold_is_monotone() {
        let guesses = ["react", "stone", "nacre", "crane", "zzzzz"];
        let mut keyboard = KeyboardState::new();
        for guess in guesses {
            let next = keyboard.fold(&updates("crane", guess));
            for (letter, status) in keyboard.iter() {
                assert!(next.status(letter) >= status, "{} regressed", letter as char);
            }
            keyboard = next;
        }
    }

    #[test]
    fn fold_order_does_not_matter() {
        let g1 = updates("crane", "react");
        let g2 = updates("crane", "stone");

        let forward = KeyboardState::new().fold(&g1).fold(&g2);
        let backward = KeyboardState::new().fold(&g2).fold(&g1);
        assert_eq!(forward, backward);
    }

    #[test]
    fn apply_reports_only_improvements() {
        let mut keyboard = KeyboardState::new();
        let first = keyboard.apply(&updates("crane", "react"));
        assert_eq!(first.len(), 5);
        assert_eq!(
            first[0],
            LetterChange {
                letter: b'r',
                from: Unset,
                to: InWrongPlace
            }
        );

        // Same guess again: nothing new is learned
        assert!(keyboard.apply(&updates("crane", "react")).is_empty());

        // R moves to the correct place, T stays absent
        let third = keyboard.apply(&updates("crane", "trace"));
        assert!(third.contains(&LetterChange {
            letter: b'r',
            from: InWrongPlace,
            to: InCorrectPlace
        }));
        assert!(third.iter().all(|c| c.letter != b't'));
    }

    #[test]
    fn parallel_build_matches_sequential_fold() {
        let answer = Word::new("crane").unwrap();
        let evaluations: Vec<Evaluation> = ["react", "stone", "nacre", "plumb", "crane"]
            .iter()
            .map(|g| evaluate(&answer, &Word::new(*g).unwrap()).unwrap())
            .collect();

        let sequential = evaluations.iter().fold(KeyboardState::new(), |k, e| {
            k.fold(&LetterUpdates::from_evaluation(e))
        });
        assert_eq!(KeyboardState::from_evaluations(&evaluations), sequential);
    }

    #[test]
    fn non_letters_are_unset() {
        let keyboard = KeyboardState::new();
        assert_eq!(keyboard.status(b'1'), Unset);
        assert_eq!(keyboard.iter().count(), 26);
    }
}
