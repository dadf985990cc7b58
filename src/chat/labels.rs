//! Button labels. These strings are the state machine's input alphabet: the
//! keyboard offered by one turn is matched verbatim against the text of the
//! next.

use crate::chat::event::Keyboard;
use crate::sm::Algorithm;

pub const ADD_CARD: &str = "➕ New Card";
pub const ADD_DECK: &str = "➕ New Deck";
pub const BACK: &str = "🔙";
pub const CHANGE_LOCATION: &str = "🌍 Set location";
pub const CHANGE_REHEARSAL_TIME: &str = "🕙 Set rehearsal time";
pub const CONFIRM_DELETE_DECK: &str = "🔥 Yes";
pub const DELETE_CARD: &str = "🗑 Delete";
pub const DELETE_DECK: &str = "🗑 Delete";
pub const DISABLE_SCHEDULING: &str = "🙅 Disable rehearsal";
pub const DONT_DELETE_DECK: &str = "⛔️ No";
pub const EDIT_CARD: &str = "📝 Edit Card";
pub const EDIT_CARD_BACK: &str = "✏️ Edit Back";
pub const EDIT_CARD_FRONT: &str = "✏️ Edit Front";
pub const EDIT_DECK: &str = "✏️ Edit Deck";
pub const EDIT_NAME: &str = "✏️ Edit Name";
pub const EDIT_SETTINGS: &str = "🔧 Settings";
pub const ENABLE_SCHEDULING: &str = "💁 Enable rehearsal";
pub const HELP: &str = "🤔 Help";
pub const SAVE: &str = "💾";
pub const SHOW_BACK: &str = "🔄 Show back";

/// Difficulty labels for the four-level review keyboard.
const DIFFICULTY_4: [&str; 4] = ["😮 No idea", "😣 Wrong", "🙂 Recalled", "☺️ Easy"];

/// Difficulty labels for the strict six-level variant.
const DIFFICULTY_6: [&str; 6] = [
    "😮 No idea",
    "😣 Wrong",
    "😕 Almost",
    "🤔 Hard",
    "🙂 Recalled",
    "☺️ Easy",
];

pub fn quality_labels(algorithm: &Algorithm) -> &'static [&'static str] {
    if algorithm.quality_levels() == 6 {
        &DIFFICULTY_6
    } else {
        &DIFFICULTY_4
    }
}

/// Maps a button press back to its quality score. The keyboard contract:
/// every quality the algorithm accepts has exactly one label, so review
/// handlers never pass an out-of-range quality to the algorithm.
pub fn quality_from_label(algorithm: &Algorithm, text: &str) -> Option<i32> {
    quality_labels(algorithm)
        .iter()
        .position(|label| *label == text)
        .map(|index| index as i32)
}

/// The review keyboard: difficulty labels two per row, worst first.
pub fn review_keyboard(algorithm: &Algorithm) -> Keyboard {
    Keyboard::rows(quality_labels(algorithm).chunks(2).map(|row| row.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm::{SM2, SM2_MOD};

    #[test]
    fn test_every_quality_has_a_label() {
        for algorithm in [&SM2_MOD, &SM2] {
            let labels = quality_labels(algorithm);
            assert_eq!(labels.len() as i32, algorithm.quality_levels());
            for (index, label) in labels.iter().enumerate() {
                assert_eq!(quality_from_label(algorithm, label), Some(index as i32));
            }
        }
    }

    #[test]
    fn test_unknown_label_maps_to_none() {
        assert_eq!(quality_from_label(&SM2_MOD, "whatever"), None);
        assert_eq!(quality_from_label(&SM2_MOD, ""), None);
    }

    #[test]
    fn test_review_keyboard_is_two_per_row() {
        let keyboard = review_keyboard(&SM2_MOD);
        assert_eq!(keyboard.0.len(), 2);
        assert_eq!(review_keyboard(&SM2).0.len(), 3);
    }
}
