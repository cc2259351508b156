use std::time::Duration;

use crate::model::{Position, Question};

/// An opponent's seat and what they did before the hero acts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatView {
    pub seat: Position,
    pub action: String,
}

/// Six-handed table as drawn around the hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub hero: Position,
    pub hole_cards: Vec<String>,
    pub community_cards: Vec<String>,
    /// Occupied opponent seats in clockwise order from the button.
    pub opponents: Vec<SeatView>,
}

impl TableView {
    /// Lay out a question with the hero seat taken from its prompt.
    #[must_use]
    pub fn for_question(question: &Question) -> Self {
        Self::build(question, question.hero_position())
    }

    /// Seat each opponent action. Unknown labels and the hero's own seat are
    /// dropped; a later action for the same seat replaces an earlier one.
    #[must_use]
    pub fn build(question: &Question, hero: Position) -> Self {
        let mut seats: [Option<String>; 6] = Default::default();
        for action in question.opponent_actions() {
            let Ok(seat) = action.seat_label.parse::<Position>() else {
                tracing::debug!(question = %question.id(), seat = %action.seat_label, "unknown seat label");
                continue;
            };
            if seat == hero {
                continue;
            }
            seats[seat.seat_index()] = Some(action.action_text.clone());
        }

        let opponents = Position::ALL
            .into_iter()
            .filter_map(|seat| {
                seats[seat.seat_index()]
                    .take()
                    .map(|action| SeatView { seat, action })
            })
            .collect();

        let (hole_cards, community_cards) = question
            .cards()
            .map(|cards| (cards.player_cards.clone(), cards.community()))
            .unwrap_or_default();

        Self {
            hero,
            hole_cards,
            community_cards,
            opponents,
        }
    }

    /// Opponents revealed after `elapsed`: the i-th appears at `interval * i`.
    #[must_use]
    pub fn visible_opponents(&self, elapsed: Duration, interval: Duration) -> &[SeatView] {
        let interval = interval.as_millis().max(1);
        let shown = elapsed.as_millis() / interval + 1;
        let shown = usize::try_from(shown).unwrap_or(usize::MAX);
        &self.opponents[..shown.min(self.opponents.len())]
    }
}
