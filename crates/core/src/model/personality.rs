use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PersonalityError {
    #[error("personality quiz already answered")]
    AlreadyComplete,

    #[error("choice {choice} is out of range for question {question}")]
    InvalidChoice { question: usize, choice: usize },

    #[error("personality quiz is not finished yet")]
    Incomplete,
}

/// Table persona a player is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonalityType {
    Shark,
    Gambler,
    Rock,
    #[serde(rename = "Chat Pro")]
    ChatPro,
    Wizard,
    Wildcard,
}

impl PersonalityType {
    pub const ALL: [PersonalityType; 6] = [
        PersonalityType::Shark,
        PersonalityType::Gambler,
        PersonalityType::Rock,
        PersonalityType::ChatPro,
        PersonalityType::Wizard,
        PersonalityType::Wildcard,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PersonalityType::Shark => "Shark",
            PersonalityType::Gambler => "Gambler",
            PersonalityType::Rock => "Rock",
            PersonalityType::ChatPro => "Chat Pro",
            PersonalityType::Wizard => "Wizard",
            PersonalityType::Wildcard => "Wildcard",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            PersonalityType::Shark => {
                "Calculated, patient, ruthless. You set traps instead of chasing hands, and when you strike there's no mercy."
            }
            PersonalityType::Gambler => {
                "Risk is your love language. You're here to dominate or detonate: glorious wins, spectacular losses."
            }
            PersonalityType::Rock => {
                "Tight, disciplined, unreadable. You only get involved when the math is on your side."
            }
            PersonalityType::ChatPro => {
                "Table talk is your weapon. Loud and lovable, and a lot sharper than you let on."
            }
            PersonalityType::Wizard => {
                "Three moves ahead. Reads, timing and patterns come naturally; you're solving the game, not playing it."
            }
            PersonalityType::Wildcard => {
                "Nobody knows what you'll do next, including you. Pure chaos energy that somehow wins pots."
            }
        }
    }

    fn slot(self) -> usize {
        match self {
            PersonalityType::Shark => 0,
            PersonalityType::Gambler => 1,
            PersonalityType::Rock => 2,
            PersonalityType::ChatPro => 3,
            PersonalityType::Wizard => 4,
            PersonalityType::Wildcard => 5,
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalityAnswer {
    pub text: &'static str,
    pub personality: PersonalityType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonalityQuestion {
    pub id: u32,
    pub prompt: &'static str,
    pub answers: [PersonalityAnswer; 4],
}

const fn answer(text: &'static str, personality: PersonalityType) -> PersonalityAnswer {
    PersonalityAnswer { text, personality }
}

use PersonalityType::{ChatPro, Gambler, Rock, Shark, Wildcard, Wizard};

pub const PERSONALITY_QUESTIONS: [PersonalityQuestion; 7] = [
    PersonalityQuestion {
        id: 1,
        prompt: "You sit at a fresh table. What's your first move?",
        answers: [
            answer("Raise instantly. I want them uncomfortable.", Shark),
            answer("Fold and observe. I'm reading everyone like a book.", Rock),
            answer("Crack a joke and feel the vibe.", ChatPro),
            answer("Limp in with 7-2 offsuit just to stir the pot.", Wildcard),
        ],
    },
    PersonalityQuestion {
        id: 2,
        prompt: "You get caught bluffing hard on the river. What now?",
        answers: [
            answer("Laugh and fire again next hand.", Gambler),
            answer("Stay silent and mentally log every reaction.", Rock),
            answer("Raise an eyebrow, smirk, and change gears.", Wizard),
            answer("Flip your cards dramatically and wink.", Wildcard),
        ],
    },
    PersonalityQuestion {
        id: 3,
        prompt: "You get dealt pocket Aces. What's the plan?",
        answers: [
            answer("Slow play it. Trap someone and stack 'em.", Shark),
            answer("Min-raise. No reason to scare them off yet.", Wizard),
            answer("Slam a huge raise. You want action, now.", Gambler),
            answer("Make eye contact, smile, and say \"Let's play.\"", ChatPro),
        ],
    },
    PersonalityQuestion {
        id: 4,
        prompt: "You just lost a big hand. How do you bounce back?",
        answers: [
            answer("Go wild and flip the script. Nothing to lose now.", Wildcard),
            answer("Regain control and adjust. Poker's long-term.", Shark),
            answer("Ramp up pressure and make them fold next time.", Gambler),
            answer("Tighten up and play pure value.", Rock),
        ],
    },
    PersonalityQuestion {
        id: 5,
        prompt: "A player across from you won't stop talking. What do you do?",
        answers: [
            answer("Say something subtle that throws them off.", Wizard),
            answer("Fire back with something funnier.", ChatPro),
            answer("Stay quiet. Let them dig their own grave.", Rock),
            answer("Join the madness and make it worse.", Wildcard),
        ],
    },
    PersonalityQuestion {
        id: 6,
        prompt: "You pull off a huge bluff and the whole table is staring at you. What do you do?",
        answers: [
            answer("Stay ice cold. No reaction. Let them wonder.", Shark),
            answer("Laugh and say \"Had it the whole way.\"", ChatPro),
            answer("Fire again. Momentum is everything.", Gambler),
            answer("Make a weird face and ask, \"Wanna see?\"", Wildcard),
        ],
    },
    PersonalityQuestion {
        id: 7,
        prompt: "Big money on the line. You're on the river. Gut says go.",
        answers: [
            answer("Trust the read and fold. Survival matters.", Rock),
            answer("Make the play. Instinct never lies.", Wizard),
            answer("Go for the kill. No fear.", Shark),
            answer("YOLO shove. Life's too short.", Gambler),
        ],
    },
];

/// Histogram of chosen personas and every persona sharing the top count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalityResult {
    counts: [u32; 6],
    top: Vec<PersonalityType>,
}

impl PersonalityResult {
    #[must_use]
    pub fn from_choices(choices: &[PersonalityType]) -> Self {
        let mut counts = [0_u32; 6];
        for choice in choices {
            counts[choice.slot()] += 1;
        }
        let max = counts.iter().copied().max().unwrap_or(0);
        let top = PersonalityType::ALL
            .into_iter()
            .filter(|p| counts[p.slot()] == max)
            .collect();
        Self { counts, top }
    }

    #[must_use]
    pub fn count(&self, personality: PersonalityType) -> u32 {
        self.counts[personality.slot()]
    }

    /// Ties keep declaration order.
    #[must_use]
    pub fn top(&self) -> &[PersonalityType] {
        &self.top
    }
}

/// Walks the player through `PERSONALITY_QUESTIONS`, one choice per question.
#[derive(Debug, Clone, Default)]
pub struct PersonalitySession {
    choices: Vec<PersonalityType>,
}

impl PersonalitySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&'static PersonalityQuestion> {
        PERSONALITY_QUESTIONS.get(self.choices.len())
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.choices.len() >= PERSONALITY_QUESTIONS.len()
    }

    /// Records the answer at `choice` for the current question.
    ///
    /// # Errors
    ///
    /// Returns `PersonalityError::AlreadyComplete` after the last question and
    /// `PersonalityError::InvalidChoice` for an out-of-range index.
    pub fn choose(&mut self, choice: usize) -> Result<PersonalityType, PersonalityError> {
        let question = self
            .current_question()
            .ok_or(PersonalityError::AlreadyComplete)?;
        let picked = question
            .answers
            .get(choice)
            .ok_or(PersonalityError::InvalidChoice {
                question: self.choices.len(),
                choice,
            })?
            .personality;
        self.choices.push(picked);
        Ok(picked)
    }

    /// # Errors
    ///
    /// Returns `PersonalityError::Incomplete` until every question is answered.
    pub fn result(&self) -> Result<PersonalityResult, PersonalityError> {
        if !self.is_complete() {
            return Err(PersonalityError::Incomplete);
        }
        Ok(PersonalityResult::from_choices(&self.choices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_question_offers_four_answers() {
        for question in &PERSONALITY_QUESTIONS {
            assert_eq!(question.answers.len(), 4);
        }
    }

    #[test]
    fn argmax_keeps_ties() {
        let result = PersonalityResult::from_choices(&[Shark, Rock, Shark, Rock, Wizard]);
        assert_eq!(result.top(), &[Shark, Rock]);
        assert_eq!(result.count(Wizard), 1);
        assert_eq!(result.count(Gambler), 0);
    }

    #[test]
    fn session_scores_after_last_question() {
        let mut session = PersonalitySession::new();
        assert_eq!(session.result(), Err(PersonalityError::Incomplete));

        for _ in 0..PERSONALITY_QUESTIONS.len() {
            session.choose(0).unwrap();
        }

        assert!(session.is_complete());
        assert_eq!(session.choose(0), Err(PersonalityError::AlreadyComplete));
        let result = session.result().unwrap();
        // First answers: Shark, Gambler, Shark, Wildcard, Wizard, Shark, Rock.
        assert_eq!(result.top(), &[Shark]);
        assert_eq!(result.count(Shark), 3);
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let mut session = PersonalitySession::new();
        let err = session.choose(4).unwrap_err();
        assert_eq!(err, PersonalityError::InvalidChoice { question: 0, choice: 4 });
        assert_eq!(session.answered(), 0);
    }

    #[test]
    fn names_match_display() {
        assert_eq!(ChatPro.to_string(), "Chat Pro");
    }
}
