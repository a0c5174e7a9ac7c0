//! Predictions and their resolution against final statistics.

use serde::Serialize;

use crate::base::{label, parse_digit_label};
use crate::error::{Error, Result};
use crate::stats::leaders;

/// What a guess is betting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    /// Highest final count.
    FinalCount,
    /// Most steps spent in the lead.
    LeadTime,
    /// Highest final count among digits that never led.
    GhostScore,
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FinalCount => write!(f, "final count"),
            Self::LeadTime => write!(f, "lead time"),
            Self::GhostScore => write!(f, "ghost score"),
        }
    }
}

impl std::str::FromStr for BetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "final_count" | "finalcount" | "count" => Ok(Self::FinalCount),
            "lead_time" | "leadtime" | "lead" => Ok(Self::LeadTime),
            "ghost_score" | "ghostscore" | "ghost" => Ok(Self::GhostScore),
            _ => Err(Error::Config(format!("unknown bet type '{s}'"))),
        }
    }
}

/// A committed prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guess {
    pub digit: u8,
    pub bet: BetType,
}

impl Guess {
    /// Validate `digit` against `base`.
    pub fn new(digit: u8, bet: BetType, base: u8) -> Result<Self> {
        if digit >= base {
            return Err(Error::InvalidDigit {
                digit: digit.to_string(),
                base,
            });
        }
        Ok(Self { digit, bet })
    }

    /// Parse a digit label such as `"A"` and validate it against `base`.
    pub fn from_label(text: &str, bet: BetType, base: u8) -> Result<Self> {
        let digit = parse_digit_label(text, base)?;
        Ok(Self { digit, bet })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// A digit in the winner set with the value that put it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Winner {
    pub digit: u8,
    pub label: char,
    pub value: u64,
}

/// Resolution of a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub guess: Guess,
    pub outcome: Outcome,
    /// Every digit tied for the win under the guess's bet type.
    pub winners: Vec<Winner>,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.outcome == Outcome::Correct
    }

    /// Feedback line for the player.
    pub fn message(&self) -> String {
        let guessed = label(self.guess.digit);
        let winners = if self.winners.is_empty() {
            "no digit qualified".to_string()
        } else {
            self.winners
                .iter()
                .map(|w| format!("{} ({})", w.label, w.value))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self.outcome {
            Outcome::Correct => {
                format!("Correct! {guessed} won on {}: {winners}", self.guess.bet)
            }
            Outcome::Incorrect => {
                format!("Incorrect: {guessed} did not win on {}. Winners: {winners}", self.guess.bet)
            }
        }
    }
}

/// Score per digit under `bet`.
fn scores(bet: BetType, counts: &[u64], lead_time: &[u64]) -> Vec<u64> {
    match bet {
        BetType::FinalCount => counts.to_vec(),
        BetType::LeadTime => lead_time.to_vec(),
        BetType::GhostScore => counts
            .iter()
            .enumerate()
            .map(|(d, &c)| {
                if lead_time.get(d).copied().unwrap_or(0) == 0 {
                    c
                } else {
                    0
                }
            })
            .collect(),
    }
}

/// Resolve `guess` against final counts and lead time.
///
/// The winner set includes every tie. A zero maximum yields an empty winner
/// set, so nobody wins a ghost bet when every digit led at some point.
pub fn resolve_guess(guess: Guess, counts: &[u64], lead_time: &[u64]) -> Verdict {
    let scores = scores(guess.bet, counts, lead_time);
    let winners: Vec<Winner> = leaders(&scores)
        .into_iter()
        .map(|d| Winner {
            digit: d as u8,
            label: label(d as u8),
            value: scores[d],
        })
        .collect();
    let outcome = if winners.iter().any(|w| w.digit == guess.digit) {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    };
    Verdict {
        guess,
        outcome,
        winners,
    }
}
