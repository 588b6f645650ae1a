//! Trainer voices and the lines they say at each cue.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cues::CueId;

/// Which trainer's voice and artwork to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trainer {
    #[default]
    #[serde(rename = "1")]
    Alan,
    #[serde(rename = "2")]
    Lina,
}

impl Trainer {
    /// Settings-store identifier, also the suffix of every audio asset.
    pub fn id(self) -> &'static str {
        match self {
            Trainer::Alan => "1",
            Trainer::Lina => "2",
        }
    }

    /// Image shown in the progress ring while a milestone window is open.
    pub fn portrait(self) -> &'static str {
        match self {
            Trainer::Alan => "trainer-alan.png",
            Trainer::Lina => "trainer-lina.png",
        }
    }
}

impl fmt::Display for Trainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Trainer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Trainer::Alan),
            "2" => Ok(Trainer::Lina),
            other => Err(format!("unknown trainer '{other}', expected \"1\" or \"2\"")),
        }
    }
}

/// A spoken line: text for the speech bubble, audio asset for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub audio: String,
}

impl Quote {
    fn new(text: &str, audio_stem: &str, trainer: Trainer) -> Self {
        Self {
            text: text.to_string(),
            audio: format!("{audio_stem}_{}.mp3", trainer.id()),
        }
    }
}

const FINAL_QUOTES: [&str; 10] = [
    "Great job, you crushed it today!",
    "That was an awesome workout, well done!",
    "You pushed yourself hard, I'm proud of you!",
    "Excellent work, you gave it your all!",
    "You really showed up and put in the effort!",
    "You're getting stronger every day, keep it up!",
    "Fantastic session, your dedication is paying off!",
    "You should feel really proud of what you accomplished!",
    "You've earned that rest, great work today!",
    "Another workout in the books, amazing job!",
];

/// The fixed line for a milestone cue.
///
/// `None` for [`CueId::Complete`]: the completion line is random, see
/// [`completion_quote`].
pub fn milestone_quote(cue: CueId, trainer: Trainer) -> Option<Quote> {
    let quote = match cue {
        CueId::Start => Quote::new("Give me everything you got!", "give_me_everything", trainer),
        CueId::Quarter => Quote::new("Great job! Keep pushing!", "great_job_keep_pushing", trainer),
        CueId::Half => Quote::new(
            "Halfway through, this is where the real progress happens!!",
            "halfway_through",
            trainer,
        ),
        CueId::ThreeQuarter => Quote::new(
            "Almost done! Your future self will thank you later",
            "almost_done",
            trainer,
        ),
        CueId::Complete => return None,
    };
    Some(quote)
}

/// Pick a completion line uniformly at random.
pub fn completion_quote<R: Rng + ?Sized>(trainer: Trainer, rng: &mut R) -> Quote {
    let text = FINAL_QUOTES.choose(rng).copied().unwrap_or(FINAL_QUOTES[0]);
    Quote::new(text, "great_job", trainer)
}

/// Every completion line, in a fixed order.
pub fn completion_lines() -> &'static [&'static str] {
    &FINAL_QUOTES
}
