//! The fixed campaign opponent ladder.

use serde::Serialize;

use arcanum_core::error::{DomainError, ValidationError};

/// A scripted campaign opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Opponent {
    /// Position on the ladder, starting at 1.
    pub number: u32,
    /// Display name.
    pub name: &'static str,
    /// Honorific shown in the roster.
    pub title: &'static str,
    /// Flavor fed to the narrator.
    pub temperament: &'static str,
    /// Rough difficulty tier, 1 (weakest) to 5.
    pub difficulty: u32,
    /// Flat luck adjustment applied to this opponent's draws.
    pub luck_bias: i32,
    /// Action pool the scripted side draws from each round.
    pub script: &'static [&'static str],
}

/// The opponent ladder, fought strictly in order.
pub const OPPONENTS: [Opponent; 7] = [
    Opponent {
        number: 1,
        name: "Vexil",
        title: "the Grey",
        temperament: "a cautious hedge-mage who favors smoke and misdirection",
        difficulty: 1,
        luck_bias: -1,
        script: &[
            "exhales a coil of grey smoke that swallows the torchlight",
            "flicks three decoy images of himself across the arena",
            "hurls a fistful of stinging ash",
        ],
    },
    Opponent {
        number: 2,
        name: "Serapha",
        title: "Dawncaller",
        temperament: "a radiant zealot who opens every bout with blinding light",
        difficulty: 1,
        luck_bias: 0,
        script: &[
            "calls down a lance of dawn-light",
            "raises a shimmering sun-ward",
            "scatters burning motes that chase the foe",
        ],
    },
    Opponent {
        number: 3,
        name: "Mordekai",
        title: "the Rootbound",
        temperament: "a patient druid who turns the arena floor itself against you",
        difficulty: 2,
        luck_bias: 0,
        script: &[
            "commands roots to burst from the flagstones and grasp",
            "hardens his skin to bark",
            "flings a swarm of thorned seeds",
        ],
    },
    Opponent {
        number: 4,
        name: "Ilyra",
        title: "Stormbinder",
        temperament: "a volatile tempest-mage who trades defense for fury",
        difficulty: 3,
        luck_bias: 1,
        script: &[
            "drags a thunderhead down into the arena",
            "rides a gale over the foe's guard",
            "splits the sky with a forked bolt",
        ],
    },
    Opponent {
        number: 5,
        name: "Okkan",
        title: "of the Hollow Flame",
        temperament: "a burned-out pyromancer whose fire casts no light",
        difficulty: 3,
        luck_bias: 0,
        script: &[
            "smothers the arena in lightless flame",
            "draws the heat from the foe's blood",
            "ignites a ring of cold fire",
        ],
    },
    Opponent {
        number: 6,
        name: "Nerissa",
        title: "the Tidemother",
        temperament: "an unhurried abyssal caller with crushing patience",
        difficulty: 4,
        luck_bias: 1,
        script: &[
            "floods the arena ankle-deep in black brine",
            "crushes the air with abyssal pressure",
            "summons a drowning wave",
        ],
    },
    Opponent {
        number: 7,
        name: "Archmagus Threll",
        title: "Keeper of the Relic",
        temperament: "the undefeated master of the ladder, wielding every school at once",
        difficulty: 5,
        luck_bias: 2,
        script: &[
            "weaves counterspell and curse in a single gesture",
            "unmakes the foe's spell mid-flight",
            "bends the arena's wards into a cage",
            "strikes with the relic's borrowed fortune",
        ],
    },
];

/// Number of the final opponent; defeating them completes the campaign
/// and awards the relic.
pub const FINAL_OPPONENT: u32 = 7;

/// Looks up an opponent by ladder number.
///
/// # Errors
///
/// Returns `UnknownOpponent` for numbers outside the ladder; never a
/// silent default.
pub fn opponent(number: u32) -> Result<&'static Opponent, DomainError> {
    OPPONENTS
        .iter()
        .find(|o| o.number == number)
        .ok_or_else(|| ValidationError::UnknownOpponent(number).into())
}
