//! Plain-text intent scripts for driving the game without a terminal.
//!
//! One character per intent: `hjklyubn` move or attack, `.` waits, `,` picks
//! up, `>` takes the stairs, `c` shows the character sheet and `q` quits.
//! Blank lines and lines starting with `#` are skipped.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    ecs::{GamePhase, GameWorld},
    turn::{PlayerIntent, StatChoice, TurnOutcome},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntentScript {
    intents: Vec<PlayerIntent>,
    cursor: usize,
}

impl IntentScript {
    pub fn parse(source: &str) -> Self {
        let mut intents = Vec::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            for c in trimmed.chars().filter(|c| !c.is_whitespace()) {
                match char_to_intent(c) {
                    Some(intent) => intents.push(intent),
                    None => log::warn!("unknown key in script: {c:?}"),
                }
            }
        }
        Self { intents, cursor: 0 }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut source = String::new();
        for line in reader.lines() {
            source.push_str(&line?);
            source.push('\n');
        }
        Ok(Self::parse(&source))
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn next_intent(&mut self) -> Option<PlayerIntent> {
        let intent = self.intents.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(intent)
    }
}

fn char_to_intent(c: char) -> Option<PlayerIntent> {
    let step = |dx, dy| Some(PlayerIntent::MoveOrAttack { dx, dy });
    match c {
        'h' => step(-1, 0),
        'l' => step(1, 0),
        'k' => step(0, -1),
        'j' => step(0, 1),
        'y' => step(-1, -1),
        'u' => step(1, -1),
        'b' => step(-1, 1),
        'n' => step(1, 1),
        '.' => Some(PlayerIntent::Wait),
        ',' => Some(PlayerIntent::PickUp),
        '>' => Some(PlayerIntent::UseStairs),
        'c' => Some(PlayerIntent::ShowCharacterSheet),
        'q' => Some(PlayerIntent::Quit),
        _ => None,
    }
}

/// What a replay left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaySummary {
    pub intents_applied: usize,
    pub turns_taken: usize,
    pub depth: i32,
    pub player_level: i32,
    pub hp: i32,
    pub phase: GamePhase,
    pub quit: bool,
}

/// Feeds the script to the turn engine. Pending level-ups are spent on
/// constitution, and targeted items are aborted since a script has no cursor.
pub fn run_script(world: &mut GameWorld, script: &mut IntentScript) -> ReplaySummary {
    let mut intents_applied = 0;
    let mut turns_taken = 0;
    let mut quit = false;

    while let Some(intent) = script.next_intent() {
        intents_applied += 1;
        match world.apply_intent(intent) {
            TurnOutcome::TookTurn => turns_taken += 1,
            TurnOutcome::NeedsTarget(request) => {
                world.use_item_on(request, None);
            }
            TurnOutcome::Quit => {
                quit = true;
                break;
            }
            TurnOutcome::NoTurn | TurnOutcome::Descended => {}
        }
        while world.level_up_pending() {
            world.level_up(StatChoice::Constitution);
        }
    }

    let player = world.player();
    ReplaySummary {
        intents_applied,
        turns_taken,
        depth: world.depth(),
        player_level: world.player_level(),
        hp: world.fighter(player).map(|f| f.hp).unwrap_or(0),
        phase: world.phase(),
        quit,
    }
}
