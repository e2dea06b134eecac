use std::collections::VecDeque;
use std::io::{BufRead, StdinLock, Stdout, Write};

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use crate::board::{BoardView, Coordinate, Mark};
use crate::error::{GameError, Result};

/// How a side picks its next target. Sees only the opponent-visible view.
pub trait Player {
    fn choose_attack(&mut self, view: &BoardView) -> Result<Coordinate>;

    /// Called when the session refused the last choice; the same player is
    /// asked again right after.
    fn attack_rejected(&mut self, _at: Coordinate, _err: &GameError) {}
}

/// Reads `A5`-style coordinates from a text stream.
pub struct InteractivePlayer<R, W> {
    input: R,
    output: W,
    /// write failure from `attack_rejected`, surfaced by the next prompt
    failed: Option<std::io::Error>,
}

impl<R: BufRead, W: Write> InteractivePlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            failed: None,
        }
    }
}

impl InteractivePlayer<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Player for InteractivePlayer<R, W> {
    fn choose_attack(&mut self, _view: &BoardView) -> Result<Coordinate> {
        if let Some(e) = self.failed.take() {
            return Err(e.into());
        }
        loop {
            write!(self.output, "Enter coordinates (e.g., A5): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(GameError::InputClosed);
            }
            if line.trim().is_empty() {
                continue;
            }
            match line.parse() {
                Ok(at) => return Ok(at),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    fn attack_rejected(&mut self, _at: Coordinate, err: &GameError) {
        if let Err(e) = writeln!(self.output, "{err}, choose again") {
            self.failed = Some(e);
        }
    }
}

/// Plays a fixed opening, then picks uniformly among cells it has not tried.
pub struct ScriptedOpponent {
    rng: ChaCha20Rng,
    script: VecDeque<Coordinate>,
}

impl ScriptedOpponent {
    pub fn new(rng: ChaCha20Rng) -> Self {
        Self {
            rng,
            script: VecDeque::new(),
        }
    }

    pub fn with_script<I: IntoIterator<Item = Coordinate>>(mut self, script: I) -> Self {
        self.script.extend(script);
        self
    }
}

impl Player for ScriptedOpponent {
    fn choose_attack(&mut self, view: &BoardView) -> Result<Coordinate> {
        while let Some(at) = self.script.pop_front() {
            if view.get(at) == Mark::Unknown {
                return Ok(at);
            }
        }
        let untried: Vec<Coordinate> = view.unknown_cells().collect();
        untried
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| GameError::InvariantViolation("no untried cell left".into()))
    }
}
