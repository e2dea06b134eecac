use std::collections::HashSet;

use log::{debug, error};
use rand::Rng;

use super::{DecryptionAuthority, Seat};
use crate::board::{BoardView, Coordinate, EncryptedBoard, Mark};
use crate::error::{GameError, Result};

/// Result of one resolved attack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
    /// The hit sank the last segment of the defending fleet.
    Won,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttackState {
    AwaitingCoordinate,
    Resolving(Coordinate),
    Reported(Outcome),
    Won,
    Aborted,
}

/// Guards one defender's board for the whole game.
///
/// Hit or miss is read from how much the decrypted board total moved, so the
/// attacked cell itself is never opened. The protocol remembers every attacked
/// coordinate and refuses replays.
pub struct AttackProtocol {
    defender: Seat,
    state: AttackState,
    attacked: HashSet<Coordinate>,
    view: BoardView,
    initial_segments: u64,
    remaining: u64,
}

impl AttackProtocol {
    pub fn new(defender: Seat, initial_segments: u64) -> Self {
        Self {
            defender,
            state: AttackState::AwaitingCoordinate,
            attacked: HashSet::new(),
            view: BoardView::new(),
            initial_segments,
            remaining: initial_segments,
        }
    }

    pub fn state(&self) -> AttackState {
        self.state
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    /// Last decrypted board total.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_attacked(&self, at: Coordinate) -> bool {
        self.attacked.contains(&at)
    }

    /// Accepts a coordinate, moving to `Resolving`. A rejected coordinate
    /// leaves the state untouched.
    pub fn submit(&mut self, at: Coordinate) -> Result<()> {
        match self.state {
            AttackState::AwaitingCoordinate | AttackState::Reported(_) => {}
            AttackState::Won | AttackState::Aborted => return Err(GameError::SessionOver),
            AttackState::Resolving(pending) => {
                return Err(GameError::InvariantViolation(format!(
                    "attack at {pending} is still being resolved"
                )))
            }
        }
        if !self.attacked.insert(at) {
            return Err(GameError::AlreadyAttacked(at));
        }
        self.state = AttackState::Resolving(at);
        Ok(())
    }

    /// Same as [`submit`](Self::submit) for a raw `(row, col)` pair.
    pub fn submit_raw(&mut self, row: usize, col: usize) -> Result<Coordinate> {
        let at = Coordinate::new(row, col)?;
        self.submit(at)?;
        Ok(at)
    }

    /// Applies the pending attack and reports its outcome. Any failure here is
    /// fatal and leaves the protocol `Aborted`.
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        board: &mut EncryptedBoard,
        authority: &DecryptionAuthority,
        rng: &mut R,
    ) -> Result<Outcome> {
        let at = match self.state {
            AttackState::Resolving(at) => at,
            state => {
                return Err(GameError::InvariantViolation(format!(
                    "nothing to resolve in state {state:?}"
                )))
            }
        };
        match self.resolve_at(at, board, authority, rng) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("attack on {:?} board aborted: {e}", self.defender);
                self.state = AttackState::Aborted;
                Err(e)
            }
        }
    }

    /// `submit` then `resolve`.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        at: Coordinate,
        board: &mut EncryptedBoard,
        authority: &DecryptionAuthority,
        rng: &mut R,
    ) -> Result<Outcome> {
        self.submit(at)?;
        self.resolve(board, authority, rng)
    }

    fn resolve_at<R: Rng + ?Sized>(
        &mut self,
        at: Coordinate,
        board: &mut EncryptedBoard,
        authority: &DecryptionAuthority,
        rng: &mut R,
    ) -> Result<Outcome> {
        board.apply_hit(at, rng)?;
        let aggregate = board.total_remaining()?;
        let total = authority.open_aggregate(self.defender, &aggregate)?;
        let outcome = self.classify(total)?;

        self.view.mark(at, if outcome == Outcome::Miss { Mark::Miss } else { Mark::Hit });
        self.state = match outcome {
            Outcome::Won => AttackState::Won,
            outcome => AttackState::Reported(outcome),
        };
        debug!(
            "{:?} board: {at} -> {outcome:?}, {} segments left",
            self.defender, self.remaining
        );
        Ok(outcome)
    }

    fn classify(&mut self, total: i64) -> Result<Outcome> {
        if total < 0 || total as u64 > self.initial_segments {
            return Err(GameError::InvariantViolation(format!(
                "board total {total} outside 0..={}",
                self.initial_segments
            )));
        }
        let total = total as u64;
        let outcome = match self.remaining.checked_sub(total) {
            Some(0) => Outcome::Miss,
            Some(1) if total == 0 => Outcome::Won,
            Some(1) => Outcome::Hit,
            _ => {
                return Err(GameError::InvariantViolation(format!(
                    "board total moved from {} to {total}",
                    self.remaining
                )))
            }
        };
        self.remaining = total;
        Ok(outcome)
    }
}
