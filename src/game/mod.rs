//! Turn orchestration over two encrypted boards.

mod authority;
mod player;
mod protocol;
mod session;

pub use authority::DecryptionAuthority;
pub use player::{InteractivePlayer, Player, ScriptedOpponent};
pub use protocol::{AttackProtocol, AttackState, Outcome};
pub use session::{AttackReport, Contender, GameSession, SessionStatus};

/// One of the two sides of a session. `First` attacks on odd turns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn opponent(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}
