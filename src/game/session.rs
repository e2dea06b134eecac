use log::{debug, error, info, warn};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use super::{AttackProtocol, DecryptionAuthority, Outcome, Player, Seat};
use crate::board::{BoardView, Coordinate, EncryptedBoard, PlainGrid};
use crate::config::GameConfig;
use crate::error::{GameError, Result};

/// Consecutive refused choices tolerated from one player in a single turn.
const MAX_REJECTED_ATTEMPTS: usize = 1000;

/// A side as handed to [`GameSession::new`]: its fleet in the clear, which is
/// encrypted and dropped during setup.
pub struct Contender {
    name: String,
    fleet: PlainGrid,
    player: Box<dyn Player>,
}

impl Contender {
    pub fn new(name: impl Into<String>, fleet: PlainGrid, player: Box<dyn Player>) -> Self {
        Self {
            name: name.into(),
            fleet,
            player,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Won(Seat),
    /// A fatal error left the game state untrustworthy.
    Aborted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackReport {
    pub turn: u32,
    pub attacker: Seat,
    pub coordinate: Coordinate,
    pub outcome: Outcome,
    /// Intact segments left on the defender's board
    pub remaining: u64,
}

struct Side {
    name: String,
    board: EncryptedBoard,
    /// guards attacks against this side's board
    guard: AttackProtocol,
    player: Box<dyn Player>,
}

impl Side {
    fn setup<R: Rng + ?Sized>(
        seat: Seat,
        contender: Contender,
        authority: &DecryptionAuthority,
        rng: &mut R,
    ) -> Result<Self> {
        let Contender {
            name,
            fleet,
            player,
        } = contender;
        let segments = fleet.segment_count();
        if segments == 0 {
            return Err(GameError::InvalidFleet(format!("{name} has no ships")));
        }

        let board = EncryptedBoard::new(&fleet, authority.public_key(seat).clone(), rng);
        let total = authority.open_aggregate(seat, &board.total_remaining()?)?;
        if total != segments as i64 {
            return Err(GameError::InvariantViolation(format!(
                "{name}'s encrypted board totals {total}, expected {segments}"
            )));
        }
        info!("{name}'s board encrypted ({segments} segments)");

        Ok(Self {
            name,
            board,
            guard: AttackProtocol::new(seat, segments),
            player,
        })
    }
}

/// Two sides taking strictly alternating shots at each other's encrypted
/// boards. The session owns its RNG and the decryption authority for its
/// whole lifetime.
pub struct GameSession {
    authority: DecryptionAuthority,
    sides: [Side; 2],
    rng: ChaCha20Rng,
    turn: u32,
    status: SessionStatus,
}

impl GameSession {
    /// Reads only `key_bits` and `seed`; `config.fleet` is for whoever
    /// builds the contenders' grids.
    pub fn new(config: &GameConfig, first: Contender, second: Contender) -> Result<Self> {
        let rng = config.rng()?;
        Self::with_rng(config.key_bits, first, second, rng)
    }

    pub fn with_rng(
        key_bits: u64,
        first: Contender,
        second: Contender,
        mut rng: ChaCha20Rng,
    ) -> Result<Self> {
        info!("setting up {} vs {}", first.name, second.name);
        let authority = DecryptionAuthority::generate(key_bits, &mut rng)?;
        let first = Side::setup(Seat::First, first, &authority, &mut rng)?;
        let second = Side::setup(Seat::Second, second, &authority, &mut rng)?;
        Ok(Self {
            authority,
            sides: [first, second],
            rng,
            turn: 1,
            status: SessionStatus::InProgress,
        })
    }

    /// Number of the turn being played, or of the winning turn once over.
    pub fn current_turn(&self) -> u32 {
        self.turn
    }

    pub fn current_attacker(&self) -> Seat {
        if self.turn % 2 == 1 {
            Seat::First
        } else {
            Seat::Second
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != SessionStatus::InProgress
    }

    pub fn winner(&self) -> Option<Seat> {
        match self.status {
            SessionStatus::Won(seat) => Some(seat),
            _ => None,
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner().map(|seat| self.name(seat))
    }

    pub fn name(&self, seat: Seat) -> &str {
        &self.sides[seat.index()].name
    }

    /// What the opponent of `seat` knows about `seat`'s board.
    pub fn view_of(&self, seat: Seat) -> &BoardView {
        self.sides[seat.index()].guard.view()
    }

    /// Last decrypted total of `seat`'s board.
    pub fn remaining(&self, seat: Seat) -> u64 {
        self.sides[seat.index()].guard.remaining()
    }

    /// Fires the current attacker's shot at `at`.
    ///
    /// Recoverable errors leave the turn with the same attacker; fatal ones
    /// abort the session.
    pub fn attack(&mut self, at: Coordinate) -> Result<AttackReport> {
        if self.is_over() {
            return Err(GameError::SessionOver);
        }
        let attacker = self.current_attacker();
        let defender = &mut self.sides[attacker.opponent().index()];

        let outcome = match defender
            .guard
            .attack(at, &mut defender.board, &self.authority, &mut self.rng)
        {
            Ok(outcome) => outcome,
            Err(e) if e.is_recoverable() => {
                warn!("turn {}: rejected {at}: {e}", self.turn);
                return Err(e);
            }
            Err(e) => {
                error!("turn {}: session aborted: {e}", self.turn);
                self.status = SessionStatus::Aborted;
                return Err(e);
            }
        };
        let report = AttackReport {
            turn: self.turn,
            attacker,
            coordinate: at,
            outcome,
            remaining: defender.guard.remaining(),
        };
        debug!("turn {}: {:?} fires at {at}: {outcome:?}", self.turn, attacker);

        if outcome == Outcome::Won {
            // alternation ends the game before a second fleet can sink
            if self.remaining(attacker) == 0 {
                self.status = SessionStatus::Aborted;
                return Err(GameError::InvariantViolation(
                    "both fleets destroyed".into(),
                ));
            }
            self.status = SessionStatus::Won(attacker);
            info!("{} wins on turn {}", self.name(attacker), self.turn);
        } else {
            self.turn += 1;
        }
        Ok(report)
    }

    /// Asks the current attacker's player for a target until one is accepted.
    ///
    /// A failure that is not recoverable aborts the session, whether it came
    /// from the player or from the attack itself.
    pub fn play_turn(&mut self) -> Result<AttackReport> {
        if self.is_over() {
            return Err(GameError::SessionOver);
        }
        let result = self.take_turn();
        if let Err(e) = &result {
            // attack() has already aborted on its own fatal errors
            if !e.is_recoverable() && !self.is_over() {
                error!("turn {}: session aborted: {e}", self.turn);
                self.status = SessionStatus::Aborted;
            }
        }
        result
    }

    fn take_turn(&mut self) -> Result<AttackReport> {
        let attacker = self.current_attacker();
        for _ in 0..MAX_REJECTED_ATTEMPTS {
            let at = {
                let [first, second] = &mut self.sides;
                let (attacking, defending) = match attacker {
                    Seat::First => (first, second),
                    Seat::Second => (second, first),
                };
                attacking.player.choose_attack(defending.guard.view())?
            };
            match self.attack(at) {
                Err(e) if e.is_recoverable() => {
                    self.sides[attacker.index()].player.attack_rejected(at, &e);
                }
                result => return result,
            }
        }
        Err(GameError::InvariantViolation(format!(
            "{} had {MAX_REJECTED_ATTEMPTS} attacks refused in one turn",
            self.name(attacker)
        )))
    }

    /// Plays turns until one side wins.
    pub fn play(&mut self) -> Result<Seat> {
        while !self.is_over() {
            self.play_turn()?;
        }
        self.winner().ok_or(GameError::SessionOver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Mark;
    use crate::error::CryptoError;
    use crate::fleet::{random_grid, STANDARD_FLEET};
    use crate::game::ScriptedOpponent;
    use crate::paillier::MIN_MODULUS_BITS;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn at(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col).unwrap()
    }

    /// Replays a fixed list of choices and records every rejection.
    struct Replay {
        choices: Vec<Coordinate>,
        rejected: Rc<RefCell<Vec<Coordinate>>>,
    }

    impl Player for Replay {
        fn choose_attack(&mut self, _view: &BoardView) -> Result<Coordinate> {
            if self.choices.is_empty() {
                return Err(GameError::InputClosed);
            }
            Ok(self.choices.remove(0))
        }

        fn attack_rejected(&mut self, at: Coordinate, _err: &GameError) {
            self.rejected.borrow_mut().push(at);
        }
    }

    fn scripted(seed: u64) -> Box<dyn Player> {
        Box::new(ScriptedOpponent::new(ChaCha20Rng::seed_from_u64(seed)))
    }

    fn session(seed: u64, first: PlainGrid, second: PlainGrid) -> GameSession {
        GameSession::with_rng(
            MIN_MODULUS_BITS,
            Contender::new("alice", first, scripted(seed + 1)),
            Contender::new("bob", second, scripted(seed + 2)),
            ChaCha20Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_two_segment_scenario() {
        let alice = PlainGrid::from_segments(&[at(9, 9)]);
        let bob = PlainGrid::from_segments(&[at(0, 0), at(0, 1)]);
        let mut s = session(70, alice, bob);
        assert_eq!(s.current_turn(), 1);
        assert_eq!(s.current_attacker(), Seat::First);

        let report = s.attack(at(0, 0)).unwrap();
        assert_eq!(report.outcome, Outcome::Hit);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.attacker, Seat::First);

        assert_eq!(s.current_attacker(), Seat::Second);
        assert_eq!(s.attack(at(4, 4)).unwrap().outcome, Outcome::Miss);

        let report = s.attack(at(5, 5)).unwrap();
        assert_eq!(report.outcome, Outcome::Miss);
        assert_eq!(report.remaining, 1);

        assert_eq!(s.attack(at(4, 5)).unwrap().outcome, Outcome::Miss);
        assert!(!s.is_over());

        let report = s.attack(at(0, 1)).unwrap();
        assert_eq!(report.outcome, Outcome::Won);
        assert_eq!(report.turn, 5);
        assert_eq!(report.remaining, 0);

        assert!(s.is_over());
        assert_eq!(s.winner(), Some(Seat::First));
        assert_eq!(s.winner_name(), Some("alice"));
        assert_eq!(s.current_turn(), 5);
        assert!(matches!(s.attack(at(7, 7)), Err(GameError::SessionOver)));
    }

    #[test]
    fn test_recoverable_errors_keep_the_turn() {
        let alice = PlainGrid::from_segments(&[at(9, 9)]);
        let bob = PlainGrid::from_segments(&[at(0, 0), at(0, 1)]);
        let mut s = session(71, alice, bob);

        s.attack(at(3, 3)).unwrap();
        s.attack(at(2, 2)).unwrap();
        assert_eq!(s.current_turn(), 3);

        assert!(matches!(s.attack(at(3, 3)), Err(GameError::AlreadyAttacked(_))));
        assert_eq!(s.current_turn(), 3);
        assert_eq!(s.current_attacker(), Seat::First);
        assert_eq!(s.remaining(Seat::Second), 2);
        assert_eq!(s.status(), SessionStatus::InProgress);

        // the other side's shots do not count against this board
        assert_eq!(s.attack(at(2, 2)).unwrap().outcome, Outcome::Miss);
        assert_eq!(s.current_attacker(), Seat::Second);
    }

    #[test]
    fn test_play_turn_reprompts_same_player() {
        let rejected = Rc::new(RefCell::new(Vec::new()));
        let alice = Replay {
            choices: vec![at(0, 0), at(0, 0), at(0, 0), at(0, 1)],
            rejected: rejected.clone(),
        };
        let mut s = GameSession::with_rng(
            MIN_MODULUS_BITS,
            Contender::new("alice", PlainGrid::from_segments(&[at(9, 9)]), Box::new(alice)),
            Contender::new(
                "bob",
                PlainGrid::from_segments(&[at(0, 0), at(0, 1)]),
                Box::new(ScriptedOpponent::new(ChaCha20Rng::seed_from_u64(1)).with_script([at(0, 0)])),
            ),
            ChaCha20Rng::seed_from_u64(72),
        )
        .unwrap();

        assert_eq!(s.play_turn().unwrap().outcome, Outcome::Hit);
        assert_eq!(s.play_turn().unwrap().outcome, Outcome::Miss);
        let report = s.play_turn().unwrap();
        assert_eq!(report.coordinate, at(0, 1));
        assert_eq!(report.outcome, Outcome::Won);
        assert_eq!(report.turn, 3);
        assert_eq!(*rejected.borrow(), vec![at(0, 0), at(0, 0)]);
        assert_eq!(s.view_of(Seat::Second).get(at(0, 1)), Mark::Hit);
        assert_eq!(s.view_of(Seat::First).get(at(0, 0)), Mark::Miss);
    }

    #[test]
    fn test_play_to_the_end() {
        let mut rng = ChaCha20Rng::seed_from_u64(73);
        let alice = random_grid(&STANDARD_FLEET, &mut rng).unwrap();
        let bob = random_grid(&STANDARD_FLEET, &mut rng).unwrap();
        let mut s = session(74, alice, bob);

        let winner = s.play().unwrap();
        let loser = winner.opponent();
        assert_eq!(s.winner(), Some(winner));
        assert_eq!(s.remaining(loser), 0);
        assert!(s.remaining(winner) > 0);
        assert_eq!(s.view_of(loser).count(Mark::Hit), 16);
        assert!(s.current_turn() >= 31);
        assert!(matches!(s.play_turn(), Err(GameError::SessionOver)));
    }

    #[test]
    fn test_setup_rejects_empty_fleet() {
        let result = GameSession::with_rng(
            MIN_MODULUS_BITS,
            Contender::new("alice", PlainGrid::new(), scripted(1)),
            Contender::new("bob", PlainGrid::from_segments(&[at(0, 0)]), scripted(2)),
            ChaCha20Rng::seed_from_u64(75),
        );
        assert!(matches!(result, Err(GameError::InvalidFleet(_))));
    }

    #[test]
    fn test_setup_rejects_weak_keys() {
        let result = GameSession::with_rng(
            512,
            Contender::new("alice", PlainGrid::from_segments(&[at(0, 0)]), scripted(1)),
            Contender::new("bob", PlainGrid::from_segments(&[at(0, 0)]), scripted(2)),
            ChaCha20Rng::seed_from_u64(76),
        );
        assert!(matches!(
            result,
            Err(GameError::Crypto(CryptoError::KeyGeneration(_)))
        ));
    }

    #[test]
    fn test_new_from_config() {
        let config = GameConfig {
            key_bits: MIN_MODULUS_BITS,
            seed: Some(77),
            // fleets come pre-built, so this one is never read
            fleet: Vec::new(),
        };
        let s = GameSession::new(
            &config,
            Contender::new("alice", PlainGrid::from_segments(&[at(0, 0)]), scripted(1)),
            Contender::new("bob", PlainGrid::from_segments(&[at(1, 1)]), scripted(2)),
        )
        .unwrap();
        assert_eq!(s.name(Seat::First), "alice");
        assert_eq!(s.remaining(Seat::Second), 1);
        assert_eq!(s.winner(), None);
    }

    /// Fires at the same cell forever.
    struct Stubborn(Coordinate);

    impl Player for Stubborn {
        fn choose_attack(&mut self, _view: &BoardView) -> Result<Coordinate> {
            Ok(self.0)
        }
    }

    fn two_segment_session(seed: u64, alice: Box<dyn Player>) -> GameSession {
        GameSession::with_rng(
            MIN_MODULUS_BITS,
            Contender::new("alice", PlainGrid::from_segments(&[at(9, 9)]), alice),
            Contender::new(
                "bob",
                PlainGrid::from_segments(&[at(0, 0), at(0, 1)]),
                Box::new(ScriptedOpponent::new(ChaCha20Rng::seed_from_u64(1)).with_script([at(5, 5)])),
            ),
            ChaCha20Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_endless_refusals_abort_the_session() {
        let mut s = two_segment_session(78, Box::new(Stubborn(at(0, 0))));
        assert_eq!(s.play_turn().unwrap().outcome, Outcome::Hit);
        assert_eq!(s.play_turn().unwrap().outcome, Outcome::Miss);

        let err = s.play_turn().unwrap_err();
        assert!(matches!(err, GameError::InvariantViolation(_)));
        assert_eq!(s.status(), SessionStatus::Aborted);
        assert!(s.is_over());
        assert_eq!(s.winner(), None);
        assert!(matches!(s.attack(at(0, 1)), Err(GameError::SessionOver)));
        assert!(matches!(s.play_turn(), Err(GameError::SessionOver)));
    }

    #[test]
    fn test_player_failure_aborts_the_session() {
        let alice = Replay {
            choices: Vec::new(),
            rejected: Rc::new(RefCell::new(Vec::new())),
        };
        let mut s = two_segment_session(79, Box::new(alice));

        assert!(matches!(s.play_turn(), Err(GameError::InputClosed)));
        assert_eq!(s.status(), SessionStatus::Aborted);
        assert!(matches!(s.attack(at(0, 0)), Err(GameError::SessionOver)));
    }
}
