use rand::Rng;

use super::{Coordinate, PlainGrid, CELL_COUNT};
use crate::error::CryptoError;
use crate::paillier::{Ciphertext, PublicKey};

/// Encrypted total of a whole board, the only kind of ciphertext a
/// [`DecryptionAuthority`](crate::game::DecryptionAuthority) opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate(Ciphertext);

impl Aggregate {
    pub(crate) fn ciphertext(&self) -> &Ciphertext {
        &self.0
    }
}

/// One side's board: a ciphertext per cell, row-major.
///
/// The sum of the underlying plaintexts is always the number of intact ship
/// segments. Nothing here ever sees a plaintext after construction.
pub struct EncryptedBoard {
    public_key: PublicKey,
    cells: Vec<Ciphertext>,
}

impl EncryptedBoard {
    /// Encrypts every cell of `grid` independently.
    pub fn new<R: Rng + ?Sized>(grid: &PlainGrid, public_key: PublicKey, rng: &mut R) -> Self {
        let cells = Coordinate::all()
            .map(|at| public_key.encrypt(grid.get(at) as i64, rng))
            .collect();
        Self { public_key, cells }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Destroys whatever sits at `at`: the cell becomes `cell ⊗ 0 ⊕ Enc(0)`.
    ///
    /// A ship segment drops the board total by one, water leaves it as is.
    /// Replays are harmless to the total but the caller must still refuse them.
    pub fn apply_hit<R: Rng + ?Sized>(
        &mut self,
        at: Coordinate,
        rng: &mut R,
    ) -> Result<(), CryptoError> {
        let cell = &mut self.cells[at.index()];
        let cleared = self.public_key.scale(cell, 0)?;
        *cell = self.public_key.rerandomize(&cleared, rng)?;
        Ok(())
    }

    /// Homomorphic sum of all cells, an encryption of the intact segment count.
    pub fn total_remaining(&self) -> Result<Aggregate, CryptoError> {
        debug_assert_eq!(self.cells.len(), CELL_COUNT);
        self.public_key.sum(&self.cells).map(Aggregate)
    }

    #[cfg(test)]
    pub(crate) fn cell(&self, at: Coordinate) -> &Ciphertext {
        &self.cells[at.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{random_grid, STANDARD_FLEET};
    use crate::paillier::tests::test_keypair;
    use crate::paillier::PrivateKey;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn at(row: usize, col: usize) -> Coordinate {
        Coordinate::new(row, col).unwrap()
    }

    fn two_segment_board(seed: u64) -> (EncryptedBoard, PrivateKey, ChaCha20Rng) {
        let (pk, sk) = test_keypair(seed).into_parts();
        let mut rng = ChaCha20Rng::seed_from_u64(seed + 1);
        let grid = PlainGrid::from_segments(&[at(0, 0), at(0, 1)]);
        (EncryptedBoard::new(&grid, pk, &mut rng), sk, rng)
    }

    #[test]
    fn test_cells_decrypt_to_grid() {
        let (pk, sk) = test_keypair(20).into_parts();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let mut grids = vec![PlainGrid::from_segments(&[at(0, 0), at(3, 4), at(3, 5), at(9, 9)])];
        for _ in 0..3 {
            grids.push(random_grid(&STANDARD_FLEET, &mut rng).unwrap());
        }

        for grid in &grids {
            let board = EncryptedBoard::new(grid, pk.clone(), &mut rng);
            for c in Coordinate::all() {
                assert_eq!(sk.decrypt(board.cell(c)), Ok(grid.get(c) as i64), "cell {c}");
            }
            let total = sk.decrypt(board.total_remaining().unwrap().ciphertext());
            assert_eq!(total, Ok(grid.segment_count() as i64));
        }
    }

    #[test]
    fn test_equal_plaintexts_give_distinct_ciphertexts() {
        let (board, _sk, _rng) = two_segment_board(22);
        assert_ne!(board.cell(at(0, 0)), board.cell(at(0, 1)));
        assert_ne!(board.cell(at(5, 5)), board.cell(at(5, 6)));
    }

    #[test]
    fn test_apply_hit_on_ship_and_water() {
        let (mut board, sk, mut rng) = two_segment_board(24);
        let total = |board: &EncryptedBoard| sk.decrypt(board.total_remaining().unwrap().ciphertext()).unwrap();
        assert_eq!(total(&board), 2);

        board.apply_hit(at(0, 0), &mut rng).unwrap();
        assert_eq!(total(&board), 1);

        board.apply_hit(at(5, 5), &mut rng).unwrap();
        assert_eq!(total(&board), 1);

        board.apply_hit(at(0, 1), &mut rng).unwrap();
        assert_eq!(total(&board), 0);
    }

    #[test]
    fn test_apply_hit_refreshes_ciphertext() {
        let (mut board, sk, mut rng) = two_segment_board(26);
        let before = board.cell(at(7, 7)).clone();
        board.apply_hit(at(7, 7), &mut rng).unwrap();
        assert_ne!(board.cell(at(7, 7)), &before);
        assert_eq!(sk.decrypt(board.cell(at(7, 7))), Ok(0));
    }

    #[test]
    fn test_total_is_order_independent() {
        let (board, sk, _rng) = two_segment_board(28);
        let pk = board.public_key();

        let forward = board.total_remaining().unwrap();
        let reversed = pk.sum(board.cells.iter().rev()).unwrap();
        let mut shuffled: Vec<&Ciphertext> = board.cells.iter().collect();
        shuffled.rotate_left(37);
        shuffled.swap(3, 91);
        let shuffled = pk.sum(shuffled).unwrap();

        assert_eq!(forward.ciphertext(), &reversed);
        assert_eq!(forward.ciphertext(), &shuffled);
        assert_eq!(sk.decrypt(forward.ciphertext()), Ok(2));
    }
}
