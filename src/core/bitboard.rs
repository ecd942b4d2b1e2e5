//! A fixed-size grid bitset using const generics.
//!
//! Boards are an `N×N` grid packed into an unsigned integer `T`, one bit per
//! cell, indexed by [`Position`] in row-major order (`y * N + x`). The board
//! model layers several of these (ships, shot, miss, killed) instead of
//! storing an enum per cell.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use core::{any, fmt, mem};
use num_traits::{PrimInt, Unsigned, Zero};

use crate::core::common::Position;

/// Errors returned by bitboard operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitBoardError {
    /// Requested board size N*N exceeds capacity of `T::BITS`.
    SizeTooLarge { n: usize, capacity: usize },
    /// Coordinate is outside [0..N).
    IndexOutOfBounds { x: usize, y: usize },
}

impl fmt::Display for BitBoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitBoardError::SizeTooLarge { n, capacity } => {
                write!(f, "SizeTooLarge: N*N={} exceeds T::BITS={}", n * n, capacity)
            }
            BitBoardError::IndexOutOfBounds { x, y } => {
                write!(f, "IndexOutOfBounds: x={}, y={}", x, y)
            }
        }
    }
}

/// A fixed-size N×N bitboard stored in the unsigned integer `T`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitBoard<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    bits: T,
}

impl<T, const N: usize> BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    const BOARD_BITS: usize = N * N;

    #[inline]
    fn mask() -> T {
        if Self::BOARD_BITS == mem::size_of::<T>() * 8 {
            !T::zero()
        } else {
            (T::one() << Self::BOARD_BITS) - T::one()
        }
    }

    /// Create a new empty bitboard without size check.
    #[inline]
    pub fn new() -> Self {
        BitBoard { bits: T::zero() }
    }

    /// Fallible constructor: returns `Err(SizeTooLarge)` if N*N > T::BITS.
    pub fn try_new() -> Result<Self, BitBoardError> {
        let capacity = mem::size_of::<T>() * 8;
        if Self::BOARD_BITS > capacity {
            Err(BitBoardError::SizeTooLarge { n: N, capacity })
        } else {
            Ok(Self::new())
        }
    }

    /// Returns `true` if `pos` lies on the grid.
    #[inline]
    pub fn contains(pos: Position) -> bool {
        pos.x < N && pos.y < N
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    /// Gets the bit at `pos`.
    pub fn get(&self, pos: Position) -> Result<bool, BitBoardError> {
        let idx = Self::index(pos)?;
        Ok(((self.bits >> idx) & T::one()) != T::zero())
    }

    /// Sets the bit at `pos`.
    pub fn set(&mut self, pos: Position) -> Result<(), BitBoardError> {
        let idx = Self::index(pos)?;
        self.bits = self.bits | (T::one() << idx);
        Ok(())
    }

    #[inline]
    fn index(pos: Position) -> Result<usize, BitBoardError> {
        if Self::contains(pos) {
            Ok(pos.y * N + pos.x)
        } else {
            Err(BitBoardError::IndexOutOfBounds { x: pos.x, y: pos.y })
        }
    }

    /// Creates a bitboard from an iterator of positions.
    pub fn from_positions<I>(iter: I) -> Result<Self, BitBoardError>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut board = Self::new();
        for pos in iter {
            board.set(pos)?;
        }
        Ok(board)
    }

    /// Every cell within one step (orthogonal or diagonal) of a set bit,
    /// excluding the set bits themselves. Clipped to the grid.
    pub fn halo(&self) -> Self {
        let mut ring = Self::new();
        for pos in self.iter_set_bits() {
            for ny in pos.y.saturating_sub(1)..=(pos.y + 1).min(N - 1) {
                for nx in pos.x.saturating_sub(1)..=(pos.x + 1).min(N - 1) {
                    let idx = ny * N + nx;
                    ring.bits = ring.bits | (T::one() << idx);
                }
            }
        }
        ring & !*self
    }

    /// Iterator over set bits in row-major order.
    #[inline]
    pub fn iter_set_bits(&self) -> SetBits<'_, T, N> {
        SetBits {
            board: self,
            idx: 0,
        }
    }
}

impl<T, const N: usize> Default for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BitBoard<{}, {}>:", any::type_name::<T>(), N)?;
        for y in 0..N {
            for x in 0..N {
                let bit = if ((self.bits >> (y * N + x)) & T::one()) != T::zero() {
                    '■'
                } else {
                    '□'
                };
                write!(f, "{} ", bit)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Iterator over the set bits of a bitboard.
#[derive(Clone, Copy)]
pub struct SetBits<'a, T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    board: &'a BitBoard<T, N>,
    idx: usize,
}

impl<'a, T, const N: usize> Iterator for SetBits<'a, T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < N * N {
            let idx = self.idx;
            self.idx += 1;
            if ((self.board.bits >> idx) & T::one()) != T::zero() {
                return Some(Position::new(idx % N, idx / N));
            }
        }
        None
    }
}

impl<T, const N: usize> BitAnd for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits & rhs.bits,
        }
    }
}

impl<T, const N: usize> BitOr for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BitBoard {
            bits: self.bits | rhs.bits,
        }
    }
}

/// Bitwise NOT, kept within board bounds.
impl<T, const N: usize> Not for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        BitBoard {
            bits: !self.bits & Self::mask(),
        }
    }
}

impl<T, const N: usize> BitAndAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits = self.bits & rhs.bits;
    }
}

impl<T, const N: usize> BitOrAssign for BitBoard<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits = self.bits | rhs.bits;
    }
}
