use rand_core::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{Generator, LinearGenerator, ReducibleGenerator, SearchableGenerator};
use crate::util::Word;

const LENGTH: usize = 17;
const SIZE: usize = LENGTH * 32;
const MEXP: usize = 521;

/// RLittle32: a 544-bit lagged shift generator with a reducible
/// characteristic polynomial whose degree-521 irreducible factor carries
/// the period. The reference subject for the period-certification engine.
///
/// Logical state word j lives at `state[(index + 1 + j) % 17]`, oldest
/// first; the designated parity word is logical word 0.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RLittle32 {
    state: [u32; LENGTH],
    index: usize,
    mat1: u32,
    pos: usize,
    sh1: u32,
    sh2: u32,
    sh3: u32,
    sh4: u32,
    parity: u32,
    reverse: bool,
}

impl RLittle32 {
    pub fn new(mat1: u32, pos: usize, sh1: u32, sh2: u32, sh3: u32, sh4: u32) -> Self {
        let mut g = RLittle32 {
            state: [0; LENGTH],
            index: LENGTH - 1,
            mat1,
            pos,
            sh1,
            sh2,
            sh3,
            sh4,
            parity: 0,
            reverse: false,
        };
        g.seed(1);
        g
    }

    /// A parameter set whose minimal polynomial has an irreducible factor
    /// of degree 521.
    pub fn new_reference() -> Self {
        RLittle32::new(0x80903834, 7, 1, 31, 26, 26)
    }

    /// The stored certification vector, if one has been set.
    pub fn parity(&self) -> u32 {
        self.parity
    }
}

impl Generator for RLittle32 {
    type Output = u32;

    fn generate(&mut self) -> u32 {
        self.index = (self.index + 1) % LENGTH;
        let mut x = self.state[self.index];
        let mut y = self.state[(self.index + self.pos) % LENGTH];
        y ^= y >> self.sh1;
        y ^= y << self.sh2;
        x ^= x << self.sh3;
        x ^= x >> self.sh4;
        x ^= y;
        if y & 1 == 1 {
            x ^= self.mat1;
        }
        self.state[self.index] = x;
        x
    }

    fn seed(&mut self, value: u32) {
        self.state = [0; LENGTH];
        self.state[0] = value;
        self.state[1] = self.mat1;
        for i in 1..LENGTH {
            self.state[i] ^= (i as u32).wrapping_add(
                1812433253u32.wrapping_mul(self.state[i - 1] ^ (self.state[i - 1] >> 30)),
            );
        }
        self.index = LENGTH - 1;
        if self.is_zero() {
            self.state[0] = 1;
        }
    }

    fn bit_size(&self) -> usize {
        SIZE
    }
}

impl LinearGenerator for RLittle32 {
    fn generate_high(&mut self, bit_len: u32) -> u32 {
        let u = if self.reverse {
            self.generate().reverse_bits()
        } else {
            self.generate()
        };
        u & u32::mask_high(bit_len)
    }

    fn combine(&mut self, other: &Self) -> Result<()> {
        if self.mat1 != other.mat1
            || self.pos != other.pos
            || (self.sh1, self.sh2, self.sh3, self.sh4)
                != (other.sh1, other.sh2, other.sh3, other.sh4)
        {
            return Err(Error::IncompatibleOperand);
        }
        let mut i = self.index;
        let mut j = other.index;
        for _ in 0..LENGTH {
            self.state[i] ^= other.state[j];
            i = (i + 1) % LENGTH;
            j = (j + 1) % LENGTH;
        }
        Ok(())
    }

    fn set_zero(&mut self) {
        self.state = [0; LENGTH];
    }

    fn is_zero(&self) -> bool {
        self.state.iter().all(|&w| w == 0)
    }
}

impl SearchableGenerator for RLittle32 {
    fn randomize_params(&mut self, rng: &mut dyn RngCore) {
        self.mat1 = rng.next_u32();
        self.pos = rng.next_u32() as usize % LENGTH;
        self.sh1 = rng.next_u32() % 32;
        self.sh2 = rng.next_u32() % 32;
        self.sh3 = rng.next_u32() % 32;
        self.sh4 = rng.next_u32() % 32;
    }

    fn param_string(&self) -> String {
        format!(
            "mat1:{:08x} pos:{} sh1:{} sh2:{} sh3:{} sh4:{}",
            self.mat1, self.pos, self.sh1, self.sh2, self.sh3, self.sh4
        )
    }
}

impl ReducibleGenerator for RLittle32 {
    fn set_one_bit(&mut self, bit_pos: usize) {
        debug_assert!(bit_pos < SIZE);
        self.state = [0; LENGTH];
        self.index = LENGTH - 1;
        self.state[bit_pos / 32] = 1 << (bit_pos % 32);
    }

    fn parity_value(&self) -> u32 {
        self.state[(self.index + 1) % LENGTH]
    }

    fn set_parity_word(&mut self, value: u32) {
        self.state[(self.index + 1) % LENGTH] = value;
    }

    fn set_parity_value(&mut self, parity: u32) {
        self.set_parity_word(parity);
        self.parity = parity;
    }

    fn mexp(&self) -> usize {
        MEXP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn combine_aligns_by_index() {
        let mut a = RLittle32::new_reference();
        a.seed(1);
        let mut b = a.clone();
        for _ in 0..5 {
            b.generate();
        }
        let mut c = a.clone();
        c.combine(&b).unwrap();
        for _ in 0..40 {
            let x = a.generate() ^ b.generate();
            assert_eq!(c.generate(), x);
        }
    }

    #[test]
    pub fn one_bit_states_span_the_state() {
        let mut g = RLittle32::new_reference();
        g.set_one_bit(0);
        assert!(!g.is_zero());
        assert_eq!(g.parity_value(), 1);
        g.set_one_bit(543);
        assert_eq!(g.state[16], 0x80000000);
    }

    #[test]
    pub fn incompatible_params_are_rejected() {
        let mut a = RLittle32::new_reference();
        let b = RLittle32::new(0xed6fdaa7, 7, 5, 27, 9, 12);
        assert_eq!(a.combine(&b), Err(Error::IncompatibleOperand));
    }
}
