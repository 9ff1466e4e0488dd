use rand_core::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{Generator, LinearGenerator, SearchableGenerator, TemperingGenerator};
use crate::util::Word;

const MEXP: usize = 127;
const MASK: u32 = 0x7fffffff;
const SH0: u32 = 1;
const SH1: u32 = 10;
const SH8: u32 = 8;

/// TinyMT32 with the GF(2)-linear output function: 127-bit state, 32-bit
/// output, parameters mat1/mat2 for the recursion and tmat for tempering.
///
/// The small searchable reference generator of this crate: it implements
/// every capability trait and its reference parameters reach the
/// theoretical equidistribution bound at every accuracy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TinyMt32 {
    status: [u32; 4],
    mat1: u32,
    mat2: u32,
    tmat: u32,
    reverse: bool,
}

impl TinyMt32 {
    pub fn new(mat1: u32, mat2: u32, tmat: u32) -> Self {
        TinyMt32 {
            status: [0, 0, 0, 1],
            mat1,
            mat2,
            tmat,
            reverse: false,
        }
    }

    /// The published tinymt32 parameter set.
    pub fn new_reference() -> Self {
        TinyMt32::new(0x8f7011ee, 0xfc78ff1f, 0x3793fdff)
    }

    fn next_state(&mut self) {
        let mut y = self.status[3];
        let mut x = (self.status[0] & MASK) ^ self.status[1] ^ self.status[2];
        x ^= x << SH0;
        y ^= (y >> SH0) ^ x;
        self.status[0] = self.status[1];
        self.status[1] = self.status[2];
        self.status[2] = x ^ (y << SH1);
        self.status[3] = y;
        if y & 1 == 1 {
            self.status[1] ^= self.mat1;
            self.status[2] ^= self.mat2;
        }
    }

    fn temper(&self) -> u32 {
        let mut t0 = self.status[3];
        let t1 = self.status[0] ^ (self.status[2] >> SH8);
        t0 ^= t1;
        if t1 & 1 == 1 {
            t0 ^= self.tmat;
        }
        t0
    }
}

impl Generator for TinyMt32 {
    type Output = u32;

    fn generate(&mut self) -> u32 {
        self.next_state();
        self.temper()
    }

    fn seed(&mut self, value: u32) {
        self.status = [0, 0, 0, value];
        if self.is_zero() {
            self.status[3] = 1;
        }
    }

    fn bit_size(&self) -> usize {
        MEXP
    }
}

impl LinearGenerator for TinyMt32 {
    fn generate_high(&mut self, bit_len: u32) -> u32 {
        let u = if self.reverse {
            self.generate().reverse_bits()
        } else {
            self.generate()
        };
        u & u32::mask_high(bit_len)
    }

    fn combine(&mut self, other: &Self) -> Result<()> {
        if self.mat1 != other.mat1 || self.mat2 != other.mat2 || self.tmat != other.tmat {
            return Err(Error::IncompatibleOperand);
        }
        for i in 0..4 {
            self.status[i] ^= other.status[i];
        }
        Ok(())
    }

    fn set_zero(&mut self) {
        self.status = [0; 4];
    }

    fn is_zero(&self) -> bool {
        self.status[0] & MASK == 0
            && self.status[1] == 0
            && self.status[2] == 0
            && self.status[3] == 0
    }
}

impl SearchableGenerator for TinyMt32 {
    fn randomize_params(&mut self, rng: &mut dyn RngCore) {
        self.mat1 = rng.next_u32();
        self.mat2 = rng.next_u32();
    }

    fn param_string(&self) -> String {
        format!(
            "mat1:{:08x} mat2:{:08x} tmat:{:08x}",
            self.mat1, self.mat2, self.tmat
        )
    }
}

impl TemperingGenerator for TinyMt32 {
    fn set_tempering_pattern(&mut self, mask: u32, pattern: u32, _index: usize) {
        self.tmat &= !mask;
        self.tmat |= pattern & mask;
    }

    fn set_reverse_output(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    fn is_reverse_output(&self) -> bool {
        self.reverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn state_recursion() {
        let mut g = TinyMt32::new_reference();
        g.seed(1);
        // the low bit of status[0] never enters the recursion
        let mut masked = g.clone();
        masked.status[0] ^= !MASK;
        let a: Vec<u32> = (0..16).map(|_| g.generate()).collect();
        let b: Vec<u32> = (0..16).map(|_| masked.generate()).collect();
        assert_eq!(a, b);
    }

    #[test]
    pub fn combine_requires_same_params() {
        let mut a = TinyMt32::new_reference();
        let b = TinyMt32::new(1, 2, 3);
        assert_eq!(a.combine(&b), Err(Error::IncompatibleOperand));
    }

    #[test]
    pub fn zero_seed_is_replaced() {
        let mut g = TinyMt32::new_reference();
        g.seed(0);
        assert!(!g.is_zero());
    }
}
