use rand_core::{Error as RandError, RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::{Generator, LinearGenerator, TemperingGenerator};
use crate::util::Word;

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908b0df;
const UPPER_MASK: u32 = 0x80000000;
const LOWER_MASK: u32 = 0x7fffffff;
const TEMPER_B: u32 = 0x9d2c5680;
const TEMPER_C: u32 = 0xefc60000;

/// MT19937, advanced one word at a time over a ring buffer. 19937-bit
/// state, 32-bit output.
///
/// Serves both as the crate's `RngCore` source of search randomness and as
/// the large reference subject for the analysis engines: its tempering
/// masks are exposed through [`TemperingGenerator`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, PartialEq, Eq)]
pub struct MersenneTwister {
    state: Vec<u32>,
    index: usize,
    mask_b: u32,
    mask_c: u32,
    reverse: bool,
}

impl core::fmt::Debug for MersenneTwister {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "MersenneTwister {{ index: {} }}", self.index)
    }
}

impl Default for MersenneTwister {
    fn default() -> Self {
        MersenneTwister::new(5489)
    }
}

impl MersenneTwister {
    pub fn new(seed: u32) -> Self {
        let mut mt = MersenneTwister {
            state: vec![0; N],
            index: 0,
            mask_b: TEMPER_B,
            mask_c: TEMPER_C,
            reverse: false,
        };
        mt.reseed(seed);
        mt
    }

    pub fn new_with_array(key: &[u32]) -> Self {
        let mut mt = MersenneTwister::new(19650218);
        mt.reseed_array(key);
        mt
    }

    pub fn reseed(&mut self, seed: u32) {
        self.state[0] = seed;
        for i in 1..N {
            self.state[i] = 1812433253u32
                .wrapping_mul(self.state[i - 1] ^ (self.state[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        self.index = 0;
    }

    pub fn reseed_array(&mut self, key: &[u32]) {
        self.reseed(19650218);
        let mut i = 1;
        let mut j = 0;
        for _ in 0..N.max(key.len()) {
            self.state[i] = (self.state[i]
                ^ 1664525u32.wrapping_mul(self.state[i - 1] ^ (self.state[i - 1] >> 30)))
            .wrapping_add(key[j])
            .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..N - 1 {
            self.state[i] = (self.state[i]
                ^ 1566083941u32.wrapping_mul(self.state[i - 1] ^ (self.state[i - 1] >> 30)))
            .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.state[0] = self.state[N - 1];
                i = 1;
            }
        }
        // a nonzero state is guaranteed by pinning the top bit
        self.state[0] = 0x80000000;
        self.index = 0;
    }

    fn next(&mut self) -> u32 {
        let y =
            (self.state[self.index] & UPPER_MASK) | (self.state[(self.index + 1) % N] & LOWER_MASK);
        let mut next = self.state[(self.index + M) % N] ^ (y >> 1);
        if y & 1 == 1 {
            next ^= MATRIX_A;
        }
        self.state[self.index] = next;
        self.index = (self.index + 1) % N;
        self.temper(next)
    }

    fn temper(&self, mut y: u32) -> u32 {
        y ^= y >> 11;
        y ^= (y << 7) & self.mask_b;
        y ^= (y << 15) & self.mask_c;
        y ^= y >> 18;
        y
    }
}

impl Generator for MersenneTwister {
    type Output = u32;

    fn generate(&mut self) -> u32 {
        self.next()
    }

    fn seed(&mut self, value: u32) {
        self.reseed(value);
    }

    fn bit_size(&self) -> usize {
        19937
    }
}

impl LinearGenerator for MersenneTwister {
    fn generate_high(&mut self, bit_len: u32) -> u32 {
        let u = if self.reverse {
            self.next().reverse_bits()
        } else {
            self.next()
        };
        u & u32::mask_high(bit_len)
    }

    fn combine(&mut self, other: &Self) -> Result<()> {
        if self.mask_b != other.mask_b || self.mask_c != other.mask_c {
            return Err(Error::IncompatibleOperand);
        }
        let mut i = self.index;
        let mut j = other.index;
        for _ in 0..N {
            self.state[i] ^= other.state[j];
            i += 1;
            if i == N {
                i = 0;
            }
            j += 1;
            if j == N {
                j = 0;
            }
        }
        Ok(())
    }

    fn set_zero(&mut self) {
        for w in self.state.iter_mut() {
            *w = 0;
        }
    }

    fn is_zero(&self) -> bool {
        // the low 31 bits of the oldest word are outside the state
        if self.state[self.index] & UPPER_MASK != 0 {
            return false;
        }
        (1..N).all(|k| self.state[(self.index + k) % N] == 0)
    }
}

impl TemperingGenerator for MersenneTwister {
    fn tempering_param_count(&self) -> usize {
        2
    }

    fn set_tempering_pattern(&mut self, mask: u32, pattern: u32, index: usize) {
        let target = if index == 0 {
            &mut self.mask_b
        } else {
            &mut self.mask_c
        };
        *target &= !mask;
        *target |= pattern & mask;
    }

    fn set_reverse_output(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    fn is_reverse_output(&self) -> bool {
        self.reverse
    }
}

impl RngCore for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        self.next()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = self.next() as u64;
        let hi = self.next() as u64;
        lo | (hi << 32)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let bytes = dest.len();
        let mut i = 0;
        while i < bytes {
            let x = self.next();
            let j = bytes.min(i + 4);
            // Always use Little-Endian.
            dest[i..j].copy_from_slice(&x.to_le_bytes()[0..(j - i)]);
            i = j;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), RandError> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for MersenneTwister {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        MersenneTwister::new(u32::from_le_bytes(seed))
    }
}
