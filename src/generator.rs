use rand_core::RngCore;

use crate::error::Result;
use crate::gf2x::Gf2Poly;
use crate::util::Word;

/// A pseudorandom number generator with a finite bit state.
pub trait Generator {
    type Output: Word;

    /// Advances the state and returns the next output word.
    fn generate(&mut self) -> Self::Output;

    /// Initializes the state from a single word. The resulting state must
    /// be nonzero.
    fn seed(&mut self, value: Self::Output);

    /// Number of bits in the state.
    fn bit_size(&self) -> usize;
}

/// A generator whose transition and output maps are GF(2)-linear, so that
/// states can be added and the zero state is a fixed point.
pub trait LinearGenerator: Generator + Clone {
    /// Advances the state and returns the next output with only its
    /// `bit_len` most significant bits retained.
    fn generate_high(&mut self, bit_len: u32) -> Self::Output;

    /// XORs `other`'s state into this one. Both must carry the same
    /// concrete parameters.
    fn combine(&mut self, other: &Self) -> Result<()>;

    /// Sets the state to all zero bits.
    fn set_zero(&mut self);

    /// True if every state bit is zero.
    fn is_zero(&self) -> bool;
}

/// A generator with randomizable free parameters, for recursion search.
pub trait SearchableGenerator: Generator {
    /// Draws a fresh set of free recursion parameters.
    fn randomize_params(&mut self, rng: &mut dyn RngCore);

    /// Human-readable rendering of the current parameters.
    fn param_string(&self) -> String;
}

/// A linear generator with a tunable output tempering stage.
pub trait TemperingGenerator: LinearGenerator {
    /// Number of independent tempering parameters.
    fn tempering_param_count(&self) -> usize {
        1
    }

    /// Overwrites the masked bits of tempering parameter `index` with
    /// `pattern & mask`.
    fn set_tempering_pattern(&mut self, mask: Self::Output, pattern: Self::Output, index: usize);

    /// Rebuilds any tables derived from the tempering parameters.
    fn setup_tempering(&mut self) {}

    /// Bit-reverses every output when set. Used to tune tempering from the
    /// LSB side.
    fn set_reverse_output(&mut self, reverse: bool);

    fn is_reverse_output(&self) -> bool;
}

/// A linear generator whose characteristic polynomial is reducible, with a
/// large irreducible factor of degree `mexp` guaranteeing the period.
pub trait ReducibleGenerator: LinearGenerator {
    /// Clears the state, then sets state bit `pos` (word-ascending,
    /// LSB-first within a word).
    fn set_one_bit(&mut self, pos: usize);

    /// The current value of the designated parity word of the state.
    fn parity_value(&self) -> Self::Output;

    /// Overwrites the designated parity word of the state.
    fn set_parity_word(&mut self, value: Self::Output);

    /// Stores `parity` as the certification vector and writes it into the
    /// designated parity word of the state.
    fn set_parity_value(&mut self, parity: Self::Output);

    /// Degree of the irreducible factor that carries the period.
    fn mexp(&self) -> usize;
}

/// Applies `poly` at the transition map: the state becomes
/// sum over i of coeff_i A^i s. A state annihilated by one factor of the
/// characteristic polynomial is left inside the invariant subspace of the
/// complementary factor.
pub fn annihilate<G: LinearGenerator>(g: &mut G, poly: &Gf2Poly) -> Result<()> {
    let deg = match poly.degree() {
        Some(d) => d,
        None => {
            g.set_zero();
            return Ok(());
        }
    };
    let mut other = g.clone();
    g.set_zero();
    for i in 0..=deg {
        if poly.coeff(i) {
            g.combine(&other)?;
        }
        other.generate();
    }
    Ok(())
}
