use log::trace;

use crate::error::{Error, Result};
use crate::generator::LinearGenerator;
use crate::util::Word;

/// Dimensions of equidistribution k(v) for v = 1..=bit_len, together with
/// the total defect against the theoretical bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquidistResult {
    /// `dimensions[v - 1]` is k(v).
    pub dimensions: Vec<usize>,
    /// Sum over v of floor(state_bits / v) - k(v).
    pub delta: usize,
}

/// A generator state paired with the cached high bits of its latest output
/// and the number of steps it has been advanced.
struct GeneratorVector<G: LinearGenerator> {
    rand: G,
    next: G::Output,
    count: usize,
    zero: bool,
}

impl<G: LinearGenerator> GeneratorVector<G> {
    /// Zero state with a single representative bit at `bit_pos` from the MSB.
    fn standard_basis(generator: &G, bit_pos: u32) -> Self {
        let mut rand = generator.clone();
        rand.set_zero();
        GeneratorVector {
            rand,
            next: G::Output::bit_from_msb(bit_pos),
            count: 0,
            zero: false,
        }
    }

    /// Seeded clone of the generator under test.
    fn probe(generator: &G) -> Self {
        let mut rand = generator.clone();
        rand.seed(G::Output::ONE);
        GeneratorVector {
            rand,
            next: G::Output::ZERO,
            count: 0,
            zero: false,
        }
    }

    fn add(&mut self, other: &Self) -> Result<()> {
        self.rand.combine(&other.rand)?;
        self.next ^= other.next;
        Ok(())
    }

    /// Advances until the masked output is nonzero, giving up after
    /// 2 * bit_size consecutive zero outputs.
    fn next_state(&mut self, bit_len: u32) {
        if self.zero {
            return;
        }
        let limit = self.rand.bit_size() * 2;
        let mut zero_count = 0;
        self.next = self.rand.generate_high(bit_len);
        self.count += 1;
        while self.next == G::Output::ZERO {
            zero_count += 1;
            if zero_count > limit {
                self.zero = true;
                break;
            }
            self.next = self.rand.generate_high(bit_len);
            self.count += 1;
        }
    }
}

/// Computes dimensions of equidistribution with v-bit accuracy by
/// incremental lattice basis reduction over generator states.
///
/// The basis holds one vector per output bit plus a working vector seeded
/// from the generator under test. Reduction against the basis either
/// strictly lowers the working vector's pivot or forces a fresh advance, so
/// k(v) falls out as the minimum advance count across the basis.
pub struct Equidistribution<G: LinearGenerator> {
    basis: Vec<GeneratorVector<G>>,
    bit_len: u32,
    state_bits: usize,
}

impl<G: LinearGenerator> Equidistribution<G> {
    /// Prepares the reduction for output accuracy `bit_len`
    /// (1..=output word width). The generator's current state is ignored;
    /// the probe is seeded with 1.
    pub fn new(generator: &G, bit_len: u32) -> Self {
        assert!(bit_len >= 1 && bit_len <= G::Output::BITS);
        let state_bits = generator.bit_size();
        let mut basis = Vec::with_capacity(bit_len as usize + 1);
        for i in 0..bit_len {
            basis.push(GeneratorVector::standard_basis(generator, i));
        }
        let mut probe = GeneratorVector::probe(generator);
        probe.next_state(bit_len);
        basis.push(probe);
        Equidistribution {
            basis,
            bit_len,
            state_bits,
        }
    }

    /// k(v) for every v = 1..=bit_len, reusing the reduced basis across
    /// truncation widths.
    pub fn all_dimensions(mut self) -> Result<EquidistResult> {
        let l = self.bit_len as usize;
        let mut dimensions = vec![0; l];
        let mut delta = 0;
        dimensions[l - 1] = self.reduce(self.bit_len)?;
        delta += self.state_bits / l - dimensions[l - 1];
        for v in (1..self.bit_len).rev() {
            self.adjust(v);
            dimensions[v as usize - 1] = self.reduce(v)?;
            delta += self.state_bits / v as usize - dimensions[v as usize - 1];
        }
        Ok(EquidistResult { dimensions, delta })
    }

    /// k(bit_len) alone.
    pub fn dimension(mut self) -> Result<usize> {
        self.reduce(self.bit_len)
    }

    /// One pass of pivot reduction at width `v`. The working vector is
    /// basis slot `v`; every XOR against a basis vector either zeroes the
    /// representative (forcing an advance) or strictly lowers its pivot.
    fn reduce(&mut self, v: u32) -> Result<usize> {
        let work = v as usize;
        let mut pivot = self.basis[work].next.pivot_pos();
        while !self.basis[work].zero {
            let p = match pivot {
                Some(p) if (p as usize) < v as usize => p as usize,
                Some(p) => {
                    return Err(Error::AlgorithmInvariantViolated(format!(
                        "pivot {} outside the {}-bit window",
                        p, v
                    )))
                }
                None => break,
            };
            if self.basis[work].count > self.basis[p].count {
                self.basis.swap(work, p);
            }
            let (head, tail) = self.basis.split_at_mut(work);
            tail[0].add(&head[p])?;
            if self.basis[work].next == G::Output::ZERO {
                self.basis[work].next_state(v);
                pivot = self.basis[work].next.pivot_pos();
            } else {
                let old = p;
                pivot = self.basis[work].next.pivot_pos();
                match pivot {
                    Some(np) if (np as usize) < old => {}
                    _ => {
                        return Err(Error::AlgorithmInvariantViolated(
                            "pivot position did not decrease".to_string(),
                        ))
                    }
                }
            }
        }
        let k = self.basis[..v as usize]
            .iter()
            .map(|b| b.count)
            .min()
            .unwrap_or(0);
        trace!("k({}) = {}", v, k);
        if k > self.state_bits / v as usize {
            return Err(Error::AlgorithmInvariantViolated(format!(
                "k({}) = {} exceeds the bound {}",
                v,
                k,
                self.state_bits / v as usize
            )));
        }
        Ok(k)
    }

    /// Narrows every cached representative to the top `new_len` bits,
    /// re-advancing any that become zero.
    fn adjust(&mut self, new_len: u32) {
        let mask = G::Output::mask_high(new_len);
        for vector in self.basis.iter_mut() {
            vector.next &= mask;
            if vector.next == G::Output::ZERO {
                vector.next_state(new_len);
            }
        }
    }
}

/// Convenience wrapper: the full dimension profile and total defect of a
/// generator at every accuracy up to its output width.
pub fn equidistribution<G: LinearGenerator>(generator: &G) -> Result<EquidistResult> {
    Equidistribution::new(generator, G::Output::BITS).all_dimensions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::tinymt::TinyMt32;

    #[test]
    pub fn tinymt_delta_is_zero() {
        let g = TinyMt32::new_reference();
        let result = equidistribution(&g).unwrap();
        assert_eq!(result.dimensions.len(), 32);
        for (i, &k) in result.dimensions.iter().enumerate() {
            assert_eq!(k, 127 / (i + 1));
        }
        assert_eq!(result.delta, 0);
    }

    // A generator whose truncated output ignores the mask. The reduction
    // must reject its out-of-window pivots instead of looping.
    #[derive(Clone)]
    struct BadMask(TinyMt32);

    impl Generator for BadMask {
        type Output = u32;
        fn generate(&mut self) -> u32 {
            self.0.generate()
        }
        fn seed(&mut self, value: u32) {
            self.0.seed(value);
        }
        fn bit_size(&self) -> usize {
            self.0.bit_size()
        }
    }

    impl LinearGenerator for BadMask {
        fn generate_high(&mut self, _bit_len: u32) -> u32 {
            self.0.generate() | 1
        }
        fn combine(&mut self, other: &Self) -> Result<()> {
            self.0.combine(&other.0)
        }
        fn set_zero(&mut self) {
            self.0.set_zero();
        }
        fn is_zero(&self) -> bool {
            self.0.is_zero()
        }
    }

    #[test]
    pub fn unmasked_output_is_rejected() {
        let g = BadMask(TinyMt32::new_reference());
        let err = Equidistribution::new(&g, 8).dimension().unwrap_err();
        assert!(matches!(err, Error::AlgorithmInvariantViolated(_)));
    }

    #[test]
    pub fn incremental_matches_fresh() {
        let g = TinyMt32::new(0xfc82ff1f, 0x8f7011ee, 0x9cd5f3c8);
        let incremental = Equidistribution::new(&g, 16).all_dimensions().unwrap();
        for v in 1..=16u32 {
            let fresh = Equidistribution::new(&g, v).dimension().unwrap();
            assert_eq!(incremental.dimensions[v as usize - 1], fresh);
        }
    }
}
