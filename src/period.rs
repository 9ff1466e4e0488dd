use log::debug;

use crate::generator::{Generator, LinearGenerator, ReducibleGenerator};
use crate::gf2x::{berlekamp_massey, is_irreducible, pow_x_mod, Gf2Poly};
use crate::util::Word;

/// Exponents of the known Mersenne primes.
pub const MERSENNE_EXPONENTS: &[u32] = &[
    2, 3, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521, 607, 1279, 2203, 2281, 3217, 4253, 4423,
    9689, 9941, 11213, 19937, 21701, 23209, 44497, 86243, 110503, 132049, 216091, 756839, 859433,
    1257787, 1398269, 2976221, 3021377, 6972593, 13466917, 20996011, 24036583, 25964951,
];

/// Prime factors of 2^128 - 1.
pub const PRIME_FACTORS_2_128_1: &[u64] = &[
    3,
    5,
    17,
    257,
    641,
    65537,
    274177,
    6700417,
    67280421310721,
];

#[inline]
pub fn is_mersenne_exponent(degree: usize) -> bool {
    MERSENNE_EXPONENTS.binary_search(&(degree as u32)).is_ok()
}

/// Minimal polynomial of the bit stream at output position `pos`
/// (counted from the LSB), from 2 * bit_size successive outputs of the
/// generator's current state.
pub fn minpoly<G: Generator>(g: &mut G, pos: u32) -> Gf2Poly {
    let n = g.bit_size();
    let mut seq = Vec::with_capacity(2 * n);
    for _ in 0..2 * n {
        seq.push((g.generate().to_u64() >> pos) & 1 == 1);
    }
    berlekamp_massey(&seq)
}

/// Characteristic polynomial as the LCM of the minimal polynomials over
/// every output bit position, stopping early once the state size is
/// reached.
pub fn characteristic_polynomial<G: LinearGenerator>(g: &G) -> Gf2Poly {
    let bit_size = g.bit_size();
    let mut lcm = Gf2Poly::one();
    for pos in 0..G::Output::BITS {
        let mut gen = g.clone();
        let poly = minpoly(&mut gen, pos);
        lcm = lcm.lcm(&poly);
        if lcm.degree() == Some(bit_size) {
            break;
        }
    }
    lcm
}

/// Characteristic polynomial of a reducible generator. Falls back to
/// sweeping single-bit initial states when the output positions of the
/// seeded state do not reach the full degree.
pub fn reducible_characteristic_polynomial<G: ReducibleGenerator>(g: &G) -> Gf2Poly {
    let bit_size = g.bit_size();
    let mut lcm = characteristic_polynomial(g);
    if lcm.degree() == Some(bit_size) {
        return lcm;
    }
    debug!(
        "lcm degree {:?} short of {}, sweeping unit states",
        lcm.degree(),
        bit_size
    );
    for bit in 0..bit_size {
        for pos in 0..G::Output::BITS {
            let mut gen = g.clone();
            gen.set_one_bit(bit);
            let poly = minpoly(&mut gen, pos);
            lcm = lcm.lcm(&poly);
            if lcm.degree() == Some(bit_size) {
                return lcm;
            }
        }
    }
    lcm
}

/// Primitivity test for the characteristic polynomial of a full-period
/// generator.
#[derive(Clone, Debug)]
pub struct Primitivity {
    /// Prime factors of 2^degree - 1, or `None` when the degree is a
    /// Mersenne exponent and irreducibility alone settles primitivity.
    factors: Option<Vec<u64>>,
}

impl Primitivity {
    /// For degrees that are Mersenne exponents: 2^degree - 1 is prime, so
    /// every irreducible polynomial of that degree is primitive.
    pub fn mersenne() -> Self {
        Primitivity { factors: None }
    }

    /// For other degrees, with the prime factors of 2^degree - 1 supplied
    /// by the caller.
    pub fn with_prime_factors(factors: &[u64]) -> Self {
        Primitivity {
            factors: Some(factors.to_vec()),
        }
    }

    pub fn is_primitive(&self, degree: usize, poly: &Gf2Poly) -> bool {
        if poly.degree() != Some(degree) {
            return false;
        }
        if !is_irreducible(poly) {
            return false;
        }
        match &self.factors {
            None => {
                debug_assert!(is_mersenne_exponent(degree));
                true
            }
            Some(factors) => {
                let order = ones_limbs(degree);
                for &p in factors {
                    let exponent = div_limbs(&order, p);
                    if pow_x_mod(&exponent, poly).is_one() {
                        return false;
                    }
                }
                true
            }
        }
    }
}

// 2^d - 1 as little-endian limbs.
fn ones_limbs(d: usize) -> Vec<u64> {
    let mut limbs = vec![u64::MAX; d / 64];
    if d % 64 != 0 {
        limbs.push((1u64 << (d % 64)) - 1);
    }
    limbs
}

fn div_limbs(limbs: &[u64], divisor: u64) -> Vec<u64> {
    let mut quot = vec![0u64; limbs.len()];
    let mut rem: u128 = 0;
    for i in (0..limbs.len()).rev() {
        let cur = (rem << 64) | limbs[i] as u128;
        quot[i] = (cur / divisor as u128) as u64;
        rem = cur % divisor as u128;
    }
    debug_assert_eq!(rem, 0, "not a factor of the order");
    quot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gf2x::has_factor_of_degree;
    use crate::rlittle::RLittle32;
    use crate::tinymt::TinyMt32;

    #[test]
    pub fn tinymt_minimal_polynomial() {
        let mut g = TinyMt32::new_reference();
        g.seed(1234);
        let poly = minpoly(&mut g, 0);
        assert_eq!(poly.degree(), Some(127));
        assert!(is_irreducible(&poly));
        assert!(Primitivity::mersenne().is_primitive(127, &poly));
    }

    #[test]
    pub fn rlittle_factor_of_degree() {
        let mut g = RLittle32::new(0x80903834, 7, 1, 31, 26, 26);
        g.seed(1234);
        let poly = minpoly(&mut g.clone(), 0);
        assert!(has_factor_of_degree(&poly, 521).is_some());

        let mut g = RLittle32::new(0xed6fdaa7, 7, 5, 27, 9, 12);
        g.seed(1234);
        let poly = minpoly(&mut g.clone(), 0);
        assert!(has_factor_of_degree(&poly, 521).is_none());
    }

    #[test]
    pub fn factors_of_2_128_1() {
        let product = PRIME_FACTORS_2_128_1
            .iter()
            .fold(1u128, |acc, &p| acc * p as u128);
        assert_eq!(product, u128::MAX);
    }

    #[test]
    pub fn limb_division() {
        // (2^68 - 1) / 5
        let q = div_limbs(&ones_limbs(68), 5);
        // 5 * q + 0 == 2^68 - 1
        let mut check = [0u64; 2];
        let mut carry: u128 = 0;
        for i in 0..2 {
            let v = q[i] as u128 * 5 + carry;
            check[i] = v as u64;
            carry = v >> 64;
        }
        assert_eq!(check[0], u64::MAX);
        assert_eq!(check[1], 0xf);
    }

    #[test]
    pub fn primitivity_with_factors() {
        // x^8 + x^4 + x^3 + x^2 + 1 is primitive over GF(2)
        let mut p = Gf2Poly::zero();
        for i in [0usize, 2, 3, 4, 8] {
            p.set_coeff(i, true);
        }
        // x^8 + x^4 + x^3 + x + 1 is irreducible but x has order 51
        let mut q = Gf2Poly::zero();
        for i in [0usize, 1, 3, 4, 8] {
            q.set_coeff(i, true);
        }
        let primitivity = Primitivity::with_prime_factors(&[3, 5, 17]);
        assert!(primitivity.is_primitive(8, &p));
        assert!(!primitivity.is_primitive(8, &q));
        assert!(!primitivity.is_primitive(7, &p));
    }
}
