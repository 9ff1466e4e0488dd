use core::fmt;
use core::ops::AddAssign;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polynomial over GF(2). Coefficient of x^i is bit i of the limb vector,
/// least significant limb first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Gf2Poly {
    limbs: Vec<u64>,
}

impl Gf2Poly {
    #[inline]
    pub fn zero() -> Self {
        Gf2Poly { limbs: Vec::new() }
    }

    #[inline]
    pub fn one() -> Self {
        Gf2Poly { limbs: vec![1] }
    }

    #[inline]
    pub fn x() -> Self {
        Gf2Poly { limbs: vec![2] }
    }

    /// x^d.
    pub fn monomial(d: usize) -> Self {
        let mut p = Gf2Poly::zero();
        p.set_coeff(d, true);
        p
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&w| w == 0)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.degree() == Some(0)
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        for (i, &w) in self.limbs.iter().enumerate().rev() {
            if w != 0 {
                return Some(i * 64 + 63 - w.leading_zeros() as usize);
            }
        }
        None
    }

    #[inline]
    pub fn coeff(&self, i: usize) -> bool {
        match self.limbs.get(i / 64) {
            Some(&w) => (w >> (i % 64)) & 1 == 1,
            None => false,
        }
    }

    pub fn set_coeff(&mut self, i: usize, value: bool) {
        let word = i / 64;
        if word >= self.limbs.len() {
            if !value {
                return;
            }
            self.limbs.resize(word + 1, 0);
        }
        let bit = 1u64 << (i % 64);
        if value {
            self.limbs[word] |= bit;
        } else {
            self.limbs[word] &= !bit;
        }
    }

    /// Number of nonzero coefficients.
    pub fn weight(&self) -> usize {
        self.limbs.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn trim(&mut self) {
        while let Some(&0) = self.limbs.last() {
            self.limbs.pop();
        }
    }

    /// Multiplication by x^k.
    pub fn shifted(&self, k: usize) -> Self {
        if self.is_zero() {
            return Gf2Poly::zero();
        }
        let words = k / 64;
        let bits = (k % 64) as u32;
        let mut limbs = vec![0u64; words + self.limbs.len() + 1];
        for (i, &w) in self.limbs.iter().enumerate() {
            limbs[words + i] |= w << bits;
            if bits > 0 {
                limbs[words + i + 1] |= w >> (64 - bits);
            }
        }
        let mut p = Gf2Poly { limbs };
        p.trim();
        p
    }

    pub fn mul(&self, rhs: &Gf2Poly) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Gf2Poly::zero();
        }
        // schoolbook over the set bits of the shorter operand
        let (short, long) = if self.weight() <= rhs.weight() {
            (self, rhs)
        } else {
            (rhs, self)
        };
        let mut acc = Gf2Poly::zero();
        for (i, &w) in short.limbs.iter().enumerate() {
            let mut w = w;
            while w != 0 {
                let b = w.trailing_zeros() as usize;
                acc += &long.shifted(i * 64 + b);
                w &= w - 1;
            }
        }
        acc
    }

    /// Squaring by bit interleaving.
    pub fn square(&self) -> Self {
        let mut limbs = Vec::with_capacity(self.limbs.len() * 2);
        for &w in &self.limbs {
            limbs.push(spread(w as u32));
            limbs.push(spread((w >> 32) as u32));
        }
        let mut p = Gf2Poly { limbs };
        p.trim();
        p
    }

    /// Quotient and remainder.
    pub fn divrem(&self, divisor: &Gf2Poly) -> (Gf2Poly, Gf2Poly) {
        let dd = divisor
            .degree()
            .unwrap_or_else(|| panic!("division by the zero polynomial"));
        let mut rem = self.clone();
        let mut quot = Gf2Poly::zero();
        while let Some(rd) = rem.degree() {
            if rd < dd {
                break;
            }
            let shift = rd - dd;
            quot.set_coeff(shift, true);
            rem += &divisor.shifted(shift);
        }
        rem.trim();
        (quot, rem)
    }

    #[inline]
    pub fn rem(&self, modulus: &Gf2Poly) -> Gf2Poly {
        self.divrem(modulus).1
    }

    #[inline]
    pub fn div(&self, divisor: &Gf2Poly) -> Gf2Poly {
        self.divrem(divisor).0
    }

    pub fn gcd(&self, other: &Gf2Poly) -> Gf2Poly {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let r = a.rem(&b);
            a = b;
            b = r;
        }
        a
    }

    pub fn lcm(&self, other: &Gf2Poly) -> Gf2Poly {
        if self.is_zero() || other.is_zero() {
            return Gf2Poly::zero();
        }
        self.div(&self.gcd(other)).mul(other)
    }
}

impl AddAssign<&Gf2Poly> for Gf2Poly {
    fn add_assign(&mut self, rhs: &Gf2Poly) {
        if rhs.limbs.len() > self.limbs.len() {
            self.limbs.resize(rhs.limbs.len(), 0);
        }
        for (a, &b) in self.limbs.iter_mut().zip(rhs.limbs.iter()) {
            *a ^= b;
        }
        self.trim();
    }
}

impl fmt::Debug for Gf2Poly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.degree() {
            None => write!(f, "0"),
            Some(d) => {
                let mut first = true;
                for i in (0..=d).rev() {
                    if self.coeff(i) {
                        if !first {
                            write!(f, "+")?;
                        }
                        first = false;
                        match i {
                            0 => write!(f, "1")?,
                            1 => write!(f, "x")?,
                            _ => write!(f, "x^{}", i)?,
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Gf2Poly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// Interleaves a zero bit after every bit of w.
#[inline]
fn spread(w: u32) -> u64 {
    let mut x = w as u64;
    x = (x | (x << 16)) & 0x0000_ffff_0000_ffff;
    x = (x | (x << 8)) & 0x00ff_00ff_00ff_00ff;
    x = (x | (x << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// x^(2^k) mod m by repeated modular squaring.
pub fn pow_x_2k_mod(k: usize, m: &Gf2Poly) -> Gf2Poly {
    let mut h = Gf2Poly::x().rem(m);
    for _ in 0..k {
        h = h.square().rem(m);
    }
    h
}

/// x^e mod m, with e given as little-endian u64 limbs.
pub fn pow_x_mod(exponent: &[u64], m: &Gf2Poly) -> Gf2Poly {
    let mut top = None;
    for (i, &w) in exponent.iter().enumerate().rev() {
        if w != 0 {
            top = Some(i * 64 + 63 - w.leading_zeros() as usize);
            break;
        }
    }
    let top = match top {
        Some(t) => t,
        None => return Gf2Poly::one().rem(m),
    };
    let mut acc = Gf2Poly::x().rem(m);
    for i in (0..top).rev() {
        acc = acc.square().rem(m);
        if (exponent[i / 64] >> (i % 64)) & 1 == 1 {
            acc = acc.shifted(1).rem(m);
        }
    }
    acc
}

/// Rabin irreducibility test.
pub fn is_irreducible(f: &Gf2Poly) -> bool {
    let n = match f.degree() {
        Some(n) if n >= 1 => n,
        _ => return false,
    };
    if n == 1 {
        return true;
    }
    // x^(2^n) == x mod f
    let mut h = pow_x_2k_mod(n, f);
    h += &Gf2Poly::x().rem(f);
    if !h.is_zero() {
        return false;
    }
    // no factor of degree n/p for any prime p dividing n
    for p in small_prime_divisors(n) {
        let mut g = pow_x_2k_mod(n / p, f);
        g += &Gf2Poly::x().rem(f);
        if f.gcd(&g).degree() != Some(0) {
            return false;
        }
    }
    true
}

/// Extracts the product of irreducible factors of degree exactly `d`, if it
/// is itself of degree `d` (a single such factor). Degree-one factors are
/// stripped first so that a lone degree-d factor is isolated even when the
/// polynomial also splits off x or x + 1.
pub fn has_factor_of_degree(poly: &Gf2Poly, d: usize) -> Option<Gf2Poly> {
    if poly.degree()? < d {
        return None;
    }
    // gcd with x^(2^d) - x catches all factors of degree dividing d
    let mut h = pow_x_2k_mod(d, poly);
    h += &Gf2Poly::x().rem(poly);
    let mut g = poly.gcd(&h);
    // strip degree-one factors: x^2 + x = x (x + 1)
    let linear = Gf2Poly { limbs: vec![6] };
    loop {
        let common = g.gcd(&linear);
        match common.degree() {
            Some(cd) if cd >= 1 => g = g.div(&common),
            _ => break,
        }
    }
    if g.degree() == Some(d) && is_irreducible(&g) {
        Some(g)
    } else {
        None
    }
}

/// Minimal LFSR (connection) polynomial of a GF(2) sequence, returned in
/// the monic characteristic-polynomial orientation: the reciprocal of the
/// Berlekamp-Massey connection polynomial.
pub fn berlekamp_massey(seq: &[bool]) -> Gf2Poly {
    let mut c = Gf2Poly::one();
    let mut b = Gf2Poly::one();
    let mut l: usize = 0;
    let mut m: usize = 1;
    for i in 0..seq.len() {
        let mut d = seq[i];
        for j in 1..=l {
            if c.coeff(j) && seq[i - j] {
                d = !d;
            }
        }
        if !d {
            m += 1;
        } else if 2 * l <= i {
            let t = c.clone();
            c += &b.shifted(m);
            b = t;
            l = i + 1 - l;
            m = 1;
        } else {
            c += &b.shifted(m);
            m += 1;
        }
    }
    let mut min = Gf2Poly::zero();
    for j in 0..=l {
        if c.coeff(j) {
            min.set_coeff(l - j, true);
        }
    }
    min
}

fn small_prime_divisors(mut n: usize) -> Vec<usize> {
    let mut primes = Vec::new();
    let mut p = 2;
    while p * p <= n {
        if n % p == 0 {
            primes.push(p);
            while n % p == 0 {
                n /= p;
            }
        }
        p += 1;
    }
    if n > 1 {
        primes.push(n);
    }
    primes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(bits: u64) -> Gf2Poly {
        let mut p = Gf2Poly::zero();
        for i in 0..64 {
            if (bits >> i) & 1 == 1 {
                p.set_coeff(i, true);
            }
        }
        p
    }

    #[test]
    pub fn arithmetic() {
        // (x + 1)^2 = x^2 + 1
        let a = poly(0b11);
        assert_eq!(a.mul(&a), poly(0b101));
        assert_eq!(a.square(), poly(0b101));
        // (x^2 + 1) / (x + 1) = x + 1, rem 0
        let (q, r) = poly(0b101).divrem(&a);
        assert_eq!(q, a);
        assert!(r.is_zero());
        // gcd(x^2 + x, x^2 + 1) = x + 1
        assert_eq!(poly(0b110).gcd(&poly(0b101)), poly(0b11));
        assert_eq!(poly(0b11).lcm(&poly(0b110)), poly(0b110));
        assert_eq!(poly(0b1011).degree(), Some(3));
        assert_eq!(Gf2Poly::zero().degree(), None);
        assert_eq!(Gf2Poly::monomial(130).degree(), Some(130));
    }

    #[test]
    pub fn irreducibility() {
        // x^4 + x + 1 is irreducible, x^4 + x^2 + 1 = (x^2 + x + 1)^2 is not
        assert!(is_irreducible(&poly(0b10011)));
        assert!(!is_irreducible(&poly(0b10101)));
        // x^8 + x^4 + x^3 + x + 1 (the Rijndael modulus) is irreducible
        assert!(is_irreducible(&poly(0x11b)));
        assert!(!is_irreducible(&poly(0b110)));
        assert!(!is_irreducible(&Gf2Poly::zero()));
    }

    #[test]
    pub fn factor_of_degree() {
        // x (x + 1) (x^4 + x + 1)
        let f = poly(0b110).mul(&poly(0b10011));
        let g = has_factor_of_degree(&f, 4).unwrap();
        assert_eq!(g, poly(0b10011));
        // two distinct degree-4 factors make the gcd degree 8, not 4
        let f = poly(0b10011).mul(&poly(0b11001));
        assert!(has_factor_of_degree(&f, 4).is_none());
        assert!(has_factor_of_degree(&poly(0b10011), 5).is_none());
    }

    #[test]
    pub fn minimal_polynomial_of_lfsr() {
        // sequence generated by s_{n+4} = s_{n+1} + s_n (x^4 + x + 1)
        let f = poly(0b10011);
        let mut s = vec![true, false, false, false];
        for i in 4..16 {
            let bit = s[i - 4] ^ s[i - 3];
            s.push(bit);
        }
        assert_eq!(berlekamp_massey(&s), f);
        // constant zero sequence has minimal polynomial 1
        assert_eq!(berlekamp_massey(&[false; 8]), Gf2Poly::one());
    }

    #[test]
    pub fn exponentiation() {
        let f = poly(0b10011);
        // order of x modulo x^4 + x + 1 is 15
        assert_eq!(pow_x_mod(&[15], &f), Gf2Poly::one());
        assert!(pow_x_mod(&[5], &f) != Gf2Poly::one());
        assert_eq!(pow_x_mod(&[1], &f), Gf2Poly::x());
        assert_eq!(pow_x_2k_mod(4, &f), Gf2Poly::x());
    }
}
