use log::{debug, info};
use rand_core::RngCore;

use crate::error::{Error, Result};
use crate::generator::{Generator, ReducibleGenerator, SearchableGenerator};
use crate::gf2x::{has_factor_of_degree, Gf2Poly};
use crate::period::{minpoly, Primitivity};
use crate::util::Word;

/// Searches recursion parameters giving a generator the maximal period
/// 2^bit_size - 1: random parameter draws are kept when the minimal
/// polynomial reaches the full state degree and is primitive.
pub struct RecursionSearch<'a, G: SearchableGenerator> {
    rand: &'a mut G,
    source: &'a mut dyn RngCore,
    primitivity: Primitivity,
    poly: Gf2Poly,
    count: usize,
}

impl<'a, G: SearchableGenerator> RecursionSearch<'a, G> {
    /// For generators whose state size is a Mersenne exponent.
    pub fn new(rand: &'a mut G, source: &'a mut dyn RngCore) -> Self {
        RecursionSearch {
            rand,
            source,
            primitivity: Primitivity::mersenne(),
            poly: Gf2Poly::zero(),
            count: 0,
        }
    }

    pub fn with_primitivity(
        rand: &'a mut G,
        source: &'a mut dyn RngCore,
        primitivity: Primitivity,
    ) -> Self {
        RecursionSearch {
            rand,
            source,
            primitivity,
            poly: Gf2Poly::zero(),
            count: 0,
        }
    }

    /// Draws parameters up to `try_count` times. On success the generator
    /// keeps the found parameters.
    pub fn start(&mut self, try_count: usize) -> Result<()> {
        let size = self.rand.bit_size();
        for _ in 0..try_count {
            self.rand.randomize_params(self.source);
            self.rand.seed(G::Output::ONE);
            self.count += 1;
            let poly = minpoly(self.rand, 0);
            if poly.degree() != Some(size) {
                debug!("try {}: degree {:?}", self.count, poly.degree());
                continue;
            }
            if self.primitivity.is_primitive(size, &poly) {
                info!("found at try {}: {}", self.count, self.rand.param_string());
                self.poly = poly;
                return Ok(());
            }
        }
        Err(Error::SearchExhausted { tries: self.count })
    }

    pub fn minimal_polynomial(&self) -> &Gf2Poly {
        &self.poly
    }

    pub fn tries(&self) -> usize {
        self.count
    }
}

/// Parameter search for reducible generators: a draw is kept when the
/// minimal polynomial has an irreducible factor of degree exactly mexp,
/// which then carries a period divisible by 2^mexp - 1.
pub struct ReducibleRecursionSearch<'a, G: ReducibleGenerator + SearchableGenerator> {
    rand: &'a mut G,
    source: &'a mut dyn RngCore,
    poly: Gf2Poly,
    factor: Gf2Poly,
    count: usize,
}

impl<'a, G: ReducibleGenerator + SearchableGenerator> ReducibleRecursionSearch<'a, G> {
    pub fn new(rand: &'a mut G, source: &'a mut dyn RngCore) -> Self {
        ReducibleRecursionSearch {
            rand,
            source,
            poly: Gf2Poly::zero(),
            factor: Gf2Poly::zero(),
            count: 0,
        }
    }

    pub fn start(&mut self, try_count: usize) -> Result<()> {
        let mexp = self.rand.mexp();
        for _ in 0..try_count {
            self.rand.randomize_params(self.source);
            self.rand.seed(G::Output::ONE);
            self.count += 1;
            let poly = minpoly(self.rand, 0);
            match poly.degree() {
                Some(d) if d >= mexp => {}
                d => {
                    debug!("try {}: degree {:?}", self.count, d);
                    continue;
                }
            }
            if let Some(factor) = has_factor_of_degree(&poly, mexp) {
                info!("found at try {}: {}", self.count, self.rand.param_string());
                self.poly = poly;
                self.factor = factor;
                return Ok(());
            }
        }
        Err(Error::SearchExhausted { tries: self.count })
    }

    /// Minimal polynomial of the found parameters.
    pub fn minimal_polynomial(&self) -> &Gf2Poly {
        &self.poly
    }

    /// The degree-mexp irreducible factor.
    pub fn irreducible_factor(&self) -> &Gf2Poly {
        &self.factor
    }

    pub fn tries(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::MersenneTwister;
    use crate::tinymt::TinyMt32;

    // Galois LFSR over 8 bits with a randomizable feedback mask. The top
    // mask bit is forced so the transition stays invertible; every monic
    // degree-8 characteristic polynomial with constant term 1 is reachable.
    #[derive(Clone)]
    struct Lfsr8 {
        state: u16,
        mask: u16,
    }

    impl Generator for Lfsr8 {
        type Output = u16;
        fn generate(&mut self) -> u16 {
            let out = self.state & 1;
            self.state >>= 1;
            if out == 1 {
                self.state ^= self.mask;
            }
            self.state
        }
        fn seed(&mut self, value: u16) {
            self.state = value & 0xff;
            if self.state == 0 {
                self.state = 1;
            }
        }
        fn bit_size(&self) -> usize {
            8
        }
    }

    impl SearchableGenerator for Lfsr8 {
        fn randomize_params(&mut self, rng: &mut dyn RngCore) {
            self.mask = (rng.next_u32() as u16 & 0x7f) | 0x80;
        }
        fn param_string(&self) -> String {
            format!("mask:{:02x}", self.mask)
        }
    }

    #[test]
    pub fn tinymt_parameter_search() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = TinyMt32::new(0, 0, 0);
        let mut source = MersenneTwister::new(1234);
        let mut search = RecursionSearch::new(&mut g, &mut source);
        search.start(10000).unwrap();
        assert!(search.tries() > 0);
        assert_eq!(search.minimal_polynomial().degree(), Some(127));
        let params = g.param_string();
        assert!(params.contains("mat1"));
    }

    #[test]
    pub fn non_mersenne_search_with_factors() {
        // degree 8 is not a Mersenne exponent: 2^8 - 1 = 3 * 5 * 17
        let mut g = Lfsr8 { state: 1, mask: 0 };
        let mut source = MersenneTwister::new(1234);
        let primitivity = Primitivity::with_prime_factors(&[3, 5, 17]);
        let mut search = RecursionSearch::with_primitivity(&mut g, &mut source, primitivity);
        search.start(2000).unwrap();
        assert_eq!(search.minimal_polynomial().degree(), Some(8));
        assert!(crate::gf2x::is_irreducible(search.minimal_polynomial()));
        assert!(g.param_string().contains("mask"));
    }

    #[test]
    pub fn search_exhaustion_is_reported() {
        let mut g = TinyMt32::new(0, 0, 0);
        let mut source = MersenneTwister::new(1234);
        let mut search = RecursionSearch::new(&mut g, &mut source);
        let err = search.start(0).unwrap_err();
        assert!(matches!(err, Error::SearchExhausted { tries: 0 }));
    }
}
