use crate::error::Result;
use crate::generator::LinearGenerator;
use crate::util::Word;

const SAMPLES: usize = 100;

// s + s = 0, so the sum of a state with itself must output zeros forever.
fn self_cancels<G: LinearGenerator>(g: &G) -> Result<bool> {
    let mut sum = g.clone();
    sum.combine(g)?;
    for _ in 0..SAMPLES {
        if sum.generate() != G::Output::ZERO {
            return Ok(false);
        }
    }
    Ok(true)
}

// The output stream of a sum of states must be the XOR of the streams.
fn streams_add<G: LinearGenerator>(g1: &mut G, g2: &mut G) -> Result<bool> {
    let mut g3 = g2.clone();
    g3.combine(g1)?;
    for _ in 0..SAMPLES {
        if g1.generate() ^ g2.generate() != g3.generate() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks that a generator's transition and output maps really are
/// GF(2)-linear, by comparing output streams of combined states. A
/// generator that fails this check cannot be analyzed by the reduction
/// engines.
pub fn check_linearity<G: LinearGenerator>(generator: &G) -> Result<bool> {
    let mut g1 = generator.clone();
    let mut g2 = generator.clone();
    g1.seed(G::Output::from_u64(1234));
    g2.seed(G::Output::from_u64(4321));
    Ok(self_cancels(&g1)? && streams_add(&mut g1, &mut g2)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::MersenneTwister;
    use crate::rlittle::RLittle32;
    use crate::tinymt::TinyMt32;

    #[test]
    pub fn reference_generators_are_linear() {
        assert!(check_linearity(&TinyMt32::new_reference()).unwrap());
        assert!(check_linearity(&MersenneTwister::new(1234)).unwrap());
        assert!(check_linearity(&RLittle32::new_reference()).unwrap());
    }
}
