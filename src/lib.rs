//! Design and period certification toolkit for GF(2)-linear pseudorandom
//! number generators.
//!
//! The crate works on opaque generator states through the capability
//! traits in [`generator`]: any generator whose transition and output maps
//! are linear over GF(2) can be measured and tuned without exposing its
//! transition matrix.
//!
//! - [`equidist`] computes dimensions of equidistribution k(v) and the
//!   total defect by incremental lattice basis reduction.
//! - [`parity`] finds the period-certification vector of a reducible
//!   generator and applies the certification rule to seeded states.
//! - [`search`] drives recursion parameter searches (full period and
//!   reducible variants); [`tempering`] tunes output tempering.
//! - [`period`] ties generators to GF(2)[x]: minimal and characteristic
//!   polynomials, primitivity.
//! - [`mt`], [`tinymt`] and [`rlittle`] are reference generators
//!   exercising every capability.

pub mod equidist;
pub mod error;
pub mod generator;
pub mod gf2x;
pub mod linalg;
pub mod linearity;
pub mod mt;
pub mod parity;
pub mod period;
pub mod rlittle;
pub mod search;
pub mod tempering;
pub mod tinymt;
pub mod util;

pub use equidist::{equidistribution, EquidistResult, Equidistribution};
pub use error::{Error, Result};
pub use generator::{
    annihilate, Generator, LinearGenerator, ReducibleGenerator, SearchableGenerator,
    TemperingGenerator,
};
pub use gf2x::{berlekamp_massey, has_factor_of_degree, is_irreducible, Gf2Poly};
pub use linearity::check_linearity;
pub use mt::MersenneTwister;
pub use parity::{certify_period, search_parity};
pub use period::{minpoly, Primitivity};
pub use rlittle::RLittle32;
pub use search::{RecursionSearch, ReducibleRecursionSearch};
pub use tempering::{BestBits, PartialBitPattern, TemperingAlgorithm, TemperingResult, TieBreak};
pub use tinymt::TinyMt32;
pub use util::Word;
