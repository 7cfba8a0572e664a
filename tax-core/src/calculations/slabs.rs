//! Marginal-rate slab tables and the progressive computation over them.
//!
//! Each [`Slab`] taxes only the part of an amount that falls inside its band.
//! Tables must be sorted by `lower` and contiguous, with an open-ended last
//! band.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A contiguous income band taxed at a fixed marginal rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    pub lower: Decimal,
    /// Upper bound, or `None` for the top band.
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

impl Slab {
    const fn new(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self { lower, upper, rate }
    }

    /// Portion of `amount` that falls inside this band.
    fn portion_of(
        &self,
        amount: Decimal,
    ) -> Decimal {
        if amount <= self.lower {
            return Decimal::ZERO;
        }
        let top = match self.upper {
            Some(upper) => amount.min(upper),
            None => amount,
        };
        top - self.lower
    }
}

/// Old-regime bands, applied to income left after the age exemption.
pub const OLD_REGIME_SLABS: &[Slab] = &[
    Slab::new(dec!(0), Some(dec!(250000)), dec!(0)),
    Slab::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
    Slab::new(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
    Slab::new(dec!(1000000), None, dec!(0.30)),
];

/// New-regime bands, applied to the full taxable income.
pub const NEW_REGIME_SLABS: &[Slab] = &[
    Slab::new(dec!(0), Some(dec!(400000)), dec!(0)),
    Slab::new(dec!(400000), Some(dec!(800000)), dec!(0.05)),
    Slab::new(dec!(800000), Some(dec!(1200000)), dec!(0.10)),
    Slab::new(dec!(1200000), Some(dec!(1600000)), dec!(0.15)),
    Slab::new(dec!(1600000), Some(dec!(2000000)), dec!(0.20)),
    Slab::new(dec!(2000000), Some(dec!(2400000)), dec!(0.25)),
    Slab::new(dec!(2400000), None, dec!(0.30)),
];

/// Sums the tax each band levies on its share of `amount`.
pub fn apply_slabs(
    amount: Decimal,
    slabs: &[Slab],
) -> Decimal {
    slabs
        .iter()
        .map(|slab| slab.portion_of(amount) * slab.rate)
        .sum()
}
