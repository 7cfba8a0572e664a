use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Age bracket of the taxpayer. Only the old regime looks at it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    #[default]
    Below60,
    Between60And80,
    Above80,
}

impl AgeGroup {
    pub fn all() -> &'static [AgeGroup] {
        &[AgeGroup::Below60, AgeGroup::Between60And80, AgeGroup::Above80]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Below60 => "below60",
            Self::Between60And80 => "between60and80",
            Self::Above80 => "above80",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "below60" => Some(Self::Below60),
            "between60and80" => Some(Self::Between60And80),
            "above80" => Some(Self::Above80),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Below60 => "Below 60 years",
            Self::Between60And80 => "60-80 years",
            Self::Above80 => "Above 80 years",
        }
    }

    /// Basic exemption subtracted before the old-regime slabs are applied.
    pub fn old_regime_exemption(&self) -> Decimal {
        match self {
            Self::Below60 => dec!(250000),
            Self::Between60And80 => dec!(300000),
            Self::Above80 => dec!(500000),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_variant() {
        for group in AgeGroup::all() {
            assert_eq!(AgeGroup::parse(group.as_str()), Some(*group));
        }
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(AgeGroup::parse(" Between60And80 "), Some(AgeGroup::Between60And80));
    }

    #[test]
    fn parse_rejects_unknown_value() {
        assert_eq!(AgeGroup::parse("teen"), None);
    }

    #[test]
    fn exemption_grows_with_age() {
        assert_eq!(AgeGroup::Below60.old_regime_exemption(), dec!(250000));
        assert_eq!(AgeGroup::Between60And80.old_regime_exemption(), dec!(300000));
        assert_eq!(AgeGroup::Above80.old_regime_exemption(), dec!(500000));
    }
}
