/// Display bucket of a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Favorable,
    Caution,
    Adverse,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskTier::Favorable,
            30..=59 => RiskTier::Caution,
            _ => RiskTier::Adverse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Favorable => "favorable",
            RiskTier::Caution => "caution",
            RiskTier::Adverse => "adverse",
        }
    }

    /// Traffic-light marker used on score cards.
    pub fn marker(&self) -> &'static str {
        match self {
            RiskTier::Favorable => "🟢",
            RiskTier::Caution => "🟡",
            RiskTier::Adverse => "🔴",
        }
    }

    /// Prefix for recommendation banners.
    pub fn verdict_icon(&self) -> &'static str {
        match self {
            RiskTier::Favorable => "✅",
            RiskTier::Caution => "⚠️",
            RiskTier::Adverse => "🚫",
        }
    }
}
