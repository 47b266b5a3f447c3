use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Area of financial information a customer can review and be rewarded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreCategory {
    DirectDebits,
    StandingOrders,
    Incomes,
    ContactDetails,
    /// Aggregate over the four primary categories. Only ever a badge target.
    All,
}

impl ScoreCategory {
    pub const PRIMARY: [ScoreCategory; 4] = [
        ScoreCategory::DirectDebits,
        ScoreCategory::StandingOrders,
        ScoreCategory::Incomes,
        ScoreCategory::ContactDetails,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::DirectDebits => "DD",
            Self::StandingOrders => "SO",
            Self::Incomes => "IN",
            Self::ContactDetails => "CD",
            Self::All => "ALL",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DirectDebits => "Direct Debits",
            Self::StandingOrders => "Standing Orders",
            Self::Incomes => "Incomes",
            Self::ContactDetails => "Contact Details",
            Self::All => "All Categories",
        }
    }

    pub fn is_primary(self) -> bool {
        !matches!(self, Self::All)
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown score category code '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for ScoreCategory {
    type Err = UnknownCategory;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::PRIMARY
            .into_iter()
            .chain([Self::All])
            .find(|category| category.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| UnknownCategory(code.to_string()))
    }
}

impl Serialize for ScoreCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScoreCategory", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("name", self.name())?;
        state.end()
    }
}

/// Tier of a badge family; higher levels need more scoring events.
pub type BadgeLevel = u8;

/// Badge definition: one per (category, level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BadgeType {
    pub code: &'static str,
    pub name: &'static str,
    pub category: ScoreCategory,
    pub level: BadgeLevel,
}

const STANDARD_BADGES: [BadgeType; 15] = [
    badge("DD1", "Direct Debit Checker", ScoreCategory::DirectDebits, 1),
    badge("DD2", "Direct Debit Pro", ScoreCategory::DirectDebits, 2),
    badge("DD3", "Direct Debit Wizard", ScoreCategory::DirectDebits, 3),
    badge("SO1", "Standing Order Checker", ScoreCategory::StandingOrders, 1),
    badge("SO2", "Standing Order Pro", ScoreCategory::StandingOrders, 2),
    badge("SO3", "Standing Order Wizard", ScoreCategory::StandingOrders, 3),
    badge("IN1", "Income Checker", ScoreCategory::Incomes, 1),
    badge("IN2", "Income Pro", ScoreCategory::Incomes, 2),
    badge("IN3", "Income Wizard", ScoreCategory::Incomes, 3),
    badge("CD1", "Contact Details Checker", ScoreCategory::ContactDetails, 1),
    badge("CD2", "Contact Details Pro", ScoreCategory::ContactDetails, 2),
    badge("CD3", "Contact Details Wizard", ScoreCategory::ContactDetails, 3),
    badge("ALL1", "Account Checker", ScoreCategory::All, 1),
    badge("ALL2", "Account Pro", ScoreCategory::All, 2),
    badge("ALL3", "Account Guru", ScoreCategory::All, 3),
];

const fn badge(
    code: &'static str,
    name: &'static str,
    category: ScoreCategory,
    level: BadgeLevel,
) -> BadgeType {
    BadgeType {
        code,
        name,
        category,
        level,
    }
}

/// Read-only registry of categories and badges, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    badges: Vec<BadgeType>,
    by_code: HashMap<&'static str, usize>,
    by_tier: HashMap<(ScoreCategory, BadgeLevel), usize>,
}

impl Catalog {
    pub fn standard() -> Self {
        Self::from_badges(STANDARD_BADGES.to_vec())
    }

    fn from_badges(badges: Vec<BadgeType>) -> Self {
        let by_code = badges
            .iter()
            .enumerate()
            .map(|(index, badge)| (badge.code, index))
            .collect();
        let by_tier = badges
            .iter()
            .enumerate()
            .map(|(index, badge)| ((badge.category, badge.level), index))
            .collect();

        Self {
            badges,
            by_code,
            by_tier,
        }
    }

    pub fn badges(&self) -> &[BadgeType] {
        &self.badges
    }

    pub fn badge(&self, code: &str) -> Option<BadgeType> {
        self.by_code.get(code).map(|index| self.badges[*index])
    }

    pub fn badge_for(&self, category: ScoreCategory, level: BadgeLevel) -> Option<BadgeType> {
        self.by_tier
            .get(&(category, level))
            .map(|index| self.badges[*index])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
