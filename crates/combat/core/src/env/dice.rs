//! Dice notation (`NdS+K`) used by weapon damage definitions.

use std::fmt;
use std::str::FromStr;

use super::Dice;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiceParseError {
    #[error("empty dice expression")]
    Empty,
    #[error("invalid dice expression '{0}'")]
    Invalid(String),
}

/// `count` dice of `sides` faces plus a flat `bonus`. `sides == 0` is a flat value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DiceExpr {
    /// Largest dice count accepted from text.
    pub const MAX_COUNT: u32 = 100;
    /// Largest die accepted from text.
    pub const MAX_SIDES: u32 = 1000;

    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    pub const fn flat(value: i32) -> Self {
        Self::new(0, 0, value)
    }

    /// Rolls the expression. Never negative.
    pub fn roll(&self, dice: &mut Dice<'_>) -> u32 {
        let total = dice.sum(self.count, self.sides) as i64 + self.bonus as i64;
        total.max(0) as u32
    }

    pub fn min(&self) -> u32 {
        let sides_min = if self.sides == 0 { 0 } else { self.count };
        (sides_min as i64 + self.bonus as i64).max(0) as u32
    }

    pub fn max(&self) -> u32 {
        (self.count as i64 * self.sides as i64 + self.bonus as i64).max(0) as u32
    }
}

impl FromStr for DiceExpr {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Err(DiceParseError::Empty);
        }
        let invalid = || DiceParseError::Invalid(s.to_string());

        let (dice_part, bonus) = match text.rfind(['+', '-']) {
            Some(idx) if idx > 0 => {
                let bonus: i32 = text[idx..].parse().map_err(|_| invalid())?;
                (&text[..idx], bonus)
            }
            _ => (text.as_str(), 0),
        };

        let Some((count, sides)) = dice_part.split_once(['d', 'D']) else {
            let value: i32 = dice_part.parse().map_err(|_| invalid())?;
            return value.checked_add(bonus).map(Self::flat).ok_or_else(invalid);
        };

        let count = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };
        let sides: u32 = sides.parse().map_err(|_| invalid())?;
        if sides == 0 || sides > Self::MAX_SIDES || count > Self::MAX_COUNT {
            return Err(invalid());
        }

        Ok(Self::new(count, sides, bonus))
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiceExpr> for String {
    fn from(value: DiceExpr) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sides == 0 {
            return write!(f, "{}", self.bonus);
        }
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{}", b),
            b => write!(f, "{}", b),
        }
    }
}
