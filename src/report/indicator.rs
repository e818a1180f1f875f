//! Turns a day bucket into what the small surfaces show. The toolbar badge and the popup colour
//! the same percentage with different thresholds; they are kept as two separate policies.

use crate::{
    daemon::storage::entities::DayBucket,
    utils::percentage::{productive_percentage, Percentage},
};

pub const GOOD_COLOR: &str = "#4CAF50";
pub const WARN_COLOR: &str = "#FFC107";
pub const BAD_COLOR: &str = "#F44336";
pub const NEUTRAL_COLOR: &str = "#e0e0e0";

const BADGE_GOOD_FROM: u32 = 50;
const POPUP_GOOD_FROM: u32 = 70;
const POPUP_WARN_FROM: u32 = 40;

/// Toolbar badge. Empty text clears the badge; `color` is left as is when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<&'static str>,
}

impl Badge {
    pub fn cleared() -> Self {
        Self {
            text: String::new(),
            color: None,
        }
    }

    pub fn for_bucket(bucket: &DayBucket) -> Self {
        match productive_percentage(bucket.productive_seconds, bucket.unproductive_seconds) {
            None => Self::cleared(),
            Some(percentage) => Self {
                text: percentage.to_string(),
                color: Some(if *percentage >= BADGE_GOOD_FROM {
                    GOOD_COLOR
                } else {
                    BAD_COLOR
                }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Good,
    Warn,
    Bad,
    /// Nothing tracked yet.
    Empty,
}

impl Tier {
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Good => GOOD_COLOR,
            Tier::Warn => WARN_COLOR,
            Tier::Bad => BAD_COLOR,
            Tier::Empty => NEUTRAL_COLOR,
        }
    }
}

/// Progress bar of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupProgress {
    pub percentage: Option<Percentage>,
    pub tier: Tier,
    pub label: String,
}

impl PopupProgress {
    pub fn for_bucket(bucket: &DayBucket) -> Self {
        match productive_percentage(bucket.productive_seconds, bucket.unproductive_seconds) {
            None => Self {
                percentage: None,
                tier: Tier::Empty,
                label: "No data today".into(),
            },
            Some(percentage) => Self {
                percentage: Some(percentage),
                tier: popup_tier(percentage),
                label: format!("{percentage} Productive"),
            },
        }
    }
}

fn popup_tier(percentage: Percentage) -> Tier {
    if *percentage >= POPUP_GOOD_FROM {
        Tier::Good
    } else if *percentage >= POPUP_WARN_FROM {
        Tier::Warn
    } else {
        Tier::Bad
    }
}
