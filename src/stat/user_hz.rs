use std::{
    ops::{Add, Div, Sub},
    str::FromStr,
};

/// an amount of cpu time, in units of `USER_HZ` (typically hundredths of a second).
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    pub const ZERO: Self = Self(0);

    pub fn new(hz: u64) -> Self {
        Self(hz)
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for UserHz {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}

/// counters may move backwards, so subtraction saturates at zero.
impl Sub for UserHz {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_sub(rhs))
    }
}

impl Div for UserHz {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        let to_float = |Self(hz)| hz as f64;
        let (lhs, rhs) = (to_float(self), to_float(rhs));

        lhs / rhs
    }
}
