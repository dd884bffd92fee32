use crate::error::DomainError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

/// A review score, guaranteed to lie in `MIN_RATING..=MAX_RATING`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(i32);

impl Rating {
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Range-checked before narrowing to `i32`.
impl TryFrom<i64> for Rating {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Self(value as i32))
        } else {
            Err(DomainError::InvalidRating(value))
        }
    }
}

/// Running totals for the reviews attached to one movie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RatingSummary {
    pub count: u64,
    pub sum: i64,
}

impl RatingSummary {
    pub fn new(count: u64, sum: i64) -> Self {
        Self { count, sum }
    }

    /// Mean rating rounded to one decimal place.
    ///
    /// `None` when there are no reviews; an unrated movie is not a zero.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(round_to_tenth(self.sum as f64 / self.count as f64))
    }
}

/// Round half away from zero to one decimal place.
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
