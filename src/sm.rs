/// SM-2 scheduling algorithm variants
///
/// A pure mapping from a recall quality and a card's current scheduling
/// fields to its next scheduling fields. No I/O, no side effects; the review
/// ledger in `repo::card_repo` is responsible for persisting the result.
///
/// Easiness factors are integers scaled by 100 (2.50 is stored as 250) so all
/// arithmetic stays exact. The interval growth step rounds half up on the
/// fractional remainder.

/// A quality-to-EF-delta mapping plus the thresholds that decide whether a
/// review resets the repetition streak or forces a same-day repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Algorithm {
    /// EF delta (scaled x100) indexed by quality. The length of this slice
    /// defines the valid quality range.
    ef_mapping: &'static [i32],
    /// Quality below this resets the repetition streak to 1.
    reset_quality: i32,
    /// Quality below this forces the card to repeat today (interval 0).
    repeat_quality: i32,
}

/// Classic six-level SM-2 with stricter thresholds.
pub static SM2: Algorithm = Algorithm {
    ef_mapping: &[-80, -54, -32, -14, 0, 10],
    reset_quality: 3,
    repeat_quality: 4,
};

/// Four-level modified SM-2, the default in use. Quality 0..=3 maps onto the
/// four review-keyboard buttons.
pub static SM2_MOD: Algorithm = Algorithm {
    ef_mapping: &[-80, -30, 0, 10],
    reset_quality: 2,
    repeat_quality: 2,
};

/// Minimum easiness factor (1.30 scaled x100).
pub const EF_FLOOR: i32 = 130;

/// The scheduling fields produced by a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduling {
    /// Consecutive-success count after this review.
    pub repetition: i32,
    /// Easiness factor after this review, never below [`EF_FLOOR`].
    pub easiness_factor: i32,
    /// Days until the card is due again; 0 means "show again today".
    pub interval: i32,
}

impl Algorithm {
    /// Number of quality levels this variant accepts (qualities are
    /// `0..quality_levels()`).
    pub fn quality_levels(&self) -> i32 {
        self.ef_mapping.len() as i32
    }

    fn next_ef(&self, quality: i32, ef: i32) -> i32 {
        // Quality is constrained by the review keyboard, so an out-of-range
        // value can only be a programming error. Fail loudly.
        if quality < 0 || quality >= self.quality_levels() {
            panic!("quality {} outside configured mapping", quality);
        }
        (ef + self.ef_mapping[quality as usize]).max(EF_FLOOR)
    }

    fn next_repetition(&self, quality: i32, repetition: i32) -> i32 {
        if quality < self.reset_quality {
            1
        } else {
            repetition + 1
        }
    }

    /// `repetition` is this review's ordinal in the streak (the stored count
    /// plus one): the first and second successful repetitions get the fixed
    /// 1- and 6-day intervals, everything later grows by the easiness factor.
    fn next_interval(&self, quality: i32, ef: i32, repetition: i32, interval: i32) -> i32 {
        if quality < self.repeat_quality {
            return 0;
        }

        match repetition {
            1 => 1,
            2 => 6,
            _ => {
                let raw = i64::from(interval) * i64::from(ef);
                let mut next = (raw / 100) as i32;
                if raw % 100 >= 50 {
                    next += 1;
                }
                next
            }
        }
    }

    /// Computes the next scheduling fields for a review of the given quality.
    ///
    /// `repetition`, `ef` and `interval` are the card's stored values from
    /// before this review; the interval growth step deliberately uses the
    /// pre-update EF, not the one this call produces.
    ///
    /// ### Panics
    ///
    /// Panics if `quality` is outside this variant's mapping; valid input is
    /// guaranteed by the review-keyboard contract.
    pub fn calc(&self, quality: i32, repetition: i32, ef: i32, interval: i32) -> Scheduling {
        let next_repetition = self.next_repetition(quality, repetition);
        Scheduling {
            repetition: next_repetition,
            easiness_factor: self.next_ef(quality, ef),
            interval: self.next_interval(quality, ef, next_repetition, interval),
        }
    }
}

#[cfg(test)]
mod tests;
