//! Time-keyed tranche vesting.

use fairdrop_types::{FairdropError, Result, Tranche, constants::FRACTION_DENOMINATOR};

use crate::check_ceiling;

/// A validated tranche list.
///
/// Times and fractions strictly increase, the last fraction is exactly
/// 10 000, and every time is plausible epoch-seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrancheSchedule {
    tranches: Vec<Tranche>,
}

impl TrancheSchedule {
    pub fn new(tranches: Vec<Tranche>) -> Result<Self> {
        let Some(last) = tranches.last() else {
            return Err(FairdropError::schedule("tranches required"));
        };
        for pair in tranches.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(FairdropError::schedule("tranche time must increase"));
            }
            if pair[1].vested_fraction <= pair[0].vested_fraction {
                return Err(FairdropError::schedule(
                    "tranche vested fraction must increase",
                ));
            }
        }
        if last.vested_fraction != FRACTION_DENOMINATOR {
            return Err(FairdropError::schedule("last tranche must vest all tokens"));
        }
        check_ceiling(last.time)?;
        Ok(Self { tranches })
    }

    #[must_use]
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    /// Fraction of the last tranche whose time has passed, or 0.
    #[must_use]
    pub fn fraction_at(&self, now: u64) -> u16 {
        self.tranches
            .iter()
            .rev()
            .find(|t| t.time <= now)
            .map_or(0, |t| t.vested_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(err: FairdropError) -> String {
        match err {
            FairdropError::MisconfiguredSchedule { reason } => reason,
            other => panic!("unexpected error: {other}"),
        }
    }

    fn three_step(t: u64) -> TrancheSchedule {
        TrancheSchedule::new(vec![
            Tranche::new(t - 100, 1000),
            Tranche::new(t - 1, 5000),
            Tranche::new(t + 100, 10_000),
        ])
        .unwrap()
    }

    #[test]
    fn fraction_steps_through_tranches() {
        let t = 1_700_000_000;
        let s = three_step(t);
        assert_eq!(s.fraction_at(t - 101), 0);
        assert_eq!(s.fraction_at(t - 100), 1000);
        assert_eq!(s.fraction_at(t), 5000);
        assert_eq!(s.fraction_at(t + 99), 5000);
        assert_eq!(s.fraction_at(t + 100), 10_000);
        assert_eq!(s.fraction_at(u64::MAX), 10_000);
    }

    #[test]
    fn fraction_is_non_decreasing() {
        let t = 1_700_000_000;
        let s = three_step(t);
        let mut prev = 0;
        for now in (t - 200..t + 200).step_by(7) {
            let f = s.fraction_at(now);
            assert!(f >= prev);
            prev = f;
        }
        assert_eq!(prev, 10_000);
    }

    #[test]
    fn rejects_unfinished_schedule() {
        let err = TrancheSchedule::new(vec![Tranche::new(100, 1000), Tranche::new(200, 9999)])
            .unwrap_err();
        assert_eq!(reason(err), "last tranche must vest all tokens");
    }

    #[test]
    fn rejects_non_increasing_time() {
        let err = TrancheSchedule::new(vec![Tranche::new(200, 1000), Tranche::new(200, 10_000)])
            .unwrap_err();
        assert_eq!(reason(err), "tranche time must increase");
    }

    #[test]
    fn rejects_non_increasing_fraction() {
        let err = TrancheSchedule::new(vec![
            Tranche::new(100, 5000),
            Tranche::new(200, 5000),
            Tranche::new(300, 10_000),
        ])
        .unwrap_err();
        assert_eq!(reason(err), "tranche vested fraction must increase");
    }

    #[test]
    fn rejects_millisecond_timestamps() {
        let err = TrancheSchedule::new(vec![Tranche::new(1_700_000_000_000, 10_000)]).unwrap_err();
        assert_eq!(reason(err), "vesting ends after 4102444800");
    }

    #[test]
    fn rejects_empty() {
        assert!(TrancheSchedule::new(Vec::new()).is_err());
    }

    #[test]
    fn single_tranche_is_cliff() {
        let s = TrancheSchedule::new(vec![Tranche::new(500, 10_000)]).unwrap();
        assert_eq!(s.fraction_at(499), 0);
        assert_eq!(s.fraction_at(500), 10_000);
    }
}
