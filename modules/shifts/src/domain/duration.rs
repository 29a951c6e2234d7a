//! Break and working time derived from a shift's clock times.

use super::clock::ClockTime;
use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub break_hours: ClockTime,
    pub break_mins: u32,
    pub working_hours: ClockTime,
    pub working_mins: u32,
}

/// Derive durations for a shift running from `start` to `end` on one day.
///
/// The break is `break_hours` when given, else `previous` (the stored value
/// when updating), else `00:00`. `end` must be strictly after `start`, and the
/// break must be strictly shorter than the shift.
pub fn compute(
    start: ClockTime,
    end: ClockTime,
    break_hours: Option<ClockTime>,
    previous: Option<ClockTime>,
) -> Result<Durations, DomainError> {
    let break_hours = break_hours.or(previous).unwrap_or(ClockTime::MIDNIGHT);

    let shift_mins = i64::from(end.minutes()) - i64::from(start.minutes());
    if shift_mins <= 0 {
        return Err(DomainError::InvalidTimeRange { start, end });
    }

    let break_mins = break_hours.minutes();
    if i64::from(break_mins) >= shift_mins {
        return Err(DomainError::InvalidBreakTime {
            break_hours,
            shift_mins,
        });
    }

    // Both operands are below one day, so the difference is too.
    let working_mins = shift_mins as u32 - break_mins;
    let working_hours = ClockTime::from_minutes(working_mins)
        .map_err(|e| DomainError::validation("shift.working_hours", e.to_string()))?;

    Ok(Durations {
        break_hours,
        break_mins,
        working_hours,
        working_mins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    #[test]
    fn nine_to_five_with_an_hour_break() {
        let d = compute(t("09:00"), t("17:00"), Some(t("01:00")), None).unwrap();
        assert_eq!(d.break_mins, 60);
        assert_eq!(d.working_mins, 420);
        assert_eq!(d.working_hours.to_string(), "07:00");
    }

    #[test]
    fn break_defaults_to_previous_then_zero() {
        let d = compute(t("09:00"), t("12:00"), None, Some(t("00:30"))).unwrap();
        assert_eq!(d.break_hours.to_string(), "00:30");
        assert_eq!(d.working_mins, 150);

        let d = compute(t("09:00"), t("12:00"), None, None).unwrap();
        assert_eq!(d.break_hours.to_string(), "00:00");
        assert_eq!(d.working_mins, 180);

        let d = compute(t("09:00"), t("12:00"), Some(t("00:15")), Some(t("00:30"))).unwrap();
        assert_eq!(d.break_mins, 15);
    }

    #[test]
    fn break_equal_to_shift_is_rejected() {
        let err = compute(t("09:00"), t("17:00"), Some(t("08:00")), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBreakTime);
        assert_eq!(err.path(), Some("shift.break_hours"));
    }

    #[test]
    fn break_longer_than_shift_is_rejected() {
        let err = compute(t("09:00"), t("10:00"), Some(t("02:00")), None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidBreakTime { shift_mins: 60, .. }));
    }

    #[test]
    fn end_not_after_start_is_a_time_range_error() {
        for (start, end) in [("17:00", "09:00"), ("09:00", "09:00")] {
            let err = compute(t(start), t(end), None, None).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidTimeRange { .. }),
                "{start}-{end}: {err:?}"
            );
            assert_eq!(err.path(), Some("shift.end_time"));
        }
    }

    #[test]
    fn working_plus_break_is_the_shift_length() {
        for start in (0..1440).step_by(97) {
            for end in (start + 1..1440).step_by(89) {
                for brk in [0u32, 1, 15, 59, 120, 479] {
                    let shift = end - start;
                    if brk >= shift {
                        continue;
                    }
                    let d = compute(
                        ClockTime::from_minutes(start).unwrap(),
                        ClockTime::from_minutes(end).unwrap(),
                        Some(ClockTime::from_minutes(brk).unwrap()),
                        None,
                    )
                    .unwrap();
                    assert_eq!(d.working_mins + d.break_mins, shift);
                }
            }
        }
    }
}
