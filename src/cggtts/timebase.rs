use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Converts an MJD day count plus a packed HHMMSS string into an absolute
/// timestamp.
///
/// The default epoch is the Modified Julian Day origin, 1858-11-17. A
/// different epoch can be injected for instruments that count days from
/// somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MjdTimebase {
    epoch: NaiveDate,
}

impl Default for MjdTimebase {
    fn default() -> Self {
        // MJD day 0 by convention
        Self {
            epoch: NaiveDate::from_ymd_opt(1858, 11, 17).unwrap(),
        }
    }
}

impl MjdTimebase {
    /// A timebase counting days from a custom epoch.
    pub fn new(epoch: NaiveDate) -> Self {
        Self { epoch }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// Resolve a (possibly fractional) day count and a 6-digit HHMMSS string
    /// to a timestamp: `epoch + whole days + day fraction + HH:MM:SS`.
    ///
    /// Each two-digit component is read as a plain decimal number, so
    /// out-of-range values (minutes or seconds of 60..=99, hours of 24..=99)
    /// roll the timestamp forward instead of failing. Returns `None` when
    /// the day count is not finite, the packed string is not exactly 6 ASCII
    /// digits, or the sum leaves the representable date range.
    pub fn resolve(&self, mjd: f64, sttime: &str) -> Option<NaiveDateTime> {
        if !mjd.is_finite() {
            return None;
        }
        if sttime.len() != 6 || !sttime.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let whole_days = Duration::try_days(mjd.div_euclid(1.0) as i64)?;
        let day_fraction =
            Duration::nanoseconds((mjd.rem_euclid(1.0) * 86_400_000_000_000.0).round() as i64);

        // Slicing is safe: exactly 6 ASCII digits, checked above
        let hours: i64 = sttime[0..2].parse().ok()?;
        let minutes: i64 = sttime[2..4].parse().ok()?;
        let seconds: i64 = sttime[4..6].parse().ok()?;
        let time_of_day =
            Duration::hours(hours) + Duration::minutes(minutes) + Duration::seconds(seconds);

        self.epoch
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(whole_days)?
            .checked_add_signed(day_fraction)?
            .checked_add_signed(time_of_day)
    }
}
