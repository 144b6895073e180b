use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};

pub(crate) fn get_now() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_timezone(now.offset())
}

/// Inclusive range of calendar days an article must be published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The last `days` days ending at `today`, both ends included.
    /// Ranges reaching past the calendar start at its first day.
    pub fn last_days(days: u32, today: NaiveDate) -> DateRange {
        let back = i64::from(days.max(1) - 1);
        DateRange {
            start: today
                .checked_sub_signed(Duration::days(back))
                .unwrap_or(NaiveDate::MIN),
            end: today,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Undated entries are kept; the article page may still carry a date.
    pub fn admits(&self, date: Option<NaiveDate>) -> bool {
        date.map_or(true, |d| self.contains(d))
    }

    /// Days of the range, newest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let mut current = Some(self.end);
        std::iter::from_fn(move || {
            let day = current.filter(|d| *d >= self.start)?;
            current = day.pred_opt();
            Some(day)
        })
    }
}
