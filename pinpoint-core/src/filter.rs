//! Time-of-day filtering of hourly readings.

use chrono::{NaiveTime, Timelike};

use crate::model::TemperatureReading;

/// Inclusive time-of-day bounds at minute resolution.
///
/// A missing start means 00:00 and a missing end means 23:59.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOfDayWindow {
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
}

impl TimeOfDayWindow {
    pub fn new(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains<T: Timelike>(&self, time: &T) -> bool {
        let minute = minute_of_day(time);
        let after_start = self.start.is_none_or(|start| minute >= minute_of_day(&start));
        let before_end = self.end.is_none_or(|end| minute <= minute_of_day(&end));
        after_start && before_end
    }
}

/// Keep the readings that fall inside `window`.
///
/// Error entries are always kept, and so are readings whose time cannot be
/// parsed. An unbounded window keeps everything.
pub fn filter_readings<'a>(
    readings: &'a [TemperatureReading],
    window: &TimeOfDayWindow,
) -> Vec<&'a TemperatureReading> {
    if window.is_unbounded() {
        return readings.iter().collect();
    }

    readings
        .iter()
        .filter(|reading| match reading {
            TemperatureReading::Failed { .. } => true,
            TemperatureReading::Reading { .. } => {
                reading.local_time().is_none_or(|time| window.contains(&time))
            }
        })
        .collect()
}

fn minute_of_day<T: Timelike>(time: &T) -> u32 {
    time.hour() * 60 + time.minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn reading(time: &str) -> TemperatureReading {
        TemperatureReading::Reading { time: time.into(), temp_c: Some(1.0) }
    }

    fn hourly(day: &str) -> Vec<TemperatureReading> {
        (0..24).map(|h| reading(&format!("{day}T{h:02}:00"))).collect()
    }

    fn times(kept: &[&TemperatureReading]) -> Vec<String> {
        kept.iter()
            .filter_map(|r| match r {
                TemperatureReading::Reading { time, .. } => Some(time[11..16].to_string()),
                TemperatureReading::Failed { .. } => None,
            })
            .collect()
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = TimeOfDayWindow::new(Some(hm(8, 0)), Some(hm(10, 0)));
        let readings = hourly("2023-01-01");
        let kept = filter_readings(&readings, &window);
        assert_eq!(times(&kept), vec!["08:00", "09:00", "10:00"]);
    }

    #[test]
    fn minutes_are_compared() {
        let window = TimeOfDayWindow::new(Some(hm(8, 30)), Some(hm(10, 15)));
        let readings = hourly("2023-01-01");
        let kept = filter_readings(&readings, &window);
        assert_eq!(times(&kept), vec!["09:00", "10:00"]);
    }

    #[test]
    fn missing_bound_is_open() {
        let readings = hourly("2023-01-01");

        let only_start = TimeOfDayWindow::new(Some(hm(22, 0)), None);
        assert_eq!(times(&filter_readings(&readings, &only_start)), vec!["22:00", "23:00"]);

        let only_end = TimeOfDayWindow::new(None, Some(hm(1, 0)));
        assert_eq!(times(&filter_readings(&readings, &only_end)), vec!["00:00", "01:00"]);
    }

    #[test]
    fn window_applies_to_every_day() {
        let mut readings = hourly("2023-01-01");
        readings.extend(hourly("2023-01-02"));
        let window = TimeOfDayWindow::new(Some(hm(12, 0)), Some(hm(12, 0)));
        assert_eq!(filter_readings(&readings, &window).len(), 2);
    }

    #[test]
    fn unbounded_window_keeps_everything() {
        let readings = hourly("2023-01-01");
        assert_eq!(filter_readings(&readings, &TimeOfDayWindow::default()).len(), 24);
    }

    #[test]
    fn error_entries_and_unparseable_times_are_kept() {
        let readings = vec![
            TemperatureReading::Failed { error: "bad".into() },
            reading("not a time"),
            reading("2023-01-01T03:00"),
        ];
        let window = TimeOfDayWindow::new(Some(hm(8, 0)), Some(hm(9, 0)));
        let kept = filter_readings(&readings, &window);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].error_message(), Some("bad"));
    }
}
