#[cfg(test)]
mod tests {
    use crate::slots::free_slots;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn hours(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_booked_start_is_removed() {
        let free = free_slots(&hours(&["09:00", "09:30"]), &[at(day(), 9, 0)], day());
        assert_eq!(free, vec!["09:30"]);
    }

    #[test]
    fn test_nothing_booked_returns_every_hour_in_order() {
        let offered = hours(&["11:00", "09:00", "10:00"]);
        assert_eq!(free_slots(&offered, &[], day()), offered);
    }

    #[test]
    fn test_bookings_on_other_days_are_ignored() {
        let other_day = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let free = free_slots(&hours(&["09:00"]), &[at(other_day, 9, 0)], day());
        assert_eq!(free, vec!["09:00"]);
    }

    #[test]
    fn test_unpadded_labels_match_bookings() {
        let free = free_slots(&hours(&["9:00", "9:30"]), &[at(day(), 9, 30)], day());
        assert_eq!(free, vec!["9:00"]);
    }

    #[test]
    fn test_seconds_are_ignored() {
        let start = day().and_hms_opt(9, 0, 42).unwrap();
        assert!(free_slots(&hours(&["09:00"]), &[start], day()).is_empty());
    }
}
