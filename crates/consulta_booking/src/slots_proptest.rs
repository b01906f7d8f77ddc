#[cfg(test)]
mod tests {
    use crate::slots::free_slots;
    use consulta_common::models::normalize_hour_label;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn label(slot: u32) -> String {
        format!("{:02}:{:02}", 8 + slot / 2, (slot % 2) * 30)
    }

    fn start(date: NaiveDate, slot: u32) -> NaiveDateTime {
        date.and_hms_opt(8 + slot / 2, (slot % 2) * 30, 0).unwrap()
    }

    proptest! {
        #[test]
        fn free_slots_are_offered_and_unbooked(
            offered in proptest::collection::btree_set(0u32..20, 0..20),
            booked in proptest::collection::vec(0u32..20, 0..10),
        ) {
            let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
            let hours: Vec<String> = offered.iter().map(|s| label(*s)).collect();
            let starts: Vec<NaiveDateTime> = booked.iter().map(|s| start(date, *s)).collect();

            let free = free_slots(&hours, &starts, date);

            for hour in &free {
                prop_assert!(hours.contains(hour));
            }
            for s in &booked {
                prop_assert!(!free.contains(&label(*s)));
            }
            // Every offered, unbooked hour survives
            for s in &offered {
                if !booked.contains(s) {
                    prop_assert!(free.contains(&label(*s)));
                }
            }
        }

        #[test]
        fn normalization_is_idempotent(h in 0u32..24, m in 0u32..60) {
            let once = normalize_hour_label(&format!("{}:{:02}", h, m));
            prop_assert_eq!(normalize_hour_label(&once), once.clone());
            prop_assert_eq!(once, format!("{:02}:{:02}", h, m));
        }
    }
}
