#[cfg(test)]
mod tests {
    use crate::models::intervals_overlap;
    use proptest::prelude::*;

    proptest! {
        // The predicate is symmetric
        #[test]
        fn test_overlap_is_symmetric(
            a_start in 0i64..1_000,
            a_len in 1i64..200,
            b_start in 0i64..1_000,
            b_len in 1i64..200,
        ) {
            let (a_end, b_end) = (a_start + a_len, b_start + b_len);
            prop_assert_eq!(
                intervals_overlap(a_start, a_end, b_start, b_end),
                intervals_overlap(b_start, b_end, a_start, a_end)
            );
        }

        // Agrees with the minute-by-minute definition of a shared instant
        #[test]
        fn test_overlap_matches_shared_minute(
            a_start in 0i64..300,
            a_len in 1i64..60,
            b_start in 0i64..300,
            b_len in 1i64..60,
        ) {
            let (a_end, b_end) = (a_start + a_len, b_start + b_len);
            let shares_minute = (a_start..a_end).any(|m| m >= b_start && m < b_end);
            prop_assert_eq!(intervals_overlap(a_start, a_end, b_start, b_end), shares_minute);
        }
    }
}
