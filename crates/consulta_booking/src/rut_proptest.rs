#[cfg(test)]
mod tests {
    use crate::rut::{check_digit, is_valid_rut};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn computed_check_digit_always_validates(body in "[1-9][0-9]{0,8}") {
            let check = check_digit(&body).unwrap();
            let rut = format!("{}-{}", body, check);
            prop_assert!(is_valid_rut(&rut));
        }

        #[test]
        fn any_other_check_character_is_rejected(body in "[1-9][0-9]{0,8}", idx in 0usize..11) {
            let check = check_digit(&body).unwrap();
            let candidates = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'K'];
            let other = candidates[idx];
            prop_assume!(other != check);
            let rut = format!("{}-{}", body, other);
            prop_assert!(!is_valid_rut(&rut));
        }

        #[test]
        fn dots_do_not_change_validity(body in "[1-9][0-9]{6,7}") {
            let check = check_digit(&body).unwrap();
            let dotted = format!("{}.{}-{}", &body[..body.len() - 3], &body[body.len() - 3..], check);
            prop_assert!(is_valid_rut(&dotted));
        }
    }
}
