//! Card-number generation, masking, and validation.
//!
//! Generation here is a stand-in for the issuing collaborator: numbers are
//! random 16-digit strings with a Visa/Mastercard-style leading digit, not
//! BIN-range allocations.

use rand::Rng;

/// Generate a random 16-digit card number.
pub fn generate_card_number() -> String {
    let mut rng = rand::thread_rng();
    let mut number = String::with_capacity(16);
    number.push(if rng.gen_bool(0.5) { '4' } else { '5' });
    for _ in 0..15 {
        number.push(char::from(b'0' + rng.gen_range(0..10)));
    }
    number
}

/// Generate a 3-digit CVV.
pub fn generate_cvv() -> String {
    let mut rng = rand::thread_rng();
    format!("{:03}", rng.gen_range(0..1000))
}

/// Mask a card number showing only the last 4 digits,
/// e.g. `1234567890123456` -> `**** **** **** 3456`.
pub fn mask_card_number(card_number: &str) -> String {
    let digits: String = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return "****".to_string();
    }
    format!("**** **** **** {}", &digits[digits.len() - 4..])
}

/// Basic format + Luhn validation.
pub fn is_valid_card_number(card_number: &str) -> bool {
    let digits: Vec<u32> = card_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    is_valid_luhn(&digits)
}

fn is_valid_luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}
