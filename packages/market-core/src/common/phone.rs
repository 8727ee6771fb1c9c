//! WhatsApp contact normalization.
//!
//! Listings store the contact number as digits only, in
//! `<country><area><number>` form. Residents type numbers with punctuation
//! and usually without the country code, so normalization strips everything
//! but digits and prepends Brazil's country code when it is missing.

use super::errors::{CoreError, CoreResult};

const COUNTRY_CODE: &str = "55";

/// Normalize a user-supplied WhatsApp number to digits-only
/// `<country><area><number>` form.
///
/// Accepts 10-11 digits (area + number, country code added) or 12-13 digits
/// already starting with the country code. Anything else is rejected.
pub fn normalize_whatsapp(raw: &str) -> CoreResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 | 11 => Ok(format!("{COUNTRY_CODE}{digits}")),
        12 | 13 if digits.starts_with(COUNTRY_CODE) => Ok(digits),
        0 => Err(CoreError::validation("WhatsApp number is required")),
        _ => Err(CoreError::validation(format!(
            "WhatsApp number \"{raw}\" is not a valid Brazilian number"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_country_code_to_local_numbers() {
        assert_eq!(normalize_whatsapp("(11) 98765-4321").unwrap(), "5511987654321");
        assert_eq!(normalize_whatsapp("1187654321").unwrap(), "551187654321");
    }

    #[test]
    fn keeps_existing_country_code() {
        assert_eq!(normalize_whatsapp("+55 11 98765-4321").unwrap(), "5511987654321");
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_whatsapp("").is_err());
        assert!(normalize_whatsapp("123").is_err());
        assert!(normalize_whatsapp("99 11 98765-4321").is_err());
    }
}
