use super::ApiError;
use crate::domain::ItemId;

pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_LOCATION_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 4000;

/// Parses the `{id}` path segment of a delete link.
///
/// Any run of digits is accepted; `Ok(None)` means no row can carry that id
/// (zero, or too large for the column), so there is nothing to remove.
pub fn parse_item_id(raw: &str) -> Result<Option<ItemId>, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "Invalid item ID: {raw}. ID must be a number"
        )));
    }
    Ok(raw
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .map(ItemId::new))
}

/// Forms render `maxlength`, so only hand-built requests hit this.
/// The error is the notice shown to the user.
pub fn validate_field_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max {
        return Err(format!(
            "{field} must be {max} characters or less (got {len})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_id() {
        assert_eq!(parse_item_id("1").unwrap(), Some(ItemId::new(1)));
        assert_eq!(parse_item_id("0").unwrap(), None);
        assert_eq!(parse_item_id("3000000000").unwrap(), None);
        assert_eq!(parse_item_id("99999999999999999999999").unwrap(), None);
        assert!(parse_item_id("-4").is_err());
        assert!(parse_item_id("abc").is_err());
        assert!(parse_item_id("").is_err());
    }

    #[test]
    fn test_validate_field_length() {
        assert!(validate_field_length("Title", "Wallet", MAX_TITLE_LEN).is_ok());
        assert!(validate_field_length("Title", &"x".repeat(MAX_TITLE_LEN), MAX_TITLE_LEN).is_ok());
        let err = validate_field_length("Title", &"x".repeat(MAX_TITLE_LEN + 1), MAX_TITLE_LEN)
            .unwrap_err();
        assert_eq!(err, "Title must be 200 characters or less (got 201)");
        // multi-byte characters count once
        assert!(validate_field_length("Location", "café", 4).is_ok());
    }
}
