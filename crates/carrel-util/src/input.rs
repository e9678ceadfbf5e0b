//! Pure parsers for console input
//!
//! The console re-prompts on any `Err`; nothing here touches I/O.

use crate::{CarrelError, Result, SeatId};

/// Parse a whole number typed at a prompt
pub fn parse_number(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    trimmed
        .parse()
        .map_err(|_| CarrelError::invalid_input(format!("'{}' is not a number", trimmed)))
}

/// Parse a menu selection, accepting only the listed options
pub fn parse_menu_choice(input: &str, options: &[u32]) -> Result<u32> {
    let n = parse_number(input)?;
    u32::try_from(n)
        .ok()
        .filter(|choice| options.contains(choice))
        .ok_or_else(|| CarrelError::invalid_input(format!("{} is not a menu option", n)))
}

/// Parse a 1-based seat number; `0` means "cancel" and yields `None`.
pub fn parse_seat_choice(input: &str, seat_count: usize) -> Result<Option<SeatId>> {
    let n = parse_number(input)?;
    let n = usize::try_from(n)
        .map_err(|_| CarrelError::invalid_input(format!("{} is not a seat number", n)))?;
    if n > seat_count {
        return Err(CarrelError::UnknownSeat(n));
    }
    Ok(SeatId::from_number(n))
}

/// Combine an hours entry and a minutes entry into a minute count.
///
/// Range checks belong to whatever setting receives the value; this only
/// rejects entries that cannot be a length of time at all.
pub fn parse_hours_minutes(hours: &str, minutes: &str) -> Result<u32> {
    let h = parse_number(hours)?;
    let m = parse_number(minutes)?;
    if h < 0 || m < 0 {
        return Err(CarrelError::invalid_input("hours and minutes cannot be negative"));
    }
    h.checked_mul(60)
        .and_then(|h| h.checked_add(m))
        .and_then(|total| u32::try_from(total).ok())
        .ok_or_else(|| CarrelError::invalid_input("time is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(parse_number(" 42\n").unwrap(), 42);
        assert_eq!(parse_number("-3").unwrap(), -3);
        assert!(matches!(parse_number("x"), Err(CarrelError::InvalidInput(_))));
        assert!(parse_number("").is_err());
    }

    #[test]
    fn menu_choices() {
        assert_eq!(parse_menu_choice("2", &[1, 2, 3]).unwrap(), 2);
        assert!(parse_menu_choice("4", &[1, 2, 3]).is_err());
        assert!(parse_menu_choice("-1", &[1, 2, 3]).is_err());
    }

    #[test]
    fn seat_choices() {
        assert_eq!(parse_seat_choice("0", 10).unwrap(), None);
        assert_eq!(
            parse_seat_choice("10", 10).unwrap(),
            Some(SeatId::from_index(9))
        );
        assert_eq!(parse_seat_choice("11", 10), Err(CarrelError::UnknownSeat(11)));
        assert!(parse_seat_choice("-1", 10).is_err());
    }

    #[test]
    fn hours_and_minutes() {
        assert_eq!(parse_hours_minutes("4", "0").unwrap(), 240);
        assert_eq!(parse_hours_minutes("0", "90").unwrap(), 90);
        assert!(parse_hours_minutes("-1", "0").is_err());
        assert!(parse_hours_minutes("1", "abc").is_err());
    }
}
