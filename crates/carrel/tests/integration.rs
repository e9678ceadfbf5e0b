//! Integration tests for carrel
//!
//! These tests drive the reading room and the console end to end with a
//! manual clock.

use carrel::Console;
use carrel_config::{load_config, parse_config, FacilityConfig, RoomPolicy};
use carrel_core::{CoreEvent, ReadingRoom, ReleaseReason};
use carrel_util::{CarrelError, ClockReading, ClockSource, ManualClock, MinuteOfDay, SeatId};
use std::io::{Cursor, Write};

const EPOCH: i64 = 1_700_000_000;

fn seat(n: usize) -> SeatId {
    SeatId::from_number(n).unwrap()
}

fn overnight_policy() -> RoomPolicy {
    parse_config(
        r#"
        config_version = 1

        [room]
        seats = 3

        [hours]
        open = "22:00"
        close = "08:00"
        "#,
    )
    .unwrap()
}

#[test]
fn test_full_day_in_an_overnight_room() {
    let clock = ManualClock::new(ClockReading::at_hms(EPOCH, 21, 0, 0));
    let mut room = ReadingRoom::new(overnight_policy());
    let alice = room.parse_name("alice").unwrap();

    // 21:00 is before opening
    assert_eq!(
        room.check_in(seat(1), alice.clone(), &clock.now()),
        Err(CarrelError::OutsideOperatingHours)
    );

    // 23:00: a full 4 hour session fits before 08:00
    clock.advance(2 * 3_600);
    let now = clock.now();
    assert!(room.refresh(&now).is_empty());
    room.check_in(seat(1), alice.clone(), &now).unwrap();
    let summary = room.seat_summary(seat(1), &now).unwrap();
    assert_eq!(summary.ends_at.to_string(), "next day 03:00:00");
    assert_eq!(summary.renew_from.unwrap().to_string(), "next day 02:30:00");

    // 02:40: inside the lead; a full session still ends before 08:00
    clock.advance(3 * 3_600 + 40 * 60);
    let now = clock.now();
    assert!(room.refresh(&now).is_empty());
    assert!(room.seat_summary(seat(1), &now).unwrap().renewable_now);
    match room.renew(seat(1), &now).unwrap() {
        CoreEvent::SeatRenewed { expiry, .. } => {
            assert_eq!(expiry, now.instant() + 20 * 60 + 4 * 3_600);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let summary = room.seat_summary(seat(1), &now).unwrap();
    assert_eq!(summary.ends_at.to_string(), "07:00:00");
    assert_eq!(summary.renew_from.unwrap().to_string(), "06:30:00");
    assert!(!summary.renewable_now);

    // 06:40: a second renewal is clamped to closing
    clock.advance(4 * 3_600);
    let now = clock.now();
    match room.renew(seat(1), &now).unwrap() {
        CoreEvent::SeatRenewed { expiry, .. } => {
            assert_eq!(expiry, now.instant() + 80 * 60);
        }
        other => panic!("unexpected event {:?}", other),
    }
    let summary = room.seat_summary(seat(1), &now).unwrap();
    assert!(summary.renew_from.is_none());

    // 08:00: the seat expires with closing
    clock.advance(80 * 60);
    let events = room.refresh(&clock.now());
    assert_eq!(
        events,
        vec![CoreEvent::SeatReleased {
            seat: seat(1),
            occupant: alice,
            reason: ReleaseReason::Expired,
        }]
    );
}

#[test]
fn test_checkout_then_assign_reproduces_expiry() {
    let clock = ManualClock::new(ClockReading::at_hms(EPOCH, 6, 0, 0));
    let mut room = ReadingRoom::new(overnight_policy());
    let bob = room.parse_name("bob").unwrap();
    let now = clock.now();

    let first = room.check_in(seat(2), bob.clone(), &now).unwrap();
    room.check_out(seat(2)).unwrap();
    let second = room.check_in(seat(2), bob, &now).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_disabled_and_occupied_seats_fill_the_room() {
    let clock = ManualClock::new(ClockReading::at_hms(EPOCH, 23, 0, 0));
    let mut room = ReadingRoom::new(overnight_policy());
    let now = clock.now();

    room.toggle_seat(seat(1)).unwrap();
    for (n, who) in [(2, "a"), (3, "b")] {
        let name = room.parse_name(who).unwrap();
        room.check_in(seat(n), name, &now).unwrap();
    }
    assert!(room.registry().is_full());

    let c = room.parse_name("c").unwrap();
    assert_eq!(room.check_in(seat(1), c, &now), Err(CarrelError::RoomFull));

    room.reset_seats();
    assert!(room.seats()[0].is_disabled());
    assert_eq!(room.registry().available_seats().count(), 2);
}

#[test]
fn test_lead_stays_within_session_through_admin_edits() {
    let mut room = ReadingRoom::new(RoomPolicy::default());
    let now = ClockReading::at_hms(EPOCH, 12, 0, 0);

    assert!(room.set_renew_lead(300).is_err());
    assert_eq!(room.set_max_session(15).unwrap(), Some(15));
    assert!(room.set_renew_lead(16).is_err());
    room.set_renew_lead(15).unwrap();
    room.set_closing(18 * 60, &now).unwrap();

    let config: &FacilityConfig = room.config();
    assert!(config.max_renew_lead_minutes() <= config.max_session_minutes());
    assert_eq!(config.close(), MinuteOfDay::from_hm(18, 0).unwrap());
}

#[test]
fn test_console_session_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "config_version = 1\n[room]\nseats = 2\n[hours]\nopen = \"09:00\"\nclose = \"18:00\""
    )
    .unwrap();
    let policy = load_config(file.path()).unwrap();

    let clock = ManualClock::new(ClockReading::at_hms(EPOCH, 16, 0, 0));
    let input = "alice\n2\nalice\n3\n0\n6\n0\n";
    let mut console = Console::new(
        ReadingRoom::new(policy),
        Cursor::new(input),
        Vec::new(),
        &clock,
    );
    console.run().unwrap();

    let (room, output) = console.into_parts();
    let output = String::from_utf8(output).unwrap();

    // 16:00 with closing at 18:00: the session is cut to two hours and
    // already reaches closing
    assert!(output.contains("Seat 2: Empty"));
    assert!(output.contains("Ends at: 18:00:00"));
    assert!(output.contains("Not renewable"));
    assert!(output.contains("Seat 2: User alice"));
    assert_eq!(
        room.seats()[1].expiry(),
        Some(clock.now().instant() + 2 * 3_600)
    );
}

#[test]
fn test_console_renews_inside_the_lead() {
    let clock = ManualClock::new(ClockReading::at_hms(EPOCH, 10, 0, 0));
    let mut room = ReadingRoom::new(RoomPolicy::default());
    let alice = room.parse_name("alice").unwrap();
    room.check_in(seat(1), alice, &clock.now()).unwrap();

    // 1000 seconds left
    clock.advance(13_400);
    let mut console = Console::new(room, Cursor::new("alice\n1\n"), Vec::new(), &clock);
    console.run().unwrap();

    let (room, output) = console.into_parts();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("Renew: 1, Check out: 2, Cancel: 3: "));
    assert!(output.contains("Ends at: 18:00:00"));
    assert_eq!(
        room.seats()[0].expiry(),
        Some(ClockReading::at_hms(EPOCH, 10, 0, 0).instant() + 28_800)
    );
}
