//! Line-oriented console
//!
//! Reads one answer per line. Every prompt that gets an answer it cannot
//! use says so and asks again; end of input stops the console cleanly.

use carrel_core::{CoreEvent, ReadingRoom, SeatListing, SeatState, SeatSummary};
use carrel_util::{
    format_duration, parse_hours_minutes, parse_menu_choice, parse_seat_choice, CarrelError,
    ClockReading, ClockSource, OccupantName, SeatId, ADMIN_TOKEN,
};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

const ADMIN_OPTIONS: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("end of input")]
    Eof,

    #[error(transparent)]
    Io(#[from] io::Error),
}

type ConsoleResult<T> = Result<T, ConsoleError>;

/// Interactive front end over a [`ReadingRoom`]
pub struct Console<R, W, C> {
    room: ReadingRoom,
    input: R,
    output: W,
    clock: C,
}

impl<R: BufRead, W: Write, C: ClockSource> Console<R, W, C> {
    pub fn new(room: ReadingRoom, input: R, output: W, clock: C) -> Self {
        Self {
            room,
            input,
            output,
            clock,
        }
    }

    pub fn room(&self) -> &ReadingRoom {
        &self.room
    }

    pub fn into_parts(self) -> (ReadingRoom, W) {
        (self.room, self.output)
    }

    /// Serve patrons until the input runs out
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.serve_one() {
                Ok(()) => {}
                Err(ConsoleError::Eof) => {
                    debug!("End of input");
                    return Ok(());
                }
                Err(ConsoleError::Io(e)) => return Err(e),
            }
        }
    }

    /// One pass of the main prompt
    fn serve_one(&mut self) -> ConsoleResult<()> {
        let line = self.prompt(&format!("Enter your name (admin mode: {}): ", ADMIN_TOKEN))?;
        let token = line.trim();
        if token.is_empty() {
            return Ok(());
        }

        let now = self.clock.now();
        self.room.refresh(&now);

        if token == ADMIN_TOKEN {
            return self.admin_mode();
        }

        let name = match self.room.parse_name(token) {
            Ok(name) => name,
            Err(e) => return self.say(&e.to_string()),
        };

        if !self.room.is_operating(&now) {
            return self.say(&CarrelError::OutsideOperatingHours.to_string());
        }

        match self.room.lookup(&name) {
            Some(seat) => self.existing_occupant(seat),
            None => self.new_patron(name, &now),
        }
    }

    fn new_patron(&mut self, name: OccupantName, now: &ClockReading) -> ConsoleResult<()> {
        if let Err(e) = self.room.ensure_vacancy(now) {
            return self.say(&e.to_string());
        }

        let listing = self.room.user_view();
        self.print_listing(&listing)?;

        let seat = loop {
            let line = self.prompt("Select a seat (cancel: 0): ")?;
            let seat = match parse_seat_choice(&line, self.room.seat_count()) {
                Ok(Some(seat)) => seat,
                Ok(None) => return self.say("Seat selection cancelled."),
                Err(_) => {
                    self.say("Invalid input.")?;
                    continue;
                }
            };

            let now = self.clock.now();
            match self.room.check_in(seat, name.clone(), &now) {
                Ok(_) => break seat,
                Err(CarrelError::SeatUnavailable(_)) => {
                    let message = match self.room.registry().get(seat).map(|s| s.state()) {
                        Ok(SeatState::Disabled) => "This seat is unavailable.",
                        _ => "This seat is already in use.",
                    };
                    self.say(message)?;
                    self.say("Please choose another seat.")?;
                }
                Err(e) => return self.say(&e.to_string()),
            }
        };

        if let Some(summary) = self.summary(seat)? {
            self.print_summary(&summary)?;
        }
        Ok(())
    }

    fn existing_occupant(&mut self, seat: SeatId) -> ConsoleResult<()> {
        let Some(summary) = self.summary(seat)? else {
            return Ok(());
        };
        self.say(&format!("Seat {}", seat))?;
        self.print_summary(&summary)?;

        let (menu, options): (&str, &[u32]) = if summary.renewable_now {
            ("Renew: 1, Check out: 2, Cancel: 3: ", &[1, 2, 3])
        } else {
            ("Check out: 2, Cancel: 3: ", &[2, 3])
        };

        let choice = loop {
            let line = self.prompt(menu)?;
            match parse_menu_choice(&line, options) {
                Ok(choice) => break choice,
                Err(_) => self.say("Please try again.")?,
            }
        };

        // the answer may come after the seat has expired
        let now = self.clock.now();
        self.room.refresh(&now);

        match choice {
            1 => match self.room.renew(seat, &now) {
                Ok(_) => {
                    if let Some(summary) = self.summary(seat)? {
                        self.print_summary(&summary)?;
                    }
                    Ok(())
                }
                Err(e) => self.say(&e.to_string()),
            },
            2 => match self.room.check_out(seat) {
                Ok(_) => self.say(&format!("Checked out of seat {}.", seat)),
                Err(e) => self.say(&e.to_string()),
            },
            _ => Ok(()),
        }
    }

    fn summary(&mut self, seat: SeatId) -> ConsoleResult<Option<SeatSummary>> {
        match self.room.seat_summary(seat, &self.clock.now()) {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                self.say(&e.to_string())?;
                Ok(None)
            }
        }
    }

    fn print_summary(&mut self, summary: &SeatSummary) -> ConsoleResult<()> {
        match &summary.renew_from {
            Some(from) => self.say(&format!("Renewable from: {}", from))?,
            None => self.say("Not renewable")?,
        }
        self.say(&format!("Ends at: {}", summary.ends_at))?;
        self.say(&format!("Time left: {}", format_duration(summary.remaining_secs)))
    }

    fn refresh(&mut self) {
        let now = self.clock.now();
        self.room.refresh(&now);
    }

    fn print_listing(&mut self, listing: &[SeatListing]) -> ConsoleResult<()> {
        for row in listing {
            let info = match (row.state, &row.occupant) {
                (SeatState::Disabled, _) => "Unavailable".to_string(),
                (SeatState::Occupied, Some(occupant)) => format!("User {}", occupant),
                (SeatState::Occupied, None) => "Used".to_string(),
                (SeatState::Free, _) => "Empty".to_string(),
            };
            self.say(&format!("Seat {}: {}", row.seat, info))?;
        }
        Ok(())
    }

    fn admin_mode(&mut self) -> ConsoleResult<()> {
        loop {
            let line = self.prompt(
                "1: reset seats, 2: max session length, 3: renewal lead, 4: opening time, \
                 5: closing time, 6: list seats, 7: toggle seat availability, 0: exit: ",
            )?;
            let choice = match parse_menu_choice(&line, &ADMIN_OPTIONS) {
                Ok(choice) => choice,
                Err(_) => {
                    self.say("Invalid input.")?;
                    continue;
                }
            };
            self.refresh();

            match choice {
                1 => {
                    let released = self.room.reset_seats().len();
                    self.say(&format!(
                        "All seats reset ({} released, disabled seats kept).",
                        released
                    ))?;
                }
                2 => self.edit_max_session()?,
                3 => self.edit_renew_lead()?,
                4 => self.edit_opening()?,
                5 => self.edit_closing()?,
                6 => {
                    let listing = self.room.admin_view();
                    self.print_listing(&listing)?;
                }
                7 => self.toggle_seats()?,
                _ => return Ok(()),
            }
        }
    }

    fn edit_max_session(&mut self) -> ConsoleResult<()> {
        loop {
            let current = self.room.config().max_session_minutes();
            self.say(&format!(
                "Current maximum session length: {} h {} min",
                current / 60,
                current % 60
            ))?;
            let entry = self.prompt_hours_minutes("New maximum session length")?;
            match entry.and_then(|minutes| self.room.set_max_session(minutes)) {
                Ok(Some(lead)) => {
                    return self.say(&format!(
                        "Renewal lead lowered to {} h {} min before the end to match.",
                        lead / 60,
                        lead % 60
                    ));
                }
                Ok(None) => return Ok(()),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    fn edit_renew_lead(&mut self) -> ConsoleResult<()> {
        loop {
            let config = self.room.config();
            let (session, lead) = (config.max_session_minutes(), config.max_renew_lead_minutes());
            self.say(&format!(
                "Current maximum session length: {} h {} min",
                session / 60,
                session % 60
            ))?;
            self.say(&format!(
                "Current renewal lead: {} h {} min before the end",
                lead / 60,
                lead % 60
            ))?;
            let entry = self.prompt_hours_minutes("New renewal lead")?;
            match entry.and_then(|minutes| self.room.set_renew_lead(minutes)) {
                Ok(()) => return Ok(()),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    fn edit_opening(&mut self) -> ConsoleResult<()> {
        if self.room.config().is_24h() {
            self.say(
                "Warning: once opening and closing differ, every expiry past closing \
                 is moved to the closing time.",
            )?;
        }
        loop {
            self.print_hours()?;
            let entry = self.prompt_hours_minutes("New opening time (same as closing: 24 hours)")?;
            let now = self.clock.now();
            match entry.and_then(|minute| self.room.set_opening(minute, &now)) {
                Ok(events) => return self.report_clamps(&events),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    fn edit_closing(&mut self) -> ConsoleResult<()> {
        self.say(
            "Warning: if closing moves earlier, every expiry past closing is moved \
             to the closing time.",
        )?;
        loop {
            self.print_hours()?;
            let entry = self.prompt_hours_minutes("New closing time (same as opening: 24 hours)")?;
            let now = self.clock.now();
            match entry.and_then(|minute| self.room.set_closing(minute, &now)) {
                Ok(events) => return self.report_clamps(&events),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    fn print_hours(&mut self) -> ConsoleResult<()> {
        let config = self.room.config();
        let line = format!(
            "Current opening time: {}, current closing time: {}",
            config.open(),
            config.close()
        );
        self.say(&line)
    }

    fn report_clamps(&mut self, events: &[CoreEvent]) -> ConsoleResult<()> {
        if !events.is_empty() {
            self.say(&format!(
                "{} expiry time(s) moved to the closing time.",
                events.len()
            ))?;
        }
        Ok(())
    }

    fn toggle_seats(&mut self) -> ConsoleResult<()> {
        loop {
            self.refresh();
            let listing = self.room.admin_view();
            self.print_listing(&listing)?;

            let seat = loop {
                let line = self.prompt("Select a seat to toggle (exit: 0): ")?;
                match parse_seat_choice(&line, self.room.seat_count()) {
                    Ok(choice) => break choice,
                    Err(_) => self.say("Invalid input.")?,
                }
            };
            let Some(seat) = seat else {
                return Ok(());
            };

            if let Err(e) = self.room.toggle_seat(seat) {
                self.say(&e.to_string())?;
            }
        }
    }

    /// Ask for hours then minutes. Unusable entries come back as `Err`
    /// so the caller can report them and ask again.
    fn prompt_hours_minutes(&mut self, what: &str) -> ConsoleResult<carrel_util::Result<u32>> {
        let hours = self.prompt(&format!("{}. Hours: ", what))?;
        let minutes = self.prompt("Minutes: ")?;
        Ok(parse_hours_minutes(&hours, &minutes))
    }

    fn prompt(&mut self, text: &str) -> ConsoleResult<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConsoleError::Eof);
        }
        Ok(line)
    }

    fn say(&mut self, text: &str) -> ConsoleResult<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}
