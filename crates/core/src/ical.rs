//! iCalendar (RFC 5545) text serialization for booking feeds.
//!
//! Output is produced line by line: each content line is escaped where the
//! value type is TEXT, folded at [`MAX_LINE_CHARS`] characters, and the lines
//! are joined with CRLF. Only the subset of the format a subscription feed
//! needs is supported (one `VCALENDAR` with flat `VEVENT` blocks).

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum characters per physical line before folding.
pub const MAX_LINE_CHARS: usize = 75;

/// Line terminator mandated by the format.
pub const CRLF: &str = "\r\n";

/// Product identifier emitted in the calendar header.
pub const PRODID: &str = "-//PhotoProOS//Booking Calendar//EN";

/// Domain suffix appended to record ids to form globally unique UIDs.
pub const UID_DOMAIN: &str = "photoproos.com";

/// Fixed organizer line attached to every event.
pub const ORGANIZER_LINE: &str = "ORGANIZER;CN=PhotoProOS:mailto:noreply@photoproos.com";

/// Timestamp layout for UTC date-time values (`YYYYMMDDTHHMMSSZ`).
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

// ---------------------------------------------------------------------------
// Text primitives
// ---------------------------------------------------------------------------

/// Escape a TEXT property value.
///
/// Backslash, semicolon and comma are prefixed with a backslash; any line
/// break (`\r\n`, `\r`, `\n`) becomes the two-character sequence `\n`.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape_text`].
///
/// Unknown escape sequences are passed through untouched, and a trailing lone
/// backslash is kept as-is.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(';') => out.push(';'),
            Some(',') => out.push(','),
            Some('n' | 'N') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Fold a single content line so no physical line exceeds [`MAX_LINE_CHARS`].
///
/// The first segment keeps 75 characters; every continuation starts with
/// CRLF plus one space and carries at most 74 characters, so the space is
/// counted inside the limit. Counting is per `char`, so a multi-byte
/// character is never split.
pub fn fold_line(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_string();
    }

    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len() + 3 * (chars.len() / (MAX_LINE_CHARS - 1)));

    let (head, mut rest) = chars.split_at(MAX_LINE_CHARS);
    out.extend(head);

    while !rest.is_empty() {
        let take = rest.len().min(MAX_LINE_CHARS - 1);
        let (chunk, tail) = rest.split_at(take);
        out.push_str(CRLF);
        out.push(' ');
        out.extend(chunk);
        rest = tail;
    }

    out
}

/// Undo folding: remove every CRLF that is followed by a single space or tab.
pub fn unfold(text: &str) -> String {
    text.replace("\r\n ", "").replace("\r\n\t", "")
}

/// Format a UTC timestamp as `YYYYMMDDTHHMMSSZ`.
pub fn format_utc(ts: &Timestamp) -> String {
    ts.format(UTC_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Event model
// ---------------------------------------------------------------------------

/// Value of the `STATUS` property of a `VEVENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Confirmed => "CONFIRMED",
            EventStatus::Tentative => "TENTATIVE",
            EventStatus::Cancelled => "CANCELLED",
        }
    }
}

/// One scheduled record projected into a `VEVENT` block.
#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub id: DbId,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub status: EventStatus,
    pub created: Timestamp,
    pub last_modified: Timestamp,
}

/// Build the `UID` value for a record id.
pub fn event_uid(id: DbId) -> String {
    format!("{id}@{UID_DOMAIN}")
}

// ---------------------------------------------------------------------------
// CalendarBuilder
// ---------------------------------------------------------------------------

/// Accumulates unfolded content lines for one calendar document.
///
/// ```ignore
/// let mut cal = CalendarBuilder::new("Studio bookings", "UTC", now);
/// cal.push_event(&event);
/// let body = cal.finish();
/// ```
#[derive(Debug)]
pub struct CalendarBuilder {
    lines: Vec<String>,
    dtstamp: String,
}

impl CalendarBuilder {
    /// Start a calendar with the standard header.
    ///
    /// `now` becomes the `DTSTAMP` of every event in this document.
    pub fn new(name: &str, timezone: &str, now: Timestamp) -> Self {
        let lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{PRODID}"),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            format!("X-WR-CALNAME:{}", escape_text(name)),
            format!("X-WR-TIMEZONE:{timezone}"),
        ];
        Self {
            lines,
            dtstamp: format_utc(&now),
        }
    }

    /// Append one `VEVENT` block.
    pub fn push_event(&mut self, event: &FeedEvent) {
        self.lines.push("BEGIN:VEVENT".to_string());
        self.lines.push(format!("UID:{}", event_uid(event.id)));
        self.lines.push(format!("DTSTAMP:{}", self.dtstamp));
        self.lines.push(format!("DTSTART:{}", format_utc(&event.start)));
        self.lines.push(format!("DTEND:{}", format_utc(&event.end)));
        self.lines
            .push(format!("SUMMARY:{}", escape_text(&event.summary)));

        if let Some(description) = non_empty(event.description.as_deref()) {
            self.lines
                .push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        if let Some(location) = non_empty(event.location.as_deref()) {
            self.lines
                .push(format!("LOCATION:{}", escape_text(location)));
        }
        // URI value type: not TEXT, so no escaping.
        if let Some(url) = non_empty(event.url.as_deref()) {
            self.lines.push(format!("URL:{url}"));
        }

        self.lines
            .push(format!("STATUS:{}", event.status.as_str()));
        self.lines
            .push(format!("CREATED:{}", format_utc(&event.created)));
        self.lines
            .push(format!("LAST-MODIFIED:{}", format_utc(&event.last_modified)));
        self.lines.push(ORGANIZER_LINE.to_string());
        self.lines.push("END:VEVENT".to_string());
    }

    /// Number of `VEVENT` blocks pushed so far.
    pub fn event_count(&self) -> usize {
        self.lines.iter().filter(|l| *l == "BEGIN:VEVENT").count()
    }

    /// Close the calendar, fold every line and join with CRLF.
    ///
    /// The document ends with a CRLF after `END:VCALENDAR`.
    pub fn finish(mut self) -> String {
        self.lines.push("END:VCALENDAR".to_string());
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&fold_line(line));
            out.push_str(CRLF);
        }
        out
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
