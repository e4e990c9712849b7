//! Validators for the `format` keyword.
//!
//! Format assertion is off by default: `format` only produces an annotation unless the registry
//! is built with `assert_formats(true)`. Unknown formats never fail.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    sync::Arc,
};

use ahash::AHashMap;
use email_address::EmailAddress;
use url::Url;
use uuid_simd::{parse_hyphenated, Out};

use crate::regex::{self, PatternEngine};

/// A named format check.
pub trait Format: Send + Sync + 'static {
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    #[inline]
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

pub(crate) type Formats = AHashMap<String, Arc<dyn Format>>;

/// All built-in formats. `regex` follows the configured engine.
pub(crate) fn builtin(engine: &PatternEngine) -> Formats {
    let mut formats: Formats = AHashMap::new();
    let mut add = |name: &str, format: Arc<dyn Format>| {
        formats.insert(name.to_string(), format);
    };
    add("date", Arc::new(is_valid_date));
    add("date-time", Arc::new(is_valid_datetime));
    add("duration", Arc::new(is_valid_duration));
    add("email", Arc::new(is_valid_email));
    add("hostname", Arc::new(is_valid_hostname));
    add("idn-email", Arc::new(is_valid_email));
    add("ipv4", Arc::new(is_valid_ipv4));
    add("ipv6", Arc::new(is_valid_ipv6));
    add("iri", Arc::new(is_valid_uri));
    add("iri-reference", Arc::new(is_valid_uri_reference));
    add("json-pointer", Arc::new(is_valid_json_pointer));
    add("relative-json-pointer", Arc::new(is_valid_relative_json_pointer));
    add("time", Arc::new(is_valid_time));
    add("uri", Arc::new(is_valid_uri));
    add("uri-reference", Arc::new(is_valid_uri_reference));
    add("uuid", Arc::new(is_valid_uuid));
    let engine = engine.clone();
    add(
        "regex",
        Arc::new(move |value: &str| regex::compile(value, &engine).is_ok()),
    );
    formats
}

fn parse_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')),
    )
}

fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let (Some(year), Some(month), Some(day)) = (
        parse_digits(&bytes[0..4]),
        parse_digits(&bytes[5..7]),
        parse_digits(&bytes[8..10]),
    ) else {
        return false;
    };
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days).contains(&day)
}

pub(crate) fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let (Some(hour), Some(minute), Some(second)) = (
        parse_digits(&bytes[0..2]),
        parse_digits(&bytes[3..5]),
        parse_digits(&bytes[6..8]),
    ) else {
        return false;
    };
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut rest = &bytes[8..];
    if let Some(fraction) = rest.strip_prefix(b".") {
        let digits = fraction.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }
    // Offset in minutes east of UTC.
    let offset: i64 = match rest {
        b"Z" | b"z" => 0,
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            let (Some(hours), Some(minutes)) = (parse_digits(&[*h1, *h2]), parse_digits(&[*m1, *m2]))
            else {
                return false;
            };
            if hours > 23 || minutes > 59 {
                return false;
            }
            let total = i64::from(hours * 60 + minutes);
            if *sign == b'+' {
                total
            } else {
                -total
            }
        }
        _ => return false,
    };
    if second == 60 {
        // Leap seconds only happen at 23:59:60 UTC.
        let utc = (i64::from(hour * 60 + minute) - offset).rem_euclid(24 * 60);
        return utc == 23 * 60 + 59;
    }
    true
}

pub(crate) fn is_valid_datetime(datetime: &str) -> bool {
    match datetime.find(['T', 't']) {
        Some(10) => is_valid_date(&datetime[..10]) && is_valid_time(&datetime[11..]),
        _ => false,
    }
}

pub(crate) fn is_valid_duration(duration: &str) -> bool {
    let Some(rest) = duration.strip_prefix('P') else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let (date, time) = match rest.split_once('T') {
        Some((_, "")) => return false,
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };
    // Weeks can not be combined with other units.
    if let Some(weeks) = date.strip_suffix('W') {
        return time.is_none() && !weeks.is_empty() && weeks.bytes().all(|b| b.is_ascii_digit());
    }
    duration_units(date, b"YMD") && time.map_or(true, |time| duration_units(time, b"HMS"))
}

/// `part` is a sequence of `<digits><unit>` with units in the given order, each at most once.
fn duration_units(part: &str, units: &[u8]) -> bool {
    let mut remaining = units;
    let mut digits = 0;
    for byte in part.bytes() {
        if byte.is_ascii_digit() {
            digits += 1;
            continue;
        }
        if digits == 0 {
            return false;
        }
        match remaining.iter().position(|unit| *unit == byte) {
            Some(idx) => remaining = &remaining[idx + 1..],
            None => return false,
        }
        digits = 0;
    }
    digits == 0
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

pub(crate) fn is_valid_hostname(hostname: &str) -> bool {
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    !hostname.is_empty()
        && hostname.len() <= 253
        && hostname.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

pub(crate) fn is_valid_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

pub(crate) fn is_valid_ipv6(ip: &str) -> bool {
    ip.parse::<Ipv6Addr>().is_ok()
}

fn has_forbidden_uri_chars(value: &str) -> bool {
    value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '\\' | '"' | '<' | '>' | '{' | '}' | '|' | '^' | '`'))
}

pub(crate) fn is_valid_uri(uri: &str) -> bool {
    !has_forbidden_uri_chars(uri) && Url::parse(uri).is_ok()
}

pub(crate) fn is_valid_uri_reference(reference: &str) -> bool {
    if has_forbidden_uri_chars(reference) {
        return false;
    }
    let base = referencing::uri::default_root();
    base.join(reference).is_ok()
}

pub(crate) fn is_valid_uuid(uuid: &str) -> bool {
    let mut out = [0; 16];
    parse_hyphenated(uuid.as_bytes(), Out::from_mut(&mut out)).is_ok()
}

pub(crate) fn is_valid_json_pointer(pointer: &str) -> bool {
    if pointer.is_empty() {
        return true;
    }
    if !pointer.starts_with('/') {
        return false;
    }
    let mut chars = pointer.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

pub(crate) fn is_valid_relative_json_pointer(pointer: &str) -> bool {
    let digits = pointer.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && pointer.starts_with('0')) {
        return false;
    }
    let rest = &pointer[digits..];
    rest == "#" || is_valid_json_pointer(rest)
}
