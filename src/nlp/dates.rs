//! Date extraction
//!
//! Three tiers, tried in order until one yields a valid calendar date:
//! 1. an explicit `<Month> <Day>` (current year unless a year follows)
//! 2. ordered absolute/relative matchers (`12/3/2026`, `next friday`, `in 2 weeks`, ...)
//! 3. a lenient scan over date-like token spans ("the 9th of march",
//!    "sept 3 2027")
//!
//! Whether the date is a start or a finish date is decided separately from
//! the phrase "finish date" / "end date". An impossible date (Feb 30) is a
//! miss for that candidate, never an error.

use crate::core::types::{DateInfo, DateType};
use crate::nlp::pattern;
use crate::nlp::tokenize::tokens;
use crate::nlp::utterance::Utterance;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::Regex;

const MONTH_NAMES: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";

/// Month number from a full or abbreviated English month name
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.trim_end_matches('.');
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    name.parse::<Weekday>().ok()
}

/// The first occurrence of `weekday` strictly after `today`
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let wanted = weekday.num_days_from_monday();
    let ahead = match (wanted + 7 - current) % 7 {
        0 => 7,
        n => n,
    };
    today + Days::new(u64::from(ahead))
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Option<T> {
    text.parse().ok()
}

pub trait DateMatcher: Send + Sync {
    fn label(&self) -> &'static str;
    fn find(&self, text: &str, today: NaiveDate) -> Option<NaiveDate>;
}

/// Numeric D/M/Y; read as M/D/Y only when D/M/Y is not a real date
pub struct NumericDate {
    regex: Regex,
}

impl NumericDate {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4})\b"),
        }
    }
}

impl DateMatcher for NumericDate {
    fn label(&self) -> &'static str {
        "numeric"
    }

    fn find(&self, text: &str, _today: NaiveDate) -> Option<NaiveDate> {
        let c = self.regex.captures(text)?;
        let first: u32 = parse_number(&c[1])?;
        let second: u32 = parse_number(&c[2])?;
        let year: i32 = parse_number(&c[3])?;
        NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
    }
}

/// ISO 8601 calendar date
pub struct IsoDate {
    regex: Regex,
}

impl IsoDate {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"\b(\d{4})-(\d{2})-(\d{2})\b"),
        }
    }
}

impl DateMatcher for IsoDate {
    fn label(&self) -> &'static str {
        "iso"
    }

    fn find(&self, text: &str, _today: NaiveDate) -> Option<NaiveDate> {
        let c = self.regex.captures(text)?;
        NaiveDate::from_ymd_opt(
            parse_number(&c[1])?,
            parse_number(&c[2])?,
            parse_number(&c[3])?,
        )
    }
}

/// "next <weekday>"
pub struct NextWeekday {
    regex: Regex,
}

impl NextWeekday {
    pub fn new() -> Self {
        Self {
            regex: pattern(&format!(r"\bnext\s+({})\b", WEEKDAYS)),
        }
    }
}

impl DateMatcher for NextWeekday {
    fn label(&self) -> &'static str {
        "next_weekday"
    }

    fn find(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let c = self.regex.captures(text)?;
        Some(next_weekday(today, weekday_from_name(&c[1])?))
    }
}

/// today / tomorrow / next week / next month
pub struct RelativeWord {
    regex: Regex,
}

impl RelativeWord {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"\b(today|tomorrow|next week|next month)\b"),
        }
    }
}

impl DateMatcher for RelativeWord {
    fn label(&self) -> &'static str {
        "relative"
    }

    fn find(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let c = self.regex.captures(text)?;
        match &c[1] {
            "today" => Some(today),
            "tomorrow" => today.checked_add_days(Days::new(1)),
            "next week" => today.checked_add_days(Days::new(7)),
            _ => today.checked_add_months(Months::new(1)),
        }
    }
}

/// "in N days / weeks / months"
pub struct InDuration {
    regex: Regex,
}

impl InDuration {
    pub fn new() -> Self {
        Self {
            regex: pattern(r"\bin\s+(\d+)\s+(day|week|month)s?\b"),
        }
    }
}

impl DateMatcher for InDuration {
    fn label(&self) -> &'static str {
        "in_duration"
    }

    fn find(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let c = self.regex.captures(text)?;
        let amount: u32 = parse_number(&c[1])?;
        match &c[2] {
            "day" => today.checked_add_days(Days::new(u64::from(amount))),
            "week" => today.checked_add_days(Days::new(u64::from(amount).checked_mul(7)?)),
            _ => today.checked_add_months(Months::new(amount)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateToken {
    Month(u32),
    Day(u32),
    Year(i32),
    Weekday(Weekday),
    Filler,
}

/// Lenient scan of date-like token spans, the last resort
#[derive(Debug, Clone, Copy, Default)]
pub struct DateSpanScanner;

impl DateSpanScanner {
    fn classify(token: &str) -> Option<DateToken> {
        let token = token.trim_end_matches(',');
        if let Some(month) = month_number(token) {
            return Some(DateToken::Month(month));
        }
        if let Some(weekday) = weekday_from_name(token).filter(|_| token.len() > 3) {
            return Some(DateToken::Weekday(weekday));
        }
        if token == "of" || token == "the" {
            return Some(DateToken::Filler);
        }
        let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let suffix = &token[digits.len()..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
            return None;
        }
        let value: u32 = digits.parse().ok()?;
        match (digits.len(), suffix) {
            (4, "") if (1900..=2100).contains(&value) => Some(DateToken::Year(value as i32)),
            (1 | 2, _) if (1..=31).contains(&value) => Some(DateToken::Day(value)),
            _ => None,
        }
    }

    fn spans(text: &str) -> Vec<Vec<DateToken>> {
        let mut spans = Vec::new();
        let mut current = Vec::new();
        for token in tokens(text) {
            match Self::classify(token) {
                Some(DateToken::Filler) if current.is_empty() => {}
                Some(date_token) => current.push(date_token),
                None => {
                    if !current.is_empty() {
                        spans.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            spans.push(current);
        }
        spans
    }

    fn resolve(span: &[DateToken], today: NaiveDate) -> Option<NaiveDate> {
        let mut month = None;
        let mut day = None;
        let mut year = None;
        let mut weekday = None;
        for token in span {
            match *token {
                DateToken::Month(m) if month.is_none() => month = Some(m),
                DateToken::Day(d) if day.is_none() => day = Some(d),
                DateToken::Year(y) if year.is_none() => year = Some(y),
                DateToken::Weekday(w) if weekday.is_none() => weekday = Some(w),
                _ => {}
            }
        }
        match (month, day) {
            (Some(month), Some(day)) => {
                NaiveDate::from_ymd_opt(year.unwrap_or_else(|| today.year()), month, day)
            }
            _ => weekday.map(|weekday| next_weekday(today, weekday)),
        }
    }
}

impl DateMatcher for DateSpanScanner {
    fn label(&self) -> &'static str {
        "span_scan"
    }

    fn find(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        Self::spans(text)
            .iter()
            .find_map(|span| Self::resolve(span, today))
    }
}

/// Start/finish-aware date extraction
pub struct DateExtractor {
    finish_marker: Regex,
    month_day: Regex,
    range: Regex,
    fallbacks: Vec<Box<dyn DateMatcher>>,
}

impl DateExtractor {
    pub fn new() -> Self {
        let month_day = format!(r"({})\s+(\d{{1,2}})(?:st|nd|rd|th)?", MONTH_NAMES);
        Self {
            finish_marker: pattern(r"\b(finish|end)\s+date\b"),
            month_day: pattern(&format!(r"\b{}(?:,?\s*(\d{{4}}))?\b", month_day)),
            range: pattern(&format!(
                r"\b(?:from|between)\s+({md})\s+(?:to|and|until|through|till)\s+({md})\b",
                md = format!(r"(?:{})\s+\d{{1,2}}(?:st|nd|rd|th)?", MONTH_NAMES)
            )),
            fallbacks: vec![
                Box::new(NumericDate::new()),
                Box::new(IsoDate::new()),
                Box::new(NextWeekday::new()),
                Box::new(RelativeWord::new()),
                Box::new(InDuration::new()),
                Box::new(DateSpanScanner),
            ],
        }
    }

    pub fn date_type(&self, lower: &str) -> DateType {
        if self.finish_marker.is_match(lower) {
            DateType::Finish
        } else {
            DateType::Start
        }
    }

    /// `<Month> <Day>` with an optional year, defaulting to the current year
    pub fn month_day(&self, lower: &str, today: NaiveDate) -> Option<NaiveDate> {
        let c = self.month_day.captures(lower)?;
        let year = match c.get(3) {
            Some(year) => parse_number(year.as_str())?,
            None => today.year(),
        };
        NaiveDate::from_ymd_opt(year, month_number(&c[1])?, parse_number(&c[2])?)
    }

    /// An explicit "from <date> to <date>" range
    pub fn range(&self, lower: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let c = self.range.captures(lower)?;
        let start = self.month_day(&c[1], today)?;
        let end = self.month_day(&c[2], today)?;
        (start <= end).then_some((start, end))
    }

    /// First fallback matcher hit, with its label
    pub fn fallback(&self, lower: &str, today: NaiveDate) -> Option<(&'static str, NaiveDate)> {
        self.fallbacks
            .iter()
            .find_map(|matcher| matcher.find(lower, today).map(|date| (matcher.label(), date)))
    }

    pub fn extract(&self, utterance: &Utterance, today: NaiveDate) -> DateInfo {
        let lower = utterance.lower.as_str();
        let date_type = self.date_type(lower);

        if let Some((start, end)) = self.range(lower, today) {
            return DateInfo {
                start_date: Some(start),
                end_date: Some(end),
                date_type,
            };
        }

        let date = self
            .month_day(lower, today)
            .or_else(|| self.fallback(lower, today).map(|(_, date)| date));

        match date {
            Some(date) => DateInfo::single(date, date_type),
            None => DateInfo {
                date_type,
                ..DateInfo::default()
            },
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A Friday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn extract(text: &str) -> DateInfo {
        DateExtractor::new().extract(&Utterance::new(text), today())
    }

    #[test]
    fn test_start_date_defaults_to_current_year() {
        let info = extract("Update start date for door 1000 installation to March 9");
        assert_eq!(info.start_date, Some(date(2026, 3, 9)));
        assert_eq!(info.end_date, None);
        assert_eq!(info.date_type, DateType::Start);
    }

    #[test]
    fn test_finish_date_goes_to_end_date() {
        let info = extract("Update finish date for door 1000 installation to March 9");
        assert_eq!(info.end_date, Some(date(2026, 3, 9)));
        assert_eq!(info.start_date, None);
        assert_eq!(info.date_type, DateType::Finish);
    }

    #[test]
    fn test_end_date_phrase_is_finish() {
        let info = extract("set the end date of roofing to April 2nd");
        assert_eq!(info.date_type, DateType::Finish);
        assert_eq!(info.end_date, Some(date(2026, 4, 2)));
    }

    #[test]
    fn test_explicit_year_is_honoured() {
        let info = extract("move slab a to january 15, 2027");
        assert_eq!(info.start_date, Some(date(2027, 1, 15)));
    }

    #[test]
    fn test_invalid_calendar_date_is_a_miss() {
        let info = extract("move slab a to february 30");
        assert!(info.is_empty());
    }

    #[test]
    fn test_abbreviated_month_with_year() {
        let info = extract("schedule roofing for sept 3 2027");
        assert_eq!(info.start_date, Some(date(2027, 9, 3)));
    }

    #[test]
    fn test_numeric_day_month_year() {
        assert_eq!(extract("start on 5/12/2026").start_date, Some(date(2026, 12, 5)));
        // 13 cannot be a month, so this reads as month/day
        assert_eq!(extract("start on 4/13/2026").start_date, Some(date(2026, 4, 13)));
        assert!(extract("start on 31/31/2026").is_empty());
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(extract("start 2026-11-02").start_date, Some(date(2026, 11, 2)));
    }

    #[test]
    fn test_relative_dates() {
        assert_eq!(extract("start tomorrow").start_date, Some(date(2026, 10, 17)));
        assert_eq!(extract("start next week").start_date, Some(date(2026, 10, 23)));
        assert_eq!(extract("start next month").start_date, Some(date(2026, 11, 16)));
        assert_eq!(extract("start next friday").start_date, Some(date(2026, 10, 23)));
        assert_eq!(extract("start next monday").start_date, Some(date(2026, 10, 19)));
        assert_eq!(extract("start in 3 days").start_date, Some(date(2026, 10, 19)));
        assert_eq!(extract("start in 2 weeks").start_date, Some(date(2026, 10, 30)));
        assert_eq!(extract("start in 1 month").start_date, Some(date(2026, 11, 16)));
    }

    #[test]
    fn test_next_month_clamps_to_month_end() {
        let jan_31 = date(2027, 1, 31);
        let info = DateExtractor::new().extract(&Utterance::new("start next month"), jan_31);
        assert_eq!(info.start_date, Some(date(2027, 2, 28)));
    }

    #[test]
    fn test_span_scanner_reads_loose_phrasing() {
        assert_eq!(
            extract("finish date for stair 2 is the 9th of march").end_date,
            Some(date(2026, 3, 9))
        );
        assert_eq!(extract("start 12 nov 2027").start_date, Some(date(2027, 11, 12)));
        assert_eq!(extract("start on friday").start_date, Some(date(2026, 10, 23)));
    }

    #[test]
    fn test_range_sets_both_dates() {
        let info = extract("create drywall from March 2 to March 20");
        assert_eq!(info.start_date, Some(date(2026, 3, 2)));
        assert_eq!(info.end_date, Some(date(2026, 3, 20)));
    }

    #[test]
    fn test_no_date() {
        let info = extract("Update the status for stair 1000 to in progress");
        assert!(info.is_empty());
        assert_eq!(info.date_type, DateType::Start);
    }

    #[test]
    fn test_fallback_order() {
        let extractor = DateExtractor::new();
        let (label, _) = extractor.fallback("due 1/2/2027 or tomorrow", today()).unwrap();
        assert_eq!(label, "numeric");
        let (label, _) = extractor.fallback("due tomorrow", today()).unwrap();
        assert_eq!(label, "relative");
    }
}
