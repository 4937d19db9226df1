use std::fmt::Display;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Duration,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use regex::Regex;

const DISPLAY_FORMAT: &str =
  "%Y-%m-%d %H:%M";
const INPUT_FORMAT: &str =
  "%Y-%m-%dT%H:%M";

const LOCAL_DATETIME_FORMATS: [&str;
  4] = [
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d %H:%M"
];

/// Formats a deadline for list rows.
#[must_use]
pub fn format_deadline<Tz>(
  dt: DateTime<Utc>,
  tz: &Tz
) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display
{
  dt.with_timezone(tz)
    .format(DISPLAY_FORMAT)
    .to_string()
}

/// Formats a deadline as a `datetime-local` input value.
#[must_use]
pub fn format_input_value<Tz>(
  dt: DateTime<Utc>,
  tz: &Tz
) -> String
where
  Tz: TimeZone,
  Tz::Offset: Display
{
  dt.with_timezone(tz)
    .format(INPUT_FORMAT)
    .to_string()
}

fn to_utc_from_local<Tz: TimeZone>(
  local_naive: NaiveDateTime,
  tz: &Tz,
  context: &str
) -> anyhow::Result<DateTime<Utc>> {
  match tz
    .from_local_datetime(&local_naive)
  {
    | LocalResult::Single(local_dt) => {
      Ok(local_dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      let first = first.with_timezone(&Utc);
      let second =
        second.with_timezone(&Utc);
      tracing::warn!(
        context,
        first = %first,
        second = %second,
        "ambiguous local datetime; using earliest"
      );
      Ok(first.min(second))
    }
    | LocalResult::None => {
      Err(anyhow!(
        "local datetime does not \
         exist in the configured \
         timezone: {context}"
      ))
    }
  }
}

fn local_midnight<Tz: TimeZone>(
  date: NaiveDate,
  tz: &Tz,
  context: &str
) -> anyhow::Result<DateTime<Utc>> {
  let midnight = date
    .and_hms_opt(0, 0, 0)
    .ok_or_else(|| {
      anyhow!(
        "failed to construct \
         midnight for {context}"
      )
    })?;
  to_utc_from_local(
    midnight, tz, context
  )
}

/// Parses a deadline typed into a form or passed on the command line.
///
/// An empty input means "no deadline". Wall-clock inputs are read in `tz`.
#[tracing::instrument(skip(now, tz), fields(input = input))]
pub fn parse_deadline_input<Tz>(
  input: &str,
  now: DateTime<Utc>,
  tz: &Tz
) -> anyhow::Result<Option<DateTime<Utc>>>
where
  Tz: TimeZone
{
  let token = input.trim();
  if token.is_empty() {
    return Ok(None);
  }

  let lower =
    token.to_ascii_lowercase();
  let today = now
    .with_timezone(tz)
    .date_naive();

  match lower.as_str() {
    | "now" => return Ok(Some(now)),
    | "today" => {
      return local_midnight(
        today, tz, "today"
      )
      .map(Some);
    }
    | "tomorrow" => {
      return local_midnight(
        today + Duration::days(1),
        tz,
        "tomorrow"
      )
      .map(Some);
    }
    | "yesterday" => {
      return local_midnight(
        today - Duration::days(1),
        tz,
        "yesterday"
      )
      .map(Some);
    }
    | _ => {}
  }

  let relative = Regex::new(
    r"^\+(\d{1,4})\s*([mhdw])$"
  )
  .map_err(|err| {
    anyhow!(
      "internal regex compile \
       failure: {err}"
    )
  })?;

  if let Some(caps) =
    relative.captures(&lower)
  {
    let amount: i64 = caps[1]
      .parse()
      .context(
        "invalid relative offset"
      )?;
    let delta = match &caps[2] {
      | "m" => Duration::minutes(amount),
      | "h" => Duration::hours(amount),
      | "d" => Duration::days(amount),
      | _ => Duration::weeks(amount)
    };
    return Ok(Some(now + delta));
  }

  if let Ok(parsed) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(Some(
      parsed.with_timezone(&Utc)
    ));
  }

  for format in LOCAL_DATETIME_FORMATS
  {
    if let Ok(naive) =
      NaiveDateTime::parse_from_str(
        token, format
      )
    {
      return to_utc_from_local(
        naive, tz, token
      )
      .map(Some);
    }
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return local_midnight(
      date, tz, token
    )
    .map(Some);
  }

  Err(anyhow!(
    "unrecognized deadline: {token}"
  ))
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    TimeZone,
    Utc
  };

  use super::{
    format_deadline,
    format_input_value,
    parse_deadline_input
  };

  fn fixed_now() -> chrono::DateTime<Utc>
  {
    Utc
      .with_ymd_and_hms(
        2026, 2, 17, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  #[test]
  fn empty_input_means_no_deadline() {
    assert_eq!(
      parse_deadline_input(
        "  ",
        fixed_now(),
        &Utc
      )
      .expect("parse empty"),
      None
    );
  }

  #[test]
  fn parses_datetime_local_value() {
    let parsed = parse_deadline_input(
      "2026-03-01T09:30",
      fixed_now(),
      &Utc
    )
    .expect("parse datetime-local")
    .expect("has deadline");
    assert_eq!(
      format_deadline(parsed, &Utc),
      "2026-03-01 09:30"
    );
  }

  #[test]
  fn parses_in_given_timezone() {
    let tz = chrono_tz::Asia::Tokyo;
    let parsed = parse_deadline_input(
      "2026-03-01 09:00",
      fixed_now(),
      &tz
    )
    .expect("parse tokyo")
    .expect("has deadline");
    assert_eq!(
      parsed,
      Utc
        .with_ymd_and_hms(
          2026, 3, 1, 0, 0, 0
        )
        .single()
        .expect("valid")
    );
    assert_eq!(
      format_input_value(parsed, &tz),
      "2026-03-01T09:00"
    );
  }

  #[test]
  fn parses_keywords_and_offsets() {
    let now = fixed_now();
    let tomorrow =
      parse_deadline_input(
        "tomorrow", now, &Utc
      )
      .expect("parse tomorrow")
      .expect("has deadline");
    assert_eq!(
      format_deadline(tomorrow, &Utc),
      "2026-02-18 00:00"
    );

    let in_two_hours =
      parse_deadline_input(
        "+2h", now, &Utc
      )
      .expect("parse offset")
      .expect("has deadline");
    assert_eq!(
      in_two_hours - now,
      chrono::Duration::hours(2)
    );
  }

  #[test]
  fn parses_rfc3339() {
    let parsed = parse_deadline_input(
      "2026-04-01T10:00:00.000Z",
      fixed_now(),
      &Utc
    )
    .expect("parse rfc3339")
    .expect("has deadline");
    assert_eq!(
      format_deadline(parsed, &Utc),
      "2026-04-01 10:00"
    );
  }

  #[test]
  fn rejects_garbage() {
    assert!(
      parse_deadline_input(
        "next blue moon",
        fixed_now(),
        &Utc
      )
      .is_err()
    );
  }

  #[test]
  fn relative_offsets_need_a_known_unit() {
    let now = fixed_now();
    let in_a_week =
      parse_deadline_input(
        "+1w", now, &Utc
      )
      .expect("parse week offset")
      .expect("has deadline");
    assert_eq!(
      in_a_week - now,
      Duration::weeks(1)
    );
    assert!(
      parse_deadline_input(
        "+3y", now, &Utc
      )
      .is_err()
    );
  }
}
