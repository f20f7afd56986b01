use super::*;

#[test]
fn seed_url_percent_encodes_the_zone_separator() {
    let resolver =
        SeedResolver::new("https://timeapi.io/api/time/current/zone?timeZone=").unwrap();
    assert_eq!(
        resolver.seed_url("Australia", "Brisbane"),
        "https://timeapi.io/api/time/current/zone?timeZone=Australia%2FBrisbane"
    );
}

#[test]
fn local_time_parses_the_upstream_body() {
    let t: LocalTime =
        serde_json::from_str(r#"{"date":"2024-01-01","time":"00:00:00"}"#).unwrap();
    assert_eq!(t.date, "2024-01-01");
    assert_eq!(t.time, "00:00:00");

    // Extra upstream fields are ignored.
    let t: LocalTime = serde_json::from_str(
        r#"{"date":"2024-01-01","time":"00:00:00","timeZone":"Australia/Brisbane","dayOfWeek":"Monday"}"#,
    )
    .unwrap();
    assert_eq!(t.time, "00:00:00");
}

#[test]
fn malformed_bodies_fail_to_parse() {
    assert!(serde_json::from_str::<LocalTime>(r#"{"date":"2024-01-01"}"#).is_err());
    assert!(serde_json::from_str::<LocalTime>("[]").is_err());
}
