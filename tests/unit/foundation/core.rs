use super::*;
use chrono::TimeZone;

#[test]
fn size_class_parses_case_insensitively_with_default() {
    assert_eq!(SizeClass::parse_or_default("XL"), SizeClass::Xl);
    assert_eq!(SizeClass::parse_or_default("s"), SizeClass::S);
    assert_eq!(SizeClass::parse_or_default("verybig"), SizeClass::M);
    assert_eq!(SizeClass::parse_or_default(""), SizeClass::M);
}

#[test]
fn resolutions_match_the_fixed_table() {
    assert_eq!(SizeClass::Xs.resolution(), Resolution { width: 500, height: 281 });
    assert_eq!(SizeClass::M.resolution(), Resolution { width: 2000, height: 1125 });
    assert_eq!(SizeClass::Xxl.resolution(), Resolution { width: 5000, height: 2813 });
}

#[test]
fn privileges_scale_with_size() {
    assert_eq!(SizeClass::M.required_privilege(), Privilege::Open);
    assert_eq!(SizeClass::L.required_privilege(), Privilege::Open);
    assert_eq!(SizeClass::Xs.required_privilege(), Privilege::Authenticated);
    assert_eq!(SizeClass::S.required_privilege(), Privilege::Authenticated);
    assert_eq!(SizeClass::Xl.required_privilege(), Privilege::Group(ADMIN_GROUP));
    assert_eq!(SizeClass::Xxl.required_privilege(), Privilege::Group(ADMIN_GROUP));
}

#[test]
fn time_bucket_truncates_to_the_minute() {
    let t = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 59).unwrap();
    assert_eq!(time_bucket(t), "2024-01-01-00-00");
    let t = chrono::Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
    assert_eq!(time_bucket(t), "2024-12-31-23-59");
}

#[test]
fn cache_key_lowercases_location_and_size() {
    let req = GenerationRequest::with_time_bucket(
        "Australia",
        "Brisbane",
        SizeClass::M,
        None,
        "2024-01-01-00-00".to_string(),
    );
    let key = req.cache_key();
    assert_eq!(key.as_str(), "australia_brisbane_m_2024-01-01-00-00");
    assert_eq!(key.file_key(), "australia_brisbane_m_2024-01-01-00-00.png");
}

#[test]
fn requests_in_the_same_minute_collapse_onto_one_key() {
    let bucket = time_bucket(chrono::Utc.with_ymd_and_hms(2024, 5, 5, 10, 30, 1).unwrap());
    let a = GenerationRequest::with_time_bucket("AU", "Perth", SizeClass::S, None, bucket.clone());
    let b = GenerationRequest::with_time_bucket("au", "PERTH", SizeClass::S, None, bucket);
    assert_eq!(a.cache_key(), b.cache_key());
}

#[test]
fn claims_distinguish_anonymous_from_authenticated() {
    let anon = GenerationRequest::with_time_bucket("a", "b", SizeClass::M, None, "t".into());
    assert!(!anon.is_authenticated());
    assert!(!anon.has_group("admin"));

    let user = GenerationRequest::with_time_bucket(
        "a",
        "b",
        SizeClass::M,
        Some(vec![]),
        "t".into(),
    );
    assert!(user.is_authenticated());
    assert!(!user.has_group("admin"));

    let admin = GenerationRequest::with_time_bucket(
        "a",
        "b",
        SizeClass::M,
        Some(vec!["admin".to_string()]),
        "t".into(),
    );
    assert!(admin.has_group("admin"));
}

#[test]
fn request_round_trips_as_a_task_body() {
    let req = GenerationRequest::with_time_bucket(
        "Australia",
        "Brisbane",
        SizeClass::Xl,
        Some(vec!["admin".to_string()]),
        "2024-01-01-00-00".to_string(),
    );
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"xl\""));
    let back: GenerationRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, req);
}
