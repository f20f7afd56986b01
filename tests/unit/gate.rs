use super::*;
use crate::foundation::core::SizeClass;

fn request(size: SizeClass, claims: Option<Vec<String>>) -> GenerationRequest {
    GenerationRequest::with_time_bucket("Australia", "Brisbane", size, claims, "t".to_string())
}

#[test]
fn mid_range_classes_are_open() {
    assert!(authorize(&request(SizeClass::M, None)).is_ok());
    assert!(authorize(&request(SizeClass::L, None)).is_ok());
}

#[test]
fn small_classes_require_an_identity() {
    for size in [SizeClass::Xs, SizeClass::S] {
        let denied = authorize(&request(size, None));
        assert!(matches!(denied, Err(FractimeError::PermissionDenied(_))));
        // Authenticated with zero groups is enough.
        assert!(authorize(&request(size, Some(vec![]))).is_ok());
    }
}

#[test]
fn large_classes_require_the_admin_group() {
    for size in [SizeClass::Xl, SizeClass::Xxl] {
        assert!(matches!(
            authorize(&request(size, None)),
            Err(FractimeError::PermissionDenied(_))
        ));
        assert!(matches!(
            authorize(&request(size, Some(vec!["users".to_string()]))),
            Err(FractimeError::PermissionDenied(_))
        ));
        assert!(authorize(&request(size, Some(vec!["admin".to_string()]))).is_ok());
    }
}

#[test]
fn claim_keys_shadow_the_cache_key() {
    let key = request(SizeClass::M, None).cache_key();
    assert_eq!(claim_key(&key), format!("{key}.claim"));
    assert_ne!(claim_key(&key), key.as_str());
}
