use super::*;

fn seed(date: &str, time: &str) -> LocalTime {
    LocalTime {
        date: date.to_string(),
        time: time.to_string(),
    }
}

#[test]
fn missing_seed_maps_to_the_fallback() {
    let mapper = ParameterMapper::builtin().unwrap();
    assert_eq!(mapper.map(None), FALLBACK_PARAMS);
}

#[test]
fn identical_seed_maps_to_identical_params() {
    let mapper = ParameterMapper::builtin().unwrap();
    let s = seed("2024-06-01", "13:37:00");
    assert_eq!(mapper.map(Some(&s)), mapper.map(Some(&s)));
}

#[test]
fn params_are_always_table_entries() {
    let mapper = ParameterMapper::builtin().unwrap();
    let seeds = [
        seed("2024-01-01", "00:00:00"),
        seed("2025-07-14", "09:15:30"),
        seed("1999-12-31", "23:59:59"),
        seed("2030-06-15", "12:30:45"),
    ];
    for s in &seeds {
        let p = mapper.map(Some(s));
        let in_table = (0..mapper.table().len()).any(|i| mapper.table().get(i) == Some(p));
        assert!(in_table, "{p:?} is not a curated constant");
        assert!(p.real.abs() < 2.0 && p.imaginary.abs() < 2.0);
    }
}

// Digest indices pinned against an independent implementation of the
// XOR-mod-N combinator over the 20-entry built-in table.
#[test]
fn known_seeds_hit_known_table_entries() {
    let mapper = ParameterMapper::builtin().unwrap();
    assert_eq!(mapper.table().len(), 20);

    // SHA256("2024-01-01_00:00:00") xor SHA256("..._second"), mod 20 == 10.
    let p = mapper.map(Some(&seed("2024-01-01", "00:00:00")));
    assert_eq!(p, mapper.table().get(10).unwrap());
    assert_eq!(p, FractalParameters { real: -0.8, imaginary: 0.156 });

    // Same combinator, mod 20 == 5 for this seed.
    let p = mapper.map(Some(&seed("2030-06-15", "12:30:45")));
    assert_eq!(p, mapper.table().get(5).unwrap());
    assert_eq!(p, FractalParameters { real: -0.835, imaginary: -0.2321 });
}

#[test]
fn xor_mod_matches_small_number_arithmetic() {
    let mut h1 = [0u8; 32];
    let mut h2 = [0u8; 32];

    h1[31] = 0x0f;
    h2[31] = 0x05;
    assert_eq!(xor_mod(&h1, &h2, 7), (0x0f ^ 0x05) % 7);

    // Values spanning several bytes still reduce like plain integers.
    h1[24..32].copy_from_slice(&123_456_789_012_345_u64.to_be_bytes());
    h2[24..32].copy_from_slice(&987_654_321_098_765_u64.to_be_bytes());
    let expected = ((123_456_789_012_345_u64 ^ 987_654_321_098_765_u64) % 19) as usize;
    assert_eq!(xor_mod(&h1, &h2, 19), expected);
}

#[test]
fn xor_mod_always_lands_in_range() {
    let h1 = sha256("anything");
    let h2 = sha256("anything_second");
    for n in [1usize, 2, 3, 19, 20, 1000] {
        assert!(xor_mod(&h1, &h2, n) < n);
    }
}

#[test]
fn empty_table_is_rejected() {
    assert!(ConstantTable::from_json_str("[]").is_err());
    assert!(ConstantTable::from_json_str("not json").is_err());
}

#[test]
fn builtin_table_parses() {
    let table = ConstantTable::builtin().unwrap();
    assert!(!table.is_empty());
    assert_eq!(table.len(), 20);
}
