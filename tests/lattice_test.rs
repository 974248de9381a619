use tfexpr::lattice::Type;

// ─── Element kind ────────────────────────────────────────────────────────────

#[test]
fn test_bool_is_its_own_element_type() {
    assert_eq!(Type::BOOL.element_type(), Type::BOOL);
}

#[test]
fn test_string_list_element_is_string() {
    let t = Type::STRING.list_of();
    assert_eq!(t.element_type(), Type::STRING);
    assert!(t.is_list());
}

#[test]
fn test_unknown_map_output_round_trips_all_modifiers() {
    let t = Type::UNKNOWN.map_of().output_of();
    assert!(t.is_map());
    assert!(t.is_output());
    assert!(!t.is_list());
    assert_eq!(t.element_type(), Type::UNKNOWN);
}

// ─── Legality ────────────────────────────────────────────────────────────────

#[test]
fn test_plain_element_kinds_are_legal() {
    assert!(Type::BOOL.is_legal());
    assert!(Type::STRING.is_legal());
    assert!(Type::NUMBER.is_legal());
    assert!(Type::UNKNOWN.is_legal());
}

#[test]
fn test_modifiers_do_not_affect_legality() {
    assert!(Type::NUMBER.list_of().output_of().is_legal());
}

#[test]
fn test_two_element_bits_is_illegal() {
    let illegal = Type::STRING | Type::NUMBER;
    assert!(!illegal.is_legal());
}

#[test]
fn test_no_element_bits_is_illegal() {
    let illegal = Type::LIST;
    assert!(!illegal.is_legal());
}

// ─── Defaults ────────────────────────────────────────────────────────────────

#[test]
fn test_default_type_is_unknown() {
    assert_eq!(Type::default(), Type::UNKNOWN);
}
