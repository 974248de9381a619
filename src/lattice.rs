//! The bit-encoded type lattice bound nodes carry.
//!
//! A single machine word encodes an element kind plus independent modifier
//! bits, so composition (`list_of`, `output_of`) is a bitwise union instead
//! of a new heap-allocated type object.

use bitflags::bitflags;

bitflags! {
    /// A bound expression's type: exactly one element-kind bit, plus any
    /// subset of the modifier bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Type: u8 {
        // Element kind (exactly one of these is set on any legal value).
        const BOOL    = 1 << 0;
        const STRING  = 1 << 1;
        const NUMBER  = 1 << 2;
        const UNKNOWN = 1 << 3;

        // Modifiers (independent, may co-occur in principle).
        const LIST    = 1 << 4;
        const MAP     = 1 << 5;
        const OUTPUT  = 1 << 6;
    }
}

const ELEMENT_MASK: Type = Type::BOOL
    .union(Type::STRING)
    .union(Type::NUMBER)
    .union(Type::UNKNOWN);

const MODIFIER_MASK: Type = Type::LIST.union(Type::MAP).union(Type::OUTPUT);

impl Type {
    /// True if exactly one element-kind bit is set and no stray bits leak in.
    pub fn is_legal(self) -> bool {
        (self & ELEMENT_MASK).bits().count_ones() == 1 && (self & !(ELEMENT_MASK | MODIFIER_MASK)).is_empty()
    }

    pub fn is_list(self) -> bool {
        self.contains(Type::LIST)
    }

    pub fn list_of(self) -> Type {
        self | Type::LIST
    }

    pub fn is_map(self) -> bool {
        self.contains(Type::MAP)
    }

    pub fn map_of(self) -> Type {
        self | Type::MAP
    }

    pub fn is_output(self) -> bool {
        self.contains(Type::OUTPUT)
    }

    pub fn output_of(self) -> Type {
        self | Type::OUTPUT
    }

    /// The element type, with all modifier bits masked off.
    pub fn element_type(self) -> Type {
        self & ELEMENT_MASK
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_masks_off_modifiers() {
        let t = Type::STRING.list_of().output_of();
        assert_eq!(t.element_type(), Type::STRING);
        assert!(t.is_list());
        assert!(t.is_output());
        assert!(!t.is_map());
    }

    #[test]
    fn list_of_string_element_is_string() {
        let t = Type::STRING.list_of();
        assert_eq!(t.element_type(), Type::STRING);
    }

    #[test]
    fn legal_types_have_exactly_one_element_bit() {
        assert!(Type::BOOL.is_legal());
        assert!(Type::NUMBER.list_of().is_legal());
        assert!(Type::UNKNOWN.map_of().output_of().is_legal());
    }

    #[test]
    fn illegal_type_with_two_element_bits_is_rejected() {
        let illegal = Type::BOOL | Type::NUMBER;
        assert!(!illegal.is_legal());
    }

    #[test]
    fn default_type_is_unknown() {
        assert_eq!(Type::default(), Type::UNKNOWN);
    }
}
