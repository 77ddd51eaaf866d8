//! The `defineProps` descriptor bitmap (§6, normative).
//!
//! A compact 3-bit-plus-flag encoding of a property descriptor's four
//! JS-visible flags, shared by the tracer (which records the descriptor it
//! observed) and the emitter (which encodes it into the `defineProps` call).

use bitflags::bitflags;

bitflags! {
    /// Bit 0: non-writable. Bit 1: non-enumerable. Bit 2: non-configurable.
    /// Bit 3: the property name is literally `__proto__` (must be defined
    /// via `defineProps`, never via object-literal `__proto__: x`, which JS
    /// interprets as a prototype-mutation shorthand instead of a data key).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DescriptorBitmap: u8 {
        const NON_WRITABLE     = 1 << 0;
        const NON_ENUMERABLE   = 1 << 1;
        const NON_CONFIGURABLE = 1 << 2;
        const LITERAL_PROTO    = 1 << 3;
    }
}

impl DescriptorBitmap {
    /// The bitmap for the JS default (value property, all flags `true`):
    /// writable, enumerable, configurable.
    #[must_use]
    pub const fn default_data() -> Self {
        Self::empty()
    }

    #[must_use]
    pub const fn writable(self) -> bool {
        !self.contains(Self::NON_WRITABLE)
    }

    #[must_use]
    pub const fn enumerable(self) -> bool {
        !self.contains(Self::NON_ENUMERABLE)
    }

    #[must_use]
    pub const fn configurable(self) -> bool {
        !self.contains(Self::NON_CONFIGURABLE)
    }

    #[must_use]
    pub fn from_flags(writable: bool, enumerable: bool, configurable: bool) -> Self {
        let mut bitmap = Self::empty();
        bitmap.set(Self::NON_WRITABLE, !writable);
        bitmap.set(Self::NON_ENUMERABLE, !enumerable);
        bitmap.set(Self::NON_CONFIGURABLE, !configurable);
        bitmap
    }
}

/// The four JS-visible descriptor flags, as observed by the tracer. Either a
/// value descriptor (`writable`) or an accessor descriptor (getter/setter,
/// no `writable`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyFlags {
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyFlags {
    #[must_use]
    pub const fn all_true() -> Self {
        Self { enumerable: true, configurable: true }
    }

    #[must_use]
    pub fn to_bitmap(self, writable: Option<bool>) -> DescriptorBitmap {
        DescriptorBitmap::from_flags(writable.unwrap_or(true), self.enumerable, self.configurable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bitmap_means_all_flags_true() {
        let bm = DescriptorBitmap::default_data();
        assert!(bm.writable());
        assert!(bm.enumerable());
        assert!(bm.configurable());
    }

    #[test]
    fn from_flags_roundtrips() {
        let bm = DescriptorBitmap::from_flags(false, true, false);
        assert!(!bm.writable());
        assert!(bm.enumerable());
        assert!(!bm.configurable());
    }
}
