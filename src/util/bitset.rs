//! Fixed-width bit-set newtypes
// (c) 2026 the xfer-engine developers

// This macro keeps the algebra for reply codes and command flags in one place.
// Each invocation generates a newtype over an unsigned integer, a named constant per
// entry, and the set operations (union, intersection, difference, emptiness).
macro_rules! bit_set {
    (
        $(#[$attr:meta])*
        $vis:vis $name:ident => $ty:ty {
            $( $(#[$v_attr:meta])* $konst:ident => $val:expr ),+
            $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name($ty);

        impl $name {
            $(
                $(#[$v_attr])*
                $vis const $konst: Self = Self($val);
            )+

            /// Every named constant, paired with its symbolic name
            const NAMED: &'static [(&'static str, Self)] = &[$((stringify!($konst), Self::$konst)),+];

            /// Constructs a value from raw bits
            #[must_use]
            $vis const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Returns the raw bits
            #[must_use]
            $vis const fn bits(self) -> $ty {
                self.0
            }

            /// Are no bits set?
            #[must_use]
            $vis const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Are all the bits of `other` set in `self`?
            #[must_use]
            $vis const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Do `self` and `other` have any bits in common?
            #[must_use]
            $vis const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Bitwise OR
            #[must_use]
            $vis const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Bitwise AND
            #[must_use]
            $vis const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            /// Bitwise AND-NOT: the bits of `self` which are not in `other`
            #[must_use]
            $vis const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.union(rhs);
            }
        }

        impl ::std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                self.intersection(rhs)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut names = Vec::new();
                let mut seen = 0;
                for (n, v) in Self::NAMED {
                    if v.0 != 0 && self.0 & v.0 == v.0 {
                        names.push((*n).to_string());
                        seen |= v.0;
                    }
                }
                let rest = self.0 & !seen;
                if rest != 0 {
                    names.push(format!("{rest:#x}"));
                }
                if names.is_empty() {
                    let zero = Self::NAMED
                        .iter()
                        .find(|(_, v)| v.0 == 0)
                        .map_or("0", |(n, _)| *n);
                    names.push(zero.to_string());
                }
                write!(f, "{}({})", stringify!($name), names.join(" | "))
            }
        }
    };
}

pub(crate) use bit_set;
