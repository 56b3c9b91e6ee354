// Equality and rendering primitives shared by every generated Rust harness.
// This file is appended verbatim to the Rust harness template, so it must stay
// free of `use` items and crate-relative paths.

/// Floating-point types whose ULP is derived from their bit pattern.
pub trait UlpFloat: Copy + PartialEq + PartialOrd {
    fn is_normal_value(self) -> bool;
    fn same_bits(self, other: Self) -> bool;
    fn abs_difference(self, other: Self) -> Self;
    /// Gap between `|self|` and the next representable value away from zero.
    /// At the largest finite magnitude the gap below is used instead.
    fn ulp(self) -> Self;
}

macro_rules! impl_ulp_float {
    ($float:ty) => {
        impl UlpFloat for $float {
            fn is_normal_value(self) -> bool {
                self.is_normal()
            }

            fn same_bits(self, other: Self) -> bool {
                self.to_bits() == other.to_bits()
            }

            fn abs_difference(self, other: Self) -> Self {
                (self - other).abs()
            }

            fn ulp(self) -> Self {
                let magnitude = self.abs();
                let bits = magnitude.to_bits();
                let next = <$float>::from_bits(bits + 1);
                if next.is_finite() {
                    next - magnitude
                } else {
                    magnitude - <$float>::from_bits(bits - 1)
                }
            }
        }
    };
}

impl_ulp_float!(f32);
impl_ulp_float!(f64);

/// One-ULP equality. Zero, subnormal, infinite and NaN operands compare with `==`.
pub fn has_minimal_difference<F: UlpFloat>(a: F, b: F) -> bool {
    if !a.is_normal_value() || !b.is_normal_value() {
        return a == b;
    }
    if a.same_bits(b) {
        return true;
    }
    a.abs_difference(b) <= a.ulp()
}

/// Positional equality of the first `length` elements.
pub fn has_same_elements<T: PartialEq>(seq1: &[T], seq2: &[T], length: usize) -> bool {
    has_same_elements_by(seq1, seq2, length, |a, b| a == b)
}

pub fn has_same_elements_by<T>(
    seq1: &[T],
    seq2: &[T],
    length: usize,
    eq: impl Fn(&T, &T) -> bool,
) -> bool {
    if seq1.len() < length || seq2.len() < length {
        return false;
    }
    seq1.iter().zip(seq2).take(length).all(|(a, b)| eq(a, b))
}

/// Same size and, for every key of `map1`, an `eq`-equal value under the same key in `map2`.
pub fn has_same_entries_by<K: Ord, V>(
    map1: &std::collections::BTreeMap<K, V>,
    map2: &std::collections::BTreeMap<K, V>,
    eq: impl Fn(&V, &V) -> bool,
) -> bool {
    map1.len() == map2.len()
        && map1
            .iter()
            .all(|(key, value)| map2.get(key).is_some_and(|other| eq(value, other)))
}

/// Diagnostic text of a value: `{ 1, 2 }` for sequences, `{ a: 1 }` for maps.
pub trait Render {
    fn render(&self) -> String;
}

macro_rules! impl_render_display {
    ($($ty:ty),*) => {
        $(
            impl Render for $ty {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_render_display!(i8, i16, i32, i64, f32, f64, bool, char, String);

impl<T: Render> Render for Vec<T> {
    fn render(&self) -> String {
        print_array(self)
    }
}

impl<T: Render> Render for std::collections::BTreeSet<T> {
    fn render(&self) -> String {
        print_collection(self)
    }
}

impl<K: Render, V: Render> Render for std::collections::BTreeMap<K, V> {
    fn render(&self) -> String {
        print_map(self)
    }
}

pub fn print_array<T: Render>(values: &[T]) -> String {
    print_collection(values)
}

pub fn print_collection<'a, T: Render + 'a>(values: impl IntoIterator<Item = &'a T>) -> String {
    let parts: Vec<String> = values.into_iter().map(Render::render).collect();
    format!("{{ {} }}", parts.join(", "))
}

pub fn print_map<'a, K: Render + 'a, V: Render + 'a>(
    entries: impl IntoIterator<Item = (&'a K, &'a V)>,
) -> String {
    let parts: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key.render(), value.render()))
        .collect();
    format!("{{ {} }}", parts.join(", "))
}
