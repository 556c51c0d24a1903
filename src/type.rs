use std::fmt::Debug;

use num_traits::{PrimInt, Signed};

/// A trait for types that can be used as point coordinates.
///
/// Coordinates are signed integers. Quadtree regions are derived by halving power-of-two side
/// lengths around a centroid, which needs exact integer arithmetic on both sides of zero.
///
/// This trait is sealed and cannot be implemented for external types.
pub trait IndexableNum: private::Sealed + PrimInt + Signed + Debug + Send + Sync {
    /// The largest `k` for which a `2^k` quadtree square can fit the type: one less than the
    /// bit width, so that half the side length is representable.
    const MAX_SIDE_EXPONENT: u32;
}

impl IndexableNum for i8 {
    const MAX_SIDE_EXPONENT: u32 = 7;
}

impl IndexableNum for i16 {
    const MAX_SIDE_EXPONENT: u32 = 15;
}

impl IndexableNum for i32 {
    const MAX_SIDE_EXPONENT: u32 = 31;
}

impl IndexableNum for i64 {
    const MAX_SIDE_EXPONENT: u32 = 63;
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}
