//! Splitting of a parameter list into its leading parameters and the last
//! one.

use super::count;

/// A non-empty tuple that can be split into its first `LEN - 1` elements and
/// its last element, and put back together.
///
/// The empty tuple does not implement this trait, so a parameter list that
/// has no trailing callback is rejected at compile time.
///
/// # Examples
///
/// ```
/// use coadapt::signature::SplitLast;
///
/// let (init, last) = (1u8, "two", 3.0f32).split_last();
/// assert_eq!(init, (1, "two"));
/// assert_eq!(last, 3.0);
/// assert_eq!(<(u8, &str, f32)>::from_parts(init, last), (1, "two", 3.0));
/// ```
pub trait SplitLast: Sized {
    /// The first `LEN - 1` element types, in order.
    type Init;

    /// The last element type.
    type Last;

    /// Number of elements in the whole tuple.
    const LEN: usize;

    /// Splits the tuple into leading elements and the last one.
    fn split_last(self) -> (Self::Init, Self::Last);

    /// Inverse of [`SplitLast::split_last`].
    fn from_parts(init: Self::Init, last: Self::Last) -> Self;
}

macro_rules! split_last {
    ($($init:ident),*; $last:ident) => {
        impl<$($init,)* $last> SplitLast for ($($init,)* $last,) {
            type Init = ($($init,)*);
            type Last = $last;

            const LEN: usize = count!($($init)* $last);

            #[allow(non_snake_case)]
            fn split_last(self) -> (Self::Init, Self::Last) {
                let ($($init,)* $last,) = self;
                (($($init,)*), $last)
            }

            #[allow(non_snake_case)]
            fn from_parts(
                ($($init,)*): Self::Init,
                $last: Self::Last,
            ) -> Self {
                ($($init,)* $last,)
            }
        }
    };
}

split_last!(; L);
split_last!(A1; L);
split_last!(A1, A2; L);
split_last!(A1, A2, A3; L);
split_last!(A1, A2, A3, A4; L);
split_last!(A1, A2, A3, A4, A5; L);
split_last!(A1, A2, A3, A4, A5, A6; L);
split_last!(A1, A2, A3, A4, A5, A6, A7; L);
split_last!(A1, A2, A3, A4, A5, A6, A7, A8; L);
split_last!(A1, A2, A3, A4, A5, A6, A7, A8, A9; L);
split_last!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10; L);
split_last!(A1, A2, A3, A4, A5, A6, A7, A8, A9, A10, A11; L);
