//! Operator trait wrappers around inherent arithmetic methods.

/// Implement a binary `core::ops` trait for owned and borrowed operands by
/// forwarding to an inherent `fn(&self, &Rhs) -> Output` method.
macro_rules! impl_binop {
    ($lhs:ty, $rhs:ty, $output:ty, $op:ident, $func:ident, $inner_func:ident) => {
        impl ::core::ops::$op<$rhs> for $lhs {
            type Output = $output;

            #[inline]
            fn $func(self, rhs: $rhs) -> $output {
                <$lhs>::$inner_func(&self, &rhs)
            }
        }

        impl ::core::ops::$op<&$rhs> for $lhs {
            type Output = $output;

            #[inline]
            fn $func(self, rhs: &$rhs) -> $output {
                <$lhs>::$inner_func(&self, rhs)
            }
        }

        impl ::core::ops::$op<&$rhs> for &$lhs {
            type Output = $output;

            #[inline]
            fn $func(self, rhs: &$rhs) -> $output {
                <$lhs>::$inner_func(self, rhs)
            }
        }
    };
}

/// Implement a compound assignment trait in terms of the matching binary method.
macro_rules! impl_assign_op {
    ($lhs:ty, $rhs:ty, $op:ident, $func:ident, $inner_func:ident) => {
        impl ::core::ops::$op<$rhs> for $lhs {
            #[inline]
            fn $func(&mut self, rhs: $rhs) {
                *self = <$lhs>::$inner_func(self, &rhs);
            }
        }

        impl ::core::ops::$op<&$rhs> for $lhs {
            #[inline]
            fn $func(&mut self, rhs: &$rhs) {
                *self = <$lhs>::$inner_func(self, rhs);
            }
        }
    };
}

/// Implement `Neg` for owned and borrowed values via an inherent `negate`.
macro_rules! impl_neg {
    ($ty:ty) => {
        impl ::core::ops::Neg for $ty {
            type Output = $ty;

            #[inline]
            fn neg(self) -> $ty {
                <$ty>::negate(&self)
            }
        }

        impl ::core::ops::Neg for &$ty {
            type Output = $ty;

            #[inline]
            fn neg(self) -> $ty {
                <$ty>::negate(self)
            }
        }
    };
}

/// Implement `Sum` and `Product` over owned and borrowed items.
macro_rules! impl_sum_product {
    ($ty:ty) => {
        impl ::core::iter::Sum for $ty {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.reduce(::core::ops::Add::add).unwrap_or(Self::ZERO)
            }
        }

        impl<'a> ::core::iter::Sum<&'a $ty> for $ty {
            fn sum<I: Iterator<Item = &'a $ty>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl ::core::iter::Product for $ty {
            fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.reduce(::core::ops::Mul::mul).unwrap_or(Self::ONE)
            }
        }

        impl<'a> ::core::iter::Product<&'a $ty> for $ty {
            fn product<I: Iterator<Item = &'a $ty>>(iter: I) -> Self {
                iter.copied().product()
            }
        }
    };
}
