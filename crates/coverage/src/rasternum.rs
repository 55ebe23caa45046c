use crate::SampleType;

// Type requirements for samples stored in rasters
pub trait RasterNum:
    Copy
    + num::Num
    + num::NumCast
    + num::Bounded
    + num::traits::NumAssignOps
    + std::cmp::PartialOrd
    + std::fmt::Debug
    + std::string::ToString
    + approx::AbsDiffEq<Epsilon = Self>
    + bytemuck::Pod
{
    const TYPE: SampleType;
    const IS_SIGNED: bool;

    /// C style conversion from f64: truncation toward zero, saturated at the
    /// type bounds, NaN collapses to zero. Floating point targets only narrow.
    fn truncate_from_f64(v: f64) -> Self;

    /// Widening view used by the styling and statistics paths.
    fn as_f64(self) -> f64;

    fn is_nan(self) -> bool {
        false
    }
}

macro_rules! rasternum_signed_impl {
    ($t:ty, $sample_type:ident) => {
        impl RasterNum for $t {
            const TYPE: SampleType = SampleType::$sample_type;
            const IS_SIGNED: bool = true;

            #[inline]
            fn truncate_from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn as_f64(self) -> f64 {
                f64::from(self)
            }
        }
    };
}

macro_rules! rasternum_unsigned_impl {
    ($t:ty, $sample_type:ident) => {
        impl RasterNum for $t {
            const TYPE: SampleType = SampleType::$sample_type;
            const IS_SIGNED: bool = false;

            #[inline]
            fn truncate_from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn as_f64(self) -> f64 {
                f64::from(self)
            }
        }
    };
}

macro_rules! rasternum_fp_impl {
    ($t:ty, $sample_type:ident) => {
        impl RasterNum for $t {
            const TYPE: SampleType = SampleType::$sample_type;
            const IS_SIGNED: bool = true;

            #[inline]
            fn truncate_from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn is_nan(self) -> bool {
                <$t>::is_nan(self)
            }
        }
    };
}

rasternum_signed_impl!(i8, Int8);
rasternum_signed_impl!(i16, Int16);
rasternum_signed_impl!(i32, Int32);
rasternum_unsigned_impl!(u8, UInt8);
rasternum_unsigned_impl!(u16, UInt16);
rasternum_unsigned_impl!(u32, UInt32);

rasternum_fp_impl!(f32, Float32);
rasternum_fp_impl!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_u8_saturates() {
        assert_eq!(u8::truncate_from_f64(-5.0), 0);
        assert_eq!(u8::truncate_from_f64(300.0), 255);
        assert_eq!(u8::truncate_from_f64(200.6), 200);
    }

    #[test]
    fn truncate_i8_saturates() {
        assert_eq!(i8::truncate_from_f64(200.0), 127);
        assert_eq!(i8::truncate_from_f64(-200.0), -128);
        assert_eq!(i8::truncate_from_f64(-0.9), 0);
    }

    #[test]
    fn truncate_nan_is_zero() {
        assert_eq!(u8::truncate_from_f64(f64::NAN), 0);
        assert_eq!(i32::truncate_from_f64(f64::NAN), 0);
    }

    #[test]
    fn float_targets_narrow() {
        assert_eq!(f32::truncate_from_f64(1.5), 1.5);
        assert_eq!(f64::truncate_from_f64(-2.25), -2.25);
        assert!(f32::truncate_from_f64(f64::NAN).is_nan());
    }
}

#[cfg(test)]
#[generic_tests::define]
mod generictests {
    use super::*;

    #[test]
    fn saturates_at_type_bounds<T: RasterNum>() {
        assert_eq!(T::truncate_from_f64(-1.0e300), T::min_value());
        assert_eq!(T::truncate_from_f64(1.0e300), T::max_value());
    }

    #[test]
    fn zero_and_roundtrip<T: RasterNum>() {
        assert_eq!(T::truncate_from_f64(0.0), T::zero());
        assert_eq!(T::truncate_from_f64(T::one().as_f64()), T::one());
    }

    #[instantiate_tests(<i8>)]
    mod i8_samples {}

    #[instantiate_tests(<u8>)]
    mod u8_samples {}

    #[instantiate_tests(<i16>)]
    mod i16_samples {}

    #[instantiate_tests(<u16>)]
    mod u16_samples {}

    #[instantiate_tests(<i32>)]
    mod i32_samples {}

    #[instantiate_tests(<u32>)]
    mod u32_samples {}
}
