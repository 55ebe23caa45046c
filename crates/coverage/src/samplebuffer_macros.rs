//! Macros for dispatching on `SampleBuffer` and `SampleType` variants.
//!
//! These macros reduce boilerplate when working with type-erased sample buffers.

/// Macro to dispatch on `SampleBuffer` variants and apply an expression to the inner vector.
///
/// This macro does not re-wrap the result in `SampleBuffer`, making it suitable for
/// operations that return a concrete type (not dependent on the variant).
///
/// # Example
///
/// ```ignore
/// let len = dispatch_samplebuffer!(buffer, buf, buf.len());
/// ```
#[macro_export]
macro_rules! dispatch_samplebuffer {
    ($buffer:expr, $var:ident, $expr:expr) => {
        match $buffer {
            $crate::SampleBuffer::I8($var) => $expr,
            $crate::SampleBuffer::U8($var) => $expr,
            $crate::SampleBuffer::I16($var) => $expr,
            $crate::SampleBuffer::U16($var) => $expr,
            $crate::SampleBuffer::I32($var) => $expr,
            $crate::SampleBuffer::U32($var) => $expr,
            $crate::SampleBuffer::F32($var) => $expr,
            $crate::SampleBuffer::F64($var) => $expr,
        }
    };
}

/// Macro to dispatch on `SampleBuffer` variants and wrap the result back in the same variant.
///
/// This is useful when the operation returns the same element type as the input.
///
/// # Example
///
/// ```ignore
/// let copy = apply_to_samplebuffer!(buffer, buf, buf[range].to_vec());
/// ```
#[macro_export]
macro_rules! apply_to_samplebuffer {
    ($buffer:expr, $var:ident, $expr:expr) => {
        match $buffer {
            $crate::SampleBuffer::I8($var) => $crate::SampleBuffer::I8($expr),
            $crate::SampleBuffer::U8($var) => $crate::SampleBuffer::U8($expr),
            $crate::SampleBuffer::I16($var) => $crate::SampleBuffer::I16($expr),
            $crate::SampleBuffer::U16($var) => $crate::SampleBuffer::U16($expr),
            $crate::SampleBuffer::I32($var) => $crate::SampleBuffer::I32($expr),
            $crate::SampleBuffer::U32($var) => $crate::SampleBuffer::U32($expr),
            $crate::SampleBuffer::F32($var) => $crate::SampleBuffer::F32($expr),
            $crate::SampleBuffer::F64($var) => $crate::SampleBuffer::F64($expr),
        }
    };
}

/// Macro to dispatch on `SampleType` and execute an expression with the corresponding Rust type.
///
/// The expression `$expr` is evaluated with `$t` bound to the concrete type (u8, i32, f64, etc.)
/// and the result is wrapped in the corresponding `SampleBuffer` variant. The sub byte sample
/// types bind to `u8` and land in the `U8` variant.
///
/// # Example
///
/// ```ignore
/// let buffer = dispatch_sampletype!(sample_type, T, vec![T::zero(); len]);
/// ```
#[macro_export]
macro_rules! dispatch_sampletype {
    ($sample_type:expr, $t:ident, $expr:expr) => {
        match $sample_type {
            $crate::SampleType::OneBit | $crate::SampleType::TwoBit | $crate::SampleType::FourBit | $crate::SampleType::UInt8 => {
                type $t = u8;
                $crate::SampleBuffer::U8($expr)
            }
            $crate::SampleType::Int8 => {
                type $t = i8;
                $crate::SampleBuffer::I8($expr)
            }
            $crate::SampleType::Int16 => {
                type $t = i16;
                $crate::SampleBuffer::I16($expr)
            }
            $crate::SampleType::UInt16 => {
                type $t = u16;
                $crate::SampleBuffer::U16($expr)
            }
            $crate::SampleType::Int32 => {
                type $t = i32;
                $crate::SampleBuffer::I32($expr)
            }
            $crate::SampleType::UInt32 => {
                type $t = u32;
                $crate::SampleBuffer::U32($expr)
            }
            $crate::SampleType::Float32 => {
                type $t = f32;
                $crate::SampleBuffer::F32($expr)
            }
            $crate::SampleType::Float64 => {
                type $t = f64;
                $crate::SampleBuffer::F64($expr)
            }
        }
    };
}

/// Macro to dispatch on `SampleType` and execute an expression with the corresponding Rust type.
///
/// Unlike `dispatch_sampletype!`, this does not wrap the result in `SampleBuffer`.
/// Use this when the operation returns a type that is not `SampleBuffer`.
///
/// # Example
///
/// ```ignore
/// dispatch_sampletype_nowrap!(sample_type, T, {
///     let samples = bytemuck::cast_slice::<u8, T>(bytes);
///     process(samples)
/// })
/// ```
#[macro_export]
macro_rules! dispatch_sampletype_nowrap {
    ($sample_type:expr, $t:ident, $expr:expr) => {
        match $sample_type {
            $crate::SampleType::OneBit | $crate::SampleType::TwoBit | $crate::SampleType::FourBit | $crate::SampleType::UInt8 => {
                type $t = u8;
                $expr
            }
            $crate::SampleType::Int8 => {
                type $t = i8;
                $expr
            }
            $crate::SampleType::Int16 => {
                type $t = i16;
                $expr
            }
            $crate::SampleType::UInt16 => {
                type $t = u16;
                $expr
            }
            $crate::SampleType::Int32 => {
                type $t = i32;
                $expr
            }
            $crate::SampleType::UInt32 => {
                type $t = u32;
                $expr
            }
            $crate::SampleType::Float32 => {
                type $t = f32;
                $expr
            }
            $crate::SampleType::Float64 => {
                type $t = f64;
                $expr
            }
        }
    };
}
