use crate::unparse::{NativeKind, TypeDescriptor};

/// Types that can describe their own shape for schema unparsing.
/// Aggregates implement this by listing their fields in declaration order.
pub trait Describe {
    fn descriptor() -> TypeDescriptor;
}

macro_rules! describe_native {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::Native(NativeKind::$kind)
                }
            }
        )*
    };
}

describe_native! {
    u8     => U8,
    u16    => U16,
    u32    => U32,
    u64    => U64,
    u128   => U128,
    usize  => Usize,
    i8     => I8,
    i16    => I16,
    i32    => I32,
    i64    => I64,
    i128   => I128,
    isize  => Isize,
    f32    => F32,
    f64    => F64,
    bool   => Bool,
    char   => Char,
    String => String,
    str    => String,
    ()     => Unit,
}

impl<T: Describe> Describe for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Pointer(Box::new(T::descriptor()))
    }
}

// Box is never null, so it is transparent.
impl<T: Describe + ?Sized> Describe for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}
