//! Derives schema text from a description of a native Rust type.
//!
//! Only scalars, optionals and field aggregates are representable. User type
//! names, enums and unions cannot be recovered this way.

use std::fmt;

use crate::{error::BareError, traits::Describe};

/// Native scalar kinds a descriptor may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKind {
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    F32,
    F64,
    Bool,
    Char,
    String,
    Unit,
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NativeKind::U8     => "u8",
            NativeKind::U16    => "u16",
            NativeKind::U32    => "u32",
            NativeKind::U64    => "u64",
            NativeKind::U128   => "u128",
            NativeKind::Usize  => "usize",
            NativeKind::I8     => "i8",
            NativeKind::I16    => "i16",
            NativeKind::I32    => "i32",
            NativeKind::I64    => "i64",
            NativeKind::I128   => "i128",
            NativeKind::Isize  => "isize",
            NativeKind::F32    => "f32",
            NativeKind::F64    => "f64",
            NativeKind::Bool   => "bool",
            NativeKind::Char   => "char",
            NativeKind::String => "String",
            NativeKind::Unit   => "()",
        };
        f.write_str(text)
    }
}

/// Shape of a native type, supplied by the caller in place of runtime reflection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Native(NativeKind),
    /// A nullable or pointer-like wrapper around another type.
    Pointer(Box<TypeDescriptor>),
    /// A field aggregate, fields in declaration order.
    Struct(Vec<FieldDescriptor>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The native field identifier.
    pub ident:  String,
    /// Explicit schema name, used instead of `ident` when present.
    pub rename: Option<String>,
    pub ty:     TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(ident: impl Into<String>, ty: TypeDescriptor) -> Self {
        FieldDescriptor { ident: ident.into(), rename: None, ty }
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn schema_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.ident)
    }
}

/// Returns the schema text for `T`.
///
/// ```
/// use bareish_compiler::unparse::schema_for;
///
/// assert_eq!(schema_for::<Option<String>>().unwrap(), "optional<string>");
/// ```
pub fn schema_for<T: Describe + ?Sized>() -> Result<String, BareError> {
    schema_for_descriptor(&T::descriptor())
}

/// Returns the schema text for the type described by `descriptor`.
pub fn schema_for_descriptor(descriptor: &TypeDescriptor) -> Result<String, BareError> {
    match descriptor {
        TypeDescriptor::Native(kind) => native_keyword(*kind).map(str::to_string),
        TypeDescriptor::Pointer(target) => {
            Ok(format!("optional<{}>", schema_for_descriptor(target)?))
        }
        TypeDescriptor::Struct(fields) => {
            let mut text = String::from("{\n");
            for field in fields {
                let schema = schema_for_descriptor(&field.ty)?;
                text.push_str(&format!("\t{}: {}\n", field.schema_name(), schema));
            }
            text.push('}');
            Ok(text)
        }
    }
}

fn native_keyword(kind: NativeKind) -> Result<&'static str, BareError> {
    let keyword = match kind {
        NativeKind::U8     => "u8",
        NativeKind::U16    => "u16",
        NativeKind::U32    => "u32",
        NativeKind::U64    => "u64",
        NativeKind::Usize  => "uint",
        NativeKind::I8     => "i8",
        NativeKind::I16    => "i16",
        NativeKind::I32    => "i32",
        NativeKind::I64    => "i64",
        NativeKind::Isize  => "int",
        NativeKind::F32    => "f32",
        NativeKind::F64    => "f64",
        NativeKind::Bool   => "bool",
        NativeKind::String => "string",
        NativeKind::Unit   => "void",
        NativeKind::U128 | NativeKind::I128 | NativeKind::Char => {
            return Err(BareError::UnsupportedKind(kind.to_string()))
        }
    };
    Ok(keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparse_scalars() {
        assert_eq!(schema_for::<u8>().unwrap(), "u8");
        assert_eq!(schema_for::<u16>().unwrap(), "u16");
        assert_eq!(schema_for::<u32>().unwrap(), "u32");
        assert_eq!(schema_for::<u64>().unwrap(), "u64");
        assert_eq!(schema_for::<usize>().unwrap(), "uint");
        assert_eq!(schema_for::<i8>().unwrap(), "i8");
        assert_eq!(schema_for::<i16>().unwrap(), "i16");
        assert_eq!(schema_for::<i32>().unwrap(), "i32");
        assert_eq!(schema_for::<i64>().unwrap(), "i64");
        assert_eq!(schema_for::<isize>().unwrap(), "int");
        assert_eq!(schema_for::<f32>().unwrap(), "f32");
        assert_eq!(schema_for::<f64>().unwrap(), "f64");
        assert_eq!(schema_for::<bool>().unwrap(), "bool");
        assert_eq!(schema_for::<String>().unwrap(), "string");
        assert_eq!(schema_for::<str>().unwrap(), "string");
        assert_eq!(schema_for::<()>().unwrap(), "void");
    }

    #[test]
    fn test_unparse_optional() {
        assert_eq!(schema_for::<Option<String>>().unwrap(), "optional<string>");
        assert_eq!(schema_for::<Option<Box<u8>>>().unwrap(), "optional<u8>");
        assert_eq!(schema_for::<Option<Option<i32>>>().unwrap(), "optional<optional<i32>>");
    }

    #[test]
    fn test_unparse_struct() {
        let descriptor = TypeDescriptor::Struct(vec![
            FieldDescriptor::new("name", String::descriptor()),
            FieldDescriptor::new("Email", Option::<String>::descriptor()).renamed("email"),
            FieldDescriptor::new("age", u8::descriptor()),
        ]);
        assert_eq!(
            schema_for_descriptor(&descriptor).unwrap(),
            "{\n\tname: string\n\temail: optional<string>\n\tage: u8\n}"
        );
    }

    #[test]
    fn test_unparse_nested_struct() {
        let inner = TypeDescriptor::Struct(vec![FieldDescriptor::new("x", f32::descriptor())]);
        let outer = TypeDescriptor::Struct(vec![FieldDescriptor::new("point", TypeDescriptor::Pointer(Box::new(inner)))]);
        assert_eq!(
            schema_for_descriptor(&outer).unwrap(),
            "{\n\tpoint: optional<{\n\tx: f32\n}>\n}"
        );
    }

    #[test]
    fn test_unparse_void_field() {
        let descriptor = TypeDescriptor::Struct(vec![FieldDescriptor::new("ack", <()>::descriptor())]);
        assert_eq!(schema_for_descriptor(&descriptor).unwrap(), "{\n\tack: void\n}");
    }

    #[test]
    fn test_unsupported_kind_is_named() {
        let err = schema_for::<char>().unwrap_err();
        assert!(matches!(&err, BareError::UnsupportedKind(kind) if kind == "char"), "got {:?}", err);

        let descriptor = TypeDescriptor::Struct(vec![FieldDescriptor::new("big", u128::descriptor())]);
        let err = schema_for_descriptor(&descriptor).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported native kind u128");
    }
}
