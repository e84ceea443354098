use std::fmt;

use serde::Serialize;

/// A top-level declaration of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum SchemaType {
    UserType(UserDefinedType),
    UserEnum(UserDefinedEnum),
}

impl SchemaType {
    pub fn name(&self) -> &str {
        match self {
            SchemaType::UserType(udt) => &udt.name,
            SchemaType::UserEnum(ude) => &ude.name,
        }
    }
}

/// `type Name Type`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDefinedType {
    pub name:  String,
    #[serde(rename = "type")]
    pub type_: Type,
}

/// `enum Name [kind] { VALUE ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDefinedEnum {
    pub name:   String,
    pub kind:   PrimitiveKind,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name:  String,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Uint,
    U8,
    U16,
    U32,
    U64,
    Int,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Void,
}

impl PrimitiveKind {
    /// The schema keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Uint   => "uint",
            PrimitiveKind::U8     => "u8",
            PrimitiveKind::U16    => "u16",
            PrimitiveKind::U32    => "u32",
            PrimitiveKind::U64    => "u64",
            PrimitiveKind::Int    => "int",
            PrimitiveKind::I8     => "i8",
            PrimitiveKind::I16    => "i16",
            PrimitiveKind::I32    => "i32",
            PrimitiveKind::I64    => "i64",
            PrimitiveKind::F32    => "f32",
            PrimitiveKind::F64    => "f64",
            PrimitiveKind::Bool   => "bool",
            PrimitiveKind::String => "string",
            PrimitiveKind::Void   => "void",
        }
    }

    /// Largest value representable by an unsigned kind; `None` for every other kind.
    pub fn unsigned_max(self) -> Option<u64> {
        match self {
            PrimitiveKind::U8                       => Some(u8::MAX.into()),
            PrimitiveKind::U16                      => Some(u16::MAX.into()),
            PrimitiveKind::U32                      => Some(u32::MAX.into()),
            PrimitiveKind::U64 | PrimitiveKind::Uint => Some(u64::MAX),
            _                                       => None,
        }
    }
}

/// A type expression. Composite variants own their children, so a parsed
/// document is a forest of trees; `Named` is a leaf that is never resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Primitive { primitive: PrimitiveKind },
    /// `data` when `length` is `None`, `data<N>` otherwise.
    Data { length: Option<u64> },
    /// `[]T` when `length` is `None`, `[N]T` otherwise.
    Array { member: Box<Type>, length: Option<u64> },
    Map { key: Box<Type>, value: Box<Type> },
    Optional { subtype: Box<Type> },
    Struct { fields: Vec<StructField> },
    Union { types: Vec<UnionSubtype> },
    /// A reference to another declaration. Whether it exists is up to the consumer.
    Named { name: String },
}

impl Type {
    pub fn primitive(primitive: PrimitiveKind) -> Self {
        Type::Primitive { primitive }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named { name: name.into() }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Primitive { primitive } => match primitive {
                PrimitiveKind::Uint   => TypeKind::Uint,
                PrimitiveKind::U8     => TypeKind::U8,
                PrimitiveKind::U16    => TypeKind::U16,
                PrimitiveKind::U32    => TypeKind::U32,
                PrimitiveKind::U64    => TypeKind::U64,
                PrimitiveKind::Int    => TypeKind::Int,
                PrimitiveKind::I8     => TypeKind::I8,
                PrimitiveKind::I16    => TypeKind::I16,
                PrimitiveKind::I32    => TypeKind::I32,
                PrimitiveKind::I64    => TypeKind::I64,
                PrimitiveKind::F32    => TypeKind::F32,
                PrimitiveKind::F64    => TypeKind::F64,
                PrimitiveKind::Bool   => TypeKind::Bool,
                PrimitiveKind::String => TypeKind::String,
                PrimitiveKind::Void   => TypeKind::Void,
            },
            Type::Data { length: None }     => TypeKind::Data,
            Type::Data { length: Some(_) }  => TypeKind::DataFixed,
            Type::Array { length: None, .. }    => TypeKind::Slice,
            Type::Array { length: Some(_), .. } => TypeKind::Array,
            Type::Map { .. }      => TypeKind::Map,
            Type::Optional { .. } => TypeKind::Optional,
            Type::Struct { .. }   => TypeKind::Struct,
            Type::Union { .. }    => TypeKind::Union,
            Type::Named { .. }    => TypeKind::UserType,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    pub name:  String,
    #[serde(rename = "type")]
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionSubtype {
    #[serde(rename = "type")]
    pub type_: Type,
    pub tag:   u64,
}

/// Discriminant of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Uint,
    U8,
    U16,
    U32,
    U64,
    Int,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Void,
    /// `data`
    Data,
    /// `data<length>`
    DataFixed,
    /// `[length]type`
    Array,
    /// `[]type`
    Slice,
    Optional,
    Map,
    Union,
    Struct,
    UserType,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_distinguishes_fixed_from_unbounded() {
        assert_eq!(Type::Data { length: None }.kind(), TypeKind::Data);
        assert_eq!(Type::Data { length: Some(0) }.kind(), TypeKind::DataFixed);

        let member = Box::new(Type::primitive(PrimitiveKind::U8));
        assert_eq!(Type::Array { member: member.clone(), length: None }.kind(), TypeKind::Slice);
        assert_eq!(Type::Array { member, length: Some(0) }.kind(), TypeKind::Array);
    }

    #[test]
    fn test_unsigned_max() {
        assert_eq!(PrimitiveKind::U8.unsigned_max(), Some(255));
        assert_eq!(PrimitiveKind::Uint.unsigned_max(), Some(u64::MAX));
        assert_eq!(PrimitiveKind::I8.unsigned_max(), None);
    }

    #[test]
    fn test_serializes_with_kind_tags() {
        let udt = SchemaType::UserType(UserDefinedType {
            name:  "PublicKey".into(),
            type_: Type::Data { length: Some(128) },
        });
        let json = serde_json::to_value(&udt).unwrap();
        assert_eq!(json["declaration"], "user_type");
        assert_eq!(json["name"], "PublicKey");
        assert_eq!(json["type"]["kind"], "data");
        assert_eq!(json["type"]["length"], 128);
    }
}
