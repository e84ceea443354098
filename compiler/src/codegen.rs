//! Language-independent half of code generation: declarations are classified
//! and lowered into a flat list of [`Item`]s whose field types are [`RustType`]s.
//! Rendering the items as source text lives in `gen_rust`.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::{
    types::{PrimitiveKind, SchemaType, StructField, Type, UnionSubtype, UserDefinedEnum, UserDefinedType},
    utils::{escape_rust_keyword, to_pascal_case, to_snake_case},
};

/// Declarations of a document, partitioned the way the generator consumes them.
#[derive(Debug, Default)]
pub struct Declarations<'a> {
    pub user_types: Vec<&'a UserDefinedType>,
    pub enums:      Vec<&'a UserDefinedEnum>,
    pub unions:     Vec<&'a UserDefinedType>,
    /// Set when generated code needs a fallible enum-to-string conversion.
    pub need_errors: bool,
}

impl Declarations<'_> {
    /// Names of every declaration, whatever its kind.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.user_types
            .iter()
            .chain(self.unions.iter())
            .map(|udt| udt.name.as_str())
            .chain(self.enums.iter().map(|ude| ude.name.as_str()))
    }
}

/// Splits declarations into plain types, enums and unions. A user type is a
/// union iff its underlying type is a union.
pub fn classify(types: &[SchemaType]) -> Declarations<'_> {
    let mut declarations = Declarations::default();
    for ty in types {
        match ty {
            SchemaType::UserType(udt) if matches!(udt.type_, Type::Union { .. }) => {
                declarations.unions.push(udt)
            }
            SchemaType::UserType(udt) => declarations.user_types.push(udt),
            SchemaType::UserEnum(ude) => declarations.enums.push(ude),
        }
    }
    declarations.need_errors = !declarations.enums.is_empty();
    debug!(
        user_types = declarations.user_types.len(),
        enums = declarations.enums.len(),
        unions = declarations.unions.len(),
        "classified declarations"
    );
    declarations
}

/// A Rust type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// A built-in scalar such as `u8`, `String` or `()`.
    Scalar(&'static str),
    /// `Vec<u8>`
    Bytes,
    /// `[u8; N]`
    FixedBytes(u64),
    Vec(Box<RustType>),
    Array(Box<RustType>, u64),
    Map(Box<RustType>, Box<RustType>),
    Option(Box<RustType>),
    Boxed(Box<RustType>),
    /// A reference to a declared or hoisted item, by name.
    Path(String),
}

impl RustType {
    /// Boxes item references so that types reaching themselves through
    /// this position still have a finite size.
    fn indirect(self) -> RustType {
        match self {
            RustType::Path(_) => RustType::Boxed(Box::new(self)),
            other => other,
        }
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::Scalar(name)          => f.write_str(name),
            RustType::Bytes                 => f.write_str("Vec<u8>"),
            RustType::FixedBytes(length)    => write!(f, "[u8; {}]", length),
            RustType::Vec(member)           => write!(f, "Vec<{}>", member),
            RustType::Array(member, length) => write!(f, "[{}; {}]", member, length),
            RustType::Map(key, value)       => write!(f, "::std::collections::HashMap<{}, {}>", key, value),
            RustType::Option(inner)         => write!(f, "Option<{}>", inner),
            RustType::Boxed(inner)          => write!(f, "Box<{}>", inner),
            RustType::Path(name)            => f.write_str(name),
        }
    }
}

/// Maps a schema primitive to its fixed-width Rust scalar.
pub fn primitive_type(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Uint   => "u64",
        PrimitiveKind::U8     => "u8",
        PrimitiveKind::U16    => "u16",
        PrimitiveKind::U32    => "u32",
        PrimitiveKind::U64    => "u64",
        PrimitiveKind::Int    => "i64",
        PrimitiveKind::I8     => "i8",
        PrimitiveKind::I16    => "i16",
        PrimitiveKind::I32    => "i32",
        PrimitiveKind::I64    => "i64",
        PrimitiveKind::F32    => "f32",
        PrimitiveKind::F64    => "f64",
        PrimitiveKind::Bool   => "bool",
        PrimitiveKind::String => "String",
        PrimitiveKind::Void   => "()",
    }
}

/// Claims `base` in `taken`, or the first `{base}{separator}{n}` (n >= 2) still free.
fn claim_name(taken: &mut HashSet<String>, base: &str, separator: &str) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}{}{}", base, separator, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub rust_name:   String,
    pub schema_name: String,
    pub ty:          RustType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name:   String,
    pub fields: Vec<FieldDef>,
    /// Top-level declarations get encode/decode entry points; hoisted ones don't.
    pub codec:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewtypeDef {
    pub name:  String,
    pub inner: RustType,
    pub codec: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConst {
    /// Associated constant identifier, unique within the enum.
    pub rust_name:   String,
    pub schema_name: String,
    pub value:       u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name:   String,
    pub repr:   &'static str,
    pub values: Vec<EnumConst>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionMember {
    /// Variant identifier, unique within the union.
    pub variant: String,
    /// The alternative's mapped type, as registered with the codec.
    pub ty:      RustType,
    pub tag:     u64,
}

impl UnionMember {
    /// Type carried by the variant.
    pub fn payload(&self) -> RustType {
        self.ty.clone().indirect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDef {
    pub name:    String,
    pub members: Vec<UnionMember>,
    pub codec:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Struct(StructDef),
    Newtype(NewtypeDef),
    Enum(EnumDef),
    Union(UnionDef),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Struct(def)  => &def.name,
            Item::Newtype(def) => &def.name,
            Item::Enum(def)    => &def.name,
            Item::Union(def)   => &def.name,
        }
    }
}

/// Everything a printer needs to emit one generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub items:       Vec<Item>,
    pub need_errors: bool,
}

impl Module {
    pub fn unions(&self) -> impl Iterator<Item = &UnionDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Union(union) => Some(union),
            _ => None,
        })
    }
}

/// Lowers parsed declarations into a [`Module`].
///
/// Plain types come first, then enums, then unions. Anonymous structs and
/// unions nested inside a declaration are hoisted into their own items right
/// after the declaration that owns them, under names no declaration uses.
pub fn build_module(types: &[SchemaType]) -> Module {
    let declarations = classify(types);
    let mut mapper = TypeMapper::new(&declarations);
    let mut items = Vec::new();

    for udt in &declarations.user_types {
        let item = match &udt.type_ {
            Type::Struct { fields } => Item::Struct(mapper.struct_def(&udt.name, fields, true)),
            other => Item::Newtype(NewtypeDef {
                name:  udt.name.clone(),
                inner: mapper.map_type(other, &udt.name),
                codec: true,
            }),
        };
        items.push(item);
        items.extend(mapper.take_hoisted());
    }

    for ude in &declarations.enums {
        items.push(Item::Enum(enum_def(ude)));
    }

    for udt in &declarations.unions {
        if let Type::Union { types } = &udt.type_ {
            let union = mapper.union_def(&udt.name, types, true);
            items.push(Item::Union(union));
            items.extend(mapper.take_hoisted());
        }
    }

    Module { items, need_errors: declarations.need_errors }
}

fn enum_def(ude: &UserDefinedEnum) -> EnumDef {
    let mut taken = HashSet::new();
    let values = ude
        .values
        .iter()
        .map(|v| EnumConst {
            rust_name:   claim_name(&mut taken, &v.name, "_"),
            schema_name: v.name.clone(),
            value:       v.value,
        })
        .collect();
    EnumDef {
        name: ude.name.clone(),
        repr: primitive_type(ude.kind),
        values,
    }
}

fn variant_name(ty: &Type, index: usize) -> String {
    match ty {
        Type::Named { name }          => name.clone(),
        Type::Primitive { primitive } => to_pascal_case(primitive.keyword()),
        _                             => format!("Variant{}", index),
    }
}

/// Recursive schema-type to Rust-type mapping.
///
/// Named references are leaves and are never followed, so the mapping is
/// bounded by the depth of the type tree it is given.
pub struct TypeMapper {
    /// Item names in use: every declaration plus everything hoisted so far.
    item_names: HashSet<String>,
    hoisted:    Vec<Item>,
}

impl TypeMapper {
    pub fn new(declarations: &Declarations<'_>) -> Self {
        TypeMapper {
            item_names: declarations.names().map(str::to_string).collect(),
            hoisted:    Vec::new(),
        }
    }

    /// Items hoisted out of the types mapped so far.
    pub fn take_hoisted(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.hoisted)
    }

    /// Maps `ty` to a Rust type. `owner` names any item hoisted out of it.
    pub fn map_type(&mut self, ty: &Type, owner: &str) -> RustType {
        match ty {
            Type::Primitive { primitive } => RustType::Scalar(primitive_type(*primitive)),
            Type::Data { length: None } => RustType::Bytes,
            Type::Data { length: Some(length) } => RustType::FixedBytes(*length),
            Type::Array { member, length } => {
                let member = Box::new(self.map_type(member, owner));
                match length {
                    None => RustType::Vec(member),
                    Some(length) => RustType::Array(member, *length),
                }
            }
            Type::Map { key, value } => RustType::Map(
                Box::new(self.map_type(key, &format!("{}Key", owner))),
                Box::new(self.map_type(value, &format!("{}Value", owner))),
            ),
            Type::Optional { subtype } => {
                RustType::Option(Box::new(self.map_type(subtype, owner).indirect()))
            }
            Type::Struct { fields } => {
                let name = claim_name(&mut self.item_names, owner, "");
                let def = self.struct_def(&name, fields, false);
                self.hoisted.push(Item::Struct(def));
                RustType::Path(name)
            }
            Type::Union { types } => {
                let name = claim_name(&mut self.item_names, owner, "");
                let def = self.union_def(&name, types, false);
                self.hoisted.push(Item::Union(def));
                RustType::Path(name)
            }
            Type::Named { name } => RustType::Path(name.clone()),
        }
    }

    fn struct_def(&mut self, name: &str, fields: &[StructField], codec: bool) -> StructDef {
        let mut field_names = HashSet::new();
        let fields = fields
            .iter()
            .map(|field| {
                let rust_name = escape_rust_keyword(&to_snake_case(&field.name));
                FieldDef {
                    rust_name:   claim_name(&mut field_names, &rust_name, "_"),
                    schema_name: field.name.clone(),
                    ty:          self.map_type(&field.type_, &format!("{}{}", name, to_pascal_case(&field.name))),
                }
            })
            .collect();
        StructDef { name: name.to_string(), fields, codec }
    }

    fn union_def(&mut self, name: &str, types: &[UnionSubtype], codec: bool) -> UnionDef {
        let mut variants = HashSet::new();
        let members = types
            .iter()
            .enumerate()
            .map(|(index, st)| {
                let preferred = variant_name(&st.type_, index);
                let variant = if variants.contains(&preferred) {
                    claim_name(&mut variants, &format!("Variant{}", index), "")
                } else {
                    claim_name(&mut variants, &preferred, "")
                };
                UnionMember {
                    variant,
                    ty:  self.map_type(&st.type_, &format!("{}Variant{}", name, index)),
                    tag: st.tag,
                }
            })
            .collect();
        UnionDef { name: name.to_string(), members, codec }
    }
}
