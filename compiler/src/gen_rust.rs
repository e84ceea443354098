use std::collections::HashSet;

use crate::{
    codegen::{build_module, EnumDef, Item, Module, NewtypeDef, StructDef, UnionDef},
    types::SchemaType,
    utils::quote,
};

/// Rendering options for generated Rust code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    /// Path of the codec crate providing `marshal`, `unmarshal`, `Error` and `register_union`.
    pub runtime: String,
    /// Derives applied to generated structs and newtypes.
    pub derives: Vec<String>,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            runtime: "bare".to_string(),
            derives: ["Debug", "Clone", "PartialEq", "serde::Serialize", "serde::Deserialize"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl GenOptions {
    fn uses_serde(&self) -> bool {
        self.derives
            .iter()
            .any(|d| d.ends_with("Serialize") || d.ends_with("Deserialize"))
    }
}

const ENUM_DERIVES: [&str; 6] = ["Debug", "Clone", "Copy", "PartialEq", "Eq", "Hash"];

/// Compiles parsed declarations into a Rust source file.
pub fn compile_schema_to_rust(types: &[SchemaType], options: &GenOptions) -> String {
    render_module(&build_module(types), options)
}

/// Renders an already-lowered module.
pub fn render_module(module: &Module, options: &GenOptions) -> String {
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push("// Code generated by baregen, DO NOT EDIT.".to_string());
    rust_code.push("".to_string());

    if module.need_errors {
        rust_code.push(generate_enum_error());
    }

    for item in &module.items {
        match item {
            Item::Struct(def)  => rust_code.push(generate_struct(def, options)),
            Item::Newtype(def) => rust_code.push(generate_newtype(def, options)),
            Item::Enum(def)    => rust_code.push(generate_enum(def, options)),
            Item::Union(def)   => rust_code.push(generate_union(def, options)),
        }
    }

    let unions: Vec<&UnionDef> = module.unions().collect();
    if !unions.is_empty() {
        rust_code.push(generate_registration(&unions, options));
    }

    rust_code.join("\n")
}

/// Merges `base` with the configured derives, dropping duplicates by last path segment.
fn derive_attribute(base: &[&str], extra: &[String]) -> String {
    let mut derives: Vec<&str> = base.to_vec();
    for derive in extra {
        let name = derive.rsplit("::").next().unwrap_or(derive);
        if !derives.iter().any(|d| d.rsplit("::").next() == Some(name)) {
            derives.push(derive);
        }
    }
    format!("#[derive({})]", derives.join(", "))
}

fn generate_enum_error() -> String {
    [
        "/// Returned when an enum holds a value outside its declared set.",
        "#[derive(Debug, Clone, Copy, PartialEq, Eq)]",
        "pub struct InvalidEnumValue {",
        "    pub enum_name: &'static str,",
        "    pub value: u64,",
        "}",
        "",
        "impl ::std::fmt::Display for InvalidEnumValue {",
        "    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {",
        "        write!(f, \"invalid {} value {}\", self.enum_name, self.value)",
        "    }",
        "}",
        "",
        "impl ::std::error::Error for InvalidEnumValue {}",
        "",
    ]
    .join("\n")
}

/// Encode/decode entry points delegating to the runtime codec.
fn generate_codec_impl(name: &str, options: &GenOptions) -> String {
    let rt = &options.runtime;
    format!(
        "impl {name} {{\n    pub fn decode(&mut self, data: &[u8]) -> Result<(), {rt}::Error> {{\n        {rt}::unmarshal(data, self)\n    }}\n\n    pub fn encode(&self) -> Result<Vec<u8>, {rt}::Error> {{\n        {rt}::marshal(self)\n    }}\n}}\n",
        name = name,
        rt = rt,
    )
}

fn generate_struct(def: &StructDef, options: &GenOptions) -> String {
    let mut lines = Vec::new();
    lines.push(derive_attribute(&[], &options.derives));
    lines.push(format!("pub struct {} {{", def.name));
    for field in &def.fields {
        if options.uses_serde() {
            lines.push(format!("    #[serde(rename = {})]", quote(&field.schema_name)));
        }
        lines.push(format!("    pub {}: {},", field.rust_name, field.ty));
    }
    lines.push("}".to_string());
    lines.push("".to_string());

    if def.codec {
        lines.push(generate_codec_impl(&def.name, options));
    }
    lines.join("\n")
}

fn generate_newtype(def: &NewtypeDef, options: &GenOptions) -> String {
    let mut lines = Vec::new();
    lines.push(derive_attribute(&[], &options.derives));
    if options.uses_serde() {
        lines.push("#[serde(transparent)]".to_string());
    }
    lines.push(format!("pub struct {}(pub {});", def.name, def.inner));
    lines.push("".to_string());

    if def.codec {
        lines.push(generate_codec_impl(&def.name, options));
    }
    lines.join("\n")
}

/// Enums are integer newtypes so that undeclared values stay representable.
fn generate_enum(def: &EnumDef, options: &GenOptions) -> String {
    let serde_derives: Vec<String> = options
        .derives
        .iter()
        .filter(|d| d.ends_with("Serialize") || d.ends_with("Deserialize"))
        .cloned()
        .collect();

    let mut lines = Vec::new();
    lines.push(derive_attribute(&ENUM_DERIVES, &serde_derives));
    if !serde_derives.is_empty() {
        lines.push("#[serde(transparent)]".to_string());
    }
    lines.push(format!("pub struct {}(pub {});", def.name, def.repr));
    lines.push("".to_string());

    lines.push(format!("impl {} {{", def.name));
    for value in &def.values {
        lines.push(format!(
            "    pub const {}: {} = {}({});",
            value.rust_name, def.name, def.name, value.value
        ));
    }
    lines.push("".to_string());
    lines.push("    /// Returns the schema name of this value.".to_string());
    lines.push("    pub fn as_str(self) -> Result<&'static str, InvalidEnumValue> {".to_string());
    lines.push("        match self.0 {".to_string());
    let mut seen = HashSet::new();
    for value in def.values.iter().filter(|v| seen.insert(v.value)) {
        lines.push(format!("            {} => Ok({}),", value.value, quote(&value.schema_name)));
    }
    lines.push(format!(
        "            value => Err(InvalidEnumValue {{ enum_name: {}, value: value as u64 }}),",
        quote(&def.name)
    ));
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.push(format!("impl ::std::convert::TryFrom<{}> for &'static str {{", def.name));
    lines.push("    type Error = InvalidEnumValue;".to_string());
    lines.push("".to_string());
    lines.push(format!(
        "    fn try_from(value: {}) -> Result<Self, Self::Error> {{",
        def.name
    ));
    lines.push("        value.as_str()".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}

/// A union is an enum with one variant per alternative. The wire tag of the
/// active variant is available through `tag()`.
fn generate_union(def: &UnionDef, options: &GenOptions) -> String {
    let mut lines = Vec::new();
    lines.push(derive_attribute(&[], &options.derives));
    lines.push(format!("pub enum {} {{", def.name));
    for member in &def.members {
        lines.push(format!("    {}({}),", member.variant, member.payload()));
    }
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.push(format!("impl {} {{", def.name));
    lines.push("    pub fn tag(&self) -> u64 {".to_string());
    lines.push("        match self {".to_string());
    for member in &def.members {
        lines.push(format!("            {}::{}(_) => {},", def.name, member.variant, member.tag));
    }
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());

    if def.codec {
        lines.push(generate_codec_impl(&def.name, options));
    }
    lines.join("\n")
}

fn generate_registration(unions: &[&UnionDef], options: &GenOptions) -> String {
    let rt = &options.runtime;
    let mut lines = Vec::new();
    lines.push("/// Registers every union with the codec. Must run before any union value is".to_string());
    lines.push("/// decoded; later calls do nothing.".to_string());
    lines.push("pub fn register_unions() {".to_string());
    lines.push("    static REGISTER: ::std::sync::Once = ::std::sync::Once::new();".to_string());
    lines.push("    REGISTER.call_once(|| {".to_string());
    for union in unions {
        lines.push(format!("        {}::register_union::<{}>()", rt, union.name));
        let last = union.members.len().saturating_sub(1);
        for (i, member) in union.members.iter().enumerate() {
            let terminator = if i == last { ";" } else { "" };
            lines.push(format!("            .member::<{}>({}){}", member.ty, member.tag, terminator));
        }
    }
    lines.push("    });".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}
