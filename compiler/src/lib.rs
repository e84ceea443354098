//! bareish-compiler
//!
//! This crate implements:
//!  1) A scanner + recursive-descent parser for BARE schema documents,
//!  2) The AST those documents parse into (`types`),
//!  3) Rust code generation (`compile_schema_to_rust` → `String`), split into a
//!     language-independent lowering (`codegen`) and a printer (`gen_rust`),
//!  4) Schema unparsing from native type descriptors (`unparse`, `Describe`),
//!  5) The error type (`BareError`).
//!
//! ```
//! use bareish_compiler::{compile_schema, GenOptions};
//!
//! let (types, rust) = compile_schema("type PublicKey data<128>", &GenOptions::default()).unwrap();
//! assert_eq!(types[0].name(), "PublicKey");
//! assert!(rust.contains("pub struct PublicKey(pub [u8; 128]);"));
//! ```

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod codegen;
pub mod compiler;
pub mod gen_rust;
pub mod unparse;
pub mod traits;

pub use compiler::compile_schema;
pub use error::BareError;
pub use gen_rust::{compile_schema_to_rust, GenOptions};
pub use parser::{parse_reader, parse_schema};
pub use traits::Describe;
pub use unparse::{schema_for, schema_for_descriptor};
