use tracing::debug;

use crate::{
    error::BareError,
    gen_rust::{compile_schema_to_rust, GenOptions},
    parser::parse_schema,
    types::SchemaType,
};

/// Compile a textual schema into `(declarations, generated Rust source)`.
/// Returns `Err(BareError)` if scanning or parsing fails; nothing is generated then.
pub fn compile_schema(text: &str, options: &GenOptions) -> Result<(Vec<SchemaType>, String), BareError> {
    let types = parse_schema(text)?;
    debug!(declarations = types.len(), runtime = %options.runtime, "generating rust");
    let rust = compile_schema_to_rust(&types, options);
    Ok((types, rust))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_schema() {
        let (types, rust) = compile_schema("type Key data<32>", &GenOptions::default()).unwrap();
        assert_eq!(types.len(), 1);
        assert!(rust.contains("pub struct Key(pub [u8; 32]);"));
    }

    #[test]
    fn test_compile_schema_propagates_parse_errors() {
        let err = compile_schema("type Key {", &GenOptions::default()).unwrap_err();
        assert!(matches!(err, BareError::UnexpectedEndOfInput { .. }));
    }
}
