#![cfg(test)]

use bareish_compiler::{
    compile_schema,
    error::NameKind,
    parse_reader, parse_schema, schema_for,
    types::{EnumValue, PrimitiveKind, SchemaType, Type},
    BareError, GenOptions,
};

const SCHEMA: &str = r#"
# Messages exchanged with the directory service.
type PublicKey data<128>
type Time string

enum Department {
  ACCOUNTING
  ADMINISTRATION
  CUSTOMER_SERVICE
  DEVELOPMENT

  JSMITH = 99
}

type Customer {
  name: string
  email: string
  address: Address
  orders: []{
    orderId: i64
    quantity: i32
  }
  metadata: map[string]data
}

type Employee {
  name: string
  email: string
  address: Address
  department: Department
  hireDate: Time
  publicKey: optional<PublicKey>
  metadata: map[string]data
}

type TerminatedEmployee void

type Person (Customer | Employee | TerminatedEmployee)

type Address {
  address: [4]string
  city: string
  state: string
  country: string
}

type Directory {
  people: []Person
  featured: optional<Person>
}
"#;

#[test]
fn test_parse_schema() {
    let types = parse_schema(SCHEMA).expect("parse_schema failed");

    let names: Vec<&str> = types.iter().map(SchemaType::name).collect();
    assert_eq!(
        names,
        vec![
            "PublicKey",
            "Time",
            "Department",
            "Customer",
            "Employee",
            "TerminatedEmployee",
            "Person",
            "Address",
            "Directory",
        ]
    );

    // Check enum Department
    let department = match &types[2] {
        SchemaType::UserEnum(ude) => ude,
        other => panic!("expected an enum, got {:?}", other),
    };
    assert_eq!(department.kind, PrimitiveKind::Uint);
    let values: Vec<(&str, u64)> = department
        .values
        .iter()
        .map(|v| (v.name.as_str(), v.value))
        .collect();
    assert_eq!(
        values,
        vec![
            ("ACCOUNTING", 0),
            ("ADMINISTRATION", 1),
            ("CUSTOMER_SERVICE", 2),
            ("DEVELOPMENT", 3),
            ("JSMITH", 99),
        ]
    );

    // Check union Person
    let person = match &types[6] {
        SchemaType::UserType(udt) => udt,
        other => panic!("expected a user type, got {:?}", other),
    };
    match &person.type_ {
        Type::Union { types } => {
            let tags: Vec<u64> = types.iter().map(|t| t.tag).collect();
            assert_eq!(tags, vec![0, 1, 2]);
            assert_eq!(types[1].type_, Type::named("Employee"));
        }
        other => panic!("expected a union, got {:?}", other),
    }

    // Check Address uses a fixed-length array
    match &types[7] {
        SchemaType::UserType(udt) => match &udt.type_ {
            Type::Struct { fields } => {
                assert_eq!(fields[0].name, "address");
                assert_eq!(
                    fields[0].type_,
                    Type::Array {
                        member: Box::new(Type::primitive(PrimitiveKind::String)),
                        length: Some(4),
                    }
                );
            }
            other => panic!("expected a struct, got {:?}", other),
        },
        other => panic!("expected a user type, got {:?}", other),
    }
}

#[test]
fn test_compile_schema_to_rust() {
    let (types, rust_code) =
        compile_schema(SCHEMA, &GenOptions::default()).expect("compile_schema failed");
    assert_eq!(types.len(), 9);

    assert!(rust_code.starts_with("// Code generated by baregen, DO NOT EDIT.\n"));

    // Plain types
    assert!(rust_code.contains("pub struct PublicKey(pub [u8; 128]);"));
    assert!(rust_code.contains("pub struct Time(pub String);"));
    assert!(rust_code.contains("pub struct TerminatedEmployee(pub ());"));
    assert!(rust_code.contains("pub struct Address {"));
    assert!(rust_code.contains("    pub address: [String; 4],"));
    assert!(rust_code.contains("    #[serde(rename = \"hireDate\")]\n    pub hire_date: Time,"));
    assert!(rust_code.contains("    pub public_key: Option<Box<PublicKey>>,"));
    assert!(rust_code.contains("    pub metadata: ::std::collections::HashMap<String, Vec<u8>>,"));

    // The anonymous order struct is hoisted next to its owner
    assert!(rust_code.contains("    pub orders: Vec<CustomerOrders>,"));
    assert!(rust_code.contains("pub struct CustomerOrders {"));
    assert!(rust_code.contains("    pub order_id: i64,"));

    // Enum
    assert!(rust_code.contains("pub struct InvalidEnumValue {"));
    assert!(rust_code.contains("pub struct Department(pub u64);"));
    assert!(rust_code.contains("    pub const CUSTOMER_SERVICE: Department = Department(2);"));
    assert!(rust_code.contains("    pub const JSMITH: Department = Department(99);"));

    // Union
    assert!(rust_code.contains(
        "pub enum Person {\n    Customer(Box<Customer>),\n    Employee(Box<Employee>),\n    TerminatedEmployee(Box<TerminatedEmployee>),\n}"
    ));
    assert!(rust_code.contains("            Person::Employee(_) => 1,"));
    assert!(rust_code.contains("    pub people: Vec<Person>,"));
    assert!(rust_code.contains("    pub featured: Option<Box<Person>>,"));
    assert!(rust_code.contains(
        "        bare::register_union::<Person>()\n            .member::<Customer>(0)\n            .member::<Employee>(1)\n            .member::<TerminatedEmployee>(2);"
    ));

    // Plain types come before enums, enums before unions
    let public_key = rust_code.find("pub struct PublicKey").unwrap();
    let department = rust_code.find("pub struct Department").unwrap();
    let person = rust_code.find("pub enum Person").unwrap();
    assert!(public_key < department);
    assert!(department < person);
}

#[test]
fn test_parse_reader_matches_parse_schema() {
    let from_reader = parse_reader(SCHEMA.as_bytes()).expect("parse_reader failed");
    let from_text = parse_schema(SCHEMA).expect("parse_schema failed");
    assert_eq!(from_reader, from_text);
}

#[test]
fn test_enum_with_explicit_kind() {
    let types = parse_schema("enum Level u8 { LOW MEDIUM = 10 HIGH }").unwrap();
    match &types[0] {
        SchemaType::UserEnum(ude) => {
            assert_eq!(ude.kind, PrimitiveKind::U8);
            assert_eq!(
                ude.values,
                vec![
                    EnumValue { name: "LOW".to_string(), value: 0 },
                    EnumValue { name: "MEDIUM".to_string(), value: 10 },
                    EnumValue { name: "HIGH".to_string(), value: 11 },
                ]
            );
        }
        other => panic!("expected an enum, got {:?}", other),
    }
}

#[test]
fn test_failure_produces_no_output() {
    let err = compile_schema("type Good u8\ntype bad u8", &GenOptions::default()).unwrap_err();
    match err {
        BareError::InvalidName { kind, name, .. } => {
            assert_eq!(kind, NameKind::UserType);
            assert_eq!(name, "bad");
        }
        other => panic!("expected an invalid name, got {:?}", other),
    }
}

#[test]
fn test_error_messages() {
    let err = parse_schema("type Foo {").unwrap_err();
    assert!(matches!(err, BareError::UnexpectedEndOfInput { .. }), "got {:?}", err);

    let err = parse_schema("type Foo @").unwrap_err();
    assert_eq!(err.to_string(), "Unknown token '@' at line 1, column 10");
}

#[test]
fn test_ast_serializes_to_json() {
    let types = parse_schema("type Key data<32>\nenum E u16 { A }").unwrap();
    let json = serde_json::to_value(&types).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "declaration": "user_type",
                "name": "Key",
                "type": { "kind": "data", "length": 32 }
            },
            {
                "declaration": "user_enum",
                "name": "E",
                "kind": "u16",
                "values": [{ "name": "A", "value": 0 }]
            }
        ])
    );
}

#[test]
fn test_schema_for_native_types() {
    assert_eq!(schema_for::<u32>().unwrap(), "u32");
    assert_eq!(schema_for::<Option<bool>>().unwrap(), "optional<bool>");
}
