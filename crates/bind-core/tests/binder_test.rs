//! Binder behaviour over in-memory rows
//!
//! Covers name resolution, rule precedence, conversion, trimming and the
//! failure modes of `build`.

use bind_core::{
    Binder, FieldRule, FieldTable, ManualTransform, MapperError, MappingConfig, MemoryRecord,
    RawValue, Target, ValueType,
};
use bind_types::ConversionError;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    user_id: Option<i32>,
    first_name: String,
    last_name: String,
    create_date: NaiveDateTime,
}

impl Target for Person {
    fn field_table() -> FieldTable<Self> {
        FieldTable::builder()
            .field("UserId", |p: &Person| p.user_id, |p, v| p.user_id = v)
            .field("FirstName", |p: &Person| p.first_name.clone(), |p, v| p.first_name = v)
            .field("LastName", |p: &Person| p.last_name.clone(), |p, v| p.last_name = v)
            .field("CreateDate", |p: &Person| p.create_date, |p, v| p.create_date = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Account {
    id: i32,
    legacy_id: i32,
}

impl Target for Account {
    fn field_table() -> FieldTable<Self> {
        FieldTable::builder()
            .field("UserId", |a: &Account| a.id, |a, v| a.id = v)
            .field("User_Id", |a: &Account| a.legacy_id, |a, v| a.legacy_id = v)
            .build()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Ticket {
    user_id: i32,
}

impl Target for Ticket {
    fn field_table() -> FieldTable<Self> {
        FieldTable::builder()
            .field("UserId", |t: &Ticket| t.user_id, |t, v| t.user_id = v)
            .build()
    }
}

fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 5, 1)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

fn operator_row() -> MemoryRecord {
    MemoryRecord::builder()
        .column("OperatorId", 5)
        .column("FirstName", "John")
        .column("SurName", "Smith")
        .build()
}

/// Columns whose names match fields (in any case) are copied as they are
#[test]
fn test_identity_mapping() {
    let row = MemoryRecord::builder()
        .column("userid", 5)
        .column("FIRSTNAME", "John")
        .column("LastName", "Smith")
        .column("CreateDate", created())
        .build();

    let person: Person = Binder::new(row).build().unwrap();
    assert_eq!(
        person,
        Person {
            user_id: Some(5),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            create_date: created(),
        }
    );
}

/// Null columns never reach the target, even when a rule names them
#[test]
fn test_null_columns_are_skipped() {
    let row = MemoryRecord::builder()
        .null("UserCode")
        .null("FirstName")
        .column("LastName", "Smith")
        .build();

    let person: Person = Binder::new(row)
        .typed_rule::<bool>("UserCode", Some("UserId"))
        .unwrap()
        .manual_rule("FirstName", |_| Err("must not run".into()), None)
        .build()
        .unwrap();

    assert_eq!(person.user_id, None);
    assert_eq!(person.first_name, "");
    assert_eq!(person.last_name, "Smith");
}

#[test]
fn test_renames() {
    let person: Person = Binder::new(operator_row())
        .rename("OperatorId", "UserId")
        .rename("SurName", "LastName")
        .build()
        .unwrap();

    assert_eq!(person.user_id, Some(5));
    assert_eq!(person.first_name, "John");
    assert_eq!(person.last_name, "Smith");
}

/// The name transformation is used only when the name does not resolve as is
#[test]
fn test_name_transformation_fallback() {
    let row = MemoryRecord::builder()
        .column("User_Id", 7)
        .column("Create_Date", "2020-05-01T10:30:00")
        .build();

    let person: Person = Binder::new(&row)
        .name_transformation("_", "")
        .build()
        .unwrap();
    assert_eq!(person.user_id, Some(7));
    assert_eq!(person.create_date, created());

    let account: Account = Binder::new(&row)
        .name_transformation("_", "")
        .ignore_unmapped(true)
        .build()
        .unwrap();
    assert_eq!(account, Account { id: 0, legacy_id: 7 });
}

/// The transformation also applies to a rule's explicit target name
#[test]
fn test_name_transformation_on_rule_target() {
    let row = MemoryRecord::builder().column("Code", 9).build();

    let person: Person = Binder::new(row)
        .rename("Code", "User_Id")
        .name_transformation("_", "")
        .build()
        .unwrap();
    assert_eq!(person.user_id, Some(9));
}

#[test]
fn test_typed_rule_from_string() {
    let row = MemoryRecord::builder().column("UserCode", "5").build();

    let ticket: Ticket = Binder::new(&row)
        .typed_rule::<i32>("UserCode", Some("UserId"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(ticket.user_id, 5);

    let person: Person = Binder::new(&row)
        .typed_rule_as("UserCode", ValueType::nullable(ValueType::Int32), Some("UserId"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(person.user_id, Some(5));

    let result = Binder::<Person, _>::new(&row)
        .typed_rule::<bool>("UserCode", Some("UserId"))
        .unwrap()
        .build();
    match result {
        Err(MapperError::ConversionFailed {
            column,
            source_type,
            target,
            cause,
        }) => {
            assert_eq!(column, "UserCode");
            assert_eq!(source_type, "string");
            assert_eq!(target, ValueType::Bool);
            assert!(matches!(cause, ConversionError::InvalidFormat { .. }));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Coercion failures carry the column and the source runtime type
#[test]
fn test_conversion_failure() {
    let row = MemoryRecord::builder().column("UserId", "XYZ").build();

    let err = Binder::<Person, _>::new(row).build().unwrap_err();
    assert!(matches!(
        err,
        MapperError::ConversionFailed { ref column, ref target, .. }
            if column == "UserId" && *target == ValueType::nullable(ValueType::Int32)
    ));
    assert!(err.to_string().contains("UserId"));
}

/// Typed rules reject anything that is not a primitive or nullable primitive
#[test]
fn test_typed_rule_rejects_record_types() {
    let result = Binder::<Person, _>::new(operator_row()).typed_rule_as(
        "OperatorId",
        Person::record_type(),
        Some("UserId"),
    );

    match result {
        Err(MapperError::InvalidConfiguration { field, requested }) => {
            assert_eq!(field, "OperatorId");
            assert_eq!(requested, ValueType::record("Person"));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("record type accepted by a typed rule"),
    }

    // The untyped path accepts it and fails later, at conversion
    let err = Binder::<Person, _>::new(operator_row())
        .rule("OperatorId", Some("UserId"), Some(Person::record_type()))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        MapperError::ConversionFailed {
            cause: ConversionError::Unsupported { .. },
            ..
        }
    ));
}

/// A manual transform wins over an explicit rule type
#[test]
fn test_manual_transform_precedence() {
    let transform = ManualTransform::new(|value: RawValue| {
        let text = value.to_string();
        Ok(RawValue::from(text.chars().take(2).collect::<String>()))
    });
    let mut rule = FieldRule::manual("FirstName", transform, None);
    rule.target_type = Some(ValueType::Int32);

    let mut config = MappingConfig::new();
    config.push_rule(rule);

    let person: Person = Binder::new(operator_row())
        .with_config(config)
        .ignore_unmapped(true)
        .build()
        .unwrap();
    assert_eq!(person.first_name, "Jo");
}

#[test]
fn test_manual_transform_failure() {
    fn reject(_: RawValue) -> Result<RawValue, bind_core::TransformError> {
        Err("rejected".into())
    }

    let err = Binder::<Person, _>::new(operator_row())
        .manual_rule("FirstName", reject, None)
        .ignore_unmapped(true)
        .build()
        .unwrap_err();

    match err {
        MapperError::TransformFailed {
            column,
            transform,
            cause,
        } => {
            assert_eq!(column, "FirstName");
            assert!(transform.ends_with("reject"));
            assert_eq!(cause.to_string(), "rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A transform producing the wrong runtime type is an invalid cast
#[test]
fn test_transform_type_mismatch() {
    let err = Binder::<Person, _>::new(operator_row())
        .manual_rule("FirstName", |_| Ok(RawValue::from(5)), None)
        .ignore_unmapped(true)
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        MapperError::InvalidCast { ref field, ref value_type, declared: ValueType::String }
            if field == "FirstName" && value_type == "int32"
    ));
}

#[test]
fn test_trim() {
    let row = MemoryRecord::builder()
        .column("FirstName", "John   ")
        .column("LastName", "  Smith ")
        .column("UserId", 3)
        .build();

    let person: Person = Binder::new(&row)
        .rule("FirstName", None, None)
        .trim_last()
        .rule("UserId", None, None)
        .trim_last()
        .build()
        .unwrap();
    assert_eq!(person.first_name, "John");
    assert_eq!(person.last_name, "  Smith ");
    assert_eq!(person.user_id, Some(3));

    // Trimming an already trimmed value changes nothing
    let row = MemoryRecord::builder().column("FirstName", "John").build();
    let person: Person = Binder::new(row)
        .configure(|config| {
            config.add_rule("FirstName", None, None).trim();
        })
        .build()
        .unwrap();
    assert_eq!(person.first_name, "John");
}

#[test]
fn test_manual_transform_then_trim() {
    let row = MemoryRecord::builder().column("FirstName", "John").build();

    let person: Person = Binder::new(row)
        .manual_rule(
            "FirstName",
            |value| Ok(RawValue::from(format!("  {value}  "))),
            None,
        )
        .trim_last()
        .build()
        .unwrap();
    assert_eq!(person.first_name, "John");
}

/// Unmapped columns fail by default and are dropped with ignore-unmapped
#[test]
fn test_unmapped_columns() {
    let row = MemoryRecord::builder()
        .column("FirstName", "John")
        .column("Foo", "bar")
        .build();

    let err = Binder::<Person, _>::new(&row).build().unwrap_err();
    assert!(matches!(err, MapperError::FieldNotFound { ref field } if field == "Foo"));

    let person: Person = Binder::new(&row).ignore_unmapped(true).build().unwrap();
    assert_eq!(person.first_name, "John");
}

/// With the name transformation set, the error names the transformed name
#[test]
fn test_unmapped_after_transformation() {
    let row = MemoryRecord::builder().column("Foo_Bar", 1).build();

    let err = Binder::<Person, _>::new(row)
        .name_transformation("_", "")
        .build()
        .unwrap_err();
    assert!(matches!(err, MapperError::FieldNotFound { ref field } if field == "FooBar"));
}

/// When two rules name the same column the first one registered wins
#[test]
fn test_duplicate_rules_first_wins() {
    let person: Person = Binder::new(operator_row())
        .rename("OperatorId", "UserId")
        .rename("operatorid", "LastName")
        .rename("SurName", "LastName")
        .build()
        .unwrap();

    assert_eq!(person.user_id, Some(5));
    assert_eq!(person.last_name, "Smith");
}

/// Rule source names match columns case-insensitively
#[test]
fn test_rule_matching_ignores_case() {
    let person: Person = Binder::new(operator_row())
        .rename("OPERATORID", "userid")
        .rename("surname", "LASTNAME")
        .build()
        .unwrap();

    assert_eq!(person.user_id, Some(5));
    assert_eq!(person.last_name, "Smith");
}

/// A failed build leaves the binder usable for the next attempt
#[test]
fn test_failed_build_returns_no_partial_object() {
    let row = MemoryRecord::builder()
        .column("FirstName", "John")
        .column("UserId", "oops")
        .build();

    let binder = Binder::<Person, _>::new(row);
    assert!(binder.build().is_err());
    assert!(binder.build().is_err());
}

/// A configuration can be shared by several binders
#[test]
fn test_shared_configuration() {
    let mut config = MappingConfig::new();
    config.add_rule("OperatorId", Some("UserId"), None);
    config.add_rule("SurName", Some("LastName"), None);

    let rows = vec![
        operator_row(),
        MemoryRecord::builder()
            .column("OperatorId", 6)
            .column("SurName", "Doe")
            .build(),
    ];

    let people: Vec<Person> = rows
        .iter()
        .map(|row| Binder::new(row).with_config(config.clone()).build())
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(people[0].last_name, "Smith");
    assert_eq!(people[1].user_id, Some(6));
    assert_eq!(people[1].last_name, "Doe");
}
