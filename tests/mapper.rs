use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use structural_mapper::{Assemble, Kind, MapError, Scalar, Shape, map};

#[derive(Shape, Clone)]
struct SourceNoDate {
    name: String,
}

#[derive(Shape, Clone)]
struct Source {
    name: String,
    date: SystemTime,
}

#[derive(Assemble, Debug, PartialEq)]
struct Target {
    name: String,
    date: SystemTime,
}

#[derive(Shape)]
struct SourceWithOption {
    name: Option<String>,
}

#[derive(Assemble, Debug, PartialEq)]
struct TargetWithOption {
    name: Option<String>,
}

#[derive(Shape)]
struct SourceWithArray {
    name: String,
    middle_names: Vec<String>,
}

#[derive(Assemble, Debug, PartialEq)]
struct TargetWithArray {
    name: String,
    middle_names: Vec<String>,
}

#[derive(Shape)]
struct ComplexSrc {
    thing1: String,
    thing2: String,
}

#[derive(Assemble, Debug, PartialEq)]
struct ComplexTgt {
    thing1: String,
    thing2: String,
}

#[derive(Shape)]
struct SourceWithArrayComplex {
    name: String,
    complex_things: Vec<ComplexSrc>,
}

#[derive(Assemble, Debug, PartialEq)]
struct TargetWithArrayComplex {
    name: String,
    complex_things: Vec<ComplexTgt>,
}

#[derive(Shape)]
struct SourceWithComplexSubtype {
    name: String,
    complex_subtype: SourceWithArrayComplex,
}

#[derive(Assemble, Debug, PartialEq)]
struct TargetWithComplexSubtype {
    name: String,
    complex_subtype: TargetWithArrayComplex,
}

#[derive(Shape)]
struct SourceWithMap {
    name: String,
    interests: HashMap<String, String>,
}

#[derive(Assemble, Debug, PartialEq)]
struct TargetWithMap {
    name: String,
    interests: HashMap<String, String>,
}

fn ada() -> SourceWithArray {
    SourceWithArray {
        name: "Ada".to_owned(),
        middle_names: vec!["Augusta".to_owned()],
    }
}

fn things(pairs: &[(&str, &str)]) -> Vec<ComplexSrc> {
    pairs
        .iter()
        .map(|(a, b)| ComplexSrc {
            thing1: (*a).to_owned(),
            thing2: (*b).to_owned(),
        })
        .collect()
}

#[test]
fn simple_string_map() {
    let source = SourceNoDate {
        name: "TestName".to_owned(),
    };

    let result: Target = map(&source).unwrap();

    assert_eq!(result.name, source.name);
}

#[test]
fn option_field_is_copied() {
    let source = SourceWithOption {
        name: Some("TestName".to_owned()),
    };

    let result: TargetWithOption = map(&source).unwrap();

    assert_eq!(result.name.as_deref(), Some("TestName"));

    let empty: TargetWithOption = map(&SourceWithOption { name: None }).unwrap();
    assert_eq!(empty.name, None);
}

#[test]
fn timestamp_is_copied() {
    let source = Source {
        name: String::new(),
        date: UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789),
    };

    let result: Target = map(&source).unwrap();

    assert_eq!(result.date, source.date);
}

#[test]
fn missing_source_field_gets_zero_value() {
    let source = SourceNoDate {
        name: "TestName".to_owned(),
    };

    let result: Target = map(&source).unwrap();

    assert_eq!(result.name, "TestName");
    assert_eq!(result.date, UNIX_EPOCH);
}

#[test]
fn identical_shape_copies_every_field() {
    let source = Source {
        name: "TestName".to_owned(),
        date: SystemTime::now(),
    };

    let result: Target = map(&source).unwrap();

    assert_eq!(
        result,
        Target {
            name: source.name.clone(),
            date: source.date,
        }
    );
}

#[test]
fn source_by_reference_or_value_is_the_same() {
    let source = SourceNoDate {
        name: "TestName".to_owned(),
    };

    let by_ref: Target = map(&source).unwrap();
    let by_ref_ref: Target = map(&&source).unwrap();
    let boxed: Target = map(Box::new(source.clone())).unwrap();
    let by_value: Target = map(source).unwrap();

    assert_eq!(by_ref, by_value);
    assert_eq!(by_ref_ref, by_value);
    assert_eq!(boxed, by_value);
}

#[test]
fn direct_source_into_option_target_fails() {
    let source = SourceNoDate {
        name: "TestName".to_owned(),
    };

    let err = map::<Option<Target>, _>(&source).unwrap_err();

    assert!(matches!(
        err,
        MapError::IndirectTarget {
            found: Kind::Record,
            ..
        }
    ));
}

#[test]
fn concrete_scenario_with_and_without_dropped_field() {
    #[derive(Assemble, Debug, PartialEq)]
    struct NameOnly {
        name: String,
    }

    let full: TargetWithArray = map(&ada()).unwrap();
    assert_eq!(
        full,
        TargetWithArray {
            name: "Ada".to_owned(),
            middle_names: vec!["Augusta".to_owned()],
        }
    );

    let short: NameOnly = map(&ada()).unwrap();
    assert_eq!(
        short,
        NameOnly {
            name: "Ada".to_owned()
        }
    );
}

#[test]
fn simple_array_map() {
    let source = vec![
        SourceNoDate {
            name: "TestName1".to_owned(),
        },
        SourceNoDate {
            name: "TestName2".to_owned(),
        },
    ];

    let result: Vec<Target> = map(&source).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].name, "TestName1");
    assert_eq!(result[1].name, "TestName2");
}

#[test]
fn array_of_arrays() {
    let source = vec![
        vec!["test1".to_owned(), "TestName1".to_owned()],
        vec!["test2".to_owned(), "TestName2".to_owned()],
    ];

    let result: Vec<Vec<String>> = map(&source).unwrap();

    assert_eq!(result, source);
}

#[test]
fn array_with_sub_array_keeps_order() {
    let source = vec![
        SourceWithArray {
            name: "TestName1".to_owned(),
            middle_names: vec!["Fred".to_owned(), "Bill".to_owned()],
        },
        SourceWithArray {
            name: "TestName2".to_owned(),
            middle_names: vec!["John".to_owned(), "Clive".to_owned()],
        },
    ];

    let result: Vec<TargetWithArray> = map(&source).unwrap();

    assert_eq!(result[0].middle_names, ["Fred", "Bill"]);
    assert_eq!(result[1].middle_names, ["John", "Clive"]);
}

#[test]
fn array_with_complex_sub_array() {
    let source = vec![SourceWithArrayComplex {
        name: "TestName1".to_owned(),
        complex_things: things(&[("TestThing1", "TestThing2"), ("TestThing3", "TestThing4")]),
    }];

    let result: Vec<TargetWithArrayComplex> = map(&source).unwrap();

    assert_eq!(result[0].complex_things[0].thing1, "TestThing1");
    assert_eq!(result[0].complex_things[1].thing1, "TestThing3");
    assert_eq!(result[0].complex_things[1].thing2, "TestThing4");
}

#[test]
fn nested_complex_subtype() {
    let source = SourceWithComplexSubtype {
        name: "TestName1".to_owned(),
        complex_subtype: SourceWithArrayComplex {
            name: "TestName1".to_owned(),
            complex_things: things(&[("TestThing1", "TestThing2"), ("TestThing3", "TestThing4")]),
        },
    };

    let result: TargetWithComplexSubtype = map(&source).unwrap();

    assert_eq!(result.complex_subtype.name, "TestName1");
    assert_eq!(result.complex_subtype.complex_things[0].thing1, "TestThing1");
}

#[test]
fn simple_map_of_strings() {
    let mut source = HashMap::new();
    source.insert("foo".to_owned(), "bar".to_owned());
    source.insert("baz".to_owned(), "boo".to_owned());

    let result: HashMap<String, String> = map(&source).unwrap();

    assert_eq!(result, source);
}

#[test]
fn struct_with_map() {
    let source = SourceWithMap {
        name: "TestName".to_owned(),
        interests: HashMap::from([
            ("foo".to_owned(), "bar".to_owned()),
            ("baz".to_owned(), "boo".to_owned()),
        ]),
    };

    let result: TargetWithMap = map(&source).unwrap();

    assert_eq!(result.interests["foo"], "bar");
    assert_eq!(result.interests["baz"], "boo");
}

#[test]
fn map_of_sequences() {
    #[derive(Shape)]
    struct Src {
        map: HashMap<String, Vec<String>>,
    }

    #[derive(Assemble)]
    struct Res {
        map: BTreeMap<String, Vec<String>>,
    }

    let source = Src {
        map: HashMap::from([("foo".to_owned(), vec!["bar".to_owned(), "baz".to_owned()])]),
    };

    let result: Res = map(&source).unwrap();

    assert_eq!(result.map["foo"], ["bar", "baz"]);
}

#[test]
fn map_of_maps() {
    #[derive(Shape)]
    struct Src {
        map: HashMap<String, HashMap<String, String>>,
    }

    #[derive(Assemble)]
    struct Res {
        map: HashMap<String, HashMap<String, String>>,
    }

    let source = Src {
        map: HashMap::from([(
            "foo".to_owned(),
            HashMap::from([("bar".to_owned(), "baz".to_owned())]),
        )]),
    };

    let result: Res = map(&source).unwrap();

    assert_eq!(result.map, source.map);
}

#[test]
fn map_of_records() {
    #[derive(Shape)]
    struct SubStruct {
        name: String,
        secret: String,
    }

    #[derive(Shape)]
    struct Src {
        map: HashMap<String, SubStruct>,
    }

    #[derive(Assemble)]
    struct ResSubStruct {
        name: String,
    }

    #[derive(Assemble)]
    struct Res {
        map: HashMap<String, ResSubStruct>,
    }

    let source = Src {
        map: HashMap::from([(
            "foo".to_owned(),
            SubStruct {
                name: "Bar".to_owned(),
                secret: "hidden".to_owned(),
            },
        )]),
    };

    let result: Res = map(&source).unwrap();

    assert_eq!(result.map["foo"].name, "Bar");
}

#[test]
fn record_into_sequence_aborts() {
    let err = map::<Vec<Target>, _>(&ada()).unwrap_err();

    assert!(matches!(
        err,
        MapError::KindMismatch {
            expected: Kind::Sequence,
            found: Kind::Record,
            ..
        }
    ));
}

#[test]
fn sequence_into_record_aborts() {
    let source = vec![ada()];

    let err = map::<TargetWithArray, _>(&source).unwrap_err();

    assert!(matches!(
        err,
        MapError::KindMismatch {
            expected: Kind::Record,
            found: Kind::Sequence,
            ..
        }
    ));
}

#[test]
fn nested_kind_mismatch_reports_its_depth() {
    #[derive(Assemble, Debug)]
    #[allow(dead_code)]
    struct Wrong {
        name: String,
        complex_subtype: Vec<ComplexTgt>,
    }

    let source = SourceWithComplexSubtype {
        name: "TestName1".to_owned(),
        complex_subtype: SourceWithArrayComplex {
            name: "TestName1".to_owned(),
            complex_things: vec![],
        },
    };

    let err = map::<Wrong, _>(&source).unwrap_err();

    assert!(matches!(err, MapError::KindMismatch { .. }));
    assert_eq!(err.path().to_string(), "$.complex_subtype");
}

#[test]
fn leaf_type_mismatch_aborts() {
    #[derive(Assemble, Debug)]
    #[allow(dead_code)]
    struct NumericName {
        name: u32,
    }

    let err = map::<NumericName, _>(&ada()).unwrap_err();

    assert!(matches!(err, MapError::TypeMismatch { .. }));
    assert_eq!(err.path().to_string(), "$.name");
}

#[test]
fn field_names_are_case_sensitive() {
    #[derive(Assemble, Debug, PartialEq)]
    #[allow(non_snake_case)]
    struct Shouting {
        NAME: String,
    }

    let result: Shouting = map(&ada()).unwrap();

    assert_eq!(result.NAME, "");
}

#[test]
fn enums_map_by_variant_name() {
    #[derive(Serialize, Shape)]
    enum WireAction {
        Allow,
        Deny { reason: String, code: u16 },
    }

    #[derive(Deserialize, Assemble, Debug, PartialEq)]
    enum Action {
        Allow,
        Deny { reason: String },
        Log,
    }

    let actions = vec![
        WireAction::Allow,
        WireAction::Deny {
            reason: "blocked".to_owned(),
            code: 403,
        },
    ];

    let result: Vec<Action> = actions.map_into().unwrap();

    assert_eq!(
        result,
        vec![
            Action::Allow,
            Action::Deny {
                reason: "blocked".to_owned()
            }
        ]
    );
}

#[test]
fn top_level_scalar_yields_zero_value() {
    let result: String = map("TestName").unwrap();

    assert_eq!(result, "");
}

#[test]
fn serde_renames_do_not_change_which_fields_correspond() {
    #[derive(Serialize, Shape)]
    struct WireUser {
        #[serde(rename = "userName")]
        name: String,
    }

    #[derive(Deserialize, Assemble, Debug, PartialEq)]
    struct User {
        #[serde(rename = "login")]
        name: String,
    }

    #[derive(Deserialize, Assemble, Debug, PartialEq)]
    struct Account {
        #[serde(rename = "name")]
        login: String,
    }

    let wire = WireUser {
        name: "ada".to_owned(),
    };

    let user: User = map(&wire).unwrap();
    assert_eq!(user.name, "ada");

    let account: Account = map(&wire).unwrap();
    assert_eq!(account.login, "");
}

#[test]
fn option_source_into_scalar_target_aborts() {
    let source = SourceWithOption {
        name: Some("TestName".to_owned()),
    };

    let err = map::<Target, _>(&source).unwrap_err();

    assert!(matches!(
        err,
        MapError::TypeMismatch {
            expected: Kind::Scalar(Scalar::String),
            found: Kind::Indirection,
            ..
        }
    ));
    assert_eq!(err.path().to_string(), "$.name");
}

#[test]
fn option_source_is_unwrapped_once_for_records() {
    #[derive(Shape)]
    struct Holder {
        inner: Option<SourceNoDate>,
    }

    #[derive(Assemble, Debug, PartialEq)]
    struct Flat {
        inner: Target,
    }

    let source = Holder {
        inner: Some(SourceNoDate {
            name: "TestName".to_owned(),
        }),
    };

    let result: Flat = map(&source).unwrap();
    assert_eq!(result.inner.name, "TestName");

    let err = map::<Flat, _>(&Holder { inner: None }).unwrap_err();
    assert!(matches!(err, MapError::EmptyIndirection { .. }));
    assert_eq!(err.path().to_string(), "$.inner");
}

#[test]
fn self_containing_zero_value_aborts() {
    #[derive(Deserialize, Assemble, Debug)]
    #[allow(dead_code)]
    enum Expr {
        Not(Box<Expr>),
        Lit(bool),
    }

    #[derive(Assemble, Debug)]
    #[allow(dead_code)]
    struct Rule {
        name: String,
        guard: Expr,
    }

    let source = SourceNoDate {
        name: "deny-all".to_owned(),
    };

    let err = map::<Rule, _>(&source).unwrap_err();

    assert!(matches!(
        err,
        MapError::RecursiveZero {
            type_name: "Expr",
            ..
        }
    ));
    assert_eq!(err.path().to_string(), "$.guard::Not");
}

#[test]
fn self_containing_record_zero_aborts() {
    #[derive(Assemble, Debug)]
    #[allow(dead_code)]
    struct Chain {
        name: String,
        next: Box<Chain>,
    }

    let source = SourceNoDate {
        name: "head".to_owned(),
    };

    let err = map::<Chain, _>(&source).unwrap_err();

    assert!(matches!(err, MapError::RecursiveZero { .. }));
    assert_eq!(err.path().to_string(), "$.next.next");
}

#[test]
fn identical_rc_fields_keep_their_pointer() {
    #[derive(Shape)]
    struct CachedProfile {
        name: Rc<String>,
        avatar: Rc<Vec<u8>>,
    }

    #[derive(Assemble)]
    struct Profile {
        name: String,
        avatar: Rc<Vec<u8>>,
    }

    let source = CachedProfile {
        name: Rc::new("Ada".to_owned()),
        avatar: Rc::new(vec![0x89, 0x50, 0x4e, 0x47]),
    };

    let profile: Profile = map(&source).unwrap();

    assert!(Rc::ptr_eq(&profile.avatar, &source.avatar));
    assert_eq!(profile.name, "Ada");
}
