use std::collections::HashMap;

use bracket_qs::{Charset, Duplicates, Options};
use pretty_assertions::assert_eq;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Query {
    name: String,
    age: u8,
    active: bool,
}

#[test]
fn deserialize_flat_struct() {
    assert_eq!(
        bracket_qs::from_str::<Query>("name=John&age=30&active=true").unwrap(),
        Query {
            name: "John".to_owned(),
            age: 30,
            active: true,
        }
    );
}

#[test]
fn deserialize_percent_encoded() {
    assert_eq!(
        bracket_qs::from_str::<Query>("name=John+Smith%21&age=30&active=false").unwrap(),
        Query {
            name: "John Smith!".to_owned(),
            age: 30,
            active: false,
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Address {
    city: String,
    postcode: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Nested {
    id: u64,
    address: Address,
}

#[test]
fn deserialize_nested_struct() {
    assert_eq!(
        bracket_qs::from_str::<Nested>("id=42&address[city]=Lund&address[postcode]=22100")
            .unwrap(),
        Nested {
            id: 42,
            address: Address {
                city: "Lund".to_owned(),
                postcode: "22100".to_owned(),
            },
        }
    );
}

#[test]
fn deserialize_dotted_keys() {
    let options = Options::new().allow_dots(true);
    assert_eq!(
        options
            .deserialize_str::<Nested>("id=42&address.city=Lund&address.postcode=22100")
            .unwrap(),
        Nested {
            id: 42,
            address: Address {
                city: "Lund".to_owned(),
                postcode: "22100".to_owned(),
            },
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Ids {
    ids: Vec<u8>,
}

#[test]
fn deserialize_vec_from_indices() {
    assert_eq!(
        bracket_qs::from_str::<Ids>("ids[0]=1&ids[1]=2&ids[2]=3").unwrap(),
        Ids { ids: vec![1, 2, 3] }
    );
}

#[test]
fn deserialize_vec_from_unordered_indices() {
    assert_eq!(
        bracket_qs::from_str::<Ids>("ids[2]=3&ids[0]=1&ids[1]=2").unwrap(),
        Ids { ids: vec![1, 2, 3] }
    );
}

#[test]
fn deserialize_vec_from_brackets() {
    assert_eq!(
        bracket_qs::from_str::<Ids>("ids[]=1&ids[]=2&ids[]=3").unwrap(),
        Ids { ids: vec![1, 2, 3] }
    );
}

#[test]
fn deserialize_vec_from_repeats() {
    assert_eq!(
        bracket_qs::from_str::<Ids>("ids=1&ids=2&ids=3").unwrap(),
        Ids { ids: vec![1, 2, 3] }
    );
}

#[test]
fn deserialize_vec_from_single_occurrence() {
    assert_eq!(
        bracket_qs::from_str::<Ids>("ids=7").unwrap(),
        Ids { ids: vec![7] }
    );
}

#[test]
fn deserialize_duplicates_policies() {
    let first = Options::new().duplicates(Duplicates::First);
    let last = Options::new().duplicates(Duplicates::Last);

    #[derive(Debug, Deserialize, PartialEq)]
    struct One {
        a: String,
    }

    assert_eq!(
        first.deserialize_str::<One>("a=x&a=y").unwrap(),
        One { a: "x".to_owned() }
    );
    assert_eq!(
        last.deserialize_str::<One>("a=x&a=y").unwrap(),
        One { a: "y".to_owned() }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Optional {
    required: String,
    maybe: Option<u32>,
}

#[test]
fn deserialize_missing_option_is_none() {
    assert_eq!(
        bracket_qs::from_str::<Optional>("required=x").unwrap(),
        Optional {
            required: "x".to_owned(),
            maybe: None,
        }
    );
}

#[test]
fn deserialize_empty_option_is_none() {
    assert_eq!(
        bracket_qs::from_str::<Optional>("required=x&maybe=").unwrap(),
        Optional {
            required: "x".to_owned(),
            maybe: None,
        }
    );
}

#[test]
fn deserialize_present_option() {
    assert_eq!(
        bracket_qs::from_str::<Optional>("required=x&maybe=7").unwrap(),
        Optional {
            required: "x".to_owned(),
            maybe: Some(7),
        }
    );
}

#[test]
fn deserialize_strict_null_option() {
    let options = Options::new().strict_null_handling(true);
    assert_eq!(
        options
            .deserialize_str::<Optional>("required=x&maybe")
            .unwrap(),
        Optional {
            required: "x".to_owned(),
            maybe: None,
        }
    );
}

#[test]
fn deserialize_into_hashmap() {
    let map: HashMap<String, String> = bracket_qs::from_str("a=1&b=2").unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], "1");
    assert_eq!(map["b"], "2");
}

#[test]
fn deserialize_nested_hashmap() {
    let map: HashMap<String, HashMap<String, u32>> =
        bracket_qs::from_str("outer[inner]=3").unwrap();
    assert_eq!(map["outer"]["inner"], 3);
}

#[derive(Debug, Deserialize, PartialEq)]
enum Role {
    Admin,
    User,
}

#[derive(Debug, Deserialize, PartialEq)]
struct WithEnum {
    role: Role,
}

#[test]
fn deserialize_unit_variant() {
    assert_eq!(
        bracket_qs::from_str::<WithEnum>("role=Admin").unwrap(),
        WithEnum { role: Role::Admin }
    );
    assert_eq!(
        bracket_qs::from_str::<WithEnum>("role=User").unwrap(),
        WithEnum { role: Role::User }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
enum Filter {
    Id(u64),
    Name(String),
}

#[derive(Debug, Deserialize, PartialEq)]
struct WithFilter {
    filter: Filter,
}

#[test]
fn deserialize_newtype_variant() {
    assert_eq!(
        bracket_qs::from_str::<WithFilter>("filter[Id]=5").unwrap(),
        WithFilter {
            filter: Filter::Id(5)
        }
    );
    assert_eq!(
        bracket_qs::from_str::<WithFilter>("filter[Name]=foo").unwrap(),
        WithFilter {
            filter: Filter::Name("foo".to_owned())
        }
    );
}

#[test]
fn deserialize_top_level_enum() {
    assert_eq!(bracket_qs::from_str::<Role>("Admin").unwrap(), Role::Admin);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Renamed {
    #[serde(rename = "q")]
    query: String,
    #[serde(default)]
    page: u32,
}

#[test]
fn deserialize_serde_attributes() {
    assert_eq!(
        bracket_qs::from_str::<Renamed>("q=rust").unwrap(),
        Renamed {
            query: "rust".to_owned(),
            page: 0,
        }
    );
}

#[test]
fn deserialize_latin1() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct One {
        a: String,
    }
    let options = Options::new().charset(Charset::Latin1);
    assert_eq!(
        options.deserialize_str::<One>("a=%a7").unwrap(),
        One {
            a: "\u{a7}".to_owned()
        }
    );
}

#[test]
fn error_names_nested_field_path() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        c: u8,
    }
    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        b: Inner,
    }

    let err = bracket_qs::from_str::<Outer>("b[c]=notanumber").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("`b.c`"), "unexpected message: {msg}");
    assert!(msg.contains("invalid u8"), "unexpected message: {msg}");
}

#[test]
fn error_names_sequence_index() {
    let err = bracket_qs::from_str::<Ids>("ids[0]=1&ids[1]=x").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("`ids[1]`"), "unexpected message: {msg}");
}

#[test]
fn error_on_shape_mismatch() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct One {
        a: u8,
    }
    let err = bracket_qs::from_str::<One>("a[b]=1").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("`a`"), "unexpected message: {msg}");
    assert!(msg.contains("got a map"), "unexpected message: {msg}");
}

mod text_codec {
    use bracket_qs::TextCodec;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, PartialEq)]
    struct Version {
        major: u8,
        minor: u8,
    }

    impl TextCodec for Version {
        fn encode_text(&self) -> String {
            format!("{}.{}", self.major, self.minor)
        }

        fn decode_text(text: &str) -> Result<Self, String> {
            let (major, minor) = text.split_once('.').ok_or("expected `major.minor`")?;
            Ok(Version {
                major: major.parse().map_err(|_| "invalid major version")?,
                minor: minor.parse().map_err(|_| "invalid minor version")?,
            })
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Query {
        #[serde(with = "bracket_qs::text")]
        version: Version,
        #[serde(with = "bracket_qs::text::option", default)]
        previous: Option<Version>,
    }

    #[test]
    fn deserialize_text_codec_field() {
        assert_eq!(
            bracket_qs::from_str::<Query>("version=1.2").unwrap(),
            Query {
                version: Version { major: 1, minor: 2 },
                previous: None,
            }
        );
        assert_eq!(
            bracket_qs::from_str::<Query>("version=1.2&previous=1.1").unwrap(),
            Query {
                version: Version { major: 1, minor: 2 },
                previous: Some(Version { major: 1, minor: 1 }),
            }
        );
    }

    #[test]
    fn text_codec_error_is_field_scoped() {
        let err = bracket_qs::from_str::<Query>("version=bogus").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`version`"), "unexpected message: {msg}");
        assert!(msg.contains("expected `major.minor`"), "unexpected message: {msg}");
    }
}
