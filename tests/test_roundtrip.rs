use std::collections::BTreeMap;
use std::fmt::Debug;

use bracket_qs::{ArrayFormat, Options};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

fn roundtrip<T>(value: &T, options: Options)
where
    T: Serialize + DeserializeOwned + PartialEq + Debug,
{
    let encoded = options.serialize_string(value).unwrap();
    let decoded: T = options.deserialize_str(&encoded).unwrap();
    assert_eq!(&decoded, value, "through {encoded:?}");
}

#[derive(Debug, Deserialize, PartialEq, Serialize)]
struct Profile {
    name: String,
    age: u8,
    active: bool,
    nickname: Option<String>,
    tags: Vec<String>,
    scores: BTreeMap<String, i32>,
}

fn profile() -> Profile {
    Profile {
        name: "John Smith".to_owned(),
        age: 30,
        active: true,
        nickname: Some("j&s".to_owned()),
        tags: vec!["a b".to_owned(), "c=d".to_owned()],
        scores: [("math".to_owned(), -3), ("art".to_owned(), 10)]
            .into_iter()
            .collect(),
    }
}

#[test]
fn roundtrip_default_options() {
    roundtrip(&profile(), Options::new());
}

#[test]
fn roundtrip_without_option_value() {
    let mut value = profile();
    value.nickname = None;
    roundtrip(&value, Options::new());
}

#[test]
fn roundtrip_array_formats() {
    roundtrip(&profile(), Options::new().array_format(ArrayFormat::Indices));
    roundtrip(
        &profile(),
        Options::new().array_format(ArrayFormat::Brackets),
    );
    roundtrip(&profile(), Options::new().array_format(ArrayFormat::Repeat));
}

#[test]
fn roundtrip_dot_notation() {
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Inner {
        value: String,
    }
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Outer {
        inner: Inner,
        items: Vec<u8>,
    }
    roundtrip(
        &Outer {
            inner: Inner {
                value: "deep".to_owned(),
            },
            items: vec![1, 2],
        },
        Options::new().allow_dots(true),
    );
}

#[test]
fn roundtrip_empty_arrays() {
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Lists {
        full: Vec<u8>,
        empty: Vec<u8>,
    }
    roundtrip(
        &Lists {
            full: vec![1],
            empty: vec![],
        },
        Options::new().allow_empty_arrays(true),
    );
}

#[test]
fn roundtrip_enums() {
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    enum Sort {
        Ascending,
        ByField(String),
    }
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Query {
        sort: Sort,
    }
    roundtrip(
        &Query {
            sort: Sort::Ascending,
        },
        Options::new(),
    );
    roundtrip(
        &Query {
            sort: Sort::ByField("age".to_owned()),
        },
        Options::new(),
    );
}

#[test]
fn roundtrip_parsed_tree() {
    let input = "a[b]=c&tags[0]=x&tags[1]=y&plain=1";
    let tree = bracket_qs::parse(input).unwrap();
    assert_eq!(bracket_qs::to_string(&tree).unwrap(), input);
}

#[test]
fn roundtrip_strict_null_tree() {
    let options = Options::new().strict_null_handling(true);
    let input = "flag&a=1";
    let tree = options.parse_str(input).unwrap();
    assert_eq!(options.serialize_string(&tree).unwrap(), input);
}
