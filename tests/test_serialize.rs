use std::collections::BTreeMap;

use bracket_qs::{ArrayFormat, Error, Map, Node, Options};
use pretty_assertions::assert_eq;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Query {
    name: String,
    age: u8,
    active: bool,
}

fn query() -> Query {
    Query {
        name: "John".to_owned(),
        age: 30,
        active: true,
    }
}

#[test]
fn serialize_flat_struct() {
    assert_eq!(
        bracket_qs::to_string(&query()).unwrap(),
        "name=John&age=30&active=true"
    );
}

#[test]
fn serialize_to_writer() {
    let mut buffer = Vec::new();
    bracket_qs::to_writer(&query(), &mut buffer).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "name=John&age=30&active=true"
    );
}

#[derive(Debug, Serialize)]
struct Nested {
    id: u64,
    address: Address,
}

#[derive(Debug, Serialize)]
struct Address {
    city: String,
    postcode: String,
}

fn nested() -> Nested {
    Nested {
        id: 42,
        address: Address {
            city: "Lund".to_owned(),
            postcode: "22100".to_owned(),
        },
    }
}

#[test]
fn serialize_nested_struct() {
    assert_eq!(
        bracket_qs::to_string(&nested()).unwrap(),
        "id=42&address[city]=Lund&address[postcode]=22100"
    );
}

#[test]
fn serialize_dotted_keys() {
    let options = Options::new().allow_dots(true);
    assert_eq!(
        options.serialize_string(&nested()).unwrap(),
        "id=42&address.city=Lund&address.postcode=22100"
    );
}

#[derive(Debug, Serialize)]
struct Ids {
    ids: Vec<u8>,
}

#[test]
fn serialize_array_formats() {
    let ids = Ids { ids: vec![1, 2, 3] };

    assert_eq!(
        bracket_qs::to_string(&ids).unwrap(),
        "ids[0]=1&ids[1]=2&ids[2]=3"
    );
    assert_eq!(
        Options::new()
            .array_format(ArrayFormat::Brackets)
            .serialize_string(&ids)
            .unwrap(),
        "ids[]=1&ids[]=2&ids[]=3"
    );
    assert_eq!(
        Options::new()
            .array_format(ArrayFormat::Repeat)
            .serialize_string(&ids)
            .unwrap(),
        "ids=1&ids=2&ids=3"
    );
}

#[test]
fn serialize_indices_with_dots_keeps_brackets() {
    // dot notation applies to map keys only; indices stay bracketed
    let options = Options::new().allow_dots(true);
    assert_eq!(
        options
            .serialize_string(&Ids { ids: vec![1, 2] })
            .unwrap(),
        "ids[0]=1&ids[1]=2"
    );
}

#[test]
fn serialize_empty_vec() {
    let ids = Ids { ids: vec![] };
    assert_eq!(bracket_qs::to_string(&ids).unwrap(), "ids=");
    assert_eq!(
        Options::new()
            .allow_empty_arrays(true)
            .serialize_string(&ids)
            .unwrap(),
        "ids[]"
    );
}

#[test]
fn serialize_skips_none() {
    #[derive(Debug, Serialize)]
    struct Optional {
        a: Option<u8>,
        b: Option<u8>,
    }
    assert_eq!(
        bracket_qs::to_string(&Optional {
            a: None,
            b: Some(3),
        })
        .unwrap(),
        "b=3"
    );
}

#[test]
fn serialize_absent_value() {
    let mut map = Map::default();
    map.insert("flag".to_owned(), Node::absent());
    map.insert("a".to_owned(), Node::from("1"));
    let tree = Node::Mapping(map);

    assert_eq!(bracket_qs::to_string(&tree).unwrap(), "flag=&a=1");
    assert_eq!(
        Options::new()
            .strict_null_handling(true)
            .serialize_string(&tree)
            .unwrap(),
        "flag&a=1"
    );
}

#[test]
fn serialize_empty_map_value() {
    let mut map = Map::default();
    map.insert("empty".to_owned(), Node::Mapping(Map::default()));
    assert_eq!(
        bracket_qs::to_string(&Node::Mapping(map)).unwrap(),
        "empty="
    );
}

#[test]
fn serialize_percent_encodes() {
    #[derive(Debug, Serialize)]
    struct One {
        a: String,
    }
    assert_eq!(
        bracket_qs::to_string(&One {
            a: "x y&z=[w]".to_owned()
        })
        .unwrap(),
        "a=x+y%26z%3D%5Bw%5D"
    );

    let mut map = BTreeMap::new();
    map.insert("weird key]".to_owned(), "v".to_owned());
    assert_eq!(bracket_qs::to_string(&map).unwrap(), "weird+key%5D=v");
}

#[test]
fn serialize_unit_variant_as_value() {
    #[derive(Debug, Serialize)]
    enum Role {
        Admin,
    }
    #[derive(Debug, Serialize)]
    struct WithEnum {
        role: Role,
    }
    assert_eq!(
        bracket_qs::to_string(&WithEnum { role: Role::Admin }).unwrap(),
        "role=Admin"
    );
}

#[test]
fn serialize_serde_attributes() {
    #[derive(Debug, Serialize)]
    struct Renamed {
        #[serde(rename = "q")]
        query: String,
        #[serde(skip)]
        #[allow(dead_code)]
        internal: u32,
    }
    assert_eq!(
        bracket_qs::to_string(&Renamed {
            query: "rust".to_owned(),
            internal: 9,
        })
        .unwrap(),
        "q=rust"
    );
}

#[test]
fn serialize_custom_delimiter() {
    let options = Options::new().delimiter(';');
    assert_eq!(
        options.serialize_string(&query()).unwrap(),
        "name=John;age=30;active=true"
    );
}

#[test]
fn serialize_custom_encoder() {
    fn upper(text: &str) -> String {
        text.to_ascii_uppercase()
    }
    let options = Options::new().encoder(upper);
    assert_eq!(
        options.serialize_string(&query()).unwrap(),
        "NAME=JOHN&AGE=30&ACTIVE=TRUE"
    );
}

#[test]
fn serialize_top_level_zero_values() {
    assert_eq!(bracket_qs::to_string(&"").unwrap(), "");
    assert_eq!(bracket_qs::to_string(&false).unwrap(), "");
    assert_eq!(bracket_qs::to_string(&0u32).unwrap(), "");
    assert_eq!(bracket_qs::to_string(&0.0f64).unwrap(), "");
    assert_eq!(bracket_qs::to_string(&()).unwrap(), "");
}

#[test]
fn serialize_top_level_primitives_error() {
    assert!(matches!(
        bracket_qs::to_string(&"x"),
        Err(Error::TopLevel(_))
    ));
    assert!(matches!(
        bracket_qs::to_string(&true),
        Err(Error::TopLevel(_))
    ));
    assert!(matches!(
        bracket_qs::to_string(&7u8),
        Err(Error::TopLevel(_))
    ));
    assert!(matches!(
        bracket_qs::to_string(&vec![1u8, 2]),
        Err(Error::TopLevel(_))
    ));
}
