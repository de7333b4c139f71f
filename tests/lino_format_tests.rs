//! Byte-level checks of the Links Notation output and of decoding
//! hand-written documents.

use lino_objects_codec::links::{self, Link};
use lino_objects_codec::{
    decode, decode_with_options, encode, lino, CodecOptions, DecodeMode, Error, List, Value,
};

#[test]
fn test_scalar_encodings() {
    let cases = [
        (Value::Null, "(null)"),
        (Value::Undefined, "(undefined)"),
        (Value::Bool(true), "(bool true)"),
        (Value::Bool(false), "(bool false)"),
        (Value::Int(42), "(int 42)"),
        (Value::Int(-7), "(int -7)"),
        (Value::Float(1.5), "(float 1.5)"),
        (Value::Float(1.0), "(float 1.0)"),
        (Value::Float(f64::NAN), "(float NaN)"),
        (Value::Float(f64::INFINITY), "(float Infinity)"),
        (Value::Float(f64::NEG_INFINITY), "(float -Infinity)"),
        (Value::from("Hello"), "(str SGVsbG8=)"),
        (Value::from(""), "(str \"\")"),
    ];
    for (value, expected) in cases {
        assert_eq!(encode(&value).unwrap(), expected);
    }
}

#[test]
fn test_object_encoding() {
    let user = lino!({"name": "Alice"});
    assert_eq!(
        encode(&user).unwrap(),
        "(object obj_0 ((str bmFtZQ==) (str QWxpY2U=)))"
    );
}

#[test]
fn test_array_encoding() {
    let value = lino!([1, "two", true]);
    assert_eq!(
        encode(&value).unwrap(),
        "(array obj_0 (int 1) (str dHdv) (bool true))"
    );
}

#[test]
fn test_ids_follow_depth_first_order() {
    let value = lino!([{"xs": []}, []]);
    assert_eq!(
        encode(&value).unwrap(),
        "(array obj_0 (object obj_1 ((str eHM=) (array obj_2))) (array obj_3))"
    );
}

#[test]
fn test_encoded_output_parses_as_links() {
    let value = lino!({"a": [1, 2], "b": {"c": null}});
    let text = encode(&value).unwrap();
    let parsed = links::parse(&text).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].leaf_at(0), Some("object"));
    assert_eq!(parsed[0].leaf_at(1), Some("obj_0"));
    assert_eq!(parsed[0].to_string(), text);
}

#[test]
fn test_decode_hand_written_document() {
    let text = "
        (object obj_0
          ((str bmFtZQ==) (str QWxpY2U=))
          ((str dGFncw==) (array obj_1 (int 1) (float 2.5)))
          ((str c2VsZg==) (ref obj_0)))
    ";
    let value = decode(text).unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(map.get("name"), Some(Value::from("Alice")));
    let tags = map.get("tags").unwrap();
    let tags = tags.as_list().unwrap();
    assert_eq!(tags.to_vec(), vec![Value::Int(1), Value::Float(2.5)]);
    assert!(map.get("self").unwrap().as_map().unwrap().ptr_eq(map));
}

#[test]
fn test_reference_to_earlier_sibling() {
    let value = decode("(array obj_0 (array obj_1 (int 1)) (ref obj_1))").unwrap();
    let list = value.as_list().unwrap();
    let first = list.get(0).unwrap();
    let second = list.get(1).unwrap();
    assert!(first.as_list().unwrap().ptr_eq(second.as_list().unwrap()));
}

#[test]
fn test_reference_before_definition_is_dangling() {
    let err = decode("(array obj_0 (ref obj_1) (array obj_1))").unwrap_err();
    assert_eq!(err, Error::DanglingReference("obj_1".to_string()));
}

#[test]
fn test_untagged_shapes() {
    assert_eq!(decode("hello").unwrap(), Value::from("hello"));
    assert_eq!(decode("()").unwrap(), Value::Null);
    assert_eq!(decode("(array)").unwrap(), Value::from(List::new()));
    assert!(decode("(object)").unwrap().as_map().unwrap().is_empty());
}

#[test]
fn test_short_object_entries_skipped() {
    let value = decode("(object obj_0 ((str YQ==)) ((str Yg==) (int 2)))").unwrap();
    let map = value.as_map().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("b"), Some(Value::Int(2)));
}

#[test]
fn test_invalid_nodes() {
    assert!(matches!(
        decode("((int 1) 2)").unwrap_err(),
        Error::InvalidNode(_)
    ));
    assert!(matches!(decode("(ref)").unwrap_err(), Error::InvalidNode(_)));
    assert!(matches!(
        decode("(array (int 1))").unwrap_err(),
        Error::InvalidNode(_)
    ));
    assert!(matches!(
        decode("(object obj_0 ((array obj_1) (int 1)))").unwrap_err(),
        Error::InvalidNode(_)
    ));
}

#[test]
fn test_missing_payloads_default() {
    assert_eq!(decode("(bool)").unwrap(), Value::Bool(false));
    assert_eq!(decode("(int)").unwrap(), Value::Int(0));
    assert_eq!(decode("(float)").unwrap(), Value::Float(0.0));
    assert_eq!(decode("(str)").unwrap(), Value::from(""));
}

#[test]
fn test_syntax_errors() {
    for text in ["(int 1", "(int 1))", "(str 'abc)"] {
        let err = decode(text).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }), "{} gave {:?}", text, err);
        assert!(err.is_decode_error());
    }
}

#[test]
fn test_strict_mode_accepts_valid_documents() {
    let options = CodecOptions::new().with_mode(DecodeMode::Strict);
    let text = encode(&lino!({"x": [1, 2.5, "s", true, null]})).unwrap();
    assert!(decode_with_options(&text, options).is_ok());
}

#[test]
fn test_link_rendering_quotes_when_needed() {
    let link = Link::node(vec![Link::leaf("str"), Link::leaf("")]);
    assert_eq!(link.to_string(), "(str \"\")");

    let link = Link::node(vec![Link::leaf("a b"), Link::leaf("c")]);
    assert_eq!(link.to_string(), "(\"a b\" c)");
}
