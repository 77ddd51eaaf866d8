//! A zero-filled typed array round-trips through the length-only
//! constructor form instead of spelling out every element.

use livepack::{SerializeOptions, Serializer};
use livepack_common::Primitive;
use livepack_trace::{FunctionMeta, HostObject, HostValue, ObjectKind};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

fn empty_meta() -> FxHashMap<u32, FunctionMeta> {
    FxHashMap::default()
}

#[test]
fn all_zero_typed_array_uses_the_length_only_constructor() {
    let object = HostObject {
        kind: ObjectKind::TypedBuffer,
        name_hint: Some("Uint16Array".to_string()),
        prototype: None,
        props: Vec::new(),
        extensible: true,
        sealed: false,
        frozen: false,
        to_string_tag: None,
        function_id: None,
        elements: vec![Some(HostValue::Primitive(Primitive::Number(0.0))); 4],
        entries: Vec::new(),
        global_name: None,
    };
    let root = HostValue::Object(Rc::new(RefCell::new(object)));

    let serializer = Serializer::new(SerializeOptions::default());
    let result = serializer
        .serialize(&root, &empty_meta(), Vec::new(), Vec::new(), Vec::new())
        .expect("serialize succeeds");

    assert_eq!(result.files.len(), 1);
    let source = &result.files[0].source;
    assert!(source.contains("new Uint16Array(4)"), "an all-zero buffer should use the ctor-with-length form: {source}");
    assert!(!source.contains('['), "the ctor-with-length form needs no element list: {source}");
}

#[test]
fn typed_array_with_non_zero_values_spells_out_the_elements() {
    let object = HostObject {
        kind: ObjectKind::TypedBuffer,
        name_hint: Some("Uint8Array".to_string()),
        prototype: None,
        props: Vec::new(),
        extensible: true,
        sealed: false,
        frozen: false,
        to_string_tag: None,
        function_id: None,
        elements: vec![
            Some(HostValue::Primitive(Primitive::Number(1.0))),
            Some(HostValue::Primitive(Primitive::Number(2.0))),
        ],
        entries: Vec::new(),
        global_name: None,
    };
    let root = HostValue::Object(Rc::new(RefCell::new(object)));

    let serializer = Serializer::new(SerializeOptions::default());
    let result = serializer
        .serialize(&root, &empty_meta(), Vec::new(), Vec::new(), Vec::new())
        .expect("serialize succeeds");

    let source = &result.files[0].source;
    assert!(source.contains("new Uint8Array([1, 2])"), "non-zero values should spell out every element: {source}");
}
