use livepack::{SerializeOptions, Serializer};
use livepack_common::{DescriptorBitmap, Primitive};
use livepack_trace::{FunctionMeta, HostObject, HostValue, ObjectKind, PropKey, PropValue};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

fn empty_meta() -> FxHashMap<u32, FunctionMeta> {
    FxHashMap::default()
}

#[test]
fn plain_object_with_two_properties_round_trips_into_one_file() {
    let mut props = Vec::new();
    props.push(host_prop_data("a", Primitive::Number(1.0)));
    props.push(host_prop_data("b", Primitive::String("two".to_string())));

    let object = HostObject {
        kind: ObjectKind::PlainObject,
        name_hint: None,
        prototype: None,
        props,
        extensible: true,
        sealed: false,
        frozen: false,
        to_string_tag: None,
        function_id: None,
        elements: Vec::new(),
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
    assert!(source.contains("\"two\"") || source.contains("'two'"));
    assert!(source.contains('1'));
}

#[test]
fn circular_self_reference_does_not_loop_forever() {
    let object = Rc::new(RefCell::new(HostObject {
        kind: ObjectKind::PlainObject,
        name_hint: None,
        prototype: None,
        props: Vec::new(),
        extensible: true,
        sealed: false,
        frozen: false,
        to_string_tag: None,
        function_id: None,
        elements: Vec::new(),
        entries: Vec::new(),
        global_name: None,
    }));
    object.borrow_mut().props.push(livepack_trace::HostProp {
        key: PropKey::Str("self".to_string()),
        bitmap: DescriptorBitmap::default_data(),
        value: PropValue::Data(HostValue::Object(Rc::clone(&object))),
    });
    let root = HostValue::Object(object);

    let serializer = Serializer::new(SerializeOptions::default());
    let result = serializer
        .serialize(&root, &empty_meta(), Vec::new(), Vec::new(), Vec::new())
        .expect("serialize succeeds");

    assert_eq!(result.files.len(), 1);
}

fn host_prop_data(name: &str, value: Primitive) -> livepack_trace::HostProp {
    livepack_trace::HostProp {
        key: PropKey::Str(name.to_string()),
        bitmap: DescriptorBitmap::default_data(),
        value: PropValue::Data(HostValue::Primitive(value)),
    }
}
