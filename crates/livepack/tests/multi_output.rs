//! Two declared split points that both reach the same object pull it out
//! into a shared common chunk instead of duplicating it into each file, and
//! every output's filename hash is computed from its own content before any
//! cross-output placeholder is finalized.

use livepack::{SerializeOptions, Serializer, SplitPointInput};
use livepack_common::Primitive;
use livepack_trace::{FunctionMeta, HostObject, HostProp, HostValue, ObjectKind, PropKey, PropValue};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

fn empty_meta() -> FxHashMap<u32, FunctionMeta> {
    FxHashMap::default()
}

fn plain_object(props: Vec<HostProp>) -> HostValue {
    HostValue::Object(Rc::new(RefCell::new(HostObject {
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
    })))
}

fn data_prop(name: &str, value: HostValue) -> HostProp {
    HostProp { key: PropKey::Str(name.to_string()), bitmap: livepack_common::DescriptorBitmap::default_data(), value: PropValue::Data(value) }
}

#[test]
fn two_split_points_sharing_a_helper_extract_one_common_chunk() {
    let shared = plain_object(vec![data_prop("tag", HostValue::Primitive(Primitive::String("shared-helper".to_string())))]);

    let entry_root = plain_object(vec![data_prop("name", HostValue::Primitive(Primitive::String("entry".to_string())))]);
    let split_a = plain_object(vec![data_prop("a", HostValue::Primitive(Primitive::Number(1.0))), data_prop("shared", shared.clone())]);
    let split_b = plain_object(vec![data_prop("b", HostValue::Primitive(Primitive::Number(2.0))), data_prop("shared", shared.clone())]);

    let split_points = vec![
        SplitPointInput { root_value: split_a, name: Some("alpha".to_string()), is_async: false },
        SplitPointInput { root_value: split_b, name: Some("beta".to_string()), is_async: false },
    ];

    let mut options = SerializeOptions::default();
    options.stats = true;
    let serializer = Serializer::new(options);
    let result = serializer.serialize(&entry_root, &empty_meta(), Vec::new(), Vec::new(), split_points).expect("serialize succeeds");

    assert_eq!(result.files.len(), 4, "entry + alpha + beta + one extracted common chunk");

    let stats = result.stats.expect("stats were requested");
    assert_eq!(stats.outputs.len(), 4);

    let common_count = stats.outputs.iter().filter(|o| matches!(o.kind, livepack_common::OutputStatsKind::Common | livepack_common::OutputStatsKind::CommonSplit)).count();
    assert_eq!(common_count, 1, "the shared helper must be extracted exactly once: {:?}", stats.outputs.iter().map(|o| &o.filename).collect::<Vec<_>>());

    let filenames: Vec<&String> = result.files.iter().map(|f| &f.filename).collect();
    assert_eq!(filenames.len(), filenames.iter().collect::<std::collections::HashSet<_>>().len(), "every output must get a distinct filename");

    let shared_source = result
        .files
        .iter()
        .find(|f| f.source.contains("shared-helper"))
        .expect("the common chunk carries the shared helper's own source");
    assert!(!shared_source.source.contains("entry"), "the entry's own value should not leak into the common chunk: {}", shared_source.source);
}
