//! Exercises the scope-factory splice pass directly against the lower-level
//! crates: two calls to the same outer closure must produce two independent
//! counters sharing one factory function, not one shared mutable record.
//!
//! `Serializer::serialize` can't host this scenario: it allocates its
//! `NodeArena` internally, so a caller has no `NodeId`s to put in
//! `FunctionMeta::body` before the call. Driving the pipeline by hand here
//! mirrors exactly what the facade does under the hood.

use livepack_common::{BlockId, FrameId};
use livepack_emit::emit_output;
use livepack_ir::{Node, NodeArena};
use livepack_scope::{Block, BlockParam, MangleStrategy, NameMangler, ScopeFrame, ScopeStore};
use livepack_split::{partition, ExportFormat};
use livepack_trace::{EdgeKey, FunctionMeta, FunctionMetaLookup, RecordKind, RecordStore, Strictness};
use rustc_hash::FxHashMap;

#[test]
fn two_calls_to_the_same_outer_closure_produce_independent_counters() {
    let mut arena = NodeArena::new();
    let mut records = RecordStore::new();

    // outer = (a) => { let b = a; return () => ++b }
    // inner1 = outer(2); inner2 = outer(100);
    let two = arena.alloc(Node::Number(2.0));
    let two_rec = records.create(RecordKind::Primitive, "two", two);
    let hundred = arena.alloc(Node::Number(100.0));
    let hundred_rec = records.create(RecordKind::Primitive, "hundred", hundred);

    let mut store = ScopeStore::new();
    let mut block = Block::new(BlockId(0), None);
    block.params.push(BlockParam::new("b", false));
    store.add_block(block);

    let mut frame0 = ScopeFrame::new(FrameId(0), BlockId(0), None);
    frame0.bind("b", two_rec);
    store.add_frame(frame0);
    let mut frame1 = ScopeFrame::new(FrameId(1), BlockId(0), None);
    frame1.bind("b", hundred_rec);
    store.add_frame(frame1);

    let placeholder0 = arena.alloc(Node::CircularPlaceholder);
    let inner1 = records.create(RecordKind::Function, "inner1", placeholder0);
    records.get_mut(inner1).scope_frame = Some(FrameId(0));
    records.get_mut(inner1).function_id = Some(0);

    let placeholder1 = arena.alloc(Node::CircularPlaceholder);
    let inner2 = records.create(RecordKind::Function, "inner2", placeholder1);
    records.get_mut(inner2).scope_frame = Some(FrameId(1));
    records.get_mut(inner2).function_id = Some(0);

    store.block_mut(BlockId(0)).functions.push(inner1);
    store.block_mut(BlockId(0)).functions.push(inner2);

    // () => ++b
    let b_ident = arena.alloc(Node::Ident("b".to_string()));
    let increment = arena.alloc(Node::Unary { op: "++", argument: b_ident });
    let ret = arena.alloc(Node::Return(Some(increment)));

    let mut meta = FxHashMap::default();
    meta.insert(
        0u32,
        FunctionMeta {
            block_id: BlockId(0),
            frame_id: FrameId(0),
            strictness: Strictness::Sloppy,
            external_names: vec!["b".to_string()],
            contains_eval: false,
            params: Vec::new(),
            is_async: false,
            is_generator: false,
            body: vec![ret],
        },
    );

    livepack_scope::analyze(&mut store, &records, |_| false).expect("analyze succeeds");

    let mut mangler = NameMangler::new(MangleStrategy::Unmangled, Vec::new(), Vec::new());
    livepack_scope::splice_closures(&mut arena, &store, &mut records, &meta, &mut mangler);

    // root = { inner1, inner2 }
    let root_placeholder = arena.alloc(Node::CircularPlaceholder);
    let root = records.create(RecordKind::PlainObject, "root", root_placeholder);
    let inner1_ref = arena.alloc(Node::RecordRef(inner1));
    let inner2_ref = arena.alloc(Node::RecordRef(inner2));
    records.add_dep(root, inner1, inner1_ref, EdgeKey::Property("inner1".to_string()));
    records.add_dep(root, inner2, inner2_ref, EdgeKey::Property("inner2".to_string()));
    let object_props = vec![
        livepack_ir::ObjectProp {
            key: arena.alloc(Node::Str("inner1".to_string())),
            computed: false,
            kind: livepack_ir::ObjectPropKind::Value,
            value: inner1_ref,
            setter: None,
            bitmap: livepack_common::DescriptorBitmap::default_data(),
        },
        livepack_ir::ObjectProp {
            key: arena.alloc(Node::Str("inner2".to_string())),
            computed: false,
            kind: livepack_ir::ObjectPropKind::Value,
            value: inner2_ref,
            setter: None,
            bitmap: livepack_common::DescriptorBitmap::default_data(),
        },
    ];
    arena.replace(root_placeholder, Node::ObjectExpr(object_props));

    let (outputs, assignment) = partition(&records, root, &[]);
    assert_eq!(outputs.len(), 1);

    let emitted = emit_output(
        &mut arena,
        &records,
        &outputs[0],
        &assignment,
        ExportFormat::Cjs,
        MangleStrategy::Unmangled,
        Vec::<String>::new(),
        true,
    );

    // Both calls into the one factory inline the number they each captured
    // (each call site has exactly one dependent, so the default
    // single-use inlining applies), so the two invocations read back as
    // `scope0(2)` and `scope0(100)` rather than through intermediate names.
    let source = &emitted.source;
    assert!(source.contains("const scope0 = function (b)"), "one shared factory should be declared: {source}");
    assert!(source.contains("++b"), "the returned closure should increment the captured value: {source}");
    assert!(source.contains("scope0(2)"), "first call should pass the traced 2: {source}");
    assert!(source.contains("scope0(100)"), "second call should pass the traced 100: {source}");
    assert_eq!(source.matches("function (b)").count(), 1, "the factory must not be duplicated per call: {source}");
    assert!(!source.contains("unbound record"), "every closure reference must resolve to a name: {source}");
}
