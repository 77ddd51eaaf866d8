//! The scope-factory splice pass.
//!
//! `build_container_node` leaves every function/class record's node as a
//! `CircularPlaceholder` because a closure's captured values aren't known
//! until the whole block/frame graph has been analyzed. This pass runs
//! after `analyze()` and turns each of those placeholders into a call
//! against its block's scope factory (`factory::build_factory_with_exposed`),
//! so a function traced from two different frames of the same block (two
//! calls to the same outer function) shares one factory and one function
//! expression, each call producing its own independent closure — and two
//! sibling closures defined in the same frame (`{inc: ()=>++x, dec:
//! ()=>--x}`) share one factory *invocation* per frame instead of
//! re-running it once per sibling, by calling the factory into a synthetic
//! "capture" record and indexing each sibling into it.

use crate::factory::build_factory_with_exposed;
use crate::mangle::NameMangler;
use crate::store::ScopeStore;
use crate::super_rewrite::rewrite_super;
use livepack_common::{BlockId, FrameId, RecordId};
use livepack_ir::{Node, NodeArena, Param};
use livepack_trace::{EdgeKey, FunctionMetaLookup, RecordKind, RecordStore};

pub fn splice_closures(
    arena: &mut NodeArena,
    store: &ScopeStore,
    records: &mut RecordStore,
    function_meta: &dyn FunctionMetaLookup,
    mangler: &mut NameMangler,
) {
    let block_ids: Vec<BlockId> = (0..store.blocks().len()).map(|i| BlockId(i as u32)).collect();
    for block_id in block_ids {
        splice_block(arena, store, records, function_meta, mangler, block_id);
    }
}

fn splice_block(
    arena: &mut NodeArena,
    store: &ScopeStore,
    records: &mut RecordStore,
    function_meta: &dyn FunctionMetaLookup,
    mangler: &mut NameMangler,
    block_id: BlockId,
) {
    let instance_ids = store.block(block_id).functions.clone();
    if instance_ids.is_empty() {
        return;
    }

    // Group instances by the frame that produced them, preserving the
    // order frames were attached in (`attach_functions_to_blocks` pushes in
    // trace order).
    let mut by_frame: Vec<(FrameId, Vec<RecordId>)> = Vec::new();
    for rec in instance_ids {
        let Some(frame_id) = records.get(rec).scope_frame else { continue };
        match by_frame.iter_mut().find(|(f, _)| *f == frame_id) {
            Some(entry) => entry.1.push(rec),
            None => by_frame.push((frame_id, vec![rec])),
        }
    }
    if by_frame.is_empty() {
        return;
    }

    let num_positions = by_frame.iter().map(|(_, group)| group.len()).max().unwrap_or(0);

    // One definition record per distinct closure position, built from
    // whichever frame's instance at that position is found first — every
    // instance at the same position shares identical source (same
    // function_id), only the captured values differ.
    let mut definitions: Vec<RecordId> = Vec::with_capacity(num_positions);
    for pos in 0..num_positions {
        let Some((_, group)) = by_frame.iter().find(|(_, g)| g.len() > pos) else { continue };
        if let Some(def) = build_definition_record(arena, records, function_meta, group[pos]) {
            definitions.push(def);
        }
    }
    if definitions.is_empty() {
        return;
    }

    let plan = build_factory_with_exposed(arena, store.block(block_id), records, mangler, definitions.clone());
    let factory_record = records.create(RecordKind::Function, format!("scope{}", block_id.0), plan.factory_fn);

    // The factory's return statement holds a bare `RecordRef` per exposed
    // definition; without a dependency edge here the scheduler never visits
    // those records and the renderer has no name to resolve the ref to.
    for (&def, &ref_node) in definitions.iter().zip(plan.exposed_refs.iter()) {
        records.add_dep(factory_record, def, ref_node, EdgeKey::Property("closure".to_string()));
    }

    // The factory returns a bare value only when it has exactly one thing
    // to return overall (this block's one definition, no deferred circular
    // injectors); any more than that and it returns them as an array, so an
    // instance's call result must be indexed even when this block only
    // defines one closure.
    let returns_array = definitions.len() + store.block(block_id).injectors.len() > 1;

    for (frame_id, group) in &by_frame {
        let callee = arena.alloc(Node::RecordRef(factory_record));
        let mut args = Vec::with_capacity(plan.call_params.len());
        let mut arg_targets = Vec::with_capacity(plan.call_params.len());
        for name in &plan.call_params {
            match store.frame(*frame_id).get(name) {
                Some(props) if !props.is_circular => {
                    arg_targets.push(Some(props.record));
                    args.push(arena.alloc(Node::RecordRef(props.record)));
                }
                _ => {
                    arg_targets.push(None);
                    args.push(arena.alloc(Node::Undefined));
                }
            }
        }
        let call = Node::Call { callee, args: args.clone(), optional: false };

        if !returns_array {
            let Some(&inst) = group.first() else { continue };
            let inst_node = records.get(inst).node;
            arena.replace(inst_node, call);
            records.add_dep(inst, factory_record, callee, EdgeKey::Property("scope".to_string()));
            for (i, target) in arg_targets.iter().enumerate() {
                if let Some(target) = target {
                    records.add_dep(inst, *target, args[i], EdgeKey::Argument(i));
                }
            }
            continue;
        }

        // The factory call returns an array here (multiple definitions,
        // or deferred injectors tacked on after them): invoke it once per
        // frame into a synthetic capture record, and index each sibling
        // into it by its position among this block's definitions.
        let call_id = arena.alloc(call);
        let capture = records.create(RecordKind::Array, "scopeCapture", call_id);
        records.add_dep(capture, factory_record, callee, EdgeKey::Property("scope".to_string()));
        for (i, target) in arg_targets.iter().enumerate() {
            if let Some(target) = target {
                records.add_dep(capture, *target, args[i], EdgeKey::Argument(i));
            }
        }

        for (pos, &inst) in group.iter().enumerate() {
            let capture_ref = arena.alloc(Node::RecordRef(capture));
            let index_node = arena.alloc(Node::Number(pos as f64));
            let member = Node::Member { object: capture_ref, property: index_node, computed: true, optional: false };
            let inst_node = records.get(inst).node;
            arena.replace(inst_node, member);
            records.add_dep(inst, capture, capture_ref, EdgeKey::Index(pos as u32));
        }
    }
}

/// Builds a standalone record holding the function expression for one
/// closure position, from a representative instance's function metadata.
/// Not inserted into `block.functions`: it's a synthesized definition, not
/// another traced instance.
fn build_definition_record(
    arena: &mut NodeArena,
    records: &mut RecordStore,
    function_meta: &dyn FunctionMetaLookup,
    representative: RecordId,
) -> Option<RecordId> {
    let rec = records.get(representative);
    let kind = rec.kind;
    let base_name = rec.name.clone();
    let function_id = rec.function_id?;
    let meta = function_meta.lookup(function_id)?;

    for &stmt in &meta.body {
        rewrite_super(arena, stmt);
    }

    let params: Vec<Param> = meta
        .params
        .iter()
        .map(|name| Param { name: arena.alloc(Node::Ident(name.clone())), default: None, rest: false })
        .collect();

    let node = Node::FunctionExpr {
        name: None,
        params,
        body: meta.body.clone(),
        is_async: meta.is_async,
        is_generator: meta.is_generator,
        use_strict_directive: meta.strictness == livepack_trace::Strictness::Strict,
    };
    let node_id = arena.alloc(node);
    Some(records.create(kind, format!("{base_name}Def"), node_id))
}
