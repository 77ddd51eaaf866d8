//! Emits a block's scope factory: a function taking the block's (mangled,
//! reordered, locally-produced-param-trimmed) frame parameters and
//! returning either a single inner record or an array of them, in a stable
//! order, plus any deferred circular-injector arrow functions.

use crate::block::Block;
use crate::mangle::NameMangler;
use livepack_common::RecordId;
use livepack_ir::{Node, NodeArena, NodeId, Param, VarKind};
use livepack_trace::RecordStore;

pub struct FactoryPlan {
    pub factory_fn: NodeId,
    /// Frame-parameter names in the exact order the factory expects them,
    /// after step-2 trimming (locally-produced params removed) and step-4
    /// reordering. Call sites build their argument list from this.
    pub call_params: Vec<String>,
    /// Exposed inner records, in the stable order the factory returns them
    /// (single value if len == 1, else an array).
    pub exposed: Vec<RecordId>,
    /// The `RecordRef` node allocated for each `exposed` record, in the same
    /// order. The caller must register a dependency edge from the factory
    /// record to each one (with this node) or the reference can never be
    /// resolved to a name at render time.
    pub exposed_refs: Vec<NodeId>,
}

pub fn build_factory(
    arena: &mut NodeArena,
    block: &Block,
    records: &RecordStore,
    mangler: &mut NameMangler,
) -> FactoryPlan {
    // Exposed inner records: every function/class defined in this block
    // that is not scope-internal-only.
    let internal_only_names: Vec<&str> =
        block.params.iter().filter(|p| p.scope_internal_only).map(|p| p.name.as_str()).collect();
    let exposed: Vec<RecordId> = block
        .functions
        .iter()
        .copied()
        .filter(|&rec| !internal_only_names.contains(&records.get(rec).name.as_str()))
        .collect();

    build_factory_with_exposed(arena, block, records, mangler, exposed)
}

/// Same as `build_factory`, but with an explicit `exposed` list instead of
/// one derived from `block.functions`. Used by the scope-factory splice
/// pass, which needs `exposed` to name the block's *distinct* function
/// definitions (one per source closure), not every traced instance of them
/// across however many frames the block had.
pub fn build_factory_with_exposed(
    arena: &mut NodeArena,
    block: &Block,
    records: &RecordStore,
    mangler: &mut NameMangler,
    exposed: Vec<RecordId>,
) -> FactoryPlan {
    let call_params: Vec<String> =
        block.params.iter().filter(|p| !p.locally_produced).map(|p| mangled_param_name(p, mangler)).collect();

    let params: Vec<Param> = call_params
        .iter()
        .map(|name| {
            let name_node = arena.alloc(Node::Ident(name.clone()));
            Param { name: name_node, default: None, rest: false }
        })
        .collect();

    let mut body = Vec::new();

    // Step 2: locally-produced params become `const p = <fn expr>;`
    // declarations inside the factory body instead of parameters.
    for param in block.params.iter().filter(|p| p.locally_produced) {
        if let Some(&record_id) = block.functions.iter().find(|&&r| records.get(r).name == param.name) {
            let init = arena.alloc(Node::RecordRef(record_id));
            body.push(arena.alloc(Node::VarDecl { kind: VarKind::Const, name: param.name.clone(), init: Some(init) }));
        }
    }

    // Deferred injectors (step 3): one arrow function per circular param,
    // appended to the returned collection. Each assigns its single
    // argument into the enclosing local (the locally-produced const, or a
    // synthesized `let` for a captured-but-not-yet-materialized value).
    let mut injector_nodes = Vec::new();
    for injector_name in &block.injectors {
        let arg_name = "v".to_string();
        let arg_ident = arena.alloc(Node::Ident(arg_name.clone()));
        let target_ident = arena.alloc(Node::Ident(injector_name.clone()));
        let assign = arena.alloc(Node::Assign { target: target_ident, value: arg_ident });
        let arrow = arena.alloc(Node::ArrowFunction {
            params: vec![Param { name: arg_ident, default: None, rest: false }],
            body: Vec::new(),
            expr_body: Some(assign),
            is_async: false,
            use_strict_directive: false,
        });
        injector_nodes.push(arrow);
    }

    let exposed_refs: Vec<NodeId> = exposed.iter().map(|&rec| arena.alloc(Node::RecordRef(rec))).collect();
    let mut returned: Vec<NodeId> = exposed_refs.clone();
    returned.extend(injector_nodes);

    let return_value = if returned.len() == 1 {
        returned[0]
    } else {
        arena.alloc(Node::ArrayExpr(returned.into_iter().map(Some).collect()))
    };
    body.push(arena.alloc(Node::Return(Some(return_value))));

    if block.strictness == Some(crate::block::Strictness::Strict) {
        body.insert(0, arena.alloc(Node::Directive("use strict")));
    }

    let factory_fn = arena.alloc(Node::FunctionExpr {
        name: None,
        params,
        body,
        is_async: false,
        is_generator: false,
        use_strict_directive: false,
    });

    let factory_fn = if block.needs_apply_wrapper {
        wrap_apply(arena, factory_fn)
    } else {
        factory_fn
    };

    FactoryPlan { factory_fn, call_params, exposed, exposed_refs }
}

fn wrap_apply(arena: &mut NodeArena, factory_fn: NodeId) -> NodeId {
    let this_arg = arena.alloc(Node::Ident("thisValue".into()));
    let args_arg = arena.alloc(Node::Ident("argumentsValue".into()));
    arena.alloc(Node::ApplyWrapper { function: factory_fn, this_arg, args_arg })
}

fn mangled_param_name(param: &crate::block::BlockParam, mangler: &mut NameMangler) -> String {
    if param.is_frozen_name {
        mangler.reserve(param.name.clone());
        param.name.clone()
    } else {
        mangler.fresh(&param.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockParam;
    use livepack_common::BlockId;
    use livepack_trace::RecordKind;

    #[test]
    fn plain_block_returns_single_inner_record() {
        let mut arena = NodeArena::new();
        let mut records = RecordStore::new();
        let mut mangler = NameMangler::new(MangleStrategy::Mangled, vec![], vec![]);

        let node = arena.alloc(Node::Undefined);
        let inner = records.create(RecordKind::Function, "counter", node);

        let mut block = Block::new(BlockId(0), None);
        block.params.push(BlockParam::new("x", false));
        block.functions.push(inner);

        let plan = build_factory(&mut arena, &block, &records, &mut mangler);

        assert_eq!(plan.call_params, vec!["a".to_string()]);
        assert_eq!(plan.exposed, vec![inner]);
        assert!(matches!(arena.get(plan.factory_fn), Node::FunctionExpr { .. }));
    }

    #[test]
    fn locally_produced_param_is_dropped_from_call_params() {
        let mut arena = NodeArena::new();
        let mut records = RecordStore::new();
        let mut mangler = NameMangler::new(MangleStrategy::Mangled, vec![], vec![]);

        let node = arena.alloc(Node::Undefined);
        let inner = records.create(RecordKind::Function, "helper", node);

        let mut block = Block::new(BlockId(0), None);
        let mut param = BlockParam::new("helper", false);
        param.locally_produced = true;
        block.params.push(param);
        block.functions.push(inner);

        let plan = build_factory(&mut arena, &block, &records, &mut mangler);

        assert!(plan.call_params.is_empty());
        let Node::FunctionExpr { body, .. } = arena.get(plan.factory_fn) else { panic!("expected FunctionExpr") };
        assert!(matches!(arena.get(body[0]), Node::VarDecl { kind: VarKind::Const, .. }));
    }

    #[test]
    fn apply_wrapper_is_applied_when_block_requires_it() {
        let mut arena = NodeArena::new();
        let records = RecordStore::new();
        let mut mangler = NameMangler::new(MangleStrategy::Mangled, vec![], vec![]);

        let mut block = Block::new(BlockId(0), None);
        block.needs_apply_wrapper = true;

        let plan = build_factory(&mut arena, &block, &records, &mut mangler);
        assert!(matches!(arena.get(plan.factory_fn), Node::ApplyWrapper { .. }));
    }
}
