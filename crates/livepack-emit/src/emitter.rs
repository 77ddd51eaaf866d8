//! Ties the scheduler, name transform, hasher, and renderer together into
//! one output's final source text (§4.4 contract: imports, const
//! declarations, assignment statements, terminal export statement).

use crate::hashing::{content_hash, find_placeholder_sites, PlaceholderSite};
use crate::helpers::Helper;
use crate::name_transform::NameTransform;
use crate::render::{render_string_literal, Renderer};
use crate::scheduler::schedule;
use livepack_common::{OutputId, RecordId};
use livepack_ir::NodeArena;
use livepack_scope::MangleStrategy;
use livepack_split::{ExportFormat, Output};
use livepack_trace::RecordStore;
use rustc_hash::FxHashMap;

pub struct EmittedOutput {
    pub output_id: OutputId,
    /// Source before the final hash splice; may still contain placeholder
    /// tokens for outputs this one depends on.
    pub source: String,
    pub content_hash: String,
    pub placeholder_sites: Vec<PlaceholderSite>,
}

/// Resolves every `RecordRef`/`CircularPlaceholder` hole reachable from
/// `records_in_output` by writing the bound identifier (or, for an
/// inlined single-use record, its own fragment) into the arena in place,
/// then renders the output's declarations in scheduled order.
pub fn emit_output(
    arena: &mut NodeArena,
    records: &RecordStore,
    output: &Output,
    assignment: &FxHashMap<RecordId, OutputId>,
    format: ExportFormat,
    mangle_strategy: MangleStrategy,
    globals: impl IntoIterator<Item = String>,
    inline_single_use: bool,
) -> EmittedOutput {
    let plan = schedule(records, output.id, assignment, &output.exports);
    let mut names = NameTransform::new(mangle_strategy, globals);

    for &record_id in &plan.declaration_order {
        let record = records.get(record_id);
        let should_bind = !should_inline(record, inline_single_use);
        if should_bind {
            names.name_for(record_id, &record.name);
        }
    }

    resolve_record_refs(arena, records, &plan.declaration_order, &names, inline_single_use);

    let mut body_lines = Vec::new();
    let mut uses_define_props = false;
    {
        let mut renderer = Renderer::new(arena, &names);
        for &record_id in &plan.declaration_order {
            let record = records.get(record_id);
            if should_inline(record, inline_single_use) {
                continue; // only declared at its single use site, not top-level
            }
            let Some(name) = record_name(&names, record_id) else { continue };
            let init = renderer.render(record.node);
            uses_define_props |= init.contains("defineProps(");
            body_lines.push(format!("const {name} = {init};"));

            if let Some(proto_node) = record.prototype {
                let proto_src = renderer.render(proto_node);
                body_lines.push(format!("Object.setPrototypeOf({name}, {proto_src});"));
            }
            if let Some(tag) = &record.to_string_tag {
                body_lines.push(format!(
                    "Object.defineProperty({name}, Symbol.toStringTag, {{ value: {}, writable: false, enumerable: false, configurable: true }});",
                    render_string_literal(tag)
                ));
            }
            if record.frozen {
                body_lines.push(format!("Object.freeze({name});"));
            } else if record.sealed {
                body_lines.push(format!("Object.seal({name});"));
            } else if !record.extensible {
                body_lines.push(format!("Object.preventExtensions({name});"));
            }
        }

        // A record's own `.assignments` (circular back-edges the tracer
        // diverted away from a normal dependency) are unrelated to
        // `plan.deferred` (the scheduler's own cycle re-visits): a
        // back-edge never gets an `add_dep`, so the owning record is often
        // never revisited by `schedule`'s DFS at all and would never show
        // up in `deferred`. Every declared record's assignments still need
        // to be rendered regardless, so this walks the full declaration
        // order instead.
        for &record_id in &plan.declaration_order {
            for assignment_stmt in &records.get(record_id).assignments {
                let target_name = record_name(&names, assignment_stmt.target).unwrap_or_default();
                let key = describe_key(&assignment_stmt.key);
                let value = renderer.render(assignment_stmt.value);
                body_lines.push(format!("{target_name}{key} = {value};"));
            }
        }
    }

    body_lines.push(render_export_statement(format, records, output, &names));

    if uses_define_props {
        body_lines.insert(0, Helper::DefineProps.source().to_string());
    }

    let source = body_lines.join("\n");
    let sites = find_placeholder_sites(&source, &output.dependencies);
    let hash = content_hash(&source, &sites);

    EmittedOutput { output_id: output.id, source, content_hash: hash, placeholder_sites: sites }
}

fn should_inline(record: &livepack_trace::Record, inline_single_use: bool) -> bool {
    let has_side_state =
        record.prototype.is_some() || record.frozen || record.sealed || !record.extensible || record.to_string_tag.is_some();
    inline_single_use
        && record.dependents.len() == 1
        && !matches!(record.kind, livepack_trace::RecordKind::ImportProxy)
        && !has_side_state
}

fn record_name(names: &NameTransform, record: RecordId) -> Option<String> {
    names.existing_name(record).map(str::to_string)
}

/// Patches every `RecordRef`/`CircularPlaceholder` hole in the arena with
/// the resolved identifier node, so the renderer never has to special-case
/// them. Runs after names are assigned but before rendering.
///
/// A reference never sits at a record's own top-level `.node` except for a
/// factory's bare return value; every other one (an object's property
/// value, an array element, a call argument, an assignment's value) is a
/// `DepEdge`'s own `.node` slot, tracked precisely so this pass can find it
/// without re-walking the node tree.
fn resolve_record_refs(arena: &mut NodeArena, records: &RecordStore, order: &[RecordId], names: &NameTransform, inline_single_use: bool) {
    for &record_id in order {
        let record = records.get(record_id);
        patch_refs_in(arena, record.node, records, names, inline_single_use);
        if let Some(proto_node) = record.prototype {
            patch_refs_in(arena, proto_node, records, names, inline_single_use);
        }
        for edge in &record.deps {
            patch_refs_in(arena, edge.node, records, names, inline_single_use);
        }
        for assignment in &record.assignments {
            patch_refs_in(arena, assignment.value, records, names, inline_single_use);
        }
    }
}

fn patch_refs_in(arena: &mut NodeArena, node_id: livepack_ir::NodeId, records: &RecordStore, names: &NameTransform, inline_single_use: bool) {
    // Each hole is visited at the exact `NodeId` the tracer/splice pass
    // recorded for it (a record's own node, its prototype slot, a dep
    // edge's slot, or a deferred assignment's value), so a direct check
    // here is enough without recursing into the node tree.
    if let livepack_ir::Node::RecordRef(target) = *arena.get(node_id) {
        let target_record = records.get(target);
        if should_inline(target_record, inline_single_use) {
            arena.replace(node_id, arena.get(target_record.node).clone());
        } else if let Some(name) = record_name(names, target) {
            arena.replace(node_id, livepack_ir::Node::Ident(name));
        }
    }
}

fn describe_key(key: &livepack_trace::EdgeKey) -> String {
    match key {
        livepack_trace::EdgeKey::Property(name) => format!(".{name}"),
        livepack_trace::EdgeKey::Index(i) => format!("[{i}]"),
        livepack_trace::EdgeKey::Argument(i) => format!("/* arg {i} */"),
        livepack_trace::EdgeKey::Prototype => String::from(".__proto__"),
        livepack_trace::EdgeKey::Element(i) => format!("[{i}]"),
        livepack_trace::EdgeKey::MapEntry(i) => format!("/* entry {i} */"),
    }
}

fn render_export_statement(format: ExportFormat, records: &RecordStore, output: &Output, names: &NameTransform) -> String {
    let export_names: Vec<String> = output.exports.iter().filter_map(|&r| record_name(names, r)).collect();
    match format {
        ExportFormat::Cjs => {
            if export_names.len() == 1 {
                format!("module.exports = {};", export_names[0])
            } else {
                let pairs: Vec<String> = output
                    .exports
                    .iter()
                    .filter_map(|&r| record_name(names, r).map(|n| (records.get(r).name.clone(), n)))
                    .map(|(key, n)| format!("{key}: {n}"))
                    .collect();
                format!("module.exports = {{ {} }};", pairs.join(", "))
            }
        }
        ExportFormat::Esm => {
            if export_names.len() == 1 {
                format!("export default {};", export_names[0])
            } else {
                format!("export {{ {} }};", export_names.join(", "))
            }
        }
        ExportFormat::Expr => export_names.first().cloned().unwrap_or_else(|| "undefined".to_string()),
        ExportFormat::Exec => String::new(), // side-effecting only; nothing exported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_ir::Node;
    use livepack_split::OutputKind;
    use livepack_trace::RecordKind;

    #[test]
    fn single_export_cjs_produces_module_exports_assignment() {
        let mut arena = NodeArena::new();
        let mut records = RecordStore::new();
        let node = arena.alloc(Node::Number(42.0));
        let record = records.create(RecordKind::Primitive, "answer", node);

        let mut output = Output::new(OutputId(0), OutputKind::ENTRY, "main");
        output.exports.push(record);
        let mut assignment = FxHashMap::default();
        assignment.insert(record, OutputId(0));

        let emitted = emit_output(&mut arena, &records, &output, &assignment, ExportFormat::Cjs, MangleStrategy::Unmangled, Vec::new(), false);
        assert!(emitted.source.contains("const answer = 42;"));
        assert!(emitted.source.contains("module.exports = answer;"));
    }

    #[test]
    fn esm_export_uses_export_default() {
        let mut arena = NodeArena::new();
        let mut records = RecordStore::new();
        let node = arena.alloc(Node::Str("hi".to_string()));
        let record = records.create(RecordKind::Primitive, "greeting", node);

        let mut output = Output::new(OutputId(0), OutputKind::ENTRY, "main");
        output.exports.push(record);
        let mut assignment = FxHashMap::default();
        assignment.insert(record, OutputId(0));

        let emitted = emit_output(&mut arena, &records, &output, &assignment, ExportFormat::Esm, MangleStrategy::Unmangled, Vec::new(), false);
        assert!(emitted.source.contains("export default greeting;"));
    }
}
