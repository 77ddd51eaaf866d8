//! Livepack: serializes live JS values and closures into standalone,
//! re-runnable JS source.
//!
//! This crate is the facade wiring the pipeline together: tracer →
//! function/scope analyzer → splitter → output scheduler/emitter. See
//! `Serializer::serialize` for the entry point and the §6 input contract
//! types (`BlockSpec`, `FrameSpec`, `SplitPointInput`) for what the caller
//! (the instrumenter/driver, out of scope) must supply.

pub mod config;

pub use config::{render_chunk_name, Comments, SerializeOptions, SourceMaps};

use livepack_common::{
    BlockId, FrameId, LivepackError, OutputStats, OutputStatsKind, RecordId, Result, Stats,
};
use livepack_ir::NodeArena;
use livepack_scope::{Block, BlockParam, NameMangler, ScopeFrame, ScopeStore};
use livepack_split::{Output, OutputKind, SplitPointSpec};
use livepack_trace::{FunctionMetaLookup, HostValue, RecordStore, Tracer};
use rustc_hash::FxHashMap;
use tracing::{info, warn};

/// One lexical block, as supplied by the instrumenter (§6: block table
/// `{params, children, contains_eval}`). `params` pairs each captured name
/// with whether it's frozen (reachable via `eval`/`with`, per step 6).
pub struct BlockSpec {
    pub id: BlockId,
    pub parent: Option<BlockId>,
    pub params: Vec<(String, bool)>,
    pub contains_eval: bool,
}

/// One scope-frame activation (§6: frame table `{block_id,
/// parent_frame_id, values_by_name}`). Captured values are host values, not
/// yet records; the serializer traces them as part of building the
/// `ScopeStore`.
pub struct FrameSpec {
    pub id: FrameId,
    pub block_id: BlockId,
    pub parent_frame_id: Option<FrameId>,
    pub values_by_name: Vec<(String, HostValue)>,
}

/// A user-declared `split`/`splitAsync` target.
pub struct SplitPointInput {
    pub root_value: HostValue,
    pub name: Option<String>,
    pub is_async: bool,
}

pub struct EmittedFile {
    pub filename: String,
    pub source: String,
}

pub struct SerializeResult {
    pub files: Vec<EmittedFile>,
    pub stats: Option<Stats>,
}

pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    #[must_use]
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// Runs the full pipeline for one root value. `function_meta` lets the
    /// tracer stamp traced function records with their captured strictness
    /// and scope back-reference (§6).
    pub fn serialize(
        &self,
        root: &HostValue,
        function_meta: &impl FunctionMetaLookup,
        blocks: Vec<BlockSpec>,
        frames: Vec<FrameSpec>,
        split_points: Vec<SplitPointInput>,
    ) -> Result<SerializeResult> {
        let mut records = RecordStore::new();
        let mut arena = NodeArena::new();

        let entry_id = {
            let mut tracer = Tracer::new(&mut records, &mut arena, function_meta);
            let entry_id = tracer.trace(root)?;
            for sp in &split_points {
                tracer.trace(&sp.root_value)?;
            }
            for frame in &frames {
                for (_, value) in &frame.values_by_name {
                    tracer.trace(value)?;
                }
            }
            entry_id
        };

        let mut scope_store = build_scope_store(&records, blocks, frames)?;
        livepack_scope::analyze(&mut scope_store, &records, |_record| false)?;

        // Every function/class record's node is still a `CircularPlaceholder`
        // at this point (§4.1 defers closure reconstruction until the whole
        // block/frame graph is known); splice each one into a call against
        // its block's scope factory now that it is.
        let frozen_names: Vec<String> = scope_store
            .blocks()
            .iter()
            .flat_map(|block| block.params.iter().filter(|p| p.is_frozen_name).map(|p| p.name.clone()))
            .collect();
        let mut mangler = NameMangler::new(self.options.mangle_strategy(), frozen_names, Vec::new());
        livepack_scope::splice_closures(&mut arena, &scope_store, &mut records, function_meta, &mut mangler);

        let split_specs: Result<Vec<SplitPointSpec>> = split_points
            .iter()
            .map(|sp| {
                let root = resolve_traced_root(&records, &sp.root_value)
                    .ok_or_else(|| LivepackError::UnreconstructibleValue {
                        path: livepack_common::RecordPath::root(),
                        description: "split point value was not traced".into(),
                    })?;
                Ok(SplitPointSpec { root, name: sp.name.clone(), is_async: sp.is_async })
            })
            .collect();
        let split_specs = split_specs?;

        let (outputs, assignment) = livepack_split::partition(&records, entry_id, &split_specs);

        let mut emitted: FxHashMap<livepack_common::OutputId, livepack_emit::EmittedOutput> = FxHashMap::default();
        for output in &outputs {
            let result = livepack_emit::emit_output(
                &mut arena,
                &records,
                output,
                &assignment,
                self.options.format,
                self.options.mangle_strategy(),
                Vec::<String>::new(),
                self.options.inline,
            );
            emitted.insert(output.id, result);
        }

        let content_hashes: FxHashMap<livepack_common::OutputId, String> =
            emitted.iter().map(|(&id, e)| (id, e.content_hash.clone())).collect();

        let mut files = Vec::with_capacity(outputs.len());
        let mut used_filenames: FxHashMap<String, livepack_common::OutputId> = FxHashMap::default();
        let mut stats_outputs = Vec::with_capacity(outputs.len());

        for output in &outputs {
            let emitted_output = emitted.get(&output.id).expect("every output was emitted");
            let others: Vec<(livepack_common::OutputId, String)> = output
                .dependencies
                .iter()
                .filter_map(|dep| content_hashes.get(dep).map(|h| (*dep, h.clone())))
                .collect();
            let final_hash = livepack_emit::final_filename_hash(&emitted_output.content_hash, &others);
            let spliced = livepack_emit::splice_placeholders(&emitted_output.source, &emitted_output.placeholder_sites, &content_hashes_as_final(&content_hashes, &outputs, &final_hash, output.id));

            let template = chunk_template(&self.options, output.kind);
            let filename = render_chunk_name(template, &output.name, &final_hash);

            if let Some(&existing) = used_filenames.get(&filename) {
                if !template.contains("[hash]") {
                    return Err(LivepackError::HashCollision { filename });
                }
                warn!(filename, other = existing.0, "chunk name template produced a collision despite [hash]");
            }
            used_filenames.insert(filename.clone(), output.id);

            stats_outputs.push(OutputStats { kind: stats_kind(output.kind), name: output.name.clone(), filename: filename.clone() });
            files.push(EmittedFile { filename, source: spliced });
        }

        info!(outputs = files.len(), "serialization complete");

        let stats = self.options.stats.then(|| Stats { outputs: stats_outputs });
        Ok(SerializeResult { files, stats })
    }
}

/// The placeholder-splice protocol (§4.4 step 4) wants each output's own
/// *final* hash substituted wherever another output referenced it; since
/// every output computes its own final hash independently in the loop
/// above, this rebuilds the map the splice step needs from whichever
/// outputs have already been finalized plus the one just computed.
fn content_hashes_as_final(
    content_hashes: &FxHashMap<livepack_common::OutputId, String>,
    outputs: &[Output],
    this_output_final_hash: &str,
    this_output_id: livepack_common::OutputId,
) -> FxHashMap<livepack_common::OutputId, String> {
    let mut map = FxHashMap::default();
    for output in outputs {
        if output.id == this_output_id {
            map.insert(output.id, this_output_final_hash.to_string());
        } else if let Some(hash) = content_hashes.get(&output.id) {
            map.insert(output.id, hash.clone());
        }
    }
    map
}

fn chunk_template(options: &SerializeOptions, kind: OutputKind) -> &str {
    if kind.contains(OutputKind::ENTRY) {
        &options.entry_chunk_name
    } else if kind.is_common() {
        &options.common_chunk_name
    } else {
        &options.split_chunk_name
    }
}

fn stats_kind(kind: OutputKind) -> OutputStatsKind {
    if kind.contains(OutputKind::ENTRY) {
        OutputStatsKind::Entry
    } else if kind == OutputKind::COMMON {
        OutputStatsKind::Common
    } else if kind == OutputKind::COMMON_SPLIT {
        OutputStatsKind::CommonSplit
    } else if kind.contains(OutputKind::ASYNC_SPLIT) {
        OutputStatsKind::AsyncSplit
    } else {
        OutputStatsKind::SyncSplit
    }
}

fn resolve_traced_root(records: &RecordStore, value: &HostValue) -> Option<RecordId> {
    match value {
        HostValue::Primitive(p) => records.lookup_primitive(p),
        HostValue::Object(_) => value.object_identity().and_then(|identity| records.lookup_object(identity)),
    }
}

fn build_scope_store(records: &RecordStore, blocks: Vec<BlockSpec>, frames: Vec<FrameSpec>) -> Result<ScopeStore> {
    let mut store = ScopeStore::new();

    for spec in blocks {
        let mut block = Block::new(spec.id, spec.parent);
        block.contains_eval = spec.contains_eval;
        block.params = spec.params.into_iter().map(|(name, is_frozen)| BlockParam::new(name, is_frozen)).collect();
        store.add_block(block);
    }

    for spec in frames {
        let mut frame = ScopeFrame::new(spec.id, spec.block_id, spec.parent_frame_id);
        for (name, value) in &spec.values_by_name {
            let record_id = resolve_traced_root(records, value).ok_or_else(|| LivepackError::UnreconstructibleValue {
                path: livepack_common::RecordPath::root().child(livepack_common::RecordPathSegment::ScopeParam(name.clone())),
                description: "captured scope value was not traced".into(),
            })?;
            frame.bind(name.clone(), record_id);
        }
        store.add_frame(frame);
    }

    attach_functions_to_blocks(&mut store, records);
    Ok(store)
}

/// Every traced function/class record carries its owning scope frame
/// (stamped by the tracer from the function-metadata table); this derives
/// each block's `functions` list from that back-reference instead of
/// requiring the caller to supply it redundantly.
fn attach_functions_to_blocks(store: &mut ScopeStore, records: &RecordStore) {
    for record in records.iter() {
        if !matches!(record.kind, livepack_trace::RecordKind::Function | livepack_trace::RecordKind::Class) {
            continue;
        }
        let Some(frame_id) = record.scope_frame else { continue };
        let block_id = store.frame(frame_id).block;
        store.block_mut(block_id).functions.push(record.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_common::Primitive;
    use rustc_hash::FxHashMap as Map;

    #[test]
    fn serializes_a_bare_primitive_with_no_scope_or_splits() {
        let root = HostValue::Primitive(Primitive::Number(42.0));
        let meta: Map<u32, livepack_trace::FunctionMeta> = Map::default();
        let serializer = Serializer::new(SerializeOptions::default());
        let result = serializer.serialize(&root, &meta, Vec::new(), Vec::new(), Vec::new()).expect("serialize succeeds");
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].source.contains("42"));
    }

    #[test]
    fn stats_report_lists_every_output_when_enabled() {
        let root = HostValue::Primitive(Primitive::String("hi".to_string()));
        let meta: Map<u32, livepack_trace::FunctionMeta> = Map::default();
        let mut options = SerializeOptions::default();
        options.stats = true;
        let serializer = Serializer::new(options);
        let result = serializer.serialize(&root, &meta, Vec::new(), Vec::new(), Vec::new()).expect("serialize succeeds");
        let stats = result.stats.expect("stats requested");
        assert_eq!(stats.outputs.len(), 1);
        assert_eq!(stats.outputs[0].kind, OutputStatsKind::Entry);
    }
}
