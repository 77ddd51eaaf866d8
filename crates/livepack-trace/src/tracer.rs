//! The tracer: walks the live graph, builds records, classifies them, and
//! registers dependency edges (§4.1).

use crate::classify::record_kind_of;
use crate::contract::FunctionMetaLookup;
use crate::record::{Assignment, EdgeKey, RecordKind, Strictness};
use crate::store::RecordStore;
use crate::value::{HostObject, HostValue, ObjectKind, PropKey, PropValue};
use livepack_common::{DescriptorBitmap, LivepackError, Primitive, RecordId, RecordPath, RecordPathSegment, Result};
use livepack_ir::node::{Node, ObjectProp, ObjectPropKind};
use livepack_ir::{NodeArena, NodeId};
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace, warn};

pub struct Tracer<'a, M: FunctionMetaLookup> {
    store: &'a mut RecordStore,
    arena: &'a mut NodeArena,
    meta: &'a M,
    /// Object identities currently being traced (on the DFS stack). A
    /// dependency edge whose target is in this set is a true structural
    /// cycle and is diverted into a deferred `Assignment` instead of an
    /// inline `RecordRef`.
    in_progress: FxHashSet<usize>,
}

impl<'a, M: FunctionMetaLookup> Tracer<'a, M> {
    pub fn new(store: &'a mut RecordStore, arena: &'a mut NodeArena, meta: &'a M) -> Self {
        Self { store, arena, meta, in_progress: FxHashSet::default() }
    }

    /// Trace `root` and everything reachable from it, returning the root's
    /// record id.
    pub fn trace(&mut self, root: &HostValue) -> Result<RecordId> {
        self.trace_value(root, &RecordPath::root())
    }

    fn trace_value(&mut self, value: &HostValue, path: &RecordPath) -> Result<RecordId> {
        match value {
            HostValue::Primitive(p) => Ok(self.trace_primitive(p)),
            HostValue::Object(obj) => self.trace_object(obj, path),
        }
    }

    fn trace_primitive(&mut self, p: &Primitive) -> RecordId {
        if let Some(id) = self.store.lookup_primitive(p) {
            trace!(?p, "reusing existing primitive record");
            return id;
        }
        let node = literal_node(p);
        let node_id = self.arena.alloc(node);
        let id = self.store.create(RecordKind::Primitive, primitive_name_hint(p), node_id);
        self.store.register_primitive(p.clone(), id);
        id
    }

    fn trace_object(&mut self, obj: &Rc<RefCell<HostObject>>, path: &RecordPath) -> Result<RecordId> {
        let identity = Rc::as_ptr(obj) as usize;

        if let Some(id) = self.store.lookup_object(identity) {
            if self.in_progress.contains(&identity) {
                // True structural cycle: can't express inline. The caller
                // (trace_container/trace_function) is responsible for
                // diverting its own edge into an Assignment instead of
                // calling this successfully-returned id as a normal dep.
                self.store.get_mut(id).is_circular = true;
            }
            return Ok(id);
        }

        let kind = obj.borrow().kind;
        let record_kind = record_kind_of(kind).ok_or_else(|| LivepackError::UnreconstructibleValue {
            path: path.clone(),
            description: "value has no reconstructible form (host-only native)".into(),
        })?;

        if matches!(kind, ObjectKind::BuiltinModule) {
            let name = obj.borrow().global_name.clone().unwrap_or_default();
            return Err(LivepackError::UnsupportedGlobal { path: path.clone(), name });
        }

        // Placeholder node, allocated before recursing so self-references
        // resolve to this record id (identity lookup before creation).
        let placeholder = self.arena.alloc(Node::CircularPlaceholder);
        let name_hint = obj.borrow().name_hint.clone().unwrap_or_else(|| default_name_hint(record_kind).to_string());
        let id = self.store.create(record_kind, name_hint, placeholder);
        self.store.register_object(identity, id);
        self.in_progress.insert(identity);

        if let Some(function_id) = obj.borrow().function_id {
            self.store.get_mut(id).function_id = Some(function_id);
            if let Some(meta) = self.meta.lookup(function_id) {
                let rec = self.store.get_mut(id);
                rec.scope_frame = Some(meta.frame_id);
                rec.strictness = meta.strictness;
            } else {
                warn!(function_id, "no function metadata for traced function; strictness indeterminate");
                self.store.get_mut(id).strictness = Strictness::Indeterminate;
            }
        }

        let node = self.build_container_node(id, obj, path)?;
        self.arena.replace(placeholder, node);

        self.in_progress.remove(&identity);
        debug!(id = id.0, kind = ?record_kind, "traced value");
        Ok(id)
    }

    fn build_container_node(
        &mut self,
        owner: RecordId,
        obj: &Rc<RefCell<HostObject>>,
        path: &RecordPath,
    ) -> Result<Node> {
        let kind = obj.borrow().kind;

        // Prototype, if overridden: tracked as an edge like any other
        // property (captured in §4.1 "every observable attribute that
        // differs from the kind's default"), but kept on the record itself
        // rather than folded into the literal, so the emitter can always
        // splice an `Object.setPrototypeOf` statement regardless of whether
        // the target is a plain value, a circular back-edge, or a record
        // that gets inlined at its use site.
        let prototype = obj.borrow().prototype.clone();
        if let Some(proto) = prototype {
            let slot = self.arena.alloc(Node::CircularPlaceholder);
            let resolved = self.link_or_defer(owner, &proto, slot, EdgeKey::Prototype, path)?;
            self.store.get_mut(owner).prototype = Some(resolved);
        }

        {
            let captured = obj.borrow();
            let rec = self.store.get_mut(owner);
            rec.frozen = captured.frozen;
            rec.sealed = captured.sealed;
            rec.extensible = captured.extensible;
            rec.to_string_tag = captured.to_string_tag.clone();
        }

        match kind {
            ObjectKind::Function | ObjectKind::Class => {
                // Resolved later, once the full block/frame graph is known,
                // by the scope-factory splice pass (`livepack_scope::splice_closures`):
                // this placeholder becomes a call against the block's shared
                // factory. A function with no scope frame (no instrumenter
                // metadata) is left unresolved rather than rendered as a
                // plain property bag.
                if self.store.get(owner).scope_frame.is_none() {
                    warn!(id = owner.0, "function/class record has no scope frame; closure left unresolved");
                }
                Ok(Node::CircularPlaceholder)
            }
            ObjectKind::Array => {
                let elements = obj.borrow().elements.clone();
                let mut out = Vec::with_capacity(elements.len());
                for (i, el) in elements.into_iter().enumerate() {
                    match el {
                        None => out.push(None), // sparse hole, preserved
                        Some(v) => {
                            let child_path = path.child(RecordPathSegment::Index(i as u32));
                            let slot = self.arena.alloc(Node::CircularPlaceholder);
                            let resolved = self.link_or_defer(owner, &v, slot, EdgeKey::Element(i as u32), &child_path)?;
                            out.push(Some(resolved));
                        }
                    }
                }
                Ok(Node::ArrayExpr(out))
            }
            ObjectKind::TypedBuffer => {
                let elements = obj.borrow().elements.clone();
                let ctor = typed_array_ctor(obj.borrow().name_hint.as_deref());

                // A typed array has no holes (every slot is always backed by
                // storage), so an all-zero buffer round-trips exactly via
                // the ctor-with-length form; anything else needs the values
                // spelled out.
                let all_zero = elements.iter().all(|el| match el {
                    None => true,
                    Some(HostValue::Primitive(Primitive::Number(n))) => *n == 0.0,
                    _ => false,
                });

                if all_zero {
                    Ok(Node::TypedArrayWithLength { ctor, length: elements.len() as u32 })
                } else {
                    let mut values = Vec::with_capacity(elements.len());
                    for (i, el) in elements.into_iter().enumerate() {
                        let v = el.unwrap_or(HostValue::Primitive(Primitive::Number(0.0)));
                        let child_path = path.child(RecordPathSegment::Index(i as u32));
                        let slot = self.arena.alloc(Node::CircularPlaceholder);
                        let resolved = self.link_or_defer(owner, &v, slot, EdgeKey::Element(i as u32), &child_path)?;
                        values.push(resolved);
                    }
                    Ok(Node::TypedArrayFromValues { ctor, values })
                }
            }
            ObjectKind::Map | ObjectKind::Set => {
                let entries = obj.borrow().entries.clone();
                let mut values = Vec::with_capacity(entries.len() * 2);
                for (i, (k, v)) in entries.into_iter().enumerate() {
                    let kpath = path.child(RecordPathSegment::Index(i as u32));
                    let kslot = self.arena.alloc(Node::CircularPlaceholder);
                    values.push(self.link_or_defer(owner, &k, kslot, EdgeKey::MapEntry(i as u32 * 2), &kpath)?);
                    if let Some(v) = v {
                        let vslot = self.arena.alloc(Node::CircularPlaceholder);
                        values.push(self.link_or_defer(owner, &v, vslot, EdgeKey::MapEntry(i as u32 * 2 + 1), &kpath)?);
                    }
                }
                Ok(Node::ArrayExpr(values.into_iter().map(Some).collect()))
            }
            _ => {
                let props = ordered_props(&obj.borrow().props);
                let mut plain = Vec::with_capacity(props.len());
                let mut special: Vec<SpecialProp> = Vec::new();

                for prop in props {
                    let (key_text, edge_key) = match &prop.key {
                        PropKey::Index(i) => (i.to_string(), EdgeKey::Index(*i)),
                        PropKey::Str(s) => (s.clone(), EdgeKey::Property(s.clone())),
                        PropKey::Symbol(s) => (format!("@@sym{s}"), EdgeKey::Property(format!("@@sym{s}"))),
                    };
                    // A property literally named `__proto__` is prototype-mutation
                    // shorthand in a non-computed object-literal key position, not
                    // a data property, so it always needs `defineProps` to define
                    // it as an own key instead.
                    let is_literal_proto_key = key_text == "__proto__";
                    let needs_defineprops = prop.bitmap != DescriptorBitmap::default_data() || is_literal_proto_key;

                    let child_path = path.child(RecordPathSegment::Property(key_text.clone()));
                    let key_node = self.arena.alloc(Node::Str(key_text.clone()));
                    let computed = matches!(prop.key, PropKey::Symbol(_));

                    let (prop_kind, value_node, setter_node) = match &prop.value {
                        PropValue::Data(v) => {
                            let slot = self.arena.alloc(Node::CircularPlaceholder);
                            let resolved = self.link_or_defer(owner, v, slot, edge_key, &child_path)?;
                            (ObjectPropKind::Value, resolved, None)
                        }
                        PropValue::Accessor { getter, setter } => match (getter, setter) {
                            (Some(g), Some(s)) => {
                                let gslot = self.arena.alloc(Node::CircularPlaceholder);
                                let gid = self.link_or_defer(owner, g, gslot, edge_key.clone(), &child_path)?;
                                let sslot = self.arena.alloc(Node::CircularPlaceholder);
                                let sid = self.link_or_defer(owner, s, sslot, edge_key, &child_path)?;
                                (ObjectPropKind::GetterSetter, gid, Some(sid))
                            }
                            (Some(g), None) => {
                                let gslot = self.arena.alloc(Node::CircularPlaceholder);
                                let gid = self.link_or_defer(owner, g, gslot, edge_key, &child_path)?;
                                (ObjectPropKind::Getter, gid, None)
                            }
                            (None, Some(s)) => {
                                let sslot = self.arena.alloc(Node::CircularPlaceholder);
                                let sid = self.link_or_defer(owner, s, sslot, edge_key, &child_path)?;
                                (ObjectPropKind::Setter, sid, None)
                            }
                            (None, None) => (ObjectPropKind::Value, self.arena.alloc(Node::Undefined), None),
                        },
                    };

                    if needs_defineprops {
                        let mut bitmap = prop.bitmap;
                        if is_literal_proto_key {
                            bitmap |= DescriptorBitmap::LITERAL_PROTO;
                        }
                        special.push(SpecialProp {
                            key_node,
                            is_literal_proto_key,
                            kind: prop_kind,
                            value: value_node,
                            setter: setter_node,
                            bitmap,
                        });
                    } else {
                        plain.push(ObjectProp {
                            key: key_node,
                            computed,
                            kind: prop_kind,
                            value: value_node,
                            setter: setter_node,
                            bitmap: prop.bitmap,
                        });
                    }
                }

                let base = Node::ObjectExpr(plain);
                if special.is_empty() {
                    Ok(base)
                } else {
                    let base_id = self.arena.alloc(base);
                    Ok(self.build_define_props_call(base_id, special))
                }
            }
        }
    }

    /// Wraps `base` (the plain-property object literal) in a `defineProps`
    /// call carrying one spec entry per non-default-descriptor or
    /// literally-`__proto__`-named property (§6's `[value, bitmap]` /
    /// `[getter, setter, bitmap]` encoding, decoded by the `defineProps`
    /// runtime helper emitted alongside the output).
    fn build_define_props_call(&mut self, base_id: NodeId, special: Vec<SpecialProp>) -> Node {
        let mut spec_props = Vec::with_capacity(special.len());
        for prop in special {
            let bitmap_node = self.arena.alloc(Node::Number(f64::from(prop.bitmap.bits())));
            let spec_value = match prop.kind {
                ObjectPropKind::Value => self.arena.alloc(Node::ArrayExpr(vec![Some(prop.value), Some(bitmap_node)])),
                ObjectPropKind::Getter => {
                    let undef = self.arena.alloc(Node::Undefined);
                    self.arena.alloc(Node::ArrayExpr(vec![Some(prop.value), Some(undef), Some(bitmap_node)]))
                }
                ObjectPropKind::Setter => {
                    let undef = self.arena.alloc(Node::Undefined);
                    self.arena.alloc(Node::ArrayExpr(vec![Some(undef), Some(prop.value), Some(bitmap_node)]))
                }
                ObjectPropKind::GetterSetter => {
                    let setter = prop.setter.unwrap_or_else(|| self.arena.alloc(Node::Undefined));
                    self.arena.alloc(Node::ArrayExpr(vec![Some(prop.value), Some(setter), Some(bitmap_node)]))
                }
            };
            // The spec map is itself an object literal; a literally-`__proto__`
            // entry there would trip the exact same prototype-mutation magic
            // `defineProps` exists to avoid, so its key is computed too.
            spec_props.push(ObjectProp {
                key: prop.key_node,
                computed: prop.is_literal_proto_key,
                kind: ObjectPropKind::Value,
                value: spec_value,
                setter: None,
                bitmap: DescriptorBitmap::default_data(),
            });
        }
        let spec_map = self.arena.alloc(Node::ObjectExpr(spec_props));
        let callee = self.arena.alloc(Node::Ident("defineProps".to_string()));
        let undefined_proto = self.arena.alloc(Node::Undefined);
        Node::Call { callee, args: vec![base_id, spec_map, undefined_proto], optional: false }
    }

    /// Resolve a child value into `slot`: either a normal `RecordRef` edge,
    /// or, if `child` is a structural ancestor of `owner`, a deferred
    /// `Assignment` (the slot is left `Undefined` in the inline literal).
    fn link_or_defer(
        &mut self,
        owner: RecordId,
        child: &HostValue,
        slot: NodeId,
        key: EdgeKey,
        path: &RecordPath,
    ) -> Result<NodeId> {
        let is_back_edge = child.object_identity().is_some_and(|identity| self.in_progress.contains(&identity));
        let target = self.trace_value(child, path)?;

        if is_back_edge {
            self.store.get_mut(target).is_circular = true;
            self.arena.replace(slot, Node::Undefined);
            let value_ref = self.arena.alloc(Node::RecordRef(target));
            self.store.get_mut(owner).assignments.push(Assignment { target: owner, key, value: value_ref });
        } else {
            self.arena.replace(slot, Node::RecordRef(target));
            self.store.add_dep(owner, target, slot, key);
        }
        Ok(slot)
    }
}

/// A property awaiting `defineProps` (non-default descriptor flags, or a
/// literal `__proto__` key) instead of a plain object-literal entry.
struct SpecialProp {
    key_node: NodeId,
    is_literal_proto_key: bool,
    kind: ObjectPropKind,
    value: NodeId,
    setter: Option<NodeId>,
    bitmap: DescriptorBitmap,
}

fn ordered_props(props: &[crate::value::HostProp]) -> Vec<crate::value::HostProp> {
    // Integer-keyed slots in numeric order, then string keys in their own
    // enumeration (insertion) order, then symbol keys in insertion order.
    let mut indices: Vec<_> = props.iter().filter(|p| matches!(p.key, PropKey::Index(_))).cloned().collect();
    indices.sort_by_key(|p| match p.key {
        PropKey::Index(i) => i,
        _ => unreachable!(),
    });
    let strings: Vec<_> = props.iter().filter(|p| matches!(p.key, PropKey::Str(_))).cloned().collect();
    let symbols: Vec<_> = props.iter().filter(|p| matches!(p.key, PropKey::Symbol(_))).cloned().collect();
    indices.into_iter().chain(strings).chain(symbols).collect()
}

fn literal_node(p: &Primitive) -> Node {
    match p {
        Primitive::Undefined => Node::Undefined,
        Primitive::Null => Node::Null,
        Primitive::Bool(b) => Node::Bool(*b),
        Primitive::Number(n) => {
            if n.is_nan() {
                Node::NaN
            } else if *n == 0.0 && n.is_sign_negative() {
                Node::NegativeZero
            } else if n.is_infinite() {
                Node::Infinity { negative: *n < 0.0 }
            } else {
                Node::Number(*n)
            }
        }
        Primitive::String(s) => Node::Str(s.clone()),
        Primitive::BigInt(s) => Node::BigInt(s.clone()),
        Primitive::Symbol { description, .. } => Node::SymbolCall { description: description.clone() },
    }
}

fn primitive_name_hint(p: &Primitive) -> &'static str {
    match p {
        Primitive::Undefined => "undefined",
        Primitive::Null => "null",
        Primitive::Bool(_) => "bool",
        Primitive::Number(_) => "number",
        Primitive::String(_) => "str",
        Primitive::BigInt(_) => "bigint",
        Primitive::Symbol { .. } => "symbol",
    }
}

fn default_name_hint(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Primitive => "value",
        RecordKind::PlainObject => "obj",
        RecordKind::Array => "arr",
        RecordKind::Function => "fn",
        RecordKind::Class => "cls",
        RecordKind::Regex => "regex",
        RecordKind::Date => "date",
        RecordKind::MapOrSet => "collection",
        RecordKind::TypedBuffer => "buffer",
        RecordKind::BoxedPrimitive => "boxed",
        RecordKind::Promise => "ns",
        RecordKind::Global => "global",
        RecordKind::BuiltinModule => "module",
        RecordKind::ImportProxy => "imported",
    }
}

/// Maps a `TypedBuffer`'s `name_hint` (the instrumenter's concrete
/// constructor name) to the `&'static str` the renderer needs for
/// `TypedArrayWithLength`/`TypedArrayFromValues`; an unrecognized or absent
/// hint falls back to the plainest typed array, `Uint8Array`.
fn typed_array_ctor(name_hint: Option<&str>) -> &'static str {
    match name_hint {
        Some("Int8Array") => "Int8Array",
        Some("Uint8Array") => "Uint8Array",
        Some("Uint8ClampedArray") => "Uint8ClampedArray",
        Some("Int16Array") => "Int16Array",
        Some("Uint16Array") => "Uint16Array",
        Some("Int32Array") => "Int32Array",
        Some("Uint32Array") => "Uint32Array",
        Some("Float32Array") => "Float32Array",
        Some("Float64Array") => "Float64Array",
        Some("BigInt64Array") => "BigInt64Array",
        Some("BigUint64Array") => "BigUint64Array",
        _ => "Uint8Array",
    }
}
