//! The emitted-JS AST: the node set used to build each record's `node`
//! fragment, and the arena that owns them.
//!
//! Per the "dynamic-language idioms to replace" design note, nodes are never
//! mutated in place via ad-hoc property writes; rewrites go through indexed
//! edges (`NodeId`) into an owning arena, the same way records own their
//! `node` and edges locate insertion points within it.

pub mod arena;
pub mod node;

pub use arena::NodeArena;
pub use node::{ClassMember, ClassMemberKind, Node, NodeId, ObjectProp, ObjectPropKind, Param, VarKind};
