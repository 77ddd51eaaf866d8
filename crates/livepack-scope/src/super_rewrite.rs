//! Rewrites `super.x` reads/writes inside a captured function body into the
//! `Reflect`-based form the renderer already knows how to print
//! (`Node::ReflectGetSuper`/`ReflectSetSuper`). A simplified polyfill: the
//! real owner of a `super` lookup is the function's `[[HomeObject]]`'s
//! prototype, which this crate doesn't carry through the traced value graph
//! separately from `this`, so `owner` is approximated as
//! `Object.getPrototypeOf(this)` — correct for an instance method's own
//! `super` access, wrong for a static method's (whose owner is the
//! superclass constructor, not an instance's prototype).

use livepack_ir::{Node, NodeArena, NodeId};

pub fn rewrite_super(arena: &mut NodeArena, root: NodeId) {
    walk(arena, root);
}

fn walk(arena: &mut NodeArena, id: NodeId) {
    let node = arena.get(id).clone();
    match node {
        Node::Member { object, property, .. } => {
            walk(arena, property);
            if matches!(arena.get(object), Node::Super) {
                let owner = arena.alloc(Node::This);
                let this = arena.alloc(Node::This);
                arena.replace(id, Node::ReflectGetSuper { owner, key: property, this });
            } else {
                walk(arena, object);
            }
        }
        Node::Assign { target, value } => {
            walk(arena, value);
            let target_node = arena.get(target).clone();
            if let Node::Member { object, property, .. } = target_node {
                if matches!(arena.get(object), Node::Super) {
                    let owner = arena.alloc(Node::This);
                    let this = arena.alloc(Node::This);
                    arena.replace(id, Node::ReflectSetSuper { owner, key: property, value, this });
                    return;
                }
            }
            walk(arena, target);
        }
        Node::Call { callee, args, .. } => {
            walk(arena, callee);
            for arg in args {
                walk(arena, arg);
            }
        }
        Node::New { callee, args } => {
            walk(arena, callee);
            for arg in args {
                walk(arena, arg);
            }
        }
        Node::Sequence(items) => {
            for item in items {
                walk(arena, item);
            }
        }
        Node::Conditional { test, consequent, alternate } => {
            walk(arena, test);
            walk(arena, consequent);
            walk(arena, alternate);
        }
        Node::Binary { left, right, .. } | Node::Logical { left, right, .. } => {
            walk(arena, left);
            walk(arena, right);
        }
        Node::Unary { argument, .. } => walk(arena, argument),
        Node::Spread(inner) => walk(arena, inner),
        Node::ArrayExpr(items) => {
            for item in items.into_iter().flatten() {
                walk(arena, item);
            }
        }
        Node::ObjectExpr(props) => {
            for prop in props {
                walk(arena, prop.key);
                walk(arena, prop.value);
                if let Some(setter) = prop.setter {
                    walk(arena, setter);
                }
            }
        }
        Node::VarDecl { init: Some(init), .. } => walk(arena, init),
        Node::ExprStmt(inner) => walk(arena, inner),
        Node::Return(Some(inner)) => walk(arena, inner),
        Node::Block(stmts) => {
            for stmt in stmts {
                walk(arena, stmt);
            }
        }
        _ => {}
    }
}
