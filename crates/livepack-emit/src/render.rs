//! Minimal source-text rendering for a `livepack-ir` node tree.
//!
//! Not a general pretty-printer: the node set (see `livepack_ir::node`) is
//! already restricted to exactly what the emitter produces, so rendering is
//! a direct, mostly context-free walk. `RecordRef`/`CircularPlaceholder`
//! must already be resolved to `Ident` by the scheduler/injector passes
//! before a node reaches here; encountering either is a bug upstream.

use crate::name_transform::NameTransform;
use livepack_common::RecordId;
use livepack_ir::{Node, NodeArena, NodeId, ObjectPropKind, VarKind};

pub struct Renderer<'a> {
    arena: &'a NodeArena,
    names: &'a NameTransform,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub fn new(arena: &'a NodeArena, names: &'a NameTransform) -> Self {
        Self { arena, names }
    }

    #[must_use]
    pub fn render(&mut self, id: NodeId) -> String {
        match self.arena.get(id) {
            Node::RecordRef(record) => self.render_record_ref(*record),
            Node::CircularPlaceholder => "undefined /* unresolved circular placeholder */".to_string(),
            Node::Undefined => "undefined".to_string(),
            Node::Null => "null".to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Number(n) => render_number(*n),
            Node::NegativeZero => "-0".to_string(),
            Node::NaN => "NaN".to_string(),
            Node::Infinity { negative } => if *negative { "-Infinity" } else { "Infinity" }.to_string(),
            Node::Str(s) => render_string_literal(s),
            Node::BigInt(digits) => format!("{digits}n"),
            Node::Regex { source, flags } => format!("new RegExp({}, {})", render_string_literal(source), render_string_literal(flags)),
            Node::Ident(name) => name.clone(),
            Node::This => "this".to_string(),
            Node::Super => "super".to_string(),
            Node::SymbolCall { description } => match description {
                Some(d) => format!("Symbol({})", render_string_literal(d)),
                None => "Symbol()".to_string(),
            },
            Node::ArrayExpr(items) => self.render_array(items),
            Node::ObjectExpr(props) => self.render_object(props),
            Node::TypedArrayWithLength { ctor, length } => format!("new {ctor}({length})"),
            Node::TypedArrayFromValues { ctor, values } => {
                let items: Vec<String> = values.iter().map(|&v| self.render(v)).collect();
                format!("new {ctor}([{}])", items.join(", "))
            }
            Node::Member { object, property, computed, optional } => self.render_member(*object, *property, *computed, *optional),
            Node::Call { callee, args, optional } => self.render_call(*callee, args, *optional),
            Node::New { callee, args } => {
                let callee_src = self.render(*callee);
                let args_src: Vec<String> = args.iter().map(|&a| self.render(a)).collect();
                format!("new {callee_src}({})", args_src.join(", "))
            }
            Node::Assign { target, value } => format!("{} = {}", self.render(*target), self.render(*value)),
            Node::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(|&i| self.render(i)).collect();
                format!("({})", parts.join(", "))
            }
            Node::Conditional { test, consequent, alternate } => {
                format!("{} ? {} : {}", self.render(*test), self.render(*consequent), self.render(*alternate))
            }
            Node::Binary { op, left, right } => format!("({} {op} {})", self.render(*left), self.render(*right)),
            Node::Logical { op, left, right } => format!("({} {op} {})", self.render(*left), self.render(*right)),
            Node::Unary { op, argument } => format!("{op}{}", self.render(*argument)),
            Node::Spread(arg) => format!("...{}", self.render(*arg)),
            Node::ReflectGetSuper { owner, key, this } => {
                format!(
                    "Reflect.get(Object.getPrototypeOf({}), {}, {})",
                    self.render(*owner),
                    self.render(*key),
                    self.render(*this)
                )
            }
            Node::ReflectSetSuper { owner, key, value, this } => {
                format!(
                    "Reflect.set(Object.getPrototypeOf({}), {}, {}, {})",
                    self.render(*owner),
                    self.render(*key),
                    self.render(*value),
                    self.render(*this)
                )
            }
            Node::ArrowFunction { params, body, expr_body, is_async, use_strict_directive } => {
                self.render_arrow(params, body, *expr_body, *is_async, *use_strict_directive)
            }
            Node::FunctionExpr { name, params, body, is_async, is_generator, use_strict_directive } => {
                self.render_function(name.as_deref(), params, body, *is_async, *is_generator, *use_strict_directive)
            }
            Node::ApplyWrapper { function, this_arg, args_arg } => {
                format!("({}).apply({}, {})", self.render(*function), self.render(*this_arg), self.render(*args_arg))
            }
            Node::ClassExpr { name, superclass, members } => self.render_class(name.as_deref(), *superclass, members),
            Node::VarDecl { kind, name, init } => self.render_var_decl(*kind, name, *init),
            Node::ExprStmt(expr) => format!("{};", self.render(*expr)),
            Node::Return(value) => match value {
                Some(v) => format!("return {};", self.render(*v)),
                None => "return;".to_string(),
            },
            Node::Block(stmts) => {
                let rendered: Vec<String> = stmts.iter().map(|&s| self.render(s)).collect();
                format!("{{\n{}\n}}", indent(&rendered.join("\n")))
            }
            Node::Directive(text) => format!("\"{text}\";"),
            Node::Require(source) => format!("require({})", render_string_literal(source)),
            Node::ImportDefault { source } => format!("import {} from {}", "_default", render_string_literal(source)),
            Node::ExportsAssign { key, value } => format!("exports.{key} = {};", self.render(*value)),
            Node::ModuleExportsAssign(value) => format!("module.exports = {};", self.render(*value)),
            Node::EsmExportDefault(value) => format!("export default {};", self.render(*value)),
            Node::EsmExportNamed(entries) => {
                let parts: Vec<String> = entries.iter().map(|(name, value)| format!("{name}: {}", self.render(*value))).collect();
                format!("export {{ {} }};", parts.join(", "))
            }
        }
    }

    fn render_record_ref(&mut self, record: RecordId) -> String {
        self.names.existing_name(record).map(str::to_string).unwrap_or_else(|| format!("/* unbound record {} */", record.0))
    }

    fn render_array(&mut self, items: &[Option<NodeId>]) -> String {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(match item {
                Some(id) => self.render(*id),
                None => String::new(), // sparse hole: rendered as an empty slot between commas
            });
        }
        format!("[{}]", parts.join(", "))
    }

    fn render_object(&mut self, props: &[livepack_ir::ObjectProp]) -> String {
        let mut parts = Vec::with_capacity(props.len());
        for prop in props {
            let key = self.render(prop.key);
            let key = if prop.computed { format!("[{key}]") } else { key };
            let rendered = match prop.kind {
                ObjectPropKind::Value => format!("{key}: {}", self.render(prop.value)),
                ObjectPropKind::Getter => format!("get {key}{}", self.render_method_body(prop.value)),
                ObjectPropKind::Setter => format!("set {key}{}", self.render_method_body(prop.value)),
                ObjectPropKind::GetterSetter => {
                    let getter = format!("get {key}{}", self.render_method_body(prop.value));
                    let setter = prop.setter.map(|s| format!("set {key}{}", self.render_method_body(s))).unwrap_or_default();
                    format!("{getter}, {setter}")
                }
            };
            parts.push(rendered);
        }
        format!("{{{}}}", parts.join(", "))
    }

    fn render_member(&mut self, object: NodeId, property: NodeId, computed: bool, optional: bool) -> String {
        let object_src = self.render(object);
        let accessor = if optional { "?." } else { "." };
        if computed {
            format!("{object_src}{}[{}]", if optional { "?." } else { "" }, self.render(property))
        } else {
            format!("{object_src}{accessor}{}", self.render(property))
        }
    }

    fn render_call(&mut self, callee: NodeId, args: &[NodeId], optional: bool) -> String {
        let callee_src = self.render(callee);
        let args_src: Vec<String> = args.iter().map(|&a| self.render(a)).collect();
        let accessor = if optional { "?." } else { "" };
        format!("{callee_src}{accessor}({})", args_src.join(", "))
    }

    fn render_arrow(&mut self, params: &[livepack_ir::Param], body: &[NodeId], expr_body: Option<NodeId>, is_async: bool, use_strict_directive: bool) -> String {
        let params_src = self.render_params(params);
        let prefix = if is_async { "async " } else { "" };
        if let Some(expr) = expr_body {
            return format!("{prefix}({params_src}) => {}", self.render(expr));
        }
        let mut stmts: Vec<String> = Vec::new();
        if use_strict_directive {
            stmts.push("\"use strict\";".to_string());
        }
        stmts.extend(body.iter().map(|&s| self.render(s)));
        format!("{prefix}({params_src}) => {{\n{}\n}}", indent(&stmts.join("\n")))
    }

    fn render_function(
        &mut self,
        name: Option<&str>,
        params: &[livepack_ir::Param],
        body: &[NodeId],
        is_async: bool,
        is_generator: bool,
        use_strict_directive: bool,
    ) -> String {
        let params_src = self.render_params(params);
        let prefix = if is_async { "async " } else { "" };
        let star = if is_generator { "*" } else { "" };
        let name_src = name.unwrap_or("");
        let mut stmts: Vec<String> = Vec::new();
        if use_strict_directive {
            stmts.push("\"use strict\";".to_string());
        }
        stmts.extend(body.iter().map(|&s| self.render(s)));
        format!("{prefix}function{star} {name_src}({params_src}) {{\n{}\n}}", indent(&stmts.join("\n")))
    }

    fn render_params(&mut self, params: &[livepack_ir::Param]) -> String {
        let parts: Vec<String> = params
            .iter()
            .map(|p| {
                let name = self.render(p.name);
                let prefix = if p.rest { "...".to_string() } else { String::new() };
                match p.default {
                    Some(default) => format!("{prefix}{name} = {}", self.render(default)),
                    None => format!("{prefix}{name}"),
                }
            })
            .collect();
        parts.join(", ")
    }

    fn render_class(&mut self, name: Option<&str>, superclass: Option<NodeId>, members: &[livepack_ir::ClassMember]) -> String {
        let name_src = name.map(|n| format!(" {n}")).unwrap_or_default();
        let extends_src = superclass.map(|s| format!(" extends {}", self.render(s))).unwrap_or_default();
        let member_lines: Vec<String> = members
            .iter()
            .map(|member| {
                let key = self.render(member.key);
                let key = if member.computed { format!("[{key}]") } else { key };
                let static_prefix = if member.is_static { "static " } else { "" };
                match member.kind {
                    livepack_ir::ClassMemberKind::Field => format!("{static_prefix}{key} = {};", self.render(member.value)),
                    livepack_ir::ClassMemberKind::Method => format!("{static_prefix}{key}{}", self.render_method_body(member.value)),
                    livepack_ir::ClassMemberKind::Getter => format!("{static_prefix}get {key}{}", self.render_method_body(member.value)),
                    livepack_ir::ClassMemberKind::Setter => format!("{static_prefix}set {key}{}", self.render_method_body(member.value)),
                }
            })
            .collect();
        format!("class{name_src}{extends_src} {{\n{}\n}}", indent(&member_lines.join("\n")))
    }

    fn render_method_body(&mut self, value: NodeId) -> String {
        match self.arena.get(value) {
            Node::FunctionExpr { params, body, .. } => {
                let params_src = self.render_params(params);
                let stmts: Vec<String> = body.iter().map(|&s| self.render(s)).collect();
                format!("({params_src}) {{\n{}\n}}", indent(&stmts.join("\n")))
            }
            _ => format!("() {{ return {}; }}", self.render(value)),
        }
    }

    fn render_var_decl(&mut self, kind: VarKind, name: &str, init: Option<NodeId>) -> String {
        let keyword = match kind {
            VarKind::Const => "const",
            VarKind::Let => "let",
            VarKind::Var => "var",
        };
        match init {
            Some(id) => format!("{keyword} {name} = {};", self.render(id)),
            None => format!("{keyword} {name};"),
        }
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("\t{line}")).collect::<Vec<_>>().join("\n")
}

fn render_number(n: f64) -> String {
    if n == n.trunc() && n.is_finite() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// JS double-quoted string literal with the minimal escapes needed for
/// correctness (quote, backslash, newline, carriage return). Not a
/// minifier; `comments`/`minify` options choose shorter forms upstream.
pub(crate) fn render_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use livepack_scope::MangleStrategy;

    #[test]
    fn renders_simple_literals() {
        let mut arena = NodeArena::new();
        let names = NameTransform::new(MangleStrategy::Unmangled, vec![]);
        let id = arena.alloc(Node::Str("hi\n".to_string()));
        let mut renderer = Renderer::new(&arena, &names);
        assert_eq!(renderer.render(id), "\"hi\\n\"");
    }

    #[test]
    fn renders_negative_zero_distinctly_from_number_zero() {
        let mut arena = NodeArena::new();
        let names = NameTransform::new(MangleStrategy::Unmangled, vec![]);
        let neg_zero = arena.alloc(Node::NegativeZero);
        let zero = arena.alloc(Node::Number(0.0));
        let mut renderer = Renderer::new(&arena, &names);
        assert_eq!(renderer.render(neg_zero), "-0");
        assert_eq!(renderer.render(zero), "0");
    }

    #[test]
    fn renders_array_with_sparse_hole() {
        let mut arena = NodeArena::new();
        let names = NameTransform::new(MangleStrategy::Unmangled, vec![]);
        let one = arena.alloc(Node::Number(1.0));
        let arr = arena.alloc(Node::ArrayExpr(vec![Some(one), None, Some(one)]));
        let mut renderer = Renderer::new(&arena, &names);
        assert_eq!(renderer.render(arr), "[1, , 1]");
    }
}
