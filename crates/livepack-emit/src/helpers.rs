//! Runtime helper snippets (§4.5): a small fixed library of source text the
//! emitter inlines or imports into an output on demand. The core never
//! executes any of this; it only decides, per output, which helpers are
//! referenced and emits their source once.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Helper {
    DefineProps,
    CreateArguments,
    CreateBinding,
    CreateScopeBinding,
    EvalInScope,
    Memoize,
    ImportModule,
    ImportMany,
    ImportValue,
}

impl Helper {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DefineProps => "defineProps",
            Self::CreateArguments => "createArguments",
            Self::CreateBinding => "createBinding",
            Self::CreateScopeBinding => "createScopeBinding",
            Self::EvalInScope => "evalInScope",
            Self::Memoize => "memoize",
            Self::ImportModule => "importModule",
            Self::ImportMany => "importMany",
            Self::ImportValue => "importValue",
        }
    }

    /// Other helpers this one's source text calls, so the emitter can pull
    /// in a helper's transitive dependencies when it's referenced.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Helper] {
        match self {
            Self::EvalInScope => &[Helper::CreateScopeBinding],
            _ => &[],
        }
    }

    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::DefineProps => DEFINE_PROPS,
            Self::CreateArguments => CREATE_ARGUMENTS,
            Self::CreateBinding => CREATE_BINDING,
            Self::CreateScopeBinding => CREATE_SCOPE_BINDING,
            Self::EvalInScope => EVAL_IN_SCOPE,
            Self::Memoize => MEMOIZE,
            Self::ImportModule => IMPORT_MODULE,
            Self::ImportMany => IMPORT_MANY,
            Self::ImportValue => IMPORT_VALUE,
        }
    }
}

/// Disambiguates `defineProps`'s property-map shapes per the §6 table:
/// bare value, `[value, bitmap]`, `[[innerArray]]`, `[getter, setter]`,
/// `[getter, setter, bitmap]`, `[getter, undefined]`, `[undefined, setter]`,
/// and `[bitmap]` (flags-only, leave value as-is).
const DEFINE_PROPS: &str = r#"function defineProps(obj, props, proto) {
	var keys = Object.keys(props);
	for (var i = 0; i < keys.length; i++) {
		var key = keys[i], spec = props[key];
		var descriptor;
		if (!Array.isArray(spec)) {
			descriptor = {value: spec, writable: true, enumerable: true, configurable: true};
		} else if (spec.length === 1 && Array.isArray(spec[0])) {
			descriptor = {value: spec[0], writable: true, enumerable: true, configurable: true};
		} else if (spec.length === 1) {
			descriptor = Object.getOwnPropertyDescriptor(obj, key) || {};
			applyBitmap(descriptor, spec[0]);
		} else {
			var isAccessor = typeof spec[1] !== 'number';
			if (isAccessor) {
				descriptor = {get: spec[0], set: spec[1], enumerable: true, configurable: true};
				applyBitmap(descriptor, spec[2]);
			} else {
				descriptor = {value: spec[0], writable: true, enumerable: true, configurable: true};
				applyBitmap(descriptor, spec[1]);
			}
		}
		var literalProto = typeof spec[spec.length - 1] === 'number' && (spec[spec.length - 1] & 8) !== 0;
		Object.defineProperty(literalProto ? obj : obj, literalProto ? '__proto__' : key, descriptor);
	}
	if (proto !== undefined) Object.setPrototypeOf(obj, proto);
	return obj;
}
function applyBitmap(descriptor, bitmap) {
	if (bitmap === undefined) return;
	if ('value' in descriptor) descriptor.writable = (bitmap & 1) === 0;
	descriptor.enumerable = (bitmap & 2) === 0;
	descriptor.configurable = (bitmap & 4) === 0;
}
"#;

/// Recreates an exotic `arguments` object whose integer-keyed slots alias
/// the internal variables of the surrounding factory, so writes through
/// `arguments[0]` are visible as writes to the named parameter and vice
/// versa (only representable when the captured function had simple,
/// non-destructured parameters — the tracer records `internal_var_sites`
/// for exactly this reason).
const CREATE_ARGUMENTS: &str = r#"function createArguments() {
	var args = Array.prototype.slice.call(arguments);
	var obj = {};
	for (var i = 0; i < args.length; i++) obj[i] = args[i];
	obj.length = args.length;
	obj[Symbol.iterator] = Array.prototype[Symbol.iterator];
	obj.callee = function () { throw new TypeError('\'callee\' may not be accessed in strict mode'); };
	return obj;
}
"#;

/// ESM live-binding pair: the defining module holds the setter, importers
/// read through the getter, and `subscribe` lets `evalInScope` re-read after
/// an assignment instead of capturing a stale snapshot.
const CREATE_BINDING: &str = r#"function createBinding(initial) {
	var value = initial, subscribers = [];
	return {
		get: function () { return value; },
		set: function (v) { value = v; for (var i = 0; i < subscribers.length; i++) subscribers[i](v); },
		subscribe: function (fn) { subscribers.push(fn); }
	};
}
"#;

/// Shared-variable binding between two split outputs: the defining output
/// calls `.set`, consumers in other outputs read via `.get`.
const CREATE_SCOPE_BINDING: &str = r#"function createScopeBinding(bound) {
	return {get: function () { return bound; }, set: function (v) { bound = v; return v; }};
}
"#;

/// Reconstructs an `eval` context: the captured scope's variables are
/// exposed through a `with`-like wrapper object built from `mappings`
/// (name -> binding accessor pairs); `const` writes through it throw,
/// matching real `eval` semantics; `thisIsStrict` controls whether `this`
/// re-projects to `undefined` (strict) or the global object (sloppy).
const EVAL_IN_SCOPE: &str = r#"function evalInScope(code, localEval, isStrict, thisIsStrict, mappings) {
	var scope = {};
	for (var i = 0; i < mappings.length; i++) {
		(function (name, binding, isConst) {
			Object.defineProperty(scope, name, {
				get: function () { return binding.get(); },
				set: function (v) {
					if (isConst) throw new TypeError('Assignment to constant variable.');
					binding.set(v);
				},
				enumerable: true
			});
		})(mappings[i][0], mappings[i][1], mappings[i][2]);
	}
	var thisArg = thisIsStrict ? undefined : (typeof globalThis !== 'undefined' ? globalThis : this);
	return localEval.call(thisArg, 'with(scope){' + code + '}');
}
"#;

/// Caches a zero-argument function's first-call result under `fn._value`,
/// used for the lazy initializer wrapping a `splitAsync` target's first
/// `import()`.
const MEMOIZE: &str = r#"function memoize(fn) {
	return function () {
		if (!('_value' in fn)) fn._value = fn();
		return fn._value;
	};
}
"#;

/// Async-split import helpers: `importModule` wraps a dynamic `import()`
/// for a module with no further split dependencies; `importMany` composes
/// several; `importValue` unwraps the `default` export of the imported
/// module-namespace object.
const IMPORT_MODULE: &str = r#"function importModule(id, hasNoDeps) {
	return hasNoDeps ? import(id) : import(id).then(function (ns) { return ns; });
}
"#;

const IMPORT_MANY: &str = r#"function importMany() {
	var ids = Array.prototype.slice.call(arguments);
	return Promise.all(ids.map(function (id) { return import(id); }));
}
"#;

const IMPORT_VALUE: &str = r#"function importValue(id) {
	return import(id).then(function (ns) { return ns.default; });
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_helper_source_declares_its_own_name() {
        for helper in [
            Helper::DefineProps,
            Helper::CreateArguments,
            Helper::CreateBinding,
            Helper::CreateScopeBinding,
            Helper::EvalInScope,
            Helper::Memoize,
            Helper::ImportModule,
            Helper::ImportMany,
            Helper::ImportValue,
        ] {
            assert!(helper.source().contains(&format!("function {}", helper.name())));
        }
    }

    #[test]
    fn eval_in_scope_depends_on_create_scope_binding() {
        assert_eq!(Helper::EvalInScope.dependencies(), &[Helper::CreateScopeBinding]);
        assert!(Helper::DefineProps.dependencies().is_empty());
    }
}
