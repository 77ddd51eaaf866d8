//! `Block`: a lexical site that may produce many frames.

use livepack_common::{BlockId, RecordId};

#[derive(Clone, Debug)]
pub struct BlockParam {
    pub name: String,
    /// The instrumenter says an `eval()`/`with` is reachable, so this name
    /// must not be renamed by mangling (§4.2 step 6).
    pub is_frozen_name: bool,
    /// Step 2: every frame binds this param to a function defined in the
    /// same block, so it's omitted from the factory's parameter list and
    /// assigned inside the factory body instead.
    pub locally_produced: bool,
    /// Step 2 (continued): the locally-produced function is referenced only
    /// by sibling functions in the same block, so it isn't part of the
    /// factory's return value either.
    pub scope_internal_only: bool,
}

impl BlockParam {
    #[must_use]
    pub fn new(name: impl Into<String>, is_frozen_name: bool) -> Self {
        Self { name: name.into(), is_frozen_name, locally_produced: false, scope_internal_only: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Sloppy,
}

#[derive(Debug)]
pub struct Block {
    pub id: BlockId,
    pub parent: Option<BlockId>,
    pub params: Vec<BlockParam>,
    /// Function/class definitions whose closure is this block.
    pub functions: Vec<RecordId>,
    pub children: Vec<BlockId>,
    pub contains_eval: bool,
    /// Filled in by step 5 (strict/sloppy reconciliation).
    pub strictness: Option<Strictness>,
    /// Filled in by step 7: whether the factory needs the
    /// `(function(){...}).apply(this, arguments)` wrapper because a frozen
    /// `this`/`arguments` can't be parameterized (the function uses `eval`).
    pub needs_apply_wrapper: bool,
    /// Step 3: param names needing a deferred injector (arrow function
    /// added to the factory's return value) because their value can't be
    /// passed in at factory-call time. At most one entry per param name.
    pub injectors: Vec<String>,
}

impl Block {
    #[must_use]
    pub fn new(id: BlockId, parent: Option<BlockId>) -> Self {
        Self {
            id,
            parent,
            params: Vec::new(),
            functions: Vec::new(),
            children: Vec::new(),
            contains_eval: false,
            strictness: None,
            needs_apply_wrapper: false,
            injectors: Vec::new(),
        }
    }
}
