/// An opaque tape symbol. `0` is the blank symbol.
pub type Symbol = u16;

/// A byte offset into the bytecode buffer where a state's arms begin.
pub type Address = u32;

/// A partially-applied higher-order state: an entry address plus bindings
/// for its state- and symbol-parameters.
///
/// `StateValue` is a tree, not a DAG — each clone is an explicit deep copy,
/// and dropping one recursively drops its children. Rust's ownership rules
/// give us that for free (`#[derive(Clone)]` deep-clones, and `Drop` is
/// automatic), which is exactly the discipline spec.md asks an
/// implementation to enforce by hand in a language without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateValue {
    pub address: Address,
    pub children: Vec<StateValue>,
    pub symbols: Vec<Symbol>,
}

/// The argument registers bound to the state currently executing.
///
/// State-parameter slots are `Option<StateValue>` rather than bare
/// `StateValue` so that `TAKE_ARG`/`FINAL_ARG` can leave a tombstone
/// (`None`) behind: the bytecode contract promises never to read a taken
/// slot again, and with `Option` that promise is enforced at runtime
/// (a violation panics instead of reading stale or duplicated data).
/// Symbol-parameter slots are plain `Symbol`s — they're `Copy`, not owned
/// resources, so there's nothing for `FREE_ARG`/`TAKE_ARG` to do with them.
pub struct ArgRegisters {
    states: Vec<Option<StateValue>>,
    symbols: Vec<Symbol>,
}

impl ArgRegisters {
    pub fn empty() -> Self {
        ArgRegisters {
            states: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub fn symbol(&self, i: usize) -> Symbol {
        self.symbols[i]
    }

    /// `TAKE_ARG`/`FINAL_ARG`: move the state out of slot `i`, leaving a
    /// tombstone. Panics if the slot was already taken or freed — reading a
    /// consumed argument is a bytecode bug.
    pub fn take_state(&mut self, i: usize) -> StateValue {
        self.states[i]
            .take()
            .expect("argument register read after being taken/freed (bytecode bug)")
    }

    /// `CLONE_ARG`: deep-copy the state in slot `i` without consuming it.
    pub fn clone_state(&self, i: usize) -> StateValue {
        self.states[i]
            .clone()
            .expect("argument register read after being taken/freed (bytecode bug)")
    }

    /// `FREE_ARG`: destroy the state in slot `i` in place. Dropping the old
    /// value here recursively frees its whole subtree.
    pub fn free_state(&mut self, i: usize) {
        self.states[i] = None;
    }

    /// Replace the entire register file, as `FINAL_STATE`/`FINAL_ARG` do.
    /// Any states left in the old file (an unfreed argument — a bytecode
    /// discipline violation) are dropped here rather than leaked.
    pub fn replace(&mut self, states: Vec<Option<StateValue>>, symbols: Vec<Symbol>) {
        self.states = states;
        self.symbols = symbols;
    }
}

/// Fixed capacities, per spec.md: overflow is a bytecode bug, not a
/// recoverable condition.
pub const MAX_STATE_SCRATCH: usize = 1024;
pub const MAX_SYMBOL_SCRATCH: usize = 256;

/// The two push-only scratch stacks used to stage a newly constructed or
/// finalized state's children and symbols.
pub struct Scratch {
    states: Vec<StateValue>,
    symbols: Vec<Symbol>,
}

impl Scratch {
    pub fn new() -> Self {
        Scratch {
            states: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.symbols.is_empty()
    }

    pub fn push_state(&mut self, state: StateValue) {
        debug_assert!(
            self.states.len() < MAX_STATE_SCRATCH,
            "state scratch overflow (bytecode bug)"
        );
        self.states.push(state);
    }

    pub fn push_symbol(&mut self, symbol: Symbol) {
        debug_assert!(
            self.symbols.len() < MAX_SYMBOL_SCRATCH,
            "symbol scratch overflow (bytecode bug)"
        );
        self.symbols.push(symbol);
    }

    /// `MAKE_STATE`: pop the top `k` states off the stack, in push order
    /// (i.e. the oldest of the `k` first). `Vec::split_off` gives exactly
    /// that without a pop-then-reverse dance, since the last `k` elements
    /// of a push-only `Vec` are already contiguous in push order.
    pub fn pop_states(&mut self, k: usize) -> Vec<StateValue> {
        let at = self
            .states
            .len()
            .checked_sub(k)
            .expect("MAKE_STATE popped more children than were pushed (bytecode bug)");
        self.states.split_off(at)
    }

    /// Drain the whole symbol stack, in push order.
    pub fn drain_symbols(&mut self) -> Vec<Symbol> {
        std::mem::take(&mut self.symbols)
    }

    /// Drain the whole state stack, in push order.
    pub fn drain_states(&mut self) -> Vec<StateValue> {
        std::mem::take(&mut self.states)
    }

    /// Drop everything currently staged. Used when a move is abandoned
    /// mid-RHS (a left-boundary STOP) so the envelope under construction
    /// doesn't leak — see the Ownership on STOP paths design note.
    pub fn clear(&mut self) {
        self.states.clear();
        self.symbols.clear();
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}
