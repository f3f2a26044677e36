//! A bytecode virtual machine for a register-extended Turing machine: a
//! one-sided growable tape, states made of pattern-matching arms, and a
//! right-hand side instruction set that can build and pass around
//! first-class state values.
//!
//! See `src/vm.rs` for the driver (`Vm`, `CompletionCause`), `src/arm.rs`
//! and `src/rhs.rs` for the two-level move/RHS evaluator, and
//! `src/assemble.rs` for the hand-assembly helpers the tests and the demo
//! binary use to build bytecode.

pub mod arm;
pub mod assemble;
pub mod cursor;
pub mod error;
pub mod opcode;
pub mod rhs;
pub mod state;
pub mod tape;
pub mod vm;

pub use error::VmError;
pub use state::{Address, StateValue, Symbol};
pub use vm::{CompletionCause, Vm, HEADER_LEN};
