//! Opcode numbering shared by the move evaluator (`src/arm.rs`) and the RHS
//! evaluator (`src/rhs.rs`).
//!
//! spec.md leaves the numeric assignment open ("any self-consistent
//! assignment works"); this crate uses the original two-block layout it
//! mentions — match opcodes 0..3, RHS opcodes 4..19 — as a single
//! contiguous `u8` space, following the named-byte-constant style
//! `bff.rs`/`subleq.rs` use for their own instruction sets.

// Arm (match) opcodes.
pub const COMPARE_ARG: u8 = 0;
pub const COMPARE_VAL: u8 = 1;
pub const OTHER: u8 = 2;
pub const HALT: u8 = 3;

// RHS opcodes.
pub const LEFT: u8 = 4;
pub const RIGHT: u8 = 5;
pub const LEFT_N: u8 = 6;
pub const RIGHT_N: u8 = 7;
pub const WRITE_ARG: u8 = 8;
pub const WRITE_VAL: u8 = 9;
pub const WRITE_BOUND: u8 = 10;
pub const SYMBOL_ARG: u8 = 11;
pub const SYMBOL_VAL: u8 = 12;
pub const SYMBOL_BOUND: u8 = 13;
pub const TAKE_ARG: u8 = 14;
pub const CLONE_ARG: u8 = 15;
pub const FREE_ARG: u8 = 16;
pub const MAKE_STATE: u8 = 17;
pub const FINAL_STATE: u8 = 18;
pub const FINAL_ARG: u8 = 19;
