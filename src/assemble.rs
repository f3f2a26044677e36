//! A tiny bytecode assembler.
//!
//! The surface-syntax parser and compiler that would normally produce this
//! VM's bytecode are out of scope for this crate (see spec.md §1), but the
//! seed scenarios, unit tests and the demo binary all need *some* way to
//! hand-build well-formed programs. `Rhs`/`ArmChain` are thin fluent
//! builders over the wire format in `src/opcode.rs`; `Program` resolves
//! forward references between states (a state's RHS can reference a
//! later-declared state's address) with a two-pass layout, since every
//! opcode operand has a fixed width regardless of its value.

use std::collections::HashMap;

use crate::opcode;
use crate::vm::HEADER_LEN;

/// Builds one arm's right-hand-side instruction sequence.
pub struct Rhs {
    bytes: Vec<u8>,
}

impl Rhs {
    pub fn new() -> Self {
        Rhs { bytes: Vec::new() }
    }

    pub fn left(mut self) -> Self {
        self.bytes.push(opcode::LEFT);
        self
    }

    pub fn right(mut self) -> Self {
        self.bytes.push(opcode::RIGHT);
        self
    }

    pub fn left_n(mut self, n: u8) -> Self {
        self.bytes.push(opcode::LEFT_N);
        self.bytes.push(n);
        self
    }

    pub fn right_n(mut self, n: u8) -> Self {
        self.bytes.push(opcode::RIGHT_N);
        self.bytes.push(n);
        self
    }

    pub fn write_arg(mut self, i: u8) -> Self {
        self.bytes.push(opcode::WRITE_ARG);
        self.bytes.push(i);
        self
    }

    pub fn write_val(mut self, v: u16) -> Self {
        self.bytes.push(opcode::WRITE_VAL);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_bound(mut self) -> Self {
        self.bytes.push(opcode::WRITE_BOUND);
        self
    }

    pub fn symbol_arg(mut self, i: u8) -> Self {
        self.bytes.push(opcode::SYMBOL_ARG);
        self.bytes.push(i);
        self
    }

    pub fn symbol_val(mut self, v: u16) -> Self {
        self.bytes.push(opcode::SYMBOL_VAL);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn symbol_bound(mut self) -> Self {
        self.bytes.push(opcode::SYMBOL_BOUND);
        self
    }

    pub fn take_arg(mut self, i: u8) -> Self {
        self.bytes.push(opcode::TAKE_ARG);
        self.bytes.push(i);
        self
    }

    pub fn clone_arg(mut self, i: u8) -> Self {
        self.bytes.push(opcode::CLONE_ARG);
        self.bytes.push(i);
        self
    }

    pub fn free_arg(mut self, i: u8) -> Self {
        self.bytes.push(opcode::FREE_ARG);
        self.bytes.push(i);
        self
    }

    pub fn make_state(mut self, k: u8, addr: u32) -> Self {
        self.bytes.push(opcode::MAKE_STATE);
        self.bytes.push(k);
        self.bytes.extend_from_slice(&addr.to_le_bytes());
        self
    }

    /// Terminal: `FINAL_STATE`. Consumes the builder.
    pub fn final_state(mut self, addr: u32) -> Vec<u8> {
        self.bytes.push(opcode::FINAL_STATE);
        self.bytes.extend_from_slice(&addr.to_le_bytes());
        self.bytes
    }

    /// Terminal: `FINAL_ARG`. Consumes the builder.
    pub fn final_arg(mut self, i: u8) -> Vec<u8> {
        self.bytes.push(opcode::FINAL_ARG);
        self.bytes.push(i);
        self.bytes
    }
}

impl Default for Rhs {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a chain of arms for one state: zero or more `COMPARE_ARG`/
/// `COMPARE_VAL` arms, ending in either `OTHER <rhs>` or `HALT`.
pub struct ArmChain {
    bytes: Vec<u8>,
}

impl ArmChain {
    pub fn new() -> Self {
        ArmChain { bytes: Vec::new() }
    }

    pub fn compare_arg(mut self, i: u8, rhs: Vec<u8>) -> Self {
        self.bytes.push(opcode::COMPARE_ARG);
        self.bytes.push(i);
        self.bytes.extend_from_slice(&(rhs.len() as u16).to_le_bytes());
        self.bytes.extend_from_slice(&rhs);
        self
    }

    pub fn compare_val(mut self, v: u16, rhs: Vec<u8>) -> Self {
        self.bytes.push(opcode::COMPARE_VAL);
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self.bytes.extend_from_slice(&(rhs.len() as u16).to_le_bytes());
        self.bytes.extend_from_slice(&rhs);
        self
    }

    /// Terminal: an always-matching wildcard arm. Consumes the builder.
    pub fn other(mut self, rhs: Vec<u8>) -> Vec<u8> {
        self.bytes.push(opcode::OTHER);
        self.bytes.extend_from_slice(&rhs);
        self.bytes
    }

    /// Terminal: no arm matched, halt. Consumes the builder.
    pub fn halt(mut self) -> Vec<u8> {
        self.bytes.push(opcode::HALT);
        self.bytes
    }
}

impl Default for ArmChain {
    fn default() -> Self {
        Self::new()
    }
}

type AddressTable = HashMap<&'static str, u32>;
type StateBuilder = Box<dyn Fn(&AddressTable) -> Vec<u8>>;

/// Lays out a whole program (header + a sequence of labeled states) and
/// resolves forward/self references between them.
///
/// Every operand a state's bytes might need to reference another state's
/// address through (`MAKE_STATE`, `FINAL_STATE`) is a fixed-width `u32`
/// field, so a state's encoded length never depends on what that address
/// actually is. That means a placeholder-address pass can measure lengths
/// (and therefore every state's real offset) before a second pass bakes in
/// the resolved addresses — no explicit relocation records needed.
pub struct Program {
    labels: Vec<&'static str>,
    builders: Vec<StateBuilder>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            labels: Vec::new(),
            builders: Vec::new(),
        }
    }

    pub fn state(
        mut self,
        label: &'static str,
        build: impl Fn(&AddressTable) -> Vec<u8> + 'static,
    ) -> Self {
        self.labels.push(label);
        self.builders.push(Box::new(build));
        self
    }

    pub fn assemble(self, entry_label: &'static str) -> Vec<u8> {
        let placeholder: AddressTable = self.labels.iter().map(|&l| (l, 0)).collect();

        let mut offsets: AddressTable = HashMap::new();
        let mut offset = HEADER_LEN as u32;
        let mut lengths = Vec::with_capacity(self.labels.len());
        for (&label, build) in self.labels.iter().zip(self.builders.iter()) {
            let bytes = build(&placeholder);
            offsets.insert(label, offset);
            offset += bytes.len() as u32;
            lengths.push(bytes.len());
        }

        let mut out = Vec::new();
        out.push(0);
        out.push(0); // reserved header
        out.extend_from_slice(&offsets[entry_label].to_le_bytes());
        for ((build, expected_len), _label) in self
            .builders
            .iter()
            .zip(lengths.iter())
            .zip(self.labels.iter())
        {
            let bytes = build(&offsets);
            debug_assert_eq!(
                bytes.len(),
                *expected_len,
                "state encoding length must not depend on resolved addresses"
            );
            out.extend_from_slice(&bytes);
        }
        out
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_referencing_state_resolves() {
        // A single state that loops back to its own address.
        let program = Program::new()
            .state("loop", |addrs| {
                ArmChain::new().other(Rhs::new().right().final_state(addrs["loop"]))
            })
            .assemble("loop");
        let entry = u32::from_le_bytes(program[2..6].try_into().unwrap());
        assert_eq!(entry, HEADER_LEN as u32);

        // The FINAL_STATE operand embedded in the arm must equal the
        // entry address too (the state points at itself).
        let final_state_addr_offset = program.len() - 4;
        let embedded = u32::from_le_bytes(
            program[final_state_addr_offset..final_state_addr_offset + 4]
                .try_into()
                .unwrap(),
        );
        assert_eq!(embedded, entry);
    }

    #[test]
    fn forward_reference_resolves() {
        let program = Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(Rhs::new().final_state(addrs["target"]))
            })
            .state("target", |_| ArmChain::new().halt())
            .assemble("start");
        let entry = u32::from_le_bytes(program[2..6].try_into().unwrap());
        assert_eq!(entry, HEADER_LEN as u32);
        // "start"'s body is OTHER(1) + FINAL_STATE(1) + addr(4) = 6 bytes.
        let target_addr = entry + 6;
        let final_state_operand_offset = 6 + 2; // header + OTHER opcode byte
        let embedded = u32::from_le_bytes(
            program[final_state_operand_offset..final_state_operand_offset + 4]
                .try_into()
                .unwrap(),
        );
        assert_eq!(embedded, target_addr);
    }
}
