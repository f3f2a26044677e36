use crate::arm::{MoveOutcome, run_move};
use crate::error::VmError;
use crate::state::{ArgRegisters, Address, Scratch, Symbol};
use crate::tape::Tape;

/// Bytes in the bytecode header: 2 reserved + 4 for the entry address.
pub const HEADER_LEN: usize = 6;

/// Why [`Vm::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCause {
    /// A `HALT` arm was reached.
    HaltExecuted,
    /// A `LEFT`/`LEFT_N` underran the tape's left boundary.
    LeftBoundary,
    /// `move_count` reached the caller's `max_moves` budget.
    BudgetExhausted,
}

/// The bytecode virtual machine: a single-threaded aggregate of the
/// bytecode buffer, the tape, the argument registers, the scratch stacks,
/// and the move counter.
///
/// Re-architected (per the Process-wide state design note) from the
/// original's module-level globals into a value you construct and tear
/// down explicitly, so multiple independent VMs can coexist in one
/// process and each is independently testable.
pub struct Vm {
    bytecode: Vec<u8>,
    address: Address,
    tape: Tape,
    regs: ArgRegisters,
    scratch: Scratch,
    move_count: u64,
}

impl Vm {
    /// Parse the 2-byte reserved header and 4-byte entry address, install
    /// the initial tape, and position at the entry state. The entry
    /// state has no parameters, so both argument register files start
    /// empty.
    pub fn new(bytecode: Vec<u8>, initial_tape: &[Symbol]) -> Result<Self, VmError> {
        if bytecode.len() < HEADER_LEN {
            return Err(VmError::TooShort { len: bytecode.len() });
        }
        let entry = u32::from_le_bytes(bytecode[2..6].try_into().unwrap());
        Ok(Vm {
            bytecode,
            address: entry,
            tape: Tape::new(initial_tape),
            regs: ArgRegisters::empty(),
            scratch: Scratch::new(),
            move_count: 0,
        })
    }

    /// Run moves until `HALT`, a left-boundary underrun, or `max_moves`
    /// moves have executed — whichever comes first. The budget is polled
    /// between moves, never inside an RHS, so a long RHS sequence that
    /// would exceed the budget still runs to completion once started.
    pub fn run(&mut self, max_moves: u64) -> CompletionCause {
        while self.move_count < max_moves {
            match run_move(
                &self.bytecode,
                self.address,
                &mut self.tape,
                &mut self.regs,
                &mut self.scratch,
            ) {
                MoveOutcome::Halted => return CompletionCause::HaltExecuted,
                MoveOutcome::LeftBoundary => return CompletionCause::LeftBoundary,
                MoveOutcome::Continued { address } => {
                    self.address = address;
                    self.move_count += 1;
                }
            }
        }
        CompletionCause::BudgetExhausted
    }

    /// The bytecode offset of the state `run` stopped at (its current
    /// `address`, whether that's a halted state, the state active when
    /// the left boundary was hit, or the next state to run when the
    /// budget ran out).
    pub fn final_address(&self) -> Address {
        self.address
    }

    pub fn tape(&self) -> &[Symbol] {
        self.tape.as_slice()
    }

    pub fn tape_length(&self) -> usize {
        self.tape.len()
    }

    pub fn head_position(&self) -> usize {
        self.tape.head_position()
    }

    pub fn move_count(&self) -> u64 {
        self.move_count
    }

    /// Explicit teardown. Rust's ownership already frees the tape, the
    /// argument-register state trees, and the scratch stacks the moment
    /// `self` drops; taking `self` by value here just makes that the only
    /// way to dispose of a `Vm`, so "invoke cleanup at most once" is a
    /// compile-time property rather than a runtime one to verify.
    pub fn destroy(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{ArmChain, Program, Rhs};

    /// Alternating-bit machine: writes '0' in place, then alternates
    /// between two states that each step right and write the opposite
    /// digit before handing off to the other, forever. Odd/even digit
    /// duty is split across two states (`f0`/`f1`) rather than one state
    /// comparing the tape against the last digit written, since every
    /// cell this machine visits is freshly blank (it never revisits a
    /// written cell) and so never matches a `COMPARE_VAL` against '0' or
    /// '1' — the alternation has to live in which state is current, not
    /// in what the tape currently holds.
    fn alternating_bit_program() -> Vec<u8> {
        Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(Rhs::new().write_val(b'0' as u16).final_state(addrs["f1"]))
            })
            .state("f1", |addrs| {
                ArmChain::new().other(Rhs::new().right().write_val(b'1' as u16).final_state(addrs["f0"]))
            })
            .state("f0", |addrs| {
                ArmChain::new().other(Rhs::new().right().write_val(b'0' as u16).final_state(addrs["f1"]))
            })
            .assemble("start")
    }

    #[test]
    fn alternating_bit_machine() {
        let bytecode = alternating_bit_program();
        let mut vm = Vm::new(bytecode, &[]).unwrap();
        let cause = vm.run(10);
        assert_eq!(cause, CompletionCause::BudgetExhausted);
        assert_eq!(vm.move_count(), 10);
        assert_eq!(vm.head_position(), 9);
        let expected: Vec<u16> = [0, 1, 0, 1, 0, 1, 0, 1, 0, 1]
            .iter()
            .map(|&c| c + b'0' as u16)
            .collect();
        assert_eq!(&vm.tape()[..10], expected.as_slice());
    }

    #[test]
    fn left_boundary_halts_before_incrementing_move_count() {
        let bytecode = Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(Rhs::new().left().final_state(addrs["start"]))
            })
            .assemble("start");
        let mut vm = Vm::new(bytecode, &[]).unwrap();
        let cause = vm.run(1_000_000);
        assert_eq!(cause, CompletionCause::LeftBoundary);
        assert_eq!(vm.move_count(), 0);
        assert_eq!(vm.head_position(), 0);
        assert!(vm.tape().iter().all(|&s| s == 0));
    }

    #[test]
    fn tape_growth_on_write_far_to_the_right() {
        let bytecode = Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(
                    Rhs::new()
                        .right_n(250) // RIGHT_N takes a u8 operand; chain four to cover 1000.
                        .right_n(250)
                        .right_n(250)
                        .right_n(250)
                        .write_val(0x0041)
                        .final_state(addrs["halt"]),
                )
            })
            .state("halt", |_| ArmChain::new().halt())
            .assemble("start");
        let mut vm = Vm::new(bytecode, &[]).unwrap();
        let cause = vm.run(2);
        assert_eq!(cause, CompletionCause::HaltExecuted);
        assert!(vm.tape_length() >= 1001);
        assert_eq!(vm.tape()[1000], 0x41);
        assert_eq!(vm.head_position(), 1000);
        assert_eq!(vm.move_count(), 1);
        for (i, &cell) in vm.tape().iter().enumerate() {
            if i != 1000 {
                assert_eq!(cell, 0, "cell {i} should still be blank");
            }
        }
    }

    /// Scenario 4: a start state packages a callable as a first-class
    /// value — a zero-child `StateValue` addressed at `target` carrying
    /// symbol argument 'a' — via `SYMBOL_VAL`/`MAKE_STATE`, and passes it
    /// to a `dispatch` state as arg 0 via `FINAL_STATE`. `dispatch` then
    /// "calls" that stored callable with `FINAL_ARG`, which is what
    /// actually jumps to `target` and installs its bound symbol argument.
    /// `target` compares the head against that argument.
    #[test]
    fn higher_order_state_via_make_state_and_final_arg() {
        let bytecode = Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(
                    Rhs::new()
                        .symbol_val(b'a' as u16)
                        .make_state(0, addrs["target"])
                        .final_state(addrs["dispatch"]),
                )
            })
            .state("dispatch", |_| ArmChain::new().other(Rhs::new().final_arg(0)))
            .state("target", |addrs| {
                ArmChain::new()
                    .compare_arg(
                        0,
                        Rhs::new().write_arg(0).final_state(addrs["done"]),
                    )
                    .halt()
            })
            .state("done", |_| ArmChain::new().halt())
            .assemble("start");
        let mut vm = Vm::new(bytecode, &[b'a' as u16]).unwrap();
        let cause = vm.run(4);
        assert_eq!(cause, CompletionCause::HaltExecuted);
        assert_eq!(vm.head_position(), 0);
        assert_eq!(vm.tape()[0], b'a' as u16);
        assert_eq!(vm.move_count(), 3);
    }

    #[test]
    fn blank_write_past_end_does_not_grow() {
        let bytecode = Program::new()
            .state("start", |addrs| {
                ArmChain::new().other(Rhs::new().right_n(100).write_val(0).final_state(addrs["halt"]))
            })
            .state("halt", |_| ArmChain::new().halt())
            .assemble("start");
        let mut vm = Vm::new(bytecode, &[]).unwrap();
        let len_before = vm.tape_length();
        let cause = vm.run(2);
        assert_eq!(cause, CompletionCause::HaltExecuted);
        assert_eq!(vm.tape_length(), len_before);
        assert_eq!(vm.head_position(), 100);
    }

    #[test]
    fn zero_budget_runs_nothing() {
        let bytecode = alternating_bit_program();
        let mut vm = Vm::new(bytecode, &[]).unwrap();
        let cause = vm.run(0);
        assert_eq!(cause, CompletionCause::BudgetExhausted);
        assert_eq!(vm.move_count(), 0);
        assert_eq!(vm.head_position(), 0);
        assert!(vm.tape().iter().all(|&s| s == 0));
    }

    #[test]
    fn run_is_deterministic() {
        let bytecode = alternating_bit_program();
        let mut vm1 = Vm::new(bytecode.clone(), &[]).unwrap();
        let cause1 = vm1.run(37);
        let mut vm2 = Vm::new(bytecode, &[]).unwrap();
        let cause2 = vm2.run(37);
        assert_eq!(cause1, cause2);
        assert_eq!(vm1.tape(), vm2.tape());
        assert_eq!(vm1.head_position(), vm2.head_position());
        assert_eq!(vm1.final_address(), vm2.final_address());
        assert_eq!(vm1.move_count(), vm2.move_count());
    }

    #[test]
    fn new_rejects_truncated_header() {
        let err = Vm::new(vec![0, 0, 1, 2], &[]).unwrap_err();
        assert_eq!(err, VmError::TooShort { len: 4 });
    }

    #[test]
    fn destroy_consumes_the_vm() {
        let bytecode = Program::new().state("s", |_| ArmChain::new().halt()).assemble("s");
        let vm = Vm::new(bytecode, &[]).unwrap();
        vm.destroy();
    }
}
