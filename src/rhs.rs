use crate::cursor::ByteCursor;
use crate::opcode;
use crate::state::{ArgRegisters, Address, Scratch, Symbol};
use crate::tape::Tape;

/// The result of running one arm's right-hand side to completion.
pub enum RhsOutcome {
    /// A `LEFT`/`LEFT_N` underran the tape's left boundary. The move ends
    /// without reaching a final transition.
    Stop,
    /// A `FINAL_STATE`/`FINAL_ARG` ran. `address` is where the next move
    /// should begin; the argument registers have already been updated.
    Transition { address: Address },
}

/// Run RHS opcodes starting at `cursor` until a final transition or a
/// left-boundary STOP.
///
/// Per spec.md, the scratch stacks are empty on entry; exactly one
/// terminal opcode (`FINAL_STATE`/`FINAL_ARG`) runs on any non-STOP path.
pub fn run_rhs(
    cursor: &mut ByteCursor,
    tape: &mut Tape,
    regs: &mut ArgRegisters,
    scratch: &mut Scratch,
    bound: Symbol,
) -> RhsOutcome {
    debug_assert!(scratch.is_empty(), "scratch stacks non-empty on RHS entry (bytecode bug)");

    loop {
        let op = cursor.fetch_u8();
        match op {
            opcode::LEFT => {
                if !tape.left(1) {
                    return RhsOutcome::Stop;
                }
            }
            opcode::RIGHT => tape.right(1),
            opcode::LEFT_N => {
                let n = cursor.fetch_u8() as usize;
                if !tape.left(n) {
                    return RhsOutcome::Stop;
                }
            }
            opcode::RIGHT_N => {
                let n = cursor.fetch_u8() as usize;
                tape.right(n);
            }
            opcode::WRITE_ARG => {
                let i = cursor.fetch_u8() as usize;
                tape.write(regs.symbol(i));
            }
            opcode::WRITE_VAL => {
                let v = cursor.fetch_u16_le();
                tape.write(v);
            }
            opcode::WRITE_BOUND => tape.write(bound),
            opcode::SYMBOL_ARG => {
                let i = cursor.fetch_u8() as usize;
                scratch.push_symbol(regs.symbol(i));
            }
            opcode::SYMBOL_VAL => {
                let v = cursor.fetch_u16_le();
                scratch.push_symbol(v);
            }
            opcode::SYMBOL_BOUND => scratch.push_symbol(bound),
            opcode::TAKE_ARG => {
                let i = cursor.fetch_u8() as usize;
                let state = regs.take_state(i);
                scratch.push_state(state);
            }
            opcode::CLONE_ARG => {
                let i = cursor.fetch_u8() as usize;
                let state = regs.clone_state(i);
                scratch.push_state(state);
            }
            opcode::FREE_ARG => {
                let i = cursor.fetch_u8() as usize;
                regs.free_state(i);
            }
            opcode::MAKE_STATE => {
                let k = cursor.fetch_u8() as usize;
                let addr = cursor.fetch_u32_le();
                let children = scratch.pop_states(k);
                let symbols = scratch.drain_symbols();
                scratch.push_state(crate::state::StateValue {
                    address: addr,
                    children,
                    symbols,
                });
            }
            opcode::FINAL_STATE => {
                let address = cursor.fetch_u32_le();
                let states = scratch.drain_states().into_iter().map(Some).collect();
                let symbols = scratch.drain_symbols();
                regs.replace(states, symbols);
                return RhsOutcome::Transition { address };
            }
            opcode::FINAL_ARG => {
                let i = cursor.fetch_u8() as usize;
                let taken = regs.take_state(i);
                let states = taken.children.into_iter().map(Some).collect();
                regs.replace(states, taken.symbols);
                return RhsOutcome::Transition { address: taken.address };
            }
            other => panic!("unknown RHS opcode {other} (bytecode bug)"),
        }
    }
}
