use crate::cursor::ByteCursor;
use crate::opcode;
use crate::rhs::{RhsOutcome, run_rhs};
use crate::state::{ArgRegisters, Address, Scratch};
use crate::tape::Tape;

/// The result of running one move: matching exactly one arm and running
/// its RHS, or halting.
pub enum MoveOutcome {
    /// A `HALT` arm was reached.
    Halted,
    /// A `LEFT`/`LEFT_N` underran the tape's left boundary mid-RHS.
    LeftBoundary,
    /// A final transition ran; `address` is where the next move begins.
    Continued { address: Address },
}

/// Select one arm of the state whose arms start at `start_address` by
/// comparing the symbol under the head against each arm's pattern, in
/// declaration order, then run that arm's RHS.
///
/// Kept as a separate dispatch loop from [`run_rhs`] by design — the RHS
/// loop always terminates in STOP or a final-transition opcode, which
/// naturally hands control back here.
pub fn run_move(
    bytecode: &[u8],
    start_address: Address,
    tape: &mut Tape,
    regs: &mut ArgRegisters,
    scratch: &mut Scratch,
) -> MoveOutcome {
    let mut cursor = ByteCursor::new(bytecode, start_address as usize);
    loop {
        let op = cursor.fetch_u8();
        match op {
            opcode::HALT => return MoveOutcome::Halted,
            opcode::OTHER => {
                let bound = tape.read();
                return enter_rhs(&mut cursor, tape, regs, scratch, bound);
            }
            opcode::COMPARE_ARG => {
                let i = cursor.fetch_u8() as usize;
                let skip = cursor.fetch_u16_le();
                if tape.read() == regs.symbol(i) {
                    return enter_rhs(&mut cursor, tape, regs, scratch, 0);
                }
                cursor.skip(skip as usize);
            }
            opcode::COMPARE_VAL => {
                let v = cursor.fetch_u16_le();
                let skip = cursor.fetch_u16_le();
                if tape.read() == v {
                    return enter_rhs(&mut cursor, tape, regs, scratch, 0);
                }
                cursor.skip(skip as usize);
            }
            other => panic!("unknown arm opcode {other} (bytecode bug)"),
        }
    }
}

fn enter_rhs(
    cursor: &mut ByteCursor,
    tape: &mut Tape,
    regs: &mut ArgRegisters,
    scratch: &mut Scratch,
    bound: crate::state::Symbol,
) -> MoveOutcome {
    match run_rhs(cursor, tape, regs, scratch, bound) {
        RhsOutcome::Stop => {
            // The envelope under construction, if any, is abandoned here —
            // drop it rather than leak it (see the Ownership on STOP paths
            // design note).
            scratch.clear();
            MoveOutcome::LeftBoundary
        }
        RhsOutcome::Transition { address } => MoveOutcome::Continued { address },
    }
}
