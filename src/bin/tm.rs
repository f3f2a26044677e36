use clap::{Parser, ValueEnum};
use tmvm::assemble::{ArmChain, Program, Rhs};
use tmvm::{CompletionCause, Symbol, Vm};

#[derive(Clone, Copy, ValueEnum)]
enum Demo {
    /// Writes alternating '0'/'1' digits scanning rightward forever.
    AlternatingBits,
    /// A state whose only arm is LEFT, starting at the tape origin.
    LeftBoundary,
    /// Jumps 1000 cells to the right and writes a single 'A'.
    Growth,
    /// Builds a callable state value and dispatches through it.
    HigherOrder,
}

#[derive(Parser)]
#[command(name = "tm", about = "Turing-machine bytecode VM: run one of the built-in demo programs")]
struct Cli {
    /// Which built-in program to run.
    #[arg(long, value_enum)]
    program: Demo,

    /// Maximum number of moves to execute before giving up.
    #[arg(long)]
    max_moves: Option<u64>,

    /// Comma-separated list of u16 symbols to seed the tape with.
    #[arg(long)]
    initial_tape: Option<String>,
}

fn parse_initial_tape(s: &str) -> Result<Vec<Symbol>, String> {
    s.split(',')
        .map(|part| part.trim().parse::<Symbol>().map_err(|e| format!("invalid tape symbol '{part}': {e}")))
        .collect()
}

fn alternating_bits() -> (Vec<u8>, u64) {
    let bytecode = Program::new()
        .state("start", |addrs| {
            ArmChain::new().other(Rhs::new().write_val(b'0' as u16).final_state(addrs["f1"]))
        })
        .state("f1", |addrs| {
            ArmChain::new().other(Rhs::new().right().write_val(b'1' as u16).final_state(addrs["f0"]))
        })
        .state("f0", |addrs| {
            ArmChain::new().other(Rhs::new().right().write_val(b'0' as u16).final_state(addrs["f1"]))
        })
        .assemble("start");
    (bytecode, 10)
}

fn left_boundary() -> (Vec<u8>, u64) {
    let bytecode = Program::new()
        .state("start", |addrs| {
            ArmChain::new().other(Rhs::new().left().final_state(addrs["start"]))
        })
        .assemble("start");
    (bytecode, 1)
}

fn growth() -> (Vec<u8>, u64) {
    let bytecode = Program::new()
        .state("start", |addrs| {
            ArmChain::new().other(
                Rhs::new()
                    .right_n(250)
                    .right_n(250)
                    .right_n(250)
                    .right_n(250)
                    .write_val(b'A' as u16)
                    .final_state(addrs["halt"]),
            )
        })
        .state("halt", |_| ArmChain::new().halt())
        .assemble("start");
    (bytecode, 2)
}

fn higher_order() -> (Vec<u8>, u64) {
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
                .compare_arg(0, Rhs::new().write_arg(0).final_state(addrs["done"]))
                .halt()
        })
        .state("done", |_| ArmChain::new().halt())
        .assemble("start");
    (bytecode, 4)
}

fn main() {
    let cli = Cli::parse();

    let (bytecode, default_max_moves) = match cli.program {
        Demo::AlternatingBits => alternating_bits(),
        Demo::LeftBoundary => left_boundary(),
        Demo::Growth => growth(),
        Demo::HigherOrder => higher_order(),
    };
    let max_moves = cli.max_moves.unwrap_or(default_max_moves);

    let initial_tape = match cli.initial_tape {
        Some(ref s) => match parse_initial_tape(s) {
            Ok(tape) => tape,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => match cli.program {
            Demo::HigherOrder => vec![b'a' as u16],
            _ => Vec::new(),
        },
    };

    let mut vm = match Vm::new(bytecode, &initial_tape) {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let cause = vm.run(max_moves);

    println!("completion: {cause:?}");
    println!("moves executed: {}", vm.move_count());
    println!("head position: {}", vm.head_position());
    let high_water = vm.tape_length().max(vm.head_position() + 1);
    println!("tape[0..{high_water}]: {:?}", &vm.tape()[..vm.tape_length().min(high_water)]);
}
