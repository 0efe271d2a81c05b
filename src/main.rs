//! Tiltlock CLI
//!
//! Usage:
//!   tiltlock --replay trace.jsonl            # Replay a recorded trace
//!   tiltlock --interactive                   # JSON-lines events on stdin
//!   tiltlock --serve                         # HTTP API server
//!   tiltlock --replay trace.jsonl --json     # JSON output

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use tiltlock::core::{run_server, ChallengeEngine};
use tiltlock::types::{
    Capability, ChallengeEvent, ChallengePhase, OrientationEvent, ScoreBreakdown, TickOutput,
};
use tiltlock::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "tiltlock",
    version = VERSION,
    about = "Tiltlock - Motion-based human verification",
    long_about = "Tiltlock challenges the user to tilt the device left, tilt right,\n\
                  then hold it steady, and scores the motion for human likeness.\n\n\
                  Events are JSON lines: {\"pitch_deg\":1.2,\"roll_deg\":-17.0,\"timestamp_ms\":450}\n\n\
                  Modes:\n  \
                  --interactive  Read events from stdin\n  \
                  --replay FILE  Replay a recorded trace\n  \
                  --serve        HTTP API server mode\n\n\
                  Phases:\n  \
                  TILT_LEFT   - Tilt 16 degrees left, hold 240ms\n  \
                  TILT_RIGHT  - Tilt 16 degrees right, hold 240ms\n  \
                  HOLD_STEADY - Hold inside the deadband for 1200ms\n  \
                  COMPLETE    - Verified; score breakdown available"
)]
struct Args {
    /// Replay a JSON-lines trace file
    #[arg(short, long)]
    replay: Option<String>,

    /// Interactive mode - read JSON-lines events from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show the full score breakdown box on completion
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else if let Some(ref path) = args.replay {
        run_replay(path, &args);
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args);
    }
}

/// Replay a recorded trace file
fn run_replay(path: &str, args: &Args) {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open {}: {}", path, e);
            std::process::exit(1);
        }
    };
    run_stream(BufReader::new(file), args);
}

/// Interactive mode - events from stdin
fn run_interactive(args: &Args) {
    print_header(args.no_color);
    println!("Paste orientation events as JSON lines. Type 'quit' to exit.");
    println!("Goal: tilt left, tilt right, then hold steady.");
    println!();

    let stdin = io::stdin();
    run_stream(stdin.lock(), args);
}

/// Drive the engine from a line stream of JSON orientation events
fn run_stream(reader: impl BufRead, args: &Args) {
    let mut engine = ChallengeEngine::new();
    engine.start(Capability::Granted, 0.0);

    let mut stdout = io::stdout();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession ended. Ticks: {}", engine.tick_count());
            break;
        }

        let event: OrientationEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(_) => {
                if !args.json {
                    eprintln!("skipping unparseable line");
                }
                continue;
            }
        };

        engine.submit(event);
        let Some(output) = engine.tick(event.timestamp_ms) else {
            continue;
        };

        print_tick(&output, args);
        let _ = stdout.flush();

        for event in &output.events {
            match event {
                ChallengeEvent::TaskCompleted { task, elapsed_ms } => {
                    // Haptic pulse stand-in; ignored where unsupported
                    print!("\x07");
                    if !args.json {
                        println!("  task {} done in {:.0}ms", task, elapsed_ms);
                    }
                }
                ChallengeEvent::ChallengeCompleted { breakdown } => {
                    print_completion(breakdown, args);
                }
            }
        }

        if engine.phase() == ChallengePhase::Complete {
            break;
        }
    }
}

/// Print one tick record
fn print_tick(output: &TickOutput, args: &Args) {
    if args.json {
        println!("{}", serde_json::to_string(output).unwrap_or_default());
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
    }
}

/// Print the final verification result
fn print_completion(breakdown: &ScoreBreakdown, args: &Args) {
    if args.json {
        println!(
            "{}",
            serde_json::to_string(breakdown).unwrap_or_default()
        );
        return;
    }

    let (green, gray, reset) = if args.no_color {
        ("", "", "")
    } else {
        ("\x1b[32m", "\x1b[90m", "\x1b[0m")
    };

    println!();
    println!("{}✓ VERIFIED - all three tasks complete{}", green, reset);
    println!(
        "{}  confidence={} risk={}{}",
        gray, breakdown.confidence, breakdown.risk_level, reset
    );

    if args.verbose {
        println!("┌─────────────────────────────────────┐");
        println!("│ entropy:    {:>6.1}                  │", breakdown.entropy);
        println!("│ smoothness: {:>6.1}                  │", breakdown.smoothness);
        println!("│ reaction:   {:>6.1}                  │", breakdown.reaction);
        println!("│ stability:  {:>6.1}                  │", breakdown.stability);
        println!("├─────────────────────────────────────┤");
        println!(
            "│ confidence: {:>6} risk: {:<8}    │",
            breakdown.confidence, breakdown.risk_level.to_string()
        );
        println!("└─────────────────────────────────────┘");
    }
}

/// Print header
fn print_header(no_color: bool) {
    if no_color {
        println!("========================================");
        println!("  Tiltlock v{}", VERSION);
        println!("========================================");
    } else {
        println!("\x1b[1m========================================\x1b[0m");
        println!("\x1b[1m  Tiltlock v{}\x1b[0m", VERSION);
        println!("\x1b[1m========================================\x1b[0m");
    }
    println!();
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    println!("Tiltlock API Server v{}", VERSION);
    println!();

    if let Err(e) = run_server(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
