mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let mode = parse_mode().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: cluster-emulator [--demo[=<seconds>]]");
        process::exit(2);
    });

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new();

    match mode {
        Mode::Demo { seconds } => run_demo(&mut session, &mut writer, seconds),
        Mode::Replay => run_replay(&mut session, &mut writer),
    }
}

enum Mode {
    /// Replay telemetry frames from stdin against the host clock.
    Replay,
    /// Feed a scripted drive through the bridge on a simulated clock.
    Demo { seconds: u64 },
}

fn run_replay(session: &mut Session, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "Cluster emulator ready. Paste telemetry frames, one per line."
    )?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            continue;
        }

        writeln!(writer, "{}", session.handle_frame(trimmed))?;
    }

    writeln!(writer, "{}", session.summary())?;
    Ok(())
}

fn run_demo(session: &mut Session, writer: &mut impl Write, seconds: u64) -> io::Result<()> {
    writeln!(writer, "Cluster emulator demo drive ({seconds} s)")?;

    for (millis, frame) in session::demo_profile(seconds) {
        let response = session.handle_frame_at(&frame, millis);
        writeln!(writer, "t+{millis:>6} ms  {response}")?;
    }

    writeln!(writer, "{}", session.summary())?;
    Ok(())
}

fn parse_mode() -> Result<Mode, String> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(Mode::Replay);
    };

    if let Some(rest) = args.next() {
        return Err(format!("Unexpected argument `{rest}`"));
    }

    if arg == "--demo" {
        Ok(Mode::Demo { seconds: 8 })
    } else if let Some(value) = arg.strip_prefix("--demo=") {
        let seconds = value
            .parse::<u64>()
            .map_err(|_| format!("Invalid demo length `{value}`"))?;
        Ok(Mode::Demo { seconds })
    } else {
        Err(format!("Unknown argument `{arg}`"))
    }
}
