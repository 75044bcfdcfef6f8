//! One-shot command runner

use crate::output::Truncation;
use crate::process::Launch;
use crate::reporter::Reporter;

/// Run `program` with `args`, expecting silence and success.
///
/// The command gets no input. Any output on stdout or stderr is reported
/// (stdout first, long output abbreviated), as is a non-zero exit status;
/// either one fails and aborts the test. A command that cannot be started
/// or is killed by a signal is reported as a fatal error.
pub fn run_command(t: &mut dyn Reporter, program: &str, args: &[&str]) {
    t.helper();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let launch = Launch {
        program,
        args: &args,
        dir: None,
        env: &[],
        stdin: None,
        timeout: None,
    };

    let captured = match launch.run() {
        Ok(captured) => captured,
        Err(e) => {
            t.fatal(&[&e]);
            return;
        }
    };

    let mut ok = true;

    let output = captured.stdout + &captured.stderr;
    if !output.is_empty() {
        t.errorf(format_args!("{}: unexpected output:\n{}", program, Truncation::default().abbreviate(&output)));
        ok = false;
    }

    if captured.code != 0 {
        t.errorf(format_args!("{}: exit status {}", program, captured.code));
        ok = false;
    }

    if !ok {
        t.fail_now();
    }
}
