//! Command checks, observed through a Recorder
//!
//! These run small `/bin/sh` scripts, so they are Unix-only.

#![cfg(unix)]

use emx_testkit::{panics, predicate, Command, Recorder, Reporter, TestReporter};

/// Check the recorder against what a failed or passing run should leave behind.
fn check(rec: &Recorder, failed: bool, aborted: bool, log: &str) {
    let mut t = TestReporter::new();
    rec.expect(&mut t, failed, aborted, log, "");
}

fn is_prime(n: i32) -> bool {
    n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

#[test]
fn test_defaults() {
    let mut rec = Recorder::default();
    Command::new("/bin/true", &[]).run(&mut rec, "");
    check(&rec, false, false, "");

    rec.reset();
    Command::new("/bin/false", &[]).run(&mut rec, "");
    check(&rec, true, true, "non-zero exit code
command: /bin/false
no input
no output
no error output
exit code: 1
");

    rec.reset();
    Command::new("/bin/sh", &["-c", "printf 99"]).run(&mut rec, "");
    check(&rec, true, true, "unexpected output
command: /bin/sh -c printf 99
no input
output:
99
no error output
exit code: 0
");

    rec.reset();
    Command::new("/bin/sh", &["-c", "echo 87 >&2"]).run(&mut rec, "");
    check(&rec, true, true, "unexpected error output
command: /bin/sh -c echo 87 >&2
no input
no output
error output:
87
exit code: 0
");

    rec.reset();
    Command::new("/bin/sh", &["-c", "echo 87 >&2; exit 3"]).run(&mut rec, "");
    check(&rec, true, true, "unexpected error output
command: /bin/sh -c echo 87 >&2; exit 3
no input
no output
error output:
87
exit code: 3
");

    rec.reset();
    Command::new("/bin/sh", &["-c", "echo 99; echo 87 >&2; exit 3"]).run(&mut rec, "");
    check(&rec, true, true, "unexpected output
unexpected error output
command: /bin/sh -c echo 99; echo 87 >&2; exit 3
no input
output:
99
error output:
87
exit code: 3
");

    rec.reset();
    Command::new("/bin/sh", &["-c", "echo 99; exit 3"]).run(&mut rec, "");
    check(&rec, true, true, "unexpected output
command: /bin/sh -c echo 99; exit 3
no input
output:
99
no error output
exit code: 3
");
}

#[test]
fn test_output() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "read x; echo a $x b"]);
    c.want_stdout("a seven b\n");

    c.run(&mut rec, "seven\n");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "eight\n");
    check(&rec, true, true, "incorrect output
command: /bin/sh -c read x; echo a $x b
input:
eight
output:
a eight b
no error output
exit code: 0
");

    rec.reset();
    c.check_stdout(predicate::contains("green"));
    c.run(&mut rec, "evergreen");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "purple");
    check(&rec, true, true, "incorrect output
command: /bin/sh -c read x; echo a $x b
input:
purple
output:
a purple b
no error output
exit code: 0
");

    rec.reset();
    c.clear_stdout_check();
    c.run(&mut rec, "whatever");
    check(&rec, true, true, "unexpected output
command: /bin/sh -c read x; echo a $x b
input:
whatever
output:
a whatever b
no error output
exit code: 0
");
}

#[test]
fn test_error_output() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "read x; if [ \"$x\" != nothing ]; then echo $x >&2; exit 99; fi"]);
    c.want_stderr("fever\n");

    c.run(&mut rec, "fever");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "chill");
    check(&rec, true, true, "incorrect error output
command: /bin/sh -c read x; if [ \"$x\" != nothing ]; then echo $x >&2; exit 99; fi
input:
chill
no output
error output:
chill
exit code: 99
");

    rec.reset();
    c.check_stderr(|actual| actual.contains("tropical"));
    c.run(&mut rec, "blueberries are not a tropical fruit");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "apples grow in England");
    check(&rec, true, true, "incorrect error output
command: /bin/sh -c read x; if [ \"$x\" != nothing ]; then echo $x >&2; exit 99; fi
input:
apples grow in England
no output
error output:
apples grow in England
exit code: 99
");

    rec.reset();
    c.clear_stderr_check();
    c.run(&mut rec, "something");
    check(&rec, true, true, "unexpected error output
command: /bin/sh -c read x; if [ \"$x\" != nothing ]; then echo $x >&2; exit 99; fi
input:
something
no output
error output:
something
exit code: 99
");

    rec.reset();
    c.run(&mut rec, "nothing");
    check(&rec, false, false, "");
}

#[test]
fn test_exit_code() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "read x; exit $x"]);
    c.want_code(17);

    c.run(&mut rec, "17");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "31");
    check(&rec, true, true, "incorrect exit code
command: /bin/sh -c read x; exit $x
input:
31
no output
no error output
exit code: 31
");

    rec.reset();
    c.run(&mut rec, "0");
    check(&rec, true, true, "incorrect exit code
command: /bin/sh -c read x; exit $x
input:
0
no output
no error output
exit code: 0
");

    rec.reset();
    c.check_code_with(|t, actual| {
        if is_prime(actual) {
            return true;
        }
        t.helper();
        t.errorf(format_args!("{} is not prime", actual));
        false
    });
    c.run(&mut rec, "17");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "31");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "99");
    check(&rec, true, true, "99 is not prime
incorrect exit code
command: /bin/sh -c read x; exit $x
input:
99
no output
no error output
exit code: 99
");

    rec.reset();
    c.clear_code_check();
    c.run(&mut rec, "0");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "1");
    check(&rec, true, true, "non-zero exit code
command: /bin/sh -c read x; exit $x
input:
1
no output
no error output
exit code: 1
");
}

#[test]
fn test_exit_code_follows_error_output() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "echo oops >&2; read x; exit $x"]);
    c.want_stderr("oops\n");
    c.run(&mut rec, "3");
    check(&rec, false, false, "");

    rec.reset();
    c.run(&mut rec, "0");
    check(&rec, true, true, "error output produced but exit code was 0
command: /bin/sh -c echo oops >&2; read x; exit $x
input:
0
no output
error output:
oops
exit code: 0
");

    // A failed output check skips the default exit code check.
    rec.reset();
    c.want_stderr("hunky dory\n");
    c.run(&mut rec, "0");
    check(&rec, true, true, "incorrect error output
command: /bin/sh -c echo oops >&2; read x; exit $x
input:
0
no output
error output:
oops
exit code: 0
");

    rec.reset();
    c.want_stdout("erewhon\n");
    c.run(&mut rec, "0");
    check(&rec, true, true, "incorrect output
incorrect error output
command: /bin/sh -c echo oops >&2; read x; exit $x
input:
0
no output
error output:
oops
exit code: 0
");

    rec.reset();
    c.want_stderr("oops\n");
    c.run(&mut rec, "0");
    check(&rec, true, true, "incorrect output
command: /bin/sh -c echo oops >&2; read x; exit $x
input:
0
no output
error output:
oops
exit code: 0
");
}

#[test]
fn test_explicit_code_check_runs_after_output_failure() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "echo 99; exit 3"]);
    c.want_code(0);
    c.run(&mut rec, "");
    check(&rec, true, true, "unexpected output
incorrect exit code
command: /bin/sh -c echo 99; exit 3
no input
output:
99
no error output
exit code: 3
");
}

#[test]
fn test_regex_predicate() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "echo tool; echo version 1.2"]);
    c.check_stdout(predicate::matches(r"^version \d+\.\d+$").unwrap());
    c.run(&mut rec, "");
    check(&rec, false, false, "");
}

#[test]
fn test_env() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "printf %s \"$COLOR\""]);
    c.env("COLOR", "teal").want_stdout("teal");
    c.run(&mut rec, "");
    check(&rec, false, false, "");
}

#[test]
fn test_launch_failure_skips_checks() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/thereisnocommandwiththisname-really", &[]);
    c.want_stdout("never checked");
    c.run(&mut rec, "");
    assert!(rec.failed() && rec.aborted());
    assert!(rec.logged().contains("thereisnocommandwiththisname-really"));
    assert!(!rec.logged().contains("command:"));
    assert_eq!(rec.logged().lines().count(), 1);
}

#[test]
fn test_signal_is_fatal() {
    let mut rec = Recorder::default();
    Command::new("/bin/sh", &["-c", "kill -9 $$"]).run(&mut rec, "");
    assert!(rec.failed() && rec.aborted());
    assert!(rec.logged().contains("signal 9"), "{}", rec.logged());
    assert!(!rec.logged().contains("exit code:"));
}

#[test]
fn test_timeout_is_fatal() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "exec sleep 10"]);
    c.timeout(std::time::Duration::from_millis(200));
    c.run(&mut rec, "");
    assert!(rec.failed() && rec.aborted());
    assert!(rec.logged().contains("timed out"), "{}", rec.logged());
}

#[test]
fn test_timeout_covers_background_children() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/sh", &["-c", "sleep 6 & echo hi"]);
    c.want_stdout("hi\n").timeout(std::time::Duration::from_millis(500));
    let start = std::time::Instant::now();
    c.run(&mut rec, "");
    assert!(start.elapsed() < std::time::Duration::from_secs(4), "took {:?}", start.elapsed());
    assert!(rec.failed() && rec.aborted());
    assert!(rec.logged().contains("timed out"), "{}", rec.logged());
    assert_eq!(rec.logged().lines().count(), 1);
}

#[test]
fn test_panicking_check_propagates() {
    let mut rec = Recorder::default();
    let mut c = Command::new("/bin/true", &[]);
    c.check_code(|_| panic!("check exploded"));
    let u = panics(|| c.run(&mut rec, ""));
    assert_eq!(u.message(), Some("check exploded"));
    assert!(!rec.failed());
}

#[test]
fn test_chdir() {
    let mut t = TestReporter::new();
    let tmp = t.temp_dir();
    std::fs::write(tmp.join("somefile"), "").unwrap();

    let mut c = Command::new("/bin/sh", &["-c", "ls"]);
    c.chdir(&tmp);
    c.want_stdout("somefile\n");
    c.run(&mut t, "");

    let mut rec = Recorder::default();
    let nondir = tmp.join("nondir");
    c.chdir(&nondir);
    c.run(&mut rec, "");
    assert!(rec.failed(), "running in a missing directory did not fail");
    assert!(rec.aborted(), "running in a missing directory did not stop the test");
    assert!(
        rec.logged().contains(&nondir.display().to_string()),
        "bad error message for missing directory: {}",
        rec.logged(),
    );
}
