use std::{
    io::{BufRead as _, BufReader, Read as _},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use escargot::CargoBuild;
use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use regex::Regex;

const LINE_RE: &str = r"^\[\d{2}-\d{2}_\d{2}:\d{2}:\d{2}:000\] requestRegistrationState2 MCC: 234, MNC: 20, PS: Attached, DataCap: LTE$";

fn quectel_cm() -> Command {
    let mut cmd = CargoBuild::new()
        .bin("quectel-CM")
        .current_release()
        .current_target()
        .run()
        .unwrap()
        .command();
    cmd.stdout(Stdio::piped()).stderr(Stdio::null());

    cmd
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("quectel-CM still running after {timeout:?}");
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn prints_a_status_line_every_five_seconds() {
    let mut child = quectel_cm().spawn().unwrap();

    thread::sleep(Duration::from_secs(12));
    child.kill().unwrap();
    child.wait().unwrap();

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut stdout)
        .unwrap();

    let re = Regex::new(LINE_RE).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert!((2..=3).contains(&lines.len()), "got {lines:?}");
    for line in lines {
        assert!(re.is_match(line), "unexpected line {line:?}");
    }
}

#[test]
fn exits_after_count_lines() {
    let output = quectel_cm()
        .args(["--count", "2", "--interval", "1"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output.status);
    let stdout = String::from_utf8(output.stdout).unwrap();
    let re = Regex::new(LINE_RE).unwrap();
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
    assert!(stdout.lines().all(|l| re.is_match(l)), "{stdout}");
}

#[test]
fn ignores_apn_arguments_from_the_supervisor() {
    let output = quectel_cm()
        .args(["-s", "internet", "user", "pass", "--count", "1"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output.status);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(Regex::new(LINE_RE).unwrap().is_match(stdout.trim_end()), "{stdout}");
}

#[test]
fn status_content_and_timing_cannot_be_changed_from_outside() {
    let output = quectel_cm()
        .args(["--mcc", "999", "--ps", "Detached"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{:?}", output.status);
    assert!(output.stdout.is_empty());

    let started = Instant::now();
    let output = quectel_cm()
        .env("QUECTEL_CM_STUB_INTERVAL", "1")
        .args(["--count", "2"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output.status);
    assert!(started.elapsed() >= Duration::from_secs(5), "{:?}", started.elapsed());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let re = Regex::new(LINE_RE).unwrap();
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
    assert!(stdout.lines().all(|l| re.is_match(l)), "{stdout}");
}

#[test]
fn terminates_when_the_reader_goes_away() {
    let mut child = quectel_cm().args(["--interval", "1"]).spawn().unwrap();

    let mut reader = BufReader::new(child.stdout.take().unwrap());
    let mut first = String::new();
    reader.read_line(&mut first).unwrap();
    assert!(Regex::new(LINE_RE).unwrap().is_match(first.trim_end()), "{first}");
    drop(reader);

    let status = wait_with_timeout(&mut child, Duration::from_secs(10));
    assert!(!status.success(), "{status:?}");
}

#[test]
fn sigterm_exits_cleanly() {
    let mut child = quectel_cm().spawn().unwrap();

    let mut reader = BufReader::new(child.stdout.take().unwrap());
    let mut first = String::new();
    reader.read_line(&mut first).unwrap();

    let pid = Pid::from_raw(i32::try_from(child.id()).unwrap());
    signal::kill(pid, Signal::SIGTERM).unwrap();

    let status = wait_with_timeout(&mut child, Duration::from_secs(5));
    assert!(status.success(), "{status:?}");
}

#[test]
fn help_mentions_apn() {
    let output = quectel_cm().arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("--apn"));
    assert!(stdout.contains("--interval"));
}
