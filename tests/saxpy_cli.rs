use std::process::{Command, Output};

fn saxpy(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_saxpy"))
        .args(args)
        .output()
        .expect("failed to spawn saxpy")
}

#[test]
fn small_sequential_run_prints_csv_line() {
    let out = saxpy(&["--n", "1024", "--stride", "1", "--pattern", "seq", "--trials", "1", "--no-warm"]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    let csv = stdout
        .lines()
        .find(|l| l.starts_with("CSV,"))
        .expect("no CSV line in output");
    assert!(csv.contains("n,1024"), "{csv}");
    assert!(csv.contains("stride,1"), "{csv}");
    assert!(csv.contains("pattern,seq"), "{csv}");
    assert!(stdout.contains("# SAXPY summary"));
}

#[test]
fn random_pattern_runs() {
    let out = saxpy(&["--n", "2048", "--pattern", "rand", "--trials", "2"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("CSV,n,2048,stride,1,pattern,rand"));
}

#[test]
fn unknown_flag_exits_one_with_usage() {
    let out = saxpy(&["--bogus"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--bogus"), "{stderr}");
    assert!(stderr.contains("Usage"), "{stderr}");
}

#[test]
fn missing_value_exits_one() {
    let out = saxpy(&["--stride"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
}

#[test]
fn help_exits_zero() {
    let out = saxpy(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--pattern"));
    assert!(stdout.contains("--no-warm"));
}

#[test]
fn unallocatable_buffer_exits_two_before_timing() {
    let out = saxpy(&["--n", "4611686018427387904"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty(), "{}", String::from_utf8_lossy(&out.stdout));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid layout"));
}
