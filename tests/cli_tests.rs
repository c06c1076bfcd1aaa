use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

fn write_script(name: &str, source: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xlang-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
    let path = dir.join(name);
    fs::write(&path, source).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

fn xlang(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xlang"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run xlang: {e}"))
}

#[test]
fn runs_a_script_and_prints_the_result_repr() {
    let script = write_script("sum.xl", "@required n; total := 0; while n > 0 { total = total + n; n = n - 1; } total");
    let output = xlang(&[script.to_str().unwrap(), "--arg", "n=4"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "VMInt(10)\n");
}

#[test]
fn print_is_available_to_scripts() {
    let script = write_script("hello.xl", "print(\"hello\", 1 + 1, (a => 1,));");
    let output = xlang(&["run", script.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "hello VMInt(2) VMTuple((VMNamed(\"a\" => VMInt(1)),))\n"
    );
}

#[test]
fn failures_exit_non_zero_with_the_error() {
    let script = write_script("missing.xl", "@required n; n");
    let output = xlang(&[script.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing required binding `n`"));
}

#[test]
fn bytecode_listing_includes_nested_lambdas() {
    let script = write_script("lambda.xl", "f := (x) -> x + 1; f(1)");
    let output = xlang(&["bytecode", script.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("== <main> =="), "{}", stdout);
    assert!(stdout.contains("OpLambda"), "{}", stdout);
    assert!(stdout.contains("required: x"), "{}", stdout);
}

#[test]
fn malformed_flags_exit_with_usage_status() {
    let script = write_script("flags.xl", "1");
    let path = script.to_str().unwrap();
    for args in [
        vec!["--gc-threshold", "abc", path],
        vec!["--arg", "noequals", path],
        vec!["--arg", "n={", path],
        vec![path, "--config"],
    ] {
        let output = xlang(&args);
        assert_eq!(output.status.code(), Some(2), "args: {:?}", args);
        assert!(output.stdout.is_empty(), "args: {:?}", args);
    }
}
