use std::path::{Path, PathBuf};
use std::time::Duration;

use peppolval_core::config::Config;

pub fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(rel)
}

#[allow(dead_code)]
pub fn read_fixture(rel: &str) -> Vec<u8> {
    std::fs::read(fixture(rel)).expect("read fixture")
}

/// Config wired to the test fixture directories, with the Java binary
/// replaced by a stub script.
#[allow(dead_code)]
pub fn test_config(report_dir: &Path, java_bin: &Path) -> Config {
    Config::new(fixture("xsd"), fixture("rulesets"), "saxon-stub.jar")
        .with_java_bin(java_bin)
        .with_report_dir(report_dir)
        .with_engine_timeout(Duration::from_secs(10))
}

#[allow(dead_code)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Stub rule processor that honors the `-jar <jar> -s: -xsl: -o:` argument
/// contract and writes a fixed SVRL fixture to the output path.
#[allow(dead_code)]
pub fn engine_writing_fixture(dir: &Path, svrl_fixture: &str) -> PathBuf {
    let src = fixture(svrl_fixture);
    let body = format!(
        r#"#!/bin/sh
out=""
for arg in "$@"; do
  case "$arg" in
    -o:*) out="${{arg#-o:}}" ;;
  esac
done
cp "{}" "$out"
"#,
        src.display()
    );
    write_script(dir, "saxon-stub", &body)
}

/// Stub rule processor that copies the staged input document to the output
/// path, so each request's output reflects its own input. An optional sleep
/// widens the race window for the concurrency test.
#[allow(dead_code)]
pub fn engine_echoing_input(dir: &Path, sleep: &str) -> PathBuf {
    let body = format!(
        r#"#!/bin/sh
in=""
out=""
for arg in "$@"; do
  case "$arg" in
    -s:*) in="${{arg#-s:}}" ;;
    -o:*) out="${{arg#-o:}}" ;;
  esac
done
sleep {sleep}
cp "$in" "$out"
"#
    );
    write_script(dir, "saxon-stub", &body)
}

/// Stub rule processor that fails with a diagnostic on stderr.
#[allow(dead_code)]
pub fn engine_failing(dir: &Path, stderr: &str, code: i32) -> PathBuf {
    let body = format!(
        r#"#!/bin/sh
echo "{stderr}" >&2
exit {code}
"#
    );
    write_script(dir, "saxon-stub", &body)
}

/// Stub rule processor that hangs until killed.
#[allow(dead_code)]
pub fn engine_hanging(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "saxon-stub",
        "#!/bin/sh\nsleep 60\n",
    )
}
