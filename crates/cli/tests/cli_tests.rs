// Integration tests for the `dexsync` binary: exit codes, JSON output, check mode.
// Run with: cargo test -p dexsync-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SHEET: &str = "\
Cobblemon behaviour sheet,,,,
No.,Pokémon,Sleep,S. Depth,Hurt by Lava,S. Times,S. Light,S. Blocks,S. Biomes,Bed S.,\
S. Sees Sky,S. Skylight,Walk,Walk Speed,Avoids Land,Avoids Water,W. Swim,Swim Speed,\
W. Breathing,W. Walk,L. Swim,L. Walk,L. Breathing,Fly,Fly Speed,Look,Species Specific,\
Defends Self,Defends Owner,Will Flee,maxSize,Follow Distance,Follows
25,Pikachu,TRUE,3,TRUE
";

const PIKACHU: &str = "{\n  \"name\": \"Pikachu\",\n  \"forms\": [\n    {\n      \"name\": \"Partner\"\n    }\n  ]\n}";

fn dexsync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dexsync"));
    cmd.env_remove("DEXSYNC_DATA_DIR").env_remove("RUST_LOG");
    cmd
}

/// Sheet export plus a one-species data dir inside `dir`.
fn workspace(dir: &Path) -> (String, String) {
    let csv = dir.join("behaviour.csv");
    fs::write(&csv, SHEET).unwrap();
    let species = dir.join("species");
    fs::create_dir_all(species.join("generation1")).unwrap();
    fs::write(species.join("generation1/pikachu.json"), PIKACHU).unwrap();
    (
        csv.to_str().unwrap().to_string(),
        species.to_str().unwrap().to_string(),
    )
}

fn run_behaviour(csv: &str, species: &str, extra: &[&str]) -> Output {
    dexsync()
        .args(["run", "behaviour", "--csv", csv, "--data-dir", species])
        .args(extra)
        .output()
        .expect("dexsync run behaviour")
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_updates_files_and_prints_json() {
    let tmp = tempfile::tempdir().unwrap();
    let (csv, species) = workspace(tmp.path());

    let output = run_behaviour(&csv, &species, &["--json"]);
    assert!(output.status.success(), "exit code was {:?}", output.status);

    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout");
    assert_eq!(result["meta"]["domain"], "behaviour");
    assert_eq!(result["summary"]["changed_files"], 1);
    assert_eq!(
        result["diagnostics"]["no_source_forms"],
        serde_json::json!(["pikachu [Partner]"])
    );

    let text = fs::read_to_string(Path::new(&species).join("generation1/pikachu.json")).unwrap();
    let pikachu: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        pikachu["behaviour"],
        serde_json::json!({"resting": {"canSleep": true, "depth": 3}})
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pikachu [Partner]"), "report missing: {stderr}");
}

#[test]
fn check_mode_fails_until_files_are_synced() {
    let tmp = tempfile::tempdir().unwrap();
    let (csv, species) = workspace(tmp.path());
    let pikachu = Path::new(&species).join("generation1/pikachu.json");

    let output = run_behaviour(&csv, &species, &["--check"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(fs::read_to_string(&pikachu).unwrap(), PIKACHU);

    assert!(run_behaviour(&csv, &species, &["-q"]).status.success());

    let output = run_behaviour(&csv, &species, &["--check"]);
    assert!(output.status.success(), "exit code was {:?}", output.status);
}

#[test]
fn output_flag_writes_the_result_file() {
    let tmp = tempfile::tempdir().unwrap();
    let (csv, species) = workspace(tmp.path());
    let out = tmp.path().join("result.json");

    let output = run_behaviour(&csv, &species, &["--dry-run", "--output", out.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(result["meta"]["dry_run"], true);
}

#[test]
fn missing_csv_is_a_usage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (_, species) = workspace(tmp.path());
    let missing = tmp.path().join("nope.csv");

    let output = run_behaviour(missing.to_str().unwrap(), &species, &[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: cannot read"));
    assert!(stderr.contains("hint:"));
}

#[test]
fn malformed_species_file_is_a_runtime_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (csv, species) = workspace(tmp.path());
    fs::write(Path::new(&species).join("generation1/pikachu.json"), "[1, 2]").unwrap();

    let output = run_behaviour(&csv, &species, &[]);
    assert_eq!(output.status.code(), Some(61));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pikachu.json"));
}

// ---------------------------------------------------------------------------
// validate / defaults
// ---------------------------------------------------------------------------

#[test]
fn validate_rejects_bad_configs() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "domain = \"riding\"\nheader_skip = 99\n").unwrap();

    let output = dexsync()
        .args(["validate", path.to_str().unwrap()])
        .output()
        .expect("dexsync validate");
    assert_eq!(output.status.code(), Some(60));

    fs::write(&path, "domain = \"riding\"\nsheet = \"x\"\n").unwrap();
    let output = dexsync()
        .args(["validate", path.to_str().unwrap()])
        .output()
        .expect("dexsync validate");
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn defaults_round_trip_through_validate() {
    let tmp = tempfile::tempdir().unwrap();
    let output = dexsync()
        .args(["defaults", "riding"])
        .output()
        .expect("dexsync defaults riding");
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("domain = \"riding\""));
    assert!(text.contains("header_skip = 2"));

    let path = tmp.path().join("riding.toml");
    fs::write(&path, &text).unwrap();
    let output = dexsync()
        .args(["validate", path.to_str().unwrap()])
        .output()
        .expect("dexsync validate");
    assert!(output.status.success(), "exit code was {:?}", output.status);
}
