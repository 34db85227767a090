use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn funnel(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("funnel").unwrap();
    cmd.current_dir(dir.path())
        .env("FUNNEL_ROOT", dir.path())
        .env_remove("OPENAI_API_KEY");
    cmd
}

fn init_project(dir: &TempDir) {
    funnel(dir)
        .args(["init", "--name", "acme"])
        .assert()
        .success();
}

fn json_of(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = funnel(dir).arg("--json").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// funnel init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    funnel(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .funnel/config.yaml"));

    assert!(dir.path().join(".funnel").is_dir());
    assert!(dir.path().join(".funnel/store").is_dir());
    assert!(dir.path().join(".funnel/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .funnel/config.yaml"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    funnel(&dir)
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("funnel init"));
}

// ---------------------------------------------------------------------------
// funnel persona
// ---------------------------------------------------------------------------

#[test]
fn persona_lifecycle() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let created = json_of(&dir, &["persona", "add", "Sarah", "--pain", "no time"]);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["painPoints"][0], "no time");

    funnel(&dir)
        .args(["persona", "edit", &id, "--summary", "Ops lead"])
        .assert()
        .success();
    let list = json_of(&dir, &["persona", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["summary"], "Ops lead");

    funnel(&dir)
        .args(["persona", "remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed persona"));
    funnel(&dir)
        .args(["persona", "remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to remove"));
    let list = json_of(&dir, &["persona", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn blank_persona_name_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["persona", "add", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid name"));
}

// ---------------------------------------------------------------------------
// funnel content / gaps
// ---------------------------------------------------------------------------

#[test]
fn assign_moves_between_stages() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let added = json_of(&dir, &["content", "add", "Acme", "Story", "--type", "Case Study"]);
    let id = added["asset"]["id"].as_str().unwrap().to_string();
    assert_eq!(added["location"]["location"], "library");

    funnel(&dir)
        .args(["content", "assign", &id, "trust"])
        .assert()
        .success();
    funnel(&dir)
        .args(["content", "assign", &id, "authority"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stage 'authority'"));

    let entries = json_of(&dir, &["content", "list"]);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["location"]["stage"], "authority");

    funnel(&dir)
        .args(["content", "unassign", &id])
        .assert()
        .success();
    let library = json_of(&dir, &["content", "list", "--library"]);
    assert_eq!(library.as_array().unwrap().len(), 1);
}

#[test]
fn assign_to_unknown_stage_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let added = json_of(&dir, &["content", "add", "Hello", "--type", "Blog Post"]);
    let id = added["asset"]["id"].as_str().unwrap();
    funnel(&dir)
        .args(["content", "assign", id, "awareness"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid stage"));
}

#[test]
fn remove_cascades_out_of_stage() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let added = json_of(
        &dir,
        &["content", "add", "Hello", "--type", "Blog Post", "--stage", "discover"],
    );
    let id = added["asset"]["id"].as_str().unwrap().to_string();
    funnel(&dir).args(["content", "remove", &id]).assert().success();
    let state = json_of(&dir, &["state"]);
    assert!(state["funnelContent"]["discover"].as_array().unwrap().is_empty());
}

#[test]
fn gaps_shrink_as_stages_fill() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let gaps = json_of(&dir, &["gaps"]);
    assert_eq!(gaps["gaps"].as_array().unwrap().len(), 5);

    for name in ["One", "Two"] {
        funnel(&dir)
            .args(["content", "add", name, "--type", "Blog Post", "--stage", "discover"])
            .assert()
            .success();
    }
    let gaps = json_of(&dir, &["gaps"]);
    let stages: Vec<&str> = gaps["gaps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["stage"].as_str().unwrap())
        .collect();
    assert_eq!(stages, vec!["resonate", "envision", "trust", "authority"]);
}

// ---------------------------------------------------------------------------
// funnel suggest
// ---------------------------------------------------------------------------

#[test]
fn offline_gap_suggestions_land_in_stages() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let out = json_of(&dir, &["suggest", "gaps", "--offline", "--accept-all"]);
    assert_eq!(out["accepted"].as_array().unwrap().len(), 10);

    let state = json_of(&dir, &["state"]);
    assert!(state["contentLibrary"].as_array().unwrap().is_empty());
    assert_eq!(state["funnelContent"]["authority"].as_array().unwrap().len(), 2);
    assert!(state["gaps"].as_array().unwrap().is_empty());
}

#[test]
fn suggestions_are_listed_without_accepting() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["suggest", "personas", "--offline", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--accept-all"));
    let list = json_of(&dir, &["persona", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn accept_by_index() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let out = json_of(
        &dir,
        &["suggest", "personas", "--offline", "--accept", "2"],
    );
    let picked = out["suggestions"][1]["item"]["name"].clone();
    assert_eq!(out["accepted"][0]["name"], picked);
    let list = json_of(&dir, &["persona", "list"]);
    assert_eq!(list[0]["source"], "ai");
}

#[test]
fn repeated_accept_index_is_taken_once() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let out = json_of(
        &dir,
        &["suggest", "personas", "--offline", "--accept", "1", "--accept", "1"],
    );
    assert_eq!(out["accepted"].as_array().unwrap().len(), 1);
    let list = json_of(&dir, &["persona", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn accept_out_of_range_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["suggest", "personas", "--offline", "--accept", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no suggestion #9"));
}

// ---------------------------------------------------------------------------
// funnel copy / wizard
// ---------------------------------------------------------------------------

#[test]
fn copy_render_handles_empty_funnel() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["copy", "render"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No content has been mapped"));
}

#[test]
fn copy_render_save_and_show() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["content", "add", "Acme", "--type", "Case Study", "--stage", "trust"])
        .assert()
        .success();
    funnel(&dir)
        .args(["copy", "render", "--tone", "bold", "--save"])
        .assert()
        .success();
    assert!(dir.path().join(".funnel/store/marketingCopy.md").exists());
    funnel(&dir)
        .args(["copy", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Trust"));
}

#[test]
fn copy_save_reads_stdin() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["copy", "save"])
        .write_stdin("# Hand written\n")
        .assert()
        .success();
    let out = json_of(&dir, &["copy", "show"]);
    assert_eq!(out["copy"], "# Hand written\n");
}

#[test]
fn copy_generate_without_key_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    funnel(&dir)
        .args(["copy", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn wizard_advances_with_data() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let w = json_of(&dir, &["wizard"]);
    assert_eq!(w["current"], "personas");

    funnel(&dir).args(["persona", "add", "Sarah"]).assert().success();
    funnel(&dir)
        .args(["content", "add", "Hello", "--type", "Blog Post"])
        .assert()
        .success();
    let w = json_of(&dir, &["wizard"]);
    assert_eq!(w["current"], "stage_mapping");
    assert_eq!(w["steps"][3]["unlocked"], false);
}
