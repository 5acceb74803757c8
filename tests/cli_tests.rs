//! Binary-level tests for argument handling and startup failures.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn souschef() -> Command {
    let mut cmd = Command::cargo_bin("souschef").expect("binary builds");
    // Never pick up a real backend configuration from the host.
    cmd.env_remove("AZURE_OPENAI_API_KEY")
        .env_remove("AZURE_OPENAI_ENDPOINT")
        .env_remove("AZURE_OPENAI_DEPLOYMENT_NAME")
        .env_remove("AZURE_OPENAI_API_VERSION")
        .env_remove("AZURE_OPENAI_SUGGESTION_DEPLOYMENT")
        .env_remove("AZURE_OPENAI_ANSWER_DEPLOYMENT");
    cmd
}

fn fake_backend(cmd: &mut Command) {
    cmd.env("AZURE_OPENAI_API_KEY", "test-key")
        .env("AZURE_OPENAI_ENDPOINT", "https://localhost:1")
        .env("AZURE_OPENAI_DEPLOYMENT_NAME", "test-deployment");
}

#[test]
fn unparseable_recipe_reports_no_steps() {
    souschef()
        .write_stdin("just some prose without any steps\nmore prose\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable steps"));
}

#[test]
fn missing_backend_config_is_reported() {
    souschef()
        .write_stdin("1. Stir once\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_OPENAI_API_KEY"));
}

#[test]
fn missing_recipe_file_is_reported() {
    let mut cmd = souschef();
    fake_backend(&mut cmd);
    cmd.arg("/no/such/recipe.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read recipe file"));
}

#[test]
fn walks_a_recipe_file_until_quit() {
    let mut recipe = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(recipe, "1. Season the pan").expect("write recipe");
    writeln!(recipe, "2. Wipe it down").expect("write recipe");

    let mut cmd = souschef();
    fake_backend(&mut cmd);
    cmd.arg(recipe.path())
        .arg("--simulate")
        .write_stdin("next\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1/2: Season the pan"))
        .stdout(predicate::str::contains("Step 2/2: Wipe it down"))
        .stdout(predicate::str::contains("Ending session."));
}
