//! Integration tests for relocheck

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's config and state directories
fn relocheck(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("relocheck");
    cmd.env("XDG_STATE_HOME", home.join("state"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("RELOCHECK_CONFIG")
        .arg("--config")
        .arg(home.join("config.toml"));
    cmd
}

mod cli_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build-cache outcomes survive relocating"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("relocheck"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("./gradlew"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "config", "set", "build.timeout_secs", "900"])
            .assert()
            .success();

        relocheck(home.path())
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_secs = 900"));
    }

    #[test]
    fn config_set_unknown_key() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "config", "set", "build.parallel", "true"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn run_without_scenarios() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "run"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No scenarios configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn golden_show_unknown_scenario() {
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "golden", "show", "assemble"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Scenario not found: assemble"));
    }

    #[test]
    fn status_runs() {
        // Status reports missing pieces but never fails
        let home = TempDir::new().unwrap();
        relocheck(home.path())
            .args(["--no-local", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No checkout source"));
    }

    #[test]
    fn init_creates_local_config() {
        let home = TempDir::new().unwrap();
        let project = home.path().join("project");

        relocheck(home.path())
            .arg("init")
            .arg("--path")
            .arg(&project)
            .assert()
            .success();
        assert!(project.join("relocheck.toml").is_file());

        relocheck(home.path())
            .arg("init")
            .arg("--path")
            .arg(&project)
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }
}

mod check_tests {
    use super::*;
    use predicates::prelude::*;

    const GOLDEN: &str = r#"
[tasks]
":clean" = "SUCCESS"
":app:compileJava" = "FROM_CACHE"
":app:processResources" = "NO_SOURCE"
"#;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn matching_log_passes() {
        let home = TempDir::new().unwrap();
        let golden = write(home.path(), "golden.toml", GOLDEN);
        let log = write(
            home.path(),
            "build.log",
            "> Task :clean\n> Task :app:compileJava FROM-CACHE\n> Task :app:processResources NO-SOURCE\n\nBUILD SUCCESSFUL in 3s\n",
        );

        relocheck(home.path())
            .arg("--no-local")
            .arg("check")
            .arg(&golden)
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains("matches the golden table"));
    }

    #[test]
    fn diverging_log_reports_every_task() {
        let home = TempDir::new().unwrap();
        let golden = write(home.path(), "golden.toml", GOLDEN);
        let log = write(
            home.path(),
            "build.log",
            "> Task :clean\n> Task :app:compileJava\n> Task :app:jar\n",
        );

        relocheck(home.path())
            .arg("--no-local")
            .arg("check")
            .arg(&golden)
            .arg(&log)
            .assert()
            .failure()
            .stdout(predicate::str::contains(":app:compileJava"))
            .stdout(predicate::str::contains(":app:processResources"))
            .stdout(predicate::str::contains(":app:jar"))
            .stderr(predicate::str::contains(
                "3 task outcome(s) differ from the golden table",
            ));
    }

    #[test]
    fn json_output_is_parseable() {
        let home = TempDir::new().unwrap();
        let golden = write(home.path(), "golden.toml", GOLDEN);
        let log = write(home.path(), "build.log", "> Task :clean\n");

        let output = relocheck(home.path())
            .arg("--no-local")
            .arg("check")
            .arg(&golden)
            .arg(&log)
            .args(["--format", "json"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["summary"]["missing"], 2);
        assert_eq!(value["discrepancies"][0]["kind"], "missing");
    }

    #[test]
    fn unknown_outcome_label_is_rejected() {
        let home = TempDir::new().unwrap();
        let golden = write(home.path(), "golden.toml", GOLDEN);
        let log = write(home.path(), "build.log", "> Task :clean WEIRD\n");

        relocheck(home.path())
            .arg("--no-local")
            .arg("check")
            .arg(&golden)
            .arg(&log)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown task outcome 'WEIRD'"));
    }

    #[test]
    fn empty_golden_table_is_rejected() {
        let home = TempDir::new().unwrap();
        let golden = write(home.path(), "golden.toml", "[tasks]\n");
        let log = write(home.path(), "build.log", "> Task :clean\n");

        relocheck(home.path())
            .arg("--no-local")
            .arg("check")
            .arg(&golden)
            .arg(&log)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Golden table is empty"));
    }
}

#[cfg(unix)]
mod run_tests {
    use super::*;
    use predicates::prelude::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Fake wrapper that reports FROM-CACHE once the shared cache holds an entry
    const FAKE_GRADLEW: &str = r#"#!/bin/sh
cache=""
for arg in "$@"; do
  case "$arg" in
    -Drelocheck.cacheDir=*) cache="${arg#-Drelocheck.cacheDir=}" ;;
  esac
done
if [ -n "$FAKE_FAIL" ]; then
  echo "FAILURE: Build failed with an exception." >&2
  exit 1
fi
echo "> Task :clean"
if [ -f "$cache/compileJava" ]; then
  echo "> Task :app:compileJava FROM-CACHE"
else
  mkdir -p "$cache" && touch "$cache/compileJava"
  echo "> Task :app:compileJava"
fi
echo "> Task :app:processResources NO-SOURCE"
echo ""
echo "BUILD SUCCESSFUL in 1s"
"#;

    const GOLDEN: &str = r#"[tasks]
":clean" = "SUCCESS"
":app:compileJava" = "FROM_CACHE"
":app:processResources" = "NO_SOURCE"
"#;

    struct Fixture {
        home: TempDir,
        project: PathBuf,
    }

    impl Fixture {
        fn new(golden: &str, env: &str) -> Self {
            let home = TempDir::new().unwrap();
            let project = home.path().join("project");
            std::fs::create_dir_all(project.join("golden")).unwrap();

            let script = project.join("gradlew");
            std::fs::write(&script, FAKE_GRADLEW).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

            std::fs::write(project.join("golden/assemble.toml"), golden).unwrap();

            let config = format!(
                r#"[general]
reports = false

[checkout]
source = "."
strategy = "copy"
work_dir = "{}"

[build]
{}

[[scenario]]
name = "assemble"
tasks = ["assemble"]
golden = "golden/assemble.toml"
"#,
                home.path().join("work").display(),
                env
            );
            std::fs::write(project.join("relocheck.toml"), config).unwrap();

            Self { home, project }
        }

        fn cmd(&self) -> Command {
            let mut cmd = relocheck(self.home.path());
            cmd.current_dir(&self.project);
            cmd
        }
    }

    #[test]
    fn relocated_build_matches_golden_table() {
        let fixture = Fixture::new(GOLDEN, "");

        fixture
            .cmd()
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("assemble matches its golden table"));

        let work = fixture.home.path().join("work");
        assert!(work.join("original/gradlew").is_file());
        assert!(work.join("relocated/gradlew").is_file());
        assert!(work.join("build-cache/compileJava").is_file());
    }

    #[test]
    fn json_run_report() {
        let fixture = Fixture::new(GOLDEN, "");

        let output = fixture
            .cmd()
            .args(["run", "--format", "json"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(reports[0]["scenario"], "assemble");
        assert_eq!(reports[0]["verdict"], "passed");
        assert_eq!(reports[0]["relocated"]["cache_hits"], 1);
        assert_eq!(reports[0]["original"]["cache_hits"], 0);
    }

    #[test]
    fn diverging_build_fails_with_full_diff() {
        let golden = GOLDEN.replace("\"FROM_CACHE\"", "\"UP_TO_DATE\"");
        let fixture = Fixture::new(&golden, "");

        fixture
            .cmd()
            .arg("run")
            .assert()
            .failure()
            .stdout(predicate::str::contains(":app:compileJava"))
            .stderr(predicate::str::contains("differ from the golden table"));
    }

    #[test]
    fn failing_build_aborts_run() {
        let fixture = Fixture::new(GOLDEN, "env = { FAKE_FAIL = \"1\" }");

        fixture
            .cmd()
            .arg("run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Build failed in"))
            .stderr(predicate::str::contains("FAILURE: Build failed with an exception."))
            .stderr(predicate::str::contains("differ from the golden table").not());
    }

    #[test]
    fn record_then_show_golden_table() {
        let fixture = Fixture::new(GOLDEN, "");
        let golden = fixture.project.join("golden/assemble.toml");
        std::fs::remove_file(&golden).unwrap();

        fixture
            .cmd()
            .args(["golden", "record", "assemble", "--yes"])
            .assert()
            .success();
        let recorded = std::fs::read_to_string(&golden).unwrap();
        assert!(recorded.contains("FROM_CACHE"));
        assert!(recorded.contains("NO_SOURCE"));

        fixture
            .cmd()
            .args(["golden", "show", "assemble"])
            .assert()
            .success()
            .stdout(predicate::str::contains(":app:compileJava"));

        fixture.cmd().arg("run").assert().success();
    }
}
