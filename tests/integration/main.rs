//! Integration tests for npm-install-quick

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MANIFEST: &str = r#"{"name":"@acme/web","dependencies":{"left-pad":"^1.0.0"}}"#;
const LOCK_IN_SYNC: &str =
    r#"{"lockfileVersion":1,"dependencies":{"left-pad":{"version":"1.3.0"}}}"#;
const LOCK_STALE: &str = r#"{"lockfileVersion":1,"dependencies":{"left-pad":{"version":"0.9.0"}}}"#;

/// Stands in for npm: records its arguments and fills node_modules
const FAKE_NPM: &str = r#"#!/bin/sh
echo "$*" >> "$(dirname "$0")/calls.log"
if [ "$1" = "ci" ] && [ -n "$FAKE_NPM_FAIL_CI" ]; then
    exit 1
fi
mkdir -p node_modules/left-pad
echo "module.exports = 1;" > node_modules/left-pad/index.js
"#;

fn quick() -> Command {
    let mut cmd = cargo_bin_cmd!("npm-install-quick");
    cmd.env_remove("NPM_INSTALL_QUICK_ARCHIVE_DIR")
        .env_remove("NPM_INSTALL_QUICK_CONFIG")
        .env_remove("FAKE_NPM_FAIL_CI");
    cmd
}

/// A project directory plus an isolated config, archive and fake npm
struct Sandbox {
    _root: TempDir,
    project: PathBuf,
    tools: PathBuf,
    archive: PathBuf,
    config: PathBuf,
}

impl Sandbox {
    fn new(lock: Option<&str>) -> Self {
        let root = TempDir::new().unwrap();
        let project = root.path().join("project");
        let tools = root.path().join("tools");
        let archive = root.path().join("archive");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&tools).unwrap();

        fs::write(project.join("package.json"), MANIFEST).unwrap();
        if let Some(lock) = lock {
            fs::write(project.join("package-lock.json"), lock).unwrap();
        }

        let npm = tools.join("fake-npm.sh");
        fs::write(&npm, FAKE_NPM).unwrap();
        fs::set_permissions(&npm, fs::Permissions::from_mode(0o755)).unwrap();

        let config = tools.join("config.toml");
        fs::write(
            &config,
            format!(
                "[cache]\narchive_dir = '{}'\n\n[install]\npackage_manager = '{}'\n\n[runtime]\nversion = '20.11.0'\n",
                archive.display(),
                npm.display()
            ),
        )
        .unwrap();

        Self {
            _root: root,
            project,
            tools,
            archive,
            config,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = quick();
        cmd.current_dir(&self.project)
            .arg("--no-local")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.tools.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn snapshots(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.archive) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn fingerprint(&self) -> String {
        let output = self.cmd().arg("fingerprint").output().unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

fn node_modules_file(project: &Path) -> PathBuf {
    project.join("node_modules").join("left-pad").join("index.js")
}

mod cli_tests {
    use super::*;

    #[test]
    fn help_displays() {
        quick()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("fingerprinted snapshots"));
    }

    #[test]
    fn version_displays() {
        quick()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("npm-install-quick"));
    }

    #[test]
    fn completions_generate() {
        quick()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("npm-install-quick"));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new(None);
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new(None);
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("fake-npm.sh"));
    }
}

mod fingerprint_tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_hex() {
        let sandbox = Sandbox::new(Some(LOCK_IN_SYNC));
        let first = sandbox.fingerprint();
        let second = sandbox.fingerprint();

        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_follows_npmrc() {
        let sandbox = Sandbox::new(Some(LOCK_IN_SYNC));
        let before = sandbox.fingerprint();

        fs::write(
            sandbox.project.join(".npmrc"),
            "registry=https://registry.example.com/\n",
        )
        .unwrap();

        assert_ne!(before, sandbox.fingerprint());
    }

    #[test]
    fn fingerprint_json_names_artifact() {
        let sandbox = Sandbox::new(None);
        sandbox
            .cmd()
            .args(["fingerprint", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"project_name\": \"@acme-web\""))
            .stdout(predicate::str::contains("@acme-web-dependencies-"))
            .stdout(predicate::str::contains("\"snapshot_exists\": false"));
    }
}

mod install_tests {
    use super::*;

    #[test]
    fn install_then_restore() {
        let sandbox = Sandbox::new(None);

        sandbox
            .cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("Success"))
            .stdout(predicate::str::contains("'install' '--no-package-lock'"));

        assert_eq!(sandbox.calls(), vec!["install --no-package-lock"]);
        assert!(node_modules_file(&sandbox.project).is_file());
        assert_eq!(sandbox.snapshots().len(), 1);

        fs::remove_dir_all(sandbox.project.join("node_modules")).unwrap();

        sandbox
            .cmd()
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("restored"));

        assert_eq!(sandbox.calls().len(), 1, "restore must not run npm");
        assert_eq!(
            fs::read_to_string(node_modules_file(&sandbox.project)).unwrap(),
            "module.exports = 1;\n"
        );
    }

    #[test]
    fn lock_in_sync_uses_npm_ci() {
        let sandbox = Sandbox::new(Some(LOCK_IN_SYNC));

        sandbox.cmd().assert().success();

        assert_eq!(sandbox.calls(), vec!["ci"]);
    }

    #[test]
    fn failed_ci_falls_back_with_warning() {
        let sandbox = Sandbox::new(Some(LOCK_IN_SYNC));

        sandbox
            .cmd()
            .env("FAKE_NPM_FAIL_CI", "1")
            .assert()
            .success()
            .stderr(predicate::str::contains("command failed"))
            .stdout(predicate::str::contains("Please note the warning(s)"));

        assert_eq!(sandbox.calls(), vec!["ci", "install --no-package-lock"]);
        assert_eq!(sandbox.snapshots().len(), 1);
    }

    #[test]
    fn stale_lock_warns() {
        let sandbox = Sandbox::new(Some(LOCK_STALE));

        sandbox
            .cmd()
            .assert()
            .success()
            .stderr(predicate::str::contains("out of sync"));

        assert_eq!(sandbox.calls(), vec!["install"]);
    }

    #[test]
    fn missing_lock_fails_in_strict_mode() {
        let sandbox = Sandbox::new(None);

        sandbox
            .cmd()
            .arg("--must-have-package-lock")
            .assert()
            .failure()
            .stderr(predicate::str::contains("file is missing"))
            .stderr(predicate::str::contains("Failure"));

        assert!(sandbox.calls().is_empty());
    }

    #[test]
    fn stale_lock_fails_in_strict_mode() {
        let sandbox = Sandbox::new(Some(LOCK_STALE));

        sandbox
            .cmd()
            .args(["install", "--package-lock-must-be-in-sync-when-available"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("is not in sync with"));

        assert!(sandbox.calls().is_empty());
    }

    #[test]
    fn missing_manifest_fails() {
        let sandbox = Sandbox::new(None);
        fs::remove_file(sandbox.project.join("package.json")).unwrap();

        sandbox
            .cmd()
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));

        assert!(sandbox.calls().is_empty());
    }

    #[test]
    fn project_found_from_subdirectory() {
        let sandbox = Sandbox::new(None);
        let nested = sandbox.project.join("src").join("lib");
        fs::create_dir_all(&nested).unwrap();

        let mut cmd = sandbox.cmd();
        cmd.current_dir(&nested).assert().success();

        assert!(node_modules_file(&sandbox.project).is_file());
        assert!(!nested.join("node_modules").exists());
    }

    #[test]
    fn archive_dir_from_environment() {
        let sandbox = Sandbox::new(None);
        let elsewhere = TempDir::new().unwrap();

        sandbox
            .cmd()
            .env("NPM_INSTALL_QUICK_ARCHIVE_DIR", elsewhere.path())
            .assert()
            .success();

        assert!(sandbox.snapshots().is_empty());
        assert_eq!(fs::read_dir(elsewhere.path()).unwrap().count(), 1);
    }
}

mod listing_tests {
    use super::*;

    #[test]
    fn list_empty() {
        let sandbox = Sandbox::new(None);
        sandbox
            .cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_after_install() {
        let sandbox = Sandbox::new(None);
        sandbox.cmd().assert().success();
        let fingerprint = sandbox.fingerprint();

        sandbox
            .cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!(
                "@acme-web-dependencies-{}.tar.gz",
                fingerprint
            )));
    }

    #[test]
    fn status_reports_cache_hit() {
        let sandbox = Sandbox::new(Some(LOCK_IN_SYNC));

        sandbox
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not cached"))
            .stdout(predicate::str::contains("in sync"));

        sandbox.cmd().assert().success();

        sandbox
            .cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("restore snapshot"));
    }
}
