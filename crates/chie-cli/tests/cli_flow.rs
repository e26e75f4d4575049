use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use chie_core::{CredentialVault, SqliteStorage};
use tempfile::TempDir;

const PASSWORD: &str = "correcthorse";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_chie"))
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        for sub in ["home", "config", "data"] {
            std::fs::create_dir_all(dir.path().join(sub)).expect("create sandbox dir");
        }
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn db(&self) -> PathBuf {
        self.path().join("data").join("vault.db")
    }

    fn command(&self, password: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.path().join("home"))
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env("CHIE_DB", self.db())
            .env("CHIE_LOG", "off")
            .env_remove("CHIE_CONFIG")
            .env_remove("CHIE_PASSWORD")
            .env_remove("CHIE_RECOVERY_PHRASE")
            .env_remove("CHIE_EXPORT_PASSPHRASE")
            .env_remove("EDITOR")
            .stdin(Stdio::null());
        if let Some(password) = password {
            cmd.env("CHIE_PASSWORD", password);
        }
        cmd
    }

    fn run(&self, password: Option<&str>, args: &[&str]) -> Output {
        self.command(password)
            .args(args)
            .output()
            .expect("run chie")
    }

    /// Initialize the vault and return the recovery phrase it printed.
    fn init(&self) -> String {
        let output = self.run(Some(PASSWORD), &["init", "--no-input"]);
        assert!(
            output.status.success(),
            "init failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        recovery_phrase(&stdout(&output))
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn recovery_phrase(stdout: &str) -> String {
    let mut lines = stdout.lines();
    lines
        .find(|line| line.starts_with("Your recovery phrase"))
        .expect("phrase header");
    lines
        .map(str::trim)
        .find(|line| !line.is_empty())
        .expect("phrase line")
        .to_string()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn test_init_prints_twelve_word_phrase() {
    let sandbox = Sandbox::new();
    let phrase = sandbox.init();

    assert_eq!(phrase.split('-').count(), 12);
    assert!(sandbox.db().exists());
    assert!(sandbox
        .path()
        .join("config")
        .join("chie")
        .join("config.toml")
        .exists());
}

#[test]
fn test_journal_add_and_list() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let added = sandbox.run(
        Some(PASSWORD),
        &["journal", "add", "--title", "T", "--body", "hello", "--no-input"],
    );
    assert!(added.status.success());

    let list = json(&sandbox.run(Some(PASSWORD), &["journal", "list", "--json", "--no-input"]));
    let entries = list.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "T");
    assert_eq!(entries[0]["content"], "hello");
}

#[test]
fn test_database_holds_no_plaintext() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let added = sandbox.run(
        Some(PASSWORD),
        &["journal", "add", "--body", "a very private thought", "--no-input"],
    );
    assert!(added.status.success());

    let raw = std::fs::read(sandbox.db()).expect("read db");
    assert!(!String::from_utf8_lossy(&raw).contains("a very private thought"));
}

#[test]
fn test_wrong_password_exits_auth_failed() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let output = sandbox.run(Some("wrong-password"), &["task", "list", "--no-input"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Incorrect password"));
}

#[test]
fn test_missing_vault_exits_not_found() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(Some(PASSWORD), &["task", "list", "--no-input"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_weak_password_rejected() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(Some("abc"), &["init", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_second_init_rejected() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let output = sandbox.run(Some(PASSWORD), &["init", "--no-input"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_task_done_and_delete() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let added = sandbox.run(Some(PASSWORD), &["-q", "task", "add", "water plants", "--no-input"]);
    assert!(added.status.success());
    let id = stdout(&added).trim().to_string();
    let prefix = &id[..8];

    let done = sandbox.run(Some(PASSWORD), &["task", "done", prefix, "--no-input"]);
    assert!(done.status.success());
    let tasks = json(&sandbox.run(Some(PASSWORD), &["task", "list", "--json", "--no-input"]));
    assert_eq!(tasks[0]["completed"], true);

    let pending = json(&sandbox.run(
        Some(PASSWORD),
        &["task", "list", "--pending", "--json", "--no-input"],
    ));
    assert!(pending.as_array().expect("array").is_empty());

    let refused = sandbox.run(Some(PASSWORD), &["task", "delete", prefix, "--no-input"]);
    assert_eq!(refused.status.code(), Some(4));

    let deleted = sandbox.run(Some(PASSWORD), &["task", "delete", prefix, "--force", "--no-input"]);
    assert!(deleted.status.success());
    let tasks = json(&sandbox.run(Some(PASSWORD), &["task", "list", "--json", "--no-input"]));
    assert!(tasks.as_array().expect("array").is_empty());
}

#[test]
fn test_events_sorted_by_time() {
    let sandbox = Sandbox::new();
    sandbox.init();

    for (title, at) in [("Later", "2031-06-01T09:00:00Z"), ("Sooner", "2030-01-01")] {
        let added = sandbox.run(
            Some(PASSWORD),
            &["event", "add", title, "--at", at, "--no-input"],
        );
        assert!(added.status.success());
    }

    let events = json(&sandbox.run(Some(PASSWORD), &["event", "list", "--json", "--no-input"]));
    assert_eq!(events[0]["title"], "Sooner");
    assert_eq!(events[1]["title"], "Later");
}

#[test]
fn test_recover_with_phrase_and_export() {
    let sandbox = Sandbox::new();
    let phrase = sandbox.init();
    let added = sandbox.run(Some(PASSWORD), &["task", "add", "call mom", "--no-input"]);
    assert!(added.status.success());

    let backup = sandbox.path().join("backup.json");
    let output = sandbox
        .command(None)
        .env("CHIE_RECOVERY_PHRASE", format!("  {}  ", phrase.to_uppercase()))
        .args(["recover", "--no-input", "--export"])
        .arg(&backup)
        .output()
        .expect("run chie");
    assert!(
        output.status.success(),
        "recover failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains("Recovery phrase accepted"));

    let bundle: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&backup).expect("read backup")).expect("json");
    assert_eq!(bundle["tasks"][0]["text"], "call mom");
    assert!(bundle["appVersion"].as_str().expect("version").starts_with("Chie "));
}

#[test]
fn test_wrong_recovery_phrase_exits_auth_failed() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let output = sandbox
        .command(None)
        .env("CHIE_RECOVERY_PHRASE", "not-the-right-phrase")
        .args(["recover", "--no-input"])
        .output()
        .expect("run chie");
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_status_does_not_need_password() {
    let sandbox = Sandbox::new();

    let before = json(&sandbox.run(None, &["status", "--json"]));
    assert_eq!(before["exists"], false);

    sandbox.init();
    let after = json(&sandbox.run(None, &["status", "--json"]));
    assert_eq!(after["configured"], true);
    assert_eq!(after["recovery"], true);
    assert_eq!(after["rows"]["journals"], 0);
}

#[test]
fn test_legacy_files_imported_on_init() {
    let sandbox = Sandbox::new();
    let legacy = sandbox.path().join("legacy");
    std::fs::create_dir_all(&legacy).expect("create legacy dir");
    std::fs::write(
        legacy.join("tasks.json"),
        r#"[{"id": 1700000000000, "text": "old task", "completed": false, "createdAt": "2023-11-14T22:13:20.000Z"}]"#,
    )
    .expect("write legacy tasks");
    std::fs::write(
        legacy.join("journalEntries.json"),
        r#"[{"id": 1700000000001, "title": "Old day", "content": "calm", "date": "2023-11-15T08:00:00.000Z",
            "sentiment": {"pleasure": 0.4, "arousal": -0.3, "dominance": 0}}]"#,
    )
    .expect("write legacy journals");
    std::fs::write(
        legacy.join("events.json"),
        r#"[{"id": 1700000000002, "title": "Dentist", "dateTime": "2030-02-01T15:30",
            "description": "", "createdAt": "2023-11-15T08:05:00.000Z"}]"#,
    )
    .expect("write legacy events");

    let output = sandbox
        .command(Some(PASSWORD))
        .args(["init", "--no-input", "--legacy-dir"])
        .arg(&legacy)
        .output()
        .expect("run chie");
    assert!(output.status.success());
    for file in ["tasks.json", "journalEntries.json", "events.json"] {
        assert!(!legacy.join(file).exists(), "{} should be removed", file);
    }

    let tasks = json(&sandbox.run(Some(PASSWORD), &["task", "list", "--json", "--no-input"]));
    assert_eq!(tasks[0]["text"], "old task");
    let journals = json(&sandbox.run(Some(PASSWORD), &["journal", "list", "--json", "--no-input"]));
    assert_eq!(journals[0]["sentiment"]["pleasure"], 0.4);
    let events = json(&sandbox.run(Some(PASSWORD), &["event", "list", "--json", "--no-input"]));
    assert_eq!(events[0]["title"], "Dentist");
}

#[test]
fn test_unreadable_legacy_file_kept() {
    let sandbox = Sandbox::new();
    let legacy = sandbox.path().join("legacy");
    std::fs::create_dir_all(&legacy).expect("create legacy dir");
    std::fs::write(
        legacy.join("tasks.json"),
        r#"[{"id": 1, "text": "fine", "completed": false, "createdAt": "2023-11-14T22:13:20Z"}, {"id": 2}]"#,
    )
    .expect("write legacy tasks");

    let output = sandbox
        .command(Some(PASSWORD))
        .args(["init", "--no-input", "--legacy-dir"])
        .arg(&legacy)
        .output()
        .expect("run chie");
    assert!(output.status.success());
    assert!(legacy.join("tasks.json").exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Kept tasks.json"));

    let tasks = json(&sandbox.run(Some(PASSWORD), &["task", "list", "--json", "--no-input"]));
    assert_eq!(tasks.as_array().expect("array").len(), 1);
}

#[test]
fn test_init_adds_missing_recovery_phrase() {
    let sandbox = Sandbox::new();
    let mut vault = CredentialVault::new(SqliteStorage::open(&sandbox.db()).expect("open db"));
    vault.setup_password(PASSWORD).expect("set password");
    drop(vault);

    let before = json(&sandbox.run(None, &["status", "--json"]));
    assert_eq!(before["recovery"], false);

    let wrong = sandbox.run(Some("wrong-password"), &["init", "--no-input"]);
    assert_eq!(wrong.status.code(), Some(5));

    let phrase = sandbox.init();
    let after = json(&sandbox.run(None, &["status", "--json"]));
    assert_eq!(after["recovery"], true);

    let recovered = sandbox
        .command(None)
        .env("CHIE_RECOVERY_PHRASE", &phrase)
        .args(["recover", "--no-input"])
        .output()
        .expect("run chie");
    assert!(recovered.status.success());

    let again = sandbox.run(Some(PASSWORD), &["init", "--no-input"]);
    assert_eq!(again.status.code(), Some(4));
}

#[test]
fn test_journal_sentiment_scores() {
    let sandbox = Sandbox::new();
    sandbox.init();

    let added = sandbox.run(
        Some(PASSWORD),
        &[
            "journal", "add", "--title", "Mood", "--body", "ok", "--sentiment", "-0.5,0.25,0",
            "--no-input",
        ],
    );
    assert!(added.status.success());
    let journals = json(&sandbox.run(Some(PASSWORD), &["journal", "list", "--json", "--no-input"]));
    assert_eq!(journals[0]["sentiment"]["pleasure"], -0.5);
    assert_eq!(journals[0]["sentiment"]["arousal"], 0.25);

    let refused = sandbox.run(
        Some(PASSWORD),
        &["journal", "add", "--body", "x", "--sentiment", "happy", "--no-input"],
    );
    assert_eq!(refused.status.code(), Some(4));
}

#[test]
fn test_sealed_export_needs_passphrase() {
    let sandbox = Sandbox::new();
    sandbox.init();
    let out = sandbox.path().join("backup.json.age");

    let refused = sandbox
        .command(Some(PASSWORD))
        .args(["export", "--seal", "--no-input", "--output"])
        .arg(&out)
        .output()
        .expect("run chie");
    assert_eq!(refused.status.code(), Some(4));

    let sealed = sandbox
        .command(Some(PASSWORD))
        .env("CHIE_EXPORT_PASSPHRASE", "backup-passphrase")
        .args(["export", "--seal", "--no-input", "--output"])
        .arg(&out)
        .output()
        .expect("run chie");
    assert!(sealed.status.success());
    let raw = std::fs::read(&out).expect("read sealed backup");
    assert!(raw.starts_with(b"age-encryption.org"));
}
