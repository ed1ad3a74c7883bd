use std::{fs, path::PathBuf, process, time::Duration};

use escape_maze_core::{Upgrade, UpgradeTuning};
use escape_maze_persistence::{UserStore, FILE_VERSION};
use escape_maze_system_progression::{Profile, ProfileData, Roster};

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("escape-maze-{name}-{}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("scratch dir");
        Self { dir }
    }

    fn file(&self) -> PathBuf {
        self.dir.join("users.json")
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn played(name: &str, top_score: u32) -> Profile {
    Profile::from_data(
        ProfileData {
            username: name.to_owned(),
            level: 2,
            top_score,
            armor: 1,
            balance: 900,
            upgrades: Upgrade::NicerWalls.bit(),
            best_time_ms: 95_000,
        },
        &UpgradeTuning::default(),
    )
    .expect("valid profile")
}

#[test]
fn missing_file_means_no_users() {
    let scratch = Scratch::new("missing");
    let store = UserStore::new(scratch.file());

    assert!(store.import_users(&UpgradeTuning::default()).is_empty());
    assert!(!store.backup_path().exists());
}

#[test]
fn export_skips_users_who_never_played() {
    let scratch = Scratch::new("export");
    let store = UserStore::new(scratch.file());
    let tuning = UpgradeTuning::default();
    let fresh = Profile::new("newbie", &tuning).expect("valid");

    let written = store
        .export_users(&[played("ada", 410), fresh])
        .expect("writable");
    assert_eq!(written, 1);

    let users = store.import_users(&tuning);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username(), "ada");
    assert_eq!(users[0].top_score(), 410);
    assert_eq!(users[0].best_time(), Duration::from_millis(95_000));
    assert!(users[0].upgrades().contains(Upgrade::NicerWalls));
    assert_eq!(users[0].rules().wall_penalty, 10);
}

#[test]
fn corrupt_file_is_moved_aside() {
    let scratch = Scratch::new("corrupt");
    let store = UserStore::new(scratch.file());
    fs::write(scratch.file(), "<users><user/></users>").expect("writable");

    assert!(store.import_users(&UpgradeTuning::default()).is_empty());
    assert!(!scratch.file().exists());
    assert_eq!(
        fs::read_to_string(store.backup_path()).expect("backup exists"),
        "<users><user/></users>"
    );
}

#[test]
fn malformed_records_are_skipped() {
    let scratch = Scratch::new("malformed");
    let store = UserStore::new(scratch.file());
    let contents = format!(
        r#"{{
            "version": {FILE_VERSION},
            "users": [
                {{ "username": "ok", "level": 1, "top_score": 5, "armor": 0, "balance": 0, "upgrades": 0, "best_time_ms": 1000 }},
                {{ "username": "zero", "level": 0, "top_score": 5, "armor": 0, "balance": 0, "upgrades": 0, "best_time_ms": 1000 }},
                {{ "username": "partial", "level": 1 }},
                {{ "username": "negative", "level": 1, "top_score": -4, "armor": 0, "balance": 0, "upgrades": 0, "best_time_ms": 1000 }}
            ]
        }}"#
    );
    fs::write(scratch.file(), contents).expect("writable");

    let users = store.import_users(&UpgradeTuning::default());

    let names: Vec<&str> = users.iter().map(Profile::username).collect();
    assert_eq!(names, vec!["ok"]);
    assert!(scratch.file().exists());
}

#[test]
fn flush_writes_the_last_commit_once() {
    let scratch = Scratch::new("flush");
    let store = UserStore::new(scratch.file());
    let handler_copy = store.clone();

    assert!(!store.flush().expect("nothing staged"));
    assert!(!scratch.file().exists());

    store.commit(&Roster::new(vec![played("ada", 10)]));
    store.commit(&Roster::new(vec![played("ada", 10), played("bob", 20)]));

    assert!(handler_copy.flush().expect("writable"));
    assert!(!store.flush().expect("already flushed"));

    let users = store.import_users(&UpgradeTuning::default());
    let names: Vec<&str> = users.iter().map(Profile::username).collect();
    assert_eq!(names, vec!["ada", "bob"]);
}
