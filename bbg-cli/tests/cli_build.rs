use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[allow(deprecated)]
fn bbg() -> Command {
    Command::cargo_bin("bbg").expect("bbg binary")
}

#[test]
fn init_then_build_produces_site() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    bbg().arg("init").arg(dir.path()).assert().success();
    assert!(dir.path().join("config.yml").is_file());
    assert!(dir.path().join("www/posts/welcome.md").is_file());

    bbg()
        .arg("--config")
        .arg(dir.path().join("config.yml"))
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 1 posts"));

    let build = dir.path().join("build");
    assert!(build.join("index.html").is_file());
    assert!(build.join("main.css").is_file());
    assert!(build.join("rss.xml").is_file());
    assert!(build.join("pages/about.html").is_file());
    assert!(build.join("posts/2025-01-welcome-to-bbg.html").is_file());

    let index = fs::read_to_string(build.join("index.html"))?;
    assert!(index.contains("Welcome to bbg"));

    Ok(())
}

#[test]
fn build_fails_on_post_without_date() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let posts = dir.path().join("www/posts");
    fs::create_dir_all(&posts)?;
    fs::write(dir.path().join("config.yml"), "title: Broken\n")?;
    fs::write(posts.join("broken.md"), "# Undated\n\nNo front matter.\n")?;

    bbg()
        .arg("--config")
        .arg(dir.path().join("config.yml"))
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.md"));

    assert!(!dir.path().join("build").exists());
    Ok(())
}

#[test]
fn new_creates_post_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("config.yml");
    fs::write(&config, "title: Fresh\n")?;

    bbg()
        .arg("--config")
        .arg(&config)
        .args(["new", "Hello, World!", "--date", "2024-05-01"])
        .assert()
        .success();

    let post = dir.path().join("www/posts/hello-world.md");
    let text = fs::read_to_string(&post)?;
    assert!(text.contains("date: 2024-05-01T00:00:00Z"));
    assert!(text.contains("# Hello, World!"));

    // A second post with the same slug is refused
    bbg()
        .arg("--config")
        .arg(&config)
        .args(["new", "Hello World", "--date", "2024-05-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    bbg().arg("--config").arg(&config).arg("build").assert().success();
    assert!(dir
        .path()
        .join("build/posts/2024-05-hello-world.html")
        .is_file());

    Ok(())
}

#[test]
fn missing_config_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    bbg()
        .arg("--config")
        .arg(dir.path().join("nope.yml"))
        .arg("build")
        .assert()
        .success();

    assert!(dir.path().join("build/index.html").is_file());
    Ok(())
}
