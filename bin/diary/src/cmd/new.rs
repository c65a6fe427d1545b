//! New command - create a journal entry

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use color_eyre::eyre::{Result, WrapErr};

use super::load_site;

/// Tags given to every new entry.
const DEFAULT_TAGS: &[&str] = &["daily", "notes"];

/// Run the new command.
///
/// Creates `<source_dir>/_posts/<timestamp>.md` with boilerplate frontmatter.
/// Without a title the entry is titled after the current time.
pub fn run(dir: &Path, title: Option<&str>) -> Result<PathBuf> {
    let site = load_site(dir)?;
    let posts_dir = site.posts_dir();

    if !posts_dir.exists() {
        fs::create_dir_all(&posts_dir).wrap_err("Failed to create posts directory")?;
        tracing::info!(?posts_dir, "Created posts directory");
    }

    let path = create_post(&posts_dir, title, Local::now())?;

    tracing::info!(?path, "Created new entry");
    println!("Created: {}", path.display());

    Ok(path)
}

/// Write a new entry for `now` into `posts_dir`, failing if the file exists.
fn create_post(posts_dir: &Path, title: Option<&str>, now: DateTime<Local>) -> Result<PathBuf> {
    let path = posts_dir.join(format!("{}.md", now.format("%Y-%m-%d-%H-%M-%S")));

    let default_title = now.format("%Y-%m-%d %H:%M").to_string();
    let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(&default_title);
    let date = now.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    file.write_all(post_template(title, &date).as_bytes())
        .wrap_err("Failed to write file")?;

    Ok(path)
}

fn post_template(title: &str, date: &str) -> String {
    let tags: String = DEFAULT_TAGS.iter().map(|t| format!("- {t}\n")).collect();

    format!(
        r#"---
title: {title}
date: {date}
tags:
{tags}---

Your new entry is ready. Edit this file to write it.

> Written with Diary
"#,
        title = yaml_string(title),
    )
}

/// Double-quoted YAML scalar.
fn yaml_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
