//! End-to-end tests for the Diary content pipeline.
//!
//! Each test lays out a small site in a temp directory and drives the public API
//! the same way the `build` and `server` commands do.

use std::{fs, path::Path};

use chrono::Datelike;
use diary_core::Site;
use diary_generator::{
    ArchiveIndex, Builder, Page, PostCollector, ThemeRenderer, global_context,
};
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, content).expect("write file");
}

fn journal() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "_config.yml",
        "title: Field Notes\ntheme: plain\nauthor: me\n",
    );
    write(dir.path(), "themes/plain/_config.yml", "accent: green\n");
    write(
        dir.path(),
        "source/_posts/january.md",
        "---\ntitle: January\ndate: 2024-01-01\ntags: [winter]\n---\nCold start.",
    );
    write(
        dir.path(),
        "source/_posts/june.md",
        "---\ntitle: June\ndate: 2024-06-01\ntags: [summer]\n---\nWarm *days*.",
    );
    dir
}

#[test]
fn test_two_posts_order_and_archive() {
    let dir = journal();
    let site = Site::load(dir.path()).expect("load site");

    let posts = PostCollector::new(&site).collect();
    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["June", "January"]);

    // no marker: the excerpt is the whole content
    for post in &posts {
        assert_eq!(post.excerpt, post.content);
    }

    let archives = ArchiveIndex::build(&posts);
    assert_eq!(archives.years(), vec![2024]);
    assert_eq!(archives.months(2024), vec![1, 6]);
    assert_eq!(archives.get(2024, 1).expect("january")[0].id, "january");
    assert_eq!(archives.get(2024, 6).expect("june")[0].id, "june");
    assert_eq!(archives.len(), 2);
}

#[test]
fn test_malformed_post_is_dropped() {
    let dir = journal();
    write(
        dir.path(),
        "source/_posts/broken.md",
        "---\ntitle: \"unterminated\n---\nbody",
    );

    let site = Site::load(dir.path()).expect("load site");
    let posts = PostCollector::new(&site).collect();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.id != "broken"));
}

#[test]
fn test_post_date_is_local() {
    let dir = journal();
    write(
        dir.path(),
        "source/_posts/spring.md",
        "---\ntitle: Spring\ndate: 2024-03-15 23:30:00\n---\nLate.",
    );

    let site = Site::load(dir.path()).expect("load site");
    let posts = PostCollector::new(&site).collect();
    let spring = posts.iter().find(|p| p.id == "spring").expect("spring");

    assert_eq!(
        (spring.date.year(), spring.date.month(), spring.date.day()),
        (2024, 3, 15)
    );
    let archives = ArchiveIndex::build(&posts);
    assert_eq!(archives.get(2024, 3).map(<[_]>::len), Some(1));
}

#[test]
fn test_page_only_theme_renders_every_page() {
    let dir = journal();
    write(
        dir.path(),
        "themes/plain/layout/page.html",
        "{{ page.title }}/{{ config.accent }}/{{ config.theme_config.accent }}",
    );

    let site = Site::load(dir.path()).expect("load site");
    let posts = PostCollector::new(&site).collect();
    let archives = ArchiveIndex::build(&posts);
    let renderer = ThemeRenderer::new(
        &site.theme_dir(),
        global_context(site.config(), false).expect("globals"),
    )
    .expect("renderer");

    for name in ["index", "post", "archives", "about"] {
        assert_eq!(renderer.resolve(name).expect("resolve"), "page.html");
    }

    let pages = [
        (Page::Index { posts: &posts }, "Field Notes"),
        (Page::Post(&posts[0]), "June"),
        (Page::Archives(&archives), "Archives"),
        (Page::About, "About"),
    ];
    for (page, title) in pages {
        let html = renderer
            .render(page.name(), page.context(site.config()).expect("context"))
            .expect("render");
        assert_eq!(html, format!("{title}/green/green"));
    }
}

#[test]
fn test_build_writes_site() {
    let dir = journal();
    write(
        dir.path(),
        "themes/plain/layout/index.html",
        "{% for post in posts %}{{ post.id }};{% endfor %}",
    );
    write(
        dir.path(),
        "themes/plain/layout/post.html",
        "<h1>{{ post.title }}</h1>{{ post.content | safe }}",
    );
    write(
        dir.path(),
        "themes/plain/layout/archives.html",
        "{% for y in archives %}{{ y.year }}:{% for m in y.months %}{{ m.month }}({{ m.posts | length }}){% endfor %}{% endfor %}",
    );
    write(
        dir.path(),
        "themes/plain/layout/page.html",
        "{{ page.title }}",
    );

    let site = Site::load(dir.path()).expect("load site");
    let stats = Builder::new(&site).build().expect("build");

    assert!(stats.is_success());
    assert_eq!(stats.posts, 2);
    assert_eq!(stats.pages, 5);

    let public = dir.path().join("public");
    let read = |rel: &str| fs::read_to_string(public.join(rel)).expect(rel);

    assert_eq!(read("index.html"), "june;january;");
    assert_eq!(read("post/june.html"), "<h1>June</h1><p>Warm <em>days</em>.</p>\n");
    assert!(public.join("post/january.html").exists());
    assert_eq!(read("archives/index.html"), "2024:6(1)1(1)");
    assert_eq!(read("about/index.html"), "About");
}

#[test]
fn test_missing_template_fails_build_pages() {
    let dir = journal();
    write(dir.path(), "themes/plain/layout/post.html", "{{ post.title }}");

    let site = Site::load(dir.path()).expect("load site");
    let stats = Builder::new(&site).build().expect("build");

    // only the two posts resolve
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.failed.len(), 3);
    assert!(!stats.is_success());
}
