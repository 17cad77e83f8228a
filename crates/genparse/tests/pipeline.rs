use genparse::app::features::fallback_features;
use genparse::app::pipeline::{Pipeline, run};
use genparse::app::{detect, extract, sanitize};
use genparse::domain::model::{DEFAULT_LANGUAGE, DEFAULT_PATH, GeneratedFile};

const DASHBOARD: &str = include_str!("fixtures/dashboard.md");

#[test]
fn prose_without_fences_passes_through() {
    let inputs = ["", "plain words", "inline `code` and ``more``", "md: not a class"];
    for raw in inputs {
        let artifacts = run(raw);
        assert!(artifacts.parse.files.is_empty(), "{raw:?}");
        assert_eq!(artifacts.parse.narrative, raw);
        assert_eq!(artifacts.features, fallback_features());
        assert_eq!(artifacts.tree, "");
    }
}

#[test]
fn named_fences_become_files_in_order() {
    let files = extract(DASHBOARD);
    let paths: Vec<_> = files.iter().map(|file| file.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "app/page.tsx",
            "app/components/task-form.tsx",
            "app/api/tasks/route.ts",
            "package.json",
        ]
    );
    assert_eq!(files[3].language, "json");
    for file in &files {
        assert!(!file.content.contains("```"));
        assert_eq!(file.content, file.content.trim());
    }
}

#[test]
fn unnamed_fences_fall_back_to_single_file() {
    let raw = "Step one:\n```bash\nnpm i\n```\nStep two:\n```\nnpm run dev\n```";
    assert_eq!(
        extract(raw),
        vec![GeneratedFile::new(
            DEFAULT_PATH,
            "npm i\n\nnpm run dev",
            DEFAULT_LANGUAGE
        )]
    );
}

#[test]
fn narrative_keeps_prose_and_is_idempotent() {
    let narrative = sanitize(DASHBOARD);
    assert_eq!(narrative.matches("[Code Block]").count(), 4);
    assert!(narrative.starts_with("I've created a task dashboard"));
    assert!(narrative.ends_with("Run `npm install` to get started.\n"));
    assert_eq!(sanitize(&narrative), narrative);
}

#[test]
fn trigger_term_replaces_fallback_entirely() {
    let before = detect("A recipe browser.");
    assert_eq!(before, fallback_features());

    let after = detect("A recipe browser with a route handler.");
    let names: Vec<_> = after.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["API Integration"]);
}

#[test]
fn single_named_block_end_to_end() {
    let parse = Pipeline::default().parse("Here:\n```tsx file=\"app/page.tsx\"\napp code\n```\nDone.");
    assert_eq!(
        parse.files,
        vec![GeneratedFile::new("app/page.tsx", "app code", "tsx")]
    );
    assert_eq!(parse.narrative, "Here:\n[Code Block]\nDone.");
}
