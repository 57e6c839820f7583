//! Template setup - substitutes `{{APP_NAME}}`-style placeholders across a
//! project tree.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;
use crate::{Error, Result};

pub const APP_NAME: &str = "{{APP_NAME}}";
pub const APP_DESCRIPTION: &str = "{{APP_DESCRIPTION}}";
pub const AUTHOR_NAME: &str = "{{AUTHOR_NAME}}";
pub const APP_ID: &str = "{{APP_ID}}";

/// Directories never descended into
pub const EXCLUDE_DIRS: &[&str] = &[
    "node_modules", ".git", "dist", "dist-electron", "release", "scripts", "target",
];

/// Extensions of files that may contain placeholders. Dotfiles are always
/// included.
pub const INCLUDE_EXTENSIONS: &[&str] = &[
    "js", "ts", "tsx", "json", "json5", "md", "html", "toml", "rs",
];

fn app_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(\.[a-z][a-z0-9]*)*$").expect("static regex"))
}

fn camel_boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("static regex"))
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s_]+").expect("static regex"))
}

/// Reverse-domain identifier: lowercase segments separated by dots, each
/// starting with a letter.
pub fn validate_app_id(app_id: &str) -> bool {
    app_id_regex().is_match(app_id)
}

/// `MyApp name_here` -> `my-app-name-here`
pub fn kebab_case(s: &str) -> String {
    let s = camel_boundary_regex().replace_all(s, "$1-$2");
    separator_regex().replace_all(&s, "-").to_lowercase()
}

/// Reduce text to a valid app id segment
fn id_segment(s: &str) -> String {
    let segment: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match segment.chars().next() {
        Some(c) if c.is_ascii_lowercase() => segment,
        _ => format!("app{}", segment),
    }
}

/// `com.<author>.<app>`, always a valid app id
pub fn suggested_app_id(author_name: &str, app_name: &str) -> String {
    format!("com.{}.{}", id_segment(author_name), id_segment(&kebab_case(app_name)))
}

/// Values substituted for each placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub app_name: String,
    pub app_description: String,
    pub author_name: String,
    pub app_id: String,
}

impl TemplateVars {
    /// Validate inputs. `app_id` defaults to [`suggested_app_id`].
    pub fn new(
        app_name: &str,
        app_description: &str,
        author_name: &str,
        app_id: Option<&str>,
    ) -> Result<Self> {
        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(Error::Setup("App name is required".to_string()));
        }

        let app_id = match app_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => suggested_app_id(author_name.trim(), app_name),
        };
        if !validate_app_id(&app_id) {
            return Err(Error::Setup(format!(
                "Invalid app ID format '{}'. Use reverse domain notation (e.g., com.company.appname)",
                app_id
            )));
        }

        Ok(Self {
            app_name: app_name.to_string(),
            app_description: app_description.trim().to_string(),
            author_name: author_name.trim().to_string(),
            app_id,
        })
    }

    pub fn replacements(&self) -> [(&'static str, &str); 4] {
        [
            (APP_NAME, self.app_name.as_str()),
            (APP_DESCRIPTION, self.app_description.as_str()),
            (AUTHOR_NAME, self.author_name.as_str()),
            (APP_ID, self.app_id.as_str()),
        ]
    }

    /// Apply every replacement. `None` when no placeholder occurs.
    pub fn apply(&self, content: &str) -> Option<String> {
        let replacements = self.replacements();
        if !replacements.iter().any(|(placeholder, _)| content.contains(placeholder)) {
            return None;
        }

        let mut content = content.to_string();
        for (placeholder, value) in replacements {
            content = content.replace(placeholder, value);
        }
        Some(content)
    }
}

/// Result of a setup run
#[derive(Debug, Default)]
pub struct SetupReport {
    pub scanned: usize,
    pub updated: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

fn is_candidate(path: &Path) -> bool {
    let dotfile = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    dotfile || INCLUDE_EXTENSIONS.contains(&extension)
}

/// Files under `root` that may carry placeholders, sorted
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::Setup(format!("{} is not a directory", root.display())));
    }

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let excluded = entry
                .file_name()
                .to_str()
                .is_some_and(|name| EXCLUDE_DIRS.contains(&name));
            entry.depth() == 0 || !(is_dir && excluded)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                if is_candidate(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Skipping unreadable entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Rewrite one file in place. Returns whether it contained placeholders.
pub fn replace_in_file(path: &Path, vars: &TemplateVars, dry_run: bool) -> Result<bool> {
    let content = std::fs::read_to_string(path)?;
    match vars.apply(&content) {
        Some(updated) => {
            if !dry_run {
                std::fs::write(path, updated)?;
            }
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Substitute placeholders in `files`, as returned by [`collect_files`] for
/// `root`. Report paths are relative to `root`.
///
/// A file that cannot be read or written is recorded in the report and the
/// run continues. `on_file` is called once per scanned file.
pub fn run(
    root: &Path,
    files: &[PathBuf],
    vars: &TemplateVars,
    dry_run: bool,
    mut on_file: impl FnMut(&Path),
) -> SetupReport {
    let mut report = SetupReport::default();

    for file in files {
        on_file(file);
        report.scanned += 1;
        let relative = file.strip_prefix(root).unwrap_or(file).to_path_buf();
        match replace_in_file(file, vars, dry_run) {
            Ok(true) => {
                tracing::debug!("Updated {}", relative.display());
                report.updated.push(relative);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Error processing {}: {}", relative.display(), e);
                report.failed.push((relative, e.to_string()));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn vars() -> TemplateVars {
        TemplateVars::new("My Awesome App", "Does things", "Jane Doe", None).unwrap()
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("My Awesome App"), "my-awesome-app");
        assert_eq!(kebab_case("myCoolApp"), "my-cool-app");
        assert_eq!(kebab_case("snake_case  name"), "snake-case-name");
    }

    #[test]
    fn test_validate_app_id() {
        assert!(validate_app_id("com.company.appname"));
        assert!(validate_app_id("app"));
        assert!(validate_app_id("com.a1.b2"));
        assert!(!validate_app_id("com.my-app"));
        assert!(!validate_app_id("Com.company"));
        assert!(!validate_app_id("com..app"));
        assert!(!validate_app_id("1com.app"));
        assert!(!validate_app_id(""));
    }

    #[test]
    fn test_suggested_app_id_is_valid() {
        assert_eq!(suggested_app_id("Jane Doe", "My Awesome App"), "com.janedoe.myawesomeapp");
        assert_eq!(suggested_app_id("", "42 Things"), "com.app.app42things");
        assert!(validate_app_id(&suggested_app_id("Ünïcode Ñame", "My_App!")));
    }

    #[test]
    fn test_vars_validation() {
        assert!(matches!(TemplateVars::new("  ", "", "", None), Err(Error::Setup(_))));
        assert!(matches!(
            TemplateVars::new("App", "", "", Some("Not.Valid")),
            Err(Error::Setup(_))
        ));

        let explicit = TemplateVars::new("App", "", "Me", Some("org.me.app")).unwrap();
        assert_eq!(explicit.app_id, "org.me.app");
        assert_eq!(vars().app_id, "com.janedoe.myawesomeapp");
    }

    #[test]
    fn test_apply_replaces_all_occurrences() {
        let out = vars()
            .apply("{{APP_NAME}} by {{AUTHOR_NAME}} ({{APP_ID}}): {{APP_DESCRIPTION}} - {{APP_NAME}}")
            .unwrap();
        assert_eq!(
            out,
            "My Awesome App by Jane Doe (com.janedoe.myawesomeapp): Does things - My Awesome App"
        );
        assert!(vars().apply("nothing to see").is_none());
    }

    #[test]
    fn test_run_over_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("package.json"), r#"{"name": "{{APP_NAME}}"}"#).unwrap();
        fs::write(root.join(".env"), "APP_ID={{APP_ID}}").unwrap();
        fs::write(root.join("README.md"), "no placeholders").unwrap();
        fs::write(root.join("logo.png"), "{{APP_NAME}}").unwrap();
        fs::create_dir_all(root.join("node_modules/dep")).unwrap();
        fs::write(root.join("node_modules/dep/index.js"), "{{APP_NAME}}").unwrap();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/main.ts"), "const name = '{{APP_NAME}}'").unwrap();

        let mut seen = 0;
        let files = collect_files(root).unwrap();
        let report = run(root, &files, &vars(), false, |_| seen += 1);

        assert_eq!(report.scanned, 4);
        assert_eq!(seen, 4);
        assert!(report.failed.is_empty());
        assert_eq!(
            report.updated,
            vec![PathBuf::from(".env"), PathBuf::from("package.json"), PathBuf::from("src/main.ts")]
        );
        assert_eq!(
            fs::read_to_string(root.join("package.json")).unwrap(),
            r#"{"name": "My Awesome App"}"#
        );
        assert_eq!(fs::read_to_string(root.join("logo.png")).unwrap(), "{{APP_NAME}}");
        assert_eq!(
            fs::read_to_string(root.join("node_modules/dep/index.js")).unwrap(),
            "{{APP_NAME}}"
        );
    }

    #[test]
    fn test_dry_run_leaves_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        fs::write(&file, "<title>{{APP_NAME}}</title>").unwrap();

        let files = collect_files(dir.path()).unwrap();
        let report = run(dir.path(), &files, &vars(), true, |_| {});
        assert_eq!(report.updated, vec![PathBuf::from("index.html")]);
        assert_eq!(fs::read_to_string(&file).unwrap(), "<title>{{APP_NAME}}</title>");
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("good.json"), "{{APP_ID}}").unwrap();

        let files = collect_files(dir.path()).unwrap();
        let report = run(dir.path(), &files, &vars(), false, |_| {});
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, PathBuf::from("bad.json"));
        assert_eq!(report.updated, vec![PathBuf::from("good.json")]);
    }

    #[test]
    fn test_run_only_touches_given_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), "{{APP_NAME}}").unwrap();
        let files = collect_files(dir.path()).unwrap();
        fs::write(dir.path().join("late.json"), "{{APP_NAME}}").unwrap();

        let report = run(dir.path(), &files, &vars(), false, |_| {});
        assert_eq!(report.scanned, 1);
        assert_eq!(report.updated, vec![PathBuf::from("a.json")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("late.json")).unwrap(),
            "{{APP_NAME}}"
        );
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(collect_files(&dir.path().join("missing")), Err(Error::Setup(_))));
    }
}
