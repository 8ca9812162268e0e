//! Engine runs over diffs touching several languages at once.

use doctrack_check::{Checker, MemoryContent, Report, StaticDiff};
use doctrack_core::{DocTrackConfig, Hunk, LineRange};

const DIFF: &str = "\
diff --git a/web/app.js b/web/app.js
index 1111111..2222222 100644
--- a/web/app.js
+++ b/web/app.js
@@ -4 +4 @@ class Cart {
-    return this.items.length;
+    return this.items.length + 1;
diff --git a/web/index.html b/web/index.html
index 3333333..4444444 100644
--- a/web/index.html
+++ b/web/index.html
@@ -5 +5 @@
-    <p>Old text</p>
+    <p>New text</p>
diff --git a/src/lib.rs b/src/lib.rs
index 5555555..6666666 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -2 +2 @@ fn add(a: i32, b: i32) -> i32 {
-    a + b
+    b + a
";

const APP_JS: &str = "\
// @doc api.md
class Cart {
  count() {
    return this.items.length;
  }
}
";

const INDEX_HTML: &str = "\
<html>
  <body>
    <!-- @doc -->
    <section>
    <p>Old text</p>
    </section>
  </body>
</html>
";

const INDEX_HTML_NEW: &str = "\
<html>
  <body>
    <!-- @doc -->
    <section>
    <p>New text</p>
    </section>
  </body>
</html>
";

const LIB_RS: &str = "\
fn add(a: i32, b: i32) -> i32 {
    a + b
}
";

fn content() -> MemoryContent {
    MemoryContent::new()
        .with_file("web/app.js", Some("HEAD"), APP_JS)
        .with_file("web/index.html", Some("HEAD"), INDEX_HTML)
        .with_file("web/index.html", None, INDEX_HTML_NEW)
        .with_file("src/lib.rs", Some("HEAD"), LIB_RS)
        .with_file("src/lib.rs", None, LIB_RS.replace("a + b", "b + a"))
}

fn checker() -> Checker {
    let config = DocTrackConfig::from_toml("tags = [\"@doc\"]").unwrap();
    Checker::from_config(&config).unwrap()
}

#[test]
fn tags_resolve_per_language() {
    let outcome = checker().check(&StaticDiff::new(DIFF), &content()).unwrap();

    assert!(outcome.tracked.contains(
        "web/app.js",
        &Hunk::new(LineRange::new(3, 3), LineRange::new(3, 3))
    ));
    assert!(outcome.tracked.contains(
        "web/index.html",
        &Hunk::new(LineRange::new(4, 4), LineRange::new(4, 4))
    ));
    assert!(outcome.tracked.get("src/lib.rs").is_none());
    assert_eq!(outcome.tracked.len(), 2);
    assert_eq!(outcome.hunks_checked(), 3);
}

#[test]
fn report_lists_files_in_path_order() {
    let outcome = checker().check(&StaticDiff::new(DIFF), &content()).unwrap();
    let report = Report::new(&outcome);
    let paths: Vec<String> = report
        .files
        .iter()
        .map(|f| f.path.display().to_string())
        .collect();
    assert_eq!(paths, vec!["web/app.js", "web/index.html"]);
}

#[test]
fn excluded_directory_is_skipped() {
    let config = DocTrackConfig::from_toml("tags = [\"@doc\"]\nexclude = [\"web/**\"]").unwrap();
    let outcome = Checker::from_config(&config)
        .unwrap()
        .check(&StaticDiff::new(DIFF), &content())
        .unwrap();
    assert!(outcome.tracked.is_empty());
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.files.len(), 1);
}
