use std::path::PathBuf;

use doctrack_core::LineRange;
use doctrack_difflens::parser::parse_unified_diff;

#[test]
fn parse_patch_without_git_header() {
    let diff = "\
--- /dev/null
+++ b/scripts/bootstrap.py
@@ -0,0 +1,3 @@
+def main():
+    print(\"hello\")
+
";
    let files = parse_unified_diff(diff);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, PathBuf::from("scripts/bootstrap.py"));
    assert_eq!(files[0].hunks[0].hunk.removed, None);
    assert_eq!(files[0].hunks[0].hunk.added, LineRange::new(0, 2));
}

#[test]
fn crlf_diff_is_parsed() {
    let diff = "diff --git a/w.py b/w.py\r\n+++ b/w.py\r\n@@ -2 +2 @@\r\n-a\r\n+b\r\n";
    let files = parse_unified_diff(diff);
    assert_eq!(files[0].path, PathBuf::from("w.py"));
    assert_eq!(files[0].hunks[0].hunk.removed, LineRange::new(1, 1));
}

#[test]
fn same_hunk_header_in_two_files_stays_separate() {
    let diff = "\
diff --git a/a.py b/a.py
+++ b/a.py
@@ -1 +1 @@
-x
+y
diff --git a/b.py b/b.py
+++ b/b.py
@@ -1 +1 @@
-x
+y
";
    let files = parse_unified_diff(diff);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].hunks.len(), 1);
    assert_eq!(files[1].hunks.len(), 1);
    assert_eq!(files[0].hunks[0].hunk, files[1].hunks[0].hunk);
}
