//! Registration of new projects in the pipe-delimited allow-list file.
//!
//! Each line reads `identity|field|field|field|project,project,...|...`. Only
//! lines of the configured identity are touched; every other line is written
//! back verbatim. The file is rewritten without locking, so callers must not
//! register projects concurrently.

use std::{fs, io::ErrorKind, path::Path};

use tracing::{debug, info, warn};

use crate::{error::AppError, report::StepWarning};

/// Field holding the comma-separated project names
const PROJECTS_FIELD: usize = 4;

/// Outcome of a registration attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// No allow-list file exists
    Skipped,
    /// The project was appended to this many lines
    Added(usize),
    /// Matching lines already listed the project, or no line matched
    Unchanged,
}

/// Adds `project_name` to the allow-list entries of `identity`
///
/// Never fails: I/O errors are logged and returned as a warning.
pub fn register(
    allow_list_path: &Path,
    identity: &str,
    project_name: &str,
) -> Result<Registration, StepWarning> {
    try_register(allow_list_path, identity, project_name).map_err(|err| {
        warn!(path = %allow_list_path.display(), error = %err, "could not update allow-list");
        StepWarning::new("allow-list", err.to_string())
    })
}

fn try_register(
    allow_list_path: &Path,
    identity: &str,
    project_name: &str,
) -> Result<Registration, AppError> {
    let content = match fs::read_to_string(allow_list_path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %allow_list_path.display(), "no allow-list file, skipping");
            return Ok(Registration::Skipped);
        }
        Err(err) => return Err(err.into()),
    };

    let (updated, added) = add_project(&content, identity, project_name);
    if added == 0 {
        return Ok(Registration::Unchanged);
    }

    fs::write(allow_list_path, updated)?;
    info!(identity, project = project_name, lines = added, "registered project in allow-list");
    Ok(Registration::Added(added))
}

/// Returns the rewritten content and the number of lines the project was added to
fn add_project(content: &str, identity: &str, project_name: &str) -> (String, usize) {
    let prefix = format!("{identity}|");
    let mut added = 0;

    let lines: Vec<String> = content
        .split('\n')
        .map(|raw| {
            if !raw.starts_with(&prefix) {
                return raw.to_string();
            }
            // CRLF files keep their line endings
            let (line, ending) = match raw.strip_suffix('\r') {
                Some(line) => (line, "\r"),
                None => (raw, ""),
            };
            let mut fields: Vec<&str> = line.split('|').collect();
            if fields.len() <= PROJECTS_FIELD {
                return raw.to_string();
            }

            let mut projects: Vec<&str> = fields[PROJECTS_FIELD]
                .split(',')
                .filter(|project| !project.is_empty())
                .collect();
            if projects.contains(&project_name) {
                return raw.to_string();
            }
            projects.push(project_name);
            let joined = projects.join(",");
            fields[PROJECTS_FIELD] = &joined;
            added += 1;
            format!("{}{ending}", fields.join("|"))
        })
        .collect();

    (lines.join("\n"), added)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "alice|Alice|alice@example.com|gh-alice|blog,site|x\n\
                          bob|Bob|bob@example.com|gh-bob|tools\n";

    #[test]
    fn appends_project_to_matching_line_only() {
        let (out, added) = add_project(SAMPLE, "alice", "demo");

        assert_eq!(added, 1);
        assert_eq!(
            out,
            "alice|Alice|alice@example.com|gh-alice|blog,site,demo|x\n\
             bob|Bob|bob@example.com|gh-bob|tools\n"
        );
    }

    #[test]
    fn unmatched_identity_leaves_content_identical() {
        let (out, added) = add_project(SAMPLE, "carol", "demo");
        assert_eq!(added, 0);
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn prefix_must_match_whole_identity() {
        let (out, added) = add_project("alice2|a|b|c|one\n", "alice", "demo");
        assert_eq!(added, 0);
        assert_eq!(out, "alice2|a|b|c|one\n");
    }

    #[test]
    fn short_lines_are_left_alone() {
        let (out, added) = add_project("alice|a|b|c", "alice", "demo");
        assert_eq!(added, 0);
        assert_eq!(out, "alice|a|b|c");
    }

    #[test]
    fn substring_of_existing_project_still_registers() {
        let (out, added) = add_project("alice|a|b|c|demo-app", "alice", "demo");
        assert_eq!(added, 1);
        assert_eq!(out, "alice|a|b|c|demo-app,demo");
    }

    #[test]
    fn empty_project_list_gets_bare_name() {
        let (out, added) = add_project("alice|a|b|c|\nbob|d|e|f|\n", "alice", "demo");
        assert_eq!(added, 1);
        assert_eq!(out, "alice|a|b|c|demo\nbob|d|e|f|\n");
    }

    #[test]
    fn crlf_line_endings_are_preserved() {
        let content = "alice|a|b|c|site\r\nbob|d|e|f|tools\r\n";

        let (out, added) = add_project(content, "alice", "demo");

        assert_eq!(added, 1);
        assert_eq!(out, "alice|a|b|c|site,demo\r\nbob|d|e|f|tools\r\n");
        let (again, added) = add_project(&out, "alice", "demo");
        assert_eq!(added, 0);
        assert_eq!(again, out);
    }

    #[test]
    fn registering_twice_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".git-accounts");
        fs::write(&path, SAMPLE).unwrap();

        assert_eq!(register(&path, "alice", "demo"), Ok(Registration::Added(1)));
        let after_first = fs::read_to_string(&path).unwrap();
        assert_eq!(register(&path, "alice", "demo"), Ok(Registration::Unchanged));

        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
        assert_eq!(after_first.matches("demo").count(), 1);
    }

    #[test]
    fn missing_file_is_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".git-accounts");

        assert_eq!(register(&path, "alice", "demo"), Ok(Registration::Skipped));
        assert!(!path.exists());
    }

    #[test]
    fn unreadable_file_becomes_warning() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(".git-accounts");
        fs::create_dir_all(&path).unwrap();

        let warning = register(&path, "alice", "demo").unwrap_err();
        assert_eq!(warning.step, "allow-list");
    }
}
