//! POSIX shell quoting for remote commands.

/// Quote `arg` so a POSIX shell reads it back as one literal word.
///
/// The argument is wrapped in single quotes; embedded single quotes become
/// `'\''` (close, escaped quote, reopen).
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Exit status 0 when `path` is a directory, 1 when it is not.
pub fn test_dir_cmd(path: &str) -> String {
    format!("test -d {}", quote(path))
}

pub fn mv_cmd(from: &str, to: &str) -> String {
    format!("mv {} {}", quote(from), quote(to))
}

/// Create `path` with its parents; an existing directory is fine.
pub fn mkdir_cmd(path: &str) -> String {
    format!("mkdir -p {}", quote(path))
}

/// Write the command's stdin to `path`, truncating it first.
pub fn cat_to_cmd(path: &str) -> String {
    format!("cat > {}", quote(path))
}

/// Join remote path components with `/`, whatever the local platform uses.
pub fn join(base: &str, rel: &str) -> String {
    match (base.is_empty(), rel.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => rel.to_string(),
        (false, false) => format!("{}/{}", base.trim_end_matches('/'), rel),
    }
}
