use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};

pub const DEFAULT_CONTAINER: &str = "mysitemedia";

pub const DEFAULT_BASE_PATH: &str = if cfg!(windows) {
    r"c:\temp\mysitemedia\"
} else {
    "/tmp/mysitemedia/"
};

/// Source of interactive answers. The mirror logic never reads the
/// console directly, so resolution can be tested with canned answers.
pub trait Prompter {
    fn prompt(&mut self, message: &str) -> Result<String>;
}

/// Prompter backed by stdin/stdout.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt(&mut self, message: &str) -> Result<String> {
        print!("{message}");
        std::io::stdout().flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line)
    }
}

/// Trim surrounding whitespace and strip a single trailing `;`.
/// Empty or whitespace-only input is a configuration error.
pub fn normalize_connection_string(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("connection string cannot be empty");
    }

    Ok(trimmed.strip_suffix(';').unwrap_or(trimmed).to_string())
}

pub fn resolve_connection_string(
    flag: Option<String>,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    let raw = match flag {
        Some(value) => value,
        None => prompter.prompt("Azure blob storage connection string: ")?,
    };

    normalize_connection_string(&raw)
}

pub fn resolve_container(flag: Option<String>, prompter: &mut dyn Prompter) -> Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }

    let answer = prompter.prompt(&format!(
        "Set blob container (defaults to {DEFAULT_CONTAINER} if left empty): "
    ))?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        DEFAULT_CONTAINER.to_string()
    } else {
        answer.to_string()
    })
}

pub fn resolve_base_path(flag: Option<PathBuf>, prompter: &mut dyn Prompter) -> Result<PathBuf> {
    if let Some(value) = flag {
        return Ok(value);
    }

    let answer = prompter.prompt(&format!(
        "Set base path to local folder (defaults to {DEFAULT_BASE_PATH} if left empty): "
    ))?;
    let answer = answer.trim();

    Ok(if answer.is_empty() {
        PathBuf::from(DEFAULT_BASE_PATH)
    } else {
        PathBuf::from(answer)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedPrompter(Vec<String>);

    impl Prompter for CannedPrompter {
        fn prompt(&mut self, _message: &str) -> Result<String> {
            Ok(self.0.remove(0))
        }
    }

    #[test]
    fn trailing_separator_is_stripped() {
        assert_eq!(normalize_connection_string("abc123;").unwrap(), "abc123");
    }

    #[test]
    fn whitespace_is_trimmed_before_stripping() {
        assert_eq!(
            normalize_connection_string("  abc123;  \n").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn only_one_separator_is_removed() {
        assert_eq!(normalize_connection_string("abc;;").unwrap(), "abc;");
    }

    #[test]
    fn interior_separators_are_kept() {
        assert_eq!(
            normalize_connection_string("AccountName=a;AccountKey=b").unwrap(),
            "AccountName=a;AccountKey=b"
        );
    }

    #[test]
    fn empty_connection_string_is_rejected() {
        assert!(normalize_connection_string("").is_err());
        assert!(normalize_connection_string("   \n").is_err());
    }

    #[test]
    fn connection_string_flag_bypasses_prompt() {
        let mut prompter = CannedPrompter(vec![]);
        let resolved =
            resolve_connection_string(Some("abc123;".to_string()), &mut prompter).unwrap();
        assert_eq!(resolved, "abc123");
    }

    #[test]
    fn connection_string_falls_back_to_prompt() {
        let mut prompter = CannedPrompter(vec!["xyz;\n".to_string()]);
        let resolved = resolve_connection_string(None, &mut prompter).unwrap();
        assert_eq!(resolved, "xyz");
    }

    #[test]
    fn blank_container_answer_uses_default() {
        let mut prompter = CannedPrompter(vec!["\n".to_string()]);
        let resolved = resolve_container(None, &mut prompter).unwrap();
        assert_eq!(resolved, DEFAULT_CONTAINER);
    }

    #[test]
    fn container_answer_is_trimmed() {
        let mut prompter = CannedPrompter(vec!["  media  \n".to_string()]);
        let resolved = resolve_container(None, &mut prompter).unwrap();
        assert_eq!(resolved, "media");
    }

    #[test]
    fn container_flag_bypasses_prompt() {
        let mut prompter = CannedPrompter(vec![]);
        let resolved = resolve_container(Some("assets".to_string()), &mut prompter).unwrap();
        assert_eq!(resolved, "assets");
    }

    #[test]
    fn blank_base_path_answer_uses_default() {
        let mut prompter = CannedPrompter(vec!["\n".to_string()]);
        let resolved = resolve_base_path(None, &mut prompter).unwrap();
        assert_eq!(resolved, PathBuf::from(DEFAULT_BASE_PATH));
    }

    #[test]
    fn base_path_answer_is_used() {
        let mut prompter = CannedPrompter(vec!["/data/mirror\n".to_string()]);
        let resolved = resolve_base_path(None, &mut prompter).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/mirror"));
    }
}
