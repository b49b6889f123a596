//! Source file discovery and loading.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::lexer::{self, LexError, TokenStream};

/// Why a file produced no tokens.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no tokenizer registered for extension {0:?}")]
    Unsupported(String),
    #[error("cannot read file: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("malformed token stream: {0}")]
    Malformed(#[from] LexError),
}

/// Enumerates source files beneath a root in lexicographic order.
#[derive(Debug, Clone)]
pub struct FileFinder {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
    excluded_paths: Option<GlobSet>,
}

impl FileFinder {
    /// Create a finder for `.php` files under `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: vec!["php".to_string()],
            excluded_dirs: Vec::new(),
            excluded_paths: None,
        }
    }

    /// Set the file extensions to include (with or without a leading dot).
    pub fn extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Exclude directories directly below the root with these names.
    pub fn exclude_dirs<S: AsRef<str>>(mut self, dirs: &[S]) -> Self {
        self.excluded_dirs = dirs.iter().map(|d| d.as_ref().to_string()).collect();
        self
    }

    /// Exclude files whose root-relative path matches any glob pattern.
    pub fn exclude_paths<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, globset::Error> {
        if patterns.is_empty() {
            self.excluded_paths = None;
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        self.excluded_paths = Some(builder.build()?);
        Ok(self)
    }

    /// Walk the tree, yielding matching files one at a time.
    pub fn files(self) -> impl Iterator<Item = PathBuf> {
        let FileFinder {
            root,
            extensions,
            excluded_dirs,
            excluded_paths,
        } = self;

        WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| keep_entry(e, &excluded_dirs))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(move |path| {
                if !has_extension(path, &extensions) {
                    return false;
                }
                match &excluded_paths {
                    Some(globs) => !globs.is_match(relative_path(&root, path)),
                    None => true,
                }
            })
    }
}

fn keep_entry(entry: &DirEntry, excluded_dirs: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    // Skip hidden directories
    if name.starts_with('.') {
        return false;
    }
    // Skip excluded subtrees at the top level only
    !(entry.depth() == 1 && excluded_dirs.iter().any(|d| *d == name))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    extensions.contains(&ext)
}

/// Path of `path` relative to `root`, with `/` separators.
/// A file scanned on its own is named by its file name.
pub fn relative_path(root: &Path, path: &Path) -> String {
    if path == root {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
    }

    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

/// Read and tokenize a source file with the tokenizer for its extension.
pub fn read_tokens(path: &Path) -> Result<TokenStream, SourceError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let tokenizer = lexer::for_extension(&format!(".{}", ext))
        .ok_or_else(|| SourceError::Unsupported(ext.to_string()))?;
    let source = fs::read(path)?;
    Ok(tokenizer.tokenize_bytes(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Token, Tokenizer};
    use tempfile::TempDir;

    struct RejectingTokenizer;

    impl Tokenizer for RejectingTokenizer {
        fn tokenize_stream(&self, _source: &str) -> Result<TokenStream, LexError> {
            Err(LexError::UnterminatedInterpolation(1))
        }

        fn language(&self) -> &str {
            "rejecting"
        }
    }

    fn rejecting_factory() -> Box<dyn Tokenizer> {
        Box::new(RejectingTokenizer)
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    fn rel_files(finder: FileFinder, root: &Path) -> Vec<String> {
        finder.files().map(|p| relative_path(root, &p)).collect()
    }

    #[test]
    fn test_lists_sorted_php_files() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "wp-includes/post.php");
        touch(temp.path(), "index.php");
        touch(temp.path(), "wp-admin/admin.php");
        touch(temp.path(), "readme.txt");
        touch(temp.path(), ".git/hook.php");

        let files = rel_files(FileFinder::new(temp.path()), temp.path());
        assert_eq!(
            files,
            vec!["index.php", "wp-admin/admin.php", "wp-includes/post.php"]
        );
    }

    #[test]
    fn test_excludes_top_level_dir_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "wp-content/plugins/hello.php");
        touch(temp.path(), "wp-includes/wp-content/kept.php");
        touch(temp.path(), "wp-load.php");

        let finder = FileFinder::new(temp.path()).exclude_dirs(&["wp-content"]);
        let files = rel_files(finder, temp.path());
        assert_eq!(files, vec!["wp-includes/wp-content/kept.php", "wp-load.php"]);
    }

    #[test]
    fn test_exclude_globs_and_extensions() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/a.php");
        touch(temp.path(), "src/b.inc");
        touch(temp.path(), "vendor/lib/c.php");

        let finder = FileFinder::new(temp.path())
            .extensions(&[".php", "INC"])
            .exclude_paths(&["vendor/**"])
            .unwrap();
        let files = rel_files(finder, temp.path());
        assert_eq!(files, vec!["src/a.php", "src/b.inc"]);
    }

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "plugin.php");
        let file = temp.path().join("plugin.php");

        let files: Vec<PathBuf> = FileFinder::new(&file).files().collect();
        assert_eq!(files, vec![file.clone()]);
        assert_eq!(relative_path(&file, &file), "plugin.php");
    }

    #[test]
    fn test_read_tokens_errors() {
        crate::lexer::init();
        let temp = TempDir::new().unwrap();

        let missing = temp.path().join("missing.php");
        assert!(matches!(read_tokens(&missing), Err(SourceError::Unreadable(_))));

        lexer::register(".rejected", rejecting_factory);
        let broken = temp.path().join("broken.rejected");
        fs::write(&broken, "anything").unwrap();
        assert!(matches!(read_tokens(&broken), Err(SourceError::Malformed(_))));

        let text = temp.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(matches!(read_tokens(&text), Err(SourceError::Unsupported(_))));
    }

    #[test]
    fn test_read_tokens_keeps_truncated_and_latin1_files() {
        crate::lexer::init();
        let temp = TempDir::new().unwrap();

        let cut = temp.path().join("cut.php");
        fs::write(&cut, "<?php /** @since 1.0 */ function kept(){} /* trailing").unwrap();
        let stream = read_tokens(&cut).unwrap();
        assert_eq!(stream.unterminated, Some(LexError::UnterminatedComment(1)));
        assert!(stream
            .tokens
            .contains(&Token::classified(lexer::TokenKind::Identifier, "kept", 1)));

        let latin1 = temp.path().join("latin1.php");
        fs::write(&latin1, b"<?php\n// caf\xE9\nalpha();").unwrap();
        let stream = read_tokens(&latin1).unwrap();
        assert!(stream.unterminated.is_none());
        assert!(stream
            .tokens
            .contains(&Token::classified(lexer::TokenKind::Identifier, "alpha", 3)));
    }
}
