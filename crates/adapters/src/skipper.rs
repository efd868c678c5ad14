// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ignore-rule compiler.
//!
//! The user supplies one strategy string per replicated root, written in
//! the `.gitignore` dialect. It compiles to a [`Skipper`] that both the
//! initial walk and the live event stream consult.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkipperError {
    #[error("invalid ignore rule: {0}")]
    InvalidRule(#[from] ignore::Error),
}

/// Compiled ignore-rule evaluator.
#[derive(Debug, Clone)]
pub struct Skipper {
    rules: Gitignore,
}

impl Skipper {
    /// Compile a gitignore-dialect strategy string, one pattern per line.
    pub fn compile(strategy: &str) -> Result<Self, SkipperError> {
        let mut builder = GitignoreBuilder::new("");
        for line in strategy.lines() {
            builder.add_line(None, line)?;
        }
        Ok(Skipper { rules: builder.build()? })
    }

    /// Whether `sub` (relative to its root) survives the rules.
    ///
    /// A path under an ignored directory is skipped even when no rule
    /// names it directly.
    pub fn allows(&self, sub: &Path, is_dir: bool) -> bool {
        !self.rules.matched_path_or_any_parents(sub, is_dir).is_ignore()
    }
}

#[cfg(test)]
#[path = "skipper_tests.rs"]
mod tests;
