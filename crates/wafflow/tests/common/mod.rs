use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const VALID_DEFINITION: &str = r#"
name: blocked-paths
scope: REGIONAL
description: Paths nobody should reach
regular_expression_list:
  - ^/admin
  - ^/wp-login
tags:
  team: edge
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    /// Write a definition file and return its path
    pub fn write_definition(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn write_settings(&self, content: &str) {
        fs::write(self.root.path().join("wafflow.yaml"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}
