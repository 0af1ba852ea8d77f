use std::fs;
use std::path::Path;

use peg_grammar::Generator;

/// A temporary directory of grammar files plus a generator rooted there.
pub struct TestEnv {
    temp_dir: tempfile::TempDir,
}

impl TestEnv {
    /// Writes every `(file name, grammar text)` pair into a fresh directory.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Could not create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write grammar file");
        }
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn generator(&self) -> Generator {
        Generator::new(self.path())
    }
}
