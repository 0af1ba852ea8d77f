//! Import merging.
//!
//! The assembler turns a root grammar plus everything it imports into one
//! closed, import-free [`Grammar`]. Definitions keep the order in which they
//! were reached: the root's own first, then each import in declaration order.

use std::collections::HashMap;

use crate::analysis;
use crate::error::{Error, Result};
use crate::model::*;
use crate::resolver::ImportResolver;
use crate::validator;

/// Origin recorded for definitions of the root grammar.
pub const ROOT_ORIGIN: &str = "<root>";

pub struct Assembler<'r, R: ImportResolver + ?Sized> {
    resolver: &'r R,
    root_path: Option<String>,
}

/// Definitions collected so far, each tagged with the grammar it came from.
#[derive(Default)]
struct Merged {
    definitions: Vec<(Definition, String)>,
    by_name: HashMap<String, usize>,
}

impl<'r, R: ImportResolver + ?Sized> Assembler<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            root_path: None,
        }
    }

    /// Import path of the root grammar, so that a grammar importing itself
    /// is reported as a cycle instead of being merged twice.
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = Some(path.into());
        self
    }

    /// Merges `root` with its transitive imports and validates the result.
    pub fn assemble(&self, root: &Grammar) -> Result<Grammar> {
        let origin = self.root_path.as_deref().unwrap_or(ROOT_ORIGIN);
        let mut stack: Vec<String> = self.root_path.iter().cloned().collect();
        let mut cache = HashMap::new();

        let merged = self.close(root, origin, &mut stack, &mut cache)?;
        let definitions = merged.definitions.into_iter().map(|(def, _)| def).collect();
        let grammar = Grammar::new(Vec::new(), definitions, root.span())?;

        validator::validate(&grammar)?;
        log::debug!(
            "assembled grammar with {} definitions",
            grammar.definitions().len()
        );
        Ok(grammar)
    }

    /// `grammar`'s own definitions followed by everything its imports select.
    fn close(
        &self,
        grammar: &Grammar,
        origin: &str,
        stack: &mut Vec<String>,
        cache: &mut HashMap<String, Vec<(Definition, String)>>,
    ) -> Result<Merged> {
        let mut merged = Merged::default();
        for def in grammar.definitions() {
            merged.insert(def.clone(), origin)?;
        }
        for import in grammar.imports() {
            for (def, from) in self.import(import, stack, cache)? {
                merged.insert(def, &from)?;
            }
        }
        Ok(merged)
    }

    fn import(
        &self,
        import: &Import,
        stack: &mut Vec<String>,
        cache: &mut HashMap<String, Vec<(Definition, String)>>,
    ) -> Result<Vec<(Definition, String)>> {
        let path = import.path();
        if stack.iter().any(|p| p == path) {
            let mut chain = stack.clone();
            chain.push(path.to_string());
            return Err(Error::ImportCycle { chain });
        }

        let closed = match cache.get(path) {
            Some(closed) => closed.clone(),
            None => {
                log::debug!("resolving import \"{}\"", path);
                let grammar = self.resolver.resolve(path)?;
                stack.push(path.to_string());
                let merged = self.close(&grammar, path, stack, cache);
                stack.pop();
                let closed = merged?.definitions;
                cache.insert(path.to_string(), closed.clone());
                closed
            }
        };

        if import.imports_all() {
            log::debug!("importing all {} definitions from \"{}\"", closed.len(), path);
            return Ok(closed);
        }

        let view = Grammar::new(
            Vec::new(),
            closed.iter().map(|(def, _)| def.clone()).collect(),
            import.span(),
        )?;
        for name in import.names() {
            if view.definition(name).is_none() {
                return Err(Error::MissingImport {
                    name: name.clone(),
                    path: path.to_string(),
                    span: import.span(),
                });
            }
        }
        let roots: Vec<&str> = import.names().iter().map(String::as_str).collect();
        let selected = analysis::reachable(&view, &roots);
        log::debug!(
            "importing {:?} from \"{}\" ({} definitions with dependencies)",
            roots,
            path,
            selected.len()
        );

        Ok(closed
            .iter()
            .filter(|(def, _)| selected.contains(def.name()))
            .cloned()
            .collect())
    }
}

impl Merged {
    fn insert(&mut self, def: Definition, origin: &str) -> Result<()> {
        if let Some(&index) = self.by_name.get(def.name()) {
            let (existing, first_origin) = &self.definitions[index];
            if existing.expr().text() == def.expr().text() {
                return Ok(());
            }
            if first_origin == origin {
                return Err(Error::DuplicateDefinition {
                    name: def.name().to_string(),
                    first: existing.span(),
                    second: def.span(),
                });
            }
            return Err(Error::ConflictingDefinition {
                name: def.name().to_string(),
                first_origin: first_origin.clone(),
                second_origin: origin.to_string(),
                span: def.span(),
            });
        }
        self.by_name
            .insert(def.name().to_string(), self.definitions.len());
        self.definitions.push((def, origin.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_grammar;

    fn library(entries: &[(&str, &str)]) -> HashMap<String, Grammar> {
        entries
            .iter()
            .map(|(path, source)| (path.to_string(), parse_grammar(source).unwrap()))
            .collect()
    }

    #[test]
    fn test_selected_import_brings_exactly_named_rules() {
        let lib = library(&[("g.peg", "A <- 'a'\nB <- 'b'+\nC <- 'c'")]);
        let root = parse_grammar("import A, B from \"g.peg\"\nH <- A B").unwrap();
        let merged = Assembler::new(&lib).assemble(&root).unwrap();

        let names: Vec<_> = merged.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, ["H", "A", "B"]);
        assert!(merged.imports().is_empty());

        let g = &lib["g.peg"];
        for name in ["A", "B"] {
            assert_eq!(
                merged.definition(name).unwrap().expr().text(),
                g.definition(name).unwrap().expr().text()
            );
        }
    }

    #[test]
    fn test_selection_pulls_dependencies() {
        let lib = library(&[("g.peg", "Number <- Digit+\nDigit <- [0-9]\nOther <- 'x'")]);
        let root = parse_grammar("import Number from \"g.peg\"\nS <- Number").unwrap();
        let merged = Assembler::new(&lib).assemble(&root).unwrap();
        assert!(merged.definition("Digit").is_some());
        assert!(merged.definition("Other").is_none());
    }

    #[test]
    fn test_import_all_and_transitive() {
        let lib = library(&[
            ("a.peg", "import * from \"b.peg\"\nA <- B"),
            ("b.peg", "B <- 'b'"),
        ]);
        let root = parse_grammar("import * from \"a.peg\"\nS <- A").unwrap();
        let merged = Assembler::new(&lib).assemble(&root).unwrap();
        let names: Vec<_> = merged.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, ["S", "A", "B"]);
    }

    #[test]
    fn test_missing_import() {
        let lib = library(&[("g.peg", "A <- 'a'")]);
        let root = parse_grammar("import Z from \"g.peg\"\nS <- Z").unwrap();
        match Assembler::new(&lib).assemble(&root) {
            Err(Error::MissingImport { name, path, .. }) => {
                assert_eq!(name, "Z");
                assert_eq!(path, "g.peg");
            }
            other => panic!("expected missing import, got {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_definitions_name_both_origins() {
        let lib = library(&[("x.peg", "A <- 'x'"), ("y.peg", "A <- 'y'")]);
        let root =
            parse_grammar("import * from \"x.peg\"\nimport * from \"y.peg\"\nS <- A").unwrap();
        match Assembler::new(&lib).assemble(&root) {
            Err(Error::ConflictingDefinition {
                name,
                first_origin,
                second_origin,
                ..
            }) => {
                assert_eq!(name, "A");
                assert_eq!(first_origin, "x.peg");
                assert_eq!(second_origin, "y.peg");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_root_definition_conflicts_with_import() {
        let lib = library(&[("x.peg", "A <- 'x'")]);
        let root = parse_grammar("import A from \"x.peg\"\nA <- 'root'").unwrap();
        let err = Assembler::new(&lib).assemble(&root).unwrap_err();
        assert!(matches!(
            err,
            Error::ConflictingDefinition { ref first_origin, .. } if first_origin == ROOT_ORIGIN
        ));
    }

    #[test]
    fn test_diamond_import_merges_identical_bodies() {
        let lib = library(&[
            ("left.peg", "import * from \"base.peg\"\nL <- Base"),
            ("right.peg", "import * from \"base.peg\"\nR <- Base"),
            ("base.peg", "Base <- [a-z]+"),
        ]);
        let root = parse_grammar(
            "import * from \"left.peg\"\nimport * from \"right.peg\"\nS <- L R",
        )
        .unwrap();
        let merged = Assembler::new(&lib).assemble(&root).unwrap();
        let names: Vec<_> = merged.definitions().iter().map(Definition::name).collect();
        assert_eq!(names, ["S", "L", "Base", "R"]);
    }

    #[test]
    fn test_import_cycle_reports_chain() {
        let lib = library(&[
            ("a.peg", "import * from \"b.peg\"\nA <- B"),
            ("b.peg", "import * from \"a.peg\"\nB <- 'b'"),
        ]);
        let root = parse_grammar("import * from \"a.peg\"\nS <- A").unwrap();
        match Assembler::new(&lib).assemble(&root) {
            Err(Error::ImportCycle { chain }) => assert_eq!(chain, ["a.peg", "b.peg", "a.peg"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_import_with_root_path() {
        let lib = library(&[("main.peg", "S <- 'a'")]);
        let root = parse_grammar("import * from \"main.peg\"\nS <- 'a'").unwrap();
        let err = Assembler::new(&lib)
            .with_root_path("main.peg")
            .assemble(&root)
            .unwrap_err();
        assert!(matches!(err, Error::ImportCycle { .. }));
    }

    #[test]
    fn test_unresolved_after_merge() {
        let lib = library(&[("g.peg", "A <- 'a' Nowhere")]);
        let root = parse_grammar("import * from \"g.peg\"\nS <- A").unwrap();
        assert!(matches!(
            Assembler::new(&lib).assemble(&root),
            Err(Error::UnresolvedIdentifier { ref name, .. }) if name == "Nowhere"
        ));
    }
}
