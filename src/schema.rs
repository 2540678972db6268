//! `tests.toml` Schema
//!
//! [`Catalog`] is the top-level item in the catalog file: an array of
//! `[[case]]` tables, each declaring one tested combination of tool
//! arguments and expected outcome.

use std::collections::BTreeSet;

use crate::error::FatalError;

/// Top-level data in the `tests.toml` catalog
#[derive(Clone, Default, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    #[serde(default, rename = "case")]
    pub cases: Vec<CaseSpec>,
}

impl Catalog {
    /// Load and validate the catalog; any problem here aborts the run.
    pub fn load(path: &std::path::Path) -> Result<Self, FatalError> {
        let raw = std::fs::read_to_string(path).map_err(|source| FatalError::CatalogRead {
            path: path.to_owned(),
            source,
        })?;
        let catalog = Self::parse_toml(&raw).map_err(|source| FatalError::CatalogParse {
            path: path.to_owned(),
            source,
        })?;
        catalog.validate(path)?;
        Ok(catalog)
    }

    fn parse_toml(s: &str) -> Result<Self, toml_edit::de::Error> {
        toml_edit::de::from_str(s)
    }

    // Case names key the fixture files, so a duplicate would silently test
    // one case twice and the other never.
    fn validate(&self, path: &std::path::Path) -> Result<(), FatalError> {
        let mut seen = BTreeSet::new();
        for case in &self.cases {
            if !seen.insert(case.name.as_str()) {
                return Err(FatalError::DuplicateCase {
                    path: path.to_owned(),
                    name: case.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Catalog {
    type Err = toml_edit::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_toml(s)
    }
}

/// One catalog entry
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaseSpec {
    /// Unique name, keying `<name>.in` / `<name>.out` fixture files
    pub name: String,
    /// Expected exit status, classified coarsely: `0` must match exactly,
    /// anything else accepts any exit code of 1 or above
    pub exit: i32,
    #[serde(default)]
    pub arguments: Option<Arguments>,
}

impl CaseSpec {
    pub fn expects_success(&self) -> bool {
        self.exit == 0
    }

    /// Coerce the catalog's absent/string/list forms into the variant list.
    ///
    /// Absent or an empty list both mean "run once with no arguments";
    /// declaration order of a list is preserved.
    pub fn variants(&self) -> Vec<String> {
        match &self.arguments {
            None => vec![String::new()],
            Some(Arguments::Joined(arguments)) => vec![arguments.clone()],
            Some(Arguments::Split(list)) if list.is_empty() => vec![String::new()],
            Some(Arguments::Split(list)) => list.clone(),
        }
    }

    /// Expand into one concrete invocation per argument variant.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.variants()
            .into_iter()
            .map(|arguments| Invocation {
                name: self.name.clone(),
                arguments,
            })
            .collect()
    }
}

/// Argument variants for a case
///
/// Deserialized from either a single string or an array of strings; each
/// element is one complete argument line for the tool.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum Arguments {
    Joined(String),
    Split(Vec<String>),
}

/// One concrete run of the tool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub arguments: String,
}

impl Invocation {
    /// The argument vector: split on single spaces, empty tokens dropped,
    /// so `""` yields zero arguments. No shell quoting rules apply.
    pub fn argv(&self) -> Vec<&str> {
        self.arguments
            .split(' ')
            .filter(|arg| !arg.is_empty())
            .collect()
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.arguments.is_empty() {
            self.name.fmt(f)
        } else {
            write!(f, "{} ({})", self.name, self.arguments)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_toml_empty() {
        let expected = Catalog {
            ..Default::default()
        };
        let actual = Catalog::parse_toml("").unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn parse_toml_minimal_case() {
        let expected = Catalog {
            cases: vec![CaseSpec {
                name: "basic".into(),
                exit: 0,
                arguments: None,
            }],
        };
        let actual = Catalog::parse_toml(
            "
[[case]]
name = 'basic'
exit = 0
",
        )
        .unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn parse_toml_arguments_joined() {
        let expected = Catalog {
            cases: vec![CaseSpec {
                name: "filter".into(),
                exit: 0,
                arguments: Some(Arguments::Joined("-F state=ESTABLISHED".into())),
            }],
        };
        let actual = Catalog::parse_toml(
            "
[[case]]
name = 'filter'
exit = 0
arguments = '-F state=ESTABLISHED'
",
        )
        .unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn parse_toml_arguments_split() {
        let expected = Catalog {
            cases: vec![CaseSpec {
                name: "timestamps".into(),
                exit: 0,
                arguments: Some(Arguments::Split(vec!["-T d".into(), "-T u".into()])),
            }],
        };
        let actual = Catalog::parse_toml(
            "
[[case]]
name = 'timestamps'
exit = 0
arguments = ['-T d', '-T u']
",
        )
        .unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn parse_toml_missing_exit() {
        assert!(Catalog::parse_toml(
            "
[[case]]
name = 'basic'
"
        )
        .is_err());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let catalog = Catalog::parse_toml(
            "
[[case]]
name = 'basic'
exit = 0

[[case]]
name = 'basic'
exit = 1
",
        )
        .unwrap();
        let err = catalog.validate(std::path::Path::new("tests.toml"));
        assert!(matches!(
            err,
            Err(FatalError::DuplicateCase { name, .. }) if name == "basic"
        ));
    }

    fn case(arguments: Option<Arguments>) -> CaseSpec {
        CaseSpec {
            name: "case".into(),
            exit: 0,
            arguments,
        }
    }

    #[test]
    fn variants_absent() {
        assert_eq!(case(None).variants(), vec![String::new()]);
    }

    #[test]
    fn variants_empty_list() {
        let spec = case(Some(Arguments::Split(vec![])));
        assert_eq!(spec.variants(), vec![String::new()]);
    }

    #[test]
    fn variants_single_string() {
        let spec = case(Some(Arguments::Joined("-c 2".into())));
        assert_eq!(spec.variants(), vec!["-c 2".to_owned()]);
    }

    #[test]
    fn variants_preserve_declaration_order() {
        let spec = case(Some(Arguments::Split(vec!["-b".into(), "-a".into()])));
        assert_eq!(spec.variants(), vec!["-b".to_owned(), "-a".to_owned()]);
    }

    #[test]
    fn argv_empty_string_is_no_arguments() {
        let invocation = Invocation {
            name: "basic".into(),
            arguments: String::new(),
        };
        assert!(invocation.argv().is_empty());
    }

    #[test]
    fn argv_drops_empty_tokens() {
        let invocation = Invocation {
            name: "basic".into(),
            arguments: "-T  d".into(),
        };
        assert_eq!(invocation.argv(), vec!["-T", "d"]);
    }

    #[test]
    fn invocation_display_includes_arguments() {
        let invocation = Invocation {
            name: "timestamps".into(),
            arguments: "-T d".into(),
        };
        assert_eq!(invocation.to_string(), "timestamps (-T d)");
    }
}
