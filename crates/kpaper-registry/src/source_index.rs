//! Build-time extension index.
//!
//! Walks the plugin's Kotlin and Java sources and records every top-level
//! class that the bootstrapper would be able to register: it lives in the
//! `commands` or `listeners` package under the base package, is concrete
//! and publicly constructible without arguments, and has the capability
//! supertype. The result is written as the `.extensions` registry so
//! nothing is discovered by scanning at runtime.
//!
//! Declarations are recognised lexically. Only declarations starting in
//! column 0 are considered top-level. A capability inherited through a base
//! class is followed when that base class is declared in the scanned
//! sources; a base class from a library must name the capability itself.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ignore::WalkBuilder;
use kpaper_manifest::config::is_package_name;
use regex::Regex;
use tracing::{debug, info};

use crate::capability::{Capability, ExtensionCandidate, simple_name};
use crate::discovery::SkipReason;
use crate::error::{Error, Result};
use crate::registry::RegistryManifest;

/// Source roots, relative to the project root, that are indexed.
pub const SOURCE_ROOTS: [&str; 2] = ["src/main/kotlin", "src/main/java"];

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+([A-Za-z_][\w.]*)\s*;?\s*$").expect("Invalid package regex")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(static\s+)?([A-Za-z_][\w.]*?)(\.\*)?(?:\s+as\s+([A-Za-z_]\w*))?\s*;?\s*$")
        .expect("Invalid import regex")
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^((?:@\w+(?:\([^)\n]*\))?[ \t]+|[a-z-]+[ \t]+)*)(class|interface|object|enum|record|@interface)[ \t]+([A-Za-z_]\w*)",
    )
    .expect("Invalid declaration regex")
});

static KOTLIN_CONSTRUCTOR_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:@\w+(?:\([^)]*\))?\s*)*(?:(public|internal|protected|private)\s+)?constructor\b")
        .expect("Invalid constructor keyword regex")
});

static KOTLIN_SECONDARY_CONSTRUCTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s+(?:(public|internal|protected|private)\s+)?constructor\s*\(([^)]*)\)")
        .expect("Invalid secondary constructor regex")
});

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*//.*$").expect("Invalid line comment regex"));

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid block comment regex"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][\w.]*").expect("Invalid identifier regex"));

/// Source language, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Kotlin,
    Java,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" => Some(Self::Kotlin),
            "java" => Some(Self::Java),
            _ => None,
        }
    }
}

/// The verdict for one class in a candidate package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    Registered(ExtensionCandidate),
    Skipped {
        candidate: ExtensionCandidate,
        reason: SkipReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedClass {
    pub candidate: ExtensionCandidate,
    pub reason: SkipReason,
    pub source: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub registry: RegistryManifest,
    pub skipped: Vec<SkippedClass>,
    pub files_scanned: usize,
}

pub struct SourceIndex {
    base_package: String,
}

impl SourceIndex {
    pub fn new(base_package: impl Into<String>) -> Result<Self> {
        let base_package = base_package.into();
        if !is_package_name(&base_package) {
            return Err(Error::InvalidBasePackage(base_package));
        }
        Ok(Self { base_package })
    }

    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    /// Index the conventional source roots of the project at `root`.
    pub fn scan_project(&self, root: &Path) -> Result<IndexReport> {
        let roots: Vec<PathBuf> = SOURCE_ROOTS.iter().map(|r| root.join(r)).collect();
        self.scan(&roots)
    }

    /// Index every `.kt` and `.java` file below `roots`. Missing roots are
    /// skipped.
    ///
    /// All files are parsed before any class is classified, so a base class
    /// in one file can supply the capability of a class in another.
    pub fn scan<P: AsRef<Path>>(&self, roots: &[P]) -> Result<IndexReport> {
        let mut paths = Vec::new();
        let mut sources = Vec::new();

        for root in roots.iter().map(AsRef::as_ref) {
            if !root.is_dir() {
                debug!(root = %root.display(), "source root absent");
                continue;
            }

            let mut files = Vec::new();
            for entry in WalkBuilder::new(root).hidden(false).build() {
                let entry = entry.map_err(|e| Error::Walk {
                    root: root.to_path_buf(),
                    message: e.to_string(),
                })?;
                let path = entry.path();
                if let Some(language) = Language::from_path(path)
                    && path.is_file()
                {
                    files.push((path.to_path_buf(), language));
                }
            }
            files.sort_by(|a, b| a.0.cmp(&b.0));

            for (path, language) in files {
                let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
                sources.push(SourceFile::parse(&content, language));
                paths.push(path);
            }
        }

        let table = TypeTable::new(&sources);
        let mut report = IndexReport {
            files_scanned: sources.len(),
            ..IndexReport::default()
        };
        for (file, path) in paths.iter().enumerate() {
            for entry in self.classify(&table, file) {
                match entry {
                    IndexEntry::Registered(candidate) => {
                        debug!(class = %candidate.class_name, capability = %candidate.capability, "indexed");
                        report.registry.insert(candidate);
                    }
                    IndexEntry::Skipped { candidate, reason } => {
                        debug!(class = %candidate.class_name, reason = %reason, "skipped");
                        report.skipped.push(SkippedClass {
                            candidate,
                            reason,
                            source: path.clone(),
                        });
                    }
                }
            }
        }

        info!(
            files = report.files_scanned,
            registered = report.registry.len(),
            skipped = report.skipped.len(),
            "indexed extension sources"
        );
        Ok(report)
    }

    /// Classify the top-level classes of one source file on its own. Classes
    /// outside the candidate packages are not reported at all.
    pub fn index_source(&self, content: &str, language: Language) -> Vec<IndexEntry> {
        let sources = [SourceFile::parse(content, language)];
        self.classify(&TypeTable::new(&sources), 0)
    }

    fn classify(&self, table: &TypeTable<'_>, file: usize) -> Vec<IndexEntry> {
        let source = &table.sources[file];
        let Some(package) = source.package.as_deref() else {
            return Vec::new();
        };
        let Some(capability) = Capability::ALL
            .into_iter()
            .find(|c| crate::capability::is_within(package, &c.package(&self.base_package)))
        else {
            return Vec::new();
        };

        source
            .declarations
            .iter()
            .map(|declaration| {
                let class_name = source.qualify(&declaration.name);
                let capable = table.has_capability(&class_name, capability);
                let candidate = ExtensionCandidate::new(class_name, capability);
                match declaration.skip_reason(capable) {
                    Some(reason) => IndexEntry::Skipped { candidate, reason },
                    None => IndexEntry::Registered(candidate),
                }
            })
            .collect()
    }
}

/// One source file, reduced to what the index needs.
struct SourceFile {
    package: Option<String>,
    imports: Imports,
    declarations: Vec<Declaration>,
}

impl SourceFile {
    fn parse(content: &str, language: Language) -> Self {
        let content = BLOCK_COMMENT.replace_all(content, "");
        let content = LINE_COMMENT.replace_all(&content, "");

        let matches: Vec<_> = DECLARATION.captures_iter(&content).collect();
        let declarations = matches
            .iter()
            .enumerate()
            .map(|(index, captures)| {
                let whole = captures.get(0).map_or(0..0, |m| m.range());
                let body_end = matches
                    .get(index + 1)
                    .and_then(|next| next.get(0))
                    .map_or(content.len(), |m| m.start());
                Declaration::new(
                    captures[1].split_whitespace().map(str::to_string).collect(),
                    captures.get(2).map_or("", |m| m.as_str()),
                    captures.get(3).map_or("", |m| m.as_str()),
                    &content[whole.end..body_end],
                    language,
                )
            })
            .collect();

        Self {
            package: PACKAGE.captures(&content).map(|c| c[1].to_string()),
            imports: Imports::parse(&content),
            declarations,
        }
    }

    fn qualify(&self, name: &str) -> String {
        match &self.package {
            Some(package) => format!("{package}.{name}"),
            None => name.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Imports {
    /// Simple name (or alias) to qualified name.
    named: HashMap<String, String>,
    /// Packages imported with `.*`.
    wildcards: Vec<String>,
}

impl Imports {
    fn parse(content: &str) -> Self {
        let mut imports = Self::default();
        for captures in IMPORT.captures_iter(content) {
            if captures.get(1).is_some() {
                continue;
            }
            let path = &captures[2];
            if captures.get(3).is_some() {
                imports.wildcards.push(path.to_string());
                continue;
            }
            let alias = captures.get(4).map_or_else(|| simple_name(path), |m| m.as_str());
            imports.named.insert(alias.to_string(), path.to_string());
        }
        imports
    }
}

/// Every top-level declaration of the scanned sources, by qualified name.
struct TypeTable<'a> {
    sources: &'a [SourceFile],
    classes: HashMap<String, (usize, usize)>,
}

impl<'a> TypeTable<'a> {
    fn new(sources: &'a [SourceFile]) -> Self {
        let mut classes = HashMap::new();
        for (file, source) in sources.iter().enumerate() {
            for (index, declaration) in source.declarations.iter().enumerate() {
                classes
                    .entry(source.qualify(&declaration.name))
                    .or_insert((file, index));
            }
        }
        Self { sources, classes }
    }

    /// Qualified name of a project class referenced from `file`, if the
    /// reference points into the scanned sources.
    fn resolve(&self, file: usize, reference: &str) -> Option<String> {
        if reference.contains('.') {
            return self.classes.contains_key(reference).then(|| reference.to_string());
        }

        let source = &self.sources[file];
        if let Some(imported) = source.imports.named.get(reference) {
            return self.classes.contains_key(imported).then(|| imported.clone());
        }
        std::iter::once(source.qualify(reference))
            .chain(
                source
                    .imports
                    .wildcards
                    .iter()
                    .map(|package| format!("{package}.{reference}")),
            )
            .find(|candidate| self.classes.contains_key(candidate))
    }

    /// Whether `class` names the capability supertype, directly or through
    /// project base classes.
    fn has_capability(&self, class: &str, capability: Capability) -> bool {
        self.reaches(class, capability, &mut HashSet::new())
    }

    fn reaches(&self, class: &str, capability: Capability, visited: &mut HashSet<String>) -> bool {
        if !visited.insert(class.to_string()) {
            return false;
        }
        let Some(&(file, index)) = self.classes.get(class) else {
            return false;
        };

        self.sources[file].declarations[index]
            .supertypes
            .iter()
            .any(|reference| {
                simple_name(reference) == capability.supertype()
                    || self
                        .resolve(file, reference)
                        .is_some_and(|parent| self.reaches(&parent, capability, visited))
            })
    }
}

struct Declaration {
    modifiers: Vec<String>,
    kind: String,
    name: String,
    /// Source text from the end of the name up to the next declaration.
    rest: String,
    language: Language,
    /// Type names mentioned in the supertype clause.
    supertypes: Vec<String>,
}

impl Declaration {
    fn new(modifiers: Vec<String>, kind: &str, name: &str, rest: &str, language: Language) -> Self {
        let mut declaration = Self {
            modifiers,
            kind: kind.to_string(),
            name: name.to_string(),
            rest: rest.to_string(),
            language,
            supertypes: Vec::new(),
        };
        let supertypes = {
            let (_, after_primary, _) = declaration.primary_constructor();
            supertype_references(clause(after_primary), language)
        };
        declaration.supertypes = supertypes;
        declaration
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    fn skip_reason(&self, has_capability: bool) -> Option<SkipReason> {
        if let Some(kind) = self.non_concrete_kind() {
            return Some(SkipReason::NotConcrete(kind));
        }

        if !has_capability {
            return Some(SkipReason::MissingCapability);
        }

        let (primary, _, primary_hidden) = self.primary_constructor();
        let public = match self.language {
            Language::Kotlin => !self.has_modifier("private"),
            Language::Java => self.has_modifier("public"),
        };
        if !public || primary_hidden {
            return Some(SkipReason::NotPublic);
        }

        match self.language {
            Language::Kotlin => self.kotlin_constructor(primary),
            Language::Java => self.java_constructor(primary),
        }
    }

    fn non_concrete_kind(&self) -> Option<&'static str> {
        match self.kind.as_str() {
            "interface" => return Some("interface"),
            "object" => return Some("object declaration"),
            "enum" => return Some("enum"),
            "@interface" => return Some("annotation"),
            _ => {}
        }
        [
            ("abstract", "abstract class"),
            ("sealed", "sealed class"),
            ("enum", "enum"),
            ("annotation", "annotation"),
        ]
        .into_iter()
        .find(|(modifier, _)| self.has_modifier(modifier))
        .map(|(_, kind)| kind)
    }

    /// Primary constructor parameters (if declared), the text after them,
    /// and whether the primary constructor is hidden.
    fn primary_constructor(&self) -> (Option<&str>, &str, bool) {
        let mut rest = self.rest.trim_start();
        if rest.starts_with('<')
            && let Some((_, after)) = balanced(rest, '<', '>')
        {
            rest = after.trim_start();
        }

        let mut hidden = false;
        if self.language == Language::Kotlin
            && let Some(m) = KOTLIN_CONSTRUCTOR_KEYWORD.captures(rest)
        {
            hidden = matches!(m.get(1).map(|v| v.as_str()), Some("private" | "protected"));
            rest = rest[m.get(0).map_or(0, |v| v.end())..].trim_start();
        }

        if rest.starts_with('(')
            && let Some((params, after)) = balanced(rest, '(', ')')
        {
            return (Some(params), after, hidden);
        }
        (None, rest, hidden)
    }

    fn kotlin_constructor(&self, primary: Option<&str>) -> Option<SkipReason> {
        let secondary: Vec<_> = KOTLIN_SECONDARY_CONSTRUCTOR
            .captures_iter(&self.rest)
            .map(|c| {
                let visible = !matches!(c.get(1).map(|v| v.as_str()), Some("private" | "protected"));
                (visible, c.get(2).map_or("", |v| v.as_str()).trim().is_empty())
            })
            .collect();
        let secondary_default = secondary.iter().any(|(visible, empty)| *visible && *empty);

        let primary_default = match primary {
            Some(params) => all_defaulted(params),
            None => secondary.is_empty(),
        };

        if primary_default || secondary_default {
            None
        } else {
            Some(SkipReason::NoDefaultConstructor)
        }
    }

    fn java_constructor(&self, record_components: Option<&str>) -> Option<SkipReason> {
        if self.kind == "record" {
            return match record_components {
                Some(components) if !components.trim().is_empty() => {
                    Some(SkipReason::NoDefaultConstructor)
                }
                _ => None,
            };
        }

        let pattern = format!(
            r"(?m)^\s*((?:public|protected|private)\s+)?{}\s*\(([^)]*)\)",
            regex::escape(&self.name)
        );
        let Ok(constructor) = Regex::new(&pattern) else {
            return Some(SkipReason::NoDefaultConstructor);
        };

        let constructors: Vec<_> = constructor
            .captures_iter(&self.rest)
            .map(|c| {
                let public = c.get(1).is_some_and(|v| v.as_str().trim() == "public");
                (public, c.get(2).map_or("", |v| v.as_str()).trim().is_empty())
            })
            .collect();

        if constructors.is_empty() || constructors.iter().any(|&(public, empty)| public && empty) {
            None
        } else if constructors.iter().any(|&(_, empty)| empty) {
            Some(SkipReason::NotPublic)
        } else {
            Some(SkipReason::NoDefaultConstructor)
        }
    }
}

/// The supertype clause: text up to the class body, or up to the first
/// following line that starts a new top-level statement.
fn clause(rest: &str) -> &str {
    let mut offset = 0;
    for (index, line) in rest.split_inclusive('\n').enumerate() {
        let continues = index == 0
            || line.starts_with(char::is_whitespace)
            || line.starts_with([':', ',', '{']);
        if !continues {
            return &rest[..offset];
        }
        if let Some(brace) = line.find('{') {
            return &rest[..offset + brace];
        }
        offset += line.len();
    }
    rest
}

/// Type names in a supertype clause. Kotlin clauses open with `:`, Java
/// clauses with `extends` or `implements`.
fn supertype_references(clause: &str, language: Language) -> Vec<String> {
    let clause = clause.trim_start();
    let opens = match language {
        Language::Kotlin => clause.starts_with(':'),
        Language::Java => clause.starts_with("extends") || clause.starts_with("implements"),
    };
    if !opens {
        return Vec::new();
    }
    IDENTIFIER
        .find_iter(clause)
        .map(|m| m.as_str().trim_end_matches('.'))
        .filter(|name| !matches!(*name, "extends" | "implements" | "by"))
        .map(str::to_string)
        .collect()
}

/// Split `text` (starting with `open`) at its matching `close`, returning
/// the inner text and the remainder. Double-quoted strings are skipped.
fn balanced(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut previous = '\0';
    for (index, ch) in text.char_indices() {
        if in_string {
            if ch == '"' && previous != '\\' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close && !(close == '>' && previous == '-') {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some((&text[open.len_utf8()..index], &text[index + close.len_utf8()..]));
            }
        }
        previous = ch;
    }
    None
}

/// Every parameter in a Kotlin parameter list has a default value.
fn all_defaulted(params: &str) -> bool {
    split_top_level(params)
        .into_iter()
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .all(|param| param.contains('='))
}

fn split_top_level(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut previous = '\0';
    let mut start = 0;
    for (index, ch) in params.char_indices() {
        match ch {
            '"' if previous != '\\' => in_string = !in_string,
            _ if in_string => {}
            '(' | '[' | '{' | '<' => depth += 1,
            '>' if previous == '-' => {}
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&params[start..index]);
                start = index + 1;
            }
            _ => {}
        }
        previous = ch;
    }
    parts.push(&params[start..]);
    parts
}
