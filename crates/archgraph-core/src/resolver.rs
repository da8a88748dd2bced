//! In-memory module resolution.
//!
//! Import specifiers are resolved against the set of declared files only; the
//! resolver never touches the filesystem. Anything that does not land on a
//! declared file (external packages, missing or excluded files, paths that
//! climb above the project root) resolves to `None`.

use crate::config::ResolveConfig;

const JS_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];
const JS_INDEX_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];
const JS_RUNTIME_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs"];

/// Normalize a path to its canonical identity: `/` separators, no `.` or
/// empty segments, `..` collapsed. Returns `None` for empty paths and paths
/// that climb above the root.
pub fn canonicalize(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Directory part of a canonical path (`""` for top-level files).
fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        rest.to_string()
    } else if rest.is_empty() {
        dir.to_string()
    } else {
        format!("{dir}/{rest}")
    }
}

fn file_name(path: &str) -> &str {
    path.rfind('/').map_or(path, |i| &path[i + 1..])
}

fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    name.rfind('.').filter(|&i| i > 0).map(|i| &name[i + 1..])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    JavaScript,
    Python,
    Rust,
    Jvm,
    Other,
}

impl Language {
    fn of(path: &str) -> Self {
        match extension(path) {
            Some("ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" | "mts" | "cts" | "vue" | "svelte") => {
                Language::JavaScript
            }
            Some("py" | "pyi") => Language::Python,
            Some("rs") => Language::Rust,
            Some("java" | "kt" | "kts") => Language::Jvm,
            _ => Language::Other,
        }
    }
}

/// A tsconfig-style alias key: `@app` (exact) or `@/*` (single wildcard).
#[derive(Debug, Clone)]
struct PathAlias {
    key: String,
    prefix: String,
    suffix: Option<String>,
    targets: Vec<String>,
}

impl PathAlias {
    fn new(key: &str, targets: &[String]) -> Self {
        let (prefix, suffix) = match key.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (key.to_string(), None),
        };
        Self {
            key: key.to_string(),
            prefix,
            suffix,
            targets: targets.to_vec(),
        }
    }

    /// The text captured by `*`, or `""` for an exact match.
    fn capture<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        match &self.suffix {
            None => (specifier == self.prefix).then_some(""),
            Some(suffix) => {
                let rest = specifier.strip_prefix(self.prefix.as_str())?;
                rest.strip_suffix(suffix.as_str())
            }
        }
    }
}

/// Compiled resolution settings. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    aliases: Vec<PathAlias>,
    base_url: Option<String>,
    package_roots: Vec<String>,
}

impl ModuleResolver {
    pub fn new(config: &ResolveConfig) -> Self {
        let mut aliases: Vec<PathAlias> = config
            .aliases
            .iter()
            .map(|(key, targets)| PathAlias::new(key, targets))
            .collect();
        aliases.sort_by(|a, b| {
            b.prefix
                .len()
                .cmp(&a.prefix.len())
                .then_with(|| a.key.cmp(&b.key))
        });

        let base_url = config
            .base_url
            .as_deref()
            .map(|b| canonicalize(b).unwrap_or_default());
        let package_roots = config
            .package_roots
            .iter()
            .map(|r| canonicalize(r).unwrap_or_default())
            .collect();

        Self {
            aliases,
            base_url,
            package_roots,
        }
    }

    /// Resolve `specifier`, imported from the canonical path `importer`, to a
    /// declared file for which `exists` returns true.
    pub fn resolve<F>(&self, importer: &str, specifier: &str, exists: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let specifier = specifier.trim();
        if specifier.is_empty() {
            return None;
        }
        let lookup = Lookup { exists: &exists };
        match Language::of(importer) {
            Language::JavaScript => self.resolve_js(&lookup, importer, specifier),
            Language::Python => self.resolve_python(&lookup, importer, specifier),
            Language::Rust => resolve_rust(&lookup, importer, specifier),
            Language::Jvm => self.resolve_jvm(&lookup, specifier),
            Language::Other => self.resolve_other(&lookup, importer, specifier),
        }
    }

    fn resolve_js(&self, lookup: &Lookup<'_>, importer: &str, specifier: &str) -> Option<String> {
        if is_relative(specifier) {
            let base = canonicalize(&join(parent_dir(importer), specifier))?;
            return lookup.js_candidates(&base);
        }
        if let Some(found) = self.resolve_alias(specifier, |target| lookup.js_candidates(target)) {
            return Some(found);
        }
        let base_url = self.base_url.as_deref()?;
        let base = canonicalize(&join(base_url, specifier))?;
        lookup.js_candidates(&base)
    }

    fn resolve_other(&self, lookup: &Lookup<'_>, importer: &str, specifier: &str) -> Option<String> {
        if is_relative(specifier) {
            let path = canonicalize(&join(parent_dir(importer), specifier))?;
            return lookup.exact(&path);
        }
        self.resolve_alias(specifier, |target| lookup.exact(target))
    }

    fn resolve_alias<F>(&self, specifier: &str, candidates: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.aliases.iter().find_map(|alias| {
            let captured = alias.capture(specifier)?;
            alias.targets.iter().find_map(|template| {
                let target = canonicalize(&template.replacen('*', captured, 1))?;
                candidates(&target)
            })
        })
    }

    fn resolve_python(&self, lookup: &Lookup<'_>, importer: &str, specifier: &str) -> Option<String> {
        let dots = specifier.chars().take_while(|&c| c == '.').count();
        let module = &specifier[dots..];
        let segments: Vec<&str> = module.split('.').filter(|s| !s.is_empty()).collect();

        if dots > 0 {
            // `.` is the importing package, each further dot one level up.
            let mut dir = parent_dir(importer).to_string();
            for _ in 1..dots {
                if dir.is_empty() {
                    return None;
                }
                dir = parent_dir(&dir).to_string();
            }
            // `from . import Name` falls back to the package's `__init__.py`.
            return lookup
                .python_module(&dir, &segments)
                .or_else(|| lookup.exact(&join(&dir, "__init__.py")))
                .filter(|target| target != importer);
        }

        if segments.is_empty() {
            return None;
        }
        self.package_roots
            .iter()
            .find_map(|root| lookup.python_module(root, &segments))
    }

    fn resolve_jvm(&self, lookup: &Lookup<'_>, specifier: &str) -> Option<String> {
        let specifier = specifier.strip_prefix("static ").unwrap_or(specifier).trim();
        if specifier.ends_with(".*") {
            return None;
        }
        let segments: Vec<&str> = specifier.split('.').filter(|s| !s.is_empty()).collect();
        self.package_roots.iter().find_map(|root| {
            (1..=segments.len()).rev().find_map(|len| {
                let base = join(root, &segments[..len].join("/"));
                ["java", "kt"]
                    .iter()
                    .find_map(|ext| lookup.exact(&format!("{base}.{ext}")))
            })
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

struct Lookup<'a> {
    exists: &'a dyn Fn(&str) -> bool,
}

impl Lookup<'_> {
    fn exact(&self, path: &str) -> Option<String> {
        (self.exists)(path).then(|| path.to_string())
    }

    fn first(&self, candidates: impl IntoIterator<Item = String>) -> Option<String> {
        candidates.into_iter().find(|c| (self.exists)(c))
    }

    fn js_candidates(&self, base: &str) -> Option<String> {
        if let Some(found) = self.exact(base) {
            return Some(found);
        }
        if let Some(found) = self.first(JS_EXTENSIONS.iter().map(|ext| format!("{base}.{ext}"))) {
            return Some(found);
        }
        if let Some(found) =
            self.first(JS_INDEX_EXTENSIONS.iter().map(|ext| format!("{base}/index.{ext}")))
        {
            return Some(found);
        }
        // ESM sources import `./x.js` for a `./x.ts` file.
        let (stem, ext) = base.rsplit_once('.')?;
        if JS_RUNTIME_EXTENSIONS.contains(&ext) && !stem.ends_with('/') {
            return self.first(["ts", "tsx"].iter().map(|e| format!("{stem}.{e}")));
        }
        None
    }

    /// Longest dotted prefix first: `pkg.mod.Name` tries `pkg/mod/Name`, then
    /// `pkg/mod`, then `pkg`. No segments means the package itself.
    fn python_module(&self, dir: &str, segments: &[&str]) -> Option<String> {
        if segments.is_empty() {
            return self.exact(&join(dir, "__init__.py"));
        }
        (1..=segments.len()).rev().find_map(|len| {
            let base = join(dir, &segments[..len].join("/"));
            self.first([format!("{base}.py"), format!("{base}/__init__.py")])
        })
    }

    /// Longest `::` prefix first, then the module file of `dir` itself.
    fn rust_module(&self, dir: &str, segments: &[&str]) -> Option<String> {
        let nested = (1..=segments.len()).rev().find_map(|len| {
            let base = join(dir, &segments[..len].join("/"));
            self.first([format!("{base}.rs"), format!("{base}/mod.rs")])
        });
        nested.or_else(|| self.rust_module_file(dir))
    }

    fn rust_module_file(&self, dir: &str) -> Option<String> {
        let mut candidates = vec![
            join(dir, "lib.rs"),
            join(dir, "main.rs"),
            join(dir, "mod.rs"),
        ];
        if !dir.is_empty() {
            candidates.push(format!("{dir}.rs"));
        }
        self.first(candidates)
    }
}

/// Directory holding the child modules of the module defined by `path`.
fn rust_children_dir(path: &str) -> String {
    let dir = parent_dir(path);
    match file_name(path) {
        "lib.rs" | "main.rs" | "mod.rs" => dir.to_string(),
        name => join(dir, name.trim_end_matches(".rs")),
    }
}

/// Nearest enclosing `src` directory, or the file's own directory.
fn rust_crate_root(path: &str) -> String {
    let dir = parent_dir(path);
    let segments: Vec<&str> = dir.split('/').collect();
    match segments.iter().rposition(|s| *s == "src") {
        Some(i) => segments[..=i].join("/"),
        None => dir.to_string(),
    }
}

fn resolve_rust(lookup: &Lookup<'_>, importer: &str, specifier: &str) -> Option<String> {
    let specifier = specifier.trim_start_matches("::");
    let mut segments: Vec<&str> = specifier.split("::").map(str::trim).collect();
    // Glob and grouped imports name the module they are taken from.
    if let Some(pos) = segments
        .iter()
        .position(|s| *s == "*" || s.starts_with('{'))
    {
        segments.truncate(pos);
    }

    let (dir, rest) = match segments.first().copied() {
        Some("crate") => (rust_crate_root(importer), &segments[1..]),
        Some("self") => (rust_children_dir(importer), &segments[1..]),
        Some("super") => {
            let mut dir = rust_children_dir(importer);
            let mut consumed = 0;
            while segments.get(consumed) == Some(&"super") {
                if dir.is_empty() {
                    return None;
                }
                dir = parent_dir(&dir).to_string();
                consumed += 1;
            }
            (dir, &segments[consumed..])
        }
        _ => return None,
    };

    lookup
        .rust_module(&dir, rest)
        // `use self::Type` names an item of the importing module, not a dependency.
        .filter(|target| target != importer)
}
