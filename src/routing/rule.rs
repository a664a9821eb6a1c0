//! Rule definitions: which host a rule matches and how its directories are laid out.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::routing::matcher::{match_host, Pattern};

/// A directory category a rule can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Static,
    Content,
    Template,
}

impl Category {
    /// All categories, in resolution order.
    pub const ALL: [Category; 3] = [Category::Static, Category::Content, Category::Template];

    /// Default directory name for this category.
    pub fn default_name(self) -> &'static str {
        match self {
            Category::Static => "_static",
            Category::Content => "_content",
            Category::Template => "_template",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A set of enabled categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Categories([bool; 3]);

impl Categories {
    pub const NONE: Categories = Categories([false; 3]);
    pub const ALL: Categories = Categories([true; 3]);

    /// Return a copy with `category` enabled.
    pub fn with(mut self, category: Category) -> Self {
        self.0[category.index()] = true;
        self
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0[category.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|enabled| !enabled)
    }

    /// Enabled categories in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Category> for Categories {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        iter.into_iter().fold(Categories::NONE, Categories::with)
    }
}

/// Which categories a rule publishes and which path segments it joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub categories: Categories,
    /// Leave the category name out of composed paths.
    pub skip_category_segment: bool,
    /// Leave the domain out of composed paths.
    pub skip_domain_segment: bool,
}

impl Layout {
    pub fn new(categories: Categories) -> Self {
        Self {
            categories,
            skip_category_segment: false,
            skip_domain_segment: false,
        }
    }

    pub fn skip_category_segment(mut self) -> Self {
        self.skip_category_segment = true;
        self
    }

    pub fn skip_domain_segment(mut self) -> Self {
        self.skip_domain_segment = true;
        self
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(Categories::ALL)
    }
}

/// One domain-matching and path-composition entry.
///
/// Paths are composed as `root/[prefix.]domain/name`, where each segment can
/// be dropped by the layout flags or by an empty category name. Composed
/// paths never leave `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pattern: Pattern,
    domain: String,
    root: PathBuf,
    layout: Layout,
    names: [String; 3],
}

impl Rule {
    /// Build a rule. `names` supplies up to three category names in
    /// static, content, template order; missing entries take the defaults
    /// and extra entries are ignored.
    pub fn new<S: AsRef<str>>(
        pattern: Pattern,
        domain: impl Into<String>,
        root: impl Into<PathBuf>,
        layout: Layout,
        names: &[S],
    ) -> Self {
        let names = Category::ALL.map(|category| {
            names
                .get(category.index())
                .map(|n| n.as_ref().to_string())
                .unwrap_or_else(|| category.default_name().to_string())
        });

        Self {
            pattern,
            domain: domain.into(),
            root: root.into(),
            layout,
            names,
        }
    }

    /// Build a rule with the default category names.
    pub fn with_defaults(
        pattern: Pattern,
        domain: impl Into<String>,
        root: impl Into<PathBuf>,
        layout: Layout,
    ) -> Self {
        let no_names: [&str; 0] = [];
        Self::new(pattern, domain, root, layout, &no_names)
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Directory name for `category`. May be empty.
    pub fn name(&self, category: Category) -> &str {
        &self.names[category.index()]
    }

    /// Match a port-less host. See [`match_host`].
    pub fn matches<'a>(&self, host: &'a str) -> Option<&'a str> {
        match_host(&self.domain, self.pattern, host)
    }

    /// Compose the directory for `category` given the matched subdomain prefix.
    pub fn compose(&self, prefix: &str, category: Category) -> PathBuf {
        let mut dir = self.root.clone();
        if !self.layout.skip_domain_segment {
            if prefix.is_empty() {
                push_segment(&mut dir, &self.domain);
            } else {
                push_segment(&mut dir, &format!("{}.{}", prefix, self.domain));
            }
        }
        push_segment(&mut dir, self.category_segment(category));
        dir
    }

    /// Compose the shared directory used when the per-subdomain one is missing.
    pub fn compose_fallback(&self, category: Category) -> PathBuf {
        self.compose("", category)
    }

    fn category_segment(&self, category: Category) -> &str {
        if self.layout.skip_category_segment {
            ""
        } else {
            self.name(category)
        }
    }
}

/// Append the plain components of `segment` to `dir`.
///
/// Root, prefix, `.` and `..` components are dropped: the prefix comes from
/// the Host header and must not replace or climb out of `dir`.
fn push_segment(dir: &mut PathBuf, segment: &str) {
    for component in Path::new(segment).components() {
        if let Component::Normal(part) = component {
            dir.push(part);
        }
    }
}
