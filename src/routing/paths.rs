//! Per-request resolved directories.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::routing::rule::Category;

macro_rules! dir_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(PathBuf);

        impl $name {
            pub fn new(path: impl Into<PathBuf>) -> Self {
                Self(path.into())
            }

            pub fn into_path_buf(self) -> PathBuf {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Path;

            fn deref(&self) -> &Path {
                &self.0
            }
        }

        impl AsRef<Path> for $name {
            fn as_ref(&self) -> &Path {
                &self.0
            }
        }
    };
}

dir_newtype!(
    /// Directory static assets are served from.
    StaticDir
);
dir_newtype!(
    /// Directory page content is read from.
    ContentDir
);
dir_newtype!(
    /// Directory templates are loaded from.
    TemplateDir
);

/// Directories resolved for one request.
///
/// `resolved` marks that some resolver already handled this request; later
/// resolvers in the same pipeline leave it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootPaths {
    pub static_dir: Option<StaticDir>,
    pub content_dir: Option<ContentDir>,
    pub template_dir: Option<TemplateDir>,
    pub resolved: bool,
}

impl RootPaths {
    /// Store `dir` under `category`.
    pub fn publish(&mut self, category: Category, dir: PathBuf) {
        match category {
            Category::Static => self.static_dir = Some(StaticDir(dir)),
            Category::Content => self.content_dir = Some(ContentDir(dir)),
            Category::Template => self.template_dir = Some(TemplateDir(dir)),
        }
    }

    /// The directory stored under `category`, if any.
    pub fn get(&self, category: Category) -> Option<&Path> {
        match category {
            Category::Static => self.static_dir.as_deref(),
            Category::Content => self.content_dir.as_deref(),
            Category::Template => self.template_dir.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }
}
