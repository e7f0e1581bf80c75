//! Export surfaces
//!
//! An [`ExportSurface`] is the set of named bindings one module interface
//! exposes for one package. Surfaces are built through the
//! [`BindingReflector`] seam so that the enumeration policy (inherited
//! bindings, unreadable bindings) is explicit and testable on its own.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Binding name every module namespace carries for the default export
pub const DEFAULT_EXPORT: &str = "default";

/// Marker binding a transpiler adds to modules generated from another format
pub const TRANSPILATION_MARKER: &str = "__esModule";

/// Whether bindings found on the prototype chain count as exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritedBindings {
    /// Some packages attach their named exports to a prototype
    #[default]
    Include,
    /// Only the exported object's own bindings
    Exclude,
}

/// Reading a binding threw (e.g. a deprecated accessor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingAccessError {
    pub name: String,
}

/// Reflection capability over a loaded module value
pub trait BindingReflector {
    /// Enumerable bindings defined directly on the value
    fn own_bindings(&self) -> Vec<String>;

    /// Enumerable bindings found further up the prototype chain
    fn inherited_bindings(&self) -> Vec<String>;

    /// Read a binding, failing if the access throws
    fn read(&self, name: &str) -> std::result::Result<(), BindingAccessError>;
}

/// Surface as reported by the loader harness, before any policy is applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSurface {
    #[serde(default)]
    pub own: Vec<String>,
    #[serde(default)]
    pub inherited: Vec<String>,
    /// Subset of `own` and `inherited` whose read threw
    #[serde(default)]
    pub unreadable: Vec<String>,
    /// Whether the value carries a truthy transpilation marker
    #[serde(default)]
    pub transpiled: bool,
}

impl BindingReflector for RawSurface {
    fn own_bindings(&self) -> Vec<String> {
        self.own.clone()
    }

    fn inherited_bindings(&self) -> Vec<String> {
        self.inherited.clone()
    }

    fn read(&self, name: &str) -> std::result::Result<(), BindingAccessError> {
        if self.unreadable.iter().any(|n| n == name) {
            Err(BindingAccessError {
                name: name.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Named bindings of one module interface, markers removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSurface {
    names: BTreeSet<String>,
}

impl ExportSurface {
    /// Build a surface from any iterator of names, dropping the default and transpilation markers
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name| !is_marker(name))
            .collect();
        Self { names }
    }

    /// Enumerate a module value through its reflector
    ///
    /// Bindings whose read fails are left out rather than failing the
    /// whole enumeration.
    pub fn enumerate(reflector: &dyn BindingReflector, inherited: InheritedBindings) -> Self {
        let mut candidates = reflector.own_bindings();
        if inherited == InheritedBindings::Include {
            candidates.extend(reflector.inherited_bindings());
        }

        let readable = candidates.into_iter().filter(|name| {
            reflector
                .read(name)
                .map_err(|e| tracing::trace!(binding = %e.name, "skipping unreadable binding"))
                .is_ok()
        });
        Self::from_names(readable)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn is_marker(name: &str) -> bool {
    name == DEFAULT_EXPORT || name == TRANSPILATION_MARKER
}
