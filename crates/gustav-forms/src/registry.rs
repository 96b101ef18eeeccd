//! One-time initialization per page element.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::convert::Infallible;

use crate::controller::FormController;

/// Roles of the elements the front end binds behaviour to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    TaskSubmitForm,
    MaterialCreateForm,
    SidebarToggle,
    SidebarClose,
    ThemeToggle,
}

/// Instances keyed by element role and element key.
///
/// Binding the same element twice hands back the existing instance, so a
/// re-run of page initialization after a partial swap does not double-bind.
#[derive(Debug)]
pub struct InitRegistry<T> {
    entries: HashMap<(ElementRole, String), T>,
}

pub type FormRegistry = InitRegistry<FormController>;

impl<T> Default for InitRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> InitRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the instance for `(role, key)`, creating it with `init` on first use.
    /// The flag is `true` when `init` ran.
    pub fn ensure_with<F>(&mut self, role: ElementRole, key: &str, init: F) -> (&mut T, bool)
    where
        F: FnOnce() -> T,
    {
        match self.try_ensure_with(role, key, || Ok::<_, Infallible>(init())) {
            Ok(entry) => entry,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`ensure_with`](Self::ensure_with). Nothing is registered on error.
    pub fn try_ensure_with<F, E>(
        &mut self,
        role: ElementRole,
        key: &str,
        init: F,
    ) -> Result<(&mut T, bool), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        match self.entries.entry((role, key.to_string())) {
            Entry::Occupied(entry) => Ok((entry.into_mut(), false)),
            Entry::Vacant(entry) => {
                let value = init()?;
                tracing::debug!(role = ?role, key, "Element initialized");
                Ok((entry.insert(value), true))
            }
        }
    }

    pub fn get(&self, role: ElementRole, key: &str) -> Option<&T> {
        self.entries.get(&(role, key.to_string()))
    }

    pub fn get_mut(&mut self, role: ElementRole, key: &str) -> Option<&mut T> {
        self.entries.get_mut(&(role, key.to_string()))
    }

    pub fn is_initialized(&self, role: ElementRole, key: &str) -> bool {
        self.entries.contains_key(&(role, key.to_string()))
    }

    /// Forget an element that left the page.
    pub fn remove(&mut self, role: ElementRole, key: &str) -> Option<T> {
        self.entries.remove(&(role, key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
