//! Interned identifiers.
//!
//! Protocol, associated-type and nominal-type names occur over and over in
//! symbols, and the rewrite system compares symbols constantly; interning
//! turns those comparisons into integer equality. A `NameId` is only
//! meaningful relative to the table that issued it.

use rustc_hash::FxHashMap;

/// Id of an interned name, an index into its [`NameTable`].
pub type NameId = usize;

/// Issues ids for names and resolves them back.
///
/// Append-only; ids stay valid for the table's lifetime.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
    ids: FxHashMap<String, NameId>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for `name`, issuing a fresh one on first sight.
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        id
    }

    /// The name behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this table.
    #[inline]
    pub fn resolve(&self, id: NameId) -> &str {
        &self.names[id]
    }
}
