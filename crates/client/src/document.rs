//! Document trait
//!
//! Any `Serialize + DeserializeOwned` type can be stored; implementing
//! [`Document`] opts it into the collection surface. The
//! `assign_identifiers` hook is the identifier write-back point: after
//! every successful mutation the collection calls it with the
//! server-assigned identifiers, and a type that carries id/key/rev fields
//! can copy them in. The default does nothing, which is correct for types
//! that do not mirror server identifiers.

use serde::de::DeserializeOwned;
use serde::Serialize;
use vellum_core::DocumentMeta;

/// A storable document type.
pub trait Document: Serialize + DeserializeOwned {
    /// Write server-assigned identifiers back onto the instance.
    ///
    /// Called after every successful mutation (and after tracked reads).
    /// Override when the type exposes settable identifier fields.
    fn assign_identifiers(&mut self, meta: &DocumentMeta) {
        let _ = meta;
    }
}
