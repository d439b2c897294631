//! Collection catalog for the restaurant backend.
//!
//! The backend queries a fixed set of collections; requests naming anything
//! else are rejected before they reach the auditor. Each collection also
//! declares the secondary indexes the query layer relies on, so the audit
//! policy has something to enforce against.

use std::fmt;

use super::collection::{CollectionHandle, IndexSpec};
use super::errors::StoreResult;

/// The fixed collection allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Restaurantes,
    Ordenes,
    Articulos,
    Usuarios,
    Resenias,
}

impl Collection {
    /// All known collections
    pub const ALL: [Collection; 5] = [
        Collection::Restaurantes,
        Collection::Ordenes,
        Collection::Articulos,
        Collection::Usuarios,
        Collection::Resenias,
    ];

    /// Store-side collection name
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Restaurantes => "restaurantes",
            Collection::Ordenes => "ordenes",
            Collection::Articulos => "articulos",
            Collection::Usuarios => "usuarios",
            Collection::Resenias => "resenias",
        }
    }

    /// Resolves a request-supplied name against the allow-list
    pub fn parse(name: &str) -> Option<Collection> {
        Collection::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Secondary indexes this collection is expected to carry.
    ///
    /// `_id` is always indexed by the store and is not listed.
    pub fn declared_indexes(&self) -> &'static [&'static str] {
        match self {
            Collection::Restaurantes => &["nombre", "categorias"],
            Collection::Ordenes => &["usuario_id", "restaurante_id", "estado"],
            Collection::Articulos => &["restaurante_id", "categorias"],
            Collection::Usuarios => &["correo"],
            Collection::Resenias => &["restaurante_id", "orden_id"],
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issues the declared index creations for one collection through its
/// handle. Safe to run at every startup; `create_index` is idempotent on
/// the driver side.
pub async fn ensure_indexes<C>(collection: Collection, handle: &C) -> StoreResult<()>
where
    C: CollectionHandle + ?Sized,
{
    for field in collection.declared_indexes() {
        handle.create_index(IndexSpec::on(*field)).await?;
    }
    Ok(())
}
