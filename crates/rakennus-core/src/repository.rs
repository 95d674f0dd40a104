//! The `Repository` trait — the one seam between the store and its callers.
//!
//! Implemented by storage backends (e.g. `rakennus-store-sqlite`). The lookup
//! commands and the populator depend on this abstraction.

use std::future::Future;

use crate::{
  building::Building,
  reference::{Actor, Neighbourhood, Upsert, UseType},
  spec::BuildingSpec,
};

/// Abstraction over a building store backend.
///
/// Every building write runs in a single backend transaction: either all of
/// its rows (address, building, author links, use links) are written, or
/// none are.
pub trait Repository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Buildings ─────────────────────────────────────────────────────────

  /// Fetch the buildings matching `spec`, with author ids and use types
  /// loaded.
  ///
  /// A building whose use types cannot be loaded is still returned, with
  /// those collections empty. A failure loading author ids fails the call.
  fn query<'a>(
    &'a self,
    spec: &'a BuildingSpec,
  ) -> impl Future<Output = Result<Vec<Building>, Self::Error>> + Send + 'a;

  /// Store a new building aggregate and return it with ids and timestamps
  /// assigned.
  fn add(
    &self,
    building: Building,
  ) -> impl Future<Output = Result<Building, Self::Error>> + Send + '_;

  /// Overwrite an existing building by id. Author and use links are replaced
  /// wholesale by the collections on `building`.
  fn update(
    &self,
    building: Building,
  ) -> impl Future<Output = Result<Building, Self::Error>> + Send + '_;

  /// Soft-delete a building. Its address and links are left in place.
  fn remove(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Actors ────────────────────────────────────────────────────────────

  /// Store an actor, or return the stored one if the name is taken.
  fn add_actor(
    &self,
    actor: Actor,
  ) -> impl Future<Output = Result<Upsert<Actor>, Self::Error>> + Send + '_;

  fn actor_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + 'a;

  fn list_actors(
    &self,
  ) -> impl Future<Output = Result<Vec<Actor>, Self::Error>> + Send + '_;

  // ── Neighbourhoods ────────────────────────────────────────────────────

  /// Store a neighbourhood, or return the stored one if the
  /// `(name, municipality)` pair is taken.
  fn add_neighbourhood(
    &self,
    neighbourhood: Neighbourhood,
  ) -> impl Future<Output = Result<Upsert<Neighbourhood>, Self::Error>> + Send + '_;

  fn neighbourhood<'a>(
    &'a self,
    name: &'a str,
    municipality: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<Neighbourhood>, Self::Error>> + Send + 'a;

  fn list_neighbourhoods(
    &self,
  ) -> impl Future<Output = Result<Vec<Neighbourhood>, Self::Error>> + Send + '_;

  /// Neighbourhoods are import-only reference data; backends may refuse.
  fn update_neighbourhood(
    &self,
    neighbourhood: Neighbourhood,
  ) -> impl Future<Output = Result<Neighbourhood, Self::Error>> + Send + '_;

  fn remove_neighbourhood(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Use types ─────────────────────────────────────────────────────────

  /// Store a use type, or return the stored one with the same English name.
  fn add_use_type(
    &self,
    use_type: UseType,
  ) -> impl Future<Output = Result<Upsert<UseType>, Self::Error>> + Send + '_;

  fn list_use_types(
    &self,
  ) -> impl Future<Output = Result<Vec<UseType>, Self::Error>> + Send + '_;
}
