//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//! I service dipendono solo dai trait (`UserRepository`, `ProductRepository`):
//! in produzione si usa l'implementazione MySQL, nei test quella in memoria.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query sono scritte con le funzioni runtime (sqlx::query, query_as, query_scalar)
   e non con le macro query!/query_as!: le macro verificano lo schema a compile time
   e quindi richiedono un database raggiungibile durante la build.
   Il mapping riga -> struct lo fa #[derive(FromRow)] sulle entity.

   Quale metodo chiamare:
   .execute(...)         INSERT/UPDATE/DELETE, ritorna rows_affected / last_insert_id
   .fetch_optional(...)  zero o una riga -> Option<T>
   .fetch_one(...)       esattamente una riga (aggregati tipo COUNT(*))
   .fetch_all(...)       Vec<T>

   Attenzione: su MySQL rows_affected conta solo le righe effettivamente modificate,
   un UPDATE che riscrive gli stessi valori ritorna 0.
   Per i filtri dinamici della lista prodotti si usa QueryBuilder con push_bind,
   mai format! con valori dell'utente.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod memory;
pub mod product;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, RepositoryError, Update};

pub use memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use product::{MySqlProductRepository, ProductFilter, ProductRepository};
pub use user::{MySqlUserRepository, UserRepository};
