//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod product;
pub mod query;
pub mod user;

// Re-exports per facilitare l'import
pub use product::{BulkStatusDTO, CreateProductDTO, ProductListDTO, StockUpdateDTO, UpdateProductDTO};
pub use query::{Pagination, ProductQuery, SearchQuery};
pub use user::{
    AuthResponseDTO, ChangePasswordDTO, CreateUserDTO, LoginDTO, MessageResponseDTO,
    RefreshTokenDTO, RegisterDTO, TokenDTO, UpdateProfileDTO, UpdateUserDTO, UserDTO,
};
