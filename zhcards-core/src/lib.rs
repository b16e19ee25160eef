pub mod codec;
pub mod errors;
pub mod ids;
pub mod migration;
pub mod models;
pub mod order;
pub mod repo;
pub mod share;
pub mod store;

pub use codec::*;
pub use errors::*;
pub use ids::*;
pub use migration::*;
pub use models::*;
pub use order::*;
pub use repo::*;
pub use share::*;
pub use store::*;
