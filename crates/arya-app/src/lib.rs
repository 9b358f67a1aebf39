// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod debounce;
pub mod error;
pub mod forms;
pub mod ids;
pub mod list;
pub mod model;
pub mod pagination;
pub mod repository;
pub mod state;
pub mod store;

pub use debounce::*;
pub use error::*;
pub use forms::*;
pub use ids::*;
pub use list::*;
pub use model::*;
pub use pagination::*;
pub use repository::*;
pub use state::*;
pub use store::*;
