// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod column;
pub mod ids;
pub mod record;
pub mod screen;
pub mod state;
pub mod store;
pub mod view;

pub use column::*;
pub use ids::*;
pub use record::*;
pub use screen::*;
pub use state::*;
pub use store::*;
pub use view::*;
