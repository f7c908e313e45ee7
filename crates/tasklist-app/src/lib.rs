// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod controller;
pub mod editor;
pub mod model;
pub mod store;

pub use controller::*;
pub use editor::*;
pub use model::*;
pub use store::*;
