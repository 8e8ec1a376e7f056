// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every query takes a `&mut SqliteConnection` and returns owned domain
//! values reconstructed from the stored rows. Nothing in this module
//! writes to the database.

pub mod audit;
pub mod config;
pub mod historical;
pub mod versions;
