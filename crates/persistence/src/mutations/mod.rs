// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database mutations.
//!
//! Multi-row writes run inside a single Diesel transaction so a failure
//! leaves no partial state behind.

pub mod audit;
pub mod config;
pub mod historical;
pub mod versions;
