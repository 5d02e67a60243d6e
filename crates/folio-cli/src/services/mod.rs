// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges the command line to the folio backend crates.
//
// Each service wraps one workflow (a chapter run, a batch, an assisted
// assembly) and owns the filesystem side of it.

pub mod assist;
pub mod batch;
pub mod chapter;
pub mod layout;
pub mod output;
pub mod settings;
