// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by kubevault crates.
//!
//! - [`Secret<T>`]: redacting wrapper (re-exported from
//!   [`kubevault_common_secret`])
//! - [`env`]: readers for plain, typed and `*_FILE`-backed environment values

pub mod env;

pub use kubevault_common_secret::{Secret, SecretString, REDACTED};

pub use env::{env_optional, env_or_default, env_parse_or_default, load_secret_env, EnvError};
