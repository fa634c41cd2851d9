// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials handled by kubevault.
//!
//! Vault session tokens and Kubernetes service-account JWTs pass through
//! several layers (config, credential manager, HTTP backend). Wrapping them in
//! [`Secret<T>`] keeps them out of logs and config dumps:
//!
//! - `Debug`/`Display` print `[REDACTED]`
//! - `Serialize` writes `"[REDACTED]"`
//! - memory is zeroized on drop
//! - the raw value is only reachable through [`Secret::expose`]
//!
//! ```
//! use kubevault_common_secret::SecretString;
//!
//! let token = SecretString::new("hvs.CAESIJ".to_string());
//! assert_eq!(format!("{token}"), "[REDACTED]");
//! assert_eq!(token.expose(), "hvs.CAESIJ");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must never be printed, logged or serialized in clear text.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// Secret strings are the only flavour kubevault needs: tokens and JWTs.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Every call site is a place a credential leaves
	/// the wrapper, so keep them few and obvious.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_hide_vault_token() {
		let token = SecretString::new("hvs.super-secret".to_string());

		assert_eq!(format!("{token}"), REDACTED);
		let debug = format!("{token:?}");
		assert!(debug.contains(REDACTED));
		assert!(!debug.contains("hvs.super-secret"));
	}

	#[test]
	fn optional_token_debug_is_redacted() {
		let token: Option<SecretString> = Some("eyJhbGciOi".to_string().into());
		let debug = format!("{token:?}");
		assert!(!debug.contains("eyJhbGciOi"));
	}

	#[test]
	fn expose_returns_wrapped_value() {
		let jwt = SecretString::new("eyJhbGciOi.payload.sig".to_string());
		assert_eq!(jwt.expose(), "eyJhbGciOi.payload.sig");
		assert_eq!(jwt.clone(), jwt);
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serialize_writes_placeholder() {
		let token = SecretString::new("hvs.super-secret".to_string());
		let json = serde_json::to_string(&token).unwrap();
		assert_eq!(json, format!("\"{REDACTED}\""));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn deserialize_keeps_value() {
		let token: SecretString = serde_json::from_str(r#""hvs.from-json""#).unwrap();
		assert_eq!(token.expose(), "hvs.from-json");
	}

	proptest! {
		#[test]
		fn formatting_never_leaks(inner in "[a-zA-Z0-9._-]{4,64}") {
			prop_assume!(!REDACTED.contains(&inner));
			prop_assume!(!"Secret".contains(&inner));

			let secret = SecretString::new(inner.clone());
			let displayed = format!("{secret}");
			let debugged = format!("{secret:?}");
			prop_assert!(!displayed.contains(&inner));
			prop_assert!(!debugged.contains(&inner));
		}
	}
}
