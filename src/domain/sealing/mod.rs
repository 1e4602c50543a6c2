//! Sealing - the Monetico MAC ("seal") scheme.
//!
//! The gateway authenticates messages in both directions with an HMAC-SHA1
//! over a canonical serialization of the message fields, keyed with a
//! derived form of the merchant's production key. This module owns the
//! three pieces of that scheme: key derivation, field canonicalization and
//! the seal computation itself.

mod errors;
mod fields;
mod key;
mod sealer;

pub use errors::SealError;
pub use fields::{FieldSet, SEAL_FIELD};
pub use key::UsableKey;
pub use sealer::{seal, verify, Seal};
