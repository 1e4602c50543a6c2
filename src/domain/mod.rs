//! Domain layer - gateway protocol and payment lifecycle logic.

pub mod foundation;
pub mod payment;
pub mod sealing;
