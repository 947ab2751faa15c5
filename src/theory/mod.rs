//! Music theory: pitch classes, chord structure, Nashville conversion.

pub mod chord;
pub mod nashville;
pub mod pitch;

pub use chord::{Alteration, Chord, Quality};
pub use nashville::{convert, infer_mode, Key, Mode};
pub use pitch::PitchClass;
