//! LilyPond output
//!
//! `printer` formats text, `music` walks the event tree, `notation` builds
//! decoration tokens and `staff` prints the staff layout around the music.

pub mod export;
pub mod music;
pub mod notation;
pub mod printer;
pub mod staff;

pub use export::{emit_document, emit_music, emit_staff, export_to_file};
pub use music::{print_child, print_definition, print_music, print_sequential};
pub use printer::{FactorScope, OutputPrinter, RelativeScope};
pub use staff::print_staff_group;
