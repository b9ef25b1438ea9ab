//! LilyPond export entry points
//!
//! Convenience wrappers that create an `OutputPrinter`, run one print pass
//! and hand back the text (or write it to a file).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::music::{print_definition, print_music};
use super::printer::OutputPrinter;
use super::staff::print_staff_group;
use crate::errors::EmitError;
use crate::models::{MusicTree, NodeId, PitchLanguage, StaffGroup};
use crate::settings::EmitterSettings;

/// Render one music node (and everything below it)
pub fn emit_music(
    tree: &MusicTree,
    root: NodeId,
    settings: &EmitterSettings,
) -> Result<String, EmitError> {
    let mut printer = OutputPrinter::new(Vec::new(), settings);
    print_music(tree, root, &mut printer)?;
    finish(printer)
}

/// Render a staff layout
pub fn emit_staff(staff: &StaffGroup, settings: &EmitterSettings) -> Result<String, EmitError> {
    let mut printer = OutputPrinter::new(Vec::new(), settings);
    print_staff_group(staff, &mut printer)?;
    finish(printer)
}

/// Render a complete document: version, language, music definitions and the
/// score built from the staff layout
pub fn emit_document(
    tree: &MusicTree,
    definitions: &[NodeId],
    staff: &StaffGroup,
    settings: &EmitterSettings,
) -> Result<String, EmitError> {
    let mut printer = OutputPrinter::new(Vec::new(), settings);
    print_document(tree, definitions, staff, settings, &mut printer)?;
    finish(printer)
}

/// Write a complete document to `path`
pub fn export_to_file(
    path: &Path,
    tree: &MusicTree,
    definitions: &[NodeId],
    staff: &StaffGroup,
    settings: &EmitterSettings,
) -> Result<(), EmitError> {
    let file = File::create(path)?;
    let mut printer = OutputPrinter::new(BufWriter::new(file), settings);
    print_document(tree, definitions, staff, settings, &mut printer)?;
    printer.close()?;
    log::info!("LilyPond output written to {}", path.display());
    Ok(())
}

fn print_document<W: Write>(
    tree: &MusicTree,
    definitions: &[NodeId],
    staff: &StaffGroup,
    settings: &EmitterSettings,
    printer: &mut OutputPrinter<W>,
) -> Result<(), EmitError> {
    printer.dump_version()?;
    if settings.language != PitchLanguage::default() {
        printer.dump(&format!("\\language \"{}\"", settings.language.name()))?;
        printer.newline()?;
    }
    printer.newline()?;

    for definition in definitions {
        if tree.node(*definition).identifier.is_none() {
            log::warn!("definition {:?} has no identifier and cannot be referenced", definition);
        }
        print_definition(tree, *definition, printer)?;
    }

    printer.dump("\\score {")?;
    printer.newline()?;
    print_staff_group(staff, printer)?;
    printer.dump("}")?;
    printer.newline()
}

fn finish(printer: OutputPrinter<Vec<u8>>) -> Result<String, EmitError> {
    let bytes = printer.close()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
