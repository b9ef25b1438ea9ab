//! Stateful LilyPond text emitter
//!
//! `OutputPrinter` owns everything that changes while a music tree is
//! printed: the current line, the bracket nesting used for indentation, the
//! last duration token (so repeated durations can be left out), the stack
//! of duration factors for tuplet and grace scopes, and the relative-pitch
//! cursor. Scopes are entered through guards that restore the previous
//! state when dropped, so an early `?` return never leaks a factor or a
//! relative mode into the surrounding music.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use crate::errors::EmitError;
use crate::models::duration::{checked_product, checked_quotient};
use crate::models::{Duration, Pitch, PitchLanguage, Rational};
use crate::settings::EmitterSettings;

/// Formats LilyPond source into width-limited, indented lines
pub struct OutputPrinter<W: Write> {
    sink: W,
    line: String,
    line_width: usize,
    indent_width: usize,
    nesting: usize,
    /// Next word is glued to the line without a separating space
    skip_space: bool,
    /// Inside a double-quoted string (brackets do not count there)
    in_string: bool,
    last_duration: Option<String>,
    /// Duration factors; the bottom entry is always 1
    factors: Vec<Rational>,
    /// `Some(cursor)` in relative mode, `None` in absolute mode
    relative: Option<Pitch>,
    language: PitchLanguage,
    version: String,
}

impl<W: Write> OutputPrinter<W> {
    pub fn new(sink: W, settings: &EmitterSettings) -> Self {
        Self {
            sink,
            line: String::new(),
            line_width: settings.line_width,
            indent_width: settings.indent_width,
            nesting: 0,
            skip_space: true,
            in_string: false,
            last_duration: None,
            factors: vec![Rational::from_integer(1)],
            relative: None,
            language: settings.language,
            version: settings.target_lilypond_version.clone(),
        }
    }

    /// Text of the line not yet written to the sink
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn language(&self) -> PitchLanguage {
        self.language
    }

    // ========================================================================
    // LINE BUFFER
    // ========================================================================

    /// Append text as is: no wrapping, no nesting update
    pub fn print_verbatim(&mut self, text: &str) {
        self.line.push_str(text);
    }

    /// Append text without wrapping, tracking the bracket nesting it opens
    /// and closes
    pub fn unformatted_output(&mut self, text: &str) {
        self.update_nesting(text);
        self.print_verbatim(text);
    }

    /// Append one word, starting a new line first if it would not fit
    pub fn add_word(&mut self, word: &str) -> Result<(), EmitError> {
        if word.chars().count() + 1 + self.line.chars().count() > self.line_width {
            self.newline()?;
        }
        if !self.skip_space {
            self.line.push(' ');
        }
        self.unformatted_output(word);
        self.skip_space = false;
        Ok(())
    }

    /// Append text: glued to the line after a `newline` or `skip_space`,
    /// otherwise word by word with wrapping
    ///
    /// A quoted string never extends past the text of one call, so an
    /// unbalanced `"` cannot hide the brackets of later output.
    pub fn dump(&mut self, text: &str) -> Result<(), EmitError> {
        self.in_string = false;
        if self.skip_space {
            self.skip_space = false;
            self.unformatted_output(text);
        } else {
            for word in text.split_whitespace() {
                self.add_word(word)?;
            }
        }
        self.in_string = false;
        Ok(())
    }

    /// Glue the next dumped text to the current line
    pub fn skip_space(&mut self) {
        self.skip_space = true;
    }

    /// Write the current line and start an indented one
    pub fn newline(&mut self) -> Result<(), EmitError> {
        writeln!(self.sink, "{}", self.line.trim_end())?;
        self.line = " ".repeat(self.indent_width * self.nesting);
        self.skip_space = true;
        Ok(())
    }

    /// `\version "..."` on a line of its own
    pub fn dump_version(&mut self) -> Result<(), EmitError> {
        self.newline()?;
        let version = format!("\\version \"{}\"", self.version);
        self.print_verbatim(&version);
        self.newline()
    }

    /// Write any pending text, flush and hand back the sink
    pub fn close(mut self) -> Result<W, EmitError> {
        if !self.line.trim().is_empty() {
            self.newline()?;
        }
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn update_nesting(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            if self.in_string {
                if c == '"' && !is_escaped(&chars, i) {
                    self.in_string = false;
                }
                i += 1;
                continue;
            }
            match c {
                '"' => self.in_string = true,
                '{' => self.nesting += 1,
                '}' => self.nesting = self.nesting.saturating_sub(1),
                '<' if prev == Some('\\') => {}
                '>' if matches!(prev, Some('\\' | '-' | '_' | '^')) => {}
                '<' => {
                    // `<<` opens a single level
                    if chars.get(i + 1) == Some(&'<') {
                        i += 1;
                    }
                    self.nesting += 1;
                }
                '>' => {
                    if chars.get(i + 1) == Some(&'>') {
                        i += 1;
                    }
                    self.nesting = self.nesting.saturating_sub(1);
                }
                _ => {}
            }
            i += 1;
        }
    }

    // ========================================================================
    // DURATIONS
    // ========================================================================

    /// Current duration factor (product of all open factor scopes)
    pub fn duration_factor(&self) -> Rational {
        self.factors
            .last()
            .copied()
            .unwrap_or_else(|| Rational::from_integer(1))
    }

    /// Append a duration token unless it repeats the previous one
    pub fn print_duration_string(&mut self, token: &str) {
        if self.last_duration.as_deref() == Some(token) {
            return;
        }
        self.unformatted_output(token);
        self.last_duration = Some(token.to_string());
    }

    /// Print a duration relative to the current factor scope
    pub fn print_duration(&mut self, duration: &Duration) {
        let factor = checked_quotient(duration.factor, self.duration_factor()).unwrap_or_else(|| {
            log::warn!(
                "duration factor {} out of range in scope {}, printed unscaled",
                duration.factor,
                self.duration_factor()
            );
            duration.factor
        });
        let token = duration.ly_expression_with(factor);
        self.print_duration_string(&token);
    }

    /// Forget the last duration so the next one is always written
    pub fn invalidate_duration(&mut self) {
        self.last_duration = None;
    }

    /// Enter a scope whose durations are scaled by `factor`
    ///
    /// A product that does not fit a `Rational` keeps the current factor.
    pub fn push_factor(&mut self, factor: Rational) -> FactorScope<'_, W> {
        let current = self.duration_factor();
        let top = checked_product(current, factor).unwrap_or_else(|| {
            log::warn!("factor {} overflows scope {}, scope left unscaled", factor, current);
            current
        });
        self.factors.push(top);
        FactorScope { printer: self }
    }

    // ========================================================================
    // PITCHES
    // ========================================================================

    pub fn is_relative(&self) -> bool {
        self.relative.is_some()
    }

    /// Enter relative mode with `base` as the reference pitch
    pub fn enter_relative(&mut self, base: Pitch) -> RelativeScope<'_, W> {
        let saved = self.relative.replace(base);
        RelativeScope {
            printer: self,
            saved,
        }
    }

    /// Move the relative cursor; ignored in absolute mode
    pub fn set_relative_cursor(&mut self, pitch: Pitch) {
        if let Some(cursor) = self.relative.as_mut() {
            *cursor = pitch;
        }
    }

    /// Note name plus octave marks for the current pitch mode
    ///
    /// In relative mode the marks are taken against the cursor, which then
    /// moves to `pitch`.
    pub fn pitch_expression(&mut self, pitch: &Pitch) -> String {
        let name = pitch.step_name(self.language);
        match self.relative.as_mut() {
            Some(cursor) => {
                let marks = pitch.relative_octave_marks(cursor);
                *cursor = *pitch;
                format!("{}{}", name, marks)
            }
            None => format!("{}{}", name, pitch.absolute_octave_marks()),
        }
    }
}

/// Whether the quote at `index` is preceded by an odd run of backslashes
fn is_escaped(chars: &[char], index: usize) -> bool {
    chars[..index]
        .iter()
        .rev()
        .take_while(|c| **c == '\\')
        .count()
        % 2
        == 1
}

// ============================================================================
// SCOPE GUARDS
// ============================================================================

/// Open duration-factor scope; pops the factor when dropped
pub struct FactorScope<'a, W: Write> {
    printer: &'a mut OutputPrinter<W>,
}

impl<W: Write> Deref for FactorScope<'_, W> {
    type Target = OutputPrinter<W>;

    fn deref(&self) -> &Self::Target {
        self.printer
    }
}

impl<W: Write> DerefMut for FactorScope<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.printer
    }
}

impl<W: Write> Drop for FactorScope<'_, W> {
    fn drop(&mut self) {
        if self.printer.factors.len() > 1 {
            self.printer.factors.pop();
        }
    }
}

/// Open relative-pitch scope; restores the outer mode and cursor when dropped
pub struct RelativeScope<'a, W: Write> {
    printer: &'a mut OutputPrinter<W>,
    saved: Option<Pitch>,
}

impl<W: Write> Deref for RelativeScope<'_, W> {
    type Target = OutputPrinter<W>;

    fn deref(&self) -> &Self::Target {
        self.printer
    }
}

impl<W: Write> DerefMut for RelativeScope<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.printer
    }
}

impl<W: Write> Drop for RelativeScope<'_, W> {
    fn drop(&mut self) {
        self.printer.relative = self.saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printer_with_width(width: usize) -> OutputPrinter<Vec<u8>> {
        let settings = EmitterSettings {
            line_width: width,
            ..EmitterSettings::default()
        };
        OutputPrinter::new(Vec::new(), &settings)
    }

    fn output(printer: OutputPrinter<Vec<u8>>) -> String {
        String::from_utf8(printer.close().unwrap()).unwrap()
    }

    #[test]
    fn test_wraps_before_overflowing_word() {
        let mut printer = printer_with_width(10);
        printer.dump("aaaa").unwrap();
        printer.dump("bbbb").unwrap();
        printer.dump("cccc").unwrap();
        assert_eq!(output(printer), "aaaa bbbb\ncccc\n");
    }

    #[test]
    fn test_long_word_is_never_split() {
        let mut printer = printer_with_width(5);
        printer.dump("a").unwrap();
        printer.dump("abcdefghij").unwrap();
        assert_eq!(output(printer), "a\nabcdefghij\n");
    }

    #[test]
    fn test_dump_after_newline_is_glued() {
        let mut printer = printer_with_width(72);
        printer.dump("{").unwrap();
        printer.newline().unwrap();
        printer.dump("c'4  d'4").unwrap();
        printer.dump("e'4").unwrap();
        // first dump on a fresh line goes out verbatim
        assert_eq!(printer.line(), "    c'4  d'4 e'4");
    }

    #[test]
    fn test_nesting_drives_indentation() {
        let mut printer = printer_with_width(72);
        printer.dump("\\new Staff <<").unwrap();
        printer.newline().unwrap();
        printer.dump("{").unwrap();
        printer.newline().unwrap();
        printer.dump("c'4").unwrap();
        printer.newline().unwrap();
        printer.dump("}").unwrap();
        printer.newline().unwrap();
        printer.dump(">>").unwrap();
        assert_eq!(
            output(printer),
            "\\new Staff <<\n    {\n        c'4\n        }\n    >>\n"
        );
    }

    #[test]
    fn test_nesting_ignores_dynamics_and_articulations() {
        let mut printer = printer_with_width(72);
        printer.unformatted_output("\\< \\> c-> c^> c_> <<");
        assert_eq!(printer.nesting(), 1);
        printer.unformatted_output("<c e>4 >>");
        assert_eq!(printer.nesting(), 0);
    }

    #[test]
    fn test_nesting_ignores_quoted_text() {
        let mut printer = printer_with_width(72);
        printer.unformatted_output("\\mark \"{<\"");
        assert_eq!(printer.nesting(), 0);
        // a quoted string split over several words of one dump
        printer.dump("x").unwrap();
        printer.dump("\"a { b\\\" }\"").unwrap();
        assert_eq!(printer.nesting(), 0);
        printer.dump("{").unwrap();
        assert_eq!(printer.nesting(), 1);
    }

    #[test]
    fn test_unbalanced_quote_ends_with_its_dump() {
        let mut printer = printer_with_width(72);
        printer.dump("x").unwrap();
        printer.dump("\\markup \"open").unwrap();
        printer.dump("{").unwrap();
        assert_eq!(printer.nesting(), 1);
    }

    #[test]
    fn test_escaped_backslash_closes_string() {
        let mut printer = printer_with_width(72);
        // "a\\" is a complete string ending in a backslash
        printer.unformatted_output("\"a\\\\\" {");
        assert_eq!(printer.nesting(), 1);
    }

    #[test]
    fn test_newline_trims_trailing_space() {
        let mut printer = printer_with_width(72);
        printer.print_verbatim("c'4   ");
        printer.newline().unwrap();
        assert_eq!(output(printer), "c'4\n");
    }

    #[test]
    fn test_repeated_duration_is_suppressed() {
        let mut printer = printer_with_width(72);
        let quarter = Duration::new(2, 0);
        printer.print_duration(&quarter);
        printer.print_duration(&quarter);
        assert_eq!(printer.line(), "4");

        printer.invalidate_duration();
        printer.print_duration(&quarter);
        assert_eq!(printer.line(), "44");
    }

    #[test]
    fn test_factor_scope_scales_and_restores() {
        let mut printer = printer_with_width(72);
        {
            let mut scope = printer.push_factor(Rational::new(2, 3));
            assert_eq!(scope.duration_factor(), Rational::new(2, 3));
            scope.print_duration(&Duration::new(2, 0));
            assert_eq!(scope.line(), "4*3/2");
        }
        assert_eq!(printer.duration_factor(), Rational::from_integer(1));
        printer.dump(" ").unwrap();
        printer.print_duration(&Duration::new(2, 0));
        assert_eq!(printer.line(), "4*3/2 4");
    }

    #[test]
    fn test_factor_scopes_multiply() {
        let mut printer = printer_with_width(72);
        let mut outer = printer.push_factor(Rational::new(2, 3));
        let inner = outer.push_factor(Rational::new(4, 5));
        assert_eq!(inner.duration_factor(), Rational::new(8, 15));
        drop(inner);
        assert_eq!(outer.duration_factor(), Rational::new(2, 3));
        let neutral = outer.push_factor(Rational::from_integer(1));
        assert_eq!(neutral.duration_factor(), Rational::new(2, 3));
    }

    #[test]
    fn test_factor_overflow_keeps_scope() {
        let mut printer = printer_with_width(72);
        let huge = Rational::new(i32::MAX, 1);
        let mut outer = printer.push_factor(huge);
        let inner = outer.push_factor(huge);
        assert_eq!(inner.duration_factor(), huge);
    }

    #[test]
    fn test_unrepresentable_duration_factor_prints_unscaled() {
        let mut printer = printer_with_width(72);
        let mut scope = printer.push_factor(Rational::new(1, i32::MAX));
        let quarter = Duration::new(2, 0).with_factor(Rational::new(i32::MAX - 1, 1));
        scope.print_duration(&quarter);
        assert_eq!(scope.line(), format!("4*{}", i32::MAX - 1));
    }

    #[test]
    fn test_factor_scope_pops_on_early_return() {
        fn fails<W: Write>(printer: &mut OutputPrinter<W>) -> Result<(), EmitError> {
            let _scope = printer.push_factor(Rational::new(2, 3));
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom").into())
        }
        let mut printer = printer_with_width(72);
        assert!(fails(&mut printer).is_err());
        assert_eq!(printer.duration_factor(), Rational::from_integer(1));
    }

    #[test]
    fn test_relative_cursor_moves() {
        let mut printer = printer_with_width(72);
        let c4 = Pitch::new(0, 0, 0);
        let c5 = Pitch::new(0, 0, 1);

        assert_eq!(printer.pitch_expression(&c5), "c''");
        let mut relative = printer.enter_relative(c4);
        assert!(relative.is_relative());
        let marks: Vec<String> = [c5, c4, c5]
            .iter()
            .map(|p| relative.pitch_expression(p))
            .collect();
        assert_eq!(marks, vec!["c'", "c,", "c'"]);
        drop(relative);
        assert!(!printer.is_relative());
        assert_eq!(printer.pitch_expression(&c4), "c'");
    }

    #[test]
    fn test_nested_relative_restores_outer_cursor() {
        let mut printer = printer_with_width(72);
        let mut outer = printer.enter_relative(Pitch::new(0, 0, 0));
        assert_eq!(outer.pitch_expression(&Pitch::new(4, 0, 0)), "g'");
        {
            let mut inner = outer.enter_relative(Pitch::new(0, 0, 2));
            assert_eq!(inner.pitch_expression(&Pitch::new(0, 0, 2)), "c");
        }
        // the outer cursor is still g'
        assert_eq!(outer.pitch_expression(&Pitch::new(0, 0, 1)), "c");
    }

    #[test]
    fn test_dump_version() {
        let mut printer = printer_with_width(72);
        printer.dump_version().unwrap();
        assert_eq!(output(printer), "\n\\version \"2.24.0\"\n");
    }
}
