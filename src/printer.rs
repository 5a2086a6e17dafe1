use std::io::{self, Write};

use terminal_size::{terminal_size, Width};

use crate::registry::{FieldId, OptionRegistry};

const DESCRIPTION_GAP: &str = "   ";
// Below this many free columns, wrapping degenerates; print long instead.
const MIN_DESCRIPTION_WIDTH: usize = 16;

/// Renders the declared options as an aligned usage listing.
///
/// Options sort by their short name (long name when no short exists),
/// case-insensitively with a case-sensitive tiebreak.  Each line carries the
/// right-aligned short name, the long name, `<arg0> ..` placeholders for the
/// argument tokens, and the description (suffixed with `[required]` where it
/// applies).  Descriptions longer than the output width wrap onto
/// continuation lines aligned with the description column.
pub struct UsagePrinter<'r> {
    registry: &'r OptionRegistry,
    width: Option<usize>,
}

struct Row {
    short: Option<String>,
    long: Option<String>,
    args: Option<String>,
    description: String,
}

impl<'r> UsagePrinter<'r> {
    /// A printer capped at the current terminal width, uncapped when the
    /// width cannot be determined (output is piped, for instance).
    pub fn new(registry: &'r OptionRegistry) -> Self {
        let width = terminal_size().map(|(Width(w), _)| w as usize);
        Self { registry, width }
    }

    /// A printer capped at an explicit width (`None` never wraps).
    pub fn with_width(registry: &'r OptionRegistry, width: Option<usize>) -> Self {
        Self { registry, width }
    }

    /// Write the usage listing.  Writes nothing at all when no option carries
    /// a name.
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        let rows: Vec<Row> = self
            .sorted_fields()
            .into_iter()
            .map(|field| self.row(field))
            .collect();
        let max_short = column_width(rows.iter().map(|r| r.short.as_deref()));
        let max_long = column_width(rows.iter().map(|r| r.long.as_deref()));
        let max_args = column_width(rows.iter().map(|r| r.args.as_deref()));
        if max_short == 0 && max_long == 0 {
            return Ok(());
        }
        for row in &rows {
            let mut line = String::from(" ");
            if max_short != 0 {
                match &row.short {
                    Some(short) => line.push_str(&format!("{short:>max_short$}")),
                    None => line.push_str(&" ".repeat(max_short)),
                }
            }
            if max_short != 0 && max_long != 0 {
                line.push(if row.short.is_some() && row.long.is_some() {
                    ','
                } else {
                    ' '
                });
            }
            if max_long != 0 {
                match &row.long {
                    Some(long) => line.push_str(&format!("{long:<max_long$}")),
                    None => line.push_str(&" ".repeat(max_long)),
                }
            }
            if max_args != 0 {
                match &row.args {
                    Some(args) => {
                        line.push(' ');
                        line.push_str(&format!("{args:<max_args$}"));
                    }
                    None => line.push_str(&" ".repeat(1 + max_args)),
                }
            }
            if row.description.is_empty() {
                writeln!(out, "{}", line.trim_end())?;
                continue;
            }
            let column = line.chars().count() + DESCRIPTION_GAP.len();
            let mut chunks = self.wrap(&row.description, column).into_iter();
            if let Some(first) = chunks.next() {
                writeln!(out, "{line}{DESCRIPTION_GAP}{first}")?;
            }
            for chunk in chunks {
                writeln!(out, "{}{chunk}", " ".repeat(column))?;
            }
        }
        Ok(())
    }

    fn sorted_fields(&self) -> Vec<FieldId> {
        let mut fields = self.registry.named_fields();
        fields.sort_by(|a, b| {
            let key_a = self.sort_key(*a);
            let key_b = self.sort_key(*b);
            key_a
                .to_lowercase()
                .cmp(&key_b.to_lowercase())
                .then_with(|| key_a.cmp(key_b))
        });
        fields
    }

    fn sort_key(&self, field: FieldId) -> &str {
        self.registry
            .short_name_of(field)
            .or_else(|| self.registry.long_name_of(field))
            .unwrap_or("")
    }

    fn row(&self, field: FieldId) -> Row {
        let args = self.registry.arg_names(field);
        let args = if args.is_empty() {
            None
        } else {
            Some(
                args.iter()
                    .map(|name| format!("<{name}>"))
                    .collect::<Vec<String>>()
                    .join(" "),
            )
        };
        let mut description = self.registry.description(field).to_string();
        if self.registry.is_required(field) {
            if description.is_empty() {
                description.push_str("[required]");
            } else {
                description.push_str(" [required]");
            }
        }
        Row {
            short: self.registry.short_name_of(field).map(|s| format!("-{s}")),
            long: self.registry.long_name_of(field).map(|l| format!("--{l}")),
            args,
            description,
        }
    }

    /// Split a description into lines of at most `width - column` characters,
    /// breaking on whitespace.  A description that already fits (or an output
    /// too narrow to wrap sensibly) comes back as a single untouched line.
    fn wrap(&self, text: &str, column: usize) -> Vec<String> {
        let available = match self.width {
            Some(width)
                if column + text.chars().count() > width
                    && width > column + MIN_DESCRIPTION_WIDTH =>
            {
                width - column
            }
            _ => return vec![text.to_string()],
        };
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
            } else if current.chars().count() + 1 + word.chars().count() <= available {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

fn column_width<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> usize {
    cells
        .flatten()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
}
