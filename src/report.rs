//! Plain-text listings of tokens and symbol tables
//!
//! Tables are rendered in org-table style:
//!
//! ```text
//! | Kind       | Value | Line |
//! |------------+-------+------|
//! | IDENTIFIER | x     |    1 |
//! ```

use crate::parser::token::Token;
use crate::semantics::manager::SymbolTableManager;
use std::fmt::Write;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Table with one header row. Columns are padded to their widest cell.
struct TextTable {
    headers: Vec<&'static str>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new(headers: &[(&'static str, Align)]) -> Self {
        TextTable {
            headers: headers.iter().map(|(h, _)| *h).collect(),
            align: headers.iter().map(|(_, a)| *a).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row.get(i).map_or(0, |cell| cell.chars().count()))
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        self.write_row(&mut out, &header, &widths, true);

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        let _ = writeln!(out, "|{}|", rule.join("+"));

        for row in &self.rows {
            self.write_row(&mut out, row, &widths, false);
        }
        out
    }

    fn write_row(&self, out: &mut String, row: &[String], widths: &[usize], header: bool) {
        out.push('|');
        for (i, &width) in widths.iter().enumerate() {
            let cell = row.get(i).map_or("", |c| c.as_str());
            let align = if header { Align::Left } else { self.align[i] };
            let _ = match align {
                Align::Left => write!(out, " {:<width$} |", cell, width = width),
                Align::Right => write!(out, " {:>width$} |", cell, width = width),
            };
        }
        out.push('\n');
    }
}

/// Kind, literal value and line of every token.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut table = TextTable::new(&[
        ("Kind", Align::Left),
        ("Value", Align::Left),
        ("Line", Align::Right),
    ]);
    for token in tokens {
        table.push(vec![
            token.kind.name().to_string(),
            token.unquoted().to_string(),
            token.line.to_string(),
        ]);
    }
    table.render()
}

pub fn render_definition_table(symbols: &SymbolTableManager) -> String {
    let mut table = TextTable::new(&[
        ("Name", Align::Left),
        ("Access", Align::Left),
        ("Kind", Align::Left),
        ("Parent", Align::Left),
        ("Interfaces", Align::Left),
    ]);
    for def in symbols.definitions() {
        table.push(vec![
            def.name.clone(),
            def.access.to_string(),
            def.kind.to_string(),
            def.parent.clone().unwrap_or_default(),
            def.interfaces.join(", "),
        ]);
    }
    table.render()
}

/// One member table per definition, each under a `name (kind)` heading.
pub fn render_member_tables(symbols: &SymbolTableManager) -> String {
    let mut out = String::new();
    for def in symbols.definitions() {
        let mut table = TextTable::new(&[
            ("Name", Align::Left),
            ("Access", Align::Left),
            ("Type", Align::Left),
            ("Static", Align::Left),
        ]);
        for member in &def.members {
            table.push(vec![
                member.name.clone(),
                member.access.to_string(),
                member.member_type.to_string(),
                member.is_static.to_string(),
            ]);
        }
        let _ = writeln!(out, "{} ({})", def.name, def.kind);
        out.push_str(&table.render());
        out.push('\n');
    }
    out
}

pub fn render_scope_table(symbols: &SymbolTableManager) -> String {
    let mut table = TextTable::new(&[
        ("Name", Align::Left),
        ("Type", Align::Left),
        ("Scope", Align::Right),
    ]);
    for entry in symbols.scope_table() {
        table.push(vec![
            entry.name.clone(),
            entry.type_info.to_string(),
            entry.scope.to_string(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::Parser;

    #[test]
    fn test_token_listing_strips_quotes() {
        let listing = render_tokens(&tokenize("declare string s = \"hi\";"));
        let lines: Vec<&str> = listing.lines().collect();
        assert!(lines[0].starts_with("| Kind "));
        assert!(lines[1].starts_with("|---"));
        let literal = lines
            .iter()
            .find(|line| line.contains("STRING_LITERAL"))
            .unwrap();
        assert!(literal.ends_with("| hi      |    1 |"));
        assert!(!listing.contains("\"hi\""));
        assert_eq!(lines.len(), 2 + 7);
    }

    #[test]
    fn test_symbol_tables() {
        let mut parser = Parser::new(
            "class Main { declare int count; mainEntry() { declare float x = 1.5; } }",
        );
        parser.parse_program().unwrap();
        let symbols = parser.symbols();

        let definitions = render_definition_table(symbols);
        assert!(definitions.contains("| Main | public | class |"));

        let members = render_member_tables(symbols);
        assert!(members.starts_with("Main (class)\n"));
        assert!(members.contains("| count       | private | var int      | false  |"));
        assert!(members.contains("fn() -> void"));

        let scopes = render_scope_table(symbols);
        assert!(scopes.contains("| x    | float |     1 |"));
    }
}
