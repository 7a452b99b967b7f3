use std::io::Write;

use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};

/// Render `builder` as a table. Columns in `numeric` are right aligned.
pub(crate) fn write_table(
    out: &mut impl Write,
    builder: Builder,
    numeric: &[usize],
) -> Result<(), String> {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    for &column in numeric {
        table.modify(Columns::new(column..=column), Alignment::right());
    }

    writeln!(out, "{table}").map_err(write_error)
}

pub(crate) fn write_line(out: &mut impl Write, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(write_error)
}

fn write_error(error: std::io::Error) -> String {
    format!("failed to write output: {error}")
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn numeric_columns_are_right_aligned() -> TestResult {
        let mut builder = Builder::default();
        builder.push_record(["Nombre", "Total"]);
        builder.push_record(["Pera", "1"]);
        builder.push_record(["Manzana", "172.00"]);

        let mut out = Vec::new();
        write_table(&mut out, builder, &[1])?;

        let rendered = String::from_utf8(out)?;
        let pera = rendered
            .lines()
            .find(|line| line.contains("Pera"))
            .ok_or("pera row should be rendered")?;

        assert!(pera.contains("      1 "), "total not right aligned: {pera}");
        assert!(pera.contains("Pera    "), "name not left aligned: {pera}");

        Ok(())
    }
}
