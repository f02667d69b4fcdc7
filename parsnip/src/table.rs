use std::cmp::max;

/// Column-aligned plain-text rendering, used for the ACTION/GOTO and LL(1) table printouts.
#[derive(Default, Debug, Clone)]
pub(crate) struct Table {
    column_widths: Vec<usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        if row.len() > self.column_widths.len() {
            self.column_widths.resize(row.len(), 0);
        }
        self.column_widths
            .iter_mut()
            .zip(&row)
            .for_each(|(width, cell)| *width = max(*width, cell.chars().count()));
        self.rows.push(row);
    }

    pub(crate) fn to_string(&self, separator: &str) -> String {
        let pad = |cell: &str, width: usize| {
            let have = cell.chars().count();
            if have < width {
                format!("{}{}", cell, " ".repeat(width - have))
            } else {
                cell.to_string()
            }
        };
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.column_widths)
                    .map(|(cell, width)| pad(cell, *width))
                    .collect::<Vec<_>>()
                    .join(separator)
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let mut table = Table::default();
        table.push_row(vec!["a".into(), "bb".into()]);
        table.push_row(vec!["ccc".into(), "d".into()]);
        assert_eq!(table.to_string(" "), "a   bb\nccc d");
    }
}
