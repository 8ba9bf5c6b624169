// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

/// Rows of `T`, one cell per column, written in a [`TableStyle`].
pub struct Table<'a, S, T, C> {
    style: S,
    columns: &'a [C],
    data: &'a [T],
}

impl<'a, S, T, C> Table<'a, S, T, C>
where
    S: TableStyle,
    C: TableColumn<T>,
{
    pub fn new(style: S, columns: &'a [C], data: &'a [T]) -> Self {
        Self {
            style,
            columns,
            data,
        }
    }
}

impl<S, T, C> fmt::Display for Table<'_, S, T, C>
where
    S: TableStyle,
    C: TableColumn<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.style.fmt_table(f, self.columns, self.data)
    }
}

pub trait TableColumn<T> {
    fn name(&self) -> Cow<'_, str>;

    /// Object key in JSON output.
    fn key(&self) -> Cow<'_, str> {
        self.name().to_lowercase().replace(' ', "_").into()
    }

    fn format<'a>(&self, data: &'a T) -> Cow<'a, str>;

    fn padding_direction(&self) -> PaddingDirection {
        PaddingDirection::Left
    }

    fn color(&self, _data: &T) -> Option<Color> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

pub trait TableStyle {
    fn fmt_table<T, C: TableColumn<T>>(
        &self,
        f: &mut fmt::Formatter<'_>,
        columns: &[C],
        data: &[T],
    ) -> fmt::Result;
}

/// Aligned plain-text columns.
#[derive(Debug, Clone, Copy)]
pub struct TableStyleBasic {
    separator: &'static str,
    header: bool,
}

impl TableStyleBasic {
    pub fn new() -> Self {
        Self {
            separator: " ",
            header: false,
        }
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

impl TableStyle for TableStyleBasic {
    fn fmt_table<T, C: TableColumn<T>>(
        &self,
        f: &mut fmt::Formatter<'_>,
        columns: &[C],
        data: &[T],
    ) -> fmt::Result {
        let header: Vec<Cow<'_, str>> = columns.iter().map(|c| c.name()).collect();
        let rows: Vec<Vec<Cow<'_, str>>> = data
            .iter()
            .map(|d| columns.iter().map(|c| c.format(d)).collect())
            .collect();

        let mut widths = vec![0; columns.len()];
        if self.header {
            update_widths(&mut widths, &header);
        }
        for row in &rows {
            update_widths(&mut widths, row);
        }

        let last = columns.len().saturating_sub(1);
        let padded = |i: usize, cell: &str| -> String {
            let direction = columns[i].padding_direction();
            // Last column does not need padding if it's left-aligned
            if i == last && direction == PaddingDirection::Left {
                cell.to_string()
            } else {
                pad(cell, widths[i], direction)
            }
        };

        if self.header && !rows.is_empty() {
            for (i, cell) in header.iter().enumerate() {
                write!(f, "{}", padded(i, cell).bold())?;
                write_separator(f, i == last, self.separator)?;
            }
        }

        for (row, item) in rows.iter().zip(data) {
            for (i, cell) in row.iter().enumerate() {
                let cell = padded(i, cell);
                match columns[i].color(item) {
                    Some(color) => write!(f, "{}", cell.color(color))?,
                    None => write!(f, "{cell}")?,
                }
                write_separator(f, i == last, self.separator)?;
            }
        }
        Ok(())
    }
}

/// A JSON array with one object per row, keyed by column.
#[derive(Debug, Clone, Copy)]
pub struct TableStyleJson;

impl TableStyleJson {
    pub fn new() -> Self {
        Self
    }

    pub fn rows<T, C: TableColumn<T>>(columns: &[C], data: &[T]) -> Vec<serde_json::Value> {
        data.iter()
            .map(|item| {
                let object = columns
                    .iter()
                    .map(|c| (c.key().into_owned(), c.format(item).into_owned().into()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect()
    }
}

impl TableStyle for TableStyleJson {
    fn fmt_table<T, C: TableColumn<T>>(
        &self,
        f: &mut fmt::Formatter<'_>,
        columns: &[C],
        data: &[T],
    ) -> fmt::Result {
        let rows = serde_json::Value::Array(Self::rows(columns, data));
        write_json(f, &rows)
    }
}

pub fn write_json(f: &mut fmt::Formatter<'_>, value: &serde_json::Value) -> fmt::Result {
    let json = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
    writeln!(f, "{json}")
}

fn update_widths(widths: &mut [usize], row: &[Cow<'_, str>]) {
    for (width, cell) in widths.iter_mut().zip(row) {
        *width = (*width).max(cell.width());
    }
}

fn pad(cell: &str, width: usize, direction: PaddingDirection) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match direction {
        PaddingDirection::Left => format!("{cell}{fill}"),
        PaddingDirection::Right => format!("{fill}{cell}"),
    }
}

fn write_separator(f: &mut fmt::Formatter<'_>, last: bool, separator: &str) -> fmt::Result {
    if last {
        writeln!(f)
    } else {
        write!(f, "{separator}")
    }
}
