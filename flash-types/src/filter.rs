// SPDX-License-Identifier: GPL-3.0-only

//! Cascading selection over the device catalog
//!
//! Each column's options are the unique values (in order of first appearance)
//! of that column among the rows matching every column chosen before it.
//! Choosing a value clears every column after it.

use crate::catalog::{Catalog, CatalogRow, Column};

/// The chosen value for each of the five catalog columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: [Option<String>; 5],
}

impl Selection {
    pub fn get(&self, column: Column) -> Option<&str> {
        self.values[column.index()].as_deref()
    }

    /// Set `column` and clear all of its dependents.
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.values[column.index()] = Some(value.into());
        for dependent in column.dependents() {
            self.values[dependent.index()] = None;
        }
    }

    /// Clear `column` and all of its dependents.
    pub fn clear(&mut self, column: Column) {
        for slot in &mut self.values[column.index()..] {
            *slot = None;
        }
    }

    /// Every column has a non-empty value.
    pub fn is_complete(&self) -> bool {
        self.values
            .iter()
            .all(|v| v.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// True when `row` agrees with every chosen column in `columns`.
    ///
    /// An unchosen column matches nothing.
    fn matches(&self, row: &CatalogRow, columns: &[Column]) -> bool {
        columns
            .iter()
            .all(|c| self.get(*c).is_some_and(|v| row.value(*c) == v))
    }
}

/// Options for `column` given everything chosen before it.
pub fn options_for(catalog: &Catalog, selection: &Selection, column: Column) -> Vec<String> {
    let preceding = column.preceding();
    let mut options: Vec<String> = Vec::new();

    for row in catalog.rows() {
        if !selection.matches(row, preceding) {
            continue;
        }
        let value = row.value(column);
        if !options.iter().any(|o| o == value) {
            options.push(value.to_string());
        }
    }

    options
}

/// Catalog plus the selection and the option lists shown for each column.
#[derive(Debug, Clone, Default)]
pub struct CascadingFilter {
    catalog: Catalog,
    selection: Selection,
    options: [Vec<String>; 5],
}

impl CascadingFilter {
    pub fn new(catalog: Catalog) -> Self {
        let mut filter = Self {
            catalog,
            selection: Selection::default(),
            options: Default::default(),
        };
        filter.reset();
        filter
    }

    /// Drop every choice; only the first column has options afterwards.
    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.options = Default::default();
        self.options[Column::Vendor.index()] =
            options_for(&self.catalog, &self.selection, Column::Vendor);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn options(&self, column: Column) -> &[String] {
        &self.options[column.index()]
    }

    pub fn selected_index(&self, column: Column) -> Option<usize> {
        let value = self.selection.get(column)?;
        self.options(column).iter().position(|o| o == value)
    }

    /// Choose the option at `index` for `column`.
    ///
    /// Returns false (and changes nothing) when the index is out of range.
    pub fn select(&mut self, column: Column, index: usize) -> bool {
        let Some(value) = self.options(column).get(index).cloned() else {
            return false;
        };

        self.selection.set(column, value);
        for dependent in column.dependents() {
            self.options[dependent.index()].clear();
        }
        if let Some(next) = column.next() {
            self.options[next.index()] = options_for(&self.catalog, &self.selection, next);
        }

        true
    }

    /// Choose `value` for `column` if it is one of the current options.
    pub fn select_value(&mut self, column: Column, value: &str) -> bool {
        match self.options(column).iter().position(|o| o == value) {
            Some(index) => self.select(column, index),
            None => false,
        }
    }

    /// The catalog row described by a complete selection.
    pub fn selected_row(&self) -> Option<&CatalogRow> {
        if !self.selection.is_complete() {
            return None;
        }
        self.catalog
            .rows()
            .iter()
            .find(|row| self.selection.matches(row, &Column::ALL))
    }
}
