// SPDX-License-Identifier: GPL-3.0-only

use crate::catalog::{CatalogRow, Column};
use crate::filter::Selection;
use std::fmt;

/// Password for the privilege-elevation command.
///
/// Never printed: `Debug` is redacted so it cannot leak through tracing fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Everything the flash script needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashInvocation {
    pub product: String,
    pub module: String,
    pub jetpack: String,
    pub storage: String,
    pub keep_files: bool,
    pub username: String,
    pub credential: Credential,
}

impl FlashInvocation {
    /// Build an invocation from the selector form.
    ///
    /// Returns `None` when any of the five columns is unset or the credential
    /// is blank; the caller treats that as "nothing to do".
    pub fn from_selection(
        selection: &Selection,
        keep_files: bool,
        username: impl Into<String>,
        credential: &Credential,
    ) -> Option<Self> {
        if credential.is_blank() || !selection.is_complete() {
            return None;
        }

        Some(Self {
            product: selection.get(Column::Product)?.to_string(),
            module: selection.get(Column::Module)?.to_string(),
            jetpack: selection.get(Column::Jetpack)?.to_string(),
            storage: selection.get(Column::Storage)?.to_string(),
            keep_files,
            username: username.into(),
            credential: credential.clone(),
        })
    }

    /// Build an invocation from a catalog row of the table view.
    pub fn from_row(
        row: &CatalogRow,
        keep_files: bool,
        username: impl Into<String>,
        credential: &Credential,
    ) -> Option<Self> {
        if credential.is_blank() {
            return None;
        }

        Some(Self {
            product: row.product.clone(),
            module: row.module.clone(),
            jetpack: row.jetpack.clone(),
            storage: row.storage.clone(),
            keep_files,
            username: username.into(),
            credential: credential.clone(),
        })
    }

    /// Positional arguments of the flash script, in order.
    pub fn script_args(&self) -> [String; 6] {
        [
            self.product.clone(),
            self.module.clone(),
            self.jetpack.clone(),
            self.storage.clone(),
            keep_files_arg(self.keep_files).to_string(),
            self.username.clone(),
        ]
    }

    /// Short human label, e.g. for log lines.
    pub fn describe(&self) -> String {
        format!(
            "{} / {} / JetPack {} / {}",
            self.product, self.module, self.jetpack, self.storage
        )
    }
}

/// The script expects Python-style booleans.
pub fn keep_files_arg(keep_files: bool) -> &'static str {
    if keep_files { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_selection() -> Selection {
        let mut selection = Selection::default();
        selection.set(Column::Vendor, "NVIDIA");
        selection.set(Column::Product, "AGX DevKit");
        selection.set(Column::Module, "AGX Orin");
        selection.set(Column::Jetpack, "6.2");
        selection.set(Column::Storage, "nvme");
        selection
    }

    #[test]
    fn complete_form_yields_ordered_script_args() {
        let invocation = FlashInvocation::from_selection(
            &complete_selection(),
            true,
            "jetson",
            &Credential::new("hunter2"),
        )
        .unwrap();

        assert_eq!(
            invocation.script_args(),
            ["AGX DevKit", "AGX Orin", "6.2", "nvme", "True", "jetson"].map(String::from)
        );
    }

    #[test]
    fn blank_credential_is_a_no_op() {
        for secret in ["", "   "] {
            assert!(
                FlashInvocation::from_selection(
                    &complete_selection(),
                    false,
                    "jetson",
                    &Credential::new(secret)
                )
                .is_none()
            );
        }
    }

    #[test]
    fn any_missing_column_is_a_no_op() {
        for column in Column::ALL {
            let mut selection = complete_selection();
            selection.clear(column);
            assert!(
                FlashInvocation::from_selection(
                    &selection,
                    false,
                    "jetson",
                    &Credential::new("pw")
                )
                .is_none(),
                "{column} cleared"
            );
        }
    }

    #[test]
    fn keep_files_renders_python_booleans() {
        assert_eq!(keep_files_arg(true), "True");
        assert_eq!(keep_files_arg(false), "False");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let rendered = format!("{:?}", Credential::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn row_invocation_uses_row_values() {
        let row = CatalogRow {
            vendor: "Seeed".into(),
            product: "J4012".into(),
            module: "Orin NX 16GB".into(),
            jetpack: "6.0".into(),
            storage: "nvme".into(),
        };
        let invocation =
            FlashInvocation::from_row(&row, false, "jetson", &Credential::new("pw")).unwrap();
        assert_eq!(invocation.product, "J4012");
        assert_eq!(invocation.module, "Orin NX 16GB");
        assert_eq!(invocation.script_args()[4], "False");
    }
}
