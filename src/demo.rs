#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Built-in submissions for trying the pipeline without any files.

use crate::submission::{SourceFile, Submission};

/// Statement shared by every demo case.
pub const STATEMENT: &str = include_str!("demo/statement.txt");

/// One demo submission.
#[derive(Debug, Clone, Copy)]
pub struct DemoCase {
    /// Label printed before the case runs.
    pub name: &'static str,
    /// Java source.
    pub code: &'static str,
}

impl DemoCase {
    /// The case as a single-file submission named `BankAccount.java`.
    pub fn submission(&self) -> Submission {
        Submission::from_files([SourceFile::new("BankAccount.java", self.code)])
    }
}

/// A correct, an incorrect and a partially correct `BankAccount`, in that
/// order.
pub fn cases() -> [DemoCase; 3] {
    [
        DemoCase {
            name: "CASE 1: CORRECT CODE",
            code: include_str!("demo/correct.java"),
        },
        DemoCase {
            name: "CASE 2: INCORRECT CODE",
            code: include_str!("demo/incorrect.java"),
        },
        DemoCase {
            name: "CASE 3: PARTIALLY CORRECT CODE",
            code: include_str!("demo/partial.java"),
        },
    ]
}
