// src/operation/parser.rs

//! Parser for the pending operation file format
//!
//! Line oriented. A line without leading space is a directive (`newpackage`,
//! `source`, `package`, `split`, `superset`). A line with one leading space
//! is a file entry of the open block, optionally `path -> link-target`.

use super::{FileEntry, OperationDescriptor, PackageOpKind, PackageOperation};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const LINK_SEPARATOR: &str = " -> ";

/// Parse the operation file at `path`
pub fn parse_file(path: &Path) -> Result<OperationDescriptor> {
    let content = fs::read_to_string(path)?;
    parse(path, &content)
}

/// Parse operation text; `path` is recorded in the descriptor and in errors
pub fn parse(path: &Path, content: &str) -> Result<OperationDescriptor> {
    let mut parser = OpParser::new(path);
    for (index, line) in content.lines().enumerate() {
        parser.parse_line(index + 1, line)?;
    }
    parser.finish()
}

struct OpParser<'a> {
    file: &'a Path,
    new_package: Option<String>,
    source: Option<PathBuf>,
    packages: Vec<PackageOperation>,
    current: Option<PackageOperation>,
}

impl<'a> OpParser<'a> {
    fn new(file: &'a Path) -> Self {
        Self {
            file,
            new_package: None,
            source: None,
            packages: Vec::new(),
            current: None,
        }
    }

    fn error(&self, line_number: usize, message: impl Into<String>) -> Error {
        Error::syntax(self.file, line_number, message)
    }

    fn parse_line(&mut self, line_number: usize, line: &str) -> Result<()> {
        if let Some(entry) = line.strip_prefix(' ') {
            return self.parse_entry(line_number, entry);
        }

        let (directive, arg) = match line.split_once(' ') {
            Some((directive, arg)) => (directive, arg),
            None => (line, ""),
        };

        match directive {
            "newpackage" => {
                if self.new_package.is_some() {
                    return Err(self.error(line_number, "found multiple 'newpackage' directives"));
                }
                debug!("newpackage '{}'", arg);
                self.new_package = Some(arg.to_string());
            }
            "source" => {
                if self.source.is_some() {
                    return Err(self.error(line_number, "found multiple 'source' directives"));
                }
                debug!("source '{}'", arg);
                self.source = Some(PathBuf::from(arg));
            }
            "package" => self.open_block(arg, PackageOpKind::Normal),
            "split" => self.open_block(arg, PackageOpKind::Split),
            "superset" => self.open_block(arg, PackageOpKind::Superset),
            other => {
                return Err(self.error(line_number, format!("unknown directive '{}'", other)));
            }
        }
        Ok(())
    }

    fn parse_entry(&mut self, line_number: usize, entry: &str) -> Result<()> {
        let file_entry = match entry.split_once(LINK_SEPARATOR) {
            Some((path, target)) => FileEntry::new(path, Some(target.to_string())),
            None => FileEntry::new(entry, None),
        };

        match self.current.as_mut() {
            Some(current) => {
                current.entries.push(file_entry);
                Ok(())
            }
            None => Err(self.error(
                line_number,
                format!("cannot install file '{}', package is not set", entry),
            )),
        }
    }

    fn open_block(&mut self, name: &str, kind: PackageOpKind) {
        self.close_block();
        debug!("{} '{}'", kind, name);
        self.current = Some(PackageOperation::new(name, kind));
    }

    fn close_block(&mut self) {
        if let Some(block) = self.current.take() {
            self.packages.push(block);
        }
    }

    fn finish(mut self) -> Result<OperationDescriptor> {
        self.close_block();

        let Some(new_package) = self.new_package else {
            return Err(Error::MissingDirective {
                file: self.file.to_path_buf(),
                directive: "newpackage",
            });
        };
        let Some(source) = self.source else {
            return Err(Error::MissingDirective {
                file: self.file.to_path_buf(),
                directive: "source",
            });
        };

        Ok(OperationDescriptor {
            file: self.file.to_path_buf(),
            new_package,
            source,
            packages: self.packages,
        })
    }
}
