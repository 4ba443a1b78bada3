// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! On-disk storage for uploaded document bytes.
//!
//! Files live flat under `<data_dir>/documents`, keyed by their sanitized name.
//! The metadata row in the database is the source of truth; this module only
//! derives the presentation fields (size text, icon, extension, uri) and moves
//! bytes around.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::instrument;

pub const INVALID_FILE_NAME: &str = "Invalid file name";

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("Invalid file name: {0}")]
	InvalidFileName(String),

	#[error("storage I/O error on {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl StorageError {
	fn io(path: &Path, source: std::io::Error) -> Self {
		StorageError::Io {
			path: path.to_path_buf(),
			source,
		}
	}
}

/// Presentation fields derived from a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
	pub name: String,
	pub size: u64,
	pub formatted_size: String,
	pub icon: String,
	pub extension: String,
	pub uri: String,
}

/// Flat file store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
	root: PathBuf,
	base_url: String,
}

impl FileStore {
	pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
		Self {
			root: root.into(),
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Create the storage directory if it does not exist.
	pub async fn ensure_root(&self) -> Result<(), StorageError> {
		tokio::fs::create_dir_all(&self.root)
			.await
			.map_err(|e| StorageError::io(&self.root, e))
	}

	/// Check that the storage directory exists and is a directory.
	pub async fn check(&self) -> Result<(), StorageError> {
		let metadata = tokio::fs::metadata(&self.root)
			.await
			.map_err(|e| StorageError::io(&self.root, e))?;
		if metadata.is_dir() {
			Ok(())
		} else {
			Err(StorageError::io(
				&self.root,
				std::io::Error::new(ErrorKind::Other, "not a directory"),
			))
		}
	}

	pub fn uri_for(&self, name: &str) -> String {
		format!("{}/documents/{}", self.base_url, name)
	}

	/// Presentation fields for a file called `name` of `size` bytes.
	pub fn describe(&self, name: &str, size: u64) -> StoredFile {
		let extension = extension_of(name);
		StoredFile {
			name: name.to_string(),
			size,
			formatted_size: format_size(size),
			icon: icon_for(&extension).to_string(),
			uri: self.uri_for(name),
			extension,
		}
	}

	/// Write `bytes` under `name`. Fails if a file with that name already exists.
	#[instrument(skip(self, bytes), fields(size = bytes.len()))]
	pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
		let path = self.root.join(name);
		let mut file = tokio::fs::OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(&path)
			.await
			.map_err(|e| StorageError::io(&path, e))?;
		tokio::io::AsyncWriteExt::write_all(&mut file, bytes)
			.await
			.map_err(|e| StorageError::io(&path, e))?;
		tokio::io::AsyncWriteExt::flush(&mut file)
			.await
			.map_err(|e| StorageError::io(&path, e))?;

		tracing::debug!(path = %path.display(), "stored upload");
		Ok(self.describe(name, bytes.len() as u64))
	}

	/// Remove a stored file. A file that is already gone is not an error.
	#[instrument(skip(self))]
	pub async fn remove(&self, name: &str) -> Result<(), StorageError> {
		let path = self.root.join(name);
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::io(&path, e)),
		}
	}

	/// Move a stored file to a new name. A missing source is not an error.
	#[instrument(skip(self))]
	pub async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
		if from == to {
			return Ok(());
		}
		let source = self.root.join(from);
		let target = self.root.join(to);
		match tokio::fs::rename(&source, &target).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				tracing::warn!(from, "renamed document has no stored file");
				Ok(())
			}
			Err(e) => Err(StorageError::io(&source, e)),
		}
	}
}

/// Reduce a client-supplied file name to a safe final path component.
pub fn sanitize_file_name(raw: &str) -> Result<String, StorageError> {
	let name = raw
		.rsplit(|c: char| c == '/' || c == '\\')
		.next()
		.unwrap_or_default()
		.trim();

	if name.is_empty()
		|| name == "."
		|| name.contains("..")
		|| name.chars().any(char::is_control)
	{
		return Err(StorageError::InvalidFileName(raw.to_string()));
	}
	Ok(name.to_string())
}

/// Lower-case text after the last dot, or empty when there is none.
pub fn extension_of(name: &str) -> String {
	match name.rsplit_once('.') {
		Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
		_ => String::new(),
	}
}

pub fn format_size(bytes: u64) -> String {
	if bytes < KIB {
		format!("{bytes} bytes")
	} else if bytes < MIB {
		format!("{} KB", bytes / KIB)
	} else if bytes < GIB {
		format!("{} MB", bytes / MIB)
	} else {
		format!("{} GB", bytes / GIB)
	}
}

pub fn icon_for(extension: &str) -> &'static str {
	match extension {
		"pdf" => "/icons/pdf.svg",
		"doc" | "docx" | "odt" | "rtf" => "/icons/word.svg",
		"xls" | "xlsx" | "ods" | "csv" => "/icons/excel.svg",
		"ppt" | "pptx" | "odp" => "/icons/powerpoint.svg",
		"png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => "/icons/image.svg",
		"zip" | "tar" | "gz" | "7z" | "rar" => "/icons/archive.svg",
		"txt" | "md" => "/icons/text.svg",
		_ => "/icons/file.svg",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn store(dir: &tempfile::TempDir) -> FileStore {
		FileStore::new(dir.path().join("documents"), "http://localhost:8080/")
	}

	#[test]
	fn sanitize_keeps_only_final_component() {
		assert_eq!(sanitize_file_name("a/b/report.pdf").unwrap(), "report.pdf");
		assert_eq!(sanitize_file_name("C:\\tmp\\notes.txt").unwrap(), "notes.txt");
		assert_eq!(sanitize_file_name("  spaced.md ").unwrap(), "spaced.md");
	}

	#[test]
	fn sanitize_rejects_bad_names() {
		for raw in ["", "   ", "dir/", ".", "dir/.", "..", "a..b", "bad\nname"] {
			let err = sanitize_file_name(raw).unwrap_err();
			assert!(err.to_string().starts_with(INVALID_FILE_NAME), "{raw:?}");
		}
	}

	#[test]
	fn extensions_are_lower_case() {
		assert_eq!(extension_of("Report.PDF"), "pdf");
		assert_eq!(extension_of("archive.tar.gz"), "gz");
		assert_eq!(extension_of("README"), "");
		assert_eq!(extension_of(".env"), "");
	}

	#[test]
	fn sizes_use_integer_units() {
		assert_eq!(format_size(0), "0 bytes");
		assert_eq!(format_size(1023), "1023 bytes");
		assert_eq!(format_size(2048), "2 KB");
		assert_eq!(format_size(5 * MIB + 1), "5 MB");
		assert_eq!(format_size(3 * GIB), "3 GB");
	}

	#[test]
	fn uri_joins_base_url() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(
			store(&dir).uri_for("a.pdf"),
			"http://localhost:8080/documents/a.pdf"
		);
	}

	#[tokio::test]
	async fn save_rename_remove() {
		let dir = tempfile::tempdir().unwrap();
		let store = store(&dir);
		store.ensure_root().await.unwrap();
		store.check().await.unwrap();

		let stored = store.save("a.pdf", b"%PDF-1.7").await.unwrap();
		assert_eq!(stored.size, 8);
		assert_eq!(stored.icon, "/icons/pdf.svg");
		assert!(store.root().join("a.pdf").exists());

		assert!(store.save("a.pdf", b"again").await.is_err());

		store.rename("a.pdf", "b.pdf").await.unwrap();
		assert!(!store.root().join("a.pdf").exists());
		assert!(store.root().join("b.pdf").exists());

		store.remove("b.pdf").await.unwrap();
		store.remove("b.pdf").await.unwrap();
		assert!(!store.root().join("b.pdf").exists());
	}

	#[tokio::test]
	async fn check_fails_without_root() {
		let dir = tempfile::tempdir().unwrap();
		assert!(store(&dir).check().await.is_err());
	}

	proptest! {
		#[test]
		fn prop_sanitized_names_have_no_separators(raw in "[a-zA-Z0-9./\\\\ _-]{0,40}") {
			if let Ok(name) = sanitize_file_name(&raw) {
				prop_assert!(!name.is_empty());
				prop_assert!(!name.contains('/'));
				prop_assert!(!name.contains('\\'));
				prop_assert!(!name.contains(".."));
				prop_assert_ne!(name.as_str(), ".");
			}
		}

		#[test]
		fn prop_formatted_size_is_never_empty(bytes in any::<u64>()) {
			prop_assert!(!format_size(bytes).is_empty());
		}
	}
}
