//! Submitted form input.
//!
//! [`FormData`] is the mapping a request parser hands to a form: multi-valued
//! text fields plus uploaded files, both keyed by field name. Like a query
//! dictionary it is immutable by default; [`FormData::copy`] returns a
//! mutable clone.

use std::collections::HashMap;

use blog_core::{BlogError, BlogResult};
use serde::Serialize;

/// An uploaded file from a multipart form submission.
///
/// Storage of the content is the caller's business; the form layer only
/// inspects the filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// The original filename as provided by the client.
    pub name: String,
    /// The MIME content type of the file.
    pub content_type: String,
    /// The size of the file content in bytes.
    pub size: usize,
    /// The raw file content.
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Creates an uploaded file from its name, content type, and content.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: content.len(),
            content,
        }
    }

    /// Returns the lowercased extension of the filename, if it has one.
    ///
    /// ```
    /// use blog_forms::UploadedFile;
    ///
    /// let f = UploadedFile::new("Me.PNG", "image/png", Vec::new());
    /// assert_eq!(f.extension().as_deref(), Some("png"));
    /// assert_eq!(UploadedFile::new("README", "text/plain", Vec::new()).extension(), None);
    /// ```
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Submitted text fields and files for one request.
///
/// # Examples
///
/// ```
/// use blog_forms::FormData;
///
/// let data = FormData::parse("username=alice&email=alice%40example.com&tag=a&tag=b");
/// assert_eq!(data.get("email"), Some("alice@example.com"));
/// assert_eq!(data.get("tag"), Some("b"));
/// assert_eq!(data.get_list("tag").map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
    mutable: bool,
}

impl FormData {
    /// Creates a new, empty, immutable `FormData`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty, mutable `FormData`.
    pub fn new_mutable() -> Self {
        Self {
            mutable: true,
            ..Self::default()
        }
    }

    /// Parses an `application/x-www-form-urlencoded` body into an immutable `FormData`.
    ///
    /// `+` decodes to a space and percent sequences are decoded as UTF-8
    /// (lossily). A key without `=` gets an empty value.
    pub fn parse(body: &str) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();

        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            fields
                .entry(percent_decode(key))
                .or_default()
                .push(percent_decode(value));
        }

        Self {
            fields,
            files: HashMap::new(),
            mutable: false,
        }
    }

    /// Builds an immutable `FormData` from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in pairs {
            fields.entry(k.into()).or_default().push(v.into());
        }
        Self {
            fields,
            files: HashMap::new(),
            mutable: false,
        }
    }

    /// Returns this data with an uploaded file attached under `name`.
    ///
    /// Builder-style attachment is how a request parser assembles the
    /// mapping, so it is allowed regardless of mutability.
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    /// Returns the last value for the given key, or `None` if not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if not present.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// Returns the uploaded file for the given key.
    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key)
    }

    /// Sets a single value for the given key, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::SuspiciousOperation`] if this `FormData` is immutable.
    pub fn set(&mut self, key: &str, value: &str) -> BlogResult<()> {
        self.ensure_mutable()?;
        self.fields.insert(key.to_string(), vec![value.to_string()]);
        Ok(())
    }

    /// Appends a value to the list for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::SuspiciousOperation`] if this `FormData` is immutable.
    pub fn append(&mut self, key: &str, value: &str) -> BlogResult<()> {
        self.ensure_mutable()?;
        self.fields
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    /// Returns a mutable copy of this `FormData`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            files: self.files.clone(),
            mutable: true,
        }
    }

    /// Returns `true` if this instance can be modified in place.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Returns `true` if no text fields and no files were submitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    fn ensure_mutable(&self) -> BlogResult<()> {
        if self.mutable {
            Ok(())
        } else {
            Err(BlogError::SuspiciousOperation(
                "This FormData instance is immutable".to_string(),
            ))
        }
    }
}

/// Decodes a form-urlencoded component.
fn percent_decode(input: &str) -> String {
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}
