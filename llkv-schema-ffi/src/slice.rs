//! Readers for (pointer, length) pairs handed across the C boundary.
//!
//! Nothing here retains a caller pointer past the call that received it.

use std::marker::PhantomData;

use llkv_result::{Error, Result};

use crate::handle::SchemaHandle;

/// Borrowed, length-delimited text buffer. Not NUL-terminated.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StringSlice<'a> {
    pub ptr: *const u8,
    pub len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> StringSlice<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
            _marker: PhantomData,
        }
    }

    /// A raw (pointer, length) pair, as a foreign caller would build it.
    pub fn from_raw_parts(ptr: *const u8, len: usize) -> Self {
        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }

    /// View the buffer as bytes. Does not validate the encoding.
    ///
    /// `len` is checked against `limit` before any slice is formed, so a
    /// caller that lies about the length is rejected without its memory
    /// being touched.
    ///
    /// # Safety
    ///
    /// When `ptr` is non-null and `len` is within `limit`, `ptr` must be
    /// valid for reads of `len` bytes for the lifetime `'a`.
    pub unsafe fn as_bytes(&self, limit: usize) -> Result<&'a [u8]> {
        if self.ptr.is_null() {
            if self.len == 0 {
                return Ok(&[]);
            }
            return Err(Error::invalid_input(format!(
                "null text pointer with length {}",
                self.len
            )));
        }
        if self.len > limit {
            return Err(Error::limit_exceeded("text length", self.len, limit));
        }
        if self.len > isize::MAX as usize {
            return Err(Error::invalid_input(format!(
                "text length {} is not addressable",
                self.len
            )));
        }
        // SAFETY: non-null, bounded; caller guarantees `len` readable bytes.
        Ok(unsafe { std::slice::from_raw_parts(self.ptr, self.len) })
    }
}

impl<'a> From<&'a str> for StringSlice<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

/// One key/value pair of field metadata, as laid out by a foreign caller.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MetadataEntry<'a> {
    pub key: StringSlice<'a>,
    pub value: StringSlice<'a>,
}

impl<'a> MetadataEntry<'a> {
    pub fn new(key: &'a str, value: &'a str) -> Self {
        Self {
            key: StringSlice::new(key),
            value: StringSlice::new(value),
        }
    }
}

/// Borrow a caller-owned handle array.
///
/// The pointer is checked for null (when `count > 0`) and `count` against
/// `limit` before anything is dereferenced.
///
/// # Safety
///
/// When `ptr` is non-null and `count` is within `limit`, `ptr` must be valid
/// for reads of `count` handles for the lifetime `'a`.
pub unsafe fn read_handles<'a>(
    ptr: *const SchemaHandle,
    count: usize,
    limit: usize,
) -> Result<&'a [SchemaHandle]> {
    unsafe { read_array(ptr, count, limit, "handle", "handle count") }
}

/// Borrow a caller-owned metadata array. Same checks as [`read_handles`].
///
/// # Safety
///
/// When `ptr` is non-null and `count` is within `limit`, `ptr` must be valid
/// for reads of `count` entries for the lifetime `'a`.
pub unsafe fn read_metadata<'a>(
    ptr: *const MetadataEntry<'a>,
    count: usize,
    limit: usize,
) -> Result<&'a [MetadataEntry<'a>]> {
    unsafe { read_array(ptr, count, limit, "metadata entry", "metadata entry count") }
}

unsafe fn read_array<'a, T>(
    ptr: *const T,
    count: usize,
    limit: usize,
    what: &'static str,
    count_what: &'static str,
) -> Result<&'a [T]> {
    if count == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Error::invalid_input(format!(
            "null {what} list with count {count}"
        )));
    }
    if count > limit {
        return Err(Error::limit_exceeded(count_what, count, limit));
    }
    if !ptr.is_aligned() {
        return Err(Error::invalid_input(format!("misaligned {what} list")));
    }
    if count > isize::MAX as usize / std::mem::size_of::<T>().max(1) {
        return Err(Error::invalid_input(format!(
            "{what} count {count} is not addressable"
        )));
    }
    // SAFETY: non-null, aligned, bounded; caller guarantees `count` readable items.
    Ok(unsafe { std::slice::from_raw_parts(ptr, count) })
}
