//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion and release helpers
//! live here to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use catalog_core::{CatalogError, Character, HttpMethod, HttpRequest, PageEnvelope, Place};

/// Opaque handle to a `CatalogClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCatalogClient {
    pub(crate) inner: catalog_core::CatalogClient,
}

/// Copy `s` into a heap C string. Interior NULs cannot be represented and
/// are dropped.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

/// Release a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak `items` as a pointer + length pair; an empty vec becomes null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let mut items = items.into_boxed_slice();
    let len = items.len() as u32;
    let ptr = items.as_mut_ptr();
    std::mem::forget(items);
    (ptr, len)
}

/// Reclaim a pointer + length pair produced by `into_raw_parts`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_parts::<T>` and not be reclaimed twice.
unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `catalog_build_*` functions. The C caller executes the request
/// and passes the response back through `catalog_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
        }))
    }

    /// Release a request built by `from_core`.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not be released twice.
    pub(crate) unsafe fn release(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        for header in unsafe { from_raw_parts(req.headers, req.headers_len) } {
            free_c_string(header.key);
            free_c_string(header.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to a `catalog_parse_*` function. The FFI layer reads but
/// does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned by build and parse functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    NotFound = 2,
    Http = 3,
    Transport = 4,
    Decode = 5,
    Cancelled = 6,
    Panic = 7,
    NullArg = 8,
}

impl FfiErrorCode {
    pub(crate) fn of(err: &CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(_) => FfiErrorCode::InvalidArgument,
            CatalogError::NotFound(_) => FfiErrorCode::NotFound,
            CatalogError::Transport(_) => FfiErrorCode::Transport,
            CatalogError::HttpError { .. } => FfiErrorCode::Http,
            CatalogError::DecodeError(_) => FfiErrorCode::Decode,
            CatalogError::Cancelled => FfiErrorCode::Cancelled,
        }
    }
}

/// Tag that tells `catalog_free_result` what `FfiCatalogResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Character = 1,
    Page = 2,
}

/// Origin or location reference. `url` is an empty string when the catalog
/// has no detail for the place.
#[repr(C)]
pub struct FfiPlace {
    pub name: *mut c_char,
    pub url: *mut c_char,
}

impl FfiPlace {
    fn from_core(place: Place) -> Self {
        Self {
            name: c_string(place.name),
            url: c_string(place.url),
        }
    }

    fn release(&self) {
        free_c_string(self.name);
        free_c_string(self.url);
    }
}

/// A character exposed to C. `kind` carries the upstream `type` field.
#[repr(C)]
pub struct FfiCharacter {
    pub id: u64,
    pub name: *mut c_char,
    pub status: *mut c_char,
    pub species: *mut c_char,
    pub kind: *mut c_char,
    pub gender: *mut c_char,
    pub origin: FfiPlace,
    pub location: FfiPlace,
    pub image: *mut c_char,
    pub episodes: *mut *mut c_char,
    pub episodes_len: u32,
    pub url: *mut c_char,
    pub created: *mut c_char,
}

impl FfiCharacter {
    pub(crate) fn from_core(c: Character) -> Self {
        let (episodes, episodes_len) = into_raw_parts(c.episode.into_iter().map(c_string).collect());
        Self {
            id: c.id,
            name: c_string(c.name),
            status: c_string(c.status),
            species: c_string(c.species),
            kind: c_string(c.kind),
            gender: c_string(c.gender),
            origin: FfiPlace::from_core(c.origin),
            location: FfiPlace::from_core(c.location),
            image: c_string(c.image),
            episodes,
            episodes_len,
            url: c_string(c.url),
            created: c_string(c.created),
        }
    }

    /// Free the fields of a character (but not the struct itself).
    ///
    /// # Safety
    /// The fields must come from `from_core` and not be released twice.
    pub(crate) unsafe fn release_fields(&self) {
        for s in [self.name, self.status, self.species, self.kind, self.gender, self.image, self.url, self.created] {
            free_c_string(s);
        }
        self.origin.release();
        self.location.release();
        for episode in unsafe { from_raw_parts(self.episodes, self.episodes_len) } {
            free_c_string(episode);
        }
    }
}

/// One page of characters exposed to C. `next_page` / `prev_page` are 0 when
/// there is no neighbouring page.
#[repr(C)]
pub struct FfiPage {
    pub count: u64,
    pub pages: u64,
    pub next_page: i64,
    pub prev_page: i64,
    pub items: *mut FfiCharacter,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiCatalogResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiCatalogResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCatalogResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiCharacter`.
    pub(crate) fn ok_character(character: Character) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiCharacter::from_core(character)));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, FfiDataTag::Character, data.cast())
    }

    /// Build a success result carrying an `FfiPage`. An exhausted listing is
    /// a success with `len == 0`.
    pub(crate) fn ok_page(page: PageEnvelope) -> *mut Self {
        let next_page = page.info.next_page().unwrap_or(0);
        let prev_page = page.info.prev_page().unwrap_or(0);
        let items = page.results.into_iter().map(FfiCharacter::from_core).collect();
        let (items, len) = into_raw_parts(items);
        let data = Box::into_raw(Box::new(FfiPage {
            count: page.info.count,
            pages: page.info.pages,
            next_page,
            prev_page,
            items,
            len,
        }));
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, FfiDataTag::Page, data.cast())
    }

    /// Build an error result from a `CatalogError`.
    pub(crate) fn from_error(err: CatalogError) -> *mut Self {
        let http_status = match &err {
            CatalogError::NotFound(_) => 404,
            CatalogError::HttpError { status, .. } => *status,
            _ => 0,
        };
        Self::boxed(
            FfiErrorCode::of(&err),
            c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Release a result and whatever its `data` points to.
    ///
    /// # Safety
    /// `result` must come from one of the constructors above and not be
    /// released twice.
    pub(crate) unsafe fn release(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Character => {
                let character = unsafe { Box::from_raw(result.data as *mut FfiCharacter) };
                unsafe { character.release_fields() };
            }
            FfiDataTag::Page => {
                let page = unsafe { Box::from_raw(result.data as *mut FfiPage) };
                for item in unsafe { from_raw_parts(page.items, page.len) } {
                    unsafe { item.release_fields() };
                }
            }
            FfiDataTag::None => {}
        }
    }
}
