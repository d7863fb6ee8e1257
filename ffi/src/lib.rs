//! C-ABI wrapper around `catalog-core`.
//!
//! # Overview
//! Exposes the catalog's two operations through `extern "C"` functions so a
//! native UI host (Android/iOS via JNI or Swift, or plain C) can build
//! requests, execute them with its own HTTP stack and parse the responses
//! without linking an async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `build_*` returns a request or null; the reason for a null is written to
//!   the optional `out_error` pointer.
//! - `parse_*` returns an `FfiCatalogResult` envelope with `FfiDataTag` +
//!   `void* data` conveying success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `catalog_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use catalog_core::{CatalogError, HttpRequest, HttpResponse};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`, e.g.
/// `"https://rickandmortyapi.com/api"`.
///
/// Returns null if `base_url` is null, not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `catalog_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_client_new(base_url: *const c_char) -> *mut FfiCatalogClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(base_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        let client = catalog_core::CatalogClient::new(url);
        Box::into_raw(Box::new(FfiCatalogClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `catalog_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_client_free(client: *mut FfiCatalogClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

fn set_error(out_error: *mut FfiErrorCode, code: FfiErrorCode) {
    if !out_error.is_null() {
        unsafe { *out_error = code };
    }
}

/// Shared body of the build functions: null checks, panic guard, error
/// reporting through `out_error`.
fn build_with(
    client: *const FfiCatalogClient,
    out_error: *mut FfiErrorCode,
    build: impl FnOnce(&catalog_core::CatalogClient) -> Result<HttpRequest, CatalogError>,
) -> *mut FfiHttpRequest {
    let outcome = catch_unwind(std::panic::AssertUnwindSafe(|| {
        if client.is_null() {
            return Err(FfiErrorCode::NullArg);
        }
        let client = unsafe { &*client };
        build(&client.inner)
            .map(FfiHttpRequest::from_core)
            .map_err(|e| FfiErrorCode::of(&e))
    }))
    .unwrap_or(Err(FfiErrorCode::Panic));

    match outcome {
        Ok(req) => {
            set_error(out_error, FfiErrorCode::Ok);
            req
        }
        Err(code) => {
            set_error(out_error, code);
            std::ptr::null_mut()
        }
    }
}

/// Build the listing request for `page`. Pass 0 or 1 for the first page.
///
/// Returns null if `client` is null or `page` is negative; the reason is
/// written to `out_error` when it is non-null.
/// The caller must free the returned pointer with `catalog_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_fetch_page(
    client: *const FfiCatalogClient,
    page: i64,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    let page = if page == 0 { None } else { Some(page) };
    build_with(client, out_error, |c| c.build_fetch_page(page))
}

/// Build the detail request for character `id`.
///
/// Returns null if `client` is null or `id` is not positive; the reason is
/// written to `out_error` when it is non-null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_build_fetch_by_id(
    client: *const FfiCatalogClient,
    id: i64,
    out_error: *mut FfiErrorCode,
) -> *mut FfiHttpRequest {
    build_with(client, out_error, |c| c.build_fetch_by_id(id))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as an empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse the response to a `catalog_build_fetch_page` request.
///
/// Returns a result with `data_tag = Page` on success. A 404 from the
/// server is a success with an empty page.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_parse_fetch_page(
    client: *const FfiCatalogClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCatalogResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCatalogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_fetch_page(ffi_response_to_core(resp)) {
            Ok(page) => FfiCatalogResult::ok_page(page),
            Err(e) => FfiCatalogResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in catalog_parse_fetch_page"))
}

/// Parse the response to a `catalog_build_fetch_by_id` request for `id`.
///
/// Returns a result with `data_tag = Character` on success, or
/// `error_code = NotFound` when the server answered 404.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_parse_fetch_by_id(
    client: *const FfiCatalogClient,
    id: i64,
    response: *const FfiHttpResponse,
) -> *mut FfiCatalogResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiCatalogResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCatalogResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_fetch_by_id(id, ffi_response_to_core(resp)) {
            Ok(character) => FfiCatalogResult::ok_character(character),
            Err(e) => FfiCatalogResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCatalogResult::panic("panic in catalog_parse_fetch_by_id"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `catalog_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::release(req) });
}

/// Free an `FfiCatalogResult` returned by any `catalog_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_free_result(result: *mut FfiCatalogResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiCatalogResult::release(result) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
