/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailtext, the HTML body converter for mail clients.
 *
 * Mailtext is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailtext is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailtext.  If not, see <http://www.gnu.org/licenses/>.
 */

//! C FFI for mailtext core. The message viewer passes a raw HTML body plus its charset
//! label and gets back plain text, either whole or as chunks tagged with link targets.
//! Returned strings are freed with mailtext_free_string. All string parameters are
//! UTF-8 NUL-terminated.

use libc::{c_char, c_int, c_void, size_t};
use std::ffi::{CStr, CString};
use std::ptr;

use mailtext_core::html::{html_to_text, EncodingConverter, HtmlError, HtmlParser};

/// Chunk callback: text (never empty), link target or NULL, user_data.
/// Pointers are only valid for the duration of the call.
type OnChunk = extern "C" fn(*const c_char, *const c_char, *mut c_void);

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = std::cell::RefCell::new(None);
}

fn set_last_error(msg: &str) {
    let msg = CString::new(msg).unwrap_or_else(|_| CString::new("(error)").unwrap());
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn set_html_error(err: &HtmlError) {
    set_last_error(&err.to_string());
}

unsafe fn ptr_to_str(p: *const c_char) -> Option<String> {
    if p.is_null() {
        return None;
    }
    CStr::from_ptr(p).to_str().ok().map(|s| s.to_string())
}

/// Body bytes from (data, len). NULL data is only accepted with len 0.
unsafe fn body_slice<'a>(data: *const u8, len: size_t) -> Option<&'a [u8]> {
    if data.is_null() {
        return if len == 0 { Some(&[]) } else { None };
    }
    Some(std::slice::from_raw_parts(data, len))
}

/// Converter for a charset label; NULL or unknown labels mean UTF-8.
unsafe fn converter_for(charset: *const c_char) -> EncodingConverter {
    match ptr_to_str(charset) {
        Some(label) => EncodingConverter::for_label_or_utf8(&label),
        None => EncodingConverter::utf8(),
    }
}

/// Interior NULs cannot cross the C boundary; replace them with spaces.
fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', " ")).unwrap_or_default()
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn mailtext_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Last error message from a failed call on this thread. Valid until next FFI call. Do not free.
#[no_mangle]
pub extern "C" fn mailtext_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string returned by mailtext_html_to_text. No-op if ptr is NULL.
#[no_mangle]
pub unsafe extern "C" fn mailtext_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Convert an HTML body to plain text. charset: MIME charset label or NULL for UTF-8.
/// Returns a newly allocated string (free with mailtext_free_string), or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mailtext_html_to_text(
    data: *const u8,
    len: size_t,
    charset: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let body = match body_slice(data, len) {
        Some(b) => b,
        None => {
            set_last_error("data is null");
            return ptr::null_mut();
        }
    };
    let conv = converter_for(charset);
    match html_to_text(body, &conv) {
        Ok(text) => to_cstring(&text).into_raw(),
        Err(e) => {
            set_html_error(&e);
            ptr::null_mut()
        }
    }
}

/// Convert an HTML body, calling on_chunk for every non-empty piece of text with the
/// link target active for it (or NULL). Returns 0 on success, -1 on error (see mailtext_last_error).
#[no_mangle]
pub unsafe extern "C" fn mailtext_html_parse(
    data: *const u8,
    len: size_t,
    charset: *const c_char,
    on_chunk: OnChunk,
    user_data: *mut c_void,
) -> c_int {
    clear_last_error();
    let body = match body_slice(data, len) {
        Some(b) => b,
        None => {
            set_last_error("data is null");
            return -1;
        }
    };
    let conv = converter_for(charset);
    let mut parser = HtmlParser::new(body, &conv);
    loop {
        match parser.parse() {
            Ok(Some(chunk)) => {
                if chunk.text().is_empty() {
                    continue;
                }
                let text_c = to_cstring(chunk.text());
                let href_c = chunk.href().map(to_cstring);
                let href_ptr = href_c.as_ref().map(|h| h.as_ptr()).unwrap_or(ptr::null());
                on_chunk(text_c.as_ptr(), href_ptr, user_data);
            }
            Ok(None) => return 0,
            Err(e) => {
                set_html_error(&e);
                return -1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn collect(text: *const c_char, href: *const c_char, user_data: *mut c_void) {
        let out = unsafe { &mut *(user_data as *mut Vec<(String, Option<String>)>) };
        let text = unsafe { ptr_to_str(text) }.unwrap_or_default();
        let href = unsafe { ptr_to_str(href) };
        out.push((text, href));
    }

    #[test]
    fn whole_text() {
        let html = b"<p>Hello&nbsp;<b>world</b></p>";
        unsafe {
            let p = mailtext_html_to_text(html.as_ptr(), html.len(), ptr::null());
            assert!(!p.is_null());
            assert_eq!(CStr::from_ptr(p).to_str().unwrap(), "Hello world");
            mailtext_free_string(p);
        }
    }

    #[test]
    fn chunks_with_links() {
        let html = b"see <a href=\"http://x/\">here</a>.";
        let charset = CString::new("utf-8").unwrap();
        let mut out: Vec<(String, Option<String>)> = Vec::new();
        let rc = unsafe {
            mailtext_html_parse(
                html.as_ptr(),
                html.len(),
                charset.as_ptr(),
                collect,
                &mut out as *mut _ as *mut c_void,
            )
        };
        assert_eq!(rc, 0);
        assert_eq!(
            out,
            vec![
                ("see".to_string(), None),
                (" here".to_string(), Some("http://x/".to_string())),
                (".".to_string(), None),
            ]
        );
    }

    #[test]
    fn null_data() {
        unsafe {
            assert!(mailtext_html_to_text(ptr::null(), 3, ptr::null()).is_null());
            assert!(!mailtext_last_error().is_null());
            let p = mailtext_html_to_text(ptr::null(), 0, ptr::null());
            assert_eq!(CStr::from_ptr(p).to_bytes(), b"");
            mailtext_free_string(p);
        }
    }
}
