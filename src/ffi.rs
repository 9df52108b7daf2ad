//! FFI bindings for wellness state
//!
//! C-compatible entry points for the pure derivations (risks, streaks,
//! progress) so a mobile shell can call them without running the async stores.
//! All functions take and return null-terminated JSON strings; returned memory
//! must be freed with `wellness_free_string`.

use chrono::DateTime;
use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::progress::ProgressSummary;
use crate::risk::compute_risks;
use crate::streak::next_streak;
use crate::types::{parse_timestamp, Goal, UserProfile};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn to_json_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Compute risk assessments from a profile and a goal array.
///
/// `profile_json` may be the JSON literal `null`, which yields `[]`.
///
/// # Safety
/// - `profile_json` and `goals_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `wellness_free_string`.
/// - Returns NULL on error; call `wellness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellness_compute_risks(
    profile_json: *const c_char,
    goals_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(profile_str) = cstr_to_string(profile_json) else {
        set_last_error("Invalid profile string pointer");
        return ptr::null_mut();
    };
    let Some(goals_str) = cstr_to_string(goals_json) else {
        set_last_error("Invalid goals string pointer");
        return ptr::null_mut();
    };

    let profile: Option<UserProfile> = match serde_json::from_str(&profile_str) {
        Ok(p) => p,
        Err(e) => {
            set_last_error(&format!("Invalid profile JSON: {e}"));
            return ptr::null_mut();
        }
    };
    let goals: Vec<Goal> = match serde_json::from_str(&goals_str) {
        Ok(g) => g,
        Err(e) => {
            set_last_error(&format!("Invalid goals JSON: {e}"));
            return ptr::null_mut();
        }
    };

    to_json_cstr(&compute_risks(profile.as_ref(), &goals))
}

/// Evaluate the streak policy.
///
/// `last_active` may be NULL or empty for "never". `now` must be an RFC 3339
/// timestamp; its offset decides which calendar day it falls on, so pass the
/// device's local time. Returns `{"newStreak": n, "newLastActive": "..."}`.
///
/// # Safety
/// - `last_active` must be NULL or a valid null-terminated C string.
/// - `now` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `wellness_free_string`.
/// - Returns NULL on error; call `wellness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellness_next_streak(
    last_active: *const c_char,
    current_streak: u32,
    now: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(now_str) = cstr_to_string(now) else {
        set_last_error("Invalid now string pointer");
        return ptr::null_mut();
    };
    let now = match DateTime::parse_from_rfc3339(now_str.trim()) {
        Ok(now) => now,
        Err(e) => {
            set_last_error(&format!("Invalid now timestamp: {e}"));
            return ptr::null_mut();
        }
    };
    let last_active = cstr_to_string(last_active).and_then(|s| parse_timestamp(&s));

    to_json_cstr(&next_streak(last_active, current_streak, &now))
}

/// Summarize goal progress from a goal array.
///
/// # Safety
/// - `goals_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `wellness_free_string`.
/// - Returns NULL on error; call `wellness_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn wellness_progress_summary(goals_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(goals_str) = cstr_to_string(goals_json) else {
        set_last_error("Invalid goals string pointer");
        return ptr::null_mut();
    };
    match serde_json::from_str::<Vec<Goal>>(&goals_str) {
        Ok(goals) => to_json_cstr(&ProgressSummary::from_goals(&goals)),
        Err(e) => {
            set_last_error(&format!("Invalid goals JSON: {e}"));
            ptr::null_mut()
        }
    }
}

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local string; do NOT free it.
/// - The pointer is valid until the next call into this library on the same thread.
/// - Returns NULL if there was no error.
#[no_mangle]
pub unsafe extern "C" fn wellness_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must be a pointer returned by a `wellness_*` function, or NULL.
#[no_mangle]
pub unsafe extern "C" fn wellness_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the library version.
///
/// # Safety
/// - Returns a static string; do NOT free it.
#[no_mangle]
pub unsafe extern "C" fn wellness_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals_json() -> CString {
        CString::new(
            r#"[
                {"id": "1", "title": "Daily Steps", "target": 10000, "current": 0,
                 "unit": "steps", "category": "Activity", "completed": true,
                 "createdAt": "2024-01-15T08:00:00Z", "progress": 0},
                {"id": "2", "title": "Water Intake", "target": 8, "current": 2,
                 "unit": "glasses", "category": "Nutrition", "completed": false,
                 "createdAt": "2024-01-15T08:00:00Z", "progress": 25}
            ]"#,
        )
        .unwrap()
    }

    unsafe fn take(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        wellness_free_string(ptr);
        value
    }

    #[test]
    fn test_ffi_compute_risks() {
        let profile = CString::new(r#"{"name": "A", "age": "40", "activityLevel": "sedentary"}"#)
            .unwrap();
        let goals = goals_json();

        unsafe {
            let risks = take(wellness_compute_risks(profile.as_ptr(), goals.as_ptr()));
            // 15 + 2.5 + 10 - 5
            assert_eq!(risks[0]["category"], "Cardiovascular");
            assert_eq!(risks[0]["risk"], 23);
            assert_eq!(risks[0]["level"], "low");
        }
    }

    #[test]
    fn test_ffi_compute_risks_without_profile() {
        let profile = CString::new("null").unwrap();
        let goals = goals_json();

        unsafe {
            let risks = take(wellness_compute_risks(profile.as_ptr(), goals.as_ptr()));
            assert_eq!(risks, serde_json::json!([]));
        }
    }

    #[test]
    fn test_ffi_next_streak() {
        let last = CString::new("2024-01-15T08:00:00Z").unwrap();
        let now = CString::new("2024-01-16T21:00:00Z").unwrap();

        unsafe {
            let update = take(wellness_next_streak(last.as_ptr(), 5, now.as_ptr()));
            assert_eq!(update["newStreak"], 6);

            let update = take(wellness_next_streak(ptr::null(), 5, now.as_ptr()));
            assert_eq!(update["newStreak"], 1);
        }
    }

    #[test]
    fn test_ffi_next_streak_uses_caller_offset() {
        // Consecutive local days at +02:00, the same day in UTC
        let last = CString::new("2024-01-15T20:00:00+02:00").unwrap();
        let now = CString::new("2024-01-16T00:30:00+02:00").unwrap();

        unsafe {
            let update = take(wellness_next_streak(last.as_ptr(), 5, now.as_ptr()));
            assert_eq!(update["newStreak"], 6);
            assert_eq!(update["newLastActive"], "2024-01-15T22:30:00Z");

            let utc_now = CString::new("2024-01-15T22:30:00Z").unwrap();
            let update = take(wellness_next_streak(last.as_ptr(), 5, utc_now.as_ptr()));
            assert_eq!(update["newStreak"], 5);
        }
    }

    #[test]
    fn test_ffi_progress_summary() {
        let goals = goals_json();
        unsafe {
            let summary = take(wellness_progress_summary(goals.as_ptr()));
            assert_eq!(summary["completed"], 1);
            assert_eq!(summary["completionRate"], 50);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad = CString::new("not json").unwrap();
        unsafe {
            let result = wellness_progress_summary(bad.as_ptr());
            assert!(result.is_null());

            let error = wellness_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("Invalid goals JSON"));

            let now = CString::new("tomorrow").unwrap();
            assert!(wellness_next_streak(ptr::null(), 1, now.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = wellness_version();
            assert!(!version.is_null());
            assert!(!CStr::from_ptr(version).to_str().unwrap().is_empty());
        }
    }
}
